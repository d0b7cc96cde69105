pub mod error;
pub mod memory;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use store::NotificationStore;
pub use types::{Claim, ListFilter, NewAttachment, NewNotification, Notification, NotificationAttachment};
