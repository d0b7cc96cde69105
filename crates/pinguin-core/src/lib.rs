pub mod error;
pub mod ids;
pub mod time;
pub mod types;

pub use error::{DomainError, Result};
pub use ids::{generate_notification_id, ClaimToken, NotificationId, TenantId};
pub use time::{backoff, now_utc};
pub use types::{Channel, NotificationStatus};
