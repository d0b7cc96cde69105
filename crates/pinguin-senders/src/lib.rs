pub mod credentials;
pub mod email;
pub mod error;
pub mod factory;
pub mod sender;
pub mod sms;

pub use credentials::{EmailCredentials, SmsCredentials};
pub use email::EmailSender;
pub use error::{Result, SenderError};
pub use factory::SenderFactory;
pub use sender::{OutboundMessage, Sender};
pub use sms::SmsSender;
