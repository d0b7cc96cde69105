use async_trait::async_trait;

use crate::error::Result;

/// An outbound message ready to hand to a transport, independent of how it
/// was persisted.
pub struct OutboundMessage<'a> {
    pub recipient: &'a str,
    pub subject: Option<&'a str>,
    pub body: &'a str,
}

/// A channel-specific transport. Implementations classify every failure as
/// [`crate::error::SenderError::Transient`] or
/// [`crate::error::SenderError::Permanent`] — the scheduler relies on that
/// classification to decide whether to retry.
#[async_trait]
pub trait Sender: Send + Sync {
    async fn send(&self, message: OutboundMessage<'_>) -> Result<()>;
}
