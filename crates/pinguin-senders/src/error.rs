use thiserror::Error;

/// Outcome vocabulary every sender must classify its failures into, so the
/// scheduler can decide retry vs terminal-failure without knowing the
/// transport's own error types.
#[derive(Debug, Error)]
pub enum SenderError {
    /// Worth retrying: timeouts, 5xx responses, connection resets.
    #[error("transient send failure: {0}")]
    Transient(String),

    /// Not worth retrying: invalid recipient, rejected credentials, 4xx
    /// responses other than rate limiting.
    #[error("permanent send failure: {0}")]
    Permanent(String),

    #[error("sender configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SenderError>;

impl From<SenderError> for pinguin_core::DomainError {
    fn from(e: SenderError) -> Self {
        use pinguin_core::DomainError;
        match e {
            SenderError::Transient(msg) => DomainError::TransientTransport(msg),
            SenderError::Permanent(msg) => DomainError::PermanentTransport(msg),
            SenderError::Config(msg) => DomainError::internal(msg),
        }
    }
}
