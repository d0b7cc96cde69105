use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate notification id: {0}")]
    DuplicateId(String),

    #[error("invalid notification: {0}")]
    Invalid(String),

    #[error("notification not found: {0}")]
    NotFound(String),

    #[error("notification is not editable in its current status: {0}")]
    NotEditable(String),

    #[error("scheduled_for is in the past")]
    InPast,

    /// Returned by `ReleaseSuccess`/`ReleaseFailure` when the caller's claim
    /// token no longer matches — the row was reclaimed after lease expiry.
    /// Internal only; the scheduler never surfaces this.
    #[error("stale claim")]
    StaleClaim,

    #[error("database error: {0}")]
    Database(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for pinguin_core::DomainError {
    fn from(e: StoreError) -> Self {
        use pinguin_core::DomainError;
        match e {
            StoreError::DuplicateId(msg) => DomainError::duplicate_id(msg),
            StoreError::Invalid(msg) => DomainError::invalid_input(msg),
            StoreError::NotFound(msg) => DomainError::not_found(msg),
            StoreError::NotEditable(msg) => DomainError::not_editable(msg),
            StoreError::InPast => DomainError::invalid_input("scheduled_for is in the past"),
            StoreError::StaleClaim => DomainError::StaleClaim,
            StoreError::Database(msg) => DomainError::internal(msg),
        }
    }
}
