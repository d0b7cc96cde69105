use thiserror::Error;

/// Transport-independent error vocabulary shared by every component.
///
/// Individual crates define their own narrower error enums (`VaultError`,
/// `StoreError`, `SenderError`, ...) for the failure modes specific to that
/// layer, and convert into `DomainError` at the boundary where a facade needs
/// to translate the failure into a gRPC status code or an HTTP status code.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate id: {0}")]
    DuplicateId(String),

    #[error("not editable: {0}")]
    NotEditable(String),

    /// Internal only — a worker lost its claim to another worker after lease
    /// expiry. Never surfaced to a caller; the scheduler swallows this.
    #[error("stale claim")]
    StaleClaim,

    #[error("credential decryption failed")]
    VaultInvalidCiphertext,

    #[error("transient transport failure: {0}")]
    TransientTransport(String),

    #[error("permanent transport failure: {0}")]
    PermanentTransport(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn duplicate_id(msg: impl Into<String>) -> Self {
        Self::DuplicateId(msg.into())
    }

    pub fn not_editable(msg: impl Into<String>) -> Self {
        Self::NotEditable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// A short, stable class name suitable for a log field or metric label.
    pub fn class(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::DuplicateId(_) => "duplicate_id",
            Self::NotEditable(_) => "not_editable",
            Self::StaleClaim => "stale_claim",
            Self::VaultInvalidCiphertext => "vault_invalid_ciphertext",
            Self::TransientTransport(_) => "transient_transport",
            Self::PermanentTransport(_) => "permanent_transport",
            Self::Unauthenticated(_) => "unauthenticated",
            Self::Forbidden(_) => "forbidden",
            Self::Internal(_) => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_matches_error_kind() {
        assert_eq!(DomainError::invalid_input("x").class(), "invalid_input");
        assert_eq!(DomainError::not_found("x").class(), "not_found");
        assert_eq!(DomainError::StaleClaim.class(), "stale_claim");
        assert_eq!(
            DomainError::VaultInvalidCiphertext.class(),
            "vault_invalid_ciphertext"
        );
    }

    #[test]
    fn display_does_not_panic_on_any_variant() {
        let variants = vec![
            DomainError::invalid_input("a"),
            DomainError::not_found("b"),
            DomainError::duplicate_id("c"),
            DomainError::not_editable("d"),
            DomainError::StaleClaim,
            DomainError::VaultInvalidCiphertext,
            DomainError::TransientTransport("e".into()),
            DomainError::PermanentTransport("f".into()),
            DomainError::Unauthenticated("g".into()),
            DomainError::Forbidden("h".into()),
            DomainError::internal("i"),
        ];
        for v in variants {
            let _ = v.to_string();
        }
    }
}
