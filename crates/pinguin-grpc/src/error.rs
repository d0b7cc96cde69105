use pinguin_core::DomainError;
use pinguin_store::StoreError;
use tonic::{Code, Status};

/// Translate a domain-level error (auth, tenant resolution, validation) into
/// a gRPC status, matching the taxonomy in the wire contract: unauthenticated,
/// permission_denied, invalid_argument, already_exists, not_found, unavailable.
pub fn domain_error_to_status(error: DomainError) -> Status {
    let code = match &error {
        DomainError::InvalidInput(_) => Code::InvalidArgument,
        DomainError::NotFound(_) => Code::NotFound,
        DomainError::DuplicateId(_) => Code::AlreadyExists,
        DomainError::NotEditable(_) => Code::FailedPrecondition,
        DomainError::StaleClaim => Code::Internal,
        DomainError::VaultInvalidCiphertext => Code::Internal,
        DomainError::TransientTransport(_) => Code::Unavailable,
        DomainError::PermanentTransport(_) => Code::Internal,
        DomainError::Unauthenticated(_) => Code::Unauthenticated,
        DomainError::Forbidden(_) => Code::PermissionDenied,
        DomainError::Internal(_) => Code::Internal,
    };
    Status::new(code, error.to_string())
}

/// Translate a store-layer error into a gRPC status. Kept separate from
/// [`domain_error_to_status`] because the store distinguishes `Database`
/// (an outage, transient from the caller's perspective) from the generic
/// internal bucket that `DomainError` collapses it into.
pub fn store_error_to_status(error: StoreError) -> Status {
    let code = match &error {
        StoreError::DuplicateId(_) => Code::AlreadyExists,
        StoreError::Invalid(_) => Code::InvalidArgument,
        StoreError::NotFound(_) => Code::NotFound,
        StoreError::NotEditable(_) => Code::FailedPrecondition,
        StoreError::InPast => Code::InvalidArgument,
        StoreError::StaleClaim => Code::Internal,
        StoreError::Database(_) => Code::Unavailable,
    };
    Status::new(code, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_id_maps_to_already_exists() {
        let status = store_error_to_status(StoreError::DuplicateId("n1".into()));
        assert_eq!(status.code(), Code::AlreadyExists);
    }

    #[test]
    fn database_outage_maps_to_unavailable() {
        let status = store_error_to_status(StoreError::Database("connection reset".into()));
        assert_eq!(status.code(), Code::Unavailable);
    }

    #[test]
    fn forbidden_maps_to_permission_denied() {
        let status = domain_error_to_status(DomainError::Forbidden("wrong tenant".into()));
        assert_eq!(status.code(), Code::PermissionDenied);
    }
}
