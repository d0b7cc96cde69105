use thiserror::Error;

#[derive(Debug, Error)]
pub enum TenantError {
    #[error("tenant not found: {0}")]
    NotFound(String),

    #[error("duplicate domain across tenants: {0}")]
    DuplicateDomain(String),
}

pub type Result<T> = std::result::Result<T, TenantError>;

impl From<TenantError> for pinguin_core::DomainError {
    fn from(e: TenantError) -> Self {
        match e {
            TenantError::NotFound(msg) => pinguin_core::DomainError::not_found(msg),
            TenantError::DuplicateDomain(msg) => pinguin_core::DomainError::invalid_input(msg),
        }
    }
}
