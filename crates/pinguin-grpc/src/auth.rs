use pinguin_core::{DomainError, TenantId};
use tonic::metadata::MetadataMap;
use tonic::Request;

/// Validate the `authorization: Bearer <token>` metadata entry against the
/// single shared submission token configured for this server. There is no
/// per-tenant credential at this layer; tenant isolation is enforced
/// afterward by resolving and scoping every store call to the tenant named
/// in the request.
pub fn authenticate<T>(request: &Request<T>, expected_token: &str) -> Result<(), DomainError> {
    let token = bearer_token(request.metadata())
        .ok_or_else(|| DomainError::Unauthenticated("missing bearer token".into()))?;

    if token != expected_token {
        return Err(DomainError::Unauthenticated("invalid bearer token".into()));
    }
    Ok(())
}

fn bearer_token(metadata: &MetadataMap) -> Option<&str> {
    let raw = metadata.get("authorization")?.to_str().ok()?;
    raw.strip_prefix("Bearer ").map(str::trim)
}

/// Resolve the tenant a request is acting as: the `x-tenant-id` metadata
/// entry overrides the `tenant_id` field carried in the request body itself,
/// matching the wire contract's "tenant override metadata" rule.
pub fn resolve_tenant_id<T>(request: &Request<T>, body_tenant_id: &str) -> Result<TenantId, DomainError> {
    if let Some(header) = request.metadata().get("x-tenant-id") {
        let raw = header
            .to_str()
            .map_err(|_| DomainError::invalid_input("x-tenant-id is not valid UTF-8"))?;
        if !raw.is_empty() {
            return Ok(TenantId::new(raw));
        }
    }

    if body_tenant_id.is_empty() {
        return Err(DomainError::invalid_input(
            "tenant_id is required (set the field or the x-tenant-id metadata entry)",
        ));
    }
    Ok(TenantId::new(body_tenant_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_token() {
        let request = Request::new(());
        assert!(authenticate(&request, "secret").is_err());
    }

    #[test]
    fn accepts_matching_token() {
        let mut request = Request::new(());
        request
            .metadata_mut()
            .insert("authorization", "Bearer secret".parse().unwrap());
        assert!(authenticate(&request, "secret").is_ok());
    }

    #[test]
    fn rejects_wrong_token() {
        let mut request = Request::new(());
        request
            .metadata_mut()
            .insert("authorization", "Bearer wrong".parse().unwrap());
        assert!(authenticate(&request, "secret").is_err());
    }

    #[test]
    fn metadata_tenant_overrides_body_field() {
        let mut request = Request::new(());
        request.metadata_mut().insert("x-tenant-id", "beta".parse().unwrap());
        let tenant_id = resolve_tenant_id(&request, "acme").unwrap();
        assert_eq!(tenant_id, TenantId::new("beta"));
    }

    #[test]
    fn falls_back_to_body_field() {
        let request = Request::new(());
        let tenant_id = resolve_tenant_id(&request, "acme").unwrap();
        assert_eq!(tenant_id, TenantId::new("acme"));
    }

    #[test]
    fn empty_tenant_is_invalid() {
        let request = Request::new(());
        assert!(resolve_tenant_id(&request, "").is_err());
    }
}
