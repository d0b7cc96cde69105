use async_trait::async_trait;
use axum::http::request::Parts;

/// The authenticated principal behind an admin session, once validated.
#[derive(Debug, Clone)]
pub struct SessionPrincipal {
    pub email: String,
}

/// Resolves an inbound request's session cookie (or bearer token, depending
/// on the deployment's identity provider) to a principal. The real identity
/// provider is an external collaborator; this crate only defines the seam
/// and ships a stub implementation for tests and local development.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    async fn validate(&self, parts: &Parts) -> Option<SessionPrincipal>;
}

/// Reads the caller's email straight out of an `x-debug-email` header.
/// Never wired into a production deployment; useful for exercising the
/// admin routes in tests without a real identity provider.
#[derive(Debug, Default)]
pub struct StubSessionValidator;

#[async_trait]
impl SessionValidator for StubSessionValidator {
    async fn validate(&self, parts: &Parts) -> Option<SessionPrincipal> {
        let email = parts.headers.get("x-debug-email")?.to_str().ok()?;
        Some(SessionPrincipal {
            email: email.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn stub_validator_reads_debug_header() {
        let (parts, _) = Request::builder()
            .header("x-debug-email", "admin@acme.io")
            .body(())
            .unwrap()
            .into_parts();

        let principal = StubSessionValidator.validate(&parts).await.unwrap();
        assert_eq!(principal.email, "admin@acme.io");
    }

    #[tokio::test]
    async fn stub_validator_rejects_missing_header() {
        let (parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert!(StubSessionValidator.validate(&parts).await.is_none());
    }
}
