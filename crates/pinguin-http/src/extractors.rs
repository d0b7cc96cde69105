use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use pinguin_tenant::Tenant;

use crate::error::ApiError;
use crate::state::AppState;

/// An authenticated tenant-admin session, resolved from the request's `Host`
/// header (which tenant) and session validator (who). Every admin route
/// takes this instead of `State<AppState>` directly so tenant scoping can
/// never be forgotten at a call site.
pub struct AdminSession {
    pub tenant: Tenant,
    pub email: String,
}

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let host = parts
            .headers
            .get(axum::http::header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(|h| h.split(':').next().unwrap_or(h))
            .ok_or_else(|| ApiError::bad_request("missing Host header"))?;

        let tenant = app_state
            .tenants
            .get_by_host(host)
            .map_err(|_| ApiError::not_found(format!("no tenant is registered for host {host}")))?
            .clone();

        let principal = app_state
            .session_validator
            .validate(parts)
            .await
            .ok_or_else(ApiError::unauthenticated)?;

        if !tenant.is_admin(&principal.email) {
            return Err(ApiError::forbidden());
        }

        Ok(AdminSession {
            tenant,
            email: principal.email,
        })
    }
}
