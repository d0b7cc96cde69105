use std::sync::Arc;

use pinguin_store::NotificationStore;
use pinguin_tenant::TenantRegistry;

use crate::session::SessionValidator;

/// Shared application state for the admin HTTP facade. Cheap to clone —
/// every field is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NotificationStore>,
    pub tenants: Arc<TenantRegistry>,
    pub session_validator: Arc<dyn SessionValidator>,
    /// Overrides the host-derived value returned by `/runtime-config`, for
    /// deployments that sit behind a reverse proxy rewriting `Host`.
    pub api_base_url_override: Option<String>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        tenants: Arc<TenantRegistry>,
        session_validator: Arc<dyn SessionValidator>,
    ) -> Self {
        Self {
            store,
            tenants,
            session_validator,
            api_base_url_override: None,
        }
    }
}
