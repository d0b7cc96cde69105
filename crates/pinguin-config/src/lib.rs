pub mod env;
pub mod error;
pub mod loader;
pub mod types;

pub use env::expand_env;
pub use error::{ConfigError, Result};
pub use loader::{load, load_str};
pub use types::{
    AppConfig, EmailProfileConfig, IdentityConfig, RetryPolicyConfig, ServerConfig,
    SmsProfileConfig, TauthConfig, TenantConfig, WebConfig,
};
