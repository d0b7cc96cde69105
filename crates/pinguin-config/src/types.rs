use serde::Deserialize;

use crate::error::{ConfigError, Result};

fn default_log_level() -> String {
    "info".into()
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_interval_sec() -> u64 {
    60
}

fn default_connection_timeout_sec() -> u64 {
    10
}

fn default_operation_timeout_sec() -> u64 {
    30
}

fn default_max_schedule_horizon_days() -> u32 {
    90
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".into()
}

fn default_grpc_listen_addr() -> String {
    "0.0.0.0:50051".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(rename = "databasePath")]
    pub database_path: String,
    #[serde(rename = "grpcAuthToken")]
    pub grpc_auth_token: String,
    #[serde(rename = "grpcListenAddr", default = "default_grpc_listen_addr")]
    pub grpc_listen_addr: String,
    #[serde(rename = "logLevel", default = "default_log_level")]
    pub log_level: String,
    #[serde(rename = "maxRetries", default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(rename = "retryIntervalSec", default = "default_retry_interval_sec")]
    pub retry_interval_sec: u64,
    #[serde(rename = "masterEncryptionKey")]
    pub master_encryption_key: String,
    #[serde(rename = "connectionTimeoutSec", default = "default_connection_timeout_sec")]
    pub connection_timeout_sec: u64,
    #[serde(rename = "operationTimeoutSec", default = "default_operation_timeout_sec")]
    pub operation_timeout_sec: u64,
    #[serde(rename = "maxScheduleHorizonDays", default = "default_max_schedule_horizon_days")]
    pub max_schedule_horizon_days: u32,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TauthConfig {
    #[serde(rename = "signingKey", default)]
    pub signing_key: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(rename = "cookieName", default)]
    pub cookie_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "listenAddr", default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(rename = "allowedOrigins", default)]
    pub allowed_origins: Vec<String>,
    #[serde(default)]
    pub tauth: TauthConfig,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: default_listen_addr(),
            allowed_origins: Vec::new(),
            tauth: TauthConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct IdentityConfig {
    #[serde(rename = "googleClientId", default)]
    pub google_client_id: String,
    #[serde(rename = "tauthBaseUrl", default)]
    pub tauth_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailProfileConfig {
    #[serde(rename = "profileId", default = "default_profile_id")]
    pub profile_id: String,
    #[serde(rename = "isDefault", default)]
    pub is_default: bool,
    #[serde(rename = "smtpHost")]
    pub smtp_host: String,
    #[serde(rename = "smtpPort")]
    pub smtp_port: u16,
    #[serde(rename = "smtpUsername")]
    pub smtp_username: String,
    #[serde(rename = "smtpPassword")]
    pub smtp_password: String,
    #[serde(rename = "fromAddress")]
    pub from_address: String,
    #[serde(rename = "rateHintPerMinute", default)]
    pub rate_hint_per_minute: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmsProfileConfig {
    #[serde(rename = "profileId", default = "default_profile_id")]
    pub profile_id: String,
    #[serde(rename = "isDefault", default)]
    pub is_default: bool,
    #[serde(rename = "apiBaseUrl")]
    pub api_base_url: String,
    #[serde(rename = "accountId")]
    pub account_id: String,
    #[serde(rename = "authToken")]
    pub auth_token: String,
    #[serde(rename = "fromNumber")]
    pub from_number: String,
    #[serde(rename = "rateHintPerMinute", default)]
    pub rate_hint_per_minute: Option<u32>,
}

fn default_profile_id() -> String {
    "default".into()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RetryPolicyConfig {
    #[serde(rename = "maxRetries", default)]
    pub max_retries: Option<u32>,
    #[serde(rename = "backoffBaseSec", default)]
    pub backoff_base_secs: Option<u64>,
    #[serde(rename = "backoffCapSec", default)]
    pub backoff_cap_secs: Option<u64>,
}

fn default_tenant_status() -> String {
    "active".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TenantConfig {
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    /// `"active"` or `"suspended"`; validated in [`AppConfig::validate`].
    #[serde(default = "default_tenant_status")]
    pub status: String,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub admins: Vec<String>,
    #[serde(rename = "emailProfiles", default)]
    pub email_profiles: Vec<EmailProfileConfig>,
    #[serde(rename = "smsProfiles", default)]
    pub sms_profiles: Vec<SmsProfileConfig>,
    #[serde(rename = "retryPolicy", default)]
    pub retry_policy: RetryPolicyConfig,
    #[serde(rename = "maxAttachmentBytes", default)]
    pub max_attachment_bytes: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub tenants: Vec<TenantConfig>,
}

impl AppConfig {
    /// Check the hard requirements the YAML schema alone cannot express:
    /// non-empty required fields, minimum key length, at least one domain
    /// per tenant, and at least one admin per tenant when the web facade is
    /// enabled. Collects nothing — returns the first violation found,
    /// mirroring the teacher's fail-fast `AppConfig::validate`.
    pub fn validate(&self) -> Result<()> {
        if self.server.database_path.is_empty() {
            return Err(ConfigError::Invalid("server.databasePath is required".into()));
        }
        if self.server.grpc_auth_token.is_empty() {
            return Err(ConfigError::Invalid("server.grpcAuthToken is required".into()));
        }
        if self.server.master_encryption_key.trim().len() < 32 {
            return Err(ConfigError::Invalid(
                "server.masterEncryptionKey must be at least 32 characters".into(),
            ));
        }

        if self.web.enabled && self.web.tauth.signing_key.is_empty() {
            return Err(ConfigError::Invalid(
                "web.tauth.signingKey is required when web.enabled is true".into(),
            ));
        }

        if self.tenants.is_empty() {
            return Err(ConfigError::Invalid("at least one tenant is required".into()));
        }

        let mut seen_ids = std::collections::HashSet::new();
        for tenant in &self.tenants {
            if tenant.id.is_empty() {
                return Err(ConfigError::Invalid("tenant.id is required".into()));
            }
            if !seen_ids.insert(tenant.id.clone()) {
                return Err(ConfigError::Invalid(format!("duplicate tenant id: {}", tenant.id)));
            }
            if tenant.domains.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "tenant {} must declare at least one domain",
                    tenant.id
                )));
            }
            if tenant.status != "active" && tenant.status != "suspended" {
                return Err(ConfigError::Invalid(format!(
                    "tenant {} has invalid status {:?}, expected \"active\" or \"suspended\"",
                    tenant.id, tenant.status
                )));
            }
            if self.web.enabled && tenant.admins.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "tenant {} must declare at least one admin when web.enabled is true",
                    tenant.id
                )));
            }
            for profile in &tenant.email_profiles {
                if profile.smtp_host.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "tenant {} email profile {} is missing smtpHost",
                        tenant.id, profile.profile_id
                    )));
                }
            }
            for profile in &tenant.sms_profiles {
                if profile.api_base_url.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "tenant {} sms profile {} is missing apiBaseUrl",
                        tenant.id, profile.profile_id
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_yaml() -> &'static str {
        r#"
server:
  databasePath: "pinguin.db"
  grpcAuthToken: "token"
  masterEncryptionKey: "01234567890123456789012345678901"
tenants:
  - id: acme
    displayName: Acme
    domains: ["acme.example.com"]
"#
    }

    #[test]
    fn parses_and_validates_minimal_config() {
        let config: AppConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.server.max_retries, 5);
    }

    #[test]
    fn rejects_short_master_key() {
        let mut config: AppConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        config.server.master_encryption_key = "too-short".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_tenant_without_domains() {
        let mut config: AppConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        config.tenants[0].domains.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn requires_admins_when_web_enabled() {
        let mut config: AppConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        config.web.enabled = true;
        config.web.tauth.signing_key = "k".repeat(32);
        assert!(config.validate().is_err());
        config.tenants[0].admins.push("admin@acme.io".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_duplicate_tenant_ids() {
        let mut config: AppConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        let duplicate = config.tenants[0].clone();
        config.tenants.push(duplicate);
        assert!(config.validate().is_err());
    }

    #[test]
    fn tenant_status_defaults_to_active_and_rejects_garbage() {
        let config: AppConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        assert_eq!(config.tenants[0].status, "active");

        let mut suspended = config.clone();
        suspended.tenants[0].status = "suspended".into();
        assert!(suspended.validate().is_ok());

        let mut garbage = config;
        garbage.tenants[0].status = "disabled".into();
        assert!(garbage.validate().is_err());
    }
}
