use std::sync::Arc;

use anyhow::{Context, Result};

use pinguin_config::{AppConfig, EmailProfileConfig, SmsProfileConfig, TenantConfig};
use pinguin_core::TenantId;
use pinguin_senders::{EmailCredentials, SmsCredentials};
use pinguin_tenant::{EmailProfile, RetryPolicy, SmsProfile, Tenant, TenantRegistry, TenantStatus};
use pinguin_vault::{MasterKey, Vault};

fn parse_tenant_status(status: &str) -> TenantStatus {
    match status {
        "suspended" => TenantStatus::Suspended,
        _ => TenantStatus::Active,
    }
}

/// Parse the master encryption key and build the vault process-wide state.
/// Must run before any worker or facade starts, matching the invariant the
/// core data model documents for the master key.
pub fn build_vault(config: &AppConfig) -> Result<Vault> {
    let key = MasterKey::parse(&config.server.master_encryption_key)
        .context("failed to parse server.masterEncryptionKey")?;
    Ok(Vault::new(key))
}

/// Build the immutable tenant registry from configuration, encrypting every
/// profile's plaintext credentials through the vault on the way in so
/// nothing downstream ever sees them outside this one bootstrap pass.
pub fn build_tenant_registry(config: &AppConfig, vault: &Vault) -> Result<TenantRegistry> {
    let mut tenants = Vec::with_capacity(config.tenants.len());
    for tenant_config in &config.tenants {
        tenants.push(build_tenant(tenant_config, &config.server, vault)?);
    }
    TenantRegistry::build(tenants).context("tenant configuration is invalid")
}

fn build_tenant(
    tenant_config: &TenantConfig,
    server: &pinguin_config::ServerConfig,
    vault: &Vault,
) -> Result<Tenant> {
    let tenant_id = TenantId::new(&tenant_config.id);

    let email_profiles = tenant_config
        .email_profiles
        .iter()
        .map(|p| build_email_profile(&tenant_id, p, vault))
        .collect::<Result<Vec<_>>>()?;

    let sms_profiles = tenant_config
        .sms_profiles
        .iter()
        .map(|p| build_sms_profile(&tenant_id, p, vault))
        .collect::<Result<Vec<_>>>()?;

    let retry_policy = RetryPolicy {
        max_retries: tenant_config.retry_policy.max_retries.unwrap_or(server.max_retries),
        backoff_base_secs: tenant_config
            .retry_policy
            .backoff_base_secs
            .unwrap_or(server.retry_interval_sec),
        backoff_cap_secs: tenant_config
            .retry_policy
            .backoff_cap_secs
            .unwrap_or(server.retry_interval_sec.saturating_mul(60)),
    };

    Ok(Tenant {
        tenant_id,
        display_name: tenant_config.display_name.clone(),
        status: parse_tenant_status(&tenant_config.status),
        domains: tenant_config.domains.clone(),
        admin_emails: tenant_config.admins.iter().map(|a| a.to_lowercase()).collect(),
        email_profiles,
        sms_profiles,
        retry_policy,
        max_attachment_bytes: tenant_config.max_attachment_bytes.unwrap_or(10 * 1024 * 1024),
    })
}

fn build_email_profile(tenant_id: &TenantId, config: &EmailProfileConfig, vault: &Vault) -> Result<EmailProfile> {
    let credentials = EmailCredentials {
        smtp_host: config.smtp_host.clone(),
        smtp_port: config.smtp_port,
        smtp_username: config.smtp_username.clone(),
        smtp_password: config.smtp_password.clone(),
        from_address: config.from_address.clone(),
    };
    let plaintext = serde_json::to_string(&credentials).context("failed to serialize email credentials")?;
    let credentials_ciphertext = vault.encrypt(&plaintext).context("failed to encrypt email credentials")?;

    Ok(EmailProfile {
        profile_id: config.profile_id.clone(),
        tenant_id: tenant_id.clone(),
        is_default: config.is_default,
        credentials_ciphertext,
        rate_hint_per_minute: config.rate_hint_per_minute,
    })
}

fn build_sms_profile(tenant_id: &TenantId, config: &SmsProfileConfig, vault: &Vault) -> Result<SmsProfile> {
    let credentials = SmsCredentials {
        api_base_url: config.api_base_url.clone(),
        account_id: config.account_id.clone(),
        auth_token: config.auth_token.clone(),
        from_number: config.from_number.clone(),
    };
    let plaintext = serde_json::to_string(&credentials).context("failed to serialize SMS credentials")?;
    let credentials_ciphertext = vault.encrypt(&plaintext).context("failed to encrypt SMS credentials")?;

    Ok(SmsProfile {
        profile_id: config.profile_id.clone(),
        tenant_id: tenant_id.clone(),
        is_default: config.is_default,
        credentials_ciphertext,
        rate_hint_per_minute: config.rate_hint_per_minute,
    })
}

pub fn sender_factory(vault: Vault) -> Arc<pinguin_senders::SenderFactory> {
    Arc::new(pinguin_senders::SenderFactory::new(Arc::new(vault)))
}
