use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use pinguin_core::{Channel, TenantId};
use pinguin_tenant::Tenant;
use pinguin_vault::Vault;

use crate::credentials::{decrypt_email_credentials, decrypt_sms_credentials};
use crate::email::EmailSender;
use crate::error::{Result, SenderError};
use crate::sender::Sender;
use crate::sms::SmsSender;

const CACHE_TTL: Duration = Duration::from_secs(15 * 60);
const CACHE_CAPACITY: u64 = 4096;

#[derive(Clone, Hash, PartialEq, Eq)]
struct CacheKey {
    tenant_id: TenantId,
    profile_id: String,
}

/// Builds and caches [`Sender`] instances keyed by `(tenant_id, profile_id)`.
///
/// Decrypting credentials and constructing a transport (an SMTP connection
/// pool, an HTTP client) is not free; a rotated credential only takes effect
/// once its cache entry expires, which is why the TTL is kept short rather
/// than infinite.
pub struct SenderFactory {
    vault: Arc<Vault>,
    cache: Cache<CacheKey, Arc<dyn Sender>>,
}

impl SenderFactory {
    pub fn new(vault: Arc<Vault>) -> Self {
        Self {
            vault,
            cache: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(CACHE_TTL)
                .build(),
        }
    }

    /// Resolve the sender for `tenant`'s default profile on `channel`, or for
    /// `profile_id` if given explicitly.
    pub async fn get(
        &self,
        tenant: &Tenant,
        channel: Channel,
        profile_id: Option<&str>,
    ) -> Result<Arc<dyn Sender>> {
        let profile_id = profile_id
            .or_else(|| tenant.default_profile_id(channel))
            .ok_or_else(|| SenderError::Config(format!("tenant {} has no default {channel} profile", tenant.tenant_id)))?
            .to_string();

        let key = CacheKey {
            tenant_id: tenant.tenant_id.clone(),
            profile_id: profile_id.clone(),
        };

        if let Some(sender) = self.cache.get(&key).await {
            return Ok(sender);
        }

        let sender = self.build(tenant, channel, &profile_id)?;
        self.cache.insert(key, sender.clone()).await;
        debug!(tenant_id = %tenant.tenant_id, %profile_id, %channel, "built sender");
        Ok(sender)
    }

    fn build(&self, tenant: &Tenant, channel: Channel, profile_id: &str) -> Result<Arc<dyn Sender>> {
        match channel {
            Channel::Email => {
                let profile = tenant
                    .email_profile(profile_id)
                    .ok_or_else(|| SenderError::Config(format!("unknown email profile {profile_id}")))?;
                let credentials = decrypt_email_credentials(&self.vault, &profile.credentials_ciphertext)?;
                Ok(Arc::new(EmailSender::new(&credentials)?))
            }
            Channel::Sms => {
                let profile = tenant
                    .sms_profile(profile_id)
                    .ok_or_else(|| SenderError::Config(format!("unknown sms profile {profile_id}")))?;
                let credentials = decrypt_sms_credentials(&self.vault, &profile.credentials_ciphertext)?;
                Ok(Arc::new(SmsSender::new(credentials)))
            }
        }
    }

    /// Evict any cached sender for `(tenant_id, profile_id)` — used when an
    /// admin rotates a profile's credentials out of band.
    pub async fn invalidate(&self, tenant_id: &TenantId, profile_id: &str) {
        self.cache
            .invalidate(&CacheKey {
                tenant_id: tenant_id.clone(),
                profile_id: profile_id.to_string(),
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinguin_tenant::{EmailProfile, RetryPolicy, TenantStatus};
    use pinguin_vault::MasterKey;
    use std::collections::HashSet;

    fn tenant_with_email_profile(vault: &Vault) -> Tenant {
        let credentials = crate::credentials::EmailCredentials {
            smtp_host: "smtp.example.com".into(),
            smtp_port: 587,
            smtp_username: "svc".into(),
            smtp_password: "hunter2".into(),
            from_address: "noreply@example.com".into(),
        };
        let ciphertext = vault.encrypt(&serde_json::to_string(&credentials).unwrap()).unwrap();

        Tenant {
            tenant_id: TenantId::new("acme"),
            display_name: "Acme".into(),
            status: TenantStatus::Active,
            domains: vec!["acme.example.com".into()],
            admin_emails: HashSet::new(),
            email_profiles: vec![EmailProfile {
                profile_id: "default".into(),
                tenant_id: TenantId::new("acme"),
                is_default: true,
                credentials_ciphertext: ciphertext,
                rate_hint_per_minute: None,
            }],
            sms_profiles: vec![],
            retry_policy: RetryPolicy::default(),
            max_attachment_bytes: 1024,
        }
    }

    #[tokio::test]
    async fn resolves_default_profile_and_caches_it() {
        let vault = Arc::new(Vault::new(MasterKey::generate()));
        let tenant = tenant_with_email_profile(&vault);
        let factory = SenderFactory::new(vault);

        let first = factory.get(&tenant, Channel::Email, None).await.unwrap();
        let second = factory.get(&tenant, Channel::Email, None).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn missing_default_profile_is_a_config_error() {
        let vault = Arc::new(Vault::new(MasterKey::generate()));
        let tenant = tenant_with_email_profile(&vault);
        let factory = SenderFactory::new(vault);

        let result = factory.get(&tenant, Channel::Sms, None).await;
        assert!(matches!(result, Err(SenderError::Config(_))));
    }
}
