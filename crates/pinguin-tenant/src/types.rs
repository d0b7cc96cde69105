use pinguin_core::{Channel, TenantId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Suspended,
}

/// A delivery credential bundle for the email channel.
///
/// `credentials_ciphertext` holds the vault-encrypted blob; plaintext fields
/// (`host`, `port`, `username`, `from_address`) are not secret on their own,
/// only `password`, which lives inside the ciphertext alongside them as a
/// small serialized struct (see `pinguin_senders::credentials`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailProfile {
    pub profile_id: String,
    pub tenant_id: TenantId,
    pub is_default: bool,
    pub credentials_ciphertext: String,
    pub rate_hint_per_minute: Option<u32>,
}

/// A delivery credential bundle for the SMS channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsProfile {
    pub profile_id: String,
    pub tenant_id: TenantId,
    pub is_default: bool,
    pub credentials_ciphertext: String,
    pub rate_hint_per_minute: Option<u32>,
}

/// Per-tenant retry/delivery policy, referenced by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base_secs: u64,
    pub backoff_cap_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_base_secs: 60,
            backoff_cap_secs: 3600,
        }
    }
}

/// A tenant: an isolated customer of the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub tenant_id: TenantId,
    pub display_name: String,
    pub status: TenantStatus,
    pub domains: Vec<String>,
    pub admin_emails: HashSet<String>,
    pub email_profiles: Vec<EmailProfile>,
    pub sms_profiles: Vec<SmsProfile>,
    pub retry_policy: RetryPolicy,
    pub max_attachment_bytes: u64,
}

impl Tenant {
    pub fn is_active(&self) -> bool {
        matches!(self.status, TenantStatus::Active)
    }

    pub fn is_admin(&self, email: &str) -> bool {
        self.admin_emails.contains(&email.to_lowercase())
    }

    /// The default profile for a channel, used by the sender factory.
    pub fn default_profile_id(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Email => self
                .email_profiles
                .iter()
                .find(|p| p.is_default)
                .map(|p| p.profile_id.as_str()),
            Channel::Sms => self
                .sms_profiles
                .iter()
                .find(|p| p.is_default)
                .map(|p| p.profile_id.as_str()),
        }
    }

    pub fn email_profile(&self, profile_id: &str) -> Option<&EmailProfile> {
        self.email_profiles.iter().find(|p| p.profile_id == profile_id)
    }

    pub fn sms_profile(&self, profile_id: &str) -> Option<&SmsProfile> {
        self.sms_profiles.iter().find(|p| p.profile_id == profile_id)
    }
}
