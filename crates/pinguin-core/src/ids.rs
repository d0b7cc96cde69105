use serde::{Deserialize, Serialize};
use std::fmt;

/// A tenant's stable identifier — a lowercase slug, unique across the system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A notification identifier, unique per `(tenant_id, notification_id)`.
/// Client-supplied or server-generated via [`generate_notification_id`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NotificationId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Generate a fresh server-assigned notification id.
pub fn generate_notification_id() -> NotificationId {
    NotificationId::new(uuid::Uuid::new_v4().to_string())
}

/// An opaque token minted by `ClaimDue`, proving a worker's exclusive right
/// to act on a claimed notification for the duration of the lease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimToken(String);

impl ClaimToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ClaimToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_id_lowercases() {
        assert_eq!(TenantId::new("ACME").as_str(), "acme");
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = generate_notification_id();
        let b = generate_notification_id();
        assert_ne!(a, b);
    }

    #[test]
    fn claim_tokens_are_unique() {
        assert_ne!(ClaimToken::generate(), ClaimToken::generate());
    }
}
