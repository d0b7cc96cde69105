use pinguin_core::{Channel, ClaimToken, NotificationId, NotificationStatus, TenantId};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A notification to be delivered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: NotificationId,
    pub tenant_id: TenantId,
    pub channel: Channel,
    pub recipient: String,
    pub subject: Option<String>,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_for: OffsetDateTime,
    pub status: NotificationStatus,
    pub attempts: u32,
    pub max_retries: u32,
    pub last_error: Option<String>,
    pub claimed_at: Option<OffsetDateTime>,
    pub claim_token: Option<ClaimToken>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Notification {
    /// Whether a claim is live — `status = in_flight` and the claim has not
    /// yet expired.
    pub fn has_live_claim(&self, now: OffsetDateTime, claim_lease: time::Duration) -> bool {
        self.status == NotificationStatus::InFlight
            && self
                .claimed_at
                .is_some_and(|claimed_at| claimed_at + claim_lease > now)
    }
}

/// An email attachment belonging to a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationAttachment {
    pub attachment_id: String,
    pub notification_id: NotificationId,
    pub tenant_id: TenantId,
    pub filename: String,
    pub content_type: String,
    pub payload_bytes: Vec<u8>,
}

/// A row returned by `ClaimDue`, pairing the notification with the fresh
/// claim token the store minted for it.
#[derive(Debug, Clone)]
pub struct Claim {
    pub notification: Notification,
    pub token: ClaimToken,
}

/// Optional filter for `List`.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub statuses: Option<Vec<NotificationStatus>>,
    pub limit: u32,
    pub offset: u32,
}

impl ListFilter {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            statuses: None,
            limit,
            offset: 0,
        }
    }
}

/// A notification create request plus its attachments, as submitted by a
/// facade after validation.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub notification_id: NotificationId,
    pub tenant_id: TenantId,
    pub channel: Channel,
    pub recipient: String,
    pub subject: Option<String>,
    pub body: String,
    pub scheduled_for: OffsetDateTime,
    pub max_retries: u32,
    pub attachments: Vec<NewAttachment>,
}

#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub filename: String,
    pub content_type: String,
    pub payload_bytes: Vec<u8>,
}
