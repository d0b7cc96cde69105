use pinguin_core::{Channel, NotificationStatus};
use pinguin_store::Notification;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Wire representation of a notification for the admin API. Deliberately
/// omits `claim_token` — an internal concurrency-control detail operators
/// have no use for and should not be able to replay.
#[derive(Debug, Serialize)]
pub struct NotificationDto {
    pub notification_id: String,
    pub tenant_id: String,
    pub channel: Channel,
    pub recipient: String,
    pub subject: Option<String>,
    pub status: NotificationStatus,
    pub attempts: u32,
    pub max_retries: u32,
    pub last_error: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_for: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Notification> for NotificationDto {
    fn from(n: Notification) -> Self {
        Self {
            notification_id: n.notification_id.to_string(),
            tenant_id: n.tenant_id.to_string(),
            channel: n.channel,
            recipient: n.recipient,
            subject: n.subject,
            status: n.status,
            attempts: n.attempts,
            max_retries: n.max_retries,
            last_error: n.last_error,
            scheduled_for: n.scheduled_for,
            created_at: n.created_at,
            updated_at: n.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RuntimeConfigResponse {
    #[serde(rename = "apiBaseUrl")]
    pub api_base_url: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub notifications: Vec<NotificationDto>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_time: OffsetDateTime,
}
