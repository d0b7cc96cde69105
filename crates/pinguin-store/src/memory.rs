//! An in-memory `NotificationStore`, standing in for a real database in unit
//! and scheduler tests. Not used in production — `pinguin-store-postgres`
//! is the production backend.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use pinguin_core::{ClaimToken, NotificationId, NotificationStatus, TenantId};

use crate::error::{Result, StoreError};
use crate::store::NotificationStore;
use crate::types::{Claim, ListFilter, NewNotification, Notification, NotificationAttachment};

type Key = (TenantId, NotificationId);

#[derive(Default)]
struct Inner {
    notifications: HashMap<Key, Notification>,
    attachments: HashMap<Key, Vec<NotificationAttachment>>,
}

pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn create(&self, tenant_id: &TenantId, new: NewNotification) -> Result<Notification> {
        let mut inner = self.inner.lock().unwrap();
        let key = (tenant_id.clone(), new.notification_id.clone());
        if inner.notifications.contains_key(&key) {
            return Err(StoreError::DuplicateId(new.notification_id.to_string()));
        }

        let now = pinguin_core::now_utc();
        let notification = Notification {
            notification_id: new.notification_id.clone(),
            tenant_id: tenant_id.clone(),
            channel: new.channel,
            recipient: new.recipient,
            subject: new.subject,
            body: new.body,
            scheduled_for: new.scheduled_for,
            status: NotificationStatus::Queued,
            attempts: 0,
            max_retries: new.max_retries,
            last_error: None,
            claimed_at: None,
            claim_token: None,
            created_at: now,
            updated_at: now,
        };

        let attachments = new
            .attachments
            .into_iter()
            .enumerate()
            .map(|(i, a)| NotificationAttachment {
                attachment_id: format!("{}-att-{i}", notification.notification_id),
                notification_id: notification.notification_id.clone(),
                tenant_id: tenant_id.clone(),
                filename: a.filename,
                content_type: a.content_type,
                payload_bytes: a.payload_bytes,
            })
            .collect();

        inner.notifications.insert(key.clone(), notification.clone());
        inner.attachments.insert(key, attachments);
        Ok(notification)
    }

    async fn get(&self, tenant_id: &TenantId, notification_id: &NotificationId) -> Result<Notification> {
        let inner = self.inner.lock().unwrap();
        inner
            .notifications
            .get(&(tenant_id.clone(), notification_id.clone()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(notification_id.to_string()))
    }

    async fn list(&self, tenant_id: &TenantId, filter: ListFilter) -> Result<Vec<Notification>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Notification> = inner
            .notifications
            .values()
            .filter(|n| &n.tenant_id == tenant_id)
            .filter(|n| {
                filter
                    .statuses
                    .as_ref()
                    .is_none_or(|statuses| statuses.contains(&n.status))
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.notification_id.as_str().cmp(b.notification_id.as_str()))
        });

        let limit = if filter.limit == 0 { rows.len() as u32 } else { filter.limit };
        let rows = rows
            .into_iter()
            .skip(filter.offset as usize)
            .take(limit as usize)
            .collect();
        Ok(rows)
    }

    async fn claim_due(
        &self,
        tenant_id: &TenantId,
        now: OffsetDateTime,
        limit: u32,
        _lease: time::Duration,
    ) -> Result<Vec<Claim>> {
        let mut inner = self.inner.lock().unwrap();

        let mut due_keys: Vec<Key> = inner
            .notifications
            .values()
            .filter(|n| {
                &n.tenant_id == tenant_id && n.status == NotificationStatus::Queued && n.scheduled_for <= now
            })
            .map(|n| (n.tenant_id.clone(), n.notification_id.clone()))
            .collect();

        due_keys.sort_by(|a, b| {
            let na = &inner.notifications[a];
            let nb = &inner.notifications[b];
            na.scheduled_for
                .cmp(&nb.scheduled_for)
                .then_with(|| na.notification_id.as_str().cmp(nb.notification_id.as_str()))
        });
        due_keys.truncate(limit as usize);

        let mut claims = Vec::with_capacity(due_keys.len());
        for key in due_keys {
            let notification = inner.notifications.get_mut(&key).unwrap();
            let token = ClaimToken::generate();
            notification.status = NotificationStatus::InFlight;
            notification.claimed_at = Some(now);
            notification.claim_token = Some(token.clone());
            notification.updated_at = now;
            claims.push(Claim {
                notification: notification.clone(),
                token,
            });
        }

        Ok(claims)
    }

    async fn release_success(
        &self,
        tenant_id: &TenantId,
        notification_id: &NotificationId,
        token: &ClaimToken,
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let key = (tenant_id.clone(), notification_id.clone());
        let Some(notification) = inner.notifications.get_mut(&key) else {
            return Err(StoreError::NotFound(notification_id.to_string()));
        };

        if notification.claim_token.as_ref() != Some(token) {
            return Ok(());
        }

        notification.status = NotificationStatus::Sent;
        notification.attempts += 1;
        notification.last_error = None;
        notification.claimed_at = None;
        notification.claim_token = None;
        notification.updated_at = pinguin_core::now_utc();
        Ok(())
    }

    async fn release_failure(
        &self,
        tenant_id: &TenantId,
        notification_id: &NotificationId,
        token: &ClaimToken,
        error: &str,
        retry_at: Option<OffsetDateTime>,
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let key = (tenant_id.clone(), notification_id.clone());
        let Some(notification) = inner.notifications.get_mut(&key) else {
            return Err(StoreError::NotFound(notification_id.to_string()));
        };

        if notification.claim_token.as_ref() != Some(token) {
            return Ok(());
        }

        let next_attempts = notification.attempts + 1;
        notification.last_error = Some(truncate_error(error));
        notification.claimed_at = None;
        notification.claim_token = None;
        notification.updated_at = pinguin_core::now_utc();

        match retry_at {
            Some(when) if next_attempts < notification.max_retries => {
                notification.status = NotificationStatus::Queued;
                notification.scheduled_for = when;
                notification.attempts = next_attempts;
            }
            _ => {
                notification.status = NotificationStatus::Failed;
                notification.attempts = next_attempts;
            }
        }

        Ok(())
    }

    async fn reschedule(
        &self,
        tenant_id: &TenantId,
        notification_id: &NotificationId,
        when: OffsetDateTime,
    ) -> Result<Notification> {
        if when <= pinguin_core::now_utc() {
            return Err(StoreError::InPast);
        }

        let mut inner = self.inner.lock().unwrap();
        let key = (tenant_id.clone(), notification_id.clone());
        let notification = inner
            .notifications
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound(notification_id.to_string()))?;

        if notification.status != NotificationStatus::Queued {
            return Err(StoreError::NotEditable(notification_id.to_string()));
        }

        notification.scheduled_for = when;
        notification.updated_at = pinguin_core::now_utc();
        Ok(notification.clone())
    }

    async fn cancel(&self, tenant_id: &TenantId, notification_id: &NotificationId) -> Result<Notification> {
        let mut inner = self.inner.lock().unwrap();
        let key = (tenant_id.clone(), notification_id.clone());
        let notification = inner
            .notifications
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound(notification_id.to_string()))?;

        if notification.status != NotificationStatus::Queued {
            return Err(StoreError::NotEditable(notification_id.to_string()));
        }

        notification.status = NotificationStatus::Canceled;
        notification.updated_at = pinguin_core::now_utc();
        Ok(notification.clone())
    }

    async fn recover_stale_claims(&self, now: OffsetDateTime, lease: time::Duration) -> Result<u32> {
        let mut inner = self.inner.lock().unwrap();
        let mut recovered = 0u32;
        for notification in inner.notifications.values_mut() {
            if notification.status == NotificationStatus::InFlight
                && !notification.has_live_claim(now, lease)
            {
                notification.status = NotificationStatus::Queued;
                notification.claimed_at = None;
                notification.claim_token = None;
                notification.updated_at = now;
                recovered += 1;
            }
        }
        Ok(recovered)
    }
}

fn truncate_error(error: &str) -> String {
    const MAX_LEN: usize = 1024;
    if error.len() <= MAX_LEN {
        error.to_string()
    } else {
        format!("{}...", &error[..MAX_LEN])
    }
}
