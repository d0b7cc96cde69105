//! PostgreSQL implementation of [`NotificationStore`].

use async_trait::async_trait;
use sqlx_postgres::PgPool;
use time::OffsetDateTime;
use tracing::{debug, instrument};

use pinguin_core::{Channel, ClaimToken, NotificationId, NotificationStatus, TenantId};
use pinguin_store::{
    Claim, ListFilter, NewNotification, Notification, NotificationStore, Result, StoreError,
};

use crate::schema;

#[derive(Clone)]
pub struct PostgresNotificationStore {
    pool: PgPool,
}

type Row = (
    String,
    String,
    String,
    String,
    Option<String>,
    String,
    OffsetDateTime,
    String,
    i32,
    i32,
    Option<String>,
    Option<OffsetDateTime>,
    Option<String>,
    OffsetDateTime,
    OffsetDateTime,
);

impl PostgresNotificationStore {
    pub async fn connect(pool: PgPool) -> Result<Self> {
        schema::ensure_schema(&pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(Self { pool })
    }

    fn row_to_notification(row: Row) -> Notification {
        let (
            notification_id,
            tenant_id,
            channel,
            recipient,
            subject,
            body,
            scheduled_for,
            status,
            attempts,
            max_retries,
            last_error,
            claimed_at,
            claim_token,
            created_at,
            updated_at,
        ) = row;

        Notification {
            notification_id: NotificationId::new(notification_id),
            tenant_id: TenantId::new(tenant_id),
            channel: channel.parse::<Channel>().unwrap_or(Channel::Email),
            recipient,
            subject,
            body,
            scheduled_for,
            status: status.parse::<NotificationStatus>().unwrap_or(NotificationStatus::Queued),
            attempts: attempts as u32,
            max_retries: max_retries as u32,
            last_error,
            claimed_at,
            claim_token: claim_token.map(ClaimToken::new),
            created_at,
            updated_at,
        }
    }
}

#[async_trait]
impl NotificationStore for PostgresNotificationStore {
    #[instrument(skip(self, new))]
    async fn create(&self, tenant_id: &TenantId, new: NewNotification) -> Result<Notification> {
        let now = pinguin_core::now_utc();

        let existing_attachments = new.attachments;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let inserted = sqlx_core::query::query(
            r#"
            INSERT INTO notifications (
                notification_id, tenant_id, channel, recipient, subject, body,
                scheduled_for, status, attempts, max_retries, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, 'queued', 0, $8, $9, $9)
            ON CONFLICT (tenant_id, notification_id) DO NOTHING
            "#,
        )
        .bind(new.notification_id.as_str())
        .bind(tenant_id.as_str())
        .bind(new.channel.as_str())
        .bind(&new.recipient)
        .bind(&new.subject)
        .bind(&new.body)
        .bind(new.scheduled_for)
        .bind(new.max_retries as i32)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        if inserted.rows_affected() == 0 {
            return Err(StoreError::DuplicateId(new.notification_id.to_string()));
        }

        for (i, attachment) in existing_attachments.into_iter().enumerate() {
            sqlx_core::query::query(
                r#"
                INSERT INTO notification_attachments
                    (attachment_id, notification_id, tenant_id, filename, content_type, payload_bytes)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(format!("{}-att-{i}", new.notification_id))
            .bind(new.notification_id.as_str())
            .bind(tenant_id.as_str())
            .bind(&attachment.filename)
            .bind(&attachment.content_type)
            .bind(&attachment.payload_bytes)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        }

        tx.commit().await.map_err(|e| StoreError::Database(e.to_string()))?;
        debug!(notification_id = %new.notification_id, "notification created");
        self.get(tenant_id, &new.notification_id).await
    }

    async fn get(&self, tenant_id: &TenantId, notification_id: &NotificationId) -> Result<Notification> {
        let row: Option<Row> = sqlx_core::query_as::query_as(
            r#"
            SELECT notification_id, tenant_id, channel, recipient, subject, body,
                   scheduled_for, status, attempts, max_retries, last_error,
                   claimed_at, claim_token, created_at, updated_at
            FROM notifications WHERE tenant_id = $1 AND notification_id = $2
            "#,
        )
        .bind(tenant_id.as_str())
        .bind(notification_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        row.map(Self::row_to_notification)
            .ok_or_else(|| StoreError::NotFound(notification_id.to_string()))
    }

    async fn list(&self, tenant_id: &TenantId, filter: ListFilter) -> Result<Vec<Notification>> {
        let statuses: Option<Vec<String>> = filter
            .statuses
            .map(|ss| ss.into_iter().map(|s| s.as_str().to_string()).collect());
        let limit = if filter.limit == 0 { i64::MAX } else { filter.limit as i64 };

        let rows: Vec<Row> = sqlx_core::query_as::query_as(
            r#"
            SELECT notification_id, tenant_id, channel, recipient, subject, body,
                   scheduled_for, status, attempts, max_retries, last_error,
                   claimed_at, claim_token, created_at, updated_at
            FROM notifications
            WHERE tenant_id = $1 AND ($2::text[] IS NULL OR status = ANY($2))
            ORDER BY created_at DESC, notification_id ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(tenant_id.as_str())
        .bind(statuses)
        .bind(limit)
        .bind(filter.offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Self::row_to_notification).collect())
    }

    #[instrument(skip(self))]
    async fn claim_due(
        &self,
        tenant_id: &TenantId,
        now: OffsetDateTime,
        limit: u32,
        _lease: time::Duration,
    ) -> Result<Vec<Claim>> {
        let rows: Vec<Row> = sqlx_core::query_as::query_as(
            r#"
            WITH due AS (
                SELECT notification_id FROM notifications
                WHERE tenant_id = $1 AND status = 'queued' AND scheduled_for <= $2
                ORDER BY scheduled_for ASC, notification_id ASC
                LIMIT $3
                FOR UPDATE SKIP LOCKED
            )
            UPDATE notifications n
            SET status = 'in_flight',
                claimed_at = $2,
                claim_token = gen_random_uuid()::text,
                updated_at = $2
            FROM due
            WHERE n.tenant_id = $1 AND n.notification_id = due.notification_id
            RETURNING n.notification_id, n.tenant_id, n.channel, n.recipient, n.subject, n.body,
                      n.scheduled_for, n.status, n.attempts, n.max_retries, n.last_error,
                      n.claimed_at, n.claim_token, n.created_at, n.updated_at
            "#,
        )
        .bind(tenant_id.as_str())
        .bind(now)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut claims: Vec<Claim> = rows.into_iter().map(Self::row_to_notification).map(|n| {
            let token = n.claim_token.clone().unwrap_or_else(ClaimToken::generate);
            Claim { notification: n, token }
        }).collect();
        claims.sort_by(|a, b| {
            a.notification
                .scheduled_for
                .cmp(&b.notification.scheduled_for)
                .then_with(|| a.notification.notification_id.as_str().cmp(b.notification.notification_id.as_str()))
        });
        Ok(claims)
    }

    async fn release_success(
        &self,
        tenant_id: &TenantId,
        notification_id: &NotificationId,
        token: &ClaimToken,
    ) -> Result<()> {
        sqlx_core::query::query(
            r#"
            UPDATE notifications
            SET status = 'sent', attempts = attempts + 1, last_error = NULL,
                claimed_at = NULL, claim_token = NULL, updated_at = $4
            WHERE tenant_id = $1 AND notification_id = $2 AND claim_token = $3
            "#,
        )
        .bind(tenant_id.as_str())
        .bind(notification_id.as_str())
        .bind(token.as_str())
        .bind(pinguin_core::now_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;
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
        let now = pinguin_core::now_utc();
        match retry_at {
            Some(when) => {
                sqlx_core::query::query(
                    r#"
                    UPDATE notifications
                    SET status = CASE WHEN attempts + 1 < max_retries THEN 'queued' ELSE 'failed' END,
                        scheduled_for = CASE WHEN attempts + 1 < max_retries THEN $5 ELSE scheduled_for END,
                        attempts = attempts + 1,
                        last_error = $4,
                        claimed_at = NULL,
                        claim_token = NULL,
                        updated_at = $6
                    WHERE tenant_id = $1 AND notification_id = $2 AND claim_token = $3
                    "#,
                )
                .bind(tenant_id.as_str())
                .bind(notification_id.as_str())
                .bind(token.as_str())
                .bind(truncate_error(error))
                .bind(when)
                .bind(now)
                .execute(&self.pool)
                .await
            }
            None => {
                sqlx_core::query::query(
                    r#"
                    UPDATE notifications
                    SET status = 'failed', attempts = attempts + 1, last_error = $4,
                        claimed_at = NULL, claim_token = NULL, updated_at = $5
                    WHERE tenant_id = $1 AND notification_id = $2 AND claim_token = $3
                    "#,
                )
                .bind(tenant_id.as_str())
                .bind(notification_id.as_str())
                .bind(token.as_str())
                .bind(truncate_error(error))
                .bind(now)
                .execute(&self.pool)
                .await
            }
        }
        .map_err(|e| StoreError::Database(e.to_string()))?;
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

        let existing = self.get(tenant_id, notification_id).await?;
        if existing.status != NotificationStatus::Queued {
            return Err(StoreError::NotEditable(notification_id.to_string()));
        }

        sqlx_core::query::query(
            r#"
            UPDATE notifications SET scheduled_for = $3, updated_at = $4
            WHERE tenant_id = $1 AND notification_id = $2 AND status = 'queued'
            "#,
        )
        .bind(tenant_id.as_str())
        .bind(notification_id.as_str())
        .bind(when)
        .bind(pinguin_core::now_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        self.get(tenant_id, notification_id).await
    }

    async fn cancel(&self, tenant_id: &TenantId, notification_id: &NotificationId) -> Result<Notification> {
        let existing = self.get(tenant_id, notification_id).await?;
        if existing.status != NotificationStatus::Queued {
            return Err(StoreError::NotEditable(notification_id.to_string()));
        }

        sqlx_core::query::query(
            r#"
            UPDATE notifications SET status = 'canceled', updated_at = $3
            WHERE tenant_id = $1 AND notification_id = $2 AND status = 'queued'
            "#,
        )
        .bind(tenant_id.as_str())
        .bind(notification_id.as_str())
        .bind(pinguin_core::now_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        self.get(tenant_id, notification_id).await
    }

    async fn recover_stale_claims(&self, now: OffsetDateTime, lease: time::Duration) -> Result<u32> {
        let cutoff = now - lease;
        let result = sqlx_core::query::query(
            r#"
            UPDATE notifications
            SET status = 'queued', claimed_at = NULL, claim_token = NULL, updated_at = $1
            WHERE status = 'in_flight' AND claimed_at < $2
            "#,
        )
        .bind(now)
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(result.rows_affected() as u32)
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
