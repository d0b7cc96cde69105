//! Schema definitions for the tenant, profile, and notification tables.
//!
//! `sqlx-macros`' compile-time `migrate!` macro is not available here — it
//! pulls in the sqlite driver and conflicts with the `sqlx-postgres`-only
//! dependency set this crate uses. Schema is instead created idempotently
//! at startup with plain `CREATE TABLE IF NOT EXISTS` statements, the same
//! tradeoff the rest of this workspace's postgres backends make.

use sqlx_postgres::PgPool;
use tracing::info;

use crate::error::Result;

pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx_core::query::query(
        r#"
        CREATE TABLE IF NOT EXISTS tenants (
            tenant_id TEXT PRIMARY KEY,
            display_name TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            max_attachment_bytes BIGINT NOT NULL DEFAULT 10485760,
            max_retries INTEGER NOT NULL DEFAULT 5,
            backoff_base_secs BIGINT NOT NULL DEFAULT 60,
            backoff_cap_secs BIGINT NOT NULL DEFAULT 3600,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx_core::query::query(
        r#"
        CREATE TABLE IF NOT EXISTS tenant_domains (
            domain TEXT PRIMARY KEY,
            tenant_id TEXT NOT NULL REFERENCES tenants(tenant_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx_core::query::query(
        r#"
        CREATE TABLE IF NOT EXISTS tenant_admins (
            tenant_id TEXT NOT NULL REFERENCES tenants(tenant_id),
            email TEXT NOT NULL,
            PRIMARY KEY (tenant_id, email)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx_core::query::query(
        r#"
        CREATE TABLE IF NOT EXISTS email_profiles (
            profile_id TEXT NOT NULL,
            tenant_id TEXT NOT NULL REFERENCES tenants(tenant_id),
            is_default BOOLEAN NOT NULL DEFAULT FALSE,
            credentials_ciphertext TEXT NOT NULL,
            rate_hint_per_minute INTEGER,
            PRIMARY KEY (tenant_id, profile_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx_core::query::query(
        r#"
        CREATE TABLE IF NOT EXISTS sms_profiles (
            profile_id TEXT NOT NULL,
            tenant_id TEXT NOT NULL REFERENCES tenants(tenant_id),
            is_default BOOLEAN NOT NULL DEFAULT FALSE,
            credentials_ciphertext TEXT NOT NULL,
            rate_hint_per_minute INTEGER,
            PRIMARY KEY (tenant_id, profile_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx_core::query::query(
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            notification_id TEXT NOT NULL,
            tenant_id TEXT NOT NULL,
            channel TEXT NOT NULL,
            recipient TEXT NOT NULL,
            subject TEXT,
            body TEXT NOT NULL,
            scheduled_for TIMESTAMPTZ NOT NULL,
            status TEXT NOT NULL DEFAULT 'queued',
            attempts INTEGER NOT NULL DEFAULT 0,
            max_retries INTEGER NOT NULL DEFAULT 5,
            last_error TEXT,
            claimed_at TIMESTAMPTZ,
            claim_token TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (tenant_id, notification_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx_core::query::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_notifications_due
            ON notifications (tenant_id, scheduled_for)
            WHERE status = 'queued'
        "#,
    )
    .execute(pool)
    .await?;

    sqlx_core::query::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_notifications_in_flight
            ON notifications (claimed_at)
            WHERE status = 'in_flight'
        "#,
    )
    .execute(pool)
    .await?;

    sqlx_core::query::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_notifications_tenant_created
            ON notifications (tenant_id, created_at DESC)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx_core::query::query(
        r#"
        CREATE TABLE IF NOT EXISTS notification_attachments (
            attachment_id TEXT PRIMARY KEY,
            notification_id TEXT NOT NULL,
            tenant_id TEXT NOT NULL,
            filename TEXT NOT NULL,
            content_type TEXT NOT NULL,
            payload_bytes BYTEA NOT NULL,
            FOREIGN KEY (tenant_id, notification_id)
                REFERENCES notifications (tenant_id, notification_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("notification store schema ready");
    Ok(())
}
