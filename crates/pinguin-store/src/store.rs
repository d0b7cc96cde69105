use async_trait::async_trait;
use time::OffsetDateTime;

use pinguin_core::{ClaimToken, NotificationId, TenantId};

use crate::error::Result;
use crate::types::{Claim, ListFilter, NewNotification, Notification};

/// The notification store contract.
///
/// The store is the only component that touches the database; every
/// operation is tenant-scoped — implementations MUST filter every query by
/// `tenant_id` and callers MUST NOT bypass this trait to reach the database
/// directly.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persist a new notification (and its attachments) with
    /// `status = queued`, `attempts = 0`. Unique on `(tenant_id,
    /// notification_id)`; the row is visible to subsequent reads once this
    /// returns.
    async fn create(&self, tenant_id: &TenantId, new: NewNotification) -> Result<Notification>;

    async fn get(&self, tenant_id: &TenantId, notification_id: &NotificationId) -> Result<Notification>;

    /// List notifications for a tenant, ordered by `created_at desc,
    /// notification_id`.
    async fn list(&self, tenant_id: &TenantId, filter: ListFilter) -> Result<Vec<Notification>>;

    /// Atomically move up to `limit` rows from `queued` with
    /// `scheduled_for <= now` into `in_flight`, minting a fresh claim token
    /// per row. Returned in `(scheduled_for asc, notification_id asc)` order.
    async fn claim_due(
        &self,
        tenant_id: &TenantId,
        now: OffsetDateTime,
        limit: u32,
        lease: time::Duration,
    ) -> Result<Vec<Claim>>;

    /// Release a claim as a success: `status = sent`, claim fields cleared.
    /// A token mismatch (claim stolen after lease expiry) is a silent no-op,
    /// not an error the caller acts on beyond logging.
    async fn release_success(
        &self,
        tenant_id: &TenantId,
        notification_id: &NotificationId,
        token: &ClaimToken,
    ) -> Result<()>;

    /// Release a claim as a failure. If `retry_at` is `Some` and
    /// `attempts + 1 < max_retries`, requeues with the new `scheduled_for`;
    /// otherwise marks terminal `failed`.
    async fn release_failure(
        &self,
        tenant_id: &TenantId,
        notification_id: &NotificationId,
        token: &ClaimToken,
        error: &str,
        retry_at: Option<OffsetDateTime>,
    ) -> Result<()>;

    /// Reschedule a queued notification. Fails with `NotEditable` if the
    /// current status isn't `queued`, `InPast` if `when` is not in the
    /// future.
    async fn reschedule(
        &self,
        tenant_id: &TenantId,
        notification_id: &NotificationId,
        when: OffsetDateTime,
    ) -> Result<Notification>;

    /// Cancel a queued notification. Fails with `NotEditable` otherwise.
    async fn cancel(&self, tenant_id: &TenantId, notification_id: &NotificationId) -> Result<Notification>;

    /// Return rows stuck `in_flight` past their lease to `queued`, without
    /// incrementing `attempts`. Not tenant-scoped — a crashed worker could
    /// have held claims across any tenant it was servicing.
    async fn recover_stale_claims(&self, now: OffsetDateTime, lease: time::Duration) -> Result<u32>;
}
