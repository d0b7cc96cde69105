use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use pinguin_core::{ClaimToken, NotificationId, TenantId};
use pinguin_senders::{OutboundMessage, SenderError, SenderFactory};
use pinguin_store::{Claim, NotificationStore};
use pinguin_tenant::TenantRegistry;

use crate::config::SchedulerConfig;

/// Claims due notifications across every active tenant and dispatches them
/// through the sender factory, retrying transient failures with backoff and
/// reclaiming work abandoned by crashed workers.
pub struct DispatchScheduler<S: NotificationStore> {
    store: Arc<S>,
    tenants: Arc<TenantRegistry>,
    senders: Arc<SenderFactory>,
    config: SchedulerConfig,
    semaphore: Arc<Semaphore>,
    cursor: AtomicUsize,
}

impl<S: NotificationStore + 'static> DispatchScheduler<S> {
    pub fn new(
        store: Arc<S>,
        tenants: Arc<TenantRegistry>,
        senders: Arc<SenderFactory>,
        config: SchedulerConfig,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_sends));
        Self {
            store,
            tenants,
            senders,
            config,
            semaphore,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Run the dispatch loop until `shutdown` is signaled, then drain any
    /// in-flight sends before returning.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut dispatch_ticker = interval(self.config.poll_interval);
        let mut recovery_ticker = interval(self.config.stale_claim_interval);
        let mut in_flight = JoinSet::new();

        info!("dispatch scheduler started");

        loop {
            tokio::select! {
                _ = dispatch_ticker.tick() => {
                    if let Err(e) = self.clone().dispatch_tick(&mut in_flight).await {
                        error!(error = %e, "dispatch tick failed");
                    }
                }
                _ = recovery_ticker.tick() => {
                    self.recover_stale_claims().await;
                }
                Some(result) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = result {
                        error!(error = %e, "dispatch task panicked");
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(in_flight = in_flight.len(), "dispatch scheduler shutting down, draining in-flight sends");
        while in_flight.join_next().await.is_some() {}
        info!("dispatch scheduler stopped");
    }

    /// One round: every active tenant gets a chance to have its due rows
    /// claimed, starting from a rotating cursor so no single tenant's
    /// backlog starves the others when `max_concurrent_sends` is the
    /// binding constraint.
    async fn dispatch_tick(self: Arc<Self>, in_flight: &mut JoinSet<()>) -> pinguin_store::Result<()> {
        let active = self.tenants.list_active();
        if active.is_empty() {
            return Ok(());
        }

        let start = self.cursor.fetch_add(1, Ordering::Relaxed) % active.len();
        let now = pinguin_core::now_utc();

        for offset in 0..active.len() {
            let tenant = active[(start + offset) % active.len()];
            let claims = self
                .store
                .claim_due(&tenant.tenant_id, now, self.config.batch_size, self.config.claim_lease)
                .await?;

            if claims.is_empty() {
                continue;
            }
            debug!(tenant_id = %tenant.tenant_id, count = claims.len(), "claimed due notifications");

            for claim in claims {
                let this = self.clone();
                let tenant_id = tenant.tenant_id.clone();
                let retry_policy = tenant.retry_policy.clone();
                let permit = self.semaphore.clone().acquire_owned().await.expect("semaphore not closed");

                in_flight.spawn(async move {
                    let _permit = permit;
                    this.process_claim(&tenant_id, claim, &retry_policy).await;
                });
            }
        }

        Ok(())
    }

    async fn process_claim(
        &self,
        tenant_id: &TenantId,
        claim: Claim,
        retry_policy: &pinguin_tenant::RetryPolicy,
    ) {
        let notification_id = claim.notification.notification_id.clone();
        let tenant = match self.tenants.get_by_id(tenant_id) {
            Ok(t) => t,
            Err(e) => {
                error!(%tenant_id, error = %e, "tenant vanished from registry mid-dispatch");
                return;
            }
        };

        let sender = match self.senders.get(tenant, claim.notification.channel, None).await {
            Ok(sender) => sender,
            Err(e) => {
                self.fail(
                    tenant_id,
                    &notification_id,
                    &claim.token,
                    &e,
                    claim.notification.attempts,
                    retry_policy,
                )
                .await;
                return;
            }
        };

        let message = OutboundMessage {
            recipient: &claim.notification.recipient,
            subject: claim.notification.subject.as_deref(),
            body: &claim.notification.body,
        };

        match sender.send(message).await {
            Ok(()) => {
                if let Err(e) = self
                    .store
                    .release_success(tenant_id, &notification_id, &claim.token)
                    .await
                {
                    warn!(%notification_id, error = %e, "failed to record successful send");
                } else {
                    info!(%notification_id, channel = %claim.notification.channel, "notification sent");
                }
            }
            Err(e) => {
                self.fail(
                    tenant_id,
                    &notification_id,
                    &claim.token,
                    &e,
                    claim.notification.attempts,
                    retry_policy,
                )
                .await;
            }
        }
    }

    /// Only a [`SenderError::Transient`] is worth retrying, and only while
    /// attempts remain under the tenant's cap — `Permanent` and `Config`
    /// failures go straight to a terminal `failed` with no `retry_at`.
    async fn fail(
        &self,
        tenant_id: &TenantId,
        notification_id: &NotificationId,
        token: &ClaimToken,
        error: &SenderError,
        attempts: u32,
        retry_policy: &pinguin_tenant::RetryPolicy,
    ) {
        let retry_at = match error {
            SenderError::Transient(_) if attempts + 1 < retry_policy.max_retries => {
                let backoff = pinguin_core::backoff(
                    attempts + 1,
                    time::Duration::seconds(retry_policy.backoff_base_secs as i64),
                    time::Duration::seconds(retry_policy.backoff_cap_secs as i64),
                );
                Some(pinguin_core::now_utc() + backoff)
            }
            _ => None,
        };

        let message = error.to_string();
        warn!(%notification_id, error = %message, retry_at = ?retry_at, "notification send failed");

        if let Err(e) = self
            .store
            .release_failure(tenant_id, notification_id, token, &message, retry_at)
            .await
        {
            error!(%notification_id, error = %e, "failed to record send failure");
        }
    }

    async fn recover_stale_claims(&self) {
        let now = pinguin_core::now_utc();
        match self.store.recover_stale_claims(now, self.config.claim_lease).await {
            Ok(0) => {}
            Ok(count) => info!(count, "recovered stale claims"),
            Err(e) => error!(error = %e, "failed to recover stale claims"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinguin_core::Channel;
    use pinguin_store::{InMemoryStore, NewNotification};
    use pinguin_tenant::{RetryPolicy, Tenant, TenantStatus};
    use pinguin_vault::{MasterKey, Vault};
    use std::collections::HashSet;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tenant_with_sms(vault: &Vault, base_url: String) -> Tenant {
        let credentials = pinguin_senders::SmsCredentials {
            api_base_url: base_url,
            account_id: "AC123".into(),
            auth_token: "secret".into(),
            from_number: "+15550000000".into(),
        };
        let ciphertext = vault.encrypt(&serde_json::to_string(&credentials).unwrap()).unwrap();

        Tenant {
            tenant_id: TenantId::new("acme"),
            display_name: "Acme".into(),
            status: TenantStatus::Active,
            domains: vec!["acme.example.com".into()],
            admin_emails: HashSet::new(),
            email_profiles: vec![],
            sms_profiles: vec![pinguin_tenant::SmsProfile {
                profile_id: "default".into(),
                tenant_id: TenantId::new("acme"),
                is_default: true,
                credentials_ciphertext: ciphertext,
                rate_hint_per_minute: None,
            }],
            retry_policy: RetryPolicy {
                max_retries: 3,
                backoff_base_secs: 1,
                backoff_cap_secs: 10,
            },
            max_attachment_bytes: 1024,
        }
    }

    async fn seed_notification(store: &InMemoryStore, tenant_id: &TenantId) {
        let now = pinguin_core::now_utc();
        store
            .create(
                tenant_id,
                NewNotification {
                    notification_id: NotificationId::new("n1"),
                    tenant_id: tenant_id.clone(),
                    channel: Channel::Sms,
                    recipient: "+15551234567".into(),
                    subject: None,
                    body: "hello".into(),
                    scheduled_for: now,
                    max_retries: 3,
                    attachments: vec![],
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn transient_failure_reschedules_with_backoff() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Messages"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let vault = Arc::new(Vault::new(MasterKey::generate()));
        let tenant = tenant_with_sms(&vault, server.uri());
        let tenant_id = tenant.tenant_id.clone();
        let registry = Arc::new(TenantRegistry::build(vec![tenant]).unwrap());
        let senders = Arc::new(SenderFactory::new(vault));
        let store = Arc::new(InMemoryStore::new());
        seed_notification(&store, &tenant_id).await;

        let scheduler = Arc::new(DispatchScheduler::new(
            store.clone(),
            registry.clone(),
            senders,
            SchedulerConfig {
                batch_size: 10,
                ..SchedulerConfig::default()
            },
        ));

        let mut in_flight = JoinSet::new();
        scheduler.clone().dispatch_tick(&mut in_flight).await.unwrap();
        while in_flight.join_next().await.is_some() {}

        let fetched = store.get(&tenant_id, &NotificationId::new("n1")).await.unwrap();
        assert_eq!(fetched.attempts, 1);
        assert_eq!(fetched.status, pinguin_core::NotificationStatus::Queued);
        assert!(fetched.last_error.is_some());
    }

    #[tokio::test]
    async fn permanent_failure_goes_straight_to_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Messages"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let vault = Arc::new(Vault::new(MasterKey::generate()));
        let tenant = tenant_with_sms(&vault, server.uri());
        let tenant_id = tenant.tenant_id.clone();
        let registry = Arc::new(TenantRegistry::build(vec![tenant]).unwrap());
        let senders = Arc::new(SenderFactory::new(vault));
        let store = Arc::new(InMemoryStore::new());
        seed_notification(&store, &tenant_id).await;

        let scheduler = Arc::new(DispatchScheduler::new(
            store.clone(),
            registry.clone(),
            senders,
            SchedulerConfig {
                batch_size: 10,
                ..SchedulerConfig::default()
            },
        ));

        let mut in_flight = JoinSet::new();
        scheduler.clone().dispatch_tick(&mut in_flight).await.unwrap();
        while in_flight.join_next().await.is_some() {}

        // Attempts (1) is far below max_retries (3), proving the terminal
        // outcome comes from the error classification, not the retry count.
        let fetched = store.get(&tenant_id, &NotificationId::new("n1")).await.unwrap();
        assert_eq!(fetched.attempts, 1);
        assert_eq!(fetched.status, pinguin_core::NotificationStatus::Failed);
        assert!(fetched.last_error.is_some());
    }
}
