use std::time::Duration;

/// Tunables for the dispatch loop, independent of any one tenant's retry
/// policy.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How often the scheduler wakes to claim and dispatch due notifications.
    pub poll_interval: Duration,
    /// Rows claimed per tenant per tick.
    pub batch_size: u32,
    /// How long a worker may hold a claim before it is eligible for recovery.
    pub claim_lease: time::Duration,
    /// How often `RecoverStaleClaims` runs, independent of the dispatch tick.
    pub stale_claim_interval: Duration,
    /// Upper bound on notifications being sent concurrently, across all tenants.
    pub max_concurrent_sends: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            batch_size: 20,
            claim_lease: time::Duration::minutes(5),
            stale_claim_interval: Duration::from_secs(60),
            max_concurrent_sends: 32,
        }
    }
}
