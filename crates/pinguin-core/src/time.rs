use time::OffsetDateTime;

/// The current wall-clock time. Centralized so tests and the scheduler share
/// one notion of "now" and so it is easy to find every call site that treats
/// time as ambient mutable state.
pub fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Exponential backoff with jitter for transient-failure retries.
///
/// `attempt` is 1-based (the attempt number that just failed). Grows as
/// `base * 2^(attempt-1)`, capped at `cap`, then jittered by up to ±25%.
pub fn backoff(attempt: u32, base: time::Duration, cap: time::Duration) -> time::Duration {
    let exp = attempt.saturating_sub(1).min(20);
    let scaled = base.checked_mul(1i32 << exp).unwrap_or(cap);
    let capped = if scaled > cap { cap } else { scaled };

    let jitter_frac = deterministic_jitter(attempt);
    let jitter = capped.checked_mul(1).unwrap_or(capped) / 4;
    let signed_jitter = (jitter.whole_nanoseconds() as f64 * jitter_frac) as i64;
    capped + time::Duration::nanoseconds(signed_jitter)
}

/// A cheap, deterministic pseudo-jitter in `[-1.0, 1.0]` derived from the
/// attempt number.
fn deterministic_jitter(seed: u32) -> f64 {
    let x = seed.wrapping_mul(2654435761).wrapping_add(1);
    let normalized = (x % 2001) as f64 / 1000.0 - 1.0;
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn backoff_grows_with_attempt() {
        let base = Duration::seconds(1);
        let cap = Duration::seconds(1000);
        let b1 = backoff(1, base, cap).whole_milliseconds();
        let b2 = backoff(2, base, cap).whole_milliseconds();
        let b3 = backoff(3, base, cap).whole_milliseconds();
        assert!(b2 > b1 / 2);
        assert!(b3 > b2 / 2);
    }

    #[test]
    fn backoff_respects_cap() {
        let base = Duration::seconds(1);
        let cap = Duration::seconds(60);
        let b = backoff(30, base, cap);
        assert!(b <= cap + cap / 4);
    }

    #[test]
    fn jitter_is_bounded() {
        for seed in 0..50 {
            let j = deterministic_jitter(seed);
            assert!((-1.0..=1.0).contains(&j));
        }
    }
}
