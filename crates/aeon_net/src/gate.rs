//! # Safety-Cap Gate
//!
//! A per-shard daily request budget protecting the host from runaway
//! cost. Every inbound request increments the counter; past the ceiling,
//! requests are rejected at the transport boundary until the counter
//! resets at UTC day rollover.

/// The distinct message carried by a service-limit rejection.
pub const SERVICE_LIMIT_MSG: &str = "Service limit reached. Come back tomorrow.";

/// Milliseconds per UTC day.
const DAY_MS: u64 = 86_400_000;

/// Daily request counter with a hard ceiling.
#[derive(Clone, Debug)]
pub struct SafetyGate {
    cap: u32,
    count: u32,
    day: u64,
}

impl SafetyGate {
    /// Creates a gate with the given daily ceiling.
    #[must_use]
    pub fn new(cap: u32) -> Self {
        Self { cap, count: 0, day: 0 }
    }

    /// Counts one request at `now_ms` (Unix epoch milliseconds).
    ///
    /// Returns `true` while the budget holds. The counter resets when the
    /// UTC day of `now_ms` differs from the last request's.
    pub fn admit(&mut self, now_ms: u64) -> bool {
        let day = now_ms / DAY_MS;
        if day != self.day {
            if self.count > self.cap {
                tracing::info!(day, "safety gate reset after limit day");
            }
            self.day = day;
            self.count = 0;
        }
        self.count += 1;
        if self.count > self.cap {
            tracing::warn!(count = self.count, cap = self.cap, "safety gate rejecting");
            return false;
        }
        true
    }

    /// Requests counted so far today.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_up_to_cap_then_rejects() {
        let mut gate = SafetyGate::new(3);
        assert!(gate.admit(1_000));
        assert!(gate.admit(1_001));
        assert!(gate.admit(1_002));
        assert!(!gate.admit(1_003), "request cap+1 is rejected");
        assert!(!gate.admit(1_004));
    }

    #[test]
    fn test_resets_at_utc_day_rollover() {
        let mut gate = SafetyGate::new(1);
        assert!(gate.admit(10));
        assert!(!gate.admit(20));
        // Next UTC day.
        assert!(gate.admit(DAY_MS + 1));
        assert!(!gate.admit(DAY_MS + 2));
    }

    #[test]
    fn test_same_day_never_resets() {
        let mut gate = SafetyGate::new(1);
        assert!(gate.admit(0));
        assert!(!gate.admit(DAY_MS - 1), "one millisecond short of rollover");
    }
}
