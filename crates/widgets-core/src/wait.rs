use std::time::Duration;

/// Default pause between table status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default number of status checks before giving up (one minute at the
/// default interval).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 120;

/// Delays are constant from this attempt on: the doubling factor saturates
/// at `u32::MAX`.
const GROWTH_STEPS: u32 = 33;

/// How the pause between status checks grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Always wait the base interval.
    Fixed,
    /// Double the interval after every check, up to `max_delay`.
    Exponential { max_delay: Duration },
}

/// Bounds the readiness poll: how long to sleep between status checks and
/// how many checks to make before reporting the table as not active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::Fixed,
        }
    }
}

impl WaitPolicy {
    /// Fixed-interval policy.
    pub fn fixed(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            backoff: Backoff::Fixed,
        }
    }

    /// Delay before the given status check (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.interval,
            Backoff::Exponential { max_delay } => {
                let factor = 1u32
                    .checked_shl(attempt.saturating_sub(1))
                    .unwrap_or(u32::MAX);
                self.interval.saturating_mul(factor).min(max_delay)
            }
        }
    }

    /// Upper bound on the total time spent sleeping.
    pub fn max_total_delay(&self) -> Duration {
        let growing = self.max_attempts.min(GROWTH_STEPS);
        let head = (1..=growing)
            .map(|attempt| self.delay_for(attempt))
            .fold(Duration::ZERO, Duration::saturating_add);
        let tail = self
            .delay_for(GROWTH_STEPS)
            .saturating_mul(self.max_attempts - growing);
        head.saturating_add(tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_polls_every_half_second() {
        let policy = WaitPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(50), Duration::from_millis(500));
        assert_eq!(policy.max_total_delay(), Duration::from_secs(60));
    }

    #[test]
    fn exponential_doubles_until_capped() {
        let policy = WaitPolicy {
            interval: Duration::from_millis(500),
            max_attempts: 6,
            backoff: Backoff::Exponential {
                max_delay: Duration::from_secs(5),
            },
        };
        let delays: Vec<_> = (1..=6).map(|a| policy.delay_for(a)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(500),
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(5),
                Duration::from_secs(5),
            ]
        );
    }

    #[test]
    fn exponential_does_not_overflow() {
        let policy = WaitPolicy {
            interval: Duration::from_secs(1),
            max_attempts: 100,
            backoff: Backoff::Exponential {
                max_delay: Duration::from_secs(30),
            },
        };
        assert_eq!(policy.delay_for(64), Duration::from_secs(30));
    }

    #[test]
    fn exponential_total_adds_capped_tail() {
        let policy = WaitPolicy {
            interval: Duration::from_millis(500),
            max_attempts: 6,
            backoff: Backoff::Exponential {
                max_delay: Duration::from_secs(5),
            },
        };
        // 0.5 + 1 + 2 + 4 + 5 + 5
        assert_eq!(policy.max_total_delay(), Duration::from_millis(17_500));
    }

    #[test]
    fn total_delay_for_huge_attempt_counts_is_closed_form() {
        let fixed = WaitPolicy::fixed(Duration::from_millis(500), u32::MAX);
        assert_eq!(
            fixed.max_total_delay(),
            Duration::from_millis(500) * u32::MAX
        );

        let exponential = WaitPolicy {
            interval: Duration::from_millis(500),
            max_attempts: u32::MAX,
            backoff: Backoff::Exponential {
                max_delay: Duration::from_secs(5),
            },
        };
        // 0.5 + 1 + 2 + 4, then every remaining check waits the 5s cap.
        let expected = Duration::from_millis(7_500) + Duration::from_secs(5) * (u32::MAX - 4);
        assert_eq!(exponential.max_total_delay(), expected);
    }

    #[test]
    fn zero_attempts_never_sleeps() {
        let policy = WaitPolicy::fixed(Duration::from_secs(1), 0);
        assert_eq!(policy.max_total_delay(), Duration::ZERO);
    }
}
