//! Retry policy and backoff types for upstream forwarding.
//!
//! Retries apply only to transport-level failures (no response obtained at
//! all). A backend response with any status code is returned immediately and
//! never consumes a retry.

/// Retry policy for one forwarded operation.
///
/// Default is a single attempt with no backoff.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (1 = no retry).
    pub max_attempts: u32,
    /// Backoff strategy between attempts.
    pub backoff: BackoffStrategy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff: BackoffStrategy::None,
        }
    }
}

impl RetryPolicy {
    /// Build the configured policy: `retry_count` retries on top of the
    /// initial attempt, with a linear backoff proportional to the attempt
    /// number.
    #[must_use]
    pub fn from_retry_count(retry_count: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: retry_count.saturating_add(1),
            backoff: BackoffStrategy::Linear {
                initial_ms: base_delay_ms,
                increment_ms: base_delay_ms,
                max_ms: 10_000,
            },
        }
    }

    /// Set the maximum number of attempts.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the backoff strategy.
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Delay to wait after the given failed attempt (0-indexed).
    #[must_use]
    pub fn delay_after_attempt(&self, attempt: u32) -> u64 {
        self.backoff.delay_for_attempt(attempt)
    }
}

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BackoffStrategy {
    /// No delay between retries.
    #[default]
    None,
    /// Constant delay.
    Constant {
        /// Delay in milliseconds.
        delay_ms: u64,
    },
    /// Linear backoff: delay grows with the attempt number.
    Linear {
        /// Initial delay in milliseconds.
        initial_ms: u64,
        /// Increment per attempt in milliseconds.
        increment_ms: u64,
        /// Maximum delay in milliseconds.
        max_ms: u64,
    },
    /// Exponential backoff.
    Exponential {
        /// Initial delay in milliseconds.
        initial_ms: u64,
        /// Multiplier per attempt.
        multiplier: f64,
        /// Maximum delay in milliseconds.
        max_ms: u64,
    },
}

impl BackoffStrategy {
    /// Calculate delay for a given attempt (0-indexed).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> u64 {
        match self {
            Self::None => 0,
            Self::Constant { delay_ms } => *delay_ms,
            Self::Linear {
                initial_ms,
                increment_ms,
                max_ms,
            } => {
                let delay = initial_ms.saturating_add(u64::from(attempt) * increment_ms);
                delay.min(*max_ms)
            }
            Self::Exponential {
                initial_ms,
                multiplier,
                max_ms,
            } => {
                // Precision loss is acceptable for backoff timing
                #[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
                let delay = (*initial_ms as f64) * multiplier.powi(attempt as i32);
                // Truncation intentional: milliseconds as integer
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let delay_ms = delay as u64;
                delay_ms.min(*max_ms)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_single_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.delay_after_attempt(0), 0);
    }

    #[test]
    fn from_retry_count_adds_initial_attempt() {
        let policy = RetryPolicy::from_retry_count(2, 250);
        assert_eq!(policy.max_attempts, 3);
    }

    #[test]
    fn linear_backoff_is_strictly_increasing() {
        let policy = RetryPolicy::from_retry_count(3, 250);
        let delays: Vec<u64> = (0..3).map(|a| policy.delay_after_attempt(a)).collect();
        assert_eq!(delays, vec![250, 500, 750]);
        assert!(delays.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn linear_backoff_caps_at_max() {
        let backoff = BackoffStrategy::Linear {
            initial_ms: 100,
            increment_ms: 100,
            max_ms: 250,
        };
        assert_eq!(backoff.delay_for_attempt(10), 250);
    }

    #[test]
    fn exponential_backoff_doubles_and_caps() {
        let backoff = BackoffStrategy::Exponential {
            initial_ms: 100,
            multiplier: 2.0,
            max_ms: 5000,
        };
        assert_eq!(backoff.delay_for_attempt(0), 100);
        assert_eq!(backoff.delay_for_attempt(2), 400);
        assert_eq!(backoff.delay_for_attempt(10), 5000);
    }
}
