use std::time::Duration;

/// High-level classification of an attempt failure for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Server asked us to slow down (429, 503).
    Throttled,
    /// Network-level failure (connection reset, DNS, etc.).
    Connection,
    /// Any other transport failure reported by curl.
    Transport,
    /// Response status other than 200/206.
    HttpStatus(u16),
    /// Body ended before the full range arrived.
    Truncated,
    /// Server does not honor range requests; retrying cannot help.
    RangeUnsupported,
    /// Local write failure; surfaced as a storage error, never retried.
    Storage,
    /// Caller cancelled or deadline passed.
    Cancelled,
}

impl ErrorKind {
    /// Network and status failures are retryable; everything else is terminal.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout
                | ErrorKind::Throttled
                | ErrorKind::Connection
                | ErrorKind::Transport
                | ErrorKind::HttpStatus(_)
                | ErrorKind::Truncated
        )
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Bounded retry with linearly increasing delay.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay unit: after failed attempt `k` we wait `k * delay_step`.
    pub delay_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_step: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Decide what to do after attempt number `attempt` (1-based) failed with `kind`.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts || !kind.is_retryable() {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.delay_step.saturating_mul(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_kinds_never_retry() {
        let p = RetryPolicy::default();
        for kind in [
            ErrorKind::Storage,
            ErrorKind::Cancelled,
            ErrorKind::RangeUnsupported,
        ] {
            assert_eq!(p.decide(1, kind), RetryDecision::NoRetry);
        }
    }

    #[test]
    fn delay_grows_linearly() {
        let p = RetryPolicy {
            max_attempts: 5,
            delay_step: Duration::from_secs(1),
        };
        assert_eq!(
            p.decide(1, ErrorKind::Timeout),
            RetryDecision::RetryAfter(Duration::from_secs(1))
        );
        assert_eq!(
            p.decide(2, ErrorKind::HttpStatus(500)),
            RetryDecision::RetryAfter(Duration::from_secs(2))
        );
        assert_eq!(
            p.decide(4, ErrorKind::Connection),
            RetryDecision::RetryAfter(Duration::from_secs(4))
        );
    }

    #[test]
    fn respects_max_attempts() {
        let p = RetryPolicy::default();
        assert!(matches!(
            p.decide(1, ErrorKind::Throttled),
            RetryDecision::RetryAfter(_)
        ));
        assert!(matches!(
            p.decide(2, ErrorKind::Throttled),
            RetryDecision::RetryAfter(_)
        ));
        assert_eq!(p.decide(3, ErrorKind::Throttled), RetryDecision::NoRetry);
    }

    #[test]
    fn single_attempt_budget() {
        let p = RetryPolicy {
            max_attempts: 1,
            delay_step: Duration::from_secs(1),
        };
        assert_eq!(p.decide(1, ErrorKind::Timeout), RetryDecision::NoRetry);
    }
}
