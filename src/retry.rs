use crate::error::ErrorKind;
use std::time::Duration;

/// How a component reacts to a failed attempt.
///
/// Commands use [`RetryPolicy::Capped`]: a finite number of attempts with
/// linear backoff, after which the caller is told. The event stream uses
/// [`RetryPolicy::Unbounded`]: reconnect forever at a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// At most `max_attempts` attempts; wait `attempt * base_delay` after
    /// failed attempt number `attempt` (1-based)
    Capped {
        max_attempts: u32,
        base_delay: Duration,
    },
    /// Always retry after `interval`
    Unbounded { interval: Duration },
}

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
}

impl RetryPolicy {
    /// Single attempt, no retry
    pub const fn once() -> Self {
        RetryPolicy::Capped {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Decide after failed attempt number `attempt` (1-based)
    pub fn decide(&self, attempt: u32) -> RetryDecision {
        match *self {
            RetryPolicy::Capped {
                max_attempts,
                base_delay,
            } => {
                if attempt >= max_attempts {
                    RetryDecision::GiveUp
                } else {
                    RetryDecision::RetryAfter(base_delay * attempt)
                }
            }
            RetryPolicy::Unbounded { interval } => RetryDecision::RetryAfter(interval),
        }
    }
}

/// Progress of one command's attempt sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptState {
    /// Attempts made so far
    pub attempt: u32,
    /// Failure of the most recent attempt, if it failed
    pub last_error: Option<ErrorKind>,
}

impl AttemptState {
    /// Record a failed attempt and ask the policy what comes next
    pub fn fail(&mut self, error: ErrorKind, policy: &RetryPolicy) -> RetryDecision {
        self.last_error = Some(error);
        policy.decide(self.attempt)
    }

    /// Start the next attempt
    pub fn begin(&mut self) {
        self.attempt += 1;
    }
}
