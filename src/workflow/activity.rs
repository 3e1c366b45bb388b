//! Activities: the retryable units of work the engine executes
//!
//! Step payloads are JSON values so the history log stays self-describing;
//! typed encode/decode happens at the coordinator and activity boundaries.

use super::errors::StepError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// A step failure plus whether the engine may retry it
#[derive(Debug, Clone)]
pub struct ActivityFailure {
    pub error: StepError,
    pub retryable: bool,
}

impl ActivityFailure {
    /// A failure worth retrying, e.g. a transient network error.
    pub fn transient(error: StepError) -> Self {
        Self {
            error,
            retryable: true,
        }
    }

    /// A failure that will not improve on retry, e.g. malformed input.
    pub fn permanent(error: StepError) -> Self {
        Self {
            error,
            retryable: false,
        }
    }
}

/// One executable step. Implementations must be idempotent: the engine
/// guarantees at-least-once execution, not exactly-once.
#[async_trait]
pub trait Activity: Send + Sync {
    async fn run(&self, input: Value) -> Result<Value, ActivityFailure>;
}

/// Step name → activity lookup used by the execution engine
#[derive(Default)]
pub struct ActivityRegistry {
    activities: HashMap<String, Arc<dyn Activity>>,
}

impl ActivityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, activity: Arc<dyn Activity>) {
        self.activities.insert(name.to_string(), activity);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Activity>> {
        self.activities.get(name).cloned()
    }
}

/// Bounded exponential backoff applied to retryable step failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            backoff_factor: 2,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries; useful in tests.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            backoff_factor: 1,
        }
    }
}

/// Run an activity under the retry policy. Only failures marked retryable
/// consume further attempts; the last failure is surfaced once the budget
/// is exhausted.
pub async fn execute_with_retry(
    activity: &dyn Activity,
    step: &str,
    input: &Value,
    policy: &RetryPolicy,
) -> Result<Value, StepError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_delay;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match activity.run(input.clone()).await {
            Ok(output) => return Ok(output),
            Err(failure) if failure.retryable && attempt < max_attempts => {
                warn!(
                    step,
                    attempt,
                    error = %failure.error,
                    "step failed, retrying after {:?}",
                    delay
                );
                tokio::time::sleep(delay).await;
                delay *= policy.backoff_factor;
            }
            Err(failure) => return Err(failure.error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails with a retryable error until `succeed_on_attempt` is reached.
    struct FlakyActivity {
        attempts: AtomicU32,
        succeed_on_attempt: u32,
    }

    #[async_trait]
    impl Activity for FlakyActivity {
        async fn run(&self, _input: Value) -> Result<Value, ActivityFailure> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt >= self.succeed_on_attempt {
                Ok(Value::from(attempt))
            } else {
                Err(ActivityFailure::transient(StepError::Internal {
                    step: "flaky".to_string(),
                    reason: "transient".to_string(),
                }))
            }
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            backoff_factor: 1,
        }
    }

    #[tokio::test]
    async fn retries_transient_failures_until_success() {
        let activity = FlakyActivity {
            attempts: AtomicU32::new(0),
            succeed_on_attempt: 3,
        };
        let output = execute_with_retry(&activity, "flaky", &Value::Null, &fast_policy(3))
            .await
            .unwrap();
        assert_eq!(output, Value::from(3));
    }

    #[tokio::test]
    async fn exhausted_budget_surfaces_the_failure() {
        let activity = FlakyActivity {
            attempts: AtomicU32::new(0),
            succeed_on_attempt: 10,
        };
        let error = execute_with_retry(&activity, "flaky", &Value::Null, &fast_policy(2))
            .await
            .unwrap_err();
        assert!(matches!(error, StepError::Internal { .. }));
        assert_eq!(activity.attempts.load(Ordering::SeqCst), 2);
    }

    struct PermanentFailure;

    #[async_trait]
    impl Activity for PermanentFailure {
        async fn run(&self, _input: Value) -> Result<Value, ActivityFailure> {
            Err(ActivityFailure::permanent(StepError::ReduceFailed {
                reason: "malformed".to_string(),
            }))
        }
    }

    #[tokio::test]
    async fn permanent_failures_are_not_retried() {
        let error = execute_with_retry(&PermanentFailure, "reduce", &Value::Null, &fast_policy(5))
            .await
            .unwrap_err();
        assert!(matches!(error, StepError::ReduceFailed { .. }));
    }
}
