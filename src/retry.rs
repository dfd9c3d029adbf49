use std::future::Future;
use std::time::Duration;

/// Exponential-backoff schedule for retried operations.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            backoff_factor: 2,
        }
    }
}

impl RetryPolicy {
    /// Schedule with no waiting between attempts. Used by tests.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_factor: 2,
        }
    }
}

/// Run `op`, retrying on failure up to `policy.max_retries` extra times with
/// exponential backoff between attempts. The last attempt's error is returned
/// unmodified; nothing is retried after the final configured attempt.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt == policy.max_retries {
                    return Err(err);
                }
                tokio::time::sleep(delay).await;
                delay = (delay * policy.backoff_factor).min(policy.max_delay);
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn returns_first_success_without_retrying() {
        let calls = Cell::new(0u32);
        let result: Result<u32, &str> = with_retry(&RetryPolicy::immediate(3), || {
            calls.set(calls.get() + 1);
            async { Ok(7) }
        })
        .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn succeeds_on_third_attempt_after_two_failures() {
        let calls = Cell::new(0u32);
        let result: Result<u32, &str> = with_retry(&RetryPolicy::immediate(3), || {
            let n = calls.get();
            calls.set(n + 1);
            async move { if n < 2 { Err("boom") } else { Ok(n) } }
        })
        .await;
        assert_eq!(result, Ok(2));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn exhausts_retries_and_returns_last_error() {
        let calls = Cell::new(0u32);
        let result: Result<(), String> = with_retry(&RetryPolicy::immediate(3), || {
            let n = calls.get();
            calls.set(n + 1);
            async move { Err(format!("failure {n}")) }
        })
        .await;
        // 1 initial + 3 retries
        assert_eq!(calls.get(), 4);
        assert_eq!(result.unwrap_err(), "failure 3");
    }

    #[test]
    fn default_schedule_matches_contract() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.initial_delay, Duration::from_millis(1000));
        assert_eq!(policy.max_delay, Duration::from_millis(10_000));
        assert_eq!(policy.backoff_factor, 2);
    }
}
