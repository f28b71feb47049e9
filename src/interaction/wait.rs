use std::future::Future;
use std::time::Duration;

use chromiumoxide::page::Page;
use tokio::time::Instant;

use super::eval::{evaluate, js_str};
use crate::error::WaitError;

/// How often to re-check a condition and when to give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
    pub max_attempts: Option<u32>,
}

impl PollPolicy {
    /// Poll until `timeout` has elapsed.
    pub fn deadline(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            max_attempts: None,
        }
    }

    /// Poll at most `attempts` times.
    pub fn attempts(interval: Duration, attempts: u32) -> Self {
        Self {
            interval,
            timeout: interval * attempts,
            max_attempts: Some(attempts),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Ready { attempts: u32 },
    TimedOut { attempts: u32, waited: Duration },
}

impl PollOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, PollOutcome::Ready { .. })
    }
}

/// Run `probe` until it reports true or the policy's budget runs out.
/// The probe always runs at least once.
pub async fn poll_until<F, Fut>(policy: PollPolicy, mut probe: F) -> PollOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        if probe().await {
            return PollOutcome::Ready { attempts };
        }

        let waited = start.elapsed();
        let out_of_attempts = policy.max_attempts.is_some_and(|max| attempts >= max);
        if out_of_attempts || waited >= policy.timeout {
            return PollOutcome::TimedOut { attempts, waited };
        }
        tokio::time::sleep(policy.interval).await;
    }
}

/// Wait until no element matches `selector`. An evaluation failure counts as
/// "still present" so a page mid-render does not end the wait early.
pub async fn wait_for_absent(
    page: &Page,
    selector: &str,
    policy: PollPolicy,
) -> Result<(), WaitError> {
    let js = format!(
        "document.querySelectorAll({}).length",
        js_str(selector)
    );
    let js = &js;
    let outcome = poll_until(policy, move || async move {
        let count: u64 = evaluate(page, js.clone(), "loading indicator count")
            .await
            .unwrap_or(u64::MAX);
        count == 0
    })
    .await;

    match outcome {
        PollOutcome::Ready { attempts } => {
            tracing::debug!("{} cleared after {} checks", selector, attempts);
            Ok(())
        }
        PollOutcome::TimedOut { waited, .. } => Err(WaitError::Timeout {
            what: format!("{} to disappear", selector),
            waited,
        }),
    }
}
