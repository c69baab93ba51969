use std::future::Future;
use std::io::Write;
use std::time::Duration;

use backon::{ConstantBuilder, Retryable};

use crate::kibana::RequestError;

/// One status check against the service being waited on.
pub trait StatusProbe {
    fn probe(&self) -> impl Future<Output = Result<u16, RequestError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    /// Delay between a failed check and the next one.
    pub interval: Duration,
    /// Give up after this long. `None` polls forever.
    pub max_wait: Option<Duration>,
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("status check cannot succeed: {0}")]
    Fatal(#[source] RequestError),
    #[error("{name} was not ready after {waited:?}")]
    Deadline { name: String, waited: Duration },
}

/// Why a single check did not count as ready.
#[derive(Debug)]
enum Attempt {
    NotReady(u16),
    Unreachable(RequestError),
    Fatal(RequestError),
}

/// Poll `probe` until it reports 200, printing one dot per check.
///
/// Non-200 statuses and transient request errors (timeouts, refused
/// connections, non-JSON bodies) are retried on every attempt alike. Only a
/// request that can never succeed ends the wait early.
pub async fn wait_until_ready<P: StatusProbe>(
    probe: &P,
    name: &str,
    policy: PollPolicy,
) -> Result<(), PollError> {
    print!("Waiting for {}", name);
    let _ = std::io::stdout().flush();

    let check = || async move {
        print!(".");
        let _ = std::io::stdout().flush();
        match probe.probe().await {
            Ok(200) => Ok(()),
            Ok(status) => Err(Attempt::NotReady(status)),
            Err(e) if e.is_transient() => Err(Attempt::Unreachable(e)),
            Err(e) => Err(Attempt::Fatal(e)),
        }
    };

    let polling = check
        .retry(
            ConstantBuilder::default()
                .with_delay(policy.interval)
                .with_max_times(usize::MAX),
        )
        .when(|attempt: &Attempt| !matches!(attempt, Attempt::Fatal(_)))
        .notify(|attempt: &Attempt, delay: Duration| match attempt {
            Attempt::NotReady(status) => {
                tracing::debug!(status, "{} not ready, retrying in {:?}", name, delay)
            }
            Attempt::Unreachable(err) => {
                tracing::debug!("{} unreachable: {}, retrying in {:?}", name, err, delay)
            }
            Attempt::Fatal(_) => {}
        });

    let result = match policy.max_wait {
        Some(limit) => match tokio::time::timeout(limit, polling).await {
            Ok(result) => result,
            Err(_) => {
                println!();
                return Err(PollError::Deadline {
                    name: name.to_string(),
                    waited: limit,
                });
            }
        },
        None => polling.await,
    };

    match result {
        Ok(()) => {
            println!(" ready!");
            Ok(())
        }
        Err(attempt) => {
            println!();
            match attempt {
                Attempt::Fatal(e) => Err(PollError::Fatal(e)),
                Attempt::NotReady(_) | Attempt::Unreachable(_) => Err(PollError::Deadline {
                    name: name.to_string(),
                    waited: policy.max_wait.unwrap_or(Duration::MAX),
                }),
            }
        }
    }
}
