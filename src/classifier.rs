//! Network classification: decides whether the caller sits inside the trusted
//! network by racing a single probe request against a deadline.

use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tokio::sync::{OnceCell, watch};

use crate::{error::ClientError, models::NetworkStatus};

// 1. Probe Contract
/// Probe
///
/// One request to a target that only answers from inside the trusted network.
/// `Ok` means "something answered with success"; every failure mode collapses
/// into `Err`. Dropping the returned future must cancel the request.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self) -> Result<(), ClientError>;
}

/// ProbeState
///
/// Shared handle to the probe implementation held by the application state.
pub type ProbeState = Arc<dyn Probe>;

/// HttpProbe
///
/// Issues `GET <probe_url>` through the shared reqwest client. Any 2xx counts
/// as an answer; error statuses are treated exactly like connection failures.
#[derive(Clone, Debug)]
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpProbe {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self) -> Result<(), ClientError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ClientError::Status {
                status,
                message: None,
            })
        }
    }
}

/// MockProbe
///
/// Answers immediately with a fixed outcome. Used by router tests that need a
/// settled classification without any network.
#[derive(Clone, Debug)]
pub struct MockProbe {
    pub reachable: bool,
}

impl MockProbe {
    pub const fn reachable() -> Self {
        Self { reachable: true }
    }

    pub const fn unreachable() -> Self {
        Self { reachable: false }
    }
}

#[async_trait]
impl Probe for MockProbe {
    async fn probe(&self) -> Result<(), ClientError> {
        if self.reachable {
            Ok(())
        } else {
            Err(ClientError::Decode("mock probe: unreachable".to_string()))
        }
    }
}

// 2. Clock Contract
/// Clock
///
/// Source of the probe deadline. Production uses the tokio timer; tests drive
/// a [`ManualClock`] so that timeouts do not depend on wall-clock time.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub type ClockState = Arc<dyn Clock>;

#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// ManualClock
///
/// A clock that only moves when [`ManualClock::advance`] is called. Sleepers
/// measure their wake-up time from the moment they are first polled.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<watch::Sender<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        let (now, _) = watch::channel(Duration::ZERO);
        Self { now: Arc::new(now) }
    }

    pub fn advance(&self, by: Duration) {
        self.now.send_modify(|now| *now += by);
    }

    pub fn elapsed(&self) -> Duration {
        *self.now.borrow()
    }
}

#[async_trait]
impl Clock for ManualClock {
    async fn sleep(&self, duration: Duration) {
        let mut now = self.now.subscribe();
        let wake_at = *now.borrow() + duration;
        // The sender lives as long as `self`, so this only returns once the
        // clock has been advanced far enough.
        let _ = now.wait_for(|now| *now >= wake_at).await;
    }
}

// 3. The Classifier
#[derive(Debug)]
enum ProbeOutcome {
    Answered,
    Failed(ClientError),
    TimedOut,
}

/// NetworkClassifier
///
/// Produces one [`NetworkStatus`] per instance. A page load creates a fresh
/// classifier, so every page load probes exactly once and never re-probes.
///
/// The probe future and the deadline timer race inside a `select!`; whichever
/// loses is dropped on the spot. That cancels the request when the deadline
/// wins and discards the timer when the probe wins.
pub struct NetworkClassifier {
    probe: ProbeState,
    clock: ClockState,
    deadline: Duration,
    status: watch::Sender<NetworkStatus>,
    result: OnceCell<NetworkStatus>,
}

impl NetworkClassifier {
    pub fn new(probe: ProbeState, clock: ClockState, deadline: Duration) -> Self {
        let (status, _) = watch::channel(NetworkStatus::PENDING);
        Self {
            probe,
            clock,
            deadline,
            status,
            result: OnceCell::new(),
        }
    }

    /// Current status; `pending` until [`Self::classify`] has settled.
    pub fn status(&self) -> NetworkStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<NetworkStatus> {
        self.status.subscribe()
    }

    /// Runs the probe on the first call and returns the settled status.
    /// Concurrent and later calls share that single result.
    pub async fn classify(&self) -> NetworkStatus {
        *self.result.get_or_init(|| self.run_probe()).await
    }

    async fn run_probe(&self) -> NetworkStatus {
        let outcome = tokio::select! {
            biased;
            result = self.probe.probe() => match result {
                Ok(()) => ProbeOutcome::Answered,
                Err(err) => ProbeOutcome::Failed(err),
            },
            () = self.clock.sleep(self.deadline) => ProbeOutcome::TimedOut,
        };

        let internal = match &outcome {
            ProbeOutcome::Answered => {
                tracing::debug!("network probe answered, internal network");
                true
            }
            ProbeOutcome::Failed(err) => {
                tracing::debug!(error = %err, "network probe failed, external network");
                false
            }
            ProbeOutcome::TimedOut => {
                tracing::debug!(
                    deadline_ms = self.deadline.as_millis(),
                    "network probe timed out and was cancelled, external network"
                );
                false
            }
        };

        let status = NetworkStatus::settled(internal);
        self.status.send_replace(status);
        status
    }
}
