// ── Event hub ──
//
// Long-polls the device's event channel in a background task and fans the
// events out over a broadcast channel. The task reconnects with exponential
// backoff and stops when its `Subscription` is closed or dropped.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cleep_api::RpcClient;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::error::CoreError;
use crate::model::{ModuleEvent, ParametersEvent};
use crate::store::DeviceStore;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Source of device events, addressed by a registration key.
pub trait EventSource: Send + Sync + 'static {
    /// Open a poll channel and return its key.
    fn register(&self) -> impl Future<Output = Result<String, CoreError>> + Send;

    /// Wait for the next event. `None` when the poll ended idle.
    fn next_event(
        &self,
        pollkey: &str,
    ) -> impl Future<Output = Result<Option<ModuleEvent>, CoreError>> + Send;
}

impl EventSource for RpcClient {
    async fn register(&self) -> Result<String, CoreError> {
        Ok(self.register_poll().await?)
    }

    async fn next_event(&self, pollkey: &str) -> Result<Option<ModuleEvent>, CoreError> {
        Ok(self.poll(pollkey).await?.map(ModuleEvent::from))
    }
}

/// Exponential backoff configuration for the poll loop.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first retry. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Consecutive failures before giving up. `None` retries forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── Subscription ─────────────────────────────────────────────────────

/// Handle to a background task. Dropping it cancels the task;
/// [`close`](Self::close) also waits for it to finish.
pub struct Subscription {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    fn spawn<F>(cancel: CancellationToken, task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            cancel,
            handle: Some(tokio::spawn(task)),
        }
    }

    /// Whether the task is still running.
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled() && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel the task and wait for it to exit.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!(error = %e, "background task panicked");
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── EventHub ─────────────────────────────────────────────────────────

/// Broadcast fan-out of device events.
pub struct EventHub {
    tx: broadcast::Sender<Arc<ModuleEvent>>,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_CAPACITY)
    }
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Returns how many subscribers received it.
    pub fn publish(&self, event: ModuleEvent) -> usize {
        self.tx.send(Arc::new(event)).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ModuleEvent>> {
        self.tx.subscribe()
    }

    /// Start polling `source` in the background.
    pub fn spawn_listener<E: EventSource>(
        &self,
        source: Arc<E>,
        reconnect: ReconnectConfig,
    ) -> Subscription {
        let cancel = CancellationToken::new();
        let task = poll_loop(source, self.tx.clone(), reconnect, cancel.clone());
        Subscription::spawn(cancel, task)
    }
}

// ── Poll loop ────────────────────────────────────────────────────────

async fn poll_loop<E: EventSource>(
    source: Arc<E>,
    tx: broadcast::Sender<Arc<ModuleEvent>>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;
    let mut pollkey: Option<String> = None;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = poll_once(source.as_ref(), &mut pollkey, &tx) => {
                match result {
                    Ok(()) => attempt = 0,
                    Err(e) => {
                        warn!(error = %e, attempt, "event poll failed");

                        if let Some(max) = reconnect.max_retries {
                            if attempt >= max {
                                error!(max_retries = max, "event poll retry limit reached, giving up");
                                break;
                            }
                        }

                        let delay = calculate_backoff(attempt, &reconnect);
                        info!(
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            attempt,
                            "waiting before polling again"
                        );

                        tokio::select! {
                            biased;
                            () = cancel.cancelled() => break,
                            () = tokio::time::sleep(delay) => {}
                        }

                        attempt = attempt.saturating_add(1);
                    }
                }
            }
        }
    }

    debug!("event poll loop exiting");
}

/// One long-poll. A failed poll drops the key so the next call registers a
/// fresh channel.
async fn poll_once<E: EventSource>(
    source: &E,
    pollkey: &mut Option<String>,
    tx: &broadcast::Sender<Arc<ModuleEvent>>,
) -> Result<(), CoreError> {
    let key = if let Some(key) = pollkey.take() {
        key
    } else {
        let key = source.register().await?;
        debug!("event channel registered");
        key
    };

    let event = source.next_event(&key).await?;
    *pollkey = Some(key);

    if let Some(event) = event {
        trace!(event = %event.name, device_id = ?event.device_id, "event received");
        // No subscribers is not an error.
        let _ = tx.send(Arc::new(event));
    }
    Ok(())
}

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) + jitter`, jitter within +-25%.
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic jitter seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    Duration::from_secs_f64((capped * jitter_factor).max(0.0))
}

// ── Clock sync ───────────────────────────────────────────────────────

/// Merge `parameters.time.now` events from `hub` into `store`.
pub fn spawn_clock_sync(hub: &EventHub, store: Arc<DeviceStore>) -> Subscription {
    let mut rx = hub.subscribe();
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    Subscription::spawn(cancel, async move {
        loop {
            tokio::select! {
                biased;
                () = token.cancelled() => break,
                received = rx.recv() => match received {
                    Ok(event) => {
                        if event.name != ParametersEvent::TIME_NOW {
                            continue;
                        }
                        match store.apply_event(&event) {
                            Ok(true) => trace!(device_id = ?event.device_id, "clock updated"),
                            Ok(false) => debug!(device_id = ?event.device_id, "time event for unknown device"),
                            Err(e) => warn!(error = %e, "ignoring malformed time event"),
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "clock sync lagged behind event hub");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        debug!("clock sync exiting");
    })
}
