use almanac::Instant;
use almanac::calendar::CalendarError;
use almanac::forecast::ForecastError;
use async_channel::{Receiver, Sender};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No location available")]
    NoLocation,
    #[error("Fetch timed out after {0:?}")]
    TimedOut(Duration),
    #[error("Forecast error: {0}")]
    Forecast(#[from] ForecastError),
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),
}

/// A fallible, possibly slow producer of a fresh snapshot.
pub trait Fetch: Send + Sync + 'static {
    type Output: Send + Sync + 'static;

    fn fetch(&self, now: Instant) -> impl Future<Output = Result<Self::Output, FetchError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub interval: Duration,
    /// Minimum wait after a failed attempt before staleness may trigger another.
    pub retry_floor: Option<Duration>,
    pub timeout: Duration,
}

impl RefreshPolicy {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            retry_floor: None,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_retry_floor(mut self, floor: Option<Duration>) -> Self {
        self.retry_floor = floor.filter(|f| !f.is_zero());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching { since: Instant },
}

type Completion<T> = (u64, Result<T, FetchError>);

fn millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

/// Single-flight, staleness-gated refresh of one data source.
///
/// Fetches run on the runtime behind `handle`; their results are queued and
/// only applied when the owner calls [`Refresher::poll`] or
/// [`Refresher::settle`], so the snapshot is only ever swapped from the
/// owner's thread. A request made while a fetch is in flight is dropped.
pub struct Refresher<F: Fetch> {
    name: &'static str,
    fetcher: Arc<F>,
    policy: RefreshPolicy,
    handle: Handle,
    phase: Phase,
    generation: u64,
    last_success: Option<Instant>,
    last_failure: Option<Instant>,
    snapshot: Option<Arc<F::Output>>,
    tx: Sender<Completion<F::Output>>,
    rx: Receiver<Completion<F::Output>>,
}

impl<F: Fetch> Refresher<F> {
    pub fn new(name: &'static str, fetcher: F, policy: RefreshPolicy, handle: Handle) -> Self {
        let (tx, rx) = async_channel::unbounded();
        Self {
            name,
            fetcher: Arc::new(fetcher),
            policy,
            handle,
            phase: Phase::Idle,
            generation: 0,
            last_success: None,
            last_failure: None,
            snapshot: None,
            tx,
            rx,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_success(&self) -> Option<Instant> {
        self.last_success
    }

    pub fn last_failure(&self) -> Option<Instant> {
        self.last_failure
    }

    /// Latest successful snapshot. Replaced wholesale, never mutated.
    pub fn snapshot(&self) -> Option<&F::Output> {
        self.snapshot.as_deref()
    }

    pub fn set_policy(&mut self, policy: RefreshPolicy) {
        self.policy = policy;
    }

    /// Swaps the fetch operation. A fetch already in flight still completes
    /// and is applied.
    pub fn set_fetcher(&mut self, fetcher: F) {
        self.fetcher = Arc::new(fetcher);
    }

    pub fn is_stale(&self, now: Instant) -> bool {
        match self.last_success {
            None => true,
            Some(last) => now.millis_since(last) > millis(self.policy.interval),
        }
    }

    /// Starts a fetch unless one is already in flight. Returns whether a
    /// fetch was started.
    pub fn request_refresh(&mut self, now: Instant) -> bool {
        if let Phase::Fetching { .. } = self.phase {
            log::debug!("{} refresh already in flight, dropping request", self.name);
            return false;
        }

        self.generation += 1;
        let generation = self.generation;
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        let timeout = self.policy.timeout;

        self.handle.spawn(async move {
            let result = match tokio::time::timeout(timeout, fetcher.fetch(now)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::TimedOut(timeout)),
            };
            let _ = tx.send((generation, result)).await;
        });

        log::debug!("{} refresh started", self.name);
        self.phase = Phase::Fetching { since: now };
        true
    }

    /// Requests a refresh if the snapshot is older than the update interval,
    /// holding off for the retry floor after a failure.
    pub fn refresh_if_stale(&mut self, now: Instant) -> bool {
        if !self.is_stale(now) {
            return false;
        }
        if let (Some(floor), Some(failed)) = (self.policy.retry_floor, self.last_failure)
            && now.millis_since(failed) < millis(floor)
        {
            return false;
        }
        self.request_refresh(now)
    }

    /// Applies any finished fetch. Returns true if the snapshot changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut changed = false;
        while let Ok((generation, result)) = self.rx.try_recv() {
            changed |= self.apply(now, generation, result);
        }

        // A fetch is bounded by its timeout, so outliving twice that means
        // the task was lost along with its runtime.
        if let Phase::Fetching { since } = self.phase
            && now.millis_since(since) > millis(self.policy.timeout).saturating_mul(2)
        {
            log::warn!("{} refresh never completed, resetting", self.name);
            self.phase = Phase::Idle;
        }
        changed
    }

    /// Waits for the in-flight fetch, if any, and applies it.
    pub async fn settle(&mut self, now: Instant) -> bool {
        while let Phase::Fetching { .. } = self.phase {
            match self.rx.recv().await {
                Ok((generation, result)) => {
                    if self.apply(now, generation, result) {
                        return true;
                    }
                }
                Err(_) => break,
            }
        }
        false
    }

    fn apply(&mut self, now: Instant, generation: u64, result: Result<F::Output, FetchError>) -> bool {
        if generation != self.generation {
            log::debug!("{} discarding result of an abandoned fetch", self.name);
            return false;
        }
        self.phase = Phase::Idle;

        match result {
            Ok(output) => {
                log::info!("{} refreshed", self.name);
                self.snapshot = Some(Arc::new(output));
                self.last_success = Some(now);
                self.last_failure = None;
                true
            }
            Err(e) => {
                log::error!("{} refresh failed: {}", self.name, e);
                self.last_failure = Some(now);
                false
            }
        }
    }
}
