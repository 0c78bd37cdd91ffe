use crate::config::DisplayMode;
use crate::refresh::{Fetch, Phase, Refresher};
use almanac::Instant;
use derive_more::Display;
use parking_lot::RwLock;
use std::fmt;
use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStatus {
    pub fetching: bool,
    pub has_data: bool,
    pub last_success: Option<Instant>,
    pub last_failure: Option<Instant>,
}

impl<F: Fetch> From<&Refresher<F>> for SourceStatus {
    fn from(refresher: &Refresher<F>) -> Self {
        Self {
            fetching: matches!(refresher.phase(), Phase::Fetching { .. }),
            has_data: refresher.snapshot().is_some(),
            last_success: refresher.last_success(),
            last_failure: refresher.last_failure(),
        }
    }
}

fn fmt_instant(f: &mut fmt::Formatter<'_>, label: &str, value: Option<Instant>) -> fmt::Result {
    match value {
        Some(t) => write!(f, " {}={}", label, t),
        None => write!(f, " {}=-", label),
    }
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = if self.fetching { "fetching" } else { "idle" };
        write!(f, "{} data={}", phase, if self.has_data { "yes" } else { "no" })?;
        fmt_instant(f, "ok", self.last_success)?;
        fmt_instant(f, "failed", self.last_failure)
    }
}

/// What the main loop last did, for the control socket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[display("mode={mode} ambient={ambient} weather=[{weather}] calendar=[{calendar}]")]
pub struct Status {
    pub mode: DisplayMode,
    pub ambient: bool,
    pub weather: SourceStatus,
    pub calendar: SourceStatus,
}

#[derive(Debug, Default)]
pub struct StatusBoard {
    inner: RwLock<Status>,
    ambient_changed: Notify,
}

impl StatusBoard {
    pub fn publish(&self, status: Status) {
        let previous = std::mem::replace(&mut *self.inner.write(), status);
        if previous.ambient != status.ambient {
            self.ambient_changed.notify_one();
        }
    }

    pub fn read(&self) -> Status {
        *self.inner.read()
    }

    /// Resolves once a published status flips ambient mode. A flip with
    /// nobody waiting is kept for the next call.
    pub async fn ambient_changed(&self) {
        self.ambient_changed.notified().await;
    }
}
