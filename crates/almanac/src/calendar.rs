use crate::time::{DAY_MS, Instant};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    pub begin: Instant,
    pub end: Instant,
}

impl CalendarEvent {
    pub fn new(title: impl Into<String>, begin: Instant, end: Instant) -> Self {
        Self {
            title: title.into(),
            begin,
            end,
        }
    }

    pub fn ends_after(&self, time: Instant) -> bool {
        self.end > time
    }

    pub fn begins_before(&self, time: Instant) -> bool {
        self.begin < time
    }

    pub fn overlaps(&self, start: Instant, end: Instant) -> bool {
        self.ends_after(start) && self.begins_before(end)
    }
}

/// "Team sync (Room 4)" displays as "Room 4"; titles without a parenthesised
/// part are left alone.
pub fn display_title(title: &str) -> &str {
    title
        .find('(')
        .zip(title.rfind(')'))
        .filter(|&(open, close)| close > open + 1)
        .map(|(open, close)| &title[open + 1..close])
        .unwrap_or(title)
}

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Failed to read events: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed events file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
struct EventRecord {
    title: String,
    begin: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(default)]
    all_day: bool,
}

/// Calendar provider backed by a JSON list of events, typically exported by a
/// calendar sync job.
#[derive(Debug, Clone)]
pub struct EventFile {
    path: PathBuf,
}

impl EventFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn fetch_events(&self, now: Instant) -> Result<Vec<CalendarEvent>, CalendarError> {
        let contents = fs_err::tokio::read_to_string(&self.path).await?;
        let events = Self::parse(&contents, now)?;
        log::debug!("Read {} events from {}", events.len(), self.path.display());
        Ok(events)
    }

    /// Timed events overlapping the next 24 hours, sorted by begin.
    pub fn parse(contents: &str, now: Instant) -> Result<Vec<CalendarEvent>, CalendarError> {
        let records: Vec<EventRecord> = serde_json::from_str(contents)?;
        let horizon = now.plus_millis(DAY_MS);

        let mut events: Vec<_> = records
            .into_iter()
            .filter(|r| !r.all_day)
            .map(|r| {
                CalendarEvent::new(
                    display_title(&r.title),
                    Instant::from(r.begin),
                    Instant::from(r.end),
                )
            })
            .filter(|e| e.overlaps(now, horizon))
            .collect();

        events.sort_by_key(|e| e.begin);
        Ok(events)
    }
}
