use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const MINUTE_MS: i64 = 60 * 1000;
pub const HOUR_MS: i64 = 60 * MINUTE_MS;
pub const DAY_MS: i64 = 24 * HOUR_MS;

/// Milliseconds since the Unix epoch.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    From,
    Into,
)]
#[serde(transparent)]
pub struct Instant(i64);

impl Instant {
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    /// Saturates at the ends of the range.
    pub const fn from_unix_seconds(secs: i64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// `None` when `secs` is out of range, for timestamps from the network.
    pub const fn checked_from_unix_seconds(secs: i64) -> Option<Self> {
        match secs.checked_mul(1000) {
            Some(ms) => Some(Self(ms)),
            None => None,
        }
    }

    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub const fn millis(self) -> i64 {
        self.0
    }

    pub const fn plus_millis(self, ms: i64) -> Self {
        Self(self.0.saturating_add(ms))
    }

    pub fn plus(self, d: Duration) -> Self {
        self.plus_millis(i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
    }

    /// Signed distance `self - earlier` in milliseconds, saturating.
    pub const fn millis_since(self, earlier: Instant) -> i64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn to_local(self, offset: FixedOffset) -> DateTime<FixedOffset> {
        Utc.timestamp_millis_opt(self.0)
            .single()
            .unwrap_or_default()
            .with_timezone(&offset)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Instant {
    fn from(dt: DateTime<Tz>) -> Self {
        Self(dt.timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_arithmetic_saturates() {
        let last = Instant::from_millis(i64::MAX);
        assert_eq!(last.plus_millis(1), last);
        assert_eq!(Instant::from_millis(i64::MIN).millis_since(last), i64::MIN);
        assert_eq!(Instant::from_unix_seconds(i64::MAX), last);
        assert_eq!(Instant::checked_from_unix_seconds(i64::MAX / 10), None);
        assert_eq!(
            Instant::checked_from_unix_seconds(2),
            Some(Instant::from_millis(2000))
        );
        assert_eq!(Instant::default().plus(std::time::Duration::MAX), last);
    }

    #[test]
    fn test_local_conversion_applies_offset() {
        let t = Instant::from_unix_seconds(3600 * 10 + 60 * 15);
        let offset = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let local = t.to_local(offset);
        assert_eq!(local.hour(), 15);
        assert_eq!(local.minute(), 45);
    }

    #[test]
    fn test_arithmetic() {
        let t = Instant::from_millis(1_000);
        assert_eq!(t.plus(Duration::from_secs(2)).millis(), 3_000);
        assert_eq!(t.plus_millis(HOUR_MS).millis_since(t), HOUR_MS);
    }
}
