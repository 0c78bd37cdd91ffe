use crate::config::{Config, DisplayMode};
use crate::face::{DrawOp, FrameInput, WatchColors, compose};
use crate::refresh::{Fetch, Refresher};
use crate::sys::status::{SourceStatus, Status};
use almanac::{CalendarEvent, Forecast, Instant};
use chrono::FixedOffset;

/// Owns both data sources and the display state, and turns "now" into a
/// frame. Everything here runs on the main loop's thread.
pub struct Engine<C, W>
where
    C: Fetch<Output = Vec<CalendarEvent>>,
    W: Fetch<Output = Forecast>,
{
    calendar: Refresher<C>,
    weather: Refresher<W>,
    colors: WatchColors,
    mode: DisplayMode,
    ambient: bool,
    chin_ratio: f64,
}

impl<C, W> Engine<C, W>
where
    C: Fetch<Output = Vec<CalendarEvent>>,
    W: Fetch<Output = Forecast>,
{
    pub fn new(calendar: Refresher<C>, weather: Refresher<W>, config: &Config) -> Self {
        Self {
            calendar,
            weather,
            colors: config.colors(),
            mode: config.display.mode,
            ambient: config.display.ambient,
            chin_ratio: config.display.chin_ratio(),
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn ambient(&self) -> bool {
        self.ambient
    }

    pub fn set_ambient(&mut self, ambient: bool) {
        if self.ambient != ambient {
            log::info!("Ambient mode {}", if ambient { "on" } else { "off" });
        }
        self.ambient = ambient;
    }

    /// Picks up new colors, geometry and refresh policies. Cached data and
    /// the current display mode survive.
    pub fn apply_config(&mut self, config: &Config) {
        self.colors = config.colors();
        self.chin_ratio = config.display.chin_ratio();
        self.calendar.set_policy(config.calendar.policy());
        self.weather.set_policy(config.weather.policy());
    }

    /// Swaps in a new configuration together with the fetchers built from
    /// it, so a config whose fetchers cannot be built changes nothing.
    pub fn reconfigure(&mut self, config: &Config, calendar: C, weather: W) {
        self.apply_config(config);
        self.calendar.set_fetcher(calendar);
        self.weather.set_fetcher(weather);
    }

    /// Forces both sources to refresh and flips between weather and calendar.
    pub fn tap(&mut self, now: Instant) {
        self.calendar.request_refresh(now);
        self.weather.request_refresh(now);
        self.mode = self.mode.toggled();
        log::info!("Display mode {}", self.mode);
    }

    /// Applies finished fetches, kicks off stale ones, and composes the frame
    /// from whatever snapshots are current.
    pub fn frame(&mut self, now: Instant, offset: FixedOffset) -> Vec<DrawOp> {
        self.calendar.poll(now);
        self.weather.poll(now);
        self.calendar.refresh_if_stale(now);
        self.weather.refresh_if_stale(now);

        let input = FrameInput {
            now,
            offset,
            ambient: self.ambient,
            mode: self.mode,
            chin_ratio: self.chin_ratio,
            forecast: self.weather.snapshot(),
            events: self.calendar.snapshot().map(Vec::as_slice),
        };
        compose(&input, &self.colors)
    }

    pub fn status(&self) -> Status {
        Status {
            mode: self.mode,
            ambient: self.ambient,
            weather: SourceStatus::from(&self.weather),
            calendar: SourceStatus::from(&self.calendar),
        }
    }
}
