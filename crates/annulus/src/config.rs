use crate::events::AppEvent;
use crate::face::WatchColors;
use crate::refresh::RefreshPolicy;
use almanac::Location;
use almanac::forecast::DEFAULT_BASE_URL;
use async_channel::Sender;
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, DurationSeconds, serde_as};
use std::path::PathBuf;
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

/// What the inner face shows besides the hands.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    #[strum(to_string = "weather", serialize = "w")]
    Weather,
    #[strum(to_string = "calendar", serialize = "c")]
    Calendar,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Weather => Self::Calendar,
            Self::Calendar => Self::Weather,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Edge length of the square face, in pixels.
    pub size: u32,
    /// Height of the flat cutout at the bottom of the screen, in pixels.
    pub chin_height: u32,
    pub mode: DisplayMode,
    pub ambient: bool,
    /// Where the png renderer writes each frame.
    pub output: Option<PathBuf>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            size: 320,
            chin_height: 0,
            mode: DisplayMode::Weather,
            ambient: false,
            output: None,
        }
    }
}

impl DisplayConfig {
    /// Chin height relative to the face radius.
    pub fn chin_ratio(&self) -> f64 {
        if self.size == 0 {
            return 0.0;
        }
        (self.chin_height as f64 / (self.size as f64 / 2.0)).clamp(0.0, 1.0)
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub units: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub update_interval: Duration,
    /// Zero disables the floor.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub retry_floor: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub fetch_timeout: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub location_timeout: Duration,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            units: "si".to_string(),
            latitude: None,
            longitude: None,
            update_interval: Duration::from_secs(10 * 60),
            retry_floor: Duration::from_secs(2 * 60),
            fetch_timeout: Duration::from_secs(60),
            location_timeout: Duration::from_secs(30),
        }
    }
}

impl WeatherConfig {
    pub fn location(&self) -> Option<Location> {
        Some(Location::new(self.latitude?, self.longitude?))
    }

    /// The location lookup and the request share one deadline.
    pub fn policy(&self) -> RefreshPolicy {
        RefreshPolicy::new(self.update_interval)
            .with_retry_floor(Some(self.retry_floor))
            .with_timeout(self.location_timeout + self.fetch_timeout)
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// JSON list of `{title, begin, end, all_day}` records.
    pub events_file: Option<PathBuf>,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub update_interval: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub fetch_timeout: Duration,
    /// One lane per color, innermost last.
    pub colors: Vec<String>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            events_file: None,
            update_interval: Duration::from_secs(10 * 60),
            fetch_timeout: Duration::from_secs(30),
            colors: vec![
                "#ff7043".to_string(),
                "#66bb6a".to_string(),
                "#ab47bc".to_string(),
            ],
        }
    }
}

impl CalendarConfig {
    pub fn policy(&self) -> RefreshPolicy {
        RefreshPolicy::new(self.update_interval).with_timeout(self.fetch_timeout)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub weather: WeatherConfig,
    pub calendar: CalendarConfig,
}

impl Config {
    pub fn colors(&self) -> WatchColors {
        WatchColors::default().with_calendar_colors(&self.calendar.colors)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "annulus", "annulus").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn build<S>(file: S) -> Result<Config, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let s = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("ANNULUS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;
    build(config::File::from(config_path).required(false))
}

pub fn load_or_default() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config, using defaults: {}", e);
            Config::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Config {
        build(config::File::from_str(toml, FileFormat::Toml)).unwrap()
    }

    #[test]
    fn test_display_mode_deserialization() {
        let cases = vec![
            ("\"weather\"", DisplayMode::Weather),
            ("\"Weather\"", DisplayMode::Weather),
            ("\"CALENDAR\"", DisplayMode::Calendar),
            ("\"w\"", DisplayMode::Weather),
            ("\"c\"", DisplayMode::Calendar),
        ];

        for (json, expected) in cases {
            let deserialized: DisplayMode = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
        assert!(serde_json::from_str::<DisplayMode>("\"planets\"").is_err());
        assert_eq!(DisplayMode::Calendar.to_string(), "calendar");
    }

    #[test]
    fn test_toggle() {
        assert_eq!(DisplayMode::Weather.toggled(), DisplayMode::Calendar);
        assert_eq!(DisplayMode::Calendar.toggled(), DisplayMode::Weather);
    }

    #[test]
    fn test_default_config_file_matches_defaults() {
        assert_eq!(parse(DEFAULT_CONFIG), Config::default());
    }

    #[test]
    fn test_partial_config() {
        let config = parse(
            r##"
            [display]
            mode = "calendar"
            chin_height = 32

            [weather]
            update_interval = 300
            retry_floor = 0
            latitude = 47.6
            longitude = -122.3

            [calendar]
            events_file = "/tmp/events.json"
            colors = ["#ffffff"]
            "##,
        );

        assert_eq!(config.display.mode, DisplayMode::Calendar);
        assert_eq!(config.display.size, 320);
        assert_eq!(config.weather.update_interval, Duration::from_secs(300));
        assert_eq!(config.weather.fetch_timeout, Duration::from_secs(60));
        assert_eq!(config.weather.location(), Some(Location::new(47.6, -122.3)));
        assert_eq!(config.weather.policy().retry_floor, None);
        assert_eq!(
            config.calendar.events_file,
            Some(PathBuf::from("/tmp/events.json"))
        );
        assert_eq!(config.colors().calendar.len(), 1);
    }

    #[test]
    fn test_chin_ratio() {
        let mut display = DisplayConfig {
            size: 320,
            chin_height: 40,
            ..Default::default()
        };
        assert_eq!(display.chin_ratio(), 0.25);
        display.size = 0;
        assert_eq!(display.chin_ratio(), 0.0);
    }

    #[test]
    fn test_location_needs_both_coordinates() {
        let weather = WeatherConfig {
            latitude: Some(1.0),
            ..Default::default()
        };
        assert_eq!(weather.location(), None);
    }

    #[test]
    fn test_policies() {
        let config = Config::default();
        let weather = config.weather.policy();
        assert_eq!(weather.interval, Duration::from_secs(600));
        assert_eq!(weather.retry_floor, Some(Duration::from_secs(120)));
        assert_eq!(weather.timeout, Duration::from_secs(90));
        assert_eq!(config.calendar.policy().retry_floor, None);
    }
}
