use crate::config::{CalendarConfig, WeatherConfig};
use crate::refresh::{Fetch, FetchError};
use almanac::calendar::EventFile;
use almanac::forecast::{ApiKey, ForecastClient, Units};
use almanac::location::{FixedLocation, LocationSource};
use almanac::{CalendarEvent, Forecast, Instant};
use std::time::Duration;

/// Calendar events for the next day. Without an events file there is
/// nothing to show, which is not an error.
#[derive(Debug, Clone, Default)]
pub struct CalendarFetch {
    file: Option<EventFile>,
}

impl CalendarFetch {
    pub fn new(file: Option<EventFile>) -> Self {
        Self { file }
    }

    pub fn from_config(config: &CalendarConfig) -> Self {
        Self::new(config.events_file.as_ref().map(EventFile::new))
    }
}

impl Fetch for CalendarFetch {
    type Output = Vec<CalendarEvent>;

    async fn fetch(&self, now: Instant) -> Result<Vec<CalendarEvent>, FetchError> {
        let Some(file) = &self.file else {
            log::debug!("No events file configured");
            return Ok(Vec::new());
        };
        Ok(file.fetch_events(now).await?)
    }
}

/// Forecast for the last known location. Without an API key the forecast is
/// empty and the face falls back to its plain look.
pub struct WeatherFetch<L: LocationSource = FixedLocation> {
    client: Option<ForecastClient>,
    location: L,
    location_timeout: Duration,
}

impl<L: LocationSource> WeatherFetch<L> {
    pub fn new(client: Option<ForecastClient>, location: L, location_timeout: Duration) -> Self {
        Self {
            client,
            location,
            location_timeout,
        }
    }
}

impl WeatherFetch<FixedLocation> {
    pub fn from_config(config: &WeatherConfig) -> Result<Self, FetchError> {
        let client = match &config.api_key {
            Some(key) if !key.is_empty() => Some(ForecastClient::new(
                config.base_url.as_str(),
                ApiKey::new(key.as_str()),
                Units::new(config.units.as_str()),
                config.fetch_timeout,
            )?),
            _ => None,
        };
        Ok(Self::new(
            client,
            FixedLocation::new(config.location()),
            config.location_timeout,
        ))
    }
}

impl<L: LocationSource> Fetch for WeatherFetch<L> {
    type Output = Forecast;

    async fn fetch(&self, _now: Instant) -> Result<Forecast, FetchError> {
        let Some(client) = &self.client else {
            log::debug!("No forecast API key configured");
            return Ok(Forecast::default());
        };

        let location = tokio::time::timeout(self.location_timeout, self.location.last_known())
            .await
            .ok()
            .flatten()
            .ok_or(FetchError::NoLocation)?;

        Ok(client.fetch(location).await?)
    }
}
