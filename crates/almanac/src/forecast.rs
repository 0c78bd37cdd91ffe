use crate::location::Location;
use crate::time::Instant;
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.forecast.io";

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ApiKey(String);

crate::string_newtype!(ApiKey);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct Units(String);

crate::string_newtype!(Units);

impl Default for Units {
    fn default() -> Self {
        Self::new("si")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecipType {
    Rain,
    Snow,
    Sleet,
    #[serde(other)]
    Other,
}

impl PrecipType {
    pub fn is_snow(self) -> bool {
        matches!(self, Self::Snow | Self::Sleet)
    }
}

/// One sample of any forecast block. Upstream omits whatever does not apply,
/// so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub time: Option<i64>,
    pub summary: Option<String>,
    pub sunrise_time: Option<i64>,
    pub sunset_time: Option<i64>,
    pub precip_intensity: Option<f64>,
    pub precip_probability: Option<f64>,
    pub precip_type: Option<PrecipType>,
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_bearing: Option<f64>,
    pub cloud_cover: Option<f64>,
}

impl DataPoint {
    pub fn instant(&self) -> Option<Instant> {
        self.time.and_then(Instant::checked_from_unix_seconds)
    }

    pub fn sunrise(&self) -> Option<Instant> {
        self.sunrise_time.and_then(Instant::checked_from_unix_seconds)
    }

    pub fn sunset(&self) -> Option<Instant> {
        self.sunset_time.and_then(Instant::checked_from_unix_seconds)
    }

    /// Expected precipitation in mm/h; zero unless both intensity and
    /// probability are known.
    pub fn precip_expectation(&self) -> f64 {
        match (self.precip_intensity, self.precip_probability) {
            (Some(intensity), Some(probability)) => (intensity * probability).max(0.0),
            _ => 0.0,
        }
    }

    pub fn is_snow(&self) -> bool {
        self.precip_type.is_some_and(PrecipType::is_snow)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataBlock {
    pub summary: Option<String>,
    #[serde(default)]
    pub data: Vec<DataPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub currently: Option<DataPoint>,
    pub minutely: Option<DataBlock>,
    pub hourly: Option<DataBlock>,
    pub daily: Option<DataBlock>,
}

impl Forecast {
    pub fn minutely_points(&self) -> &[DataPoint] {
        Self::points(&self.minutely)
    }

    pub fn hourly_points(&self) -> &[DataPoint] {
        Self::points(&self.hourly)
    }

    pub fn daily_points(&self) -> &[DataPoint] {
        Self::points(&self.daily)
    }

    fn points(block: &Option<DataBlock>) -> &[DataPoint] {
        block.as_ref().map(|b| b.data.as_slice()).unwrap_or_default()
    }
}

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Forecast API returned {0}")]
    Status(reqwest::StatusCode),
    #[error("Malformed forecast response: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct ForecastClient {
    http: reqwest::Client,
    base_url: String,
    api_key: ApiKey,
    units: Units,
}

impl ForecastClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: ApiKey,
        units: Units,
        timeout: Duration,
    ) -> Result<Self, ForecastError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key,
            units,
        })
    }

    pub fn url(&self, location: Location) -> String {
        format!(
            "{}/forecast/{}/{},{}",
            self.base_url.trim_end_matches('/'),
            self.api_key,
            location.latitude,
            location.longitude
        )
    }

    pub async fn fetch(&self, location: Location) -> Result<Forecast, ForecastError> {
        log::debug!(
            "Requesting forecast for {:.3},{:.3}",
            location.latitude,
            location.longitude
        );
        let response = self
            .http
            .get(self.url(location))
            .query(&[("units", self.units.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ForecastError::Status(response.status()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_datum_deserialization() {
        let json = r#"{
            "currently": {"time": 1500000000, "temperature": 12.5, "windSpeed": 3.0},
            "hourly": {"data": [{"time": 1500000000, "precipType": "snow", "cloudCover": 0.4}]},
            "daily": {"summary": "Rain later", "data": [{"sunriseTime": 1499990000}]},
            "flags": {"units": "si"}
        }"#;

        let forecast: Forecast = serde_json::from_str(json).unwrap();
        let current = forecast.currently.as_ref().unwrap();
        assert_eq!(current.temperature, Some(12.5));
        assert_eq!(current.pressure, None);
        assert!(forecast.minutely.is_none());
        assert!(forecast.minutely_points().is_empty());
        assert!(forecast.hourly_points()[0].is_snow());
        assert_eq!(
            forecast.daily_points()[0].sunrise(),
            Some(Instant::from_unix_seconds(1499990000))
        );
    }

    #[test]
    fn test_unknown_precip_type() {
        let point: DataPoint = serde_json::from_str(r#"{"precipType": "hail"}"#).unwrap();
        assert_eq!(point.precip_type, Some(PrecipType::Other));
        assert!(!point.is_snow());
    }

    #[test]
    fn test_precip_expectation_requires_both_fields() {
        let mut point = DataPoint {
            precip_intensity: Some(2.0),
            ..Default::default()
        };
        assert_eq!(point.precip_expectation(), 0.0);
        point.precip_probability = Some(0.5);
        assert_eq!(point.precip_expectation(), 1.0);
    }

    #[test]
    fn test_request_url() {
        let client = ForecastClient::new(
            "https://example.test/",
            ApiKey::new("k3y"),
            Units::default(),
            Duration::from_secs(5),
        )
        .unwrap();
        let url = client.url(Location::new(51.5, -0.25));
        assert_eq!(url, "https://example.test/forecast/k3y/51.5,-0.25");
    }
}
