use serde::{Deserialize, Serialize};
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Best-effort "last known position" lookup.
pub trait LocationSource: Send + Sync + 'static {
    fn last_known(&self) -> impl Future<Output = Option<Location>> + Send;
}

/// A position taken from configuration rather than a device sensor.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation(Option<Location>);

impl FixedLocation {
    pub fn new(location: Option<Location>) -> Self {
        Self(location)
    }
}

impl LocationSource for FixedLocation {
    async fn last_known(&self) -> Option<Location> {
        self.0
    }
}
