//! Mean-longitude ephemeris. Good enough to place planets on a decorative
//! orrery, nowhere near good enough for pointing a telescope.

use almanac::Instant;
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

/// 2000-01-01T12:00:00Z
pub const J2000: Instant = Instant::from_millis(946_728_000_000);
pub const JULIAN_CENTURY_DAYS: f64 = 36525.0;
const JULIAN_CENTURY_MS: f64 = JULIAN_CENTURY_DAYS * 86_400_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, Display)]
pub enum Planet {
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

// (mean longitude at J2000 in degrees, degrees per Julian century)
const MEAN_LONGITUDE: [(f64, f64); Planet::COUNT] = [
    (252.25032350, 149472.67411175),
    (181.97909950, 58517.81538729),
    (100.46457166, 35999.37244981),
    (-4.55343205, 19140.30268499),
    (34.39644051, 3034.74612775),
    (49.95424423, 1222.49362201),
    (313.23810451, 428.48202785),
    (-55.12002969, 218.45945325),
    (238.92903833, 145.20780515),
];

impl Planet {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::iter().nth(idx)
    }

    pub fn mean_longitude_at_epoch(self) -> f64 {
        MEAN_LONGITUDE[self.index()].0
    }

    pub fn rate_per_century(self) -> f64 {
        MEAN_LONGITUDE[self.index()].1
    }
}

/// Ecliptic mean longitude in degrees. Not wrapped to [0, 360).
pub fn planet_longitude(instant: Instant, planet: Planet) -> f64 {
    let centuries = instant.millis_since(J2000) as f64 / JULIAN_CENTURY_MS;
    planet.mean_longitude_at_epoch() + planet.rate_per_century() * centuries
}
