use super::angles::dial_angle;
use super::primitives::{Color, DrawOp, Point};
use super::theme::{WatchColors, mix};
use super::{
    OUTER_TICK_RADIUS, RING_OUTER_RADIUS, RING_THICK_MAX_WIDTH, RING_THICK_MIN_WIDTH,
    RING_THIN_WIDTH, TICK_COUNT,
};
use almanac::Forecast;
use almanac::forecast::DataPoint;
use almanac::time::{HOUR_MS, Instant, MINUTE_MS};
use chrono::{FixedOffset, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Rain ticks
pub const MIN_MINUTELY_POINTS: usize = 40;
pub const RAIN_LIKELY_THRESHOLD: f64 = 0.1; // mm/h
pub const MAX_RAIN: f64 = 8.0; // mm/h at which a tick reaches the centre
pub const TAPER_MINUTES: f64 = 4.0;

// Ring
pub const FORECAST_HOURS: i64 = 11;
pub const PRECIP_DISPLAY_THRESHOLD: f64 = 0.1; // mm/h
pub const RING_MAX_RAIN: f64 = 4.0; // mm/h at which the band stops thickening
pub const STAR_CLOUD_THRESHOLD: f64 = 0.4;
pub const MAX_STARS: f64 = 5.0; // per segment, on a cloudless night
pub const STAR_RADIUS: f64 = 0.005;

// Graphs and gauges
pub const GRAPH_HOURS: i64 = 12;
pub const TEMPERATURE_RANGE: (f64, f64) = (-10.0, 30.0); // C
pub const PRESSURE_RANGE: (f64, f64) = (980.0, 1040.0); // hPa
pub const MAX_WIND_SPEED: f64 = 20.0; // m/s

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|v| v.is_finite())
}

fn ratio(value: f64, (low, high): (f64, f64)) -> f64 {
    ((value - low) / (high - low)).clamp(0.0, 1.0)
}

pub fn temperature_ratio(celsius: f64) -> f64 {
    ratio(celsius, TEMPERATURE_RANGE)
}

pub fn pressure_ratio(hpa: f64) -> f64 {
    ratio(hpa, PRESSURE_RANGE)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainTick {
    /// Extra length added to the minute tick, towards the centre.
    pub length: f64,
    pub color: Color,
}

impl RainTick {
    pub fn neutral(colors: &WatchColors) -> Self {
        Self {
            length: 0.0,
            color: colors.tick,
        }
    }
}

/// Per-minute precipitation for the coming hour, indexed by the minute of the
/// hour the tick sits at. Falls back to an all-neutral ring unless enough
/// minutely data is present and at least one minute is likely to be wet.
pub fn rain_ticks(
    forecast: &Forecast,
    now: Instant,
    offset: FixedOffset,
    colors: &WatchColors,
) -> [RainTick; TICK_COUNT] {
    let neutral = RainTick::neutral(colors);
    let mut ticks = [neutral; TICK_COUNT];
    let end = now.plus_millis(HOUR_MS);
    let mut present = 0;
    let mut likely = false;

    for point in forecast.minutely_points() {
        let Some(time) = point.instant() else {
            continue;
        };
        if time <= now || time > end {
            continue;
        }
        present += 1;

        let expectation = point.precip_expectation();
        likely |= expectation > RAIN_LIKELY_THRESHOLD;

        let remaining = end.millis_since(time) as f64 / MINUTE_MS as f64;
        let taper = (remaining / TAPER_MINUTES).min(1.0);
        let length = (expectation / MAX_RAIN * OUTER_TICK_RADIUS).min(OUTER_TICK_RADIUS) * taper;

        let probability = finite(point.precip_probability).unwrap_or(0.0);
        let wet = if point.is_snow() {
            colors.snow_tick
        } else {
            colors.rain_tick
        };

        let slot = time.to_local(offset).minute() as usize % TICK_COUNT;
        ticks[slot] = RainTick {
            length,
            color: mix(colors.tick, wet, probability),
        };
    }

    if present < MIN_MINUTELY_POINTS || !likely {
        return [neutral; TICK_COUNT];
    }
    ticks
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherRingSegment {
    pub start_angle: f64,
    pub sweep_angle: f64,
    pub precip_expectation: f64,
    pub is_snow: bool,
    pub cloud_cover: f64,
    pub is_day: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SunEvent {
    Sunrise,
    Sunset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SunBoundary {
    time: Instant,
    event: SunEvent,
}

fn sun_boundaries(forecast: &Forecast) -> Vec<SunBoundary> {
    let mut boundaries: Vec<_> = forecast
        .daily_points()
        .iter()
        .flat_map(|day| {
            [
                day.sunrise().map(|time| SunBoundary {
                    time,
                    event: SunEvent::Sunrise,
                }),
                day.sunset().map(|time| SunBoundary {
                    time,
                    event: SunEvent::Sunset,
                }),
            ]
        })
        .flatten()
        .collect();
    boundaries.sort_by_key(|b| b.time);
    boundaries
}

/// Day unless the last boundary at or before `time` was a sunset. With no
/// earlier boundary, the next one decides: an upcoming sunrise means night.
fn is_day_at(boundaries: &[SunBoundary], time: Instant) -> bool {
    let idx = boundaries.partition_point(|b| b.time <= time);
    if idx > 0 {
        boundaries[idx - 1].event == SunEvent::Sunrise
    } else {
        boundaries
            .first()
            .is_none_or(|next| next.event == SunEvent::Sunset)
    }
}

/// Splits `[begin, end)` at every boundary strictly inside it.
fn split_at_boundaries(
    boundaries: &[SunBoundary],
    begin: Instant,
    end: Instant,
) -> Vec<(Instant, Instant)> {
    let first = boundaries.partition_point(|b| b.time <= begin);
    let last = boundaries.partition_point(|b| b.time < end);

    let mut pieces = Vec::new();
    let mut start = begin;
    for boundary in boundaries[first..last.max(first)].iter() {
        pieces.push((start, boundary.time));
        start = boundary.time;
    }
    pieces.push((start, end));
    pieces
}

fn segment(
    point: &DataPoint,
    begin: Instant,
    end: Instant,
    is_day: bool,
    offset: FixedOffset,
) -> WeatherRingSegment {
    WeatherRingSegment {
        start_angle: dial_angle(&begin.to_local(offset)),
        sweep_angle: end.millis_since(begin) as f64 / HOUR_MS as f64 * 30.0,
        precip_expectation: point.precip_expectation(),
        is_snow: point.is_snow(),
        cloud_cover: finite(point.cloud_cover).unwrap_or(0.0).clamp(0.0, 1.0),
        is_day,
    }
}

/// Hourly forecast laid around the dial for `[now, now + 11h)`.
pub fn ring_segments(
    forecast: &Forecast,
    now: Instant,
    offset: FixedOffset,
) -> Vec<WeatherRingSegment> {
    let horizon = now.plus_millis(FORECAST_HOURS * HOUR_MS);
    let boundaries = sun_boundaries(forecast);
    let mut segments = Vec::new();

    for point in forecast.hourly_points() {
        let Some(begin) = point.instant() else {
            continue;
        };
        let end = begin.plus_millis(HOUR_MS);
        let (begin, end) = (begin.max(now), end.min(horizon));
        if end <= begin {
            continue;
        }

        for (piece_begin, piece_end) in split_at_boundaries(&boundaries, begin, end) {
            let is_day = is_day_at(&boundaries, piece_begin);
            segments.push(segment(point, piece_begin, piece_end, is_day, offset));
        }
    }
    segments
}

pub fn star_count(segment: &WeatherRingSegment) -> usize {
    if segment.is_day || segment.cloud_cover >= STAR_CLOUD_THRESHOLD {
        return 0;
    }
    let fraction = 1.0 - segment.cloud_cover / STAR_CLOUD_THRESHOLD;
    (fraction * MAX_STARS).ceil().max(0.0) as usize
}

/// Star positions are a pure function of the segment's start angle (whole
/// degrees) and star count, so they hold still between frames.
pub fn star_positions(segment: &WeatherRingSegment, count: usize) -> Vec<Point> {
    let bucket = segment.start_angle.round().rem_euclid(360.0) as u64;
    let mut rng = StdRng::seed_from_u64((bucket << 32) | count as u64);
    let inner = RING_OUTER_RADIUS - RING_THICK_MAX_WIDTH;

    (0..count)
        .map(|_| {
            let angle = segment.start_angle + rng.random::<f64>() * segment.sweep_angle;
            let radius = inner + rng.random::<f64>() * RING_THICK_MAX_WIDTH;
            Point::polar(angle, radius)
        })
        .collect()
}

fn band(segment: &WeatherRingSegment, width: f64, color: Color) -> DrawOp {
    DrawOp::Arc {
        radius: RING_OUTER_RADIUS - width / 2.0,
        start_angle: segment.start_angle,
        sweep_angle: segment.sweep_angle,
        width,
        color,
    }
}

/// Precipitation draws as a band thickening with intensity; otherwise a thin
/// sky-colored band, with stars on clear nights.
pub fn segment_ops(segment: &WeatherRingSegment, colors: &WatchColors, stars: bool) -> Vec<DrawOp> {
    if segment.precip_expectation >= PRECIP_DISPLAY_THRESHOLD {
        let fraction = (segment.precip_expectation / RING_MAX_RAIN).min(1.0);
        let width = RING_THICK_MIN_WIDTH + fraction * (RING_THICK_MAX_WIDTH - RING_THICK_MIN_WIDTH);
        let color = match (segment.is_snow, segment.is_day) {
            (false, true) => colors.rain_day,
            (false, false) => colors.rain_night,
            (true, true) => colors.snow_day,
            (true, false) => colors.snow_night,
        };
        return vec![band(segment, width, color)];
    }

    let (clear, cloudy) = if segment.is_day {
        (colors.clear_day, colors.cloudy_day)
    } else {
        (colors.clear_night, colors.cloudy_night)
    };
    let mut ops = vec![band(segment, RING_THIN_WIDTH, mix(clear, cloudy, segment.cloud_cover))];

    if stars {
        let count = star_count(segment);
        ops.extend(
            star_positions(segment, count)
                .into_iter()
                .map(|center| DrawOp::Circle {
                    center,
                    radius: STAR_RADIUS,
                    color: colors.star,
                }),
        );
    }
    ops
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphPoint {
    pub angle: f64,
    pub ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlyGraphs {
    pub temperature: Vec<GraphPoint>,
    pub pressure: Vec<GraphPoint>,
}

pub fn hourly_graphs(forecast: &Forecast, now: Instant, offset: FixedOffset) -> HourlyGraphs {
    let horizon = now.plus_millis(GRAPH_HOURS * HOUR_MS);
    let mut graphs = HourlyGraphs::default();

    for point in forecast.hourly_points() {
        let Some(time) = point.instant().filter(|t| *t >= now && *t < horizon) else {
            continue;
        };
        let angle = dial_angle(&time.to_local(offset));
        if let Some(t) = finite(point.temperature) {
            graphs.temperature.push(GraphPoint {
                angle,
                ratio: temperature_ratio(t),
            });
        }
        if let Some(p) = finite(point.pressure) {
            graphs.pressure.push(GraphPoint {
                angle,
                ratio: pressure_ratio(p),
            });
        }
    }
    graphs
}

/// Current conditions as 0..1 gauge fills for the hands.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Gauges {
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
    pub wind: Option<f64>,
    pub wind_bearing: Option<f64>,
}

pub fn gauges(forecast: &Forecast) -> Gauges {
    let Some(current) = &forecast.currently else {
        return Gauges::default();
    };
    Gauges {
        pressure: finite(current.pressure).map(pressure_ratio),
        temperature: finite(current.temperature).map(temperature_ratio),
        wind: finite(current.wind_speed).map(|w| (w / MAX_WIND_SPEED).clamp(0.0, 1.0)),
        wind_bearing: finite(current.wind_bearing),
    }
}
