use super::angles::{HandAngles, tick_geometry};
use super::astronomy::{Planet, planet_longitude};
use super::calendar::{self, CalendarLayout};
use super::primitives::{Color, DrawOp, Point};
use super::theme::WatchColors;
use super::weather::{self, Gauges, GraphPoint, RainTick};
use super::{
    CENTER_CIRCLE_RADIUS, GRAPH_INNER_RADIUS, GRAPH_OUTER_RADIUS, GRAPH_WIDTH,
    ORRERY_INNER_RADIUS, ORRERY_OUTER_RADIUS, PLANET_RADIUS, SECOND_LENGTH, SECOND_THICKNESS,
    TICK_COUNT,
};
use crate::config::DisplayMode;
use almanac::{CalendarEvent, Forecast, Instant};
use chrono::FixedOffset;
use strum::{EnumCount, IntoEnumIterator};

struct HandShape {
    length: f64,
    thickness: f64,
    tip_thickness: f64,
    tip_length: f64,
}

const HOUR_HAND: HandShape = HandShape {
    length: 0.5,
    thickness: 0.05,
    tip_thickness: 0.04,
    tip_length: 0.04,
};

const MINUTE_HAND: HandShape = HandShape {
    length: 0.75,
    thickness: 0.04,
    tip_thickness: 0.032,
    tip_length: 0.04,
};

const GAUGE_EXTENT: f64 = 0.85; // share of the hand a full gauge covers
const GAUGE_WIDTH_FACTOR: f64 = 0.4;
const WIND_MARKER_RADII: (f64, f64) = (0.06, 0.14);

/// Everything one frame depends on. Snapshots are borrowed, never modified.
pub struct FrameInput<'a> {
    pub now: Instant,
    pub offset: FixedOffset,
    pub ambient: bool,
    pub mode: DisplayMode,
    pub chin_ratio: f64,
    pub forecast: Option<&'a Forecast>,
    pub events: Option<&'a [CalendarEvent]>,
}

/// Builds the ordered draw list for one frame. Missing data only ever removes
/// decoration; it never fails.
pub fn compose(input: &FrameInput<'_>, colors: &WatchColors) -> Vec<DrawOp> {
    let local = input.now.to_local(input.offset);
    let hands = HandAngles::new(&local, input.ambient);

    let mut ops = vec![DrawOp::Fill {
        color: colors.background,
    }];
    ops.extend(orrery_ops(input.now, colors));

    let agenda = match (input.mode, input.events) {
        (DisplayMode::Calendar, Some(events)) => {
            calendar::layout(events, input.now, input.offset, colors.calendar.len())
        }
        _ => CalendarLayout::default(),
    };

    match (input.mode, input.forecast) {
        (DisplayMode::Weather, Some(forecast)) => ops.extend(weather_ops(forecast, input, colors)),
        (DisplayMode::Calendar, _) => ops.extend(calendar::arc_ops(&agenda, colors)),
        _ => {}
    }

    let rain = match input.forecast {
        Some(forecast) if !input.ambient => {
            weather::rain_ticks(forecast, input.now, input.offset, colors)
        }
        _ => [RainTick::neutral(colors); TICK_COUNT],
    };
    ops.extend(tick_ops(&rain, input.chin_ratio));

    let gauges = input.forecast.map(weather::gauges).unwrap_or_default();
    ops.extend(hand_ops(&hands, &gauges, input.ambient, colors));
    ops.push(DrawOp::Circle {
        center: Point::default(),
        radius: CENTER_CIRCLE_RADIUS,
        color: colors.center_circle,
    });

    ops.extend(calendar::label_ops(&agenda, colors));
    ops
}

/// Planets on evenly spaced orbits, rotated so Earth sits at twelve o'clock.
fn orrery_ops(now: Instant, colors: &WatchColors) -> Vec<DrawOp> {
    let earth = planet_longitude(now, Planet::Earth);
    let step = (ORRERY_OUTER_RADIUS - ORRERY_INNER_RADIUS) / (Planet::COUNT - 1) as f64;

    Planet::iter()
        .flat_map(|planet| {
            let radius = ORRERY_INNER_RADIUS + planet.index() as f64 * step;
            let angle = (planet_longitude(now, planet) - earth).rem_euclid(360.0);
            [
                DrawOp::Arc {
                    radius,
                    start_angle: 0.0,
                    sweep_angle: 360.0,
                    width: 0.002,
                    color: colors.orbit,
                },
                DrawOp::Circle {
                    center: Point::polar(angle, radius),
                    radius: PLANET_RADIUS,
                    color: colors.orrery,
                },
            ]
        })
        .collect()
}

fn weather_ops(forecast: &Forecast, input: &FrameInput<'_>, colors: &WatchColors) -> Vec<DrawOp> {
    let mut ops: Vec<_> = weather::ring_segments(forecast, input.now, input.offset)
        .iter()
        .flat_map(|segment| weather::segment_ops(segment, colors, !input.ambient))
        .collect();

    if !input.ambient {
        let graphs = weather::hourly_graphs(forecast, input.now, input.offset);
        ops.extend(graph_op(&graphs.temperature, colors.temperature_graph));
        ops.extend(graph_op(&graphs.pressure, colors.pressure_graph));
    }
    ops
}

fn graph_op(points: &[GraphPoint], color: Color) -> Option<DrawOp> {
    if points.len() < 2 {
        return None;
    }
    let span = GRAPH_OUTER_RADIUS - GRAPH_INNER_RADIUS;
    Some(DrawOp::Polyline {
        points: points
            .iter()
            .map(|p| Point::polar(p.angle, GRAPH_INNER_RADIUS + p.ratio * span))
            .collect(),
        width: GRAPH_WIDTH,
        color,
    })
}

fn tick_ops(rain: &[RainTick; TICK_COUNT], chin_ratio: f64) -> Vec<DrawOp> {
    rain.iter()
        .enumerate()
        .map(|(index, tick)| {
            let geometry = tick_geometry(index, chin_ratio);
            let (from, to) = geometry.endpoints(tick.length);
            DrawOp::Line {
                from,
                to,
                width: geometry.thickness,
                color: tick.color,
            }
        })
        .collect()
}

/// Tapered hand with a pointed tip, pointing at `angle`.
fn hand_polygon(shape: &HandShape, angle: f64) -> Vec<Point> {
    let shoulder = -(shape.length - shape.tip_length);
    [
        Point::new(0.0, 0.0),
        Point::new(-shape.thickness / 2.0, 0.0),
        Point::new(-shape.tip_thickness / 2.0, shoulder),
        Point::new(0.0, -shape.length),
        Point::new(shape.tip_thickness / 2.0, shoulder),
        Point::new(shape.thickness / 2.0, 0.0),
    ]
    .into_iter()
    .map(|p| p.rotated(angle))
    .collect()
}

fn gauge_op(angle: f64, length: f64, width: f64, fill: Option<f64>, color: Color) -> Option<DrawOp> {
    let fill = fill.filter(|f| *f > 0.0)?;
    Some(DrawOp::Line {
        from: Point::default(),
        to: Point::polar(angle, length * GAUGE_EXTENT * fill),
        width: width * GAUGE_WIDTH_FACTOR,
        color,
    })
}

fn hand_ops(hands: &HandAngles, gauges: &Gauges, ambient: bool, colors: &WatchColors) -> Vec<DrawOp> {
    let mut ops = Vec::new();

    for (shape, angle, fill) in [
        (&HOUR_HAND, hands.hour, gauges.pressure),
        (&MINUTE_HAND, hands.minute, gauges.temperature),
    ] {
        ops.push(DrawOp::Polygon {
            points: hand_polygon(shape, angle),
            color: colors.hand,
        });
        ops.extend(gauge_op(angle, shape.length, shape.thickness, fill, colors.gauge));
    }

    if ambient {
        return ops;
    }

    if let Some(bearing) = gauges.wind_bearing {
        let (inner, outer) = WIND_MARKER_RADII;
        ops.push(DrawOp::Line {
            from: Point::polar(bearing, inner),
            to: Point::polar(bearing, outer),
            width: SECOND_THICKNESS,
            color: colors.wind_marker,
        });
    }

    ops.push(DrawOp::Line {
        from: Point::default(),
        to: Point::polar(hands.second, SECOND_LENGTH),
        width: SECOND_THICKNESS,
        color: colors.hand,
    });
    ops.extend(gauge_op(
        hands.second,
        SECOND_LENGTH,
        SECOND_THICKNESS * 2.0,
        gauges.wind,
        colors.gauge,
    ));
    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use almanac::forecast::{DataBlock, DataPoint};
    use almanac::time::{HOUR_MS, MINUTE_MS};

    // 2024-05-01T10:00:30Z
    fn now() -> Instant {
        Instant::from_unix_seconds(1_714_557_630)
    }

    fn input<'a>(
        mode: DisplayMode,
        ambient: bool,
        forecast: Option<&'a Forecast>,
        events: Option<&'a [CalendarEvent]>,
    ) -> FrameInput<'a> {
        FrameInput {
            now: now(),
            offset: FixedOffset::east_opt(0).unwrap(),
            ambient,
            mode,
            chin_ratio: 0.1,
            forecast,
            events,
        }
    }

    fn second_hands(ops: &[DrawOp]) -> usize {
        ops.iter()
            .filter(|op| {
                matches!(op, DrawOp::Line { from, to, .. }
                    if *from == Point::default() && (to.x.hypot(to.y) - SECOND_LENGTH).abs() < 1e-9)
            })
            .count()
    }

    fn lines(ops: &[DrawOp]) -> usize {
        ops.iter()
            .filter(|op| matches!(op, DrawOp::Line { .. }))
            .count()
    }

    fn texts(ops: &[DrawOp]) -> Vec<&str> {
        ops.iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn all_finite(ops: &[DrawOp]) -> bool {
        let ok = |p: &Point| p.x.is_finite() && p.y.is_finite();
        ops.iter().all(|op| match op {
            DrawOp::Fill { .. } => true,
            DrawOp::Line { from, to, width, .. } => ok(from) && ok(to) && width.is_finite(),
            DrawOp::Arc {
                radius,
                start_angle,
                sweep_angle,
                width,
                ..
            } => [radius, start_angle, sweep_angle, width]
                .iter()
                .all(|v| v.is_finite()),
            DrawOp::Polyline { points, .. } | DrawOp::Polygon { points, .. } => {
                points.iter().all(ok)
            }
            DrawOp::Circle { center, radius, .. } => ok(center) && radius.is_finite(),
            DrawOp::Text { anchor, .. } => ok(anchor),
        })
    }

    #[test]
    fn test_frame_without_data() {
        let colors = WatchColors::default();
        let ops = compose(&input(DisplayMode::Weather, false, None, None), &colors);

        assert!(matches!(ops[0], DrawOp::Fill { .. }));
        assert_eq!(lines(&ops), TICK_COUNT + 1);
        assert_eq!(second_hands(&ops), 1);
        assert!(matches!(
            ops.last(),
            Some(DrawOp::Circle { radius, .. }) if *radius == CENTER_CIRCLE_RADIUS
        ));
        assert!(all_finite(&ops));
    }

    #[test]
    fn test_ambient_hides_second_hand() {
        let colors = WatchColors::default();
        let ops = compose(&input(DisplayMode::Weather, true, None, None), &colors);
        assert_eq!(second_hands(&ops), 0);
        assert_eq!(lines(&ops), TICK_COUNT);
    }

    #[test]
    fn test_calendar_mode_draws_arcs_and_labels() {
        let colors = WatchColors::default();
        let events = vec![
            CalendarEvent::new("Standup", now(), now().plus_millis(15 * MINUTE_MS)),
            CalendarEvent::new("Review", now().plus_millis(20 * MINUTE_MS), now().plus_millis(HOUR_MS)),
            CalendarEvent::new("1:1", now().plus_millis(30 * MINUTE_MS), now().plus_millis(40 * MINUTE_MS)),
        ];

        let ops = compose(&input(DisplayMode::Calendar, false, None, Some(&events)), &colors);
        assert_eq!(texts(&ops), vec!["Standup", "Review"]);
        let lanes = ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Arc { color, .. } if colors.calendar.contains(color)))
            .count();
        assert_eq!(lanes, 3);

        let weather = compose(&input(DisplayMode::Weather, false, None, Some(&events)), &colors);
        assert!(texts(&weather).is_empty());
    }

    #[test]
    fn test_garbage_forecast_stays_finite() {
        let colors = WatchColors::default();
        let junk = DataPoint {
            time: Some(1_714_557_600),
            temperature: Some(f64::NAN),
            pressure: Some(f64::INFINITY),
            precip_intensity: Some(f64::NAN),
            precip_probability: Some(f64::NAN),
            cloud_cover: Some(f64::NAN),
            wind_speed: Some(f64::NAN),
            wind_bearing: Some(f64::NAN),
            ..Default::default()
        };
        let block = DataBlock {
            summary: None,
            data: vec![junk.clone(); 3],
        };
        let forecast = Forecast {
            currently: Some(junk),
            minutely: Some(block.clone()),
            hourly: Some(block.clone()),
            daily: Some(block),
            ..Default::default()
        };

        let ops = compose(&input(DisplayMode::Weather, false, Some(&forecast), None), &colors);
        assert!(all_finite(&ops));
    }

    #[test]
    fn test_weather_ring_and_gauges() {
        let colors = WatchColors::default();
        let forecast = Forecast {
            currently: Some(DataPoint {
                temperature: Some(30.0),
                pressure: Some(1040.0),
                wind_speed: Some(10.0),
                wind_bearing: Some(270.0),
                ..Default::default()
            }),
            hourly: Some(DataBlock {
                summary: None,
                data: (0..11)
                    .map(|h| DataPoint {
                        time: Some(1_714_557_600 + h * 3600),
                        temperature: Some(h as f64),
                        ..Default::default()
                    })
                    .collect(),
            }),
            ..Default::default()
        };

        let ops = compose(&input(DisplayMode::Weather, false, Some(&forecast), None), &colors);
        let ring = ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Arc { color, .. } if *color == colors.clear_day))
            .count();
        assert_eq!(ring, 11);
        assert!(ops.iter().any(|op| matches!(op, DrawOp::Polyline { color, .. } if *color == colors.temperature_graph)));
        let gauges = ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { color, .. } if *color == colors.gauge))
            .count();
        assert_eq!(gauges, 3);
        assert!(ops.iter().any(|op| matches!(op, DrawOp::Line { color, .. } if *color == colors.wind_marker)));
    }

    #[test]
    fn test_hand_polygon_points_along_angle() {
        let points = hand_polygon(&MINUTE_HAND, 90.0);
        let tip = points[3];
        assert!((tip.x - MINUTE_HAND.length).abs() < 1e-12);
        assert!(tip.y.abs() < 1e-12);
    }
}
