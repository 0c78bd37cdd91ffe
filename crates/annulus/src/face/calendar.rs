use super::angles::minute_angle;
use super::primitives::{DrawOp, Point};
use super::theme::WatchColors;
use super::{CALENDAR_ARC_WIDTH, CALENDAR_LANE_STEP, CALENDAR_RADIUS, CALENDAR_TEXT_SIZE};
use almanac::CalendarEvent;
use almanac::time::{HOUR_MS, Instant, MINUTE_MS};
use chrono::FixedOffset;

/// Reserved at the end of the hour so the last arc doesn't run into the first.
pub const GAP_MINUTES: i64 = 2;
/// Label heights below the centre, lowest first.
pub const LABEL_SLOTS: [f64; 2] = [0.45, 0.3];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarArc {
    pub start_angle: f64,
    pub sweep_angle: f64,
    pub lane: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarLabel {
    pub title: String,
    pub y: f64,
    pub lane: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarLayout {
    pub arcs: Vec<CalendarArc>,
    pub labels: Vec<CalendarLabel>,
}

pub fn next_hour(events: &[CalendarEvent], now: Instant) -> Vec<&CalendarEvent> {
    let horizon = now.plus_millis(HOUR_MS);
    let mut upcoming: Vec<_> = events
        .iter()
        .filter(|e| e.overlaps(now, horizon))
        .collect();
    upcoming.sort_by_key(|e| e.begin);
    upcoming
}

/// Lays out at most `lanes` events from the coming hour around the minute
/// dial. Only the first two get a title label.
pub fn layout(
    events: &[CalendarEvent],
    now: Instant,
    offset: FixedOffset,
    lanes: usize,
) -> CalendarLayout {
    let clip_end = now.plus_millis(HOUR_MS - GAP_MINUTES * MINUTE_MS);
    let mut layout = CalendarLayout::default();

    for (lane, event) in next_hour(events, now).into_iter().take(lanes).enumerate() {
        let begin = event.begin.max(now);
        let end = event.end.min(clip_end);
        if end <= begin {
            continue;
        }

        layout.arcs.push(CalendarArc {
            start_angle: minute_angle(&begin.to_local(offset), true),
            sweep_angle: end.millis_since(begin) as f64 / HOUR_MS as f64 * 360.0,
            lane,
        });

        if let Some(&y) = LABEL_SLOTS.get(layout.labels.len()) {
            layout.labels.push(CalendarLabel {
                title: event.title.clone(),
                y,
                lane,
            });
        }
    }
    layout
}

pub fn arc_ops(layout: &CalendarLayout, colors: &WatchColors) -> Vec<DrawOp> {
    layout
        .arcs
        .iter()
        .filter_map(|arc| {
            let color = *colors.calendar.get(arc.lane)?;
            Some(DrawOp::Arc {
                radius: CALENDAR_RADIUS - arc.lane as f64 * CALENDAR_LANE_STEP,
                start_angle: arc.start_angle,
                sweep_angle: arc.sweep_angle,
                width: CALENDAR_ARC_WIDTH,
                color,
            })
        })
        .collect()
}

pub fn label_ops(layout: &CalendarLayout, colors: &WatchColors) -> Vec<DrawOp> {
    layout
        .labels
        .iter()
        .map(|label| DrawOp::Text {
            text: label.title.clone(),
            anchor: Point::new(0.0, label.y),
            size: CALENDAR_TEXT_SIZE,
            color: colors.calendar.get(label.lane).copied().unwrap_or(colors.label),
        })
        .collect()
}
