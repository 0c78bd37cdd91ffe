use super::primitives::Point;
use super::{
    MAJOR_TICK_LENGTH, MAJOR_TICK_THICKNESS, MINOR_TICK_LENGTH, MINOR_TICK_THICKNESS,
    OUTER_TICK_RADIUS, TICK_COUNT,
};
use chrono::Timelike;

pub fn second_angle(time: &impl Timelike) -> f64 {
    (time.second() as f64 * 6.0) % 360.0
}

/// `sub_minute` adds the seconds contribution. It must be off whenever the
/// display only repaints once a minute, otherwise the hand appears to jump
/// backwards on the next repaint.
pub fn minute_angle(time: &impl Timelike, sub_minute: bool) -> f64 {
    let offset = if sub_minute {
        time.second() as f64 / 10.0
    } else {
        0.0
    };
    (time.minute() as f64 * 6.0 + offset) % 360.0
}

pub fn hour_angle(time: &impl Timelike) -> f64 {
    ((time.hour() % 12) as f64 * 30.0 + time.minute() as f64 / 2.0) % 360.0
}

/// Position of `time` on a twelve-hour dial at full precision. Used to lay
/// hourly data around the face.
pub fn dial_angle(time: &impl Timelike) -> f64 {
    let seconds = time.second() as f64 + time.nanosecond().min(999_999_999) as f64 / 1e9;
    ((time.hour() % 12) as f64 * 30.0 + time.minute() as f64 * 0.5 + seconds / 120.0) % 360.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandAngles {
    pub second: f64,
    pub minute: f64,
    pub hour: f64,
}

impl HandAngles {
    pub fn new(time: &impl Timelike, ambient: bool) -> Self {
        Self {
            second: if ambient { 0.0 } else { second_angle(time) },
            minute: minute_angle(time, !ambient),
            hour: hour_angle(time),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickGeometry {
    pub angle: f64,
    pub outer_radius: f64,
    pub length: f64,
    pub thickness: f64,
    pub major: bool,
}

impl TickGeometry {
    /// Inner and outer end points, with `extra` added to the length inwards.
    pub fn endpoints(&self, extra: f64) -> (Point, Point) {
        let inner = (self.outer_radius - self.length - extra).max(0.0);
        (
            Point::polar(self.angle, inner),
            Point::polar(self.angle, self.outer_radius),
        )
    }
}

/// `chin_ratio` is the height of the flat bottom cutout divided by the face
/// radius. A tick whose outer end would reach below the cutout is shrunk
/// towards the centre until its outer end sits on the cutout line.
pub fn tick_geometry(index: usize, chin_ratio: f64) -> TickGeometry {
    let major = index % 5 == 0;
    let (mut length, thickness) = if major {
        (MAJOR_TICK_LENGTH, MAJOR_TICK_THICKNESS)
    } else {
        (MINOR_TICK_LENGTH, MINOR_TICK_THICKNESS)
    };
    let mut outer_radius = OUTER_TICK_RADIUS;
    let angle = (index % TICK_COUNT) as f64 * 6.0;

    let limit = 1.0 - chin_ratio.max(0.0);
    let projection = -angle.to_radians().cos() * outer_radius;
    if projection > limit {
        let scale = limit / projection;
        outer_radius *= scale;
        length *= scale;
    }

    TickGeometry {
        angle,
        outer_radius,
        length,
        thickness,
        major,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Timelike};

    fn at(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_hand_angles() {
        let t = at(15, 30, 45);
        assert_eq!(second_angle(&t), 270.0);
        assert_eq!(minute_angle(&t, true), 184.5);
        assert_eq!(minute_angle(&t, false), 180.0);
        assert_eq!(hour_angle(&t), 105.0);
        assert_eq!(hour_angle(&at(12, 0, 0)), 0.0);
    }

    #[test]
    fn test_ambient_collapses_to_whole_minutes() {
        let t = at(9, 10, 59);
        let angles = HandAngles::new(&t, true);
        assert_eq!(angles.minute, 60.0);
        assert_eq!(angles.second, 0.0);
        assert!((HandAngles::new(&t, false).minute - 65.9).abs() < 1e-9);
    }

    #[test]
    fn test_minute_angle_monotonic_within_hour() {
        let mut previous = -1.0;
        for second in (0..3600u32).step_by(7) {
            let t = at(4, second / 60, second % 60);
            let angle = minute_angle(&t, true);
            assert!((0.0..360.0).contains(&angle));
            assert!(angle > previous);
            previous = angle;
        }
    }

    #[test]
    fn test_hour_angle_half_degree_per_minute() {
        for minute in 0..59 {
            let a = hour_angle(&at(7, minute, 0));
            let b = hour_angle(&at(7, minute + 1, 0));
            assert!((b - a - 0.5).abs() < 1e-9);
        }
        let wrap = hour_angle(&at(0, 0, 0)) - hour_angle(&at(11, 59, 0));
        assert!((wrap.rem_euclid(360.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_dial_angle_precision() {
        let t = at(6, 0, 0).with_nanosecond(500_000_000).unwrap();
        assert!((dial_angle(&t) - (180.0 + 0.5 / 120.0)).abs() < 1e-9);
    }

    #[test]
    fn test_major_and_minor_ticks() {
        let major = tick_geometry(15, 0.0);
        let minor = tick_geometry(16, 0.0);
        assert!(major.major && !minor.major);
        assert!(major.length > minor.length);
        assert!(major.thickness > minor.thickness);
        assert_eq!(major.outer_radius, OUTER_TICK_RADIUS);
    }

    #[test]
    fn test_chin_clipping_lands_on_cutout_line() {
        let chin_ratio = 0.12;
        let limit = 1.0 - chin_ratio;
        for index in 0..TICK_COUNT {
            let unclipped = tick_geometry(index, 0.0);
            let clipped = tick_geometry(index, chin_ratio);
            let (_, outer) = clipped.endpoints(0.0);
            let (_, raw_outer) = unclipped.endpoints(0.0);

            if raw_outer.y > limit {
                assert!((outer.y - limit).abs() < 1e-9, "tick {index}");
                let ratio = clipped.length / clipped.outer_radius;
                assert!((ratio - unclipped.length / unclipped.outer_radius).abs() < 1e-12);
            } else {
                assert_eq!(clipped, unclipped);
            }
        }
        // the six o'clock tick is always affected by a chin this tall
        assert!(tick_geometry(30, chin_ratio).outer_radius < OUTER_TICK_RADIUS);
    }
}
