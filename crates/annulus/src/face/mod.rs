pub mod angles;
pub mod astronomy;
pub mod calendar;
pub mod compose;
pub mod primitives;
pub mod theme;
pub mod weather;

pub use compose::{FrameInput, compose};
pub use primitives::{Color, DrawOp, Point};
pub use theme::WatchColors;

pub const TICK_COUNT: usize = 60;
pub const OUTER_TICK_RADIUS: f64 = 0.9375;
pub const MAJOR_TICK_LENGTH: f64 = 0.1875;
pub const MINOR_TICK_LENGTH: f64 = 0.0625;
pub const MAJOR_TICK_THICKNESS: f64 = 0.02;
pub const MINOR_TICK_THICKNESS: f64 = 0.01;

pub const SECOND_LENGTH: f64 = 0.875;
pub const SECOND_THICKNESS: f64 = 0.02;
pub const CENTER_CIRCLE_RADIUS: f64 = 0.04;

// Weather ring, outside the ticks
pub const RING_OUTER_RADIUS: f64 = 0.99;
pub const RING_THIN_WIDTH: f64 = 0.015;
pub const RING_THICK_MIN_WIDTH: f64 = 0.03;
pub const RING_THICK_MAX_WIDTH: f64 = 0.06;

// Hourly graphs, between calendar lanes and ticks
pub const GRAPH_INNER_RADIUS: f64 = 0.45;
pub const GRAPH_OUTER_RADIUS: f64 = 0.72;
pub const GRAPH_WIDTH: f64 = 0.012;

// Calendar arcs, one lane per configured color
pub const CALENDAR_RADIUS: f64 = 0.68;
pub const CALENDAR_LANE_STEP: f64 = 0.05;
pub const CALENDAR_ARC_WIDTH: f64 = 0.04;
pub const CALENDAR_TEXT_SIZE: f64 = 0.1;

// Orrery in the middle of the face
pub const ORRERY_INNER_RADIUS: f64 = 0.1;
pub const ORRERY_OUTER_RADIUS: f64 = 0.4;
pub const PLANET_RADIUS: f64 = 0.012;
