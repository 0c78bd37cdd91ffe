//! Analog watch face whose hands, ticks and rings double as weather and
//! calendar displays.

pub mod config;
pub mod engine;
pub mod events;
pub mod face;
pub mod refresh;
pub mod render;
pub mod sources;
pub mod sys;
