//! Data sources for the annulus watch face: forecast API client, calendar
//! event provider, location lookup, and the shared time type.

pub mod calendar;
pub mod forecast;
pub mod location;
pub mod macros;
pub mod time;

pub use calendar::CalendarEvent;
pub use forecast::Forecast;
pub use location::Location;
pub use time::Instant;
