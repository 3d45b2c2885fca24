//! Galtocaldav Core Library
//!
//! Fetches a week of lessons from a Galaktika timetable service, normalizes
//! them and writes them as events into a CalDAV calendar.

pub mod caldav;
pub mod error;
pub mod ics;
pub mod lesson;
pub mod sync;
pub mod timetable;
pub mod types;
pub mod week;

// Re-export core types and error handling
pub use error::{Error, Result};
pub use types::*;

/// Commonly used items
pub mod prelude {
    pub use crate::{
        caldav::*, ics::*, lesson::*, sync::*, timetable::*, types::*, week::*,
    };
}
