//! Utility functions module
//!
//! Countdown formatting and duration parsing shared by the configuration
//! and the screens.

pub mod clock;

// Re-export commonly used functions
pub use clock::{format_duration, format_penalty, format_timer, parse_duration};
