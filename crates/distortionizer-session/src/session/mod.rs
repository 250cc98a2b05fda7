//! Calibration session container and its audit-trail types.

mod calibsession;
mod types;

pub use calibsession::{
    valid_step, CalibrationSession, SessionOptions, MAX_LOG_ENTRIES, MAX_STEP, MIN_STEP,
};
pub use types::{current_timestamp, LogEntry};
