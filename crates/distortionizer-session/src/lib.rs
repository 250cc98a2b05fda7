//! Interactive calibration state for stereo HMD distortion correction.
//!
//! [`CalibrationSession`] owns every mutable calibration parameter: the
//! coefficient bank, per-eye intrinsics, centers of projection, the active
//! selection and the step size. Hosts translate input events into
//! [`Command`]s (directly, through [`Command::from_str`](std::str::FromStr) or
//! through [`command_for_key`]), apply them, and redraw with the
//! [`DistortionModel`](distortionizer_core::DistortionModel) snapshot returned
//! by [`CalibrationSession::model`].
//!
//! ```
//! use distortionizer_core::{Channel, Eye, ScreenSize, Term};
//! use distortionizer_session::{CalibrationSession, Command, Direction};
//!
//! let mut session = CalibrationSession::new(ScreenSize::default());
//! session.apply(Command::ToggleEye(Eye::Right)).unwrap();
//! session.apply(Command::AdjustCoefficient(Direction::Increase)).unwrap();
//!
//! let k = session.coefficients().value(Eye::Left, Channel::Green, Term::First);
//! assert!((k - 1e-3).abs() < 1e-15);
//! ```
//!
//! Persistence is left to the host: [`CalibrationSession::export_record`] and
//! [`CalibrationSession::load_record`] exchange a plain [`CalibrationRecord`].

mod center;
mod command;
mod error;
mod keymap;
mod record;
mod selection;
pub mod session;

pub use center::{CenterOfProjection, CenterSource};
pub use command::{AxisAdjust, Command, CommandOutcome, Direction};
pub use error::SessionError;
pub use keymap::{command_for_key, Key, KeyChord, Modifiers};
pub use record::{CalibrationRecord, EyeRecord};
pub use selection::{Selection, SelectorSet};
pub use session::{
    valid_step, CalibrationSession, LogEntry, SessionOptions, MAX_LOG_ENTRIES, MAX_STEP, MIN_STEP,
};
