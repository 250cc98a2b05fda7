//! Persistence for `distortionizer` sessions.
//!
//! - [`HmdConfig`]: the SteamVR-style `tracking_to_eye_transform` document,
//!   converted to and from the plain
//!   [`CalibrationRecord`](distortionizer_session::CalibrationRecord).
//!   Fields the calibration does not touch are carried through untouched.
//! - [`ConfigStore`]: file-backed load/save of that document.
//! - [`AppSettings`]: optional JSON settings for the console (screen size,
//!   step size, ordering check, file locations).

mod document;
mod error;
mod settings;
mod store;

pub use document::{DistortionBlock, EyeTransform, HmdConfig};
pub use error::ConfigError;
pub use settings::AppSettings;
pub use store::{ConfigStore, DEFAULT_CONFIG_FILE};
