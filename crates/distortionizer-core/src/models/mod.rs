//! Calibration model building blocks.
//!
//! The correction applied to a vertex has two stages:
//!
//! 1. `EyeIntrinsics`: an optional per-eye affine warp (independent X/Y scale
//!    about the center of projection), enabled by the active [`TransformMode`].
//! 2. `RadialCoefficients`: a per-eye, per-channel radial polynomial evaluated
//!    on the distance to the center of projection.
//!
//! [`DistortionModel`] bundles a snapshot of both stages together with the
//! [`ScreenSize`] and mode, and exposes the pure point transform.

mod coefficients;
mod distortion;
mod intrinsics;
mod screen;
mod selector;

pub use coefficients::*;
pub use distortion::*;
pub use intrinsics::*;
pub use screen::*;
pub use selector::*;
