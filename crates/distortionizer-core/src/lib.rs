//! Core geometry for `distortionizer`.
//!
//! This crate contains the pure parts of stereo HMD lens calibration:
//! - linear algebra type aliases (`Real`, `Pt2`, `Mat3`, ...),
//! - the eye / color channel / polynomial term selectors,
//! - the per-eye, per-channel radial coefficient bank and affine intrinsics,
//! - [`DistortionModel`], the stateless point transform used while rendering,
//! - test-pattern geometry (grid, circles, crosshairs) fed through the model.
//!
//! Point pipeline for one vertex:
//! `corrected = cull(cop + radial(|affine(p) - cop|) * (affine(p) - cop))`
//!
//! The affine stage only runs for [`TransformMode::LinearFull`] and
//! [`TransformMode::AspectOnly`].

/// Linear algebra type aliases and helpers.
mod math;
/// Selectors, coefficient bank, intrinsics and the distortion model.
mod models;
/// Test-pattern geometry corrected through a [`DistortionModel`].
pub mod pattern;

pub use math::*;
pub use models::*;
