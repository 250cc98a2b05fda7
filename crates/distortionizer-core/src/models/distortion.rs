use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Channel, CoefficientBank, Eye, EyeIntrinsics, ScreenSize, Selector};
use crate::{Pt2, Real};

/// Which parts of the linear (intrinsics) correction are active.
///
/// The cycle order is `None → LinearFull → CenterOnly → AspectOnly → None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformMode {
    /// Manual center of projection, no affine warp.
    #[default]
    None,
    /// Center from intrinsics and affine warp.
    LinearFull,
    /// Center from intrinsics, no affine warp.
    CenterOnly,
    /// Affine warp; the center keeps its intrinsics-derived position.
    AspectOnly,
}

impl TransformMode {
    /// Next mode in the cycle.
    pub fn next(self) -> Self {
        match self {
            TransformMode::None => TransformMode::LinearFull,
            TransformMode::LinearFull => TransformMode::CenterOnly,
            TransformMode::CenterOnly => TransformMode::AspectOnly,
            TransformMode::AspectOnly => TransformMode::None,
        }
    }

    /// Whether vertices get the per-eye affine scale before the radial step.
    ///
    /// `CenterOnly` moves the center only, never the points.
    pub fn applies_affine_warp(self) -> bool {
        matches!(self, TransformMode::LinearFull | TransformMode::AspectOnly)
    }

    /// Whether center shifts edit the intrinsics center offsets rather than
    /// the manual center of projection.
    pub fn edits_intrinsics_center(self) -> bool {
        matches!(self, TransformMode::LinearFull | TransformMode::CenterOnly)
    }

    /// Whether the live center of projection is derived from intrinsics.
    pub fn uses_derived_center(self) -> bool {
        self != TransformMode::None
    }

    pub fn name(self) -> &'static str {
        match self {
            TransformMode::None => "none",
            TransformMode::LinearFull => "linear_full",
            TransformMode::CenterOnly => "center_only",
            TransformMode::AspectOnly => "aspect_only",
        }
    }
}

impl fmt::Display for TransformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Snapshot of everything the point transform reads.
///
/// The model has no interior state; hosts obtain a fresh snapshot from the
/// session after every command and reuse it for a whole render pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistortionModel {
    pub screen: ScreenSize,
    pub mode: TransformMode,
    pub coefficients: CoefficientBank,
    pub intrinsics: [EyeIntrinsics; 2],
}

impl DistortionModel {
    /// Model with zero coefficients, identity intrinsics and no linear mode.
    pub fn identity(screen: ScreenSize) -> Self {
        Self {
            screen,
            mode: TransformMode::None,
            coefficients: CoefficientBank::zeros(),
            intrinsics: [EyeIntrinsics::identity(); 2],
        }
    }

    pub fn intrinsics(&self, eye: Eye) -> &EyeIntrinsics {
        &self.intrinsics[eye.index()]
    }

    /// Map an ideal screen position to where it must be drawn so that it
    /// appears at `p` after passing through the lens of `eye` in `channel`.
    ///
    /// Steps: optional affine warp about `cop`, radial scale
    /// `1 / (1 + k1·r² + k2·r⁴ + k3·r⁶)` on the offset from `cop`, then
    /// culling of results that leave the eye's half of the screen.
    pub fn transform(&self, p: &Pt2, cop: &Pt2, channel: Channel, eye: Eye) -> Pt2 {
        let warped = if self.mode.applies_affine_warp() {
            self.intrinsics(eye).warp(p, cop)
        } else {
            *p
        };

        let offset = warped - *cop;
        let r = offset.norm();
        let k = self
            .coefficients
            .get(eye, channel)
            .normalized(self.screen.width_f());
        let corrected = *cop + offset * k.radial_scale(r);

        self.cull(corrected, eye)
    }

    /// Push coordinates that fall outside the eye's region onto the
    /// off-screen sentinels, axis by axis.
    pub fn cull(&self, mut p: Pt2, eye: Eye) -> Pt2 {
        let (x_min, x_max) = self.screen.eye_x_range(eye);
        if p.x < x_min || p.x > x_max {
            p.x = self.screen.cull_x(eye);
        }
        if p.y < 0.0 || p.y > self.screen.height_f() {
            p.y = self.screen.cull_y();
        }
        p
    }

    /// Transform `p` and report it only when the host should draw it.
    pub fn transform_visible(&self, p: &Pt2, cop: &Pt2, channel: Channel, eye: Eye) -> Option<Pt2> {
        let tp = self.transform(p, cop, channel, eye);
        self.screen.is_visible(&tp).then_some(tp)
    }

    /// Radial displacement in pixels of a point at distance `r` from the
    /// center, for diagnostics.
    pub fn radial_displacement(&self, r: Real, channel: Channel, eye: Eye) -> Real {
        let k = self
            .coefficients
            .get(eye, channel)
            .normalized(self.screen.width_f());
        r * k.radial_scale(r) - r
    }
}
