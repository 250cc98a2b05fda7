use serde::{Deserialize, Serialize};

use super::Eye;
use crate::{Pt2, Real};

/// Pixel dimensions of the side-by-side stereo framebuffer.
///
/// The left eye owns `x ∈ [0, width/2]`, the right eye `x ∈ [width/2, width]`;
/// both own the full height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn width_f(&self) -> Real {
        Real::from(self.width)
    }

    pub fn height_f(&self) -> Real {
        Real::from(self.height)
    }

    /// Horizontal extent `[min, max]` owned by `eye`.
    pub fn eye_x_range(&self, eye: Eye) -> (Real, Real) {
        let half = self.width_f() / 2.0;
        match eye {
            Eye::Left => (0.0, half),
            Eye::Right => (half, self.width_f()),
        }
    }

    /// Geometric default center of projection: the middle of the eye's half.
    ///
    /// The right eye's default mirrors the left one around the screen center.
    pub fn default_center(&self, eye: Eye) -> Pt2 {
        let quarter = self.width_f() / 4.0;
        let cy = self.height_f() / 2.0;
        match eye {
            Eye::Left => Pt2::new(quarter, cy),
            Eye::Right => Pt2::new(self.width_f() - quarter, cy),
        }
    }

    /// Nominal intrinsics scale factors `(horizontal, vertical)` for this
    /// resolution: `height / 1000` and `width / 2000`.
    ///
    /// Horizontal scale follows the panel height and vertical scale the eye
    /// width, so 1080x1200 per eye gives `(1.2, 1.08)`.
    pub fn nominal_aspect(&self) -> (Real, Real) {
        (self.height_f() / 1000.0, self.width_f() / 1000.0 / 2.0)
    }

    /// Off-screen x coordinate used to cull a vertex of `eye`.
    pub fn cull_x(&self, eye: Eye) -> Real {
        match eye {
            Eye::Left => -1.0,
            Eye::Right => self.width_f() + 1.0,
        }
    }

    /// Off-screen y coordinate used to cull a vertex of either eye.
    pub fn cull_y(&self) -> Real {
        -1.0
    }

    /// Whether a corrected vertex should be handed to the rasterizer.
    ///
    /// Culled vertices sit exactly on the sentinels returned by
    /// [`Self::cull_x`] / [`Self::cull_y`] and are rejected here.
    pub fn is_visible(&self, p: &Pt2) -> bool {
        p.x > -1.0 && p.x < self.width_f() + 1.0 && p.y > -1.0 && p.y < self.height_f() + 1.0
    }
}

impl Default for ScreenSize {
    /// HTC Vive panel: two 1080x1200 eyes side by side.
    fn default() -> Self {
        Self::new(2160, 1200)
    }
}
