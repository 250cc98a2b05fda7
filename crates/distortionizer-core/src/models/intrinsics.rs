use serde::{Deserialize, Serialize};

use super::{Eye, ScreenSize};
use crate::{mat3_from_rows, mat3_to_rows, Mat3, Pt2, Real};

/// Per-eye affine intrinsics, persisted as a full 3×3 matrix.
///
/// Only four entries drive the correction:
///
/// ```text
/// [ sx   .   cx ]
/// [  .  sy   cy ]
/// [  .   .    . ]
/// ```
///
/// `sx`, `sy` scale the offset from the center of projection; `cx`, `cy` are
/// center offsets stored as fractions of the eye's default center coordinates
/// (`width/4` or `3·width/4` horizontally, `height/2` vertically). The other
/// entries are carried through load/save untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeIntrinsics {
    matrix: Mat3,
}

impl EyeIntrinsics {
    pub fn identity() -> Self {
        Self {
            matrix: Mat3::identity(),
        }
    }

    pub fn from_matrix(matrix: Mat3) -> Self {
        Self { matrix }
    }

    pub fn from_rows(rows: &[[Real; 3]; 3]) -> Self {
        Self::from_matrix(mat3_from_rows(rows))
    }

    pub fn matrix(&self) -> &Mat3 {
        &self.matrix
    }

    pub fn to_rows(&self) -> [[Real; 3]; 3] {
        mat3_to_rows(&self.matrix)
    }

    pub fn scale_x(&self) -> Real {
        self.matrix[(0, 0)]
    }

    pub fn scale_y(&self) -> Real {
        self.matrix[(1, 1)]
    }

    pub fn center_x(&self) -> Real {
        self.matrix[(0, 2)]
    }

    pub fn center_y(&self) -> Real {
        self.matrix[(1, 2)]
    }

    pub fn set_scale_x(&mut self, value: Real) {
        self.matrix[(0, 0)] = value;
    }

    pub fn set_scale_y(&mut self, value: Real) {
        self.matrix[(1, 1)] = value;
    }

    pub fn set_center_x(&mut self, value: Real) {
        self.matrix[(0, 2)] = value;
    }

    pub fn set_center_y(&mut self, value: Real) {
        self.matrix[(1, 2)] = value;
    }

    /// Center of projection implied by the center offsets of this eye.
    pub fn derived_center(&self, eye: Eye, screen: &ScreenSize) -> Pt2 {
        let base = screen.default_center(eye);
        Pt2::new(
            base.x + base.x * self.center_x(),
            base.y + base.y * self.center_y(),
        )
    }

    /// Overwrite the center offsets so that [`Self::derived_center`] returns
    /// `cop`.
    pub fn set_center_from(&mut self, eye: Eye, screen: &ScreenSize, cop: &Pt2) {
        let base = screen.default_center(eye);
        self.set_center_x((cop.x - base.x) / base.x);
        self.set_center_y((cop.y - base.y) / base.y);
    }

    /// Scale the offset of `p` from `cop` independently along X and Y.
    pub fn warp(&self, p: &Pt2, cop: &Pt2) -> Pt2 {
        let rx = cop.x - p.x;
        let ry = cop.y - p.y;
        Pt2::new(cop.x - rx * self.scale_x(), cop.y - ry * self.scale_y())
    }
}

impl Default for EyeIntrinsics {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_derives_default_center_and_no_warp() {
        let screen = ScreenSize::new(2160, 1200);
        let k = EyeIntrinsics::identity();

        let cop = k.derived_center(Eye::Right, &screen);
        assert_eq!((cop.x, cop.y), (1620.0, 600.0));

        let p = Pt2::new(100.0, 900.0);
        assert_eq!(k.warp(&p, &cop), p);
    }

    #[test]
    fn center_offsets_roundtrip_through_cop() {
        let screen = ScreenSize::new(2160, 1200);
        let mut k = EyeIntrinsics::identity();
        k.set_center_x(0.05);
        k.set_center_y(-0.1);

        let cop = k.derived_center(Eye::Left, &screen);
        assert!((cop.x - 567.0).abs() < 1e-9);
        assert!((cop.y - 540.0).abs() < 1e-9);

        let mut other = EyeIntrinsics::identity();
        other.set_center_from(Eye::Left, &screen, &cop);
        assert!((other.center_x() - 0.05).abs() < 1e-12);
        assert!((other.center_y() + 0.1).abs() < 1e-12);
    }

    #[test]
    fn warp_scales_axes_independently() {
        let mut k = EyeIntrinsics::identity();
        k.set_scale_x(2.0);
        k.set_scale_y(0.5);
        let cop = Pt2::new(10.0, 10.0);
        let warped = k.warp(&Pt2::new(12.0, 14.0), &cop);
        assert_eq!((warped.x, warped.y), (14.0, 12.0));
    }

    #[test]
    fn rows_preserve_unused_entries() {
        let rows = [[1.2, 0.01, 0.02], [0.03, 1.08, -0.04], [0.0, 0.0, -1.0]];
        let k = EyeIntrinsics::from_rows(&rows);
        assert_eq!(k.to_rows(), rows);
        assert_eq!(k.center_y(), -0.04);
    }
}
