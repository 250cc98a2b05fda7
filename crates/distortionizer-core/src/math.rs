//! Mathematical type definitions shared across the workspace.

use nalgebra::{Matrix3, Point2, Vector2};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 2D point with [`Real`] coordinates, in screen pixels unless noted.
pub type Pt2 = Point2<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;

/// Convert a row-major `[[Real; 3]; 3]` array into a [`Mat3`].
pub fn mat3_from_rows(rows: &[[Real; 3]; 3]) -> Mat3 {
    Mat3::new(
        rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
        rows[2][1], rows[2][2],
    )
}

/// Convert a [`Mat3`] into a row-major `[[Real; 3]; 3]` array.
pub fn mat3_to_rows(m: &Mat3) -> [[Real; 3]; 3] {
    let mut rows = [[0.0; 3]; 3];
    for (r, row) in rows.iter_mut().enumerate() {
        for (c, value) in row.iter_mut().enumerate() {
            *value = m[(r, c)];
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_roundtrip_is_row_major() {
        let rows = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let m = mat3_from_rows(&rows);
        assert_eq!(m[(0, 2)], 3.0);
        assert_eq!(m[(2, 0)], 7.0);
        assert_eq!(mat3_to_rows(&m), rows);
    }
}
