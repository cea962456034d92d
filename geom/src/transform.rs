use serde::{Deserialize, Serialize};

use crate::{Angle, Pt2D, Pt3D};

/// A 2D similarity transform (uniform scale, rotation, translation), stored as a homogeneous 3x3
/// matrix. A rigid transform is just one with scale 1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Similarity2D {
    matrix: [[f64; 3]; 3],
}

impl Similarity2D {
    pub fn identity() -> Similarity2D {
        Similarity2D::new(1.0, Angle::new_rads(0.0), 0.0, 0.0)
    }

    /// Scales and rotates about the origin, then translates.
    pub fn new(scale: f64, rotation: Angle, tx: f64, ty: f64) -> Similarity2D {
        let (sin, cos) = rotation.radians().sin_cos();
        Similarity2D {
            matrix: [
                [scale * cos, -scale * sin, tx],
                [scale * sin, scale * cos, ty],
                [0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn scale(&self) -> f64 {
        self.linear_det().abs().sqrt()
    }

    pub fn rotation(&self) -> Angle {
        Angle::new_rads(self.matrix[1][0].atan2(self.matrix[0][0]))
    }

    pub fn translation(&self) -> (f64, f64) {
        (self.matrix[0][2], self.matrix[1][2])
    }

    fn linear_det(&self) -> f64 {
        let m = &self.matrix;
        m[0][0] * m[1][1] - m[0][1] * m[1][0]
    }

    pub fn apply(&self, pt: Pt2D) -> Pt2D {
        let m = &self.matrix;
        Pt2D::new(
            m[0][0] * pt.x() + m[0][1] * pt.y() + m[0][2],
            m[1][0] * pt.x() + m[1][1] * pt.y() + m[1][2],
        )
    }

    /// Transforms x and y, leaving elevation alone.
    pub fn apply_3d(&self, pt: Pt3D) -> Pt3D {
        pt.with_xy(self.apply(pt.to_2d()))
    }

    /// `self.then(other)` first applies self, then other.
    pub fn then(&self, other: &Similarity2D) -> Similarity2D {
        let a = &other.matrix;
        let b = &self.matrix;
        let mut matrix = [[0.0; 3]; 3];
        for (i, row) in matrix.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
            }
        }
        Similarity2D { matrix }
    }

    /// None if the transform collapses the plane.
    pub fn inverse(&self) -> Option<Similarity2D> {
        let det = self.linear_det();
        if det.abs() < 1e-12 {
            return None;
        }
        let m = &self.matrix;
        let (a, b, c, d) = (m[0][0], m[0][1], m[1][0], m[1][1]);
        let (tx, ty) = (m[0][2], m[1][2]);
        let inv = [[d / det, -b / det], [-c / det, a / det]];
        Some(Similarity2D {
            matrix: [
                [inv[0][0], inv[0][1], -(inv[0][0] * tx + inv[0][1] * ty)],
                [inv[1][0], inv[1][1], -(inv[1][0] * tx + inv[1][1] * ty)],
                [0.0, 0.0, 1.0],
            ],
        })
    }
}
