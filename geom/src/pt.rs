use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Distance;

/// A planar position, in meters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pt2D {
    x: f64,
    y: f64,
}

impl Pt2D {
    pub fn new(x: f64, y: f64) -> Pt2D {
        if !x.is_finite() || !y.is_finite() {
            panic!("Bad Pt2D {}, {}", x, y);
        }
        Pt2D { x, y }
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    pub fn dist_to(self, to: Pt2D) -> Distance {
        Distance::meters(((self.x - to.x).powi(2) + (self.y - to.y).powi(2)).sqrt())
    }

    pub fn to_3d(self, z: f64) -> Pt3D {
        Pt3D::new(self.x, self.y, z)
    }

    /// The arithmetic mean of some points. Returns None for no points.
    pub fn center(pts: &[Pt2D]) -> Option<Pt2D> {
        if pts.is_empty() {
            return None;
        }
        let n = pts.len() as f64;
        let (x, y) = pts
            .iter()
            .fold((0.0, 0.0), |(x, y), pt| (x + pt.x, y + pt.y));
        Some(Pt2D::new(x / n, y / n))
    }
}

impl fmt::Display for Pt2D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Pt2D({0}, {1})", self.x, self.y)
    }
}

impl From<geo::Point<f64>> for Pt2D {
    fn from(pt: geo::Point<f64>) -> Self {
        Pt2D::new(pt.x(), pt.y())
    }
}

/// A position with elevation. Distances and projections ignore z; it's interpolated along.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pt3D {
    x: f64,
    y: f64,
    #[serde(default)]
    z: f64,
}

impl Pt3D {
    pub fn new(x: f64, y: f64, z: f64) -> Pt3D {
        if !x.is_finite() || !y.is_finite() || !z.is_finite() {
            panic!("Bad Pt3D {}, {}, {}", x, y, z);
        }
        Pt3D { x, y, z }
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    pub fn z(self) -> f64 {
        self.z
    }

    pub fn to_2d(self) -> Pt2D {
        Pt2D::new(self.x, self.y)
    }

    pub fn dist2d_to(self, to: Pt3D) -> Distance {
        self.to_2d().dist_to(to.to_2d())
    }

    pub fn midpoint(self, other: Pt3D) -> Pt3D {
        Pt3D::new(
            (self.x + other.x) / 2.0,
            (self.y + other.y) / 2.0,
            (self.z + other.z) / 2.0,
        )
    }

    /// Linear interpolation; `percent` 0 is self, 1 is `other`.
    pub fn lerp(self, other: Pt3D, percent: f64) -> Pt3D {
        Pt3D::new(
            self.x + percent * (other.x - self.x),
            self.y + percent * (other.y - self.y),
            self.z + percent * (other.z - self.z),
        )
    }

    pub fn with_xy(self, pt: Pt2D) -> Pt3D {
        Pt3D::new(pt.x(), pt.y(), self.z)
    }
}

impl fmt::Display for Pt3D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Pt3D({0}, {1}, {2})", self.x, self.y, self.z)
    }
}
