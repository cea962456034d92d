use serde::{Deserialize, Serialize};

use crate::{Pt2D, EPSILON_DIST};

/// A line segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line(Pt2D, Pt2D);

impl Line {
    /// Zero-length lines are allowed; they behave like a single point.
    pub fn new(pt1: Pt2D, pt2: Pt2D) -> Line {
        Line(pt1, pt2)
    }

    pub fn pt1(&self) -> Pt2D {
        self.0
    }

    pub fn pt2(&self) -> Pt2D {
        self.1
    }

    /// Returns the point `percent` of the way along, without clamping to the segment.
    pub fn unbounded_percent_along(&self, percent: f64) -> Pt2D {
        Pt2D::new(
            self.pt1().x() + percent * (self.pt2().x() - self.pt1().x()),
            self.pt1().y() + percent * (self.pt2().y() - self.pt1().y()),
        )
    }

    /// Finds the closest point on this segment to `pt`. Returns that point and how far along the
    /// segment it is, as a percent in [0, 1].
    pub fn project_pt(&self, pt: Pt2D) -> (Pt2D, f64) {
        let dx = self.pt2().x() - self.pt1().x();
        let dy = self.pt2().y() - self.pt1().y();
        let len_squared = dx * dx + dy * dy;
        if len_squared <= EPSILON_DIST.inner_meters().powi(2) {
            return (self.pt1(), 0.0);
        }
        let t = ((pt.x() - self.pt1().x()) * dx + (pt.y() - self.pt1().y()) * dy) / len_squared;
        let t = t.clamp(0.0, 1.0);
        (self.unbounded_percent_along(t), t)
    }
}
