//! Planar geometry for lane-level maps. Coordinates are in a local metric frame; elevation is
//! carried along but every measurement here is 2D.

#[macro_use]
extern crate anyhow;

pub use crate::angle::Angle;
pub use crate::distance::Distance;
pub use crate::line::Line;
pub use crate::polyline::{PolyLine, ProjectedPt};
pub use crate::pt::{Pt2D, Pt3D};
pub use crate::transform::Similarity2D;

mod angle;
mod distance;
mod line;
mod polyline;
mod pt;
mod transform;

/// Segments shorter than this are treated as a single point.
pub const EPSILON_DIST: Distance = Distance::const_meters(1e-9);
