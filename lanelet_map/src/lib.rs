//! A lane-level map: points, boundary curves shared between adjacent lanelets, lanelets, and the
//! layers that are carried along untouched (areas, regulatory elements, polygons).
//!
//! Every layer lives in an arena keyed by ID. Lanelets refer to their bounds by curve ID, so two
//! neighboring lanelets can share one boundary curve without aliasing.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod ids;
mod map;
mod objects;

pub use crate::ids::{AreaID, CurveID, LaneletID, PointID, PolygonID, RegulatoryElementID};
pub use crate::map::LaneletMap;
pub use crate::objects::{
    Area, BoundRef, Curve, Lanelet, MapPolygon, Member, Point, RegulatoryElement,
};
