use fusion_util::Tags;
use geom::Pt3D;
use serde::{Deserialize, Serialize};

use crate::{AreaID, CurveID, LaneletID, PointID, PolygonID, RegulatoryElementID};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointID,
    pub pt: Pt3D,
    #[serde(default)]
    pub tags: Tags,
}

/// A boundary linestring. The point order here is canonical; lanelets may read it backwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub id: CurveID,
    pub points: Vec<PointID>,
    #[serde(default)]
    pub tags: Tags,
}

impl Curve {
    pub fn first_point(&self) -> PointID {
        self.points[0]
    }

    pub fn last_point(&self) -> PointID {
        self.points[self.points.len() - 1]
    }
}

/// How a lanelet uses one of its boundary curves. An inverted bound is the curve read from its
/// last point to its first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundRef {
    pub curve: CurveID,
    #[serde(default)]
    pub inverted: bool,
}

impl BoundRef {
    pub fn new(curve: CurveID) -> BoundRef {
        BoundRef {
            curve,
            inverted: false,
        }
    }

    pub fn inverted(curve: CurveID) -> BoundRef {
        BoundRef {
            curve,
            inverted: true,
        }
    }

    /// Same orientation, different curve.
    pub fn with_curve(self, curve: CurveID) -> BoundRef {
        BoundRef {
            curve,
            inverted: self.inverted,
        }
    }
}

/// A lane segment, bounded on the left and right in its direction of travel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lanelet {
    pub id: LaneletID,
    pub left: BoundRef,
    pub right: BoundRef,
    #[serde(default)]
    pub tags: Tags,
}

impl Lanelet {
    pub fn bounds(&self) -> [BoundRef; 2] {
        [self.left, self.right]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaID,
    pub outer: Vec<BoundRef>,
    #[serde(default)]
    pub inner: Vec<Vec<BoundRef>>,
    #[serde(default)]
    pub tags: Tags,
}

/// Something a regulatory element talks about: a stop line, the lanelets it governs, etc.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Member {
    Point(PointID),
    Curve(CurveID),
    Lanelet(LaneletID),
    Area(AreaID),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryElement {
    pub id: RegulatoryElementID,
    /// (role, member), like "refers" or "ref_line"
    pub members: Vec<(String, Member)>,
    #[serde(default)]
    pub tags: Tags,
}

/// A closed ring of points, implicitly closed from the last point back to the first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapPolygon {
    pub id: PolygonID,
    pub points: Vec<PointID>,
    #[serde(default)]
    pub tags: Tags,
}
