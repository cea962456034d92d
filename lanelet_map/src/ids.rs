use std::fmt;

use serde::{Deserialize, Serialize};

// Every layer draws from one ID space, like the map format these come from, so the newtypes only
// keep the layers from being mixed up.
macro_rules! define_id {
    ($name:ident, $label:expr) => {
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{} #{}", $label, self.0)
            }
        }
    };
}

define_id!(PointID, "Point");
define_id!(CurveID, "Curve");
define_id!(LaneletID, "Lanelet");
define_id!(AreaID, "Area");
define_id!(RegulatoryElementID, "RegulatoryElement");
define_id!(PolygonID, "Polygon");
