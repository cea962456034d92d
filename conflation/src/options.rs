use serde::{Deserialize, Serialize};
use structopt::StructOpt;

use geom::Distance;

/// Knobs for a conflation pass.
#[derive(Clone, Debug, PartialEq, StructOpt, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflationOptions {
    /// When splitting a boundary curve, a projected split point this close (in meters) to an
    /// existing vertex reuses that vertex instead of creating a new one.
    #[structopt(long, default_value = "0.001")]
    pub snap_tolerance_m: f64,
    /// Don't report lanelets that no match touched. By default, they're listed with the
    /// "no match" color so the color list covers the whole map.
    #[structopt(long = "skip-unmatched-colors", parse(from_flag = std::ops::Not::not))]
    pub color_unmatched: bool,
}

impl Default for ConflationOptions {
    fn default() -> ConflationOptions {
        ConflationOptions {
            snap_tolerance_m: 0.001,
            color_unmatched: true,
        }
    }
}

impl ConflationOptions {
    pub fn snap_tolerance(&self) -> Distance {
        Distance::meters(self.snap_tolerance_m)
    }
}
