use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use fusion_util::Counter;
use lanelet_map::LaneletID;

/// How a lanelet's neighborhood compares to the street network's lane count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LaneColor {
    /// The number of parallel lanelets equals the lane count
    Match,
    Mismatch,
    /// The street network has no lane count here
    Unknown,
    /// No match covered this lanelet at all
    NoMatch,
}

impl LaneColor {
    /// The color names that visualization tools expect.
    pub fn color_name(self) -> &'static str {
        match self {
            LaneColor::Match => "WEBGreen",
            LaneColor::Mismatch => "WEBRed",
            LaneColor::Unknown => "WEBBlueLight",
            LaneColor::NoMatch => "White",
        }
    }
}

impl fmt::Display for LaneColor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.color_name())
    }
}

/// What a conflation pass found, besides the edits it made to the map.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConflationResult {
    /// Lanelets judged to be wrongly mapped. They stay in the working map, but are left out of
    /// the finalized one.
    pub deleted: BTreeSet<LaneletID>,
    /// The first color assigned to each lanelet, in the order assigned
    pub colors: Vec<(LaneletID, LaneColor)>,

    #[serde(skip)]
    colored: HashSet<LaneletID>,
}

impl ConflationResult {
    pub fn new() -> ConflationResult {
        ConflationResult::default()
    }

    /// Records a color, unless the lanelet already has one. Returns true if it was recorded.
    pub fn set_color(&mut self, id: LaneletID, color: LaneColor) -> bool {
        if !self.colored.insert(id) {
            return false;
        }
        self.colors.push((id, color));
        true
    }

    pub fn color(&self, id: LaneletID) -> Option<LaneColor> {
        self.colors
            .iter()
            .find(|(l, _)| *l == id)
            .map(|(_, color)| *color)
    }

    pub fn is_colored(&self, id: LaneletID) -> bool {
        self.colored.contains(&id)
    }

    pub fn delete(&mut self, id: LaneletID) {
        self.deleted.insert(id);
    }

    /// The colors as visualization tools want them
    pub fn color_names(&self) -> Vec<(LaneletID, &'static str)> {
        self.colors
            .iter()
            .map(|(id, color)| (*id, color.color_name()))
            .collect()
    }

    pub fn summary(&self) -> String {
        let mut counts = Counter::new();
        for (_, color) in &self.colors {
            counts.inc(*color);
        }
        format!(
            "{} lanelets colored: {} match, {} mismatch, {} unknown, {} no match. {} deleted.",
            counts.sum(),
            counts.get(LaneColor::Match),
            counts.get(LaneColor::Mismatch),
            counts.get(LaneColor::Unknown),
            counts.get(LaneColor::NoMatch),
            self.deleted.len()
        )
    }
}
