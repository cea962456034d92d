use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use fusion_util::Tags;
use geom::{Angle, Pt3D};
use lanelet_map::LaneletID;

/// Which side of a reference segment a lanelet is on, relative to the segment's own direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn both() -> [Direction; 2] {
        [Direction::Forward, Direction::Backward]
    }

    fn tag_prefix(self) -> &'static str {
        match self {
            Direction::Forward => "forward_",
            Direction::Backward => "backward_",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

/// The lanelets a reference segment stands for, in order, on each side.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    #[serde(default)]
    pub forward: Vec<LaneletID>,
    #[serde(default)]
    pub backward: Vec<LaneletID>,
}

impl Chain {
    pub fn new(forward: Vec<LaneletID>, backward: Vec<LaneletID>) -> Chain {
        Chain { forward, backward }
    }

    pub fn side(&self, dir: Direction) -> &Vec<LaneletID> {
        match dir {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        }
    }

    pub fn side_mut(&mut self, dir: Direction) -> &mut Vec<LaneletID> {
        match dir {
            Direction::Forward => &mut self.forward,
            Direction::Backward => &mut self.backward,
        }
    }

    pub fn len(&self) -> usize {
        self.forward.len() + self.backward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty() && self.backward.is_empty()
    }

    /// Forward lanelets first, then backward.
    pub fn all(&self) -> impl Iterator<Item = LaneletID> + '_ {
        self.forward.iter().chain(self.backward.iter()).cloned()
    }

    /// Drops every mention of a lanelet. Later entries shift down, so the chain stays contiguous.
    pub fn remove(&mut self, id: LaneletID) -> bool {
        let before = self.len();
        self.forward.retain(|x| *x != id);
        self.backward.retain(|x| *x != id);
        self.len() != before
    }

    /// The numbered-key encoding: `forward_1`, `forward_2`, ..., `backward_1`, ...
    pub fn to_tags(&self) -> Tags {
        let mut tags = Tags::empty();
        for dir in Direction::both() {
            for (idx, id) in self.side(dir).iter().enumerate() {
                tags.insert(format!("{}{}", dir.tag_prefix(), idx + 1), id.0.to_string());
            }
        }
        tags
    }

    /// Reads the numbered-key encoding. Each side is read from 1 until the first missing index.
    pub fn from_tags(tags: &Tags) -> Result<Chain> {
        let mut chain = Chain::default();
        for dir in Direction::both() {
            let mut idx = 1;
            while let Some(value) = tags.get(&format!("{}{}", dir.tag_prefix(), idx)) {
                let id = value.parse::<i64>().map_err(|err| {
                    anyhow!("{}{} = {} isn't a lanelet ID: {}", dir.tag_prefix(), idx, value, err)
                })?;
                chain.side_mut(dir).push(LaneletID(id));
                idx += 1;
            }
        }
        let numbered = tags
            .inner()
            .keys()
            .filter(|k| k.starts_with("forward_") || k.starts_with("backward_"))
            .count();
        if numbered != chain.len() {
            warn!(
                "Chain has {} numbered keys, but only {} are contiguous from 1",
                numbered,
                chain.len()
            );
        }
        Ok(chain)
    }
}

/// One piece of a route. Reference segments come from the lane-level map and carry a chain;
/// target segments come from the street network and carry its raw tags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub pts: Vec<Pt3D>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub chain: Chain,
}

impl RouteSegment {
    pub fn new(pts: Vec<Pt3D>, tags: Tags) -> RouteSegment {
        RouteSegment {
            pts,
            tags,
            chain: Chain::default(),
        }
    }

    pub fn with_chain(pts: Vec<Pt3D>, chain: Chain) -> RouteSegment {
        RouteSegment {
            pts,
            tags: Tags::empty(),
            chain,
        }
    }

    pub fn first_pt(&self) -> Pt3D {
        self.pts[0]
    }

    pub fn last_pt(&self) -> Pt3D {
        self.pts[self.pts.len() - 1]
    }
}

/// A reference route from the lane-level map paired with the street-network route it was matched
/// to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub reference: Vec<RouteSegment>,
    pub target: Vec<RouteSegment>,
}

impl Match {
    pub fn new(reference: Vec<RouteSegment>, target: Vec<RouteSegment>) -> Match {
        Match { reference, target }
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_empty() || self.target.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        for (name, route) in [("reference", &self.reference), ("target", &self.target)] {
            for (idx, seg) in route.iter().enumerate() {
                if seg.pts.len() < 2 {
                    bail!(
                        "{} segment {} has {} points; need at least 2",
                        name,
                        idx,
                        seg.pts.len()
                    );
                }
            }
        }
        Ok(())
    }

    /// The reference segment whose endpoints are collectively closest to a point, comparing the
    /// sum of both planar distances. Ties go to the earlier segment.
    pub fn closest_reference_segment(&self, pt: Pt3D) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, seg) in self.reference.iter().enumerate() {
            let dist = (seg.first_pt().dist2d_to(pt) + seg.last_pt().dist2d_to(pt)).inner_meters();
            if best.map(|(_, d)| dist < d).unwrap_or(true) {
                best = Some((idx, dist));
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Were both routes traced the same way? Compares the overall start-to-end vectors; anything
    /// under a right angle counts as the same direction.
    pub fn same_direction(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        let vector = |route: &Vec<RouteSegment>| {
            let start = route[0].first_pt();
            let end = route[route.len() - 1].last_pt();
            (end.x() - start.x(), end.y() - start.y())
        };
        let (x1, y1) = vector(&self.reference);
        let (x2, y2) = vector(&self.target);
        Angle::between_vectors(x1, y1, x2, y2).abs().radians() < std::f64::consts::FRAC_PI_2
    }

    /// Removes a lanelet from every reference segment's chain.
    pub fn remove_lanelet(&mut self, id: LaneletID) -> bool {
        let mut any = false;
        for seg in &mut self.reference {
            any |= seg.chain.remove(id);
        }
        any
    }
}
