//! Transfers semantic tags from a street network onto a lane-level map.
//!
//! The input is a set of matches, each pairing a reference route through the lane-level map with
//! a target route through the street network. For every match, the lanelets are split wherever a
//! target tag changes value, the tags are copied over (some renamed, `highway` translated into a
//! subtype and location), and the lane count is checked against the street network. Lanelets that
//! are one lane too many and connect to nothing are marked for deletion.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod changes;
mod finalize;
mod options;
mod propagate;
mod reconcile;
mod result;
mod route;
mod split;
mod splitter;

use fusion_util::Timer;
use lanelet_map::LaneletMap;

pub use crate::changes::{active_value_idx, merge_points, TagChanges};
pub use crate::finalize::finalize_map;
pub use crate::options::ConflationOptions;
pub use crate::propagate::{classify_highway, set_type_location, transfer_tag};
pub use crate::reconcile::{check_lanes, expected_lanes};
pub use crate::result::{ConflationResult, LaneColor};
pub use crate::route::{Chain, Direction, Match, RouteSegment};
pub use crate::split::split_lanelets;
pub use crate::splitter::CurveSplitter;

/// The street network tags that matter, in the order they're handled.
pub const TARGET_KEYS: [&str; 8] = [
    "highway",
    "maxspeed",
    "name",
    "oneway",
    "surface",
    "lane_markings",
    "lanes",
    "shoulder",
];

/// Street network key to the lanelet key it's copied into.
pub const TRANSFERS: [(&str, &str); 5] = [
    ("maxspeed", "speed_limit"),
    ("name", "road_name"),
    ("oneway", "one_way"),
    ("surface", "road_surface"),
    ("lane_markings", "lane_markings"),
];

/// Point attributes that map-building tools generate and that go stale once the map is edited.
pub const GENERATED_POINT_TAGS: [&str; 3] = ["local_x", "local_y", "mgrs_code"];

/// Strips generated attributes from every point. Returns how many points changed.
pub fn remove_generated_tags(map: &mut LaneletMap) -> usize {
    let mut changed = 0;
    for pt in map.mut_points() {
        let mut any = false;
        for key in GENERATED_POINT_TAGS {
            any |= pt.tags.remove(key).is_some();
        }
        if any {
            changed += 1;
        }
    }
    changed
}

/// Conflates every match into the map, in order. The map and the matches' chains are modified in
/// place. Deleted lanelets stay in `map`; use `finalize_map` to get a map without them.
pub fn conflate(
    map: &mut LaneletMap,
    matches: &mut [Match],
    opts: &ConflationOptions,
    timer: &mut Timer,
) -> ConflationResult {
    let mut result = ConflationResult::new();
    timer.start(format!("conflate {} matches", matches.len()));
    for (idx, m) in matches.iter_mut().enumerate() {
        if m.is_empty() {
            debug!("Match {} has an empty route, skipping", idx);
            continue;
        }
        if let Err(err) = m.validate() {
            timer.warn(format!("Skipping match {}: {}", idx, err));
            continue;
        }
        conflate_match(map, m, opts, &mut result);
    }
    timer.stop(format!("conflate {} matches", matches.len()));

    if opts.color_unmatched {
        color_unmatched(map, &mut result);
    }
    timer.note(result.summary());
    result
}

fn conflate_match(
    map: &mut LaneletMap,
    m: &mut Match,
    opts: &ConflationOptions,
    result: &mut ConflationResult,
) {
    let changes: Vec<TagChanges> = TARGET_KEYS
        .iter()
        .map(|key| TagChanges::detect(&m.target, key))
        .collect();

    // Split once per point, no matter how many tags change there
    let split_points = merge_points(&changes);
    if !split_points.is_empty() {
        let mut splitter = CurveSplitter::new(opts.snap_tolerance());
        let created = split_lanelets(map, m, &split_points, &mut splitter);
        debug!(
            "Split at {} points, creating {} lanelets",
            split_points.len(),
            created.len()
        );
    }

    set_type_location(map, m, &changes[0]);
    for (osm_key, lanelet_key) in TRANSFERS {
        if let Some(c) = changes.iter().find(|c| c.key == osm_key) {
            transfer_tag(map, m, lanelet_key, c);
        }
    }
    check_lanes(map, m, &changes[6], &changes[7], result);
}

/// Every lanelet that no match colored gets the "no match" color.
pub fn color_unmatched(map: &LaneletMap, result: &mut ConflationResult) {
    for id in map.all_lanelets().keys() {
        if !result.is_colored(*id) {
            result.set_color(*id, LaneColor::NoMatch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusion_util::Tags;
    use geom::Pt3D;

    #[test]
    fn generated_point_tags_are_removed() {
        let mut map = LaneletMap::new();
        let a = map.add_point(
            Pt3D::new(0.0, 0.0, 0.0),
            Tags::new(vec![
                ("local_x", "1.5"),
                ("mgrs_code", "32UPU"),
                ("ele", "520"),
            ]),
        );
        let b = map.add_point(Pt3D::new(1.0, 0.0, 0.0), Tags::new(vec![("ele", "521")]));
        assert_eq!(remove_generated_tags(&mut map), 1);
        assert_eq!(map.get_p(a).tags, Tags::new(vec![("ele", "520")]));
        assert_eq!(map.get_p(b).tags, Tags::new(vec![("ele", "521")]));
    }
}
