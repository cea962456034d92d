use std::collections::HashSet;

use lanelet_map::{LaneletID, LaneletMap};

use crate::changes::active_value_idx;
use crate::{Match, RouteSegment, TagChanges};

/// For each change point, the reference segment it falls on.
pub fn change_segments(m: &Match, changes: &TagChanges) -> Vec<usize> {
    changes
        .points
        .iter()
        .filter_map(|pt| m.closest_reference_segment(*pt))
        .collect()
}

/// The value sequence lined up with the reference route. If the routes were traced in opposite
/// directions, the order is flipped.
pub fn aligned_values(m: &Match, changes: &TagChanges) -> Vec<String> {
    if m.same_direction() {
        changes.values.clone()
    } else {
        changes.reversed_values()
    }
}

/// Maps an OSM `highway` value to a lanelet (subtype, location).
pub fn classify_highway(highway: &str) -> (&'static str, &'static str) {
    match highway {
        "motorway" | "trunk" | "motorway_link" | "trunk_link" => ("highway", "nonurban"),
        "primary" | "secondary" | "tertiary" | "unclassified" | "residential" | "primary_link"
        | "secondary_link" | "tertiary_link" | "service" => ("road", "urban"),
        "living_street" => ("play_street", ""),
        "busway" => ("bus_lane", "urban"),
        "cycleway" => ("bicycle_lane", ""),
        _ => ("", ""),
    }
}

/// Sets `subtype` and `location` on every lanelet of the match from the `highway` tag.
pub fn set_type_location(map: &mut LaneletMap, m: &Match, highway: &TagChanges) {
    let indices = change_segments(m, highway);
    let values = aligned_values(m, highway);
    let mut written_subtype = HashSet::new();
    let mut written_location = HashSet::new();
    for (idx, seg) in m.reference.iter().enumerate() {
        let (subtype, location) = classify_highway(&values[active_value_idx(&indices, idx)]);
        write_to_chain(map, seg, "subtype", subtype, &mut written_subtype);
        write_to_chain(map, seg, "location", location, &mut written_location);
    }
}

/// Copies one target tag onto every lanelet of the match, under a new key.
pub fn transfer_tag(map: &mut LaneletMap, m: &Match, lanelet_key: &str, changes: &TagChanges) {
    let indices = change_segments(m, changes);
    let values = aligned_values(m, changes);
    let mut written = HashSet::new();
    for (idx, seg) in m.reference.iter().enumerate() {
        let value = &values[active_value_idx(&indices, idx)];
        write_to_chain(map, seg, lanelet_key, value, &mut written);
    }
}

// Each lanelet is written at most once per key. A missing value is written as the empty string,
// clearing whatever the lanelet had before.
fn write_to_chain(
    map: &mut LaneletMap,
    seg: &RouteSegment,
    key: &str,
    value: &str,
    written: &mut HashSet<LaneletID>,
) {
    for id in seg.chain.all() {
        if !written.insert(id) {
            continue;
        }
        match map.maybe_get_l_mut(id) {
            Some(l) => {
                l.tags.insert(key, value);
            }
            None => warn!("Can't set {}={} on missing {}", key, value, id),
        }
    }
}
