use lanelet_map::{LaneletID, LaneletMap};

use crate::changes::{active_value_idx, merge_points};
use crate::propagate::aligned_values;
use crate::{ConflationResult, Direction, LaneColor, Match, TagChanges};

/// Compares the number of parallel lanelets on every reference segment to the street network's
/// lane count (plus shoulders), colors the lanelets accordingly, and marks surplus lanelets that
/// connect to nothing as deleted. Deleted lanelets are removed from the match's chains.
pub fn check_lanes(
    map: &LaneletMap,
    m: &mut Match,
    lanes: &TagChanges,
    shoulder: &TagChanges,
    result: &mut ConflationResult,
) {
    let merged = merge_points(vec![lanes, shoulder]);
    let indices: Vec<usize> = merged
        .iter()
        .filter_map(|pt| m.closest_reference_segment(*pt))
        .collect();

    // Line up both value lists with the merged change points. Each key only advances at its own
    // change points.
    let lane_values = aligned_values(m, lanes);
    let shoulder_values = aligned_values(m, shoulder);
    let mut merged_lanes = vec![lane_values[0].clone()];
    let mut merged_shoulders = vec![shoulder_values[0].clone()];
    let (mut lanes_idx, mut shoulder_idx) = (0, 0);
    for pt in &merged {
        if lanes.points.contains(pt) {
            lanes_idx += 1;
        }
        if shoulder.points.contains(pt) {
            shoulder_idx += 1;
        }
        merged_lanes.push(lane_values[lanes_idx].clone());
        merged_shoulders.push(shoulder_values[shoulder_idx].clone());
    }

    for seg in 0..m.reference.len() {
        let active = active_value_idx(&indices, seg);
        let lanes_osm = expected_lanes(&merged_lanes[active], &merged_shoulders[active]);
        let mut lanes_count = m.reference[seg].chain.len();

        let color = match lanes_osm {
            None => LaneColor::Unknown,
            Some(n) if n == lanes_count => LaneColor::Match,
            Some(_) => LaneColor::Mismatch,
        };
        for id in m.reference[seg].chain.all() {
            result.set_color(id, color);
        }

        if let Some(lanes_osm) = lanes_osm {
            while lanes_count > lanes_osm {
                match find_lonely_lanelet(map, m, seg) {
                    Some(id) => {
                        info!(
                            "{} has no predecessor or successor and is one lane too many; deleting",
                            id
                        );
                        result.delete(id);
                        m.remove_lanelet(id);
                        lanes_count -= 1;
                    }
                    None => {
                        warn!(
                            "Reference segment {} has {} lanelets, but the street network says \
                             {}, and none of them are clearly wrong. Skipping it.",
                            seg, lanes_count, lanes_osm
                        );
                        break;
                    }
                }
            }
        }
    }
}

/// The number of lanelets the street network implies: the `lanes` tag plus one per shoulder.
/// None when there's no usable lane count.
pub fn expected_lanes(lanes: &str, shoulder: &str) -> Option<usize> {
    if lanes.is_empty() {
        return None;
    }
    // Values like "2;3" or "2 lanes" show up; use the leading number
    let digits: String = lanes
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let base = match digits.parse::<usize>() {
        Ok(n) => n,
        Err(_) => {
            warn!("Can't understand lanes={}, treating it as unknown", lanes);
            return None;
        }
    };
    Some(match shoulder {
        "yes" | "left" | "right" => base + 1,
        "both" => base + 2,
        _ => base,
    })
}

// A segment's lanelet with nothing leading into it or out of it, anywhere in the map, is most
// likely mapped by mistake.
fn find_lonely_lanelet(map: &LaneletMap, m: &Match, seg: usize) -> Option<LaneletID> {
    let chain = &m.reference[seg].chain;
    [Direction::Backward, Direction::Forward]
        .into_iter()
        .flat_map(|dir| chain.side(dir).iter().cloned())
        .find(|id| map.maybe_get_l(*id).is_some() && !map.has_neighbor_along(*id))
}
