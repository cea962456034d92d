use anyhow::Result;

use geom::Pt3D;
use lanelet_map::{LaneletID, LaneletMap};

use crate::{CurveSplitter, Direction, Match};

/// Splits every lanelet represented by the reference segment closest to each point. The segment's
/// chain then refers to the new, downstream lanelets; the originals keep the upstream geometry.
/// Returns the new lanelets.
pub fn split_lanelets(
    map: &mut LaneletMap,
    m: &mut Match,
    points: &[Pt3D],
    splitter: &mut CurveSplitter,
) -> Vec<LaneletID> {
    let mut created = Vec::new();
    for pt in points {
        let seg = match m.closest_reference_segment(*pt) {
            Some(seg) => seg,
            None => return created,
        };
        for dir in Direction::both() {
            for idx in 0..m.reference[seg].chain.side(dir).len() {
                let orig = m.reference[seg].chain.side(dir)[idx];
                match split_lanelet(map, orig, dir, *pt, splitter) {
                    Ok(new) => {
                        m.reference[seg].chain.side_mut(dir)[idx] = new;
                        created.push(new);
                    }
                    Err(err) => {
                        warn!("Couldn't split {} at {}, leaving it whole: {}", orig, pt, err);
                    }
                }
            }
        }
    }
    created
}

fn split_lanelet(
    map: &mut LaneletMap,
    id: LaneletID,
    dir: Direction,
    at: Pt3D,
    splitter: &mut CurveSplitter,
) -> Result<LaneletID> {
    let orig = map
        .maybe_get_l(id)
        .ok_or_else(|| anyhow!("{} is in a chain, but not in the map", id))?
        .clone();
    // Don't shorten one bound if the other can't follow
    splitter.check(map, orig.left, dir)?;
    splitter.check(map, orig.right, dir)?;
    let left = splitter.split(map, orig.left, dir, at)?;
    let right = splitter.split(map, orig.right, dir, at)?;
    map.add_lanelet(left, right, orig.tags)
}
