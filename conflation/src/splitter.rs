use std::collections::HashMap;

use anyhow::Result;

use fusion_util::Tags;
use geom::{Distance, PolyLine, Pt3D};
use lanelet_map::{BoundRef, Curve, CurveID, LaneletMap, PointID};

use crate::Direction;

/// Splits boundary curves at a point, remembering what it's already split. Two adjacent lanelets
/// share the curve between them; whichever asks second gets the same result back.
pub struct CurveSplitter {
    snap_tolerance: Distance,
    // Original curve to the curve holding its downstream part
    split: HashMap<CurveID, CurveID>,
}

enum SplitAt {
    // Reuse the vertex at this index
    Vertex(usize),
    // Insert a new vertex between `after` and `after + 1`
    NewVertex { after: usize, pt: Pt3D },
}

impl CurveSplitter {
    pub fn new(snap_tolerance: Distance) -> CurveSplitter {
        CurveSplitter {
            snap_tolerance,
            split: HashMap::new(),
        }
    }

    pub fn already_split(&self, curve: CurveID) -> Option<CurveID> {
        self.split.get(&curve).cloned()
    }

    /// Fails if `split` would, without changing anything.
    pub fn check(&self, map: &LaneletMap, bound: BoundRef, dir: Direction) -> Result<()> {
        if self.split.contains_key(&bound.curve) {
            return Ok(());
        }
        walk_curve(map, bound, dir)?;
        Ok(())
    }

    /// Splits the curve behind a lanelet's bound near `at`. The original curve keeps the upstream
    /// part and the returned bound refers to a new curve holding the rest. "Upstream" is in the
    /// direction of the reference segment, so for lanelets on its backward side, the curve is
    /// walked against the lanelet's own direction.
    pub fn split(
        &mut self,
        map: &mut LaneletMap,
        bound: BoundRef,
        dir: Direction,
        at: Pt3D,
    ) -> Result<BoundRef> {
        if let Some(new) = self.split.get(&bound.curve) {
            return Ok(bound.with_curve(*new));
        }

        let (curve, ids, pl, reversed) = walk_curve(map, bound, dir)?;
        let (mut keep, mut rest) = match self.find_split(&pl, at) {
            SplitAt::Vertex(idx) => (ids[..=idx].to_vec(), ids[idx..].to_vec()),
            SplitAt::NewVertex { after, pt } => {
                let new_pt = map.add_point(pt, Tags::empty());
                let mut keep = ids[..=after].to_vec();
                keep.push(new_pt);
                let mut rest = vec![new_pt];
                rest.extend_from_slice(&ids[after + 1..]);
                (keep, rest)
            }
        };

        // Both halves keep the original's orientation
        if reversed {
            keep.reverse();
            rest.reverse();
        }
        let new_curve = map.add_curve(rest, curve.tags.clone())?;
        match map.maybe_get_c_mut(curve.id) {
            Some(c) => c.points = keep,
            None => bail!("{} vanished while splitting", curve.id),
        }
        debug!("Split {} at {}, downstream is {}", curve.id, at, new_curve);
        self.split.insert(curve.id, new_curve);
        Ok(bound.with_curve(new_curve))
    }

    // Both halves must keep at least two points, so a split landing on either end is nudged to
    // the middle of the first or last piece.
    fn find_split(&self, pl: &PolyLine, at: Pt3D) -> SplitAt {
        let projected = pl.project_pt(at.to_2d());
        let pts = pl.points();
        let n = pts.len();

        let mut closest = 0;
        let mut closest_dist = pts[0].dist2d_to(projected.pt);
        for (idx, pt) in pts.iter().enumerate().skip(1) {
            let dist = pt.dist2d_to(projected.pt);
            if dist < closest_dist {
                closest = idx;
                closest_dist = dist;
            }
        }

        if closest_dist >= self.snap_tolerance {
            return SplitAt::NewVertex {
                after: projected.segment,
                pt: projected.pt,
            };
        }
        if closest == 0 {
            SplitAt::NewVertex {
                after: 0,
                pt: pts[0].midpoint(pts[1]),
            }
        } else if closest == n - 1 {
            SplitAt::NewVertex {
                after: n - 2,
                pt: pts[n - 2].midpoint(pts[n - 1]),
            }
        } else {
            SplitAt::Vertex(closest)
        }
    }
}

// The curve behind a bound, with its points listed in the direction of travel along the reference
// segment.
fn walk_curve(
    map: &LaneletMap,
    bound: BoundRef,
    dir: Direction,
) -> Result<(Curve, Vec<PointID>, PolyLine, bool)> {
    let curve = map
        .maybe_get_c(bound.curve)
        .ok_or_else(|| anyhow!("can't split missing {}", bound.curve))?
        .clone();
    let reversed = bound.inverted != (dir == Direction::Backward);
    let mut ids = curve.points.clone();
    if reversed {
        ids.reverse();
    }
    let mut pts = Vec::new();
    for id in &ids {
        match map.maybe_get_p(*id) {
            Some(p) => pts.push(p.pt),
            None => bail!("{} refers to missing {}", curve.id, id),
        }
    }
    let pl = PolyLine::new(pts)?;
    Ok((curve, ids, pl, reversed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(xs: Vec<f64>) -> (LaneletMap, CurveID, Vec<PointID>) {
        let mut map = LaneletMap::new();
        let pts: Vec<PointID> = xs
            .into_iter()
            .map(|x| map.add_point(Pt3D::new(x, 0.0, x / 10.0), Tags::empty()))
            .collect();
        let curve = map
            .add_curve(pts.clone(), Tags::new(vec![("type", "line_thin")]))
            .unwrap();
        (map, curve, pts)
    }

    fn xs(map: &LaneletMap, curve: CurveID) -> Vec<f64> {
        map.get_c(curve)
            .points
            .iter()
            .map(|id| map.get_p(*id).pt.x())
            .collect()
    }

    #[test]
    fn split_locations() {
        let mut ok = true;
        for (description, at, expected_keep, expected_rest) in vec![
            (
                "between vertices",
                Pt3D::new(15.0, 2.0, 0.0),
                vec![0.0, 10.0, 15.0],
                vec![15.0, 20.0],
            ),
            (
                "snaps to an inner vertex",
                Pt3D::new(10.0005, 1.0, 0.0),
                vec![0.0, 10.0],
                vec![10.0, 20.0],
            ),
            (
                "before the start",
                Pt3D::new(-5.0, 0.0, 0.0),
                vec![0.0, 5.0],
                vec![5.0, 10.0, 20.0],
            ),
            (
                "past the end",
                Pt3D::new(30.0, 3.0, 0.0),
                vec![0.0, 10.0, 15.0],
                vec![15.0, 20.0],
            ),
        ] {
            let (mut map, curve, _) = setup(vec![0.0, 10.0, 20.0]);
            let mut splitter = CurveSplitter::new(Distance::meters(0.001));
            let new = splitter
                .split(&mut map, BoundRef::new(curve), Direction::Forward, at)
                .unwrap();
            let (keep, rest) = (xs(&map, curve), xs(&map, new.curve));
            if keep != expected_keep || rest != expected_rest {
                ok = false;
                println!(
                    "For {}, got {:?} / {:?} but expected {:?} / {:?}",
                    description, keep, rest, expected_keep, expected_rest
                );
            }
        }
        assert!(ok);
    }

    #[test]
    fn halves_reconstruct_the_curve() {
        let (mut map, curve, original) = setup(vec![0.0, 10.0, 20.0, 30.0]);
        let mut splitter = CurveSplitter::new(Distance::meters(0.001));
        let new = splitter
            .split(
                &mut map,
                BoundRef::new(curve),
                Direction::Forward,
                Pt3D::new(12.0, -1.0, 0.0),
            )
            .unwrap();

        let keep = map.get_c(curve).points.clone();
        let rest = map.get_c(new.curve).points.clone();
        assert!(keep.len() >= 2 && rest.len() >= 2);
        assert_eq!(keep.last(), rest.first());
        let split_pt = rest[0];
        let mut joined = keep.clone();
        joined.extend_from_slice(&rest[1..]);
        joined.retain(|id| *id != split_pt);
        assert_eq!(joined, original);

        // Elevation is interpolated, and the new curve inherits attributes
        let pt = map.get_p(split_pt).pt;
        assert_eq!((pt.x(), pt.y()), (12.0, 0.0));
        assert!((pt.z() - 1.2).abs() < 1e-9);
        assert_eq!(map.get_c(new.curve).tags, map.get_c(curve).tags);
    }

    #[test]
    fn snapping_reuses_the_vertex() {
        let (mut map, curve, pts) = setup(vec![0.0, 10.0, 20.0]);
        let num_pts = map.all_points().len();
        let mut splitter = CurveSplitter::new(Distance::meters(0.001));
        let new = splitter
            .split(
                &mut map,
                BoundRef::new(curve),
                Direction::Forward,
                Pt3D::new(10.0, 5.0, 0.0),
            )
            .unwrap();
        assert_eq!(map.all_points().len(), num_pts);
        assert_eq!(map.get_c(curve).points, vec![pts[0], pts[1]]);
        assert_eq!(map.get_c(new.curve).points, vec![pts[1], pts[2]]);
    }

    #[test]
    fn shared_curve_is_split_once() {
        let (mut map, curve, _) = setup(vec![0.0, 10.0, 20.0]);
        let mut splitter = CurveSplitter::new(Distance::meters(0.001));
        let at = Pt3D::new(15.0, 1.0, 0.0);
        let first = splitter
            .split(&mut map, BoundRef::new(curve), Direction::Forward, at)
            .unwrap();
        let num_curves = map.all_curves().len();
        // The neighbor reads the same curve backwards and sits on the backward side
        let second = splitter
            .split(&mut map, BoundRef::inverted(curve), Direction::Backward, at)
            .unwrap();
        assert_eq!(first.curve, second.curve);
        assert!(second.inverted);
        assert_eq!(map.all_curves().len(), num_curves);
        assert_eq!(splitter.already_split(curve), Some(first.curve));
    }

    #[test]
    fn backward_side_walks_in_reference_direction() {
        // Canonically drawn from x=20 to x=0, the way a lanelet on the backward side travels
        let (mut map, curve, pts) = setup(vec![20.0, 10.0, 0.0]);
        let mut splitter = CurveSplitter::new(Distance::meters(0.001));
        let new = splitter
            .split(
                &mut map,
                BoundRef::new(curve),
                Direction::Backward,
                Pt3D::new(15.0, 0.5, 0.0),
            )
            .unwrap();
        assert!(!new.inverted);
        // The original keeps everything upstream of x=15 in the reference direction
        assert_eq!(xs(&map, curve), vec![15.0, 10.0, 0.0]);
        assert_eq!(xs(&map, new.curve), vec![20.0, 15.0]);
        assert_eq!(map.get_c(new.curve).points[0], pts[0]);
    }
}
