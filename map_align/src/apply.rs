use std::collections::HashSet;

use anyhow::Result;

use geom::{PolyLine, Similarity2D};
use lanelet_map::{CurveID, LaneletMap, PointID};

/// Moves every point of the map by the inverse of `transform`, so a map recorded in the fit's
/// target frame lands in its source frame. Elevation isn't touched.
pub fn transform_map(map: &mut LaneletMap, transform: &Similarity2D) -> Result<()> {
    let inverse = transform
        .inverse()
        .ok_or_else(|| anyhow!("Can't invert {:?}", transform))?;
    let mut count = 0;
    for pt in map.mut_points() {
        pt.pt = inverse.apply_3d(pt.pt);
        count += 1;
    }
    info!("Transformed {} points", count);
    Ok(())
}

/// Like `transform_map`, for a single line. The result is flat.
pub fn transform_polyline(pl: &PolyLine, transform: &Similarity2D) -> Result<PolyLine> {
    let inverse = transform
        .inverse()
        .ok_or_else(|| anyhow!("Can't invert {:?}", transform))?;
    PolyLine::new(
        pl.points()
            .iter()
            .map(|pt| inverse.apply(pt.to_2d()).to_3d(0.0))
            .collect(),
    )
}

/// Points that appear more than once among the curves, in the order the repeat is found. For a
/// street network, these are the intersections.
pub fn intersection_nodes(map: &LaneletMap, curves: &[CurveID]) -> Vec<PointID> {
    let mut seen = HashSet::new();
    let mut found = HashSet::new();
    let mut result = Vec::new();
    for id in curves {
        let curve = match map.maybe_get_c(*id) {
            Some(c) => c,
            None => {
                warn!("Skipping missing {} when looking for intersections", id);
                continue;
            }
        };
        for pt in &curve.points {
            if !seen.insert(*pt) && found.insert(*pt) {
                result.push(*pt);
            }
        }
    }
    result
}
