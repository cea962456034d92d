use anyhow::Result;
use rstar::primitives::{GeomWithData, Line as SegmentGeom};
use rstar::RTree;

use geom::{Line, PolyLine, Pt2D, Similarity2D};

use crate::fit::closed_form_fit;
use crate::AlignOptions;

type Segment = GeomWithData<SegmentGeom<[f64; 2]>, usize>;

/// Iterative closest point from the resampled source trajectory onto the target line. Each round
/// pairs every source point with the closest point anywhere along the target and refits rigidly,
/// until a round barely moves anything.
pub fn icp(src: &PolyLine, target: &PolyLine, opts: &AlignOptions) -> Result<Similarity2D> {
    let src_pts = src.resample(opts.num_resample)?;
    let target = TargetLine::new(target);

    let mut total = Similarity2D::identity();
    let mut moved = src_pts.clone();
    for round in 0..opts.max_iterations {
        let pairs: Vec<Pt2D> = moved.iter().map(|pt| target.closest_pt(*pt)).collect();
        let step = closed_form_fit(&moved, &pairs)?.rigid;
        total = total.then(&step);
        moved = src_pts.iter().map(|pt| total.apply(*pt)).collect();

        let (tx, ty) = step.translation();
        let change = tx * tx + ty * ty + step.rotation().radians().powi(2);
        if change < opts.convergence_epsilon {
            debug!("ICP converged after {} rounds", round + 1);
            return Ok(total);
        }
    }
    warn!(
        "ICP hasn't converged after {} rounds. Continuing anyway",
        opts.max_iterations
    );
    Ok(total)
}

struct TargetLine {
    lines: Vec<Line>,
    tree: RTree<Segment>,
}

impl TargetLine {
    fn new(pl: &PolyLine) -> TargetLine {
        let lines = pl.lines();
        let tree = RTree::bulk_load(
            lines
                .iter()
                .enumerate()
                .map(|(idx, l)| {
                    GeomWithData::new(
                        SegmentGeom::new([l.pt1().x(), l.pt1().y()], [l.pt2().x(), l.pt2().y()]),
                        idx,
                    )
                })
                .collect(),
        );
        TargetLine { lines, tree }
    }

    fn closest_pt(&self, pt: Pt2D) -> Pt2D {
        match self.tree.nearest_neighbor(&[pt.x(), pt.y()]) {
            Some(segment) => self.lines[segment.data].project_pt(pt).0,
            None => pt,
        }
    }
}
