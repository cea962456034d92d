use anyhow::Result;

use geom::{Angle, PolyLine, Pt2D, Similarity2D};

use crate::AlignOptions;

/// The least-squares fit between two equally long point sequences, where `src[i]` corresponds to
/// `dst[i]`.
#[derive(Clone, Copy, Debug)]
pub struct Fit {
    /// Rotation and translation only.
    pub rigid: Similarity2D,
    /// The uniform scale that would further reduce the error. Close to 1 when both sequences
    /// describe the same shape.
    pub scale: f64,
}

/// Umeyama's closed-form solution, in 2D. The rotation angle comes straight from the summed cross
/// and dot products of the centered points.
pub fn closed_form_fit(src: &[Pt2D], dst: &[Pt2D]) -> Result<Fit> {
    if src.len() != dst.len() {
        bail!(
            "Can't fit {} points to {}; they need to correspond",
            src.len(),
            dst.len()
        );
    }
    let (mean_src, mean_dst) = match (Pt2D::center(src), Pt2D::center(dst)) {
        (Some(a), Some(b)) => (a, b),
        _ => bail!("Can't fit empty point sets"),
    };

    let mut dot = 0.0;
    let mut cross = 0.0;
    let mut spread = 0.0;
    for (a, b) in src.iter().zip(dst) {
        let (ax, ay) = (a.x() - mean_src.x(), a.y() - mean_src.y());
        let (bx, by) = (b.x() - mean_dst.x(), b.y() - mean_dst.y());
        dot += ax * bx + ay * by;
        cross += ax * by - ay * bx;
        spread += ax * ax + ay * ay;
    }
    if spread < 1e-12 {
        bail!("All {} source points are in the same place", src.len());
    }

    let rotation = Angle::new_rads(cross.atan2(dot));
    let scale = (dot * dot + cross * cross).sqrt() / spread;
    let rotated = Similarity2D::new(1.0, rotation, 0.0, 0.0).apply(mean_src);
    let rigid = Similarity2D::new(
        1.0,
        rotation,
        mean_dst.x() - rotated.x(),
        mean_dst.y() - rotated.y(),
    );
    Ok(Fit { rigid, scale })
}

/// Resamples both trajectories to the same number of points by arc length, then fits them in
/// closed form. A small scale means the trajectories likely don't belong together; that's only
/// worth a warning.
pub fn umeyama(src: &PolyLine, target: &PolyLine, opts: &AlignOptions) -> Result<Similarity2D> {
    let fit = closed_form_fit(
        &src.resample(opts.num_resample)?,
        &target.resample(opts.num_resample)?,
    )?;
    if fit.scale < opts.min_scale {
        warn!(
            "High scaling factor {:.3} between the trajectories. Are you sure they belong \
             together?",
            fit.scale
        );
    }
    Ok(fit.rigid)
}
