use std::fmt;

use anyhow::Result;
use geo::algorithm::euclidean_length::EuclideanLength;
use geo::algorithm::line_interpolate_point::LineInterpolatePoint;
use serde::{Deserialize, Serialize};

use crate::{Distance, Line, Pt2D, Pt3D};

/// An ordered sequence of at least two points. Measurements happen in 2D; elevation rides along.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolyLine {
    pts: Vec<Pt3D>,
}

/// The result of projecting a point onto a PolyLine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedPt {
    /// The closest point on the PolyLine, with elevation interpolated
    pub pt: Pt3D,
    /// The index of the segment containing the projection; segment `i` runs from point `i` to
    /// point `i + 1`.
    pub segment: usize,
}

impl PolyLine {
    pub fn new(pts: Vec<Pt3D>) -> Result<PolyLine> {
        if pts.len() < 2 {
            bail!("Need at least two points for a PolyLine, got {}", pts.len());
        }
        Ok(PolyLine { pts })
    }

    pub fn points(&self) -> &Vec<Pt3D> {
        &self.pts
    }

    pub fn first_pt(&self) -> Pt3D {
        self.pts[0]
    }

    pub fn last_pt(&self) -> Pt3D {
        self.pts[self.pts.len() - 1]
    }

    // Makes a copy :\
    pub fn lines(&self) -> Vec<Line> {
        self.pts
            .windows(2)
            .map(|pair| Line::new(pair[0].to_2d(), pair[1].to_2d()))
            .collect()
    }

    pub fn length(&self) -> Distance {
        Distance::meters(self.to_geo().euclidean_length())
    }

    pub fn to_geo(&self) -> geo::LineString<f64> {
        self.pts
            .iter()
            .map(|pt| geo::Coordinate { x: pt.x(), y: pt.y() })
            .collect::<Vec<_>>()
            .into()
    }

    /// Finds the closest point along the PolyLine. Ties go to the earliest segment.
    pub fn project_pt(&self, pt: Pt2D) -> ProjectedPt {
        let mut best: Option<(Distance, ProjectedPt)> = None;
        for (idx, line) in self.lines().into_iter().enumerate() {
            let (proj, percent) = line.project_pt(pt);
            let dist = proj.dist_to(pt);
            if best.as_ref().map(|(d, _)| dist < *d).unwrap_or(true) {
                best = Some((
                    dist,
                    ProjectedPt {
                        pt: self.pts[idx].lerp(self.pts[idx + 1], percent),
                        segment: idx,
                    },
                ));
            }
        }
        // There's always at least one segment
        best.map(|(_, proj)| proj).unwrap_or(ProjectedPt {
            pt: self.pts[0],
            segment: 0,
        })
    }

    /// Samples `num_pts` points spaced equally by arc length, including both endpoints.
    pub fn resample(&self, num_pts: usize) -> Result<Vec<Pt2D>> {
        if num_pts < 2 {
            bail!("Can't resample a PolyLine to {} points", num_pts);
        }
        let ls = self.to_geo();
        let mut result = Vec::with_capacity(num_pts);
        for i in 0..num_pts {
            let fraction = (i as f64) / ((num_pts - 1) as f64);
            match ls.line_interpolate_point(fraction) {
                Some(pt) => result.push(Pt2D::from(pt)),
                None => bail!("Couldn't interpolate {} along {}", fraction, self),
            }
        }
        Ok(result)
    }
}

impl fmt::Display for PolyLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "PolyLine::new(vec![")?;
        for pt in &self.pts {
            writeln!(f, "  Pt3D::new({}, {}, {}),", pt.x(), pt.y(), pt.z())?;
        }
        write!(f, "])")
    }
}
