//! Registers a lane-level map against another coordinate frame. Two trajectories of the same
//! drive, one recorded in each frame, are fit to each other; the map is then moved by the inverse
//! of that fit.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod apply;
mod fit;
mod icp;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use structopt::StructOpt;

use geom::{PolyLine, Similarity2D};

pub use crate::apply::{intersection_nodes, transform_map, transform_polyline};
pub use crate::fit::{closed_form_fit, umeyama, Fit};
pub use crate::icp::icp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlignAlgorithm {
    /// Iterative closest point
    #[serde(rename = "ICP")]
    Icp,
    /// Closed-form least squares on sequences resampled to the same number of points
    Umeyama,
}

impl FromStr for AlignAlgorithm {
    type Err = anyhow::Error;

    fn from_str(x: &str) -> Result<AlignAlgorithm> {
        match x {
            "ICP" => Ok(AlignAlgorithm::Icp),
            "Umeyama" => Ok(AlignAlgorithm::Umeyama),
            _ => bail!("Registration method {} not supported; use ICP or Umeyama", x),
        }
    }
}

impl fmt::Display for AlignAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AlignAlgorithm::Icp => write!(f, "ICP"),
            AlignAlgorithm::Umeyama => write!(f, "Umeyama"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, StructOpt, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignOptions {
    /// ICP or Umeyama
    #[structopt(long, default_value = "Umeyama")]
    pub algorithm: AlignAlgorithm,
    /// Both trajectories are resampled to this many points, equally spaced along their length.
    #[structopt(long, default_value = "100")]
    pub num_resample: usize,
    /// ICP gives up after this many rounds.
    #[structopt(long, default_value = "50")]
    pub max_iterations: usize,
    /// ICP stops once a round moves the fit less than this.
    #[structopt(long, default_value = "1e-8")]
    pub convergence_epsilon: f64,
    /// Warn when the best uniform scale between the trajectories is smaller than this. They
    /// probably weren't recorded on the same drive.
    #[structopt(long, default_value = "0.95")]
    pub min_scale: f64,
}

impl Default for AlignOptions {
    fn default() -> AlignOptions {
        AlignOptions {
            algorithm: AlignAlgorithm::Umeyama,
            num_resample: 100,
            max_iterations: 50,
            convergence_epsilon: 1e-8,
            min_scale: 0.95,
        }
    }
}

/// The rigid transform moving `src` onto `target`. Elevation is ignored.
pub fn get_transformation(
    src: &PolyLine,
    target: &PolyLine,
    opts: &AlignOptions,
) -> Result<Similarity2D> {
    let transform = match opts.algorithm {
        AlignAlgorithm::Icp => icp(src, target, opts)?,
        AlignAlgorithm::Umeyama => umeyama(src, target, opts)?,
    };
    info!(
        "{} fit: rotation {}, translation {:?}",
        opts.algorithm,
        transform.rotation(),
        transform.translation()
    );
    Ok(transform)
}
