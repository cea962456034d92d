use std::f64;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An angle, stored in radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Angle(f64);

impl Angle {
    pub fn new_rads(rads: f64) -> Angle {
        Angle(rads)
    }

    pub fn degrees(degs: f64) -> Angle {
        Angle(degs.to_radians())
    }

    /// The signed angle rotating the direction (x1, y1) onto (x2, y2), in (-pi, pi].
    pub fn between_vectors(x1: f64, y1: f64, x2: f64, y2: f64) -> Angle {
        let cross = x1 * y2 - x2 * y1;
        let dot = x1 * x2 + y1 * y2;
        Angle(cross.atan2(dot))
    }

    pub fn radians(self) -> f64 {
        self.0
    }

    pub fn abs(self) -> Angle {
        Angle(self.0.abs())
    }

    pub fn normalized_radians(self) -> f64 {
        self.0.rem_euclid(2.0 * f64::consts::PI)
    }

    pub fn normalized_degrees(self) -> f64 {
        self.normalized_radians().to_degrees()
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Angle({} degrees)", self.normalized_degrees())
    }
}
