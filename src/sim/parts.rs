//! Physical parts of a top
//!
//! A top is three stacked parts: the top layer (contact ring), the disc
//! (mostly weight) and the driver (the tip touching the floor). Ordinary
//! ranges in SI units:
//! - top radius 0.02 to 0.03, height 0.008 to 0.012
//! - driver radius 0.0005 to 0.0025, height 0.01 to 0.02
//! - total mass 0.03 to 0.1, moment of inertia 8e-6 to 2e-5

use serde::{Deserialize, Serialize};

use super::recoil::RecoilParams;
use crate::error::{SimError, SimResult};

/// Upper part; owns the contact ring and recoil behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Top {
    pub radius: f64,
    pub height: f64,
    pub mass: f64,
    pub moment_of_inertia: f64,
    pub drag_coefficient: f64,
    pub recoil: RecoilParams,
}

impl Default for Top {
    fn default() -> Self {
        let (radius, mass) = (0.025, 0.03);
        Self {
            radius,
            height: 0.01,
            mass,
            moment_of_inertia: 0.5 * mass * radius * radius,
            drag_coefficient: 0.7,
            recoil: RecoilParams::default(),
        }
    }
}

/// Middle part; contributes weight and inertia
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Disc {
    pub radius: f64,
    pub height: f64,
    pub mass: f64,
    pub moment_of_inertia: f64,
    pub drag_coefficient: f64,
}

impl Default for Disc {
    fn default() -> Self {
        let (radius, mass) = (0.018, 0.025);
        Self {
            radius,
            height: 0.01,
            mass,
            moment_of_inertia: 0.7 * mass * radius * radius,
            drag_coefficient: 0.1,
        }
    }
}

/// Bottom part; governs floor friction and drift
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub radius: f64,
    pub height: f64,
    pub mass: f64,
    pub moment_of_inertia: f64,
    pub drag_coefficient: f64,
    pub friction: f64,
}

impl Default for Driver {
    fn default() -> Self {
        let (radius, mass) = (0.0015, 0.004);
        Self {
            radius,
            height: 0.015,
            mass,
            moment_of_inertia: 0.5 * mass * radius * radius,
            drag_coefficient: 0.1,
            friction: 0.2,
        }
    }
}

/// A full part set
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Parts {
    pub top: Top,
    pub disc: Disc,
    pub driver: Driver,
}

impl Parts {
    /// Check every dimension and mass property is positive and finite
    pub fn validate(&self) -> SimResult<()> {
        let fields = [
            ("top.radius", self.top.radius),
            ("top.height", self.top.height),
            ("top.mass", self.top.mass),
            ("top.moment_of_inertia", self.top.moment_of_inertia),
            ("disc.radius", self.disc.radius),
            ("disc.height", self.disc.height),
            ("disc.mass", self.disc.mass),
            ("disc.moment_of_inertia", self.disc.moment_of_inertia),
            ("driver.radius", self.driver.radius),
            ("driver.height", self.driver.height),
            ("driver.mass", self.driver.mass),
            ("driver.moment_of_inertia", self.driver.moment_of_inertia),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::InvalidPart(format!("{name} must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("top.drag_coefficient", self.top.drag_coefficient),
            ("disc.drag_coefficient", self.disc.drag_coefficient),
            ("driver.drag_coefficient", self.driver.drag_coefficient),
            ("driver.friction", self.driver.friction),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::InvalidPart(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn total_mass(&self) -> f64 {
        self.top.mass + self.disc.mass + self.driver.mass
    }

    pub fn total_moment_of_inertia(&self) -> f64 {
        self.top.moment_of_inertia + self.disc.moment_of_inertia + self.driver.moment_of_inertia
    }

    /// Drag of the assembled top, weighted toward the exposed upper part
    pub fn combined_drag(&self) -> f64 {
        let (w_top, w_disc, w_driver) = crate::consts::DRAG_WEIGHTS;
        w_top * self.top.drag_coefficient
            + w_disc * self.disc.drag_coefficient
            + w_driver * self.driver.drag_coefficient
    }

    /// Stack height from tip to the top of the upper part
    pub fn total_height(&self) -> f64 {
        self.top.height + self.disc.height + self.driver.height
    }
}
