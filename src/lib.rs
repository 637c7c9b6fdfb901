//! Spin Arena - spinning-top combat physics in a curved bowl
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, arena, force laws, world step)
//! - `config`: Data-driven physical constants and match seed
//! - `debug`: Debug-draw hook for bounding volumes
//! - `error`: Error type shared by the crate

pub mod config;
pub mod debug;
pub mod error;
pub mod sim;

pub use config::SimConfig;
pub use error::{SimError, SimResult};

use glam::DVec3;

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f64 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Gravitational acceleration (m/s²)
    pub const GRAVITY: f64 = 9.81;
    /// Fraction of driver friction converted into translational drift
    pub const FRICTIONAL_EFFICIENCY: f64 = 0.6;
    /// Density-like factor applied to every drag term
    pub const FLUID_DRAG: f64 = 0.08;

    /// Below this angular speed (rad/s) a top has run out of spin
    pub const MIN_SPIN: f64 = 30.0;
    /// Gap between tip and floor (m) above which a top is airborne
    pub const FLOOR_CLEARANCE: f64 = 0.005;

    /// Fixed restitution of every top
    pub const BODY_RESTITUTION: f64 = 0.8;
    /// Fixed friction coefficient of every top
    pub const BODY_FRICTION: f64 = 0.2;

    /// Friction accelerations below this magnitude are replaced by [`FRICTION_FALLBACK`]
    pub const FRICTION_EPSILON: f64 = 0.001;
    /// Drift applied when spin axis and floor normal are aligned (world x)
    pub const FRICTION_FALLBACK: f64 = 0.001;
    /// Slope law is skipped when the two normals are this close to perpendicular
    pub const SLOPE_DOT_EPSILON: f64 = 0.001;

    /// Lower bound of the recoil scaling factor
    pub const RECOIL_FACTOR_FLOOR: f64 = 4.0;
    /// Converts a dimensionless recoil into an angular impulse (N·m·s)
    pub const RECOIL_IMPULSE_SCALE: f64 = 1e-5;
    /// Spin-sum divisor in the recoil scaling curve
    pub const RECOIL_SPIN_FALLOFF: f64 = 501.0;

    /// Weights of the part drag coefficients (top, disc, driver)
    pub const DRAG_WEIGHTS: (f64, f64, f64) = (0.7, 0.2, 0.1);
}

/// Project a vector onto the horizontal XZ plane
#[inline]
pub fn horizontal(v: DVec3) -> DVec3 {
    DVec3::new(v.x, 0.0, v.z)
}

/// Squared horizontal distance between two points
#[inline]
pub fn horizontal_distance_squared(a: DVec3, b: DVec3) -> f64 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    dx * dx + dz * dz
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_drops_y() {
        let v = horizontal(DVec3::new(1.0, 5.0, -2.0));
        assert_eq!(v, DVec3::new(1.0, 0.0, -2.0));
    }

    #[test]
    fn test_horizontal_distance_ignores_height() {
        let a = DVec3::new(0.0, 10.0, 0.0);
        let b = DVec3::new(3.0, -4.0, 4.0);
        assert!((horizontal_distance_squared(a, b) - 25.0).abs() < 1e-12);
    }
}
