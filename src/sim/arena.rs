//! Bowl-shaped arena surface
//!
//! The floor is a paraboloid `y = k·((x−cx)² + (z−cz)²) + cy` where
//! `k = curvature / radius`. Curvature runs from 0 (flat) to about 1
//! (roughly 45° at the rim) independent of the radius.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// A paraboloid arena floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaSurface {
    center: DVec3,
    radius: f64,
    curvature: f64,
    scaled_curvature: f64,
    friction: f64,
}

impl Default for ArenaSurface {
    fn default() -> Self {
        Self {
            center: DVec3::ZERO,
            radius: 0.4,
            curvature: 0.05,
            scaled_curvature: 0.05 / 0.4,
            friction: 0.2,
        }
    }
}

impl ArenaSurface {
    pub fn new(center: DVec3, radius: f64, curvature: f64, friction: f64) -> SimResult<Self> {
        if !center.is_finite() {
            return Err(SimError::InvalidArena(format!("center must be finite, got {center}")));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(SimError::InvalidArena(format!("radius must be positive, got {radius}")));
        }
        if !(curvature.is_finite() && curvature >= 0.0) {
            return Err(SimError::InvalidArena(format!(
                "curvature must be non-negative, got {curvature}"
            )));
        }
        if !(friction.is_finite() && friction >= 0.0) {
            return Err(SimError::InvalidArena(format!(
                "friction must be non-negative, got {friction}"
            )));
        }

        Ok(Self {
            center,
            radius,
            curvature,
            scaled_curvature: curvature / radius,
            friction,
        })
    }

    /// Flat floor at height `center.y`
    pub fn flat(center: DVec3, radius: f64, friction: f64) -> SimResult<Self> {
        Self::new(center, radius, 0.0, friction)
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn curvature(&self) -> f64 {
        self.curvature
    }

    /// Curvature per unit radius, the `k` of the height formula
    pub fn scaled_curvature(&self) -> f64 {
        self.scaled_curvature
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    /// Whether `(x, z)` lies within the rim
    pub fn contains(&self, x: f64, z: f64) -> bool {
        let dx = x - self.center.x;
        let dz = z - self.center.z;
        dx * dx + dz * dz <= self.radius * self.radius
    }

    /// Floor height at `(x, z)`
    pub fn height(&self, x: f64, z: f64) -> f64 {
        let dx = x - self.center.x;
        let dz = z - self.center.z;
        self.scaled_curvature * (dx * dx + dz * dz) + self.center.y
    }

    /// Unit floor normal at `(x, z)`, always pointing up
    pub fn normal(&self, x: f64, z: f64) -> DVec3 {
        let dx = x - self.center.x;
        let dz = z - self.center.z;
        DVec3::new(
            -2.0 * self.scaled_curvature * dx,
            1.0,
            -2.0 * self.scaled_curvature * dz,
        )
        .normalize()
    }

    /// Signed gap between `point` and the floor below it (negative when inside the floor)
    pub fn clearance(&self, point: DVec3) -> f64 {
        point.y - self.height(point.x, point.z)
    }

    /// Points sampled around the rim, for debug drawing
    pub fn rim_points(&self, segments: usize) -> Vec<DVec3> {
        let segments = segments.max(3);
        let rim_y = self.center.y + self.scaled_curvature * self.radius * self.radius;
        (0..segments)
            .map(|i| {
                let theta = std::f64::consts::TAU * i as f64 / segments as f64;
                DVec3::new(
                    self.center.x + self.radius * theta.cos(),
                    rim_y,
                    self.center.z + self.radius * theta.sin(),
                )
            })
            .collect()
    }
}
