//! Simulation configuration
//!
//! Physical constants and the match seed, loadable from JSON. Every field has a
//! default so partial files are accepted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{SimError, SimResult};

/// Tunable simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Match seed; per-body recoil streams derive from it
    pub seed: u64,

    // === Environment ===
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    /// Density-like factor scaling air resistance
    pub fluid_drag: f64,
    /// Fraction of driver friction converted into drift
    pub frictional_efficiency: f64,

    // === Contact ===
    /// Tip-to-floor gap above which a top is airborne (m)
    pub floor_clearance: f64,
    /// Converts sampled recoil into angular impulse (N·m·s)
    pub recoil_impulse_scale: f64,

    // === Match rules ===
    /// Angular speed below which a top is out of spin (rad/s)
    pub min_spin: f64,
    /// Hard cap on simulated match length (s)
    pub max_seconds: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed,

            gravity: GRAVITY,
            fluid_drag: FLUID_DRAG,
            frictional_efficiency: FRICTIONAL_EFFICIENCY,

            floor_clearance: FLOOR_CLEARANCE,
            recoil_impulse_scale: RECOIL_IMPULSE_SCALE,

            min_spin: MIN_SPIN,
            max_seconds: 120.0,
        }
    }
}

impl SimConfig {
    /// Default configuration with a specific seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse and validate a configuration from JSON text
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded simulation config from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would make the force laws meaningless
    pub fn validate(&self) -> SimResult<()> {
        let checks: [(&str, f64, bool); 7] = [
            ("gravity", self.gravity, self.gravity > 0.0),
            ("fluid_drag", self.fluid_drag, self.fluid_drag >= 0.0),
            (
                "frictional_efficiency",
                self.frictional_efficiency,
                (0.0..=1.0).contains(&self.frictional_efficiency),
            ),
            ("floor_clearance", self.floor_clearance, self.floor_clearance >= 0.0),
            (
                "recoil_impulse_scale",
                self.recoil_impulse_scale,
                self.recoil_impulse_scale >= 0.0,
            ),
            ("min_spin", self.min_spin, self.min_spin >= 0.0),
            ("max_seconds", self.max_seconds, self.max_seconds > 0.0),
        ];

        for (name, value, ok) in checks {
            if !value.is_finite() || !ok {
                return Err(SimError::Config(format!("{name} out of range: {value}")));
            }
        }
        Ok(())
    }
}
