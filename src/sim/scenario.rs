//! Standard match setup

use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::arena::ArenaSurface;
use super::body::SpinningBody;
use super::parts::Parts;
use super::world::{BodyId, SimulationWorld};
use crate::config::SimConfig;
use crate::error::SimResult;

/// Nominal launch spin (rad/s, counter-clockwise seen from above)
pub const LAUNCH_SPIN: f64 = 400.0;
/// Horizontal distance of each launch point from the arena center (m)
pub const LAUNCH_OFFSET: f64 = 0.15;
/// Nominal launch speed toward the center (m/s)
pub const LAUNCH_SPEED: f64 = 0.25;

/// Stream tag separating launch jitter from the per-top recoil streams
const LAUNCH_STREAM: u64 = 0x1a0c_4e11;

/// Per-top launch variation drawn from the match seed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchJitter {
    /// Multiplies [`LAUNCH_SPEED`]
    pub speed: f64,
    /// Sideways velocity as a fraction of the launch speed
    pub sideways: f64,
    /// Multiplies [`LAUNCH_SPIN`]
    pub spin: f64,
}

impl LaunchJitter {
    fn draw(rng: &mut Pcg32) -> Self {
        Self {
            speed: rng.random_range(0.85..=1.15),
            sideways: rng.random_range(0.0..0.1),
            spin: rng.random_range(0.9..=1.1),
        }
    }
}

/// Default stadium with two default tops launched at each other off-center.
///
/// Launch speed, heading and spin are jittered per top from the config seed,
/// so the two tops are never mirror images and the seed decides the match.
/// Each top's recoil stream is seeded from the config seed and its slot.
pub fn standard_match(config: SimConfig) -> SimResult<(SimulationWorld, [BodyId; 2])> {
    let seed = config.seed;
    let mut world = SimulationWorld::new(config)?;
    let arena = ArenaSurface::default();
    let mut launch_rng = Pcg32::seed_from_u64(seed ^ LAUNCH_STREAM);

    let mut ids = [BodyId(0); 2];
    for (slot, side) in [-1.0f64, 1.0].into_iter().enumerate() {
        let parts = Parts::default();
        let mut body = SpinningBody::seeded(parts, seed.wrapping_add(slot as u64))?;
        let jitter = LaunchJitter::draw(&mut launch_rng);

        let x = side * LAUNCH_OFFSET;
        let speed = jitter.speed * LAUNCH_SPEED;
        let velocity = DVec3::new(-side * speed, 0.0, side * jitter.sideways * speed);
        let rest_height = parts.disc.height + parts.driver.height;
        let center = DVec3::new(x, arena.height(x, 0.0) + rest_height, 0.0);
        let spin = DVec3::new(0.0, jitter.spin * LAUNCH_SPIN, 0.0);

        log::debug!("Top {slot} launch: {jitter:?}");
        body.launch(center, velocity, spin);
        ids[slot] = world.add_body(body);
    }

    world.add_arena(arena);
    Ok((world, ids))
}
