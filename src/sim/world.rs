//! Simulation world and fixed-step pipeline
//!
//! Each step runs three passes over a frozen view of the previous state:
//! 1. Arena pass: spin/bounds checks, drag, floor contact, friction, slope
//! 2. Impact pass: every unordered pair of active tops, once; pairs whose
//!    bounding boxes do not touch skip the exact ring test
//! 3. Commit pass: apply accumulated changes, then integrate positions
//!
//! A top that runs out of spin or leaves the arena is marked finished and
//! skipped; the rest of the step carries on without it.

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::arena::ArenaSurface;
use super::body::{BodyStatus, SpinningBody};
use super::forces::{
    ForceParams, ImpactOutcome, SpinInteraction, accumulate_air_resistance, accumulate_friction,
    accumulate_impact, accumulate_slope, resolve_floor_contact,
};
use crate::config::SimConfig;
use crate::debug::{DebugDraw, colors};
use crate::error::{SimError, SimResult};

/// Stable handle to a body; never reused within a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the world is within a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    Idle,
    ArenaPass,
    ImpactPass,
    CommitPass,
}

/// Something notable that happened during a step
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    /// Top fell below the spin threshold and is finished
    SpinDepleted { body: BodyId, angular_speed: f64 },
    /// Top's tip left every arena and is finished
    OutOfBounds { body: BodyId, tip: DVec3 },
    /// Two tops collided
    Impact {
        a: BodyId,
        b: BodyId,
        outcome: ImpactOutcome,
    },
    /// Two tops of opposite handedness collided; spin exchange skipped
    OppositeSpinUnsupported { a: BodyId, b: BodyId },
}

/// Result of one step
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    /// Tick number of this step (1-based)
    pub tick: u64,
    pub events: Vec<WorldEvent>,
    /// Dynamic tops still active after the step
    pub active: usize,
    /// Pairs whose boxes touched and went on to the exact ring test
    pub narrow_phase_pairs: usize,
}

impl StepReport {
    /// Bodies that finished during this step
    pub fn finished(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.events.iter().filter_map(|event| match event {
            WorldEvent::SpinDepleted { body, .. } | WorldEvent::OutOfBounds { body, .. } => {
                Some(*body)
            }
            _ => None,
        })
    }

    pub fn impacts(&self) -> impl Iterator<Item = (BodyId, BodyId, &ImpactOutcome)> + '_ {
        self.events.iter().filter_map(|event| match event {
            WorldEvent::Impact { a, b, outcome } => Some((*a, *b, outcome)),
            _ => None,
        })
    }
}

/// Renderer-facing view of a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub status: BodyStatus,
    pub center: DVec3,
    pub velocity: DVec3,
    pub angular_velocity: DVec3,
    pub bottom: DVec3,
}

/// Owns every top and arena and advances them in fixed steps
#[derive(Debug)]
pub struct SimulationWorld {
    config: SimConfig,
    params: ForceParams,
    /// Sorted by id for deterministic iteration
    bodies: Vec<(BodyId, SpinningBody)>,
    arenas: Vec<ArenaSurface>,
    tick: u64,
    phase: StepPhase,
    next_id: u32,
}

impl SimulationWorld {
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            params: ForceParams::from(&config),
            config,
            bodies: Vec::new(),
            arenas: Vec::new(),
            tick: 0,
            phase: StepPhase::Idle,
            next_id: 1,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    // --- Population ---

    pub fn add_body(&mut self, body: SpinningBody) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        log::info!(
            "Added top {id} (mass {:.4} kg, spin {:.1} rad/s)",
            body.mass(),
            body.angular_speed()
        );
        // Ids grow monotonically, so pushing keeps the list sorted
        self.bodies.push((id, body));
        id
    }

    /// Returns the arena's index
    pub fn add_arena(&mut self, arena: ArenaSurface) -> usize {
        log::info!(
            "Added arena (radius {:.3} m, curvature {:.3})",
            arena.radius(),
            arena.curvature()
        );
        self.arenas.push(arena);
        self.arenas.len() - 1
    }

    pub fn remove_body(&mut self, id: BodyId) -> SimResult<SpinningBody> {
        let index = self.index_of(id)?;
        let (_, body) = self.bodies.remove(index);
        log::info!("Removed top {id}");
        Ok(body)
    }

    pub fn body(&self, id: BodyId) -> SimResult<&SpinningBody> {
        let index = self.index_of(id)?;
        Ok(&self.bodies[index].1)
    }

    pub fn body_mut(&mut self, id: BodyId) -> SimResult<&mut SpinningBody> {
        let index = self.index_of(id)?;
        Ok(&mut self.bodies[index].1)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &SpinningBody)> + '_ {
        self.bodies.iter().map(|(id, body)| (*id, body))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn arenas(&self) -> &[ArenaSurface] {
        &self.arenas
    }

    /// Dynamic tops that are still in the match
    pub fn active_count(&self) -> usize {
        self.bodies
            .iter()
            .filter(|(_, body)| body.is_active() && !body.is_static())
            .count()
    }

    /// At most one dynamic top is left spinning
    pub fn is_match_over(&self) -> bool {
        self.active_count() <= 1
    }

    /// The last dynamic top standing, once every other one has finished
    pub fn winner(&self) -> Option<BodyId> {
        let mut active = self
            .bodies
            .iter()
            .filter(|(_, body)| body.is_active() && !body.is_static());
        match (active.next(), active.next()) {
            (Some((id, _)), None) => Some(*id),
            _ => None,
        }
    }

    /// Overlap test by handle
    pub fn distance_overlap(&self, a: BodyId, b: BodyId) -> SimResult<Option<f64>> {
        if a == b {
            return Err(SimError::SelfPair(a));
        }
        Ok(SpinningBody::distance_overlap(self.body(a)?, self.body(b)?))
    }

    pub fn snapshot(&self) -> Vec<BodySnapshot> {
        self.bodies
            .iter()
            .map(|(id, body)| BodySnapshot {
                id: *id,
                status: body.status(),
                center: body.center(),
                velocity: body.velocity(),
                angular_velocity: body.angular_velocity(),
                bottom: body.bottom_position(),
            })
            .collect()
    }

    fn index_of(&self, id: BodyId) -> SimResult<usize> {
        self.bodies
            .binary_search_by_key(&id, |(body_id, _)| *body_id)
            .map_err(|_| SimError::UnknownBody(id))
    }

    // --- Step ---

    /// Advance every active top by `dt` seconds
    pub fn step(&mut self, dt: f64) -> SimResult<StepReport> {
        if !(dt.is_finite() && dt >= 0.0) {
            return Err(SimError::InvalidTimestep(dt));
        }
        debug_assert_eq!(self.phase, StepPhase::Idle);

        self.tick += 1;
        let mut events = Vec::new();

        self.phase = StepPhase::ArenaPass;
        self.arena_pass(&mut events);

        self.phase = StepPhase::ImpactPass;
        let narrow_phase_pairs = self.impact_pass(&mut events);

        self.phase = StepPhase::CommitPass;
        for (_, body) in self.bodies.iter_mut().filter(|(_, body)| body.is_active()) {
            body.apply_accumulated_changes(dt);
            body.update(dt);
        }

        self.phase = StepPhase::Idle;
        Ok(StepReport {
            tick: self.tick,
            events,
            active: self.active_count(),
            narrow_phase_pairs,
        })
    }

    fn arena_pass(&mut self, events: &mut Vec<WorldEvent>) {
        let params = self.params;
        let min_spin = self.config.min_spin;

        for (id, body) in self.bodies.iter_mut() {
            if !body.is_active() || body.is_static() {
                continue;
            }

            let angular_speed = body.angular_speed();
            if angular_speed < min_spin {
                log::info!("Top {id} out of spin ({angular_speed:.2} rad/s)");
                body.finish(BodyStatus::Depleted);
                events.push(WorldEvent::SpinDepleted {
                    body: *id,
                    angular_speed,
                });
                continue;
            }

            let tip = body.bottom_position();
            let support = self.arenas.iter().find(|arena| arena.contains(tip.x, tip.z));
            if support.is_none() && !self.arenas.is_empty() {
                log::info!("Top {id} left the arena at ({:.3}, {:.3})", tip.x, tip.z);
                body.finish(BodyStatus::OutOfBounds);
                events.push(WorldEvent::OutOfBounds { body: *id, tip });
                continue;
            }

            accumulate_air_resistance(body, &params);
            match support {
                Some(arena) => {
                    let contact = resolve_floor_contact(body, arena, &params);
                    if contact.is_supported() {
                        accumulate_friction(body, arena, &params);
                        accumulate_slope(body, arena, &params);
                    }
                }
                // No floor at all: free flight
                None => body.accumulate_acceleration(DVec3::new(0.0, -params.gravity, 0.0)),
            }
        }
    }

    /// Returns how many pairs reached the exact overlap test
    fn impact_pass(&mut self, events: &mut Vec<WorldEvent>) -> usize {
        let params = self.params;
        let n = self.bodies.len();
        let mut narrow_phase_pairs = 0;

        for i in 0..n {
            for j in (i + 1)..n {
                let (left, right) = self.bodies.split_at_mut(j);
                let (id_a, a) = &mut left[i];
                let (id_b, b) = &mut right[0];

                if !a.is_active() || !b.is_active() || (a.is_static() && b.is_static()) {
                    continue;
                }
                // Boxes are rebuilt per pair: earlier impacts may have moved either body
                let boxes_touch = match (a.bounds(), b.bounds()) {
                    (Some(box_a), Some(box_b)) => box_a.intersects(&box_b),
                    _ => true,
                };
                if !boxes_touch {
                    continue;
                }

                narrow_phase_pairs += 1;
                let Some(contact) = SpinningBody::distance_overlap(a, b) else {
                    continue;
                };

                let outcome = accumulate_impact(a, b, contact, &params);
                log::debug!(
                    "Impact {id_a} <-> {id_b}: overlap {contact:.4} m, impulse {:.5} N·s",
                    outcome.impulse
                );
                if outcome.interaction == SpinInteraction::OppositeUnsupported {
                    events.push(WorldEvent::OppositeSpinUnsupported { a: *id_a, b: *id_b });
                }
                events.push(WorldEvent::Impact {
                    a: *id_a,
                    b: *id_b,
                    outcome,
                });
            }
        }
        narrow_phase_pairs
    }

    // --- Debug draw ---

    /// Draw bounding boxes of every top and the rim of every arena
    pub fn debug_draw(&self, draw: &mut impl DebugDraw) {
        for arena in &self.arenas {
            let rim = arena.rim_points(64);
            for (k, &start) in rim.iter().enumerate() {
                let end = rim[(k + 1) % rim.len()];
                draw.line(start, end, colors::ARENA_RIM);
            }
        }

        for (_, body) in &self.bodies {
            let color = match body.status() {
                BodyStatus::Active if body.is_static() => colors::STATIC_BODY,
                BodyStatus::Active => colors::ACTIVE_BODY,
                BodyStatus::Depleted | BodyStatus::OutOfBounds => colors::FINISHED_BODY,
            };
            for bounds in body.bounding_volumes() {
                draw.draw_box(&bounds, color);
            }
        }
    }
}
