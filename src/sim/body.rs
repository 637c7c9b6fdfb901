//! Spinning top rigid body
//!
//! A body carries immutable aggregate properties merged from its three parts,
//! its kinematic state, and the pending changes gathered during a step.
//!
//! Changes never touch velocity directly while a step is evaluating. Force
//! laws push into [`Accumulators`]; the world commits them once every body
//! has been visited, so no law sees a half-updated neighbor.
//!
//! Angular velocity sign convention: negative y spins clockwise seen from above.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::bounds::{BoundingBox, aggregate};
use super::parts::Parts;
use super::recoil::RecoilSampler;
use crate::consts::{BODY_FRICTION, BODY_RESTITUTION};
use crate::error::SimResult;
use crate::horizontal_distance_squared;

/// Lifecycle of a top within a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyStatus {
    /// Still simulated
    #[default]
    Active,
    /// Ran out of spin
    Depleted,
    /// Tip left the arena
    OutOfBounds,
}

/// Pending changes for the current step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulators {
    /// Instantaneous velocity change (impulses)
    pub velocity: DVec3,
    /// Instantaneous angular velocity change (impulses)
    pub angular_velocity: DVec3,
    /// Continuous acceleration, scaled by Δt on commit
    pub acceleration: DVec3,
    /// Continuous angular acceleration, scaled by Δt on commit
    pub angular_acceleration: DVec3,
}

impl Accumulators {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Drain the pending changes, leaving zeros behind
    pub fn take(&mut self) -> Accumulators {
        std::mem::take(self)
    }
}

/// A spinning top
#[derive(Debug)]
pub struct SpinningBody {
    parts: Parts,

    // Aggregate properties
    mass: f64,
    moment_of_inertia: f64,
    drag_coefficient: f64,
    restitution: f64,
    friction: f64,
    recoil: Box<dyn RecoilSampler>,

    // Kinematic state
    center: DVec3,
    velocity: DVec3,
    angular_velocity: DVec3,

    pending: Accumulators,
    local_bounds: Vec<BoundingBox>,
    is_static: bool,
    status: BodyStatus,
}

impl SpinningBody {
    /// Assemble a top from its parts and a recoil source
    pub fn new(parts: Parts, recoil: Box<dyn RecoilSampler>) -> SimResult<Self> {
        parts.validate()?;

        let local_bounds = stacked_bounds(&parts);
        Ok(Self {
            mass: parts.total_mass(),
            moment_of_inertia: parts.total_moment_of_inertia(),
            drag_coefficient: parts.combined_drag(),
            restitution: BODY_RESTITUTION,
            friction: BODY_FRICTION,
            recoil,
            center: DVec3::ZERO,
            velocity: DVec3::ZERO,
            angular_velocity: DVec3::Y,
            pending: Accumulators::default(),
            local_bounds,
            is_static: false,
            status: BodyStatus::Active,
            parts,
        })
    }

    /// Assemble a top whose recoil is drawn from the top part's distribution
    pub fn seeded(parts: Parts, seed: u64) -> SimResult<Self> {
        let recoil = parts.top.recoil.sampler(seed)?;
        Self::new(parts, Box::new(recoil))
    }

    /// Mark as static: never integrated, infinite mass in impacts
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Set the launch state and clear anything left over from a previous match
    pub fn launch(&mut self, center: DVec3, velocity: DVec3, angular_velocity: DVec3) {
        self.center = center;
        self.velocity = velocity;
        self.angular_velocity = angular_velocity;
        self.pending = Accumulators::default();
        self.status = BodyStatus::Active;
    }

    // --- Accessors ---

    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    pub fn angular_velocity(&self) -> DVec3 {
        self.angular_velocity
    }

    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    pub fn angular_speed(&self) -> f64 {
        self.angular_velocity.length()
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Zero for static bodies
    pub fn inverse_mass(&self) -> f64 {
        if self.is_static { 0.0 } else { 1.0 / self.mass }
    }

    pub fn moment_of_inertia(&self) -> f64 {
        self.moment_of_inertia
    }

    pub fn drag_coefficient(&self) -> f64 {
        self.drag_coefficient
    }

    pub fn restitution(&self) -> f64 {
        self.restitution
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    pub fn driver_friction(&self) -> f64 {
        self.parts.driver.friction
    }

    pub fn top_radius(&self) -> f64 {
        self.parts.top.radius
    }

    pub fn top_height(&self) -> f64 {
        self.parts.top.height
    }

    pub fn disc_radius(&self) -> f64 {
        self.parts.disc.radius
    }

    pub fn disc_height(&self) -> f64 {
        self.parts.disc.height
    }

    pub fn driver_radius(&self) -> f64 {
        self.parts.driver.radius
    }

    pub fn driver_height(&self) -> f64 {
        self.parts.driver.height
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn status(&self) -> BodyStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == BodyStatus::Active
    }

    pub fn pending(&self) -> &Accumulators {
        &self.pending
    }

    pub fn is_spinning_clockwise(&self) -> bool {
        self.angular_velocity.y < 0.0
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    pub fn rotational_energy(&self) -> f64 {
        0.5 * self.moment_of_inertia * self.angular_velocity.length_squared()
    }

    /// Spin axis with the pole chosen so that y is never negative.
    ///
    /// Falls back to world up when the top is not spinning at all.
    pub fn normal(&self) -> DVec3 {
        let axis = self.angular_velocity.try_normalize().unwrap_or(DVec3::Y);
        if axis.y < 0.0 { -axis } else { axis }
    }

    /// Contact point of the driver tip, tilted with the spin axis
    pub fn bottom_position(&self) -> DVec3 {
        self.center - self.normal() * (self.parts.disc.height + self.parts.driver.height)
    }

    /// Part boxes relative to the center
    pub fn local_bounding_volumes(&self) -> &[BoundingBox] {
        &self.local_bounds
    }

    /// Part boxes in world space
    pub fn bounding_volumes(&self) -> Vec<BoundingBox> {
        self.local_bounds
            .iter()
            .map(|b| b.translated(self.center))
            .collect()
    }

    /// Union of the part boxes in world space
    pub fn bounds(&self) -> Option<BoundingBox> {
        aggregate(&self.local_bounds).map(|b| b.translated(self.center))
    }

    // --- Accumulation ---

    pub fn accumulate_velocity(&mut self, delta: DVec3) {
        self.pending.velocity += delta;
    }

    pub fn accumulate_angular_velocity(&mut self, delta: DVec3) {
        self.pending.angular_velocity += delta;
    }

    pub fn accumulate_acceleration(&mut self, delta: DVec3) {
        self.pending.acceleration += delta;
    }

    pub fn accumulate_angular_acceleration(&mut self, delta: DVec3) {
        self.pending.angular_acceleration += delta;
    }

    /// Speed up (positive) or slow down (negative) along the current heading
    pub fn accumulate_impulse_magnitude(&mut self, magnitude: f64) {
        let direction = heading_or_x(self.velocity, "velocity");
        self.accumulate_velocity(direction * (magnitude / self.mass));
    }

    /// Spin up (positive) or spin down (negative) about the current axis
    pub fn accumulate_angular_impulse_magnitude(&mut self, magnitude: f64) {
        let direction = heading_or_x(self.angular_velocity, "angular velocity");
        self.accumulate_angular_velocity(direction * (magnitude / self.moment_of_inertia));
    }

    /// Commit pending changes into velocity and angular velocity.
    ///
    /// Static bodies discard them.
    pub fn apply_accumulated_changes(&mut self, dt: f64) {
        let pending = self.pending.take();
        if self.is_static {
            return;
        }
        self.velocity += pending.velocity + pending.acceleration * dt;
        self.angular_velocity += pending.angular_velocity + pending.angular_acceleration * dt;
    }

    /// Advance the center by the committed velocity
    pub fn update(&mut self, dt: f64) {
        if self.is_static {
            return;
        }
        self.center += self.velocity * dt;
    }

    pub fn sample_recoil(&mut self) -> f64 {
        self.recoil.sample()
    }

    /// Replace the recoil source, e.g. with a fixed value for replays
    pub fn set_recoil(&mut self, recoil: Box<dyn RecoilSampler>) {
        self.recoil = recoil;
    }

    // --- Direct corrections (contact resolution only) ---

    pub(crate) fn displace(&mut self, offset: DVec3) {
        self.center += offset;
    }

    pub(crate) fn finish(&mut self, status: BodyStatus) {
        self.status = status;
        self.pending = Accumulators::default();
    }

    /// Horizontal penetration of the two top layers, or `None` when they do
    /// not touch.
    ///
    /// The layers must overlap vertically (the lower layer's upper face at or
    /// above the higher layer's base) and their rings must overlap in XZ. A
    /// returned `Some(0.0)` is never produced; touching rings are no contact.
    pub fn distance_overlap(a: &SpinningBody, b: &SpinningBody) -> Option<f64> {
        let (lower, higher) = if a.center.y < b.center.y { (a, b) } else { (b, a) };
        if lower.center.y + lower.top_height() < higher.center.y {
            return None;
        }

        let radii_sum = a.top_radius() + b.top_radius();
        let overlap = radii_sum * radii_sum - horizontal_distance_squared(a.center, b.center);
        if overlap > 0.0 {
            Some(overlap.sqrt())
        } else {
            None
        }
    }
}

/// Unit heading of `v`, or world x when `v` is numerically zero
fn heading_or_x(v: DVec3, what: &str) -> DVec3 {
    if v.length() < f64::from(f32::EPSILON) {
        log::debug!("{what} is zero, applying impulse along x");
        return DVec3::X;
    }
    v.normalize()
}

/// One box per part, stacked downward from the center
fn stacked_bounds(parts: &Parts) -> Vec<BoundingBox> {
    let disc_base = -parts.disc.height;
    let driver_base = disc_base - parts.driver.height;
    vec![
        BoundingBox::cylinder(DVec3::ZERO, parts.top.radius, parts.top.height),
        BoundingBox::cylinder(
            DVec3::new(0.0, disc_base, 0.0),
            parts.disc.radius,
            parts.disc.height,
        ),
        BoundingBox::cylinder(
            DVec3::new(0.0, driver_base, 0.0),
            parts.driver.radius,
            parts.driver.height,
        ),
    ]
}
