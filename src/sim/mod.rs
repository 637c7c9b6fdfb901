//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by body ID)
//! - No rendering or platform dependencies

pub mod arena;
pub mod body;
pub mod bounds;
pub mod forces;
pub mod parts;
pub mod recoil;
pub mod scenario;
pub mod world;

pub use arena::ArenaSurface;
pub use body::{Accumulators, BodyStatus, SpinningBody};
pub use bounds::BoundingBox;
pub use forces::{FloorContact, ForceParams, ImpactOutcome, SpinInteraction};
pub use parts::{Disc, Driver, Parts, Top};
pub use recoil::{FixedRecoil, LogNormalRecoil, RecoilParams, RecoilSampler};
pub use scenario::standard_match;
pub use world::{BodyId, BodySnapshot, SimulationWorld, StepPhase, StepReport, WorldEvent};
