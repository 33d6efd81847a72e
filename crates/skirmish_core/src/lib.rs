//! # Skirmish Core
//!
//! Real-time combat micro-decision engine for autonomous units.
//!
//! Each simulated step the engine receives a snapshot of every visible
//! entity and emits a list of intended actions: attack, retreat,
//! regroup, reposition, or a kind-specific ability. Physics, damage
//! resolution, economy, and the match driver are external
//! collaborators.
//!
//! This crate contains **only** decision logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math in the decision path (uses fixed-point;
//!   the scheduler measures wall-clock time but never feeds it into
//!   decisions)
//!
//! ## Crate Structure
//!
//! - [`entity`] - Per-step entity model, snapshots, decisions
//! - [`spatial`] - Spatial queries and the terrain seam
//! - [`strength`] - Group strength evaluation and per-pass context
//! - [`policy`] - Generic engagement state machine
//! - [`specialist`] - Per-unit-kind behavior overrides
//! - [`scheduler`] - Adaptive full-pass scheduler
//! - [`engine`] - The step driver tying it all together
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod engine;
pub mod entity;
pub mod error;
pub mod math;
pub mod policy;
pub mod scheduler;
pub mod spatial;
pub mod specialist;
pub mod strength;
pub mod unit_kind;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::engine::Engine;
    pub use crate::entity::{
        AbilityId, Decision, Entity, EntityId, Faction, Snapshot, Target,
    };
    pub use crate::error::{EngineError, Result};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::policy::EngagementState;
    pub use crate::scheduler::Scheduler;
    pub use crate::spatial::Terrain;
    pub use crate::strength::{DecisionContext, StrengthFigures, CREW_RADIUS};
    pub use crate::unit_kind::UnitKind;
}
