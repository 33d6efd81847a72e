//! Closed unit-kind enumeration and capability queries.
//!
//! The engine deliberately uses a closed tagged enumeration rather than
//! a data-driven registry: the specialization layer dispatches on the
//! kind tag, and a closed enum makes that dispatch exhaustive and
//! deterministic.

use serde::{Deserialize, Serialize};

/// Kind tag for every entity the engine can observe or control.
///
/// Kinds fall into three groups: generic combat units handled entirely
/// by the generic engagement policy, specialized units with a
/// kind-specific override (see [`crate::specialist`]), and structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UnitKind {
    /// Basic ground combat unit - no special behavior.
    #[default]
    Trooper,
    /// Long-range ground combat unit.
    Lancer,
    /// Flying combat unit.
    Interceptor,
    /// Detector - keeps enemies at maximum sight, never fights.
    Seeker,
    /// Area-denial unit - fires a ground-targeted bombardment.
    Bombardier,
    /// Burrowing unit - digs in when outmatched and outrun.
    Sapper,
    /// Support caster - heals the most damaged nearby ally.
    Mender,
    /// Resource worker - fights only when cornered.
    Worker,
    /// Defensive structure with raisable shutters.
    Bastion,
    /// Production structure - requests repairs when damaged.
    Workshop,
    /// Static defense turret.
    Turret,
    /// Passive spawning structure - never a combat target.
    Incubator,
}

impl UnitKind {
    /// Check if this kind is a structure (cannot move).
    #[must_use]
    pub const fn is_structure(self) -> bool {
        matches!(
            self,
            Self::Bastion | Self::Workshop | Self::Turret | Self::Incubator
        )
    }

    /// Check if this kind is a resource worker.
    #[must_use]
    pub const fn is_worker(self) -> bool {
        matches!(self, Self::Worker)
    }

    /// Check if this kind is a non-combat passive spawner.
    ///
    /// Passive spawners are excluded from target selection: shooting
    /// them wastes volleys that should go to things that shoot back.
    #[must_use]
    pub const fn is_passive_spawner(self) -> bool {
        matches!(self, Self::Incubator)
    }

    /// Check if this kind is a detector.
    #[must_use]
    pub const fn is_detector(self) -> bool {
        matches!(self, Self::Seeker)
    }
}
