//! Group strength evaluation and the per-step decision context.
//!
//! Health alone or damage alone misprices engagements: a massive but
//! toothless blob looks scary, a small lethal squad looks harmless.
//! The strength scalar is `group damage x group health` relative to a
//! specific opposing entity - a cheap proxy for "time to kill the
//! other side while surviving" that never simulates combat rounds.
//!
//! All engine-computed per-unit state lives in [`DecisionContext`], an
//! explicit record keyed by entity ID. It is rebuilt every decision
//! pass; only the retreat and task-reservation flags are carried
//! across passes (by the engine, for IDs still present).

use std::collections::HashMap;

use crate::entity::{Entity, EntityId, Snapshot};
use crate::math::Fixed;
use crate::spatial::within_radius;

/// Radius of the cluster ("crew") gathered around a focal entity for
/// strength aggregation, in distance units.
pub const CREW_RADIUS: i32 = 16;

/// Cached strength figures for one unit against one opposing entity.
///
/// The figures are only meaningful relative to `target`; the evaluator
/// recomputes them whenever the opposing target changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrengthFigures {
    /// The opposing entity these figures were computed against.
    pub target: EntityId,
    /// Sum of `hits x damage per hit` over the crew, against `target`.
    pub group_damage: Fixed,
    /// Sum of `health + shield` over crew members that can damage
    /// `target`. Zero-damage members contribute zero health so the
    /// product stays a monotonic attack-vs-no-attack signal.
    pub group_health: Fixed,
    /// `group_damage x group_health`.
    pub total_strength: Fixed,
    /// The crew used for the figures above.
    pub crew: Vec<EntityId>,
}

/// Engine-computed annotations for one unit, valid for one pass.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    /// Unit is falling back toward support.
    pub is_retreating: bool,
    /// Unit was claimed by a specialization this pass (e.g. a worker
    /// sent to repair) and should not receive another decision.
    pub reserved_for_task: bool,
    /// Cached strength figures, if evaluated this pass.
    pub strength: Option<StrengthFigures>,
}

/// Per-pass annotation record for every unit ID, defaulting to unset.
#[derive(Debug, Clone, Default)]
pub struct DecisionContext {
    notes: HashMap<EntityId, Annotations>,
}

impl DecisionContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            notes: HashMap::new(),
        }
    }

    /// Annotations for a unit, if any were written this pass.
    #[must_use]
    pub fn annotations(&self, id: EntityId) -> Option<&Annotations> {
        self.notes.get(&id)
    }

    /// Mutable annotations for a unit, created unset on first access.
    pub fn annotations_mut(&mut self, id: EntityId) -> &mut Annotations {
        self.notes.entry(id).or_default()
    }

    /// Whether a unit is marked retreating.
    #[must_use]
    pub fn is_retreating(&self, id: EntityId) -> bool {
        self.notes.get(&id).is_some_and(|a| a.is_retreating)
    }

    /// Set or clear the retreat flag.
    pub fn set_retreating(&mut self, id: EntityId, retreating: bool) {
        self.annotations_mut(id).is_retreating = retreating;
    }

    /// Whether a unit was claimed by a specialization this pass.
    #[must_use]
    pub fn is_reserved(&self, id: EntityId) -> bool {
        self.notes.get(&id).is_some_and(|a| a.reserved_for_task)
    }

    /// Claim a unit for a support task for the rest of the pass.
    pub fn reserve_for_task(&mut self, id: EntityId) {
        self.annotations_mut(id).reserved_for_task = true;
    }

    /// Cached total strength for a unit, regardless of target.
    #[must_use]
    pub fn total_strength(&self, id: EntityId) -> Option<Fixed> {
        self.notes
            .get(&id)
            .and_then(|a| a.strength.as_ref())
            .map(|s| s.total_strength)
    }

    /// IDs currently flagged as retreating.
    #[must_use]
    pub fn retreating_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .notes
            .iter()
            .filter(|(_, a)| a.is_retreating)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Compute the crew strength figures for `unit` against `opponent`,
/// without touching any cache.
///
/// The crew is every same-side entity (units and structures) within
/// [`CREW_RADIUS`] of `unit` - including `unit` itself, so a lone unit
/// still counts its own contribution. No division is performed
/// anywhere, so zero-health or zero-damage members contribute zero
/// without special-casing.
#[must_use]
pub fn compute_strength(snapshot: &Snapshot, unit: &Entity, opponent: &Entity) -> StrengthFigures {
    let own_side = snapshot.faction_entities(unit.faction);
    let crew = within_radius(unit.position, &own_side, Fixed::from_num(CREW_RADIUS));

    let mut group_damage = Fixed::ZERO;
    let mut group_health = Fixed::ZERO;
    for member in &crew {
        let volley = member.volley_damage_vs(opponent);
        group_damage += volley;
        if volley > Fixed::ZERO {
            group_health += member.effective_health();
        }
    }

    StrengthFigures {
        target: opponent.id,
        group_damage,
        group_health,
        total_strength: group_damage * group_health,
        crew: crew.iter().map(|member| member.id).collect(),
    }
}

/// Total strength of `unit` against `opponent`, cached in the context.
///
/// The cache is hit only when the figures were computed against the
/// same opposing entity; a changed target forces recomputation.
pub fn evaluate_strength(
    ctx: &mut DecisionContext,
    snapshot: &Snapshot,
    unit: &Entity,
    opponent: &Entity,
) -> Fixed {
    if let Some(figures) = ctx.annotations(unit.id).and_then(|a| a.strength.as_ref()) {
        if figures.target == opponent.id {
            return figures.total_strength;
        }
    }

    let figures = compute_strength(snapshot, unit, opponent);
    let total = figures.total_strength;
    ctx.annotations_mut(unit.id).strength = Some(figures);
    total
}

/// Evaluate both sides of an engagement: `unit` against `enemy` using
/// the friendly cluster around `unit`, and `enemy` against `unit`
/// using the enemy cluster around `enemy`.
pub fn evaluate_pair(
    ctx: &mut DecisionContext,
    snapshot: &Snapshot,
    unit: &Entity,
    enemy: &Entity,
) -> (Fixed, Fixed) {
    let ours = evaluate_strength(ctx, snapshot, unit, enemy);
    let theirs = evaluate_strength(ctx, snapshot, enemy, unit);
    (ours, theirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Faction;
    use crate::math::Vec2Fixed;
    use crate::unit_kind::UnitKind;

    fn combatant(id: u64, faction: Faction, x: i32, damage: i32, health: i32) -> Entity {
        Entity::new(
            id,
            faction,
            UnitKind::Trooper,
            Vec2Fixed::new(Fixed::from_num(x), Fixed::ZERO),
        )
        .with_ground_weapon(Fixed::from_num(5), Fixed::from_num(damage))
        .with_health(Fixed::from_num(health))
    }

    #[test]
    fn test_lone_unit_counts_itself() {
        let unit = combatant(1, Faction::Friendly, 0, 10, 100);
        let enemy = combatant(2, Faction::Enemy, 4, 8, 80);
        let snapshot = Snapshot::from_entities([unit.clone(), enemy.clone()]).unwrap();

        let figures = compute_strength(&snapshot, &unit, &enemy);
        assert_eq!(figures.group_damage, Fixed::from_num(10));
        assert_eq!(figures.group_health, Fixed::from_num(100));
        assert_eq!(figures.total_strength, Fixed::from_num(1000));
        assert_eq!(figures.crew, vec![1]);
    }

    #[test]
    fn test_crew_radius_cuts_off_at_sixteen() {
        let unit = combatant(1, Faction::Friendly, 0, 10, 100);
        let close_ally = combatant(2, Faction::Friendly, 16, 10, 100);
        let far_ally = combatant(3, Faction::Friendly, 17, 10, 100);
        let enemy = combatant(4, Faction::Enemy, 4, 8, 80);
        let snapshot = Snapshot::from_entities([
            unit.clone(),
            close_ally,
            far_ally,
            enemy.clone(),
        ])
        .unwrap();

        let figures = compute_strength(&snapshot, &unit, &enemy);
        assert_eq!(figures.crew, vec![1, 2]);
        assert_eq!(figures.group_damage, Fixed::from_num(20));
        assert_eq!(figures.group_health, Fixed::from_num(200));
    }

    #[test]
    fn test_zero_damage_member_contributes_zero_health() {
        let unit = combatant(1, Faction::Friendly, 0, 10, 100);
        // A ground-only ally cannot hurt a flyer: its health must not count
        let toothless = combatant(2, Faction::Friendly, 2, 25, 500);
        let flyer = combatant(3, Faction::Enemy, 4, 8, 80).with_flying();
        let snapshot =
            Snapshot::from_entities([unit.clone(), toothless, flyer.clone()]).unwrap();

        let figures = compute_strength(&snapshot, &unit, &flyer);
        assert_eq!(figures.group_damage, Fixed::ZERO);
        assert_eq!(figures.group_health, Fixed::ZERO);
        assert_eq!(figures.total_strength, Fixed::ZERO);
    }

    #[test]
    fn test_shield_counts_toward_group_health() {
        let unit = combatant(1, Faction::Friendly, 0, 10, 100).with_shield(Fixed::from_num(50));
        let enemy = combatant(2, Faction::Enemy, 4, 8, 80);
        let snapshot = Snapshot::from_entities([unit.clone(), enemy.clone()]).unwrap();

        let figures = compute_strength(&snapshot, &unit, &enemy);
        assert_eq!(figures.group_health, Fixed::from_num(150));
    }

    #[test]
    fn test_cache_hit_same_target() {
        let unit = combatant(1, Faction::Friendly, 0, 10, 100);
        let enemy = combatant(2, Faction::Enemy, 4, 8, 80);
        let snapshot = Snapshot::from_entities([unit.clone(), enemy.clone()]).unwrap();

        let mut ctx = DecisionContext::new();
        let first = evaluate_strength(&mut ctx, &snapshot, &unit, &enemy);
        let second = evaluate_strength(&mut ctx, &snapshot, &unit, &enemy);
        assert_eq!(first, second);
        assert_eq!(ctx.total_strength(1), Some(Fixed::from_num(1000)));
    }

    #[test]
    fn test_cache_invalidated_when_target_changes() {
        let unit = combatant(1, Faction::Friendly, 0, 10, 100);
        let ground = combatant(2, Faction::Enemy, 4, 8, 80);
        let flyer = combatant(3, Faction::Enemy, 4, 8, 80).with_flying();
        let snapshot =
            Snapshot::from_entities([unit.clone(), ground.clone(), flyer.clone()]).unwrap();

        let mut ctx = DecisionContext::new();
        let vs_ground = evaluate_strength(&mut ctx, &snapshot, &unit, &ground);
        assert_eq!(vs_ground, Fixed::from_num(1000));

        // Same unit, new target: the ground-only weapon is worthless
        let vs_flyer = evaluate_strength(&mut ctx, &snapshot, &unit, &flyer);
        assert_eq!(vs_flyer, Fixed::ZERO);
    }

    #[test]
    fn test_pair_uses_each_sides_own_cluster() {
        let unit = combatant(1, Faction::Friendly, 0, 10, 100);
        let ally = combatant(2, Faction::Friendly, 3, 10, 100);
        let enemy = combatant(3, Faction::Enemy, 4, 8, 80);
        let snapshot =
            Snapshot::from_entities([unit.clone(), ally, enemy.clone()]).unwrap();

        let mut ctx = DecisionContext::new();
        let (ours, theirs) = evaluate_pair(&mut ctx, &snapshot, &unit, &enemy);
        // Two friendlies: 20 damage x 200 health
        assert_eq!(ours, Fixed::from_num(4000));
        // Lone enemy: 8 x 80
        assert_eq!(theirs, Fixed::from_num(640));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn squad(damages: &[i32], healths: &[i32]) -> (Snapshot, Entity, Entity) {
            let unit = combatant(1, Faction::Friendly, 0, damages[0], healths[0]);
            let enemy = combatant(100, Faction::Enemy, 5, 8, 80);
            let mut entities = vec![unit.clone(), enemy.clone()];
            for (i, (&d, &h)) in damages.iter().zip(healths).enumerate().skip(1) {
                entities.push(combatant(1 + i as u64, Faction::Friendly, (i % 10) as i32, d, h));
            }
            (Snapshot::from_entities(entities).unwrap(), unit, enemy)
        }

        proptest! {
            /// Raising any member's health never lowers total strength.
            #[test]
            fn strength_monotonic_in_health(
                damages in prop::collection::vec(0i32..50, 1..6),
                healths in prop::collection::vec(1i32..500, 6),
                bump in 1i32..200,
                member in 0usize..6,
            ) {
                let n = damages.len();
                let healths = &healths[..n];
                let member = member % n;

                let (snapshot, unit, enemy) = squad(&damages, healths);
                let base = compute_strength(&snapshot, &unit, &enemy).total_strength;

                let mut bumped = healths.to_vec();
                bumped[member] += bump;
                let (snapshot2, unit2, enemy2) = squad(&damages, &bumped);
                let raised = compute_strength(&snapshot2, &unit2, &enemy2).total_strength;

                prop_assert!(raised >= base);
            }

            /// Raising any member's damage never lowers total strength.
            #[test]
            fn strength_monotonic_in_damage(
                damages in prop::collection::vec(0i32..50, 1..6),
                healths in prop::collection::vec(1i32..500, 6),
                bump in 1i32..50,
                member in 0usize..6,
            ) {
                let n = damages.len();
                let healths = &healths[..n];
                let member = member % n;

                let (snapshot, unit, enemy) = squad(&damages, healths);
                let base = compute_strength(&snapshot, &unit, &enemy).total_strength;

                let mut bumped = damages.clone();
                bumped[member] += bump;
                let (snapshot2, unit2, enemy2) = squad(&bumped, healths);
                let raised = compute_strength(&snapshot2, &unit2, &enemy2).total_strength;

                prop_assert!(raised >= base);
            }

            /// A member with zero damage against the target never adds
            /// its health to the group health sum.
            #[test]
            fn zero_damage_contributes_zero_health(
                health in 1i32..10_000,
                x in -10i32..10,
            ) {
                let unit = combatant(1, Faction::Friendly, 0, 10, 100);
                let toothless = combatant(2, Faction::Friendly, x, 0, health);
                let enemy = combatant(3, Faction::Enemy, 4, 8, 80);
                let snapshot = Snapshot::from_entities(
                    [unit.clone(), toothless, enemy.clone()],
                ).unwrap();

                let figures = compute_strength(&snapshot, &unit, &enemy);
                prop_assert_eq!(figures.group_health, Fixed::from_num(100));
            }
        }
    }
}
