//! Generic engagement policy: attack, kite, hold, or regroup.
//!
//! The policy is a per-unit state machine evaluated once per decision
//! pass. States are transient; the only thing that survives the pass
//! is the retreat flag carried by the engine. Absence of a valid
//! action is itself a valid outcome - the policy never errors.

use crate::entity::{Decision, Entity, Snapshot};
use crate::math::Fixed;
use crate::spatial::{attackable_target, closest_attackable_target, closest_to, within_radius, Terrain};
use crate::strength::{evaluate_pair, evaluate_strength, DecisionContext};

/// Transient engagement state for one unit, one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementState {
    /// No relevant opponent, or no threat either way.
    Unengaged,
    /// Committing to an attack.
    Attacking,
    /// Falling back from a losing engagement.
    Retreating,
    /// Falling back toward a stronger friendly cluster.
    Regrouping,
}

/// Relevant engagement range between two entities.
///
/// The larger of the two sight envelopes, each padded by both
/// collision radii; beyond this, neither side meaningfully perceives
/// the other and no engagement decision is made.
#[must_use]
pub fn sight_range(unit: &Entity, enemy: &Entity) -> Fixed {
    let ours = unit.sight_radius + unit.radius + enemy.radius;
    let theirs = enemy.sight_radius + enemy.radius + unit.radius;
    ours.max(theirs)
}

/// Run the engagement state machine for `unit` against its nearest
/// reachable enemy `enemy`.
///
/// Returns the transient state together with the decision, if any.
/// `None` means the generic policy has nothing to say and the unit
/// falls through to idle handling.
pub fn resolve(
    ctx: &mut DecisionContext,
    snapshot: &Snapshot,
    terrain: &dyn Terrain,
    unit: &Entity,
    enemy: &Entity,
) -> (EngagementState, Option<Decision>) {
    let distance = unit.distance_to(enemy);
    if distance > sight_range(unit, enemy) {
        // Target out of relevant range this pass
        return (EngagementState::Unengaged, None);
    }

    let (ours, theirs) = evaluate_pair(ctx, snapshot, unit, enemy);

    if ours > theirs && attackable_target(unit, enemy) {
        ctx.set_retreating(unit.id, false);
        let decision = attack_decision(snapshot, terrain, unit, enemy);
        (EngagementState::Attacking, Some(decision))
    } else if theirs > Fixed::ZERO && unit.can_attack() {
        ctx.set_retreating(unit.id, true);
        let (state, decision) =
            retreat_decision(ctx, snapshot, terrain, unit, enemy, sight_range(unit, enemy));
        (state, Some(decision))
    } else {
        // Unit cannot attack and poses/receives no threat
        (EngagementState::Unengaged, None)
    }
}

/// Build an attack decision using the best-target rule.
///
/// The best in-range enemy wins; failing that, the nearest attackable
/// and reachable one; failing that, the engaged enemy itself.
#[must_use]
pub fn attack_decision(
    snapshot: &Snapshot,
    terrain: &dyn Terrain,
    unit: &Entity,
    enemy: &Entity,
) -> Decision {
    let enemies = snapshot.enemies();
    let target = best_target_in_range(unit, &enemies)
        .or_else(|| closest_attackable_target(terrain, unit, &enemies))
        .map_or(enemy.id, |found| found.id);
    Decision::attack(unit.id, target)
}

/// Best target among enemies within the unit's effective attack range.
///
/// "Best" maximizes `volley damage / (health + shield)` - the fastest
/// kill relative to investment. The comparison is cross-multiplied so
/// no division ever happens; zero-effective-health candidates and
/// passive spawners are skipped.
#[must_use]
pub fn best_target_in_range<'a>(unit: &Entity, candidates: &[&'a Entity]) -> Option<&'a Entity> {
    let in_range: Vec<&Entity> = candidates
        .iter()
        .filter(|candidate| {
            let range = unit.effective_range_vs(candidate);
            unit.position.distance_squared(candidate.position) <= range * range
        })
        .copied()
        .collect();
    best_target(unit, &in_range)
}

/// Best target among enemies within a fixed radius of the unit,
/// regardless of the unit's weapon range (used by area-denial
/// specializations whose ability range differs from their weapon).
#[must_use]
pub fn best_target_within<'a>(
    unit: &Entity,
    candidates: &[&'a Entity],
    radius: Fixed,
) -> Option<&'a Entity> {
    let in_range = within_radius(unit.position, candidates, radius);
    best_target(unit, &in_range)
}

fn best_target<'a>(unit: &Entity, candidates: &[&'a Entity]) -> Option<&'a Entity> {
    let mut best: Option<(&Entity, Fixed, Fixed)> = None;
    for &candidate in candidates {
        if candidate.kind.is_passive_spawner() {
            continue;
        }
        let toughness = candidate.effective_health();
        if toughness <= Fixed::ZERO {
            continue;
        }
        let volley = unit.volley_damage_vs(candidate);
        if volley <= Fixed::ZERO {
            continue;
        }
        // volley/toughness > best_volley/best_toughness, cross-multiplied
        let better = match best {
            Some((_, best_volley, best_toughness)) => {
                volley * best_toughness > best_volley * toughness
            }
            None => true,
        };
        if better {
            best = Some((candidate, volley, toughness));
        }
    }
    best.map(|(entity, _, _)| entity)
}

/// Compute a retreat decision. Total: always yields a move or an
/// attack, across every combination of available support.
///
/// Fallback tiers, searched within `range` of the unit:
///   1. a friendly with strictly higher total strength (regroup)
///   2. any friendly combat-capable entity
///   3. any friendly structure
///   4. any friendly at all
///   5. nothing found: a cornered unit fights - attack the enemy.
pub fn retreat_decision(
    ctx: &mut DecisionContext,
    snapshot: &Snapshot,
    terrain: &dyn Terrain,
    unit: &Entity,
    enemy: &Entity,
    range: Fixed,
) -> (EngagementState, Decision) {
    let own_side = snapshot.faction_entities(unit.faction);
    let nearby: Vec<&Entity> = within_radius(unit.position, &own_side, range)
        .into_iter()
        .filter(|ally| ally.id != unit.id)
        .collect();

    // Tier 1: regroup with a strictly stronger cluster
    let own_strength = evaluate_strength(ctx, snapshot, unit, enemy);
    let stronger: Vec<&Entity> = nearby
        .iter()
        .filter(|ally| evaluate_strength(ctx, snapshot, ally, enemy) > own_strength)
        .copied()
        .collect();
    if let Some(anchor) = closest_to(unit.position, &stronger, Fixed::ZERO) {
        return (
            EngagementState::Regrouping,
            Decision::move_to(unit.id, anchor.position),
        );
    }

    // Tier 2: any combat-capable ally
    let fighters: Vec<&Entity> = nearby.iter().filter(|a| a.can_attack()).copied().collect();
    if let Some(anchor) = closest_to(unit.position, &fighters, Fixed::ZERO) {
        return (
            EngagementState::Retreating,
            Decision::move_to(unit.id, anchor.position),
        );
    }

    // Tier 3: any friendly structure
    let structures: Vec<&Entity> = nearby
        .iter()
        .filter(|a| a.kind.is_structure())
        .copied()
        .collect();
    if let Some(anchor) = closest_to(unit.position, &structures, Fixed::ZERO) {
        return (
            EngagementState::Retreating,
            Decision::move_to(unit.id, anchor.position),
        );
    }

    // Tier 4: anything friendly
    if let Some(anchor) = closest_to(unit.position, &nearby, Fixed::ZERO) {
        return (
            EngagementState::Retreating,
            Decision::move_to(unit.id, anchor.position),
        );
    }

    // Tier 5: cornered - no safe retreat exists
    let decision = attack_decision(snapshot, terrain, unit, enemy);
    (EngagementState::Retreating, decision)
}
