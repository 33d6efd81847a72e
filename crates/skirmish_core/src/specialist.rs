//! Per-unit-kind behavior overrides.
//!
//! Specializations are consulted before the generic engagement policy
//! and may decline by returning `None`, in which case the generic
//! policy runs. Every override only emits abilities the collaborator
//! reported as legal on the entity this step.

use crate::entity::{AbilityId, Decision, Entity, Snapshot, Target};
use crate::math::Fixed;
use crate::policy::best_target_within;
use crate::spatial::{closest_to, Terrain};
use crate::strength::DecisionContext;
use crate::unit_kind::UnitKind;

/// Radius of the Bombardier's area-denial shot.
pub const BOMBARD_RADIUS: i32 = 9;

/// Scan radius for the Mender's heal.
pub const MEND_RADIUS: i32 = 7;

/// Minimum missing health before an ally is worth a Mend.
pub const MEND_MISSING_THRESHOLD: i32 = 10;

/// Slack inside the sight envelope before a Seeker backs off.
const SEEKER_SLACK: i32 = 2;

/// Placement search radii for a worker falling back to a structure.
const FALLBACK_MAX_RADIUS: i32 = 6;
const FALLBACK_MIN_RADIUS: i32 = 1;

/// Run the kind-specific override for `unit`, if it has one.
///
/// `nearest_enemy` is the enemy the engine already resolved as closest
/// to the unit, when one exists. Returns `None` when the kind has no
/// override or the override declines.
pub fn specialize(
    ctx: &mut DecisionContext,
    snapshot: &Snapshot,
    terrain: &dyn Terrain,
    unit: &Entity,
    nearest_enemy: Option<&Entity>,
) -> Option<Decision> {
    match unit.kind {
        UnitKind::Seeker => seeker(unit, nearest_enemy),
        UnitKind::Bombardier => bombardier(snapshot, unit),
        UnitKind::Sapper => sapper(ctx, unit, nearest_enemy),
        UnitKind::Mender => mender(snapshot, unit),
        UnitKind::Bastion => bastion(snapshot, unit),
        UnitKind::Workshop => workshop(ctx, snapshot, unit),
        UnitKind::Worker => worker(ctx, snapshot, terrain, unit),
        _ => None,
    }
}

/// Detector: shadow the nearest enemy at maximum sight distance.
///
/// Outside the sight envelope the Seeker stands down (if surveilling)
/// and closes in; deep inside it backs off; at the rim it holds and
/// surveils.
fn seeker(unit: &Entity, nearest_enemy: Option<&Entity>) -> Option<Decision> {
    let enemy = nearest_enemy?;
    let sight = unit.sight_radius;
    let distance = unit.position.distance(enemy.position);

    if distance > sight {
        if unit.has_ability(AbilityId::StandDown) {
            return Some(Decision::new(unit.id, AbilityId::StandDown, Target::None));
        }
        let rim = enemy.position.towards(unit.position, sight);
        return Some(Decision::move_to(unit.id, rim));
    }

    if distance < sight - Fixed::from_num(SEEKER_SLACK) {
        let rim = enemy.position.towards(unit.position, sight);
        return Some(Decision::move_to(unit.id, rim));
    }

    if unit.has_ability(AbilityId::Surveil) {
        return Some(Decision::new(unit.id, AbilityId::Surveil, Target::None));
    }
    None
}

/// Area-denial: bombard the best target within the shot radius.
fn bombardier(snapshot: &Snapshot, unit: &Entity) -> Option<Decision> {
    if !unit.has_ability(AbilityId::Bombard) {
        return None;
    }
    let enemies = snapshot.enemies();
    let target = best_target_within(unit, &enemies, Fixed::from_num(BOMBARD_RADIUS))?;
    Some(Decision::new(
        unit.id,
        AbilityId::Bombard,
        Target::Point(target.position),
    ))
}

/// Burrower: dig in when fleeing something faster, surface when the
/// coast is clear.
fn sapper(
    ctx: &DecisionContext,
    unit: &Entity,
    nearest_enemy: Option<&Entity>,
) -> Option<Decision> {
    match nearest_enemy {
        Some(enemy) => {
            let outrun = enemy.movement_speed > unit.movement_speed;
            if ctx.is_retreating(unit.id) && outrun && unit.has_ability(AbilityId::Burrow) {
                return Some(Decision::new(unit.id, AbilityId::Burrow, Target::None));
            }
        }
        None => {
            if unit.has_ability(AbilityId::Unburrow) {
                return Some(Decision::new(unit.id, AbilityId::Unburrow, Target::None));
            }
        }
    }
    None
}

/// Support caster: mend the most-damaged nearby ally.
///
/// Scans [`MEND_RADIUS`] for friendlies missing at least
/// [`MEND_MISSING_THRESHOLD`] health; the largest deficit wins, ties
/// broken by lowest ID (snapshot iteration order).
fn mender(snapshot: &Snapshot, unit: &Entity) -> Option<Decision> {
    if !unit.has_ability(AbilityId::Mend) {
        return None;
    }
    let radius_sq = Fixed::from_num(MEND_RADIUS) * Fixed::from_num(MEND_RADIUS);
    let threshold = Fixed::from_num(MEND_MISSING_THRESHOLD);

    let mut best: Option<(&Entity, Fixed)> = None;
    for ally in snapshot.faction_entities(unit.faction) {
        if ally.id == unit.id {
            continue;
        }
        if unit.position.distance_squared(ally.position) > radius_sq {
            continue;
        }
        let missing = ally.max_health - ally.health;
        if missing < threshold {
            continue;
        }
        match best {
            Some((_, most)) if missing <= most => {}
            _ => best = Some((ally, missing)),
        }
    }

    best.map(|(ally, _)| Decision::new(unit.id, AbilityId::Mend, Target::Entity(ally.id)))
}

/// Shuttered structure: open when friends are nearer than foes.
///
/// Shutters only matter to ground traffic, so flying enemies are
/// ignored on the threat side.
fn bastion(snapshot: &Snapshot, unit: &Entity) -> Option<Decision> {
    let friendlies = snapshot.faction_entities(unit.faction);
    let movers: Vec<&Entity> = friendlies
        .iter()
        .filter(|ally| ally.id != unit.id && ally.is_mobile() && !ally.flying)
        .copied()
        .collect();
    let enemies = snapshot.faction_entities(unit.faction.opponent());
    let ground_foes: Vec<&Entity> = enemies
        .iter()
        .filter(|enemy| !enemy.flying)
        .copied()
        .collect();

    let nearest_ally = closest_to(unit.position, &movers, Fixed::ZERO);
    let nearest_foe = closest_to(unit.position, &ground_foes, Fixed::ZERO);

    let friendly_traffic = match (nearest_ally, nearest_foe) {
        (Some(ally), Some(foe)) => {
            unit.position.distance_squared(ally.position)
                <= unit.position.distance_squared(foe.position)
        }
        (Some(_), None) => true,
        (None, _) => false,
    };

    let ability = if friendly_traffic {
        AbilityId::LowerShutters
    } else {
        AbilityId::RaiseShutters
    };
    if unit.has_ability(ability) {
        Some(Decision::new(unit.id, ability, Target::None))
    } else {
        None
    }
}

/// Damaged production structure: pull the nearest free worker over to
/// repair it. The worker is reserved so nothing else orders it this
/// pass; the emitted decision acts on the worker, not the structure.
fn workshop(ctx: &mut DecisionContext, snapshot: &Snapshot, unit: &Entity) -> Option<Decision> {
    if unit.health >= unit.max_health {
        return None;
    }
    let friendlies = snapshot.faction_entities(unit.faction);
    let workers: Vec<&Entity> = friendlies
        .iter()
        .filter(|ally| {
            ally.kind.is_worker()
                && !ctx.is_reserved(ally.id)
                && ally.has_ability(AbilityId::Repair)
        })
        .copied()
        .collect();
    let mechanic = closest_to(unit.position, &workers, Fixed::ZERO)?;
    ctx.reserve_for_task(mechanic.id);
    Some(Decision::new(
        mechanic.id,
        AbilityId::Repair,
        Target::Entity(unit.id),
    ))
}

/// Worker: a retreating worker runs home instead of kiting like a
/// combat unit.
fn worker(
    ctx: &DecisionContext,
    snapshot: &Snapshot,
    terrain: &dyn Terrain,
    unit: &Entity,
) -> Option<Decision> {
    if !ctx.is_retreating(unit.id) {
        return None;
    }
    let friendlies = snapshot.faction_entities(unit.faction);
    let structures: Vec<&Entity> = friendlies
        .iter()
        .filter(|ally| ally.kind.is_structure())
        .copied()
        .collect();
    let home = closest_to(unit.position, &structures, Fixed::ZERO)?;
    let doorstep = terrain
        .find_placement(
            home.position,
            unit.position,
            Fixed::from_num(FALLBACK_MAX_RADIUS),
            Fixed::from_num(FALLBACK_MIN_RADIUS),
        )
        .unwrap_or(home.position);
    Some(Decision::move_to(unit.id, doorstep))
}
