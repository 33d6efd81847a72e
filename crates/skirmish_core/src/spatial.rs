//! Spatial queries over entity sets.
//!
//! Nearest-neighbor and radius queries plus the attackable/reachable
//! filters the engagement policy is built on. Candidate sets are
//! borrowed slices of snapshot entities; empty sets yield `None`,
//! never an error.

use crate::entity::Entity;
use crate::math::{Fixed, Vec2Fixed};

/// Map traversability queries, answered by the external collaborator.
pub trait Terrain {
    /// Whether a ground unit can stand at `point`.
    fn is_traversable(&self, point: Vec2Fixed) -> bool;

    /// Find a valid placement near `origin`, biased toward `toward`,
    /// searching successively smaller placement radii.
    ///
    /// Walks from `max_radius` down to `min_radius` in whole-unit
    /// steps and returns the first traversable point on the
    /// origin-to-toward line. `None` when every radius is blocked.
    fn find_placement(
        &self,
        origin: Vec2Fixed,
        toward: Vec2Fixed,
        max_radius: Fixed,
        min_radius: Fixed,
    ) -> Option<Vec2Fixed> {
        let mut radius = max_radius;
        while radius >= min_radius {
            let candidate = origin.towards(toward, radius);
            if self.is_traversable(candidate) {
                return Some(candidate);
            }
            radius -= Fixed::from_num(1);
        }
        None
    }
}

/// Nearest candidate strictly farther than `min_distance` from `origin`.
///
/// Ties are broken by whichever minimum is found first; callers that
/// need determinism pass candidates in sorted-ID order (snapshots
/// already do).
#[must_use]
pub fn closest_to<'a>(
    origin: Vec2Fixed,
    candidates: &[&'a Entity],
    min_distance: Fixed,
) -> Option<&'a Entity> {
    let min_sq = min_distance * min_distance;
    let mut best: Option<(&Entity, Fixed)> = None;
    for &candidate in candidates {
        let dist_sq = origin.distance_squared(candidate.position);
        if dist_sq <= min_sq {
            continue;
        }
        match best {
            Some((_, best_sq)) if dist_sq >= best_sq => {}
            _ => best = Some((candidate, dist_sq)),
        }
    }
    best.map(|(entity, _)| entity)
}

/// All candidates within `radius` of `origin` (inclusive).
#[must_use]
pub fn within_radius<'a>(
    origin: Vec2Fixed,
    candidates: &[&'a Entity],
    radius: Fixed,
) -> Vec<&'a Entity> {
    let radius_sq = radius * radius;
    candidates
        .iter()
        .filter(|candidate| origin.distance_squared(candidate.position) <= radius_sq)
        .copied()
        .collect()
}

/// Whether `attacker` can do any damage at all to `candidate`.
///
/// True iff the volley damage product (hits x damage per hit, weapon
/// chosen by the candidate's flying flag) is nonzero.
#[must_use]
pub fn attackable_target(attacker: &Entity, candidate: &Entity) -> bool {
    attacker.volley_damage_vs(candidate) > Fixed::ZERO
}

/// Whether `attacker` can physically take up a firing position against
/// `candidate`.
///
/// The firing position is the point at the attacker's effective range
/// from the candidate, displaced toward the attacker; it must lie in
/// traversable terrain.
#[must_use]
pub fn reachable_target(terrain: &dyn Terrain, attacker: &Entity, candidate: &Entity) -> bool {
    let effective_range = attacker.effective_range_vs(candidate);
    let firing_position = candidate.position.towards(attacker.position, effective_range);
    terrain.is_traversable(firing_position)
}

/// Nearest candidate that is both attackable and reachable.
///
/// Non-combat passive spawners are excluded; they are never worth a
/// volley.
#[must_use]
pub fn closest_attackable_target<'a>(
    terrain: &dyn Terrain,
    attacker: &Entity,
    candidates: &[&'a Entity],
) -> Option<&'a Entity> {
    let eligible: Vec<&Entity> = candidates
        .iter()
        .filter(|candidate| !candidate.kind.is_passive_spawner())
        .filter(|candidate| attackable_target(attacker, candidate))
        .filter(|candidate| reachable_target(terrain, attacker, candidate))
        .copied()
        .collect();
    closest_to(attacker.position, &eligible, Fixed::ZERO)
}
