//! Step driver: scheduler gate, vision memory, and the full decision
//! pass.
//!
//! The `Engine` owns every piece of state that survives a step: the
//! scheduler interval, the per-unit retreat flags, the remembered
//! positions of enemies that slipped out of sight, and the scouting
//! rotation. Everything else is recomputed from the snapshot each
//! pass.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::entity::{Decision, Entity, EntityId, Faction, Snapshot};
use crate::error::{EngineError, Result};
use crate::math::{Fixed, Vec2Fixed};
use crate::policy;
use crate::scheduler::Scheduler;
use crate::spatial::{closest_to, Terrain};
use crate::specialist::specialize;
use crate::strength::DecisionContext;

/// How close an idle unit must get to a scouting waypoint before the
/// rotation advances.
const ARRIVAL_RADIUS: i32 = 5;

/// Last known whereabouts of an enemy that is no longer visible.
#[derive(Debug, Clone, Copy)]
struct Sighting {
    position: Vec2Fixed,
    is_structure: bool,
}

/// The combat micro-decision engine.
///
/// Step-driven and single-threaded: the collaborator calls
/// [`Engine::step`] once per simulated step with a fresh snapshot and
/// executes the returned decisions. The engine never blocks, spawns,
/// or performs IO.
#[derive(Debug)]
pub struct Engine {
    scheduler: Scheduler,
    retreating: HashSet<EntityId>,
    sightings: HashMap<EntityId, Sighting>,
    scout_route: Vec<Vec2Fixed>,
    scout_index: usize,
}

impl Engine {
    /// Create an engine with a scouting rotation to fall back on when
    /// no enemy has ever been seen.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyScoutRotation`] when the route has
    /// no waypoints; idle units would have nowhere to go.
    pub fn new(scout_route: Vec<Vec2Fixed>) -> Result<Self> {
        if scout_route.is_empty() {
            return Err(EngineError::EmptyScoutRotation);
        }
        Ok(Self {
            scheduler: Scheduler::new(),
            retreating: HashSet::new(),
            sightings: HashMap::new(),
            scout_route,
            scout_index: 0,
        })
    }

    /// Current scheduler state.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// IDs flagged as retreating after the last full pass.
    #[must_use]
    pub fn retreating_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.retreating.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Run one simulated step.
    ///
    /// Off-interval steps only refresh vision memory and nudge idle
    /// units; on-interval steps run the full decision pass and feed
    /// its wall-clock cost back into the scheduler.
    pub fn step(&mut self, snapshot: &Snapshot, terrain: &dyn Terrain, step: u64) -> Vec<Decision> {
        self.observe(snapshot);

        if !self.scheduler.is_full_pass(step) {
            return self.idle_pass(snapshot);
        }

        let started = Instant::now();
        let decisions = self.full_pass(snapshot, terrain);
        self.scheduler.record_cost(started.elapsed());

        tracing::debug!(
            step,
            decisions = decisions.len(),
            interval = self.scheduler.interval(),
            "full decision pass"
        );
        debug_assert!(decisions.iter().all(|d| snapshot.contains(d.unit)));
        #[cfg(feature = "debug-validation")]
        Self::validate(&decisions, snapshot);
        decisions
    }

    /// Extra decision validation behind the `debug-validation` feature.
    ///
    /// # Panics
    ///
    /// Panics when a decision references a unit missing from the
    /// snapshot or an ability the collaborator did not mark legal
    /// (attack and move orders are implied by combat and movement
    /// stats and are always allowed).
    #[cfg(feature = "debug-validation")]
    fn validate(decisions: &[Decision], snapshot: &Snapshot) {
        use crate::entity::AbilityId;

        for decision in decisions {
            let Some(unit) = snapshot.get(decision.unit) else {
                panic!("decision for unit {} not in snapshot", decision.unit);
            };
            let implied = matches!(decision.ability, AbilityId::Attack | AbilityId::Move);
            assert!(
                implied || unit.has_ability(decision.ability),
                "unit {} issued {:?} without the ability being legal",
                decision.unit,
                decision.ability
            );
        }
    }

    /// Refresh vision memory from this step's snapshot.
    ///
    /// Visible enemies overwrite their sighting; a sighting is dropped
    /// once a friendly can see its position and the enemy is not
    /// there.
    fn observe(&mut self, snapshot: &Snapshot) {
        for enemy in snapshot.enemies() {
            self.sightings.insert(
                enemy.id,
                Sighting {
                    position: enemy.position,
                    is_structure: enemy.kind.is_structure(),
                },
            );
        }
        let friendly = snapshot.friendly();
        self.sightings.retain(|id, sighting| {
            if snapshot.contains(*id) {
                return true;
            }
            !friendly.iter().any(|unit| {
                unit.position.distance_squared(sighting.position)
                    <= unit.sight_radius * unit.sight_radius
            })
        });
        self.retreating.retain(|id| snapshot.contains(*id));
    }

    fn full_pass(&mut self, snapshot: &Snapshot, terrain: &dyn Terrain) -> Vec<Decision> {
        let mut ctx = DecisionContext::new();
        for &id in &self.retreating {
            ctx.set_retreating(id, true);
        }

        let mut decisions = Vec::new();
        for id in snapshot.sorted_ids() {
            let Some(unit) = snapshot.get(id) else {
                continue;
            };
            if unit.faction != Faction::Friendly {
                continue;
            }
            if ctx.is_reserved(id) {
                continue;
            }

            let enemies = snapshot.enemies();
            let nearest_enemy = closest_to(unit.position, &enemies, Fixed::ZERO);

            if let Some(decision) = specialize(&mut ctx, snapshot, terrain, unit, nearest_enemy) {
                if decision.unit != unit.id {
                    // A specialization claimed another unit; any order
                    // it already received this pass is superseded
                    decisions.retain(|d: &Decision| d.unit != decision.unit);
                }
                decisions.push(decision);
                continue;
            }

            if let Some(enemy) = nearest_enemy {
                let (_state, decision) = policy::resolve(&mut ctx, snapshot, terrain, unit, enemy);
                if let Some(decision) = decision {
                    decisions.push(decision);
                    continue;
                }
            }

            if let Some(decision) = self.idle_decision(snapshot, unit) {
                decisions.push(decision);
            }
        }

        self.retreating = ctx.retreating_ids().into_iter().collect();
        decisions
    }

    /// Off-interval bookkeeping: only idle units get nudged.
    fn idle_pass(&mut self, snapshot: &Snapshot) -> Vec<Decision> {
        let mut decisions = Vec::new();
        for id in snapshot.sorted_ids() {
            let Some(unit) = snapshot.get(id) else {
                continue;
            };
            if unit.faction != Faction::Friendly {
                continue;
            }
            if let Some(decision) = self.idle_decision(snapshot, unit) {
                decisions.push(decision);
            }
        }
        decisions
    }

    /// Advance an idle combat unit toward the enemy, or toward where
    /// the enemy was last seen, or along the scouting rotation.
    fn idle_decision(&mut self, snapshot: &Snapshot, unit: &Entity) -> Option<Decision> {
        if !unit.idle || !unit.is_mobile() || !unit.can_attack() || unit.kind.is_worker() {
            return None;
        }
        let goal = self.rally_point(snapshot, unit.position);
        Some(Decision::attack_move(unit.id, goal))
    }

    /// Where an idle unit should head.
    ///
    /// Priority: nearest visible enemy, then a remembered enemy
    /// structure, then any remembered sighting, then the scouting
    /// rotation (advanced round-robin once a waypoint is reached).
    fn rally_point(&mut self, snapshot: &Snapshot, from: Vec2Fixed) -> Vec2Fixed {
        let enemies = snapshot.enemies();
        if let Some(enemy) = closest_to(from, &enemies, Fixed::ZERO) {
            return enemy.position;
        }

        if let Some(position) = self.remembered_position() {
            return position;
        }

        let waypoint = self.scout_route[self.scout_index];
        let arrival = Fixed::from_num(ARRIVAL_RADIUS);
        if from.distance_squared(waypoint) <= arrival * arrival {
            self.scout_index = (self.scout_index + 1) % self.scout_route.len();
            return self.scout_route[self.scout_index];
        }
        waypoint
    }

    /// Lowest-ID remembered sighting, structures first.
    fn remembered_position(&self) -> Option<Vec2Fixed> {
        let mut ids: Vec<EntityId> = self.sightings.keys().copied().collect();
        ids.sort_unstable();
        ids.iter()
            .map(|id| self.sightings[id])
            .find(|sighting| sighting.is_structure)
            .or_else(|| ids.first().map(|id| self.sightings[id]))
            .map(|sighting| sighting.position)
    }
}
