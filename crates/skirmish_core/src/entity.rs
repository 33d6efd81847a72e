//! Per-step entity model, snapshots, and emitted decisions.
//!
//! Entities are read-only values rebuilt from the external
//! collaborator every step; the engine owns no cross-step identity
//! object. Engine-computed state (retreat flags, strength figures)
//! lives in [`crate::strength::DecisionContext`], never on the entity
//! itself.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::unit_kind::UnitKind;

/// Unique identifier for entities, assigned by the collaborator.
pub type EntityId = u64;

/// Which side of the engagement an entity is on.
///
/// The engine only distinguishes its own side from the opposing side;
/// alliances and player indices are resolved by the collaborator
/// before the snapshot is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Controlled by this engine.
    Friendly,
    /// Everything the engine may have to fight.
    Enemy,
}

impl Faction {
    /// The opposing side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Friendly => Self::Enemy,
            Self::Enemy => Self::Friendly,
        }
    }
}

/// Action identifiers the collaborator may mark legal on an entity.
///
/// The collaborator queries legal actions per entity each step and
/// merges them onto the entity record; the engine never emits an
/// ability a specialization did not find in that list (the generic
/// attack/move decisions are implied by combat and movement stats).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityId {
    /// Attack a target entity.
    Attack,
    /// Move to a target point.
    Move,
    /// Hold the current position.
    HoldPosition,
    /// Dig in (becomes untargetable by most weapons).
    Burrow,
    /// Surface from a burrowed state.
    Unburrow,
    /// Area-denial bombardment at a target point.
    Bombard,
    /// Restore health to a target ally.
    Mend,
    /// Raise defensive shutters (blocks ground movement).
    RaiseShutters,
    /// Lower defensive shutters (allies can pass).
    LowerShutters,
    /// Repair a target structure.
    Repair,
    /// Enter stationary high-detection posture.
    Surveil,
    /// Leave the high-detection posture.
    StandDown,
}

/// One visible unit or structure, valid for a single step.
///
/// All combat attributes come straight from the collaborator. Fields
/// use fixed-point math so identical snapshots always produce
/// identical decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Opaque stable identifier.
    pub id: EntityId,
    /// Which side this entity is on.
    pub faction: Faction,
    /// Kind tag from the closed enumeration.
    pub kind: UnitKind,
    /// World position.
    pub position: Vec2Fixed,
    /// Movement speed (distance units per step); zero for structures.
    #[serde(with = "fixed_serde")]
    pub movement_speed: Fixed,
    /// Weapon range against ground targets.
    #[serde(with = "fixed_serde")]
    pub ground_range: Fixed,
    /// Weapon range against flying targets.
    #[serde(with = "fixed_serde")]
    pub air_range: Fixed,
    /// Damage per hit against ground targets.
    #[serde(with = "fixed_serde")]
    pub ground_damage: Fixed,
    /// Damage per hit against flying targets.
    #[serde(with = "fixed_serde")]
    pub air_damage: Fixed,
    /// Hits per attack volley.
    pub hits_per_volley: u32,
    /// Sight radius.
    #[serde(with = "fixed_serde")]
    pub sight_radius: Fixed,
    /// Collision radius.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
    /// Current health.
    #[serde(with = "fixed_serde")]
    pub health: Fixed,
    /// Maximum health.
    #[serde(with = "fixed_serde")]
    pub max_health: Fixed,
    /// Current shield.
    #[serde(with = "fixed_serde")]
    pub shield: Fixed,
    /// Steps until the weapon can fire again.
    #[serde(with = "fixed_serde")]
    pub weapon_cooldown: Fixed,
    /// Whether this entity flies.
    pub flying: bool,
    /// Whether this entity currently has no orders.
    pub idle: bool,
    /// Actions the collaborator reports as legal this step.
    pub abilities: Vec<AbilityId>,
}

impl Entity {
    /// Create an inert entity at a position.
    ///
    /// All combat attributes start at zero; chain the `with_` builders
    /// to give the entity a weapon, health, or abilities.
    #[must_use]
    pub fn new(id: EntityId, faction: Faction, kind: UnitKind, position: Vec2Fixed) -> Self {
        Self {
            id,
            faction,
            kind,
            position,
            movement_speed: Fixed::ZERO,
            ground_range: Fixed::ZERO,
            air_range: Fixed::ZERO,
            ground_damage: Fixed::ZERO,
            air_damage: Fixed::ZERO,
            hits_per_volley: 1,
            sight_radius: Fixed::ZERO,
            radius: Fixed::ZERO,
            health: Fixed::ZERO,
            max_health: Fixed::ZERO,
            shield: Fixed::ZERO,
            weapon_cooldown: Fixed::ZERO,
            flying: false,
            idle: false,
            abilities: Vec::new(),
        }
    }

    /// Builder method to set a ground weapon.
    #[must_use]
    pub fn with_ground_weapon(mut self, range: Fixed, damage: Fixed) -> Self {
        self.ground_range = range;
        self.ground_damage = damage;
        self
    }

    /// Builder method to set an air weapon.
    #[must_use]
    pub fn with_air_weapon(mut self, range: Fixed, damage: Fixed) -> Self {
        self.air_range = range;
        self.air_damage = damage;
        self
    }

    /// Builder method to set health (current and maximum).
    #[must_use]
    pub fn with_health(mut self, health: Fixed) -> Self {
        self.health = health;
        self.max_health = health;
        self
    }

    /// Builder method to set current and maximum health separately.
    #[must_use]
    pub fn with_damaged_health(mut self, health: Fixed, max_health: Fixed) -> Self {
        self.health = health;
        self.max_health = max_health;
        self
    }

    /// Builder method to set shield.
    #[must_use]
    pub fn with_shield(mut self, shield: Fixed) -> Self {
        self.shield = shield;
        self
    }

    /// Builder method to set sight radius.
    #[must_use]
    pub fn with_sight(mut self, sight: Fixed) -> Self {
        self.sight_radius = sight;
        self
    }

    /// Builder method to set movement speed.
    #[must_use]
    pub fn with_speed(mut self, speed: Fixed) -> Self {
        self.movement_speed = speed;
        self
    }

    /// Builder method to set collision radius.
    #[must_use]
    pub fn with_radius(mut self, radius: Fixed) -> Self {
        self.radius = radius;
        self
    }

    /// Builder method to mark the entity as flying.
    #[must_use]
    pub fn with_flying(mut self) -> Self {
        self.flying = true;
        self
    }

    /// Builder method to mark the entity as idle (no current orders).
    #[must_use]
    pub fn with_idle(mut self) -> Self {
        self.idle = true;
        self
    }

    /// Builder method to set legal abilities.
    #[must_use]
    pub fn with_abilities(mut self, abilities: &[AbilityId]) -> Self {
        self.abilities = abilities.to_vec();
        self
    }

    /// Check if the collaborator reports an ability as legal this step.
    #[must_use]
    pub fn has_ability(&self, ability: AbilityId) -> bool {
        self.abilities.contains(&ability)
    }

    /// Check if this entity has any weapon at all.
    #[must_use]
    pub fn can_attack(&self) -> bool {
        self.ground_damage > Fixed::ZERO || self.air_damage > Fixed::ZERO
    }

    /// Check if this entity can move.
    #[must_use]
    pub fn is_mobile(&self) -> bool {
        self.movement_speed > Fixed::ZERO && !self.kind.is_structure()
    }

    /// Damage per hit against a specific target (ground or air weapon,
    /// chosen by the target's flying flag).
    #[must_use]
    pub fn damage_vs(&self, target: &Entity) -> Fixed {
        if target.flying {
            self.air_damage
        } else {
            self.ground_damage
        }
    }

    /// Full volley damage against a specific target: `hits x damage`.
    ///
    /// Zero means this entity cannot hurt that target at all.
    #[must_use]
    pub fn volley_damage_vs(&self, target: &Entity) -> Fixed {
        self.damage_vs(target) * Fixed::from_num(self.hits_per_volley)
    }

    /// Weapon range against a specific target.
    #[must_use]
    pub fn range_vs(&self, target: &Entity) -> Fixed {
        if target.flying {
            self.air_range
        } else {
            self.ground_range
        }
    }

    /// Effective attack range against a target, including both
    /// collision radii.
    #[must_use]
    pub fn effective_range_vs(&self, target: &Entity) -> Fixed {
        self.range_vs(target) + self.radius + target.radius
    }

    /// Combined health and shield.
    #[must_use]
    pub fn effective_health(&self) -> Fixed {
        self.health + self.shield
    }

    /// Center-to-center distance to another entity.
    #[must_use]
    pub fn distance_to(&self, other: &Entity) -> Fixed {
        self.position.distance(other.position)
    }
}

/// All entities visible this step, split by faction.
///
/// Rebuilt by the collaborator each step; the engine never carries a
/// snapshot across steps. Lookup is O(1) by ID, iteration is always in
/// sorted-ID order for deterministic decision passes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Map of entity ID to entity data.
    entities: HashMap<EntityId, Entity>,
}

impl Snapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
        }
    }

    /// Build a snapshot from an entity list.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateEntity`] if the collaborator
    /// hands over the same ID twice - that is a contract breach, not a
    /// recoverable condition.
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Result<Self> {
        let mut snapshot = Self::new();
        for entity in entities {
            snapshot.insert(entity)?;
        }
        Ok(snapshot)
    }

    /// Insert one entity.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateEntity`] if an entity with this
    /// ID is already present.
    pub fn insert(&mut self, entity: Entity) -> Result<()> {
        if self.entities.contains_key(&entity.id) {
            return Err(EngineError::DuplicateEntity(entity.id));
        }
        self.entities.insert(entity.id, entity);
        Ok(())
    }

    /// Get an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Check if an entity is present this step.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of visible entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Get sorted entity IDs for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.entities.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// All entities of one faction, in sorted-ID order.
    #[must_use]
    pub fn faction_entities(&self, faction: Faction) -> Vec<&Entity> {
        self.sorted_ids()
            .into_iter()
            .filter_map(|id| self.entities.get(&id))
            .filter(|entity| entity.faction == faction)
            .collect()
    }

    /// All friendly entities, in sorted-ID order.
    #[must_use]
    pub fn friendly(&self) -> Vec<&Entity> {
        self.faction_entities(Faction::Friendly)
    }

    /// All enemy entities, in sorted-ID order.
    #[must_use]
    pub fn enemies(&self) -> Vec<&Entity> {
        self.faction_entities(Faction::Enemy)
    }
}

/// What a decision is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// No target (self-cast or toggle abilities).
    None,
    /// A world position.
    Point(Vec2Fixed),
    /// A specific entity.
    Entity(EntityId),
}

/// One intended action, the unit of engine output.
///
/// Decisions are immutable once produced and hand off to the
/// collaborator for execution, fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// The acting unit. Always present in the step's snapshot.
    pub unit: EntityId,
    /// The ability to use.
    pub ability: AbilityId,
    /// What the ability is aimed at.
    pub target: Target,
}

impl Decision {
    /// Create a decision.
    #[must_use]
    pub const fn new(unit: EntityId, ability: AbilityId, target: Target) -> Self {
        Self {
            unit,
            ability,
            target,
        }
    }

    /// Attack decision aimed at an entity.
    #[must_use]
    pub const fn attack(unit: EntityId, target: EntityId) -> Self {
        Self::new(unit, AbilityId::Attack, Target::Entity(target))
    }

    /// Move decision aimed at a point.
    #[must_use]
    pub const fn move_to(unit: EntityId, point: Vec2Fixed) -> Self {
        Self::new(unit, AbilityId::Move, Target::Point(point))
    }

    /// Attack-move decision: advance on a point, engaging on the way.
    #[must_use]
    pub const fn attack_move(unit: EntityId, point: Vec2Fixed) -> Self {
        Self::new(unit, AbilityId::Attack, Target::Point(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fixed;

    fn trooper(id: EntityId, faction: Faction, x: i32) -> Entity {
        Entity::new(
            id,
            faction,
            UnitKind::Trooper,
            Vec2Fixed::new(Fixed::from_num(x), Fixed::ZERO),
        )
        .with_ground_weapon(Fixed::from_num(5), Fixed::from_num(10))
        .with_health(Fixed::from_num(100))
    }

    #[test]
    fn test_snapshot_rejects_duplicate_ids() {
        let mut snapshot = Snapshot::new();
        snapshot.insert(trooper(1, Faction::Friendly, 0)).unwrap();
        let err = snapshot.insert(trooper(1, Faction::Enemy, 5));
        assert!(matches!(err, Err(EngineError::DuplicateEntity(1))));
    }

    #[test]
    fn test_faction_split_is_sorted() {
        let snapshot = Snapshot::from_entities([
            trooper(3, Faction::Friendly, 0),
            trooper(1, Faction::Friendly, 1),
            trooper(2, Faction::Enemy, 5),
        ])
        .unwrap();

        let friendly: Vec<_> = snapshot.friendly().iter().map(|e| e.id).collect();
        assert_eq!(friendly, vec![1, 3]);
        assert_eq!(snapshot.enemies().len(), 1);
    }

    #[test]
    fn test_weapon_selection_by_flying_flag() {
        let attacker = trooper(1, Faction::Friendly, 0)
            .with_air_weapon(Fixed::from_num(7), Fixed::from_num(4));
        let ground = trooper(2, Faction::Enemy, 3);
        let air = trooper(3, Faction::Enemy, 3).with_flying();

        assert_eq!(attacker.damage_vs(&ground), Fixed::from_num(10));
        assert_eq!(attacker.damage_vs(&air), Fixed::from_num(4));
        assert_eq!(attacker.range_vs(&ground), Fixed::from_num(5));
        assert_eq!(attacker.range_vs(&air), Fixed::from_num(7));
    }

    #[test]
    fn test_effective_range_includes_radii() {
        let attacker = trooper(1, Faction::Friendly, 0).with_radius(Fixed::from_num(1));
        let target = trooper(2, Faction::Enemy, 3).with_radius(Fixed::from_num(2));
        // 5 range + 1 + 2 radii
        assert_eq!(attacker.effective_range_vs(&target), Fixed::from_num(8));
    }

    #[test]
    fn test_volley_damage_scales_with_hits() {
        let mut attacker = trooper(1, Faction::Friendly, 0);
        attacker.hits_per_volley = 3;
        let target = trooper(2, Faction::Enemy, 3);
        assert_eq!(attacker.volley_damage_vs(&target), Fixed::from_num(30));
    }
}
