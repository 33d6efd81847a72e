//! Test fixtures and helpers.
//!
//! Pre-built entity configurations for consistent testing across the
//! unit, property, and integration suites.

use fixed::types::I32F32;
use skirmish_core::entity::{Entity, EntityId, Faction};
use skirmish_core::math::Vec2Fixed;
use skirmish_core::unit_kind::UnitKind;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real decision code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point position from integer coordinates.
#[must_use]
pub fn at(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::new(fixed(x), fixed(y))
}

/// Standard line infantry: range 5, damage 10, health 100, sight 9.
#[must_use]
pub fn trooper(id: EntityId, faction: Faction, x: i32, y: i32) -> Entity {
    Entity::new(id, faction, UnitKind::Trooper, at(x, y))
        .with_ground_weapon(fixed(5), fixed(10))
        .with_health(fixed(100))
        .with_sight(fixed(9))
        .with_speed(fixed(3))
}

/// Trooper with explicit damage and health, for strength-ratio setups.
#[must_use]
pub fn combatant(
    id: EntityId,
    faction: Faction,
    x: i32,
    y: i32,
    damage: i32,
    health: i32,
) -> Entity {
    Entity::new(id, faction, UnitKind::Trooper, at(x, y))
        .with_ground_weapon(fixed(5), fixed(damage))
        .with_health(fixed(health))
        .with_sight(fixed(9))
        .with_speed(fixed(3))
}

/// Flying gunship with an air-and-ground weapon.
#[must_use]
pub fn interceptor(id: EntityId, faction: Faction, x: i32, y: i32) -> Entity {
    Entity::new(id, faction, UnitKind::Interceptor, at(x, y))
        .with_ground_weapon(fixed(6), fixed(8))
        .with_air_weapon(fixed(6), fixed(8))
        .with_health(fixed(120))
        .with_sight(fixed(10))
        .with_speed(fixed(5))
        .with_flying()
}

/// Lightly armed resource worker.
#[must_use]
pub fn worker(id: EntityId, faction: Faction, x: i32, y: i32) -> Entity {
    Entity::new(id, faction, UnitKind::Worker, at(x, y))
        .with_ground_weapon(fixed(1), fixed(5))
        .with_health(fixed(40))
        .with_sight(fixed(8))
        .with_speed(fixed(3))
}

/// Immobile structure of the given kind.
#[must_use]
pub fn structure(id: EntityId, faction: Faction, kind: UnitKind, x: i32, y: i32) -> Entity {
    Entity::new(id, faction, kind, at(x, y))
        .with_health(fixed(500))
        .with_sight(fixed(9))
        .with_radius(fixed(2))
}
