//! Scenario and terrain builders for integration tests.

use skirmish_core::entity::{Entity, EntityId, Faction, Snapshot};
use skirmish_core::math::{Fixed, Vec2Fixed};
use skirmish_core::spatial::Terrain;

use crate::fixtures::combatant;

/// Terrain where every point is traversable.
#[derive(Debug, Clone, Copy)]
pub struct FlatTerrain;

impl Terrain for FlatTerrain {
    fn is_traversable(&self, _point: Vec2Fixed) -> bool {
        true
    }
}

/// Terrain blocked east of a vertical wall.
#[derive(Debug, Clone, Copy)]
pub struct WalledTerrain {
    /// Largest traversable x coordinate.
    pub max_x: Fixed,
}

impl Terrain for WalledTerrain {
    fn is_traversable(&self, point: Vec2Fixed) -> bool {
        point.x <= self.max_x
    }
}

/// Build a snapshot from two entity lists.
///
/// # Panics
///
/// Panics on duplicate entity IDs; scenario builders assign IDs
/// manually and a clash is a broken test, not a runtime condition.
#[must_use]
pub fn face_off(friendly: Vec<Entity>, enemy: Vec<Entity>) -> Snapshot {
    Snapshot::from_entities(friendly.into_iter().chain(enemy))
        .expect("scenario entity IDs must be unique")
}

/// A line of identical combatants, spaced one unit apart along x.
#[must_use]
pub fn squad(
    first_id: EntityId,
    faction: Faction,
    origin_x: i32,
    count: usize,
    damage: i32,
    health: i32,
) -> Vec<Entity> {
    (0..count)
        .map(|i| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let (id_offset, x_offset) = (i as EntityId, i as i32);
            combatant(
                first_id + id_offset,
                faction,
                origin_x + x_offset,
                0,
                damage,
                health,
            )
        })
        .collect()
}
