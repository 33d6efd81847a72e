//! End-to-end engagement scenarios driven through the full engine.

use skirmish_core::engine::Engine;
use skirmish_core::entity::{AbilityId, Decision, Faction};
use skirmish_core::unit_kind::UnitKind;
use skirmish_test_utils::fixtures::{at, combatant, fixed, structure, worker};
use skirmish_test_utils::scenario::{face_off, squad, FlatTerrain};

fn engine() -> Engine {
    Engine::new(vec![at(80, 80)]).unwrap()
}

// =============================================================================
// Concrete engagement scenarios
// =============================================================================

mod engagements {
    use super::*;

    /// 10 damage x 100 health (1000) versus 8 x 80 (640) at distance
    /// 4: the stronger side commits to the attack.
    #[test]
    fn test_stronger_side_attacks() {
        let snapshot = face_off(
            vec![combatant(1, Faction::Friendly, 0, 0, 10, 100)],
            vec![combatant(2, Faction::Enemy, 4, 0, 8, 80)],
        );

        let decisions = engine().step(&snapshot, &FlatTerrain, 0);
        assert_eq!(decisions, vec![Decision::attack(1, 2)]);
    }

    /// The same pairing at distance 30 is outside every sight
    /// envelope: no engagement decision at all.
    #[test]
    fn test_distant_enemy_is_ignored() {
        let snapshot = face_off(
            vec![combatant(1, Faction::Friendly, 0, 0, 10, 100)],
            vec![combatant(2, Faction::Enemy, 30, 0, 8, 80)],
        );

        let decisions = engine().step(&snapshot, &FlatTerrain, 0);
        assert!(decisions.is_empty());
    }

    /// A 50-strength unit facing a 500-strength enemy falls back
    /// toward the 600-strength ally inside its sight range, with the
    /// retreat flag raised.
    #[test]
    fn test_outmatched_unit_regroups_with_stronger_ally() {
        let unit = combatant(1, Faction::Friendly, 0, 0, 1, 50).with_sight(fixed(20));
        // 2 x 300 = 600, sitting outside the unit's crew radius so the
        // two clusters stay distinct
        let anchor = combatant(2, Faction::Friendly, 18, 0, 2, 300);
        let enemy = combatant(3, Faction::Enemy, 4, 0, 10, 50);
        let snapshot = face_off(vec![unit, anchor], vec![enemy]);

        let mut engine = engine();
        let decisions = engine.step(&snapshot, &FlatTerrain, 0);

        let order = decisions.iter().find(|d| d.unit == 1).unwrap();
        assert_eq!(*order, Decision::move_to(1, at(18, 0)));
        assert_eq!(engine.retreating_ids(), vec![1]);
    }

    /// Once the odds flip in the unit's favor, the retreat flag is
    /// cleared and it turns to fight.
    #[test]
    fn test_retreat_flag_clears_when_odds_improve() {
        let weak = combatant(1, Faction::Friendly, 0, 0, 2, 20);
        let bully = combatant(2, Faction::Enemy, 4, 0, 10, 200);
        let mut engine = engine();

        let losing = face_off(vec![weak.clone()], vec![bully]);
        engine.step(&losing, &FlatTerrain, 0);
        assert_eq!(engine.retreating_ids(), vec![1]);

        // The bully is replaced by something far weaker
        let runt = combatant(2, Faction::Enemy, 4, 0, 1, 10);
        let winning = face_off(vec![weak], vec![runt]);
        let decisions = engine.step(&winning, &FlatTerrain, 1);
        assert_eq!(decisions, vec![Decision::attack(1, 2)]);
        assert!(engine.retreating_ids().is_empty());
    }
}

// =============================================================================
// Decision locality
// =============================================================================

mod locality {
    use super::*;

    /// Entities beyond crew radius plus sight range cannot change a
    /// unit's decision.
    #[test]
    fn test_distant_battle_does_not_change_local_decision() {
        let local_friendly = vec![combatant(1, Faction::Friendly, 0, 0, 10, 100)];
        let local_enemy = vec![combatant(2, Faction::Enemy, 4, 0, 8, 80)];

        let near_only = face_off(local_friendly.clone(), local_enemy.clone());
        let baseline = engine().step(&near_only, &FlatTerrain, 0);

        // A whole second battle 200 units away
        let mut far_friendly = squad(10, Faction::Friendly, 200, 5, 10, 100);
        let mut far_enemy = squad(20, Faction::Enemy, 204, 5, 25, 300);
        far_friendly.extend(local_friendly);
        far_enemy.extend(local_enemy);

        let with_far = face_off(far_friendly, far_enemy);
        let combined = engine().step(&with_far, &FlatTerrain, 0);

        let local_before = baseline.iter().find(|d| d.unit == 1).unwrap();
        let local_after = combined.iter().find(|d| d.unit == 1).unwrap();
        assert_eq!(local_before, local_after);
    }
}

// =============================================================================
// Mixed-army pass
// =============================================================================

mod mixed_army {
    use super::*;

    /// A pass over a mixed force only ever emits attack/move orders or
    /// abilities the collaborator marked legal on the acting unit.
    #[test]
    fn test_only_legal_abilities_are_emitted() {
        let friendly = vec![
            combatant(1, Faction::Friendly, 0, 0, 10, 100),
            worker(2, Faction::Friendly, 2, 2).with_abilities(&[AbilityId::Repair]),
            structure(3, Faction::Friendly, UnitKind::Workshop, 5, 5)
                .with_damaged_health(fixed(200), fixed(500)),
            structure(4, Faction::Friendly, UnitKind::Bastion, 8, 0)
                .with_abilities(&[AbilityId::RaiseShutters]),
        ];
        let enemy = squad(10, Faction::Enemy, 6, 3, 8, 80);
        let snapshot = face_off(friendly, enemy);

        let decisions = engine().step(&snapshot, &FlatTerrain, 0);
        assert!(!decisions.is_empty());
        for decision in &decisions {
            let unit = snapshot.get(decision.unit).unwrap();
            let implied = matches!(decision.ability, AbilityId::Attack | AbilityId::Move);
            assert!(
                implied || unit.has_ability(decision.ability),
                "unit {} issued illegal {:?}",
                decision.unit,
                decision.ability
            );
        }
    }

    /// Every emitted decision references a unit in the snapshot, and
    /// no unit receives two orders.
    #[test]
    fn test_one_order_per_live_unit() {
        let friendly = squad(1, Faction::Friendly, 0, 6, 10, 100);
        let enemy = squad(30, Faction::Enemy, 10, 4, 8, 80);
        let snapshot = face_off(friendly, enemy);

        let decisions = engine().step(&snapshot, &FlatTerrain, 0);
        let mut seen = std::collections::HashSet::new();
        for decision in &decisions {
            assert!(snapshot.contains(decision.unit));
            assert!(seen.insert(decision.unit), "duplicate order for {}", decision.unit);
        }
    }

    /// Identical snapshots produce identical decision lists.
    #[test]
    fn test_pass_is_deterministic() {
        let friendly = squad(1, Faction::Friendly, 0, 6, 10, 100);
        let enemy = squad(30, Faction::Enemy, 8, 6, 12, 120);
        let snapshot = face_off(friendly, enemy);

        let first = engine().step(&snapshot, &FlatTerrain, 0);
        let second = engine().step(&snapshot, &FlatTerrain, 0);
        assert_eq!(first, second);
    }
}
