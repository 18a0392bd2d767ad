//! Damage and roll helpers shared by the attack and move handlers.
use crate::env::UnitType;
use crate::state::{EntityId, GameState, Position};

/// Upper bound of a variance roll, in percent.
pub const MAX_ROLL: u8 = 100;

/// Damage dealt by `attacker` to `defender` for a given variance roll.
///
/// The base is `max(1, attack - defense)`; the roll adds up to 100 % of it.
pub fn damage(attacker: &UnitType, defender: &UnitType, roll: u8) -> u32 {
    let base = attacker.attack.saturating_sub(defender.defense).max(1);
    let roll = u32::from(roll.min(MAX_ROLL));
    base + base * roll / u32::from(MAX_ROLL)
}

/// True when `unit_type` can hit a target `distance` tiles away.
pub fn in_range(unit_type: &UnitType, from: Position, to: Position) -> bool {
    unit_type.attack_range.contains(from.manhattan(to))
}

/// Whether the defender of an attack answers with a counter from where it
/// stands.
pub fn retaliates(defender: &UnitType, defender_at: Position, attacker_at: Position) -> bool {
    defender.can_counter() && in_range(defender, defender_at, attacker_at)
}

/// Deterministic variance roll for follow-up attacks that no player seeded.
///
/// Mixes the commit nonce with both participants so consecutive exchanges
/// between the same pair differ.
pub fn derive_roll(state: &GameState, attacker: EntityId, defender: EntityId) -> u8 {
    let mut hash = state.turn.nonce.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    hash ^= u64::from(attacker.0).wrapping_mul(0x517c_c1b7_2722_0a95);
    hash ^= u64::from(defender.0).wrapping_mul(0x85eb_ca6b);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51_afd7_ed55_8ccd);
    hash ^= hash >> 33;
    (hash % (u64::from(MAX_ROLL) + 1)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{AttackRange, UnitTraits};
    use crate::state::UnitTypeId;

    fn unit(attack: u32, defense: u32) -> UnitType {
        UnitType {
            id: UnitTypeId(1),
            name: "test".into(),
            max_health: 10,
            attack,
            defense,
            move_range: 3,
            attack_range: AttackRange::MELEE,
            traits: UnitTraits::empty(),
        }
    }

    #[test]
    fn damage_has_floor_of_one_and_scales_with_roll() {
        assert_eq!(damage(&unit(5, 2), &unit(0, 0), 0), 5);
        assert_eq!(damage(&unit(5, 0), &unit(0, 2), 0), 3);
        assert_eq!(damage(&unit(5, 0), &unit(0, 2), 50), 4);
        assert_eq!(damage(&unit(5, 0), &unit(0, 2), 100), 6);
        assert_eq!(damage(&unit(1, 0), &unit(0, 9), 0), 1);
        // Rolls above 100 are clamped.
        assert_eq!(damage(&unit(5, 0), &unit(0, 2), 250), 6);
    }

    #[test]
    fn derived_rolls_are_stable_and_bounded() {
        let mut state = GameState::empty();
        let first = derive_roll(&state, EntityId(5), EntityId(9));
        assert_eq!(first, derive_roll(&state, EntityId(5), EntityId(9)));
        for nonce in 0..64 {
            state.turn.nonce = nonce;
            assert!(derive_roll(&state, EntityId(5), EntityId(9)) <= MAX_ROLL);
        }
    }

    #[test]
    fn no_counter_trait_suppresses_retaliation() {
        let mut defender = unit(3, 1);
        let here = Position::new(0, 0);
        let there = Position::new(0, 1);
        assert!(retaliates(&defender, here, there));

        defender.traits = UnitTraits::NO_COUNTER;
        assert!(!retaliates(&defender, here, there));

        defender.traits = UnitTraits::empty();
        assert!(!retaliates(&defender, here, Position::new(0, 2)));
    }
}
