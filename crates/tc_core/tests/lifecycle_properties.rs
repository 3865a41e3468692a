//! Property tests for unit lifecycle and battle detection.
//!
//! Random frame streams over a small id pool, so ids collide, die and get
//! reused often.

use std::collections::BTreeSet;

use proptest::prelude::*;
use tc_core::prelude::*;
use tc_test_utils::determinism::strategies::{arb_steps, arb_unit_id, to_messages};
use tc_test_utils::determinism::verify_determinism;
use tc_test_utils::fixtures::{self, ME, NEUTRAL};

fn started(config: StateConfig) -> State {
    let mut state = State::new(config);
    state.update(Message::Handshake(fixtures::handshake()));
    state
}

fn marines() -> StateConfig {
    StateConfig::micro([UnitType::TERRAN_MARINE])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// The alive map holds exactly the resident units not reported dead.
    #[test]
    fn prop_alive_map_matches_frame_minus_deaths(steps in arb_steps(24)) {
        let mut state = started(StateConfig::default());

        for msg in to_messages(&steps) {
            state.update(msg);

            let dead: BTreeSet<UnitId> = state.deaths().iter().copied().collect();
            let expected: AliveUnits = state
                .frame()
                .units
                .values()
                .filter(|u| !dead.contains(&u.id))
                .map(|u| (u.id, u.player_id))
                .collect();
            prop_assert_eq!(state.alive_units(), &expected);
        }
    }

    /// The considered map is the alive map restricted to considered types.
    #[test]
    fn prop_considered_is_filtered_alive(steps in arb_steps(24)) {
        let mut state = started(marines());

        for msg in to_messages(&steps) {
            state.update(msg);

            let considered = state.alive_units_considered().unwrap();
            for (id, owner) in considered {
                prop_assert_eq!(state.alive_units().get(id), Some(owner));
                let unit = state.frame().unit(*id).unwrap();
                prop_assert_eq!(unit.unit_type, UnitType::TERRAN_MARINE);
            }
            let marines_alive = state
                .alive_units()
                .keys()
                .filter(|id| {
                    state.frame().unit(**id).map(|u| u.unit_type) == Some(UnitType::TERRAN_MARINE)
                })
                .count();
            prop_assert_eq!(considered.len(), marines_alive);
        }
    }

    /// Lifecycle events match transitions of the alive map.
    #[test]
    fn prop_events_match_transitions(steps in arb_steps(24)) {
        let mut state = started(StateConfig::default());

        for msg in to_messages(&steps) {
            let before = state.alive_units().clone();
            let tags = state.update(msg);
            let after = state.alive_units();

            for tag in &tags {
                match *tag {
                    UpdateTag::UnitCreated(id) => {
                        prop_assert!(!before.contains_key(&id));
                        prop_assert!(after.contains_key(&id));
                    }
                    UpdateTag::UnitDestroyed(id) => {
                        prop_assert!(!after.contains_key(&id));
                        prop_assert!(state.deaths().contains(&id));
                    }
                    _ => {}
                }
            }
            for id in after.keys().filter(|id| !before.contains_key(id)) {
                prop_assert!(tags.contains(&UpdateTag::UnitCreated(*id)));
            }
        }
    }

    /// A repeated death report changes nothing.
    #[test]
    fn prop_death_is_idempotent(steps in arb_steps(16), victim in arb_unit_id()) {
        let mut state = started(StateConfig::default());
        for msg in to_messages(&steps) {
            state.update(msg);
        }

        state.update(fixtures::deaths(vec![victim], 1000));
        let alive = state.alive_units().clone();
        let tags = state.update(fixtures::deaths(vec![victim], 1001));

        prop_assert!(!tags.contains(&UpdateTag::UnitDestroyed(victim)));
        prop_assert_eq!(state.alive_units(), &alive);
        prop_assert!(!state.is_alive(victim));
    }

    /// Battles end at most once per start and the end frame never decreases.
    #[test]
    fn prop_battle_boundaries_are_consistent(steps in arb_steps(32)) {
        let mut state = started(marines());

        for msg in to_messages(&steps) {
            let before = *state.battle();
            state.update(msg);
            let after = *state.battle();

            prop_assert!(after.last_battle_ended >= before.last_battle_ended);
            if after.battle_just_ended {
                prop_assert!(!before.waiting_for_restart);
                prop_assert!(after.waiting_for_restart);
                prop_assert_eq!(after.battles_finished, before.battles_finished + 1);

                let considered = state.alive_units_considered().unwrap();
                let mine = considered.values().filter(|p| **p == ME).count();
                let enemy = considered.values().filter(|p| **p != ME && **p != NEUTRAL).count();
                prop_assert!(mine == 0 || enemy == 0);
                prop_assert_eq!(after.battle_won, mine > 0);
            } else {
                prop_assert_eq!(after.battles_finished, before.battles_finished);
            }
        }
    }

    /// Replaying the same stream always yields the same state.
    #[test]
    fn prop_replay_is_deterministic(steps in arb_steps(16)) {
        let mut messages = vec![Message::Handshake(fixtures::handshake())];
        messages.extend(to_messages(&steps));

        let result = verify_determinism(2, &marines(), &messages);
        prop_assert!(result.is_deterministic);
    }
}
