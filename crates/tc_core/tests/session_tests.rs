//! Session-level tests.
//!
//! Drive a [`State`] through full message streams and check what consumers
//! observe after each update.

use std::collections::BTreeSet;

use tc_core::prelude::*;
use tc_test_utils::fixtures::{self, ENEMY, ME, NEUTRAL};

fn full_game_state() -> State {
    let mut state = State::default();
    state.update(Message::Handshake(fixtures::handshake()));
    state
}

// =============================================================================
// Micro battles
// =============================================================================

#[test]
fn marine_duel_ends_with_win_for_controlled_player() {
    let mut state = fixtures::micro_marine_state();

    state.update(fixtures::delta(
        vec![fixtures::marine(10, ME), fixtures::marine(20, ENEMY)],
        1,
    ));
    assert!(!state.battle_just_ended());
    assert!(!state.waiting_for_restart());

    let tags = state.update(fixtures::deaths(vec![20], 2));

    assert!(tags.contains(&UpdateTag::UnitDestroyed(20)));
    assert!(tags.contains(&UpdateTag::BattleEnded));
    assert_eq!(
        state.alive_units_considered().unwrap(),
        &AliveUnits::from([(10, ME)])
    );
    assert!(state.battle_just_ended());
    assert!(state.battle_won());
    assert!(state.waiting_for_restart());
    assert_eq!(state.last_battle_ended(), 2);
}

#[test]
fn skipped_frames_decide_battle_by_death_order() {
    let mut state = fixtures::micro_marine_state();
    state.update(fixtures::delta(
        vec![fixtures::marine(1, ME), fixtures::marine(2, ENEMY)],
        1,
    ));

    // Both marines died within the skipped interval, the enemy first.
    let tags = state.update(fixtures::deaths(vec![2, 1], 2));

    assert!(state.battle_just_ended());
    assert!(state.battle_won());
    assert!(tags.contains(&UpdateTag::UnitDestroyed(2)));
    assert!(!tags.contains(&UpdateTag::UnitDestroyed(1)));
    assert_eq!(
        state.alive_units_considered().unwrap(),
        &AliveUnits::from([(1, ME)])
    );
    assert_eq!(state.alive_units(), &AliveUnits::from([(1, ME)]));
    assert_eq!(state.my_units().len(), 1);
    assert_eq!(state.deaths(), &[2, 1]);

    // The held-back death lands with the next update.
    let tags = state.update(fixtures::delta(vec![], 3));
    assert!(tags.contains(&UpdateTag::UnitDestroyed(1)));
    assert!(!tags.contains(&UpdateTag::BattleEnded));
    assert!(!state.battle_just_ended());
    assert!(state.alive_units().is_empty());
    assert!(state.frame().unit(1).is_none());
    assert_eq!(state.battle().battles_finished, 1);
}

#[test]
fn skipped_frames_losing_side_dies_first() {
    let mut state = fixtures::micro_marine_state();
    state.update(fixtures::delta(
        vec![
            fixtures::marine(1, ME),
            fixtures::marine(2, ENEMY),
            fixtures::marine(3, ENEMY),
        ],
        1,
    ));

    state.update(fixtures::deaths(vec![2, 1, 3], 2));

    assert!(state.battle_just_ended());
    assert!(!state.battle_won());
    assert_eq!(
        state.alive_units_considered().unwrap(),
        &AliveUnits::from([(3, ENEMY)])
    );
    assert_eq!(state.enemy_units().count(), 1);
}

#[test]
fn full_game_mode_applies_every_death() {
    let mut state = full_game_state();
    state.update(fixtures::delta(
        vec![fixtures::marine(1, ME), fixtures::marine(2, ENEMY)],
        1,
    ));

    let tags = state.update(fixtures::deaths(vec![2, 1], 2));

    assert!(tags.contains(&UpdateTag::UnitDestroyed(1)));
    assert!(tags.contains(&UpdateTag::UnitDestroyed(2)));
    assert!(state.alive_units().is_empty());
}

#[test]
fn battle_just_ended_clears_on_next_frame() {
    let mut state = fixtures::micro_marine_state();
    state.update(fixtures::delta(
        vec![fixtures::marine(1, ME), fixtures::marine(2, ENEMY)],
        1,
    ));
    state.update(fixtures::deaths(vec![1], 2));
    assert!(state.battle_just_ended());
    assert!(!state.battle_won());

    state.update(fixtures::delta(vec![], 3));
    assert!(!state.battle_just_ended());
    assert!(state.waiting_for_restart());
}

#[test]
fn frozen_post_battle_stream_does_not_retrigger() {
    let mut state = fixtures::micro_marine_state();
    state.update(fixtures::delta(
        vec![fixtures::marine(1, ME), fixtures::marine(2, ENEMY)],
        1,
    ));
    state.update(fixtures::deaths(vec![2], 2));

    for frame in 3..20 {
        let tags = state.update(fixtures::delta(vec![fixtures::marine(1, ME)], frame));
        assert!(!tags.contains(&UpdateTag::BattleEnded));
        assert!(!state.battle_just_ended());
    }
    assert_eq!(state.battle().battles_finished, 1);
    assert_eq!(state.last_battle_ended(), 2);
}

#[test]
fn next_battle_restarts_detection() {
    let mut state = fixtures::micro_marine_state();
    state.update(fixtures::delta(
        vec![fixtures::marine(1, ME), fixtures::marine(2, ENEMY)],
        1,
    ));
    state.update(fixtures::deaths(vec![2], 2));

    // The scenario respawns both sides.
    let tags = state.update(fixtures::delta_with_deaths(
        vec![fixtures::marine(3, ME), fixtures::marine(4, ENEMY)],
        vec![1],
        10,
    ));
    assert!(tags.contains(&UpdateTag::BattleStarted));
    assert!(!state.waiting_for_restart());

    state.update(fixtures::deaths(vec![3], 14));
    assert!(state.battle_just_ended());
    assert!(!state.battle_won());
    assert_eq!(state.last_battle_ended(), 14);
    assert_eq!(state.battle().battles_finished, 2);
}

#[test]
fn unconsidered_units_do_not_keep_a_battle_alive() {
    let mut state = fixtures::micro_marine_state();
    state.update(fixtures::delta(
        vec![
            fixtures::marine(1, ME),
            fixtures::marine(2, ENEMY),
            fixtures::unit(3, ENEMY, UnitType::ZERG_ZERGLING),
        ],
        1,
    ));

    state.update(fixtures::deaths(vec![2], 2));
    assert!(state.battle_just_ended());
    assert!(state.battle_won());
    assert!(state.is_alive(3));
}

#[test]
fn empty_considered_types_never_ends_a_battle() {
    let mut state = State::new(StateConfig {
        micro_battles: true,
        only_consider_types: BTreeSet::new(),
    });
    state.update(Message::Handshake(fixtures::handshake()));

    state.update(fixtures::delta(
        vec![fixtures::marine(1, ME), fixtures::marine(2, ENEMY)],
        1,
    ));
    for (frame, dead) in [(2, 2), (3, 1)] {
        let tags = state.update(fixtures::deaths(vec![dead], frame));
        assert!(!tags.contains(&UpdateTag::BattleEnded));
        assert!(!state.battle_just_ended());
    }
    assert_eq!(
        state.alive_units_considered(),
        Err(StateError::ConsideredTypesEmpty)
    );
    assert_eq!(state.last_battle_ended(), -1);
}

#[test]
fn full_game_mode_never_ends_a_battle() {
    let mut state = State::new(StateConfig {
        micro_battles: false,
        only_consider_types: BTreeSet::from([UnitType::TERRAN_MARINE]),
    });
    state.update(Message::Handshake(fixtures::handshake()));
    state.update(fixtures::delta(
        vec![fixtures::marine(1, ME), fixtures::marine(2, ENEMY)],
        1,
    ));
    state.update(fixtures::deaths(vec![2], 2));

    assert!(!state.battle_just_ended());
    assert_eq!(
        state.alive_units_considered().unwrap(),
        &AliveUnits::from([(1, ME)])
    );
}

// =============================================================================
// Frame merging
// =============================================================================

#[test]
fn delta_keeps_units_it_does_not_mention() {
    let mut state = full_game_state();
    state.update(fixtures::delta(
        vec![fixtures::marine(1, ME), fixtures::marine(2, ENEMY)],
        1,
    ));

    let mut hurt = fixtures::marine(2, ENEMY);
    hurt.health = 5;
    let tags = state.update(fixtures::delta(vec![hurt], 2));

    assert!(!tags.iter().any(|t| matches!(t, UpdateTag::UnitCreated(_))));
    assert_eq!(state.my_units().len(), 1);
    assert_eq!(state.units_of(ENEMY)[0].health, 5);
}

#[test]
fn snapshot_drops_units_it_does_not_mention() {
    let mut state = full_game_state();
    state.update(fixtures::delta(
        vec![fixtures::marine(1, ME), fixtures::marine(2, ENEMY)],
        1,
    ));

    state.update(fixtures::snapshot(vec![fixtures::marine(1, ME)], 2));

    assert!(!state.is_alive(2));
    assert!(state.frame().unit(2).is_none());
    assert_eq!(state.alive_units(), &AliveUnits::from([(1, ME)]));
}

#[test]
fn frame_skip_death_is_reported_once() {
    let mut state = full_game_state();

    // Unit 5 spawned and died between two updates the engine sent.
    let tags = state.update(fixtures::delta_with_deaths(
        vec![fixtures::marine(4, ME), fixtures::marine(5, ENEMY)],
        vec![5],
        3,
    ));

    assert!(tags.contains(&UpdateTag::UnitCreated(4)));
    assert!(!tags.contains(&UpdateTag::UnitCreated(5)));
    assert!(tags.contains(&UpdateTag::UnitDestroyed(5)));
    assert!(state.frame().unit(5).is_some());
    assert!(state.units_of(ENEMY).is_empty());

    let tags = state.update(fixtures::deaths(vec![5], 4));
    assert!(!tags.contains(&UpdateTag::UnitDestroyed(5)));
    assert!(state.frame().unit(5).is_none());
}

#[test]
fn reused_id_after_death_is_alive_again() {
    let mut state = full_game_state();
    state.update(fixtures::delta(vec![fixtures::marine(7, ENEMY)], 1));
    state.update(fixtures::deaths(vec![7], 2));
    assert!(!state.is_alive(7));

    let tags = state.update(fixtures::delta(vec![fixtures::marine(7, ME)], 3));
    assert!(tags.contains(&UpdateTag::UnitCreated(7)));
    assert_eq!(state.tracker().owner(7), Some(ME));
}

#[test]
fn empty_message_is_a_noop() {
    let mut state = full_game_state();
    state.update(fixtures::delta(vec![fixtures::marine(1, ME)], 1));
    let before = state.alive_units().clone();

    let tags = state.update(Message::Frame(FrameUpdate::default()));

    assert!(tags.is_empty());
    assert_eq!(state.alive_units(), &before);
    assert_eq!(state.frame_from_bwapi(), 1);
}

#[test]
fn neutral_units_listed_separately() {
    let mut state = full_game_state();
    state.update(fixtures::delta(
        vec![
            fixtures::marine(1, ME),
            fixtures::unit(2, NEUTRAL, UnitType::RESOURCE_MINERAL_FIELD),
            fixtures::unit(3, NEUTRAL, UnitType::SPECIAL_MAP_REVEALER),
        ],
        1,
    ));

    assert_eq!(state.units_of(NEUTRAL).len(), 1);
    assert_eq!(state.enemy_units().count(), 0);
    assert_eq!(state.alive_units().len(), 3);
}

// =============================================================================
// Session lifecycle
// =============================================================================

#[test]
fn handshake_mid_session_resets_frame_state() {
    let mut state = fixtures::micro_marine_state();
    state.update(fixtures::delta(
        vec![fixtures::marine(1, ME), fixtures::marine(2, ENEMY)],
        1,
    ));
    state.update(Message::EndGame(EndGame { won: false }));

    let mut handshake = fixtures::handshake();
    handshake.map_name = Some("second".to_string());
    let tags = state.update(Message::Handshake(handshake));

    assert!(tags.contains(&UpdateTag::MapName));
    assert_eq!(state.map_name(), "second");
    assert!(state.alive_units().is_empty());
    assert!(state.units().is_empty());
    assert!(!state.game_ended());
    assert!(state.micro_battles());
    assert_eq!(
        state.only_consider_types(),
        &BTreeSet::from([UnitType::TERRAN_MARINE])
    );
}

#[test]
fn reset_preserves_configuration() {
    let mut state = fixtures::micro_marine_state();
    state.update(fixtures::delta(
        vec![fixtures::marine(1, ME), fixtures::marine(2, ENEMY)],
        1,
    ));
    state.update(fixtures::deaths(vec![2], 2));

    let micro = state.micro_battles();
    let types = state.only_consider_types().clone();
    state.reset();

    assert_eq!(state.micro_battles(), micro);
    assert_eq!(state.only_consider_types(), &types);
    assert!(state.frame().units.is_empty());
    assert!(state.deaths().is_empty());
    assert!(state.alive_units().is_empty());
    assert!(!state.battle_just_ended());
    assert_eq!(state.last_battle_ended(), -1);
    assert!(!state.has_setup());
}

#[test]
fn end_game_is_recorded() {
    let mut state = full_game_state();
    let tags = state.update(Message::EndGame(EndGame { won: true }));

    assert_eq!(tags, vec![UpdateTag::GameEnded, UpdateTag::GameWon]);
    assert!(state.game_ended());
    assert!(state.game_won());
}

#[test]
fn image_mode_soft_failure_keeps_state() {
    let mut state = State::default();
    state.update(Message::Handshake(fixtures::handshake_with_image()));

    let tags = state.update(Message::Frame(FrameUpdate {
        payload: Some(FramePayload::Delta(Frame::with_units([fixtures::marine(1, ME)]))),
        image: Some(fixtures::image_payload(4, 3)),
        frame_from_bwapi: 1,
        ..FrameUpdate::default()
    }));
    assert!(tags.contains(&UpdateTag::Image));
    let before = state.visual().cloned();

    let tags = state.update(fixtures::delta(vec![fixtures::marine(1, ME)], 2));
    assert!(!tags.contains(&UpdateTag::Image));
    assert!(tags.contains(&UpdateTag::Frame));
    assert_eq!(state.visual().cloned(), before);
    assert_eq!(state.visual().unwrap().image_size(), [4, 3]);
}

#[test]
fn tags_render_as_stable_strings() {
    let mut state = fixtures::micro_marine_state();
    state.update(fixtures::delta(
        vec![fixtures::marine(1, ME), fixtures::marine(2, ENEMY)],
        1,
    ));
    let tags = tc_core::tags::to_strings(&state.update(fixtures::deaths(vec![2], 2)));

    for expected in [
        "deaths",
        "frame_from_bwapi",
        "unit_destroyed:2",
        "alive_units",
        "alive_units_considered",
        "battle_just_ended",
        "battle_ended",
        "units",
    ] {
        assert!(tags.iter().any(|t| t == expected), "missing tag {expected}");
    }
}
