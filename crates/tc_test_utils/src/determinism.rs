//! Determinism testing utilities.
//!
//! Provides a harness for verifying that replaying the same message stream
//! through fresh states always produces identical results.
//!
//! # Testing Strategy
//!
//! The state engine must be a pure function of its configuration and the
//! messages it has seen. Sources of non-determinism include:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Every map in the engine is ordered by id.
//!
//! - **Hidden history**: The engine keeps only the resident frame and the
//!   latest death list, so two replays of the same stream must converge.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tc_core::prelude::*;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Final state hash from each run.
    pub hashes: Vec<u64>,
    /// Number of messages replayed per run.
    pub messages: usize,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic engine).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run converged, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "State engine is non-deterministic!\n\
                 Runs: {}\n\
                 Messages: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.messages,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Hash any hashable value with the std hasher.
#[must_use]
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Hash everything a consumer can observe about `state`.
#[must_use]
pub fn state_hash(state: &State) -> u64 {
    let frame_bytes = state.frame_bytes().unwrap_or_default();
    let units: Vec<(PlayerId, Vec<UnitId>)> = state
        .units()
        .iter()
        .map(|(player, units)| (*player, units.iter().map(|u| u.id).collect()))
        .collect();
    compute_hash(&(
        frame_bytes,
        state.alive_units(),
        state.alive_units_considered().ok(),
        units,
        state.deaths(),
        state.frame_from_bwapi(),
        state.battle(),
        state.game_ended(),
        state.game_won(),
    ))
}

/// Replay `messages` through `runs` fresh states and compare final hashes.
///
/// Each run also records the update tags of every message; runs that emit
/// different tags are treated as diverged.
pub fn verify_determinism(
    runs: usize,
    config: &StateConfig,
    messages: &[Message],
) -> DeterminismResult {
    let hashes: Vec<u64> = (0..runs)
        .map(|_| {
            let mut state = State::new(config.clone());
            let mut tags: Vec<String> = Vec::new();
            for message in messages {
                tags.extend(
                    state
                        .update(message.clone())
                        .iter()
                        .map(ToString::to_string),
                );
            }
            compute_hash(&(state_hash(&state), tags))
        })
        .collect();

    tracing::debug!(runs, messages = messages.len(), "Replayed message stream");
    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        messages: messages.len(),
    }
}

/// Parse a JSON-lines message log, one message per line.
///
/// Blank lines and lines starting with `#` are skipped.
///
/// # Errors
///
/// Returns the first JSON error encountered.
pub fn parse_message_log(text: &str) -> std::result::Result<Vec<Message>, serde_json::Error> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Proptest strategies for message streams.
///
/// Streams draw unit ids from a small pool so that spawns, repeated deaths
/// and id reuse collide often.
pub mod strategies {
    use proptest::prelude::*;
    use tc_core::prelude::*;

    use crate::fixtures::{ENEMY, ME, NEUTRAL};

    /// Size of the unit id pool.
    pub const ID_POOL: UnitId = 16;

    /// One generated frame update before conversion to a message.
    #[derive(Debug, Clone)]
    pub struct Step {
        /// Units carried by the payload.
        pub units: Vec<Unit>,
        /// Death list.
        pub deaths: Vec<UnitId>,
        /// Whether the payload is a snapshot rather than a delta.
        pub snapshot: bool,
    }

    /// Generate a unit id from the pool.
    pub fn arb_unit_id() -> impl Strategy<Value = UnitId> {
        0..ID_POOL
    }

    /// Generate a player: mostly the two sides, sometimes neutral.
    pub fn arb_player() -> impl Strategy<Value = PlayerId> {
        prop_oneof![4 => Just(ME), 4 => Just(ENEMY), 1 => Just(NEUTRAL)]
    }

    /// Generate a unit type: considered, unconsidered or unknown.
    pub fn arb_unit_type() -> impl Strategy<Value = UnitType> {
        prop_oneof![
            4 => Just(UnitType::TERRAN_MARINE),
            2 => Just(UnitType::ZERG_ZERGLING),
            1 => Just(UnitType::SPECIAL_MAP_REVEALER),
        ]
    }

    /// Generate a unit record.
    pub fn arb_unit() -> impl Strategy<Value = Unit> {
        (arb_unit_id(), arb_player(), arb_unit_type(), 1i32..100)
            .prop_map(|(id, player, unit_type, health)| Unit {
                health,
                max_health: 100,
                ..Unit::new(id, player, unit_type)
            })
    }

    /// Generate one step.
    pub fn arb_step() -> impl Strategy<Value = Step> {
        (
            proptest::collection::vec(arb_unit(), 0..6),
            proptest::collection::vec(arb_unit_id(), 0..3),
            proptest::bool::weighted(0.1),
        )
            .prop_map(|(units, deaths, snapshot)| Step {
                units,
                deaths,
                snapshot,
            })
    }

    /// Generate a sequence of steps.
    pub fn arb_steps(max_len: usize) -> impl Strategy<Value = Vec<Step>> {
        proptest::collection::vec(arb_step(), 1..max_len)
    }

    /// Convert steps to frame messages with increasing frame counters.
    #[must_use]
    pub fn to_messages(steps: &[Step]) -> Vec<Message> {
        steps
            .iter()
            .zip(1i32..)
            .map(|(step, frame)| {
                let payload = Frame::with_units(step.units.iter().cloned());
                Message::Frame(FrameUpdate {
                    payload: Some(if step.snapshot {
                        FramePayload::Snapshot(payload)
                    } else {
                        FramePayload::Delta(payload)
                    }),
                    deaths: step.deaths.clone(),
                    frame_from_bwapi: frame * 8,
                    ..FrameUpdate::default()
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::strategies::*;
    use super::*;
    use crate::fixtures::{self, ENEMY, ME};
    use proptest::prelude::*;

    fn battle_stream() -> Vec<Message> {
        vec![
            Message::Handshake(fixtures::handshake()),
            fixtures::delta(vec![fixtures::marine(1, ME), fixtures::marine(2, ENEMY)], 1),
            fixtures::deaths(vec![2], 2),
        ]
    }

    #[test]
    fn test_replay_is_deterministic() {
        let config = StateConfig::micro([UnitType::TERRAN_MARINE]);
        let result = verify_determinism(4, &config, &battle_stream());
        result.assert_deterministic();
        assert_eq!(result.unique_hashes().len(), 1);
        assert_eq!(result.messages, 3);
    }

    #[test]
    fn test_different_streams_hash_differently() {
        let config = StateConfig::default();
        let a = verify_determinism(1, &config, &battle_stream());
        let b = verify_determinism(1, &config, &battle_stream()[..2]);
        assert_ne!(a.hashes, b.hashes);
    }

    #[test]
    fn test_parse_message_log() {
        let text = r#"
            # session
            {"kind":"handshake","player_id":0,"neutral_id":11}
            {"kind":"frame","deaths":[3],"frame_from_bwapi":5}

            {"kind":"end_game","won":true}
        "#;
        let messages = parse_message_log(text).unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].name(), "end_game");
    }

    #[test]
    fn test_parse_message_log_rejects_bad_line() {
        let text = "{\"kind\":\"end_game\",\"won\":true}\n{\"kind\":\"frame\",\"deaths\":7}\n";
        let err = parse_message_log(text).unwrap_err();
        assert!(err.is_data());
    }

    proptest! {
        #[test]
        fn prop_random_streams_are_deterministic(steps in arb_steps(12)) {
            let mut messages = vec![Message::Handshake(fixtures::handshake())];
            messages.extend(to_messages(&steps));
            let config = StateConfig::micro([UnitType::TERRAN_MARINE]);
            let result = verify_determinism(2, &config, &messages);
            prop_assert!(result.is_deterministic);
        }
    }
}
