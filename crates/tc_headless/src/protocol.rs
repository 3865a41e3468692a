//! JSON lines protocol of the headless driver.
//!
//! **Input:** one decoded engine [`Message`] per line, tagged by `kind`.
//! Blank lines and lines starting with `#` are skipped.
//!
//! **Output:** one [`Response`] per line, tagged by `type`.
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","micro_battles":true,"only_consider_types":[0]}
//! -> {"kind":"handshake","lag_frames":2,"player_id":0,"neutral_id":11}
//! <- {"type":"update","line":1,"kind":"handshake","tags":["lag_frames",...],"summary":{...}}
//! -> {"kind":"frame","deaths":[20],"frame_from_bwapi":2}
//! <- {"type":"update","line":2,"kind":"frame","tags":["deaths",...,"unit_destroyed:20",...],...}
//! <- {"type":"done","messages":2,"errors":0,"battles_finished":1}
//! ```

use serde::{Deserialize, Serialize};
use tc_core::prelude::*;

/// Protocol version reported in [`Response::Ready`].
pub const PROTOCOL_VERSION: &str = "1.0";

/// Alive unit count of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerUnits {
    /// Owning player.
    pub player_id: PlayerId,
    /// Alive units of known types.
    pub count: usize,
}

/// Compact view of the session after an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSummary {
    /// Engine frame counter.
    pub frame_from_bwapi: i32,
    /// Number of alive units.
    pub alive_units: usize,
    /// Number of alive considered units, absent when no types are considered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alive_units_considered: Option<usize>,
    /// Alive units of known types per player, in player id order.
    pub units: Vec<PlayerUnits>,
    /// Whether the latest update ended a battle.
    pub battle_just_ended: bool,
    /// Whether the controlled player won the last battle.
    pub battle_won: bool,
    /// Whether battle detection is waiting for a restart.
    pub waiting_for_restart: bool,
    /// Frame the last battle ended at.
    pub last_battle_ended: i32,
    /// Whether the game ended.
    pub game_ended: bool,
    /// Whether the controlled player won the game.
    pub game_won: bool,
}

impl StateSummary {
    /// Summarize `state`.
    #[must_use]
    pub fn from_state(state: &State) -> Self {
        Self {
            frame_from_bwapi: state.frame_from_bwapi(),
            alive_units: state.alive_units().len(),
            alive_units_considered: state.alive_units_considered().ok().map(|m| m.len()),
            units: state
                .units()
                .iter()
                .map(|(&player_id, units)| PlayerUnits {
                    player_id,
                    count: units.len(),
                })
                .collect(),
            battle_just_ended: state.battle_just_ended(),
            battle_won: state.battle_won(),
            waiting_for_restart: state.waiting_for_restart(),
            last_battle_ended: state.last_battle_ended(),
            game_ended: state.game_ended(),
            game_won: state.game_won(),
        }
    }
}

/// Responses written by the driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Driver is ready to read messages.
    Ready {
        /// Protocol version.
        version: String,
        /// Micro-battle detection enabled.
        micro_battles: bool,
        /// Considered unit type ids.
        only_consider_types: Vec<i32>,
    },

    /// A message was applied.
    Update {
        /// 1-based input line number.
        line: usize,
        /// Message kind.
        kind: String,
        /// Update tags in the order the engine produced them.
        tags: Vec<String>,
        /// Session view after the update.
        summary: StateSummary,
    },

    /// An input line was rejected.
    Error {
        /// 1-based input line number, if the error belongs to a line.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line: Option<usize>,
        /// Human-readable error.
        message: String,
    },

    /// Input exhausted.
    Done {
        /// Messages applied.
        messages: usize,
        /// Lines rejected.
        errors: usize,
        /// Battles concluded in the final session.
        battles_finished: u32,
    },
}

impl Response {
    /// Ready response for a configuration.
    #[must_use]
    pub fn ready(config: &StateConfig) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            micro_battles: config.micro_battles,
            only_consider_types: config.only_consider_types.iter().map(|t| t.id()).collect(),
        }
    }

    /// Update response for a message that was just applied.
    #[must_use]
    pub fn update(line: usize, kind: &str, tags: &[UpdateTag], state: &State) -> Self {
        Self::Update {
            line,
            kind: kind.to_string(),
            tags: tc_core::tags::to_strings(tags),
            summary: StateSummary::from_state(state),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, line: Option<usize>) -> Self {
        Self::Error {
            line,
            message: message.into(),
        }
    }

    /// Serialize to a JSON line (with trailing newline).
    #[must_use]
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

/// Parse one input line into a message.
///
/// # Errors
///
/// Returns an error if the line is not a valid JSON message.
pub fn parse_message(line: &str) -> std::result::Result<Message, serde_json::Error> {
    serde_json::from_str(line)
}

/// Whether an input line carries no message.
#[must_use]
pub fn is_skippable(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('#')
}
