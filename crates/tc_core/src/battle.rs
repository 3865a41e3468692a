//! Micro-battle boundary detection.
//!
//! In micro-battle scenarios the engine runs a sequence of small skirmishes
//! on the same map. After every merge the detector looks at the considered
//! alive units and decides whether the current battle has just ended.
//!
//! The detector is a two-state machine:
//!
//! - **Waiting for restart**: a battle ended (or none has started yet).
//!   Nothing can end until both the controlled player and an opponent field
//!   considered units again, which re-arms the detector.
//! - **In battle**: the battle ends as soon as at most one side has
//!   considered units left, including when every considered unit vanished.
//!
//! Waiting suppresses repeated "battle ended" signals while the engine keeps
//! streaming frozen post-battle frames.

use serde::{Deserialize, Serialize};

use crate::setup::Setup;
use crate::tags::UpdateTag;
use crate::tracker::AliveTracker;

/// Battle outcome flags. Only meaningful in micro-battle mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleState {
    /// Whether the latest merge ended a battle.
    pub battle_just_ended: bool,
    /// Whether the controlled player won the last battle.
    pub battle_won: bool,
    /// Whether detection is paused until both sides field units again.
    pub waiting_for_restart: bool,
    /// Engine frame at which the last battle ended, -1 if none has.
    pub last_battle_ended: i32,
    /// Battles concluded in this session.
    pub battles_finished: u32,
}

impl Default for BattleState {
    fn default() -> Self {
        Self::new(false)
    }
}

impl BattleState {
    /// Initial flags. Detection starts out waiting for the first battle
    /// when `armed` is set.
    #[must_use]
    pub const fn new(armed: bool) -> Self {
        Self {
            battle_just_ended: false,
            battle_won: false,
            waiting_for_restart: armed,
            last_battle_ended: -1,
            battles_finished: 0,
        }
    }

    /// Evaluate the tracker after a merge.
    ///
    /// Returns `true` when this merge ended a battle. When the tracker's
    /// considered map is invalid (no considered types) nothing is evaluated
    /// and the session behaves like a full game.
    pub fn check_finished(
        &mut self,
        tracker: &AliveTracker,
        setup: &Setup,
        frame_from_bwapi: i32,
        upd: &mut Vec<UpdateTag>,
    ) -> bool {
        let Some(sides) = tracker.considered_sides(setup) else {
            return false;
        };

        if self.waiting_for_restart {
            if sides.mine > 0 && sides.enemy > 0 {
                self.waiting_for_restart = false;
                upd.push(UpdateTag::WaitingForRestart);
                upd.push(UpdateTag::BattleStarted);
                tracing::debug!(
                    mine = sides.mine,
                    enemy = sides.enemy,
                    "Battle started"
                );
            }
            return false;
        }

        if sides.mine > 0 && sides.enemy > 0 {
            return false;
        }

        self.battle_just_ended = true;
        self.battle_won = sides.mine > 0;
        self.waiting_for_restart = true;
        self.last_battle_ended = self.last_battle_ended.max(frame_from_bwapi);
        self.battles_finished += 1;
        upd.extend([
            UpdateTag::BattleJustEnded,
            UpdateTag::BattleWon,
            UpdateTag::WaitingForRestart,
            UpdateTag::LastBattleEnded,
            UpdateTag::BattleEnded,
        ]);
        tracing::info!(
            won = self.battle_won,
            frame = self.last_battle_ended,
            battles = self.battles_finished,
            "Battle ended"
        );
        true
    }
}
