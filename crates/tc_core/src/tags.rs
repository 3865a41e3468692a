//! Update tags returned from every state update.
//!
//! Tags name what an update changed. Field tags name a state field that was
//! written; event tags describe something that happened. The string forms
//! are a stable vocabulary consumed by control scripts.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::frame::UnitId;

/// What a single update changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateTag {
    // ========================================
    // Setup fields
    // ========================================
    /// `lag_frames` written.
    LagFrames,
    /// `map_data` written.
    MapData,
    /// `buildable_data` written.
    BuildableData,
    /// `map_name` written.
    MapName,
    /// `player_id` written.
    PlayerId,
    /// `neutral_id` written.
    NeutralId,
    /// `replay` written.
    Replay,
    /// `img_mode` written.
    ImageMode,

    // ========================================
    // Frame fields
    // ========================================
    /// Resident frame merged.
    Frame,
    /// Death list written.
    Deaths,
    /// `frame_from_bwapi` written.
    FrameFromBwapi,
    /// `battle_frame_count` written.
    BattleFrameCount,
    /// Screen, visibility and image buffers written.
    Image,
    /// Alive-units map refreshed.
    AliveUnits,
    /// Filtered alive-units map refreshed.
    AliveUnitsConsidered,
    /// Units-by-player view rebuilt.
    Units,

    // ========================================
    // Outcome fields
    // ========================================
    /// `game_ended` written.
    GameEnded,
    /// `game_won` written.
    GameWon,
    /// `battle_just_ended` written.
    BattleJustEnded,
    /// `battle_won` written.
    BattleWon,
    /// `waiting_for_restart` written.
    WaitingForRestart,
    /// `last_battle_ended` written.
    LastBattleEnded,

    // ========================================
    // Events
    // ========================================
    /// A unit was seen alive for the first time.
    UnitCreated(UnitId),
    /// A tracked unit was reported dead.
    UnitDestroyed(UnitId),
    /// Both sides fielded considered units again after a battle ended.
    BattleStarted,
    /// A micro battle concluded.
    BattleEnded,
}

impl UpdateTag {
    /// Stable name without any event payload.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LagFrames => "lag_frames",
            Self::MapData => "map_data",
            Self::BuildableData => "buildable_data",
            Self::MapName => "map_name",
            Self::PlayerId => "player_id",
            Self::NeutralId => "neutral_id",
            Self::Replay => "replay",
            Self::ImageMode => "img_mode",
            Self::Frame => "frame",
            Self::Deaths => "deaths",
            Self::FrameFromBwapi => "frame_from_bwapi",
            Self::BattleFrameCount => "battle_frame_count",
            Self::Image => "image",
            Self::AliveUnits => "alive_units",
            Self::AliveUnitsConsidered => "alive_units_considered",
            Self::Units => "units",
            Self::GameEnded => "game_ended",
            Self::GameWon => "game_won",
            Self::BattleJustEnded => "battle_just_ended",
            Self::BattleWon => "battle_won",
            Self::WaitingForRestart => "waiting_for_restart",
            Self::LastBattleEnded => "last_battle_ended",
            Self::UnitCreated(_) => "unit_created",
            Self::UnitDestroyed(_) => "unit_destroyed",
            Self::BattleStarted => "battle_started",
            Self::BattleEnded => "battle_ended",
        }
    }

    /// Whether this tag describes an event rather than a written field.
    #[must_use]
    pub const fn is_event(self) -> bool {
        matches!(
            self,
            Self::UnitCreated(_) | Self::UnitDestroyed(_) | Self::BattleStarted | Self::BattleEnded
        )
    }
}

impl fmt::Display for UpdateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnitCreated(id) | Self::UnitDestroyed(id) => write!(f, "{}:{id}", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

impl Serialize for UpdateTag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Render tags as strings for consumers that expect plain text.
#[must_use]
pub fn to_strings(tags: &[UpdateTag]) -> Vec<String> {
    tags.iter().map(ToString::to_string).collect()
}
