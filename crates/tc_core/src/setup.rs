//! Static session setup, written once per handshake.

use serde::{Deserialize, Serialize};

use crate::frame::PlayerId;
use crate::grid::Grid;
use crate::message::{Handshake, ImageMode};
use crate::tags::UpdateTag;

/// Immutable per-session data received at handshake.
///
/// Components that need the controlled or neutral player read it through a
/// shared reference; a new handshake replaces the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setup {
    /// Frames between issuing an order and its execution.
    pub lag_frames: i32,
    /// Walk-tile terrain heights, 255 where unknown.
    pub map_data: Grid<u8>,
    /// Build-tile buildability.
    pub buildable_data: Grid<bool>,
    /// Current map name.
    pub map_name: String,
    /// Player controlled by this client.
    pub player_id: PlayerId,
    /// Neutral player.
    pub neutral_id: PlayerId,
    /// Whether the session is a replay.
    pub replay: bool,
    /// Visual observation mode.
    pub image_mode: ImageMode,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            lag_frames: 0,
            map_data: Grid::default(),
            buildable_data: Grid::default(),
            map_name: String::new(),
            player_id: -1,
            neutral_id: -1,
            replay: false,
            image_mode: ImageMode::None,
        }
    }
}

impl Setup {
    /// Build the setup record from a handshake, appending one tag per
    /// field written.
    ///
    /// Grids whose buffers disagree with their declared size are dropped.
    #[must_use]
    pub fn from_handshake(handshake: Handshake, upd: &mut Vec<UpdateTag>) -> Self {
        let mut setup = Self {
            lag_frames: handshake.lag_frames,
            player_id: handshake.player_id,
            neutral_id: handshake.neutral_id,
            replay: handshake.replay,
            image_mode: handshake.image_mode,
            ..Self::default()
        };
        upd.push(UpdateTag::LagFrames);

        if let Some(map_data) = handshake.map_data {
            if map_data.is_consistent() {
                setup.map_data = map_data;
                upd.push(UpdateTag::MapData);
            } else {
                tracing::warn!(
                    size = ?map_data.size(),
                    "Handshake map data does not match its size, ignoring"
                );
            }
        }
        if let Some(buildable) = handshake.buildable_data {
            if buildable.is_consistent() {
                setup.buildable_data = buildable;
                upd.push(UpdateTag::BuildableData);
            } else {
                tracing::warn!(
                    size = ?buildable.size(),
                    "Handshake buildable data does not match its size, ignoring"
                );
            }
        }
        if let Some(map_name) = handshake.map_name {
            setup.map_name = map_name;
            upd.push(UpdateTag::MapName);
        }

        upd.extend([
            UpdateTag::PlayerId,
            UpdateTag::NeutralId,
            UpdateTag::Replay,
            UpdateTag::ImageMode,
        ]);
        setup
    }

    /// Whether `player` is neither the controlled nor the neutral player.
    #[must_use]
    pub fn is_enemy(&self, player: PlayerId) -> bool {
        player != self.player_id && player != self.neutral_id
    }

    /// Whether the build tile at `(x, y)` is buildable.
    #[must_use]
    pub fn is_buildable(&self, x: u32, y: u32) -> bool {
        self.buildable_data.get(x, y).copied().unwrap_or(false)
    }
}
