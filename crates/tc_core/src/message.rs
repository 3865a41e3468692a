//! Typed messages produced by the upstream decoder.
//!
//! The engine consumes three kinds of already-validated records. Wire-level
//! parsing happens elsewhere; these types only describe what a decoded
//! message carries. All of them deserialize from JSON lines or RON so logs
//! can be replayed through the engine.
//!
//! ```
//! use tc_core::message::Message;
//!
//! let msg: Message = serde_json::from_str(r#"{"kind":"end_game","won":true}"#).unwrap();
//! assert_eq!(msg.name(), "end_game");
//! ```

use serde::{Deserialize, Serialize};

use crate::frame::{Frame, PlayerId, UnitId};
use crate::grid::Grid;

/// Visual observation mode negotiated at handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageMode {
    /// No screen or visibility data.
    #[default]
    None,
    /// Raw RGB screen buffer plus visibility grid on every frame.
    Raw,
}

impl ImageMode {
    /// Whether frames are expected to carry image data.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Session setup sent once by the engine when a client connects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handshake {
    /// Frames between issuing an order and its execution.
    #[serde(default)]
    pub lag_frames: i32,
    /// Walk-tile terrain heights.
    #[serde(default)]
    pub map_data: Option<Grid<u8>>,
    /// Build-tile buildability.
    #[serde(default)]
    pub buildable_data: Option<Grid<bool>>,
    /// Current map name.
    #[serde(default)]
    pub map_name: Option<String>,
    /// Player controlled by this client.
    pub player_id: PlayerId,
    /// Neutral player.
    pub neutral_id: PlayerId,
    /// Whether the session is a replay.
    #[serde(default)]
    pub replay: bool,
    /// Visual observation mode.
    #[serde(default)]
    pub image_mode: ImageMode,
}

/// How the frame payload relates to the resident frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FramePayload {
    /// Complete world state. Replaces every unit in the resident frame.
    Snapshot(Frame),
    /// Only what changed since the previous update. Units present are
    /// inserted or replaced; absent units keep their last record.
    Delta(Frame),
}

impl FramePayload {
    /// The carried frame, regardless of kind.
    #[must_use]
    pub fn frame(&self) -> &Frame {
        match self {
            Self::Snapshot(frame) | Self::Delta(frame) => frame,
        }
    }
}

/// RGB screen buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RgbImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGB triples.
    pub data: Vec<u8>,
}

impl RgbImage {
    /// Byte count implied by the declared size.
    #[must_use]
    pub fn expected_len(&self) -> usize {
        3 * (self.width as usize) * (self.height as usize)
    }
}

/// Screen and fog-of-war data attached to a frame.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Top-left corner of the screen in pixels.
    pub screen_position: [i32; 2],
    /// Walk-tile visibility levels.
    pub visibility: Grid<u8>,
    /// Screen pixels.
    pub image: RgbImage,
}

/// One tick's update from the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameUpdate {
    /// World data, absent when nothing but scalars changed.
    pub payload: Option<FramePayload>,
    /// Units that died since the previous update.
    pub deaths: Vec<UnitId>,
    /// Engine frame counter.
    pub frame_from_bwapi: i32,
    /// Frames elapsed in the current battle (micro scenarios).
    pub battle_frame_count: i32,
    /// Visual observation data.
    pub image: Option<ImagePayload>,
}

impl FrameUpdate {
    /// Whether the update carries nothing to merge.
    ///
    /// Empty updates are treated as no-ops by the engine.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_none()
            && self.deaths.is_empty()
            && self.image.is_none()
            && self.frame_from_bwapi == 0
            && self.battle_frame_count == 0
    }
}

/// Final outcome sent when the game ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndGame {
    /// Whether the controlled player won.
    pub won: bool,
}

/// Any message the engine consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    /// Session setup.
    Handshake(Handshake),
    /// World update.
    Frame(FrameUpdate),
    /// Game outcome.
    EndGame(EndGame),
}

impl Message {
    /// Message kind name, as used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Handshake(_) => "handshake",
            Self::Frame(_) => "frame",
            Self::EndGame(_) => "end_game",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Action, Resources, Unit};
    use crate::unit_type::UnitType;

    #[test]
    fn test_parse_handshake() {
        let json = r#"{"kind":"handshake","player_id":0,"neutral_id":11,"map_name":"bridge"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        let Message::Handshake(hs) = msg else {
            panic!("expected handshake");
        };
        assert_eq!(hs.player_id, 0);
        assert_eq!(hs.neutral_id, 11);
        assert_eq!(hs.map_name.as_deref(), Some("bridge"));
        assert_eq!(hs.image_mode, ImageMode::None);
        assert!(hs.map_data.is_none());
    }

    #[test]
    fn test_parse_delta_frame() {
        let json = r#"{"kind":"frame","frame_from_bwapi":12,"deaths":[3],
            "payload":{"delta":{"units":[{"id":1,"player_id":0,"unit_type":0}]}}}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        let Message::Frame(update) = msg else {
            panic!("expected frame");
        };
        assert_eq!(update.frame_from_bwapi, 12);
        assert_eq!(update.deaths, vec![3]);
        assert!(matches!(update.payload, Some(FramePayload::Delta(_))));
        assert_eq!(update.payload.unwrap().frame().units.len(), 1);
    }

    #[test]
    fn test_frame_with_resources_round_trip() {
        let mut frame = Frame::with_units([Unit::new(1, 0, UnitType::TERRAN_MARINE)]);
        frame.resources.insert(0, Resources { ore: 50, ..Resources::default() });
        frame.actions.insert(1, vec![Action { frame: 4, action: vec![7] }]);
        let msg = Message::Frame(FrameUpdate {
            payload: Some(FramePayload::Snapshot(frame)),
            frame_from_bwapi: 4,
            ..FrameUpdate::default()
        });

        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""resources":[[0,{"#));
        let restored: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, msg);
    }

    #[test]
    fn test_empty_frame_update() {
        assert!(FrameUpdate::default().is_empty());
        let update = FrameUpdate {
            deaths: vec![1],
            ..FrameUpdate::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_message_names() {
        assert_eq!(Message::EndGame(EndGame { won: false }).name(), "end_game");
        assert_eq!(Message::Frame(FrameUpdate::default()).name(), "frame");
    }

    #[test]
    fn test_rgb_expected_len() {
        let img = RgbImage {
            width: 4,
            height: 2,
            data: Vec::new(),
        };
        assert_eq!(img.expected_len(), 24);
    }
}
