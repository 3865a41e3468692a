//! Test fixtures and helpers.
//!
//! Pre-built messages for consistent testing. The controlled player is
//! [`ME`], the opponent [`ENEMY`] and the neutral player [`NEUTRAL`].

use tc_core::prelude::*;

/// Controlled player id used by fixtures.
pub const ME: PlayerId = 0;

/// Opponent player id used by fixtures.
pub const ENEMY: PlayerId = 1;

/// Neutral player id used by fixtures.
pub const NEUTRAL: PlayerId = 11;

/// Handshake for a small test map controlled by [`ME`].
#[must_use]
pub fn handshake() -> Handshake {
    Handshake {
        lag_frames: 2,
        map_data: Grid::from_cells(4, 4, vec![0; 16]),
        buildable_data: Grid::from_cells(1, 1, vec![true]),
        map_name: Some("fixture".to_string()),
        player_id: ME,
        neutral_id: NEUTRAL,
        replay: false,
        image_mode: ImageMode::None,
    }
}

/// Handshake with raw image mode enabled.
#[must_use]
pub fn handshake_with_image() -> Handshake {
    Handshake {
        image_mode: ImageMode::Raw,
        ..handshake()
    }
}

/// Unit with full health for its id.
#[must_use]
pub fn unit(id: UnitId, player: PlayerId, unit_type: UnitType) -> Unit {
    Unit {
        health: 40,
        max_health: 40,
        x: id * 4,
        y: player * 4,
        ..Unit::new(id, player, unit_type)
    }
}

/// Marine owned by `player`.
#[must_use]
pub fn marine(id: UnitId, player: PlayerId) -> Unit {
    unit(id, player, UnitType::TERRAN_MARINE)
}

/// Delta frame carrying `units`.
#[must_use]
pub fn delta(units: Vec<Unit>, frame: i32) -> Message {
    Message::Frame(FrameUpdate {
        payload: Some(FramePayload::Delta(Frame::with_units(units))),
        frame_from_bwapi: frame,
        ..FrameUpdate::default()
    })
}

/// Snapshot frame carrying `units`.
#[must_use]
pub fn snapshot(units: Vec<Unit>, frame: i32) -> Message {
    Message::Frame(FrameUpdate {
        payload: Some(FramePayload::Snapshot(Frame::with_units(units))),
        frame_from_bwapi: frame,
        ..FrameUpdate::default()
    })
}

/// Frame carrying only a death list.
#[must_use]
pub fn deaths(ids: Vec<UnitId>, frame: i32) -> Message {
    Message::Frame(FrameUpdate {
        deaths: ids,
        frame_from_bwapi: frame,
        ..FrameUpdate::default()
    })
}

/// Delta frame carrying `units` and reporting `dead` in the same update.
#[must_use]
pub fn delta_with_deaths(units: Vec<Unit>, dead: Vec<UnitId>, frame: i32) -> Message {
    Message::Frame(FrameUpdate {
        payload: Some(FramePayload::Delta(Frame::with_units(units))),
        deaths: dead,
        frame_from_bwapi: frame,
        ..FrameUpdate::default()
    })
}

/// Valid image payload of the given screen size.
#[must_use]
pub fn image_payload(width: u32, height: u32) -> ImagePayload {
    let pixels = (width as usize) * (height as usize);
    ImagePayload {
        screen_position: [32, 64],
        visibility: Grid::from_cells(4, 4, vec![2; 16]).unwrap_or_default(),
        image: RgbImage {
            width,
            height,
            data: vec![128; 3 * pixels],
        },
    }
}

/// Micro-battle state considering marines, after the fixture handshake.
#[must_use]
pub fn micro_marine_state() -> State {
    let mut state = State::new(StateConfig::micro([UnitType::TERRAN_MARINE]));
    state.update(Message::Handshake(handshake()));
    state
}
