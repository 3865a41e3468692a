//! # TC Core
//!
//! Incremental world-state engine for an external bot or learning agent.
//!
//! The game engine streams handshake, frame and end-of-game messages. This
//! crate folds them into a single consistent [`State`](state::State):
//!
//! - Frames may be deltas and may skip ticks; they are merged into one
//!   resident frame.
//! - Unit identity and ownership are tracked across merges, with a second
//!   view restricted to configured unit types.
//! - In micro-battle scenarios, battle start and end are derived from the
//!   alive units of each side.
//!
//! This crate contains **only** deterministic state logic:
//! - No IO on the update path
//! - No wire-level decoding
//! - Ordered maps everywhere, so iteration order is stable
//!
//! ## Crate Structure
//!
//! - [`state`] - Session state and update dispatch
//! - [`merger`] - Frame merging and ghost pruning
//! - [`tracker`] - Alive-unit bookkeeping
//! - [`battle`] - Micro-battle boundary detection
//! - [`visual`] - Screen and visibility extraction
//! - [`message`] - Typed decoder output

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod battle;
pub mod config;
pub mod error;
pub mod frame;
pub mod grid;
pub mod merger;
pub mod message;
pub mod setup;
pub mod state;
pub mod tags;
pub mod tracker;
pub mod unit_type;
pub mod visual;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battle::BattleState;
    pub use crate::config::StateConfig;
    pub use crate::error::{Result, StateError};
    pub use crate::frame::{Action, Bullet, Frame, Order, PlayerId, Resources, Unit, UnitId};
    pub use crate::grid::{Grid, UNKNOWN_TERRAIN};
    pub use crate::message::{
        EndGame, FramePayload, FrameUpdate, Handshake, ImageMode, ImagePayload, Message, RgbImage,
    };
    pub use crate::setup::Setup;
    pub use crate::state::State;
    pub use crate::tags::UpdateTag;
    pub use crate::tracker::{AliveTracker, AliveUnits};
    pub use crate::unit_type::UnitType;
    pub use crate::visual::VisualState;
}
