//! The session state record.
//!
//! [`State`] owns everything the engine knows about the current session and
//! is mutated only through [`State::update`]. Each update runs to completion
//! before returning:
//!
//! 1. dispatch on the message kind (handshake, frame, end of game);
//! 2. for frames, apply deaths held back by the previous update, prune last
//!    merge's ghosts, merge the payload, record the death list and scalars,
//!    and extract the image if enabled;
//! 3. refresh the alive-unit maps;
//! 4. evaluate micro-battle boundaries;
//! 5. rebuild the units-by-player view.
//!
//! During a micro battle the death list is applied one death at a time, in
//! the order reported, with the boundary check after each. Once the battle
//! ends the remaining deaths are held back until the next update, so the
//! alive maps and the units view show the units alive when the battle
//! ended. The engine may skip frames, so that moment can lie inside the
//! interval covered by a single update.
//!
//! The returned [`UpdateTag`]s name every field written and every lifecycle
//! event observed along the way.
//!
//! # Example
//!
//! ```
//! use tc_core::prelude::*;
//!
//! let mut state = State::new(StateConfig::micro([UnitType::TERRAN_MARINE]));
//! state.update(Message::Handshake(Handshake {
//!     lag_frames: 2,
//!     map_data: None,
//!     buildable_data: None,
//!     map_name: Some("micro".into()),
//!     player_id: 0,
//!     neutral_id: 11,
//!     replay: false,
//!     image_mode: ImageMode::None,
//! }));
//!
//! let tags = state.update(Message::Frame(FrameUpdate {
//!     payload: Some(FramePayload::Delta(Frame::with_units([
//!         Unit::new(1, 0, UnitType::TERRAN_MARINE),
//!         Unit::new(2, 1, UnitType::TERRAN_MARINE),
//!     ]))),
//!     frame_from_bwapi: 1,
//!     ..FrameUpdate::default()
//! }));
//! assert!(tags.contains(&UpdateTag::BattleStarted));
//!
//! let tags = state.update(Message::Frame(FrameUpdate {
//!     deaths: vec![2],
//!     frame_from_bwapi: 2,
//!     ..FrameUpdate::default()
//! }));
//! assert!(tags.contains(&UpdateTag::UnitDestroyed(2)));
//! assert!(state.battle_just_ended() && state.battle_won());
//! ```

use std::collections::{BTreeMap, BTreeSet};

use crate::battle::BattleState;
use crate::config::StateConfig;
use crate::error::Result;
use crate::frame::{Frame, PlayerId, Unit, UnitId};
use crate::grid::Grid;
use crate::merger::{self, MergeOutcome};
use crate::message::{EndGame, FrameUpdate, Handshake, ImageMode, Message};
use crate::setup::Setup;
use crate::tags::UpdateTag;
use crate::tracker::{AliveTracker, AliveUnits};
use crate::unit_type::UnitType;
use crate::visual::VisualState;

/// Consistent view of one game session.
#[derive(Debug, Clone)]
pub struct State {
    config: StateConfig,
    setup: Setup,
    has_setup: bool,

    frame: Frame,
    deaths: Vec<UnitId>,
    frame_from_bwapi: i32,
    battle_frame_count: i32,

    game_ended: bool,
    game_won: bool,

    battle: BattleState,
    visual: Option<VisualState>,

    tracker: AliveTracker,
    /// Alive units of known types, by owner. Every player with a unit record
    /// in the resident frame has an entry, possibly empty.
    units: BTreeMap<PlayerId, Vec<Unit>>,
}

impl Default for State {
    fn default() -> Self {
        Self::new(StateConfig::default())
    }
}

impl State {
    /// Create a state for a new session.
    #[must_use]
    pub fn new(config: StateConfig) -> Self {
        let battle = BattleState::new(config.detects_battles());
        Self {
            config,
            setup: Setup::default(),
            has_setup: false,
            frame: Frame::new(),
            deaths: Vec::new(),
            frame_from_bwapi: 0,
            battle_frame_count: 0,
            game_ended: false,
            game_won: false,
            battle,
            visual: None,
            tracker: AliveTracker::default(),
            units: BTreeMap::new(),
        }
    }

    // ========================================
    // Configuration
    // ========================================

    /// Whether micro-battle detection is enabled.
    #[must_use]
    pub const fn micro_battles(&self) -> bool {
        self.config.micro_battles
    }

    /// Unit types considered for filtered tracking and battle detection.
    #[must_use]
    pub const fn only_consider_types(&self) -> &BTreeSet<UnitType> {
        &self.config.only_consider_types
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &StateConfig {
        &self.config
    }

    /// Enable or disable micro-battle detection.
    ///
    /// Detection restarts from "waiting for restart".
    pub fn set_micro_battles(&mut self, micro_battles: bool) {
        self.config.micro_battles = micro_battles;
        self.battle.waiting_for_restart = self.config.detects_battles();
    }

    /// Replace the considered unit types and rebuild the filtered alive map.
    ///
    /// Detection restarts from "waiting for restart".
    pub fn set_only_consider_types(&mut self, types: BTreeSet<UnitType>) {
        self.config.only_consider_types = types;
        let mut upd = Vec::new();
        self.tracker
            .refilter(&self.frame, &self.config.only_consider_types, &mut upd);
        self.battle.waiting_for_restart = self.config.detects_battles();
    }

    // ========================================
    // Lifecycle
    // ========================================

    /// Clear all session data, keeping the configuration.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }

    /// Apply one decoded message and report what changed.
    ///
    /// Never fails: empty frames are no-ops, and soft failures such as a
    /// missing image are logged and skipped.
    pub fn update(&mut self, message: Message) -> Vec<UpdateTag> {
        match message {
            Message::Handshake(handshake) => self.update_handshake(handshake),
            Message::Frame(update) => self.update_frame(update),
            Message::EndGame(end) => self.update_end_game(end),
        }
    }

    /// Start a session. A handshake mid-session implicitly resets first.
    pub fn update_handshake(&mut self, handshake: Handshake) -> Vec<UpdateTag> {
        if self.has_setup {
            tracing::info!("Handshake received mid-session, resetting state");
        }
        self.reset();

        let mut upd = Vec::new();
        self.setup = Setup::from_handshake(handshake, &mut upd);
        self.has_setup = true;
        tracing::info!(
            map = %self.setup.map_name,
            player_id = self.setup.player_id,
            neutral_id = self.setup.neutral_id,
            replay = self.setup.replay,
            image_mode = ?self.setup.image_mode,
            "Session started"
        );
        upd
    }

    /// Merge one frame update.
    pub fn update_frame(&mut self, mut update: FrameUpdate) -> Vec<UpdateTag> {
        if update.is_empty() {
            tracing::debug!("Ignoring empty frame update");
            return Vec::new();
        }
        if !self.has_setup {
            tracing::warn!("Frame update received before handshake");
        }
        if self.game_ended {
            tracing::warn!(
                frame = update.frame_from_bwapi,
                "Frame update received after game end"
            );
        }

        let mut upd = Vec::new();
        self.battle.battle_just_ended = false;

        let released = self.tracker.apply_deferred(&mut upd);
        let pruned = merger::prune_ghosts(&mut self.frame, &self.tracker);
        let outcome = match update.payload.take() {
            Some(payload) => {
                let outcome = merger::merge_payload(&mut self.frame, payload);
                upd.push(UpdateTag::Frame);
                outcome
            }
            None => MergeOutcome::default(),
        };

        self.deaths = std::mem::take(&mut update.deaths);
        if !self.deaths.is_empty() {
            upd.push(UpdateTag::Deaths);
        }
        self.frame_from_bwapi = update.frame_from_bwapi;
        upd.push(UpdateTag::FrameFromBwapi);
        self.battle_frame_count = update.battle_frame_count;
        upd.push(UpdateTag::BattleFrameCount);

        if self.setup.image_mode.is_enabled() {
            if self.set_raw_image(&update) {
                upd.push(UpdateTag::Image);
            }
        } else if update.image.is_some() {
            tracing::debug!("Ignoring image data, image mode is off");
        }

        self.post_update(&outcome, &mut upd);

        tracing::debug!(
            frame = self.frame_from_bwapi,
            incoming = outcome.incoming.len(),
            snapshot = outcome.snapshot,
            skipped = outcome.skipped,
            deaths = self.deaths.len(),
            released,
            held = self.tracker.deferred().len(),
            pruned,
            events = upd.iter().filter(|t| t.is_event()).count(),
            alive = self.tracker.alive().len(),
            "Merged frame"
        );
        upd
    }

    /// Record the game outcome.
    pub fn update_end_game(&mut self, end: EndGame) -> Vec<UpdateTag> {
        if self.game_ended {
            tracing::warn!("Duplicate end-of-game message");
        }
        self.game_ended = true;
        self.game_won = end.won;
        tracing::info!(won = end.won, frame = self.frame_from_bwapi, "Game ended");
        vec![UpdateTag::GameEnded, UpdateTag::GameWon]
    }

    /// Decode image data for the current frame.
    ///
    /// Leaves the previous visual state untouched on failure.
    fn set_raw_image(&mut self, update: &FrameUpdate) -> bool {
        match VisualState::decode(update.image.as_ref()) {
            Ok(visual) => {
                self.visual = Some(visual);
                true
            }
            Err(e) => {
                tracing::warn!(frame = update.frame_from_bwapi, "Image extraction failed: {e}");
                false
            }
        }
    }

    fn post_update(&mut self, outcome: &MergeOutcome, upd: &mut Vec<UpdateTag>) {
        if self.tracks_battle_deaths() {
            self.track_battle_deaths(&outcome.incoming, upd);
        } else {
            self.track_alive_units(&outcome.incoming, upd);
            self.check_battle_finished(upd);
        }
        self.rebuild_units(upd);
    }

    /// Whether deaths must be applied one at a time: a micro battle is in
    /// progress and the considered map is valid.
    fn tracks_battle_deaths(&self) -> bool {
        self.config.detects_battles() && !self.battle.waiting_for_restart
    }

    fn track_alive_units(&mut self, incoming: &BTreeSet<UnitId>, upd: &mut Vec<UpdateTag>) {
        self.tracker.track(
            &self.frame,
            incoming,
            &self.deaths,
            &self.config.only_consider_types,
            upd,
        );
    }

    fn track_battle_deaths(&mut self, incoming: &BTreeSet<UnitId>, upd: &mut Vec<UpdateTag>) {
        self.tracker.admit(&self.frame, incoming, &self.deaths, upd);
        self.tracker
            .settle(&self.frame, &self.config.only_consider_types, upd);

        if self.deaths.is_empty() {
            self.check_battle_finished(upd);
            return;
        }

        let mut seen = BTreeSet::new();
        for (idx, &id) in self.deaths.iter().enumerate() {
            if !seen.insert(id) {
                continue;
            }
            self.tracker.apply_death(id, incoming, upd);
            if self.battle.check_finished(
                &self.tracker,
                &self.setup,
                self.frame_from_bwapi,
                upd,
            ) {
                let rest: Vec<UnitId> = self.deaths[idx + 1..]
                    .iter()
                    .copied()
                    .filter(|id| !seen.contains(id))
                    .collect();
                self.tracker.defer_deaths(&rest, incoming, upd);
                if !rest.is_empty() {
                    tracing::debug!(held = rest.len(), "Holding deaths reported after battle end");
                }
                return;
            }
        }
    }

    fn check_battle_finished(&mut self, upd: &mut Vec<UpdateTag>) -> bool {
        if !self.config.micro_battles {
            return false;
        }
        self.battle
            .check_finished(&self.tracker, &self.setup, self.frame_from_bwapi, upd)
    }

    fn rebuild_units(&mut self, upd: &mut Vec<UpdateTag>) {
        self.units.clear();
        for unit in self.frame.units.values() {
            let owned = self.units.entry(unit.player_id).or_default();
            if unit.unit_type.is_known() && self.tracker.is_alive(unit.id) {
                owned.push(unit.clone());
            }
        }
        upd.push(UpdateTag::Units);
    }

    // ========================================
    // Setup
    // ========================================

    /// Whether a handshake has been applied this session.
    #[must_use]
    pub const fn has_setup(&self) -> bool {
        self.has_setup
    }

    /// Static session setup.
    #[must_use]
    pub const fn setup(&self) -> &Setup {
        &self.setup
    }

    /// Frames between issuing an order and its execution.
    #[must_use]
    pub const fn lag_frames(&self) -> i32 {
        self.setup.lag_frames
    }

    /// Walk-tile terrain heights.
    #[must_use]
    pub const fn map_data(&self) -> &Grid<u8> {
        &self.setup.map_data
    }

    /// Build-tile buildability.
    #[must_use]
    pub const fn buildable_data(&self) -> &Grid<bool> {
        &self.setup.buildable_data
    }

    /// Current map name.
    #[must_use]
    pub fn map_name(&self) -> &str {
        &self.setup.map_name
    }

    /// Player controlled by this client.
    #[must_use]
    pub const fn player_id(&self) -> PlayerId {
        self.setup.player_id
    }

    /// Neutral player.
    #[must_use]
    pub const fn neutral_id(&self) -> PlayerId {
        self.setup.neutral_id
    }

    /// Whether the session is a replay.
    #[must_use]
    pub const fn is_replay(&self) -> bool {
        self.setup.replay
    }

    /// Visual observation mode.
    #[must_use]
    pub const fn image_mode(&self) -> ImageMode {
        self.setup.image_mode
    }

    // ========================================
    // Frame
    // ========================================

    /// Resident frame.
    ///
    /// After frame skipping this may still hold units reported dead in the
    /// latest update. Prefer [`State::units`] for gameplay decisions.
    #[must_use]
    pub const fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Resident frame serialized with bincode.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn frame_bytes(&self) -> Result<Vec<u8>> {
        self.frame.to_bytes()
    }

    /// Units reported dead in the latest frame update.
    #[must_use]
    pub fn deaths(&self) -> &[UnitId] {
        &self.deaths
    }

    /// Engine frame counter from the latest update.
    #[must_use]
    pub const fn frame_from_bwapi(&self) -> i32 {
        self.frame_from_bwapi
    }

    /// Frames elapsed in the current battle.
    #[must_use]
    pub const fn battle_frame_count(&self) -> i32 {
        self.battle_frame_count
    }

    // ========================================
    // Outcomes
    // ========================================

    /// Whether the game ended.
    #[must_use]
    pub const fn game_ended(&self) -> bool {
        self.game_ended
    }

    /// Whether the controlled player won the game.
    #[must_use]
    pub const fn game_won(&self) -> bool {
        self.game_won
    }

    /// Micro-battle flags. Only meaningful in micro-battle mode.
    #[must_use]
    pub const fn battle(&self) -> &BattleState {
        &self.battle
    }

    /// Whether the latest update ended a battle.
    #[must_use]
    pub const fn battle_just_ended(&self) -> bool {
        self.battle.battle_just_ended
    }

    /// Whether the controlled player won the last battle.
    #[must_use]
    pub const fn battle_won(&self) -> bool {
        self.battle.battle_won
    }

    /// Whether battle detection is waiting for both sides to field units.
    #[must_use]
    pub const fn waiting_for_restart(&self) -> bool {
        self.battle.waiting_for_restart
    }

    /// Engine frame at which the last battle ended, -1 if none has.
    #[must_use]
    pub const fn last_battle_ended(&self) -> i32 {
        self.battle.last_battle_ended
    }

    /// Visual observation from the latest frame with valid image data.
    #[must_use]
    pub const fn visual(&self) -> Option<&VisualState> {
        self.visual.as_ref()
    }

    // ========================================
    // Units
    // ========================================

    /// Every unit known to be alive, ignoring the type filter.
    #[must_use]
    pub fn alive_units(&self) -> &AliveUnits {
        self.tracker.alive()
    }

    /// Alive units of the considered types.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::ConsideredTypesEmpty`](crate::error::StateError::ConsideredTypesEmpty)
    /// when no types are considered.
    pub fn alive_units_considered(&self) -> Result<&AliveUnits> {
        self.tracker.considered()
    }

    /// Lifecycle tracker backing the alive maps.
    #[must_use]
    pub const fn tracker(&self) -> &AliveTracker {
        &self.tracker
    }

    /// Whether `id` is alive.
    #[must_use]
    pub fn is_alive(&self, id: UnitId) -> bool {
        self.tracker.is_alive(id)
    }

    /// Alive units of known types, by owner.
    #[must_use]
    pub const fn units(&self) -> &BTreeMap<PlayerId, Vec<Unit>> {
        &self.units
    }

    /// Alive units of known types owned by `player`.
    #[must_use]
    pub fn units_of(&self, player: PlayerId) -> &[Unit] {
        self.units.get(&player).map(Vec::as_slice).unwrap_or_default()
    }

    /// Alive units of the controlled player.
    #[must_use]
    pub fn my_units(&self) -> &[Unit] {
        self.units_of(self.setup.player_id)
    }

    /// Alive units of every non-neutral opponent.
    pub fn enemy_units(&self) -> impl Iterator<Item = &Unit> {
        self.units
            .iter()
            .filter(|(player, _)| self.setup.is_enemy(**player))
            .flat_map(|(_, units)| units.iter())
    }
}
