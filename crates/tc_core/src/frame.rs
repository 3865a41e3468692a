//! Per-tick world records: units, resources, bullets and actions.
//!
//! A [`Frame`] is a plain value. The state engine keeps exactly one resident
//! frame and folds incoming frames into it (see [`crate::merger`]).
//!
//! Units are keyed by id so lookups and iteration are ordered and
//! deterministic. On the wire (JSON, RON, bincode) the unit map is written as
//! a plain list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StateError};
use crate::unit_type::UnitType;

/// Unit identifier assigned by the game engine.
pub type UnitId = i32;

/// Player identifier assigned by the game engine.
pub type PlayerId = i32;

/// A single queued unit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    /// Frame on which the order was first seen.
    pub first_frame: i32,
    /// Engine order type id.
    pub order_type: i32,
    /// Target unit, or -1.
    pub target_id: i32,
    /// Target position x (walk tiles), or -1.
    pub target_x: i32,
    /// Target position y (walk tiles), or -1.
    pub target_y: i32,
}

/// Full record for one unit as last reported by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Unit id.
    pub id: UnitId,
    /// Owning player.
    pub player_id: PlayerId,
    /// Unit type.
    pub unit_type: UnitType,
    /// Position x in walk tiles.
    #[serde(default)]
    pub x: i32,
    /// Position y in walk tiles.
    #[serde(default)]
    pub y: i32,
    /// Position x in pixels.
    #[serde(default)]
    pub pixel_x: i32,
    /// Position y in pixels.
    #[serde(default)]
    pub pixel_y: i32,
    /// Current hit points.
    #[serde(default)]
    pub health: i32,
    /// Maximum hit points.
    #[serde(default)]
    pub max_health: i32,
    /// Current shield points.
    #[serde(default)]
    pub shield: i32,
    /// Maximum shield points.
    #[serde(default)]
    pub max_shield: i32,
    /// Current energy.
    #[serde(default)]
    pub energy: i32,
    /// Ground weapon cooldown in frames.
    #[serde(default)]
    pub ground_cd: i32,
    /// Air weapon cooldown in frames.
    #[serde(default)]
    pub air_cd: i32,
    /// Engine status flags bitmask.
    #[serde(default)]
    pub flags: u64,
    /// Bitmask of players that can see this unit.
    #[serde(default)]
    pub visible: i32,
    /// Armor value.
    #[serde(default)]
    pub armor: i32,
    /// Velocity x.
    #[serde(default)]
    pub velocity_x: f64,
    /// Velocity y.
    #[serde(default)]
    pub velocity_y: f64,
    /// Queued orders, oldest first.
    #[serde(default)]
    pub orders: Vec<Order>,
    /// Remaining resources (mineral fields, geysers).
    #[serde(default)]
    pub resources: i32,
}

impl Unit {
    /// Create a unit record with zeroed stats.
    #[must_use]
    pub fn new(id: UnitId, player_id: PlayerId, unit_type: UnitType) -> Self {
        Self {
            id,
            player_id,
            unit_type,
            x: 0,
            y: 0,
            pixel_x: 0,
            pixel_y: 0,
            health: 0,
            max_health: 0,
            shield: 0,
            max_shield: 0,
            energy: 0,
            ground_cd: 0,
            air_cd: 0,
            flags: 0,
            visible: 0,
            armor: 0,
            velocity_x: 0.0,
            velocity_y: 0.0,
            orders: Vec::new(),
            resources: 0,
        }
    }

    /// Whether `player` can currently see this unit.
    #[must_use]
    pub fn is_visible_to(&self, player: PlayerId) -> bool {
        (0..32).contains(&player) && self.visible & (1 << player) != 0
    }
}

/// Per-player economy and research state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Resources {
    /// Minerals.
    pub ore: i32,
    /// Vespene gas.
    pub gas: i32,
    /// Supply used.
    pub used_psi: i32,
    /// Supply available.
    pub total_psi: i32,
    /// Upgrade bitmask.
    pub upgrades: u64,
    /// Upgrade level bitmask.
    pub upgrades_level: u64,
    /// Researched tech bitmask.
    pub techs: u64,
}

/// A projectile in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Bullet {
    /// Engine bullet type id.
    pub bullet_type: i32,
    /// Position x in walk tiles.
    pub x: i32,
    /// Position y in walk tiles.
    pub y: i32,
}

/// A player action recorded by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Action {
    /// Frame the action was issued on.
    pub frame: i32,
    /// Raw action payload.
    pub action: Vec<i32>,
}

/// One tick's worth of world data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Frame {
    /// Units keyed by id.
    #[serde(with = "unit_list")]
    pub units: BTreeMap<UnitId, Unit>,
    /// Resources keyed by player.
    #[serde(with = "player_list")]
    pub resources: BTreeMap<PlayerId, Resources>,
    /// Projectiles in flight.
    pub bullets: Vec<Bullet>,
    /// Actions keyed by player.
    #[serde(with = "player_list")]
    pub actions: BTreeMap<PlayerId, Vec<Action>>,
    /// Scenario reward, if the engine reports one.
    pub reward: i32,
    /// Whether the engine flagged this frame as terminal.
    pub is_terminal: bool,
    /// Map width in walk tiles.
    pub width: i32,
    /// Map height in walk tiles.
    pub height: i32,
}

impl Frame {
    /// Create an empty frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a frame holding the given units.
    #[must_use]
    pub fn with_units(units: impl IntoIterator<Item = Unit>) -> Self {
        Self {
            units: units.into_iter().map(|u| (u.id, u)).collect(),
            ..Self::default()
        }
    }

    /// Whether the frame carries no units, resources, bullets or actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
            && self.resources.is_empty()
            && self.bullets.is_empty()
            && self.actions.is_empty()
    }

    /// Unit record by id.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Units owned by `player`, in id order.
    pub fn units_of(&self, player: PlayerId) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(move |u| u.player_id == player)
    }

    /// Serialize the frame with bincode.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| StateError::Snapshot(format!("Failed to serialize frame: {e}")))
    }

    /// Deserialize a frame written by [`Frame::to_bytes`].
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid encoded frame.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| StateError::Snapshot(format!("Failed to deserialize frame: {e}")))
    }
}

/// Serde adapter writing the unit map as a list of units.
mod unit_list {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use super::{Unit, UnitId};

    pub fn serialize<S>(units: &BTreeMap<UnitId, Unit>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(units.values())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<UnitId, Unit>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let units = Vec::<Unit>::deserialize(deserializer)?;
        Ok(units.into_iter().map(|u| (u.id, u)).collect())
    }
}

/// Serde adapter writing a per-player map as `[player, value]` pairs.
///
/// Integer map keys become strings in JSON and cannot be read back through
/// an internally tagged enum such as [`Message`](crate::message::Message).
mod player_list {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::PlayerId;

    pub fn serialize<S, V>(map: &BTreeMap<PlayerId, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<BTreeMap<PlayerId, V>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        let entries = Vec::<(PlayerId, V)>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
