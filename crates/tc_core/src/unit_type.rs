//! Unit type identity.
//!
//! The engine reports unit types as raw numeric ids. [`UnitType`] wraps the
//! id and resolves it against a static registry of known Brood War types.
//! Ids missing from the registry (map revealers, turret sub-units, spell
//! placeholders) are treated as unknown and hidden from the per-player view.
//!
//! # Example
//!
//! ```
//! use tc_core::unit_type::UnitType;
//!
//! let marine: UnitType = "Terran_Marine".parse().unwrap();
//! assert_eq!(marine, UnitType::TERRAN_MARINE);
//! assert!(marine.is_known());
//! assert!(!UnitType::new(101).is_known());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StateError;

/// Numeric unit type identifier as reported by the game engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UnitType(i32);

impl UnitType {
    /// Terran marine.
    pub const TERRAN_MARINE: Self = Self(0);
    /// Terran vulture.
    pub const TERRAN_VULTURE: Self = Self(2);
    /// Terran SCV.
    pub const TERRAN_SCV: Self = Self(7);
    /// Terran wraith.
    pub const TERRAN_WRAITH: Self = Self(8);
    /// Terran medic.
    pub const TERRAN_MEDIC: Self = Self(34);
    /// Zerg zergling.
    pub const ZERG_ZERGLING: Self = Self(37);
    /// Zerg hydralisk.
    pub const ZERG_HYDRALISK: Self = Self(38);
    /// Zerg mutalisk.
    pub const ZERG_MUTALISK: Self = Self(43);
    /// Protoss zealot.
    pub const PROTOSS_ZEALOT: Self = Self(65);
    /// Protoss dragoon.
    pub const PROTOSS_DRAGOON: Self = Self(66);
    /// Map revealer placed by scenario triggers. Not a known type.
    pub const SPECIAL_MAP_REVEALER: Self = Self(101);
    /// Mineral field.
    pub const RESOURCE_MINERAL_FIELD: Self = Self(176);

    /// Wrap a raw type id.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Raw numeric id.
    #[must_use]
    pub const fn id(self) -> i32 {
        self.0
    }

    /// Whether the id names a type in the registry.
    #[must_use]
    pub fn is_known(self) -> bool {
        KNOWN_UNIT_TYPES
            .binary_search_by_key(&self.0, |&(id, _)| id)
            .is_ok()
    }

    /// Registry name, if known.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        KNOWN_UNIT_TYPES
            .binary_search_by_key(&self.0, |&(id, _)| id)
            .ok()
            .map(|idx| KNOWN_UNIT_TYPES[idx].1)
    }

    /// Look up a known type by name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        KNOWN_UNIT_TYPES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|&(id, _)| Self(id))
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Unknown({})", self.0),
        }
    }
}

impl From<UnitType> for i32 {
    fn from(value: UnitType) -> Self {
        value.0
    }
}

impl FromStr for UnitType {
    type Err = StateError;

    /// Accepts a registry name or a numeric id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<i32>() {
            return Ok(Self(id));
        }
        Self::from_name(s).ok_or_else(|| StateError::UnknownUnitType(s.to_string()))
    }
}

/// Text formats may name types either way.
#[derive(Deserialize)]
#[serde(untagged)]
enum UnitTypeRepr {
    Id(i32),
    Name(String),
}

impl<'de> Deserialize<'de> for UnitType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Binary formats cannot drive an untagged enum.
        if !deserializer.is_human_readable() {
            return i32::deserialize(deserializer).map(Self);
        }
        match UnitTypeRepr::deserialize(deserializer)? {
            UnitTypeRepr::Id(id) => Ok(Self(id)),
            UnitTypeRepr::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Known unit types, sorted by id.
const KNOWN_UNIT_TYPES: &[(i32, &str)] = &[
    (0, "Terran_Marine"),
    (1, "Terran_Ghost"),
    (2, "Terran_Vulture"),
    (3, "Terran_Goliath"),
    (5, "Terran_Siege_Tank_Tank_Mode"),
    (7, "Terran_SCV"),
    (8, "Terran_Wraith"),
    (9, "Terran_Science_Vessel"),
    (11, "Terran_Dropship"),
    (12, "Terran_Battlecruiser"),
    (13, "Terran_Vulture_Spider_Mine"),
    (14, "Terran_Nuclear_Missile"),
    (15, "Terran_Civilian"),
    (30, "Terran_Siege_Tank_Siege_Mode"),
    (32, "Terran_Firebat"),
    (34, "Terran_Medic"),
    (35, "Zerg_Larva"),
    (36, "Zerg_Egg"),
    (37, "Zerg_Zergling"),
    (38, "Zerg_Hydralisk"),
    (39, "Zerg_Ultralisk"),
    (40, "Zerg_Broodling"),
    (41, "Zerg_Drone"),
    (42, "Zerg_Overlord"),
    (43, "Zerg_Mutalisk"),
    (44, "Zerg_Guardian"),
    (45, "Zerg_Queen"),
    (46, "Zerg_Defiler"),
    (47, "Zerg_Scourge"),
    (50, "Zerg_Infested_Terran"),
    (58, "Terran_Valkyrie"),
    (59, "Zerg_Cocoon"),
    (60, "Protoss_Corsair"),
    (61, "Protoss_Dark_Templar"),
    (62, "Zerg_Devourer"),
    (63, "Protoss_Dark_Archon"),
    (64, "Protoss_Probe"),
    (65, "Protoss_Zealot"),
    (66, "Protoss_Dragoon"),
    (67, "Protoss_High_Templar"),
    (68, "Protoss_Archon"),
    (69, "Protoss_Shuttle"),
    (70, "Protoss_Scout"),
    (71, "Protoss_Arbiter"),
    (72, "Protoss_Carrier"),
    (73, "Protoss_Interceptor"),
    (83, "Protoss_Reaver"),
    (84, "Protoss_Observer"),
    (85, "Protoss_Scarab"),
    (89, "Critter_Rhynadon"),
    (90, "Critter_Bengalaas"),
    (93, "Critter_Scantid"),
    (94, "Critter_Kakaru"),
    (95, "Critter_Ragnasaur"),
    (96, "Critter_Ursadon"),
    (97, "Zerg_Lurker_Egg"),
    (103, "Zerg_Lurker"),
    (106, "Terran_Command_Center"),
    (107, "Terran_Comsat_Station"),
    (108, "Terran_Nuclear_Silo"),
    (109, "Terran_Supply_Depot"),
    (110, "Terran_Refinery"),
    (111, "Terran_Barracks"),
    (112, "Terran_Academy"),
    (113, "Terran_Factory"),
    (114, "Terran_Starport"),
    (115, "Terran_Control_Tower"),
    (116, "Terran_Science_Facility"),
    (117, "Terran_Covert_Ops"),
    (118, "Terran_Physics_Lab"),
    (120, "Terran_Machine_Shop"),
    (122, "Terran_Engineering_Bay"),
    (123, "Terran_Armory"),
    (124, "Terran_Missile_Turret"),
    (125, "Terran_Bunker"),
    (130, "Zerg_Infested_Command_Center"),
    (131, "Zerg_Hatchery"),
    (132, "Zerg_Lair"),
    (133, "Zerg_Hive"),
    (134, "Zerg_Nydus_Canal"),
    (135, "Zerg_Hydralisk_Den"),
    (136, "Zerg_Defiler_Mound"),
    (137, "Zerg_Greater_Spire"),
    (138, "Zerg_Queens_Nest"),
    (139, "Zerg_Evolution_Chamber"),
    (140, "Zerg_Ultralisk_Cavern"),
    (141, "Zerg_Spire"),
    (142, "Zerg_Spawning_Pool"),
    (143, "Zerg_Creep_Colony"),
    (144, "Zerg_Spore_Colony"),
    (146, "Zerg_Sunken_Colony"),
    (149, "Zerg_Extractor"),
    (154, "Protoss_Nexus"),
    (155, "Protoss_Robotics_Facility"),
    (156, "Protoss_Pylon"),
    (157, "Protoss_Assimilator"),
    (159, "Protoss_Observatory"),
    (160, "Protoss_Gateway"),
    (162, "Protoss_Photon_Cannon"),
    (163, "Protoss_Citadel_of_Adun"),
    (164, "Protoss_Cybernetics_Core"),
    (165, "Protoss_Templar_Archives"),
    (166, "Protoss_Forge"),
    (167, "Protoss_Stargate"),
    (169, "Protoss_Fleet_Beacon"),
    (170, "Protoss_Arbiter_Tribunal"),
    (171, "Protoss_Robotics_Support_Bay"),
    (172, "Protoss_Shield_Battery"),
    (176, "Resource_Mineral_Field"),
    (177, "Resource_Mineral_Field_Type_2"),
    (178, "Resource_Mineral_Field_Type_3"),
    (188, "Resource_Vespene_Geyser"),
];
