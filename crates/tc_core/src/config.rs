//! Session configuration.
//!
//! Configuration is fixed at construction and survives [`State::reset`]. It
//! can be written in RON, with unit types given by id or by name:
//!
//! ```
//! use tc_core::config::StateConfig;
//! use tc_core::unit_type::UnitType;
//!
//! let config = StateConfig::from_ron(
//!     r#"(micro_battles: true, only_consider_types: ["Terran_Marine", 37])"#,
//! )
//! .unwrap();
//! assert!(config.micro_battles);
//! assert!(config.only_consider_types.contains(&UnitType::ZERG_ZERGLING));
//! ```
//!
//! [`State::reset`]: crate::state::State::reset

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StateError};
use crate::unit_type::UnitType;

/// Construction-time options for a [`State`](crate::state::State).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Detect micro-battle boundaries.
    pub micro_battles: bool,
    /// Unit types used for filtered alive tracking and battle detection.
    /// Empty means full-game mode.
    pub only_consider_types: BTreeSet<UnitType>,
}

impl StateConfig {
    /// Micro-battle configuration considering `types`.
    #[must_use]
    pub fn micro(types: impl IntoIterator<Item = UnitType>) -> Self {
        Self {
            micro_battles: true,
            only_consider_types: types.into_iter().collect(),
        }
    }

    /// Parse configuration from RON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration.
    pub fn from_ron(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| StateError::ConfigParse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load configuration from a RON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_ron<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| StateError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        ron::from_str(&text).map_err(|e| StateError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Whether micro-battle detection can run with this configuration.
    #[must_use]
    pub fn detects_battles(&self) -> bool {
        self.micro_battles && !self.only_consider_types.is_empty()
    }
}
