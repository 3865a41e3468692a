//! Unit lifecycle tracking.
//!
//! [`AliveTracker`] is the single source of truth for "is unit X alive and
//! who owns it". It keeps two maps from unit id to owning player:
//!
//! - the alive map, covering every unit known to be alive after the latest
//!   merge, regardless of type;
//! - the considered map, restricted to a configured set of unit types. When
//!   that set is empty the considered map is invalid and reads fail with
//!   [`StateError::ConsideredTypesEmpty`].
//!
//! Both maps are updated incrementally from the ids carried by each merge
//! and the death list, never by rescanning history.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, StateError};
use crate::frame::{Frame, PlayerId, UnitId};
use crate::setup::Setup;
use crate::tags::UpdateTag;
use crate::unit_type::UnitType;

/// Map from unit id to owning player.
pub type AliveUnits = BTreeMap<UnitId, PlayerId>;

/// Unit counts split by side, used for battle detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SideCounts {
    /// Units owned by the controlled player.
    pub mine: usize,
    /// Units owned by any other non-neutral player.
    pub enemy: usize,
}

/// Alive-unit bookkeeping across merges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliveTracker {
    alive: AliveUnits,
    considered: AliveUnits,
    considered_valid: bool,
    /// Deaths reported after a battle ended within the same update.
    deferred: Vec<UnitId>,
}

impl AliveTracker {
    /// Apply one merge.
    ///
    /// `incoming` holds the ids carried by the merged payload and `deaths`
    /// the death list reported with it. A unit in both is treated as having
    /// died within the skipped interval: it is reported destroyed and never
    /// enters the alive map.
    pub fn track(
        &mut self,
        frame: &Frame,
        incoming: &BTreeSet<UnitId>,
        deaths: &[UnitId],
        considered_types: &BTreeSet<UnitType>,
        upd: &mut Vec<UpdateTag>,
    ) {
        self.admit(frame, incoming, deaths, upd);
        let mut seen = BTreeSet::new();
        for &id in deaths {
            if seen.insert(id) {
                self.apply_death(id, incoming, upd);
            }
        }
        self.settle(frame, considered_types, upd);
    }

    /// Insert every incoming unit not reported dead in the same update.
    pub fn admit(
        &mut self,
        frame: &Frame,
        incoming: &BTreeSet<UnitId>,
        deaths: &[UnitId],
        upd: &mut Vec<UpdateTag>,
    ) {
        let dead: BTreeSet<UnitId> = deaths.iter().copied().collect();

        for &id in incoming.difference(&dead) {
            let Some(unit) = frame.unit(id) else {
                continue;
            };
            match self.alive.insert(id, unit.player_id) {
                None => upd.push(UpdateTag::UnitCreated(id)),
                Some(previous) if previous != unit.player_id => {
                    tracing::debug!(
                        unit_id = id,
                        from = previous,
                        to = unit.player_id,
                        "Unit changed owner"
                    );
                }
                Some(_) => {}
            }
        }
    }

    /// Remove one dead unit from both maps.
    ///
    /// Reports it destroyed when it was alive or carried by this update.
    /// Repeated deaths are no-ops.
    pub fn apply_death(
        &mut self,
        id: UnitId,
        incoming: &BTreeSet<UnitId>,
        upd: &mut Vec<UpdateTag>,
    ) {
        let was_alive = self.alive.remove(&id).is_some();
        self.considered.remove(&id);
        if was_alive || incoming.contains(&id) {
            upd.push(UpdateTag::UnitDestroyed(id));
        }
    }

    /// Drop ids missing from `frame` and rebuild the considered map.
    pub fn settle(
        &mut self,
        frame: &Frame,
        considered_types: &BTreeSet<UnitType>,
        upd: &mut Vec<UpdateTag>,
    ) {
        // Snapshots drop units that are no longer reported at all.
        self.alive.retain(|id, _| frame.units.contains_key(id));
        upd.push(UpdateTag::AliveUnits);

        self.refilter(frame, considered_types, upd);
    }

    /// Hold back deaths until the next update.
    ///
    /// Units carried by this update that were never admitted are reported
    /// destroyed right away; only alive units are held.
    pub fn defer_deaths(
        &mut self,
        deaths: &[UnitId],
        incoming: &BTreeSet<UnitId>,
        upd: &mut Vec<UpdateTag>,
    ) {
        for &id in deaths {
            if self.alive.contains_key(&id) {
                self.deferred.push(id);
            } else if incoming.contains(&id) {
                upd.push(UpdateTag::UnitDestroyed(id));
            }
        }
    }

    /// Apply deaths held back by the previous update.
    ///
    /// Returns the number of units removed.
    pub fn apply_deferred(&mut self, upd: &mut Vec<UpdateTag>) -> usize {
        let deferred = std::mem::take(&mut self.deferred);
        let before = self.alive.len();
        for id in deferred {
            self.apply_death(id, &BTreeSet::new(), upd);
        }
        before - self.alive.len()
    }

    /// Deaths currently held back.
    #[must_use]
    pub fn deferred(&self) -> &[UnitId] {
        &self.deferred
    }

    /// Rebuild the considered map from the alive map.
    pub fn refilter(
        &mut self,
        frame: &Frame,
        considered_types: &BTreeSet<UnitType>,
        upd: &mut Vec<UpdateTag>,
    ) {
        self.considered.clear();
        if considered_types.is_empty() {
            self.considered_valid = false;
            return;
        }
        self.considered = self
            .alive
            .iter()
            .filter(|(id, _)| {
                frame
                    .unit(**id)
                    .is_some_and(|u| considered_types.contains(&u.unit_type))
            })
            .map(|(&id, &player)| (id, player))
            .collect();
        self.considered_valid = true;
        upd.push(UpdateTag::AliveUnitsConsidered);
    }

    /// Every unit known to be alive.
    #[must_use]
    pub fn alive(&self) -> &AliveUnits {
        &self.alive
    }

    /// Alive units of the considered types.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::ConsideredTypesEmpty`] when no types are
    /// considered; the map carries no meaning in that case.
    pub fn considered(&self) -> Result<&AliveUnits> {
        if self.considered_valid {
            Ok(&self.considered)
        } else {
            Err(StateError::ConsideredTypesEmpty)
        }
    }

    /// Whether `id` is alive.
    #[must_use]
    pub fn is_alive(&self, id: UnitId) -> bool {
        self.alive.contains_key(&id)
    }

    /// Owner of an alive unit.
    #[must_use]
    pub fn owner(&self, id: UnitId) -> Option<PlayerId> {
        self.alive.get(&id).copied()
    }

    /// Count considered units per side, or `None` when the considered map
    /// is invalid.
    #[must_use]
    pub fn considered_sides(&self, setup: &Setup) -> Option<SideCounts> {
        let considered = self.considered().ok()?;
        let mut counts = SideCounts::default();
        for &player in considered.values() {
            if player == setup.player_id {
                counts.mine += 1;
            } else if player != setup.neutral_id {
                counts.enemy += 1;
            }
        }
        Some(counts)
    }
}
