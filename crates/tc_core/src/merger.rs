//! Frame merging.
//!
//! Folds an incoming [`FramePayload`] into the resident frame. Snapshots
//! replace the unit set wholesale; deltas insert or replace only the units
//! they carry, so a unit that did not change keeps its last record.
//!
//! Dead units are not removed here. A unit reported dead stays in the
//! resident frame as a ghost for the merge that reported its death, which
//! lets consumers see its final record even when the engine skipped the
//! ticks around the death. [`prune_ghosts`] drops those records at the start
//! of the following merge.

use std::collections::BTreeSet;

use crate::frame::{Frame, Unit, UnitId};
use crate::message::FramePayload;
use crate::tracker::AliveTracker;

/// What a merge touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Ids of every unit carried by the payload.
    pub incoming: BTreeSet<UnitId>,
    /// Whether the payload was a full snapshot.
    pub snapshot: bool,
    /// Malformed unit records that were skipped.
    pub skipped: usize,
}

/// Drop unit records that are no longer alive.
///
/// Returns the number of records removed.
pub fn prune_ghosts(resident: &mut Frame, tracker: &AliveTracker) -> usize {
    let before = resident.units.len();
    resident.units.retain(|id, _| tracker.is_alive(*id));
    before - resident.units.len()
}

/// Fold `payload` into `resident`.
pub fn merge_payload(resident: &mut Frame, payload: FramePayload) -> MergeOutcome {
    match payload {
        FramePayload::Snapshot(incoming) => {
            let mut outcome = MergeOutcome {
                snapshot: true,
                ..MergeOutcome::default()
            };
            let Frame {
                units,
                resources,
                bullets,
                actions,
                reward,
                is_terminal,
                width,
                height,
            } = incoming;
            resident.units.clear();
            insert_units(resident, units.into_values(), &mut outcome);
            resident.resources = resources;
            resident.bullets = bullets;
            resident.actions = actions;
            resident.reward = reward;
            resident.is_terminal = is_terminal;
            resident.width = width;
            resident.height = height;
            outcome
        }
        FramePayload::Delta(incoming) => {
            let mut outcome = MergeOutcome::default();
            let Frame {
                units,
                resources,
                bullets,
                actions,
                reward,
                is_terminal,
                width,
                height,
            } = incoming;
            insert_units(resident, units.into_values(), &mut outcome);
            resident.resources.extend(resources);
            resident.actions.extend(actions);
            resident.bullets = bullets;
            resident.reward = reward;
            resident.is_terminal = is_terminal;
            if width > 0 && height > 0 {
                resident.width = width;
                resident.height = height;
            }
            outcome
        }
    }
}

fn insert_units(
    resident: &mut Frame,
    units: impl Iterator<Item = Unit>,
    outcome: &mut MergeOutcome,
) {
    for unit in units {
        if unit.id < 0 {
            tracing::warn!(unit_id = unit.id, "Skipping unit record with invalid id");
            outcome.skipped += 1;
            continue;
        }
        outcome.incoming.insert(unit.id);
        resident.units.insert(unit.id, unit);
    }
}
