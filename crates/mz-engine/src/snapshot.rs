//! Serialized encounter snapshots.
//!
//! A snapshot captures everything a session needs to resume mid-encounter:
//! rosters, initiative order, turn position, phase, and recent narration.
//! Collaborators and configuration are not part of the snapshot; the caller
//! supplies them again on restore.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mz_core::{CharacterState, Combatant, EnemyState};

use crate::session::Phase;

/// A persistable point-in-time view of one encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterSnapshot {
    /// Session identifier, preserved across save and restore.
    pub id: Uuid,
    /// Party roster.
    pub party: Vec<CharacterState>,
    /// Enemy roster, hidden enemies included.
    pub enemies: Vec<EnemyState>,
    /// Initiative order.
    pub order: Vec<Combatant>,
    /// Turn position. Signed so snapshots written by other tooling round-trip;
    /// restore clamps out-of-range values.
    pub turn_index: i64,
    /// Phase at save time.
    pub phase: Phase,
    /// Whether an encounter was in progress.
    pub in_combat: bool,
    /// Doors opened during exploration, keyed `location:direction`.
    #[serde(default)]
    pub open_doors: Vec<String>,
    /// Recent narration lines, oldest first.
    #[serde(default)]
    pub narration: Vec<String>,
    /// Location description, when one was set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
}

impl EncounterSnapshot {
    /// The turn index as a valid position in this snapshot's order.
    ///
    /// Negative and out-of-range values reset to zero. An empty order yields
    /// zero.
    pub fn clamped_turn_index(&self) -> usize {
        let index = usize::try_from(self.turn_index).unwrap_or(0);
        if index >= self.order.len() { 0 } else { index }
    }
}
