//! Enemy instance state and visibility.

use serde::{Deserialize, Serialize};

use crate::character::HitPoints;

/// How an enemy relates to the party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Openly hostile.
    Hostile,
    /// Concealed (mimics, ambushers) until revealed.
    Hidden,
}

/// Whether an enemy participates in the encounter yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyStatus {
    /// Active in the encounter.
    Active,
    /// Not yet revealed; excluded from player-facing enumeration.
    Hidden,
}

/// One enemy instance in an encounter.
///
/// The instance `id` is unique even when several identical monsters share a
/// type name; players refer to those through display names with ordinals
/// ("Goblin 2") computed by the target resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyState {
    /// Unique instance identifier.
    pub id: String,
    /// Type name shown to the player ("Goblin").
    pub name: String,
    /// Hit points. `None` means unknown; liveness checks fail open and
    /// treat the enemy as alive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_points: Option<HitPoints>,
    /// Armor class, when the source data supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armor_class: Option<i32>,
    /// Hostility/visibility disposition.
    pub disposition: Disposition,
    /// Participation status.
    pub status: EnemyStatus,
}

impl EnemyState {
    /// Create a visible hostile enemy at full health.
    pub fn hostile(id: impl Into<String>, name: impl Into<String>, max_hp: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hit_points: Some(HitPoints::full(max_hp)),
            armor_class: None,
            disposition: Disposition::Hostile,
            status: EnemyStatus::Active,
        }
    }

    /// Returns true while the enemy is concealed from the party.
    pub fn is_hidden(&self) -> bool {
        self.disposition == Disposition::Hidden || self.status == EnemyStatus::Hidden
    }

    /// Returns true unless well-formed hit points say otherwise.
    ///
    /// Unknown or malformed hit points (non-positive maximum) are assumed
    /// alive rather than silently filtering the enemy out.
    pub fn is_alive(&self) -> bool {
        match self.hit_points {
            None => true,
            Some(hp) if hp.max <= 0 => true,
            Some(hp) => hp.current > 0,
        }
    }
}
