//! HP status banding.
//!
//! Bands describe how hurt a combatant looks without exposing exact numbers;
//! they feed the narration and tactician contexts, never the mechanics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse health band derived from current/maximum hit points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HpBand {
    /// At or above 90% of maximum.
    Healthy,
    /// At or above 60%.
    Injured,
    /// At or above 20%.
    Wounded,
    /// Above zero.
    BadlyWounded,
    /// At or below zero.
    Defeated,
}

impl fmt::Display for HpBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Healthy => "Healthy",
            Self::Injured => "Injured",
            Self::Wounded => "Wounded",
            Self::BadlyWounded => "Badly Wounded",
            Self::Defeated => "Defeated",
        };
        write!(f, "{label}")
    }
}

/// Band current hit points against a maximum.
///
/// Pure: identical inputs always yield identical bands. A non-positive
/// maximum is treated as 1 so the ratio stays defined.
pub fn hp_status(current: i32, max: i32) -> HpBand {
    if current <= 0 {
        return HpBand::Defeated;
    }
    let ratio = f64::from(current) / f64::from(max.max(1));
    if ratio >= 0.9 {
        HpBand::Healthy
    } else if ratio >= 0.6 {
        HpBand::Injured
    } else if ratio >= 0.2 {
        HpBand::Wounded
    } else {
        HpBand::BadlyWounded
    }
}
