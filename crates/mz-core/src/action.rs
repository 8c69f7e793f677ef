//! Action kinds, combat action results, and the recoverable error taxonomy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::character::CharacterState;
use crate::enemy::EnemyState;
use crate::error::{CoreError, CoreResult};

/// The kinds of action the engine resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Attack a target with a weapon.
    Attack,
    /// Restore hit points to an ally.
    Heal,
}

impl ActionKind {
    /// Parse an action label from player input or a tactician decision.
    pub fn parse(label: &str) -> CoreResult<Self> {
        match label.trim().to_lowercase().as_str() {
            "attack" | "atacar" | "ataque" | "golpear" => Ok(Self::Attack),
            "heal" | "curar" | "sanar" | "curación" | "curacion" => Ok(Self::Heal),
            other => Err(CoreError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack => write!(f, "attack"),
            Self::Heal => write!(f, "heal"),
        }
    }
}

/// Closed set of recoverable combat conditions.
///
/// These are not failures of the engine: each produces a clarification or
/// status message and leaves the turn unconsumed so the same combatant can
/// retry. Serialized with the wire spelling used by the surrounding
/// application (`TARGET_AMBIGUOUS`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionErrorCode {
    /// The target reference matched nothing.
    TargetNotFound,
    /// The target reference matched several enemies; the player must pick.
    TargetAmbiguous,
    /// An attack was requested without a target.
    TargetRequired,
    /// The requested action kind is not recognized.
    InvalidAction,
    /// The tactician oracle returned no usable action.
    NoAction,
    /// The acting combatant has no record in the rosters.
    PlayerNotFound,
    /// The action referenced something the combatant does not have
    /// (a named weapon missing from inventory).
    ResolutionFailed,
}

impl fmt::Display for ActionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::TargetNotFound => "TARGET_NOT_FOUND",
            Self::TargetAmbiguous => "TARGET_AMBIGUOUS",
            Self::TargetRequired => "TARGET_REQUIRED",
            Self::InvalidAction => "INVALID_ACTION",
            Self::NoAction => "NO_ACTION",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::ResolutionFailed => "RESOLUTION_FAILED",
        };
        write!(f, "{code}")
    }
}

/// The outcome of one resolved action. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatActionResult {
    /// Whether the attack hit (always false for heals).
    pub hit: bool,
    /// Natural maximum on the attack die.
    pub critical: bool,
    /// Natural minimum on the attack die.
    pub fumble: bool,
    /// Damage dealt to the target.
    pub damage: i32,
    /// Hit points restored to the target.
    pub healing: i32,
    /// The target died from this action.
    pub target_killed: bool,
    /// The target was knocked unconscious by this action.
    pub target_unconscious: bool,
    /// Party roster after the action.
    pub party: Vec<CharacterState>,
    /// Enemy roster after the action.
    pub enemies: Vec<EnemyState>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_action_labels() {
        assert_eq!(ActionKind::parse("Atacar").unwrap(), ActionKind::Attack);
        assert_eq!(ActionKind::parse("heal").unwrap(), ActionKind::Heal);
        assert_eq!(ActionKind::parse("CURAR").unwrap(), ActionKind::Heal);
        assert!(ActionKind::parse("bailar").is_err());
    }

    #[test]
    fn error_code_wire_spelling() {
        assert_eq!(ActionErrorCode::TargetAmbiguous.to_string(), "TARGET_AMBIGUOUS");
        let json = serde_json::to_string(&ActionErrorCode::ResolutionFailed).unwrap();
        assert_eq!(json, "\"RESOLUTION_FAILED\"");
    }
}
