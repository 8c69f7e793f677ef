//! Initiative-order entries.
//!
//! A [`Combatant`] is an entry in the initiative order, distinct from the
//! character or enemy record it points to. Ordering is fixed at encounter
//! start and never changes mid-encounter.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Who decides a combatant's actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    /// A human player supplies actions.
    Player,
    /// The tactician oracle supplies actions.
    Ai,
}

impl ControlKind {
    /// Parse a control kind from adventure data.
    pub fn parse(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "player" | "human" | "jugador" => Ok(Self::Player),
            "ai" | "ia" | "auto" => Ok(Self::Ai),
            other => Err(CoreError::UnknownControlKind(other.to_string())),
        }
    }

    /// Returns true for automated combatants.
    pub fn is_automated(&self) -> bool {
        matches!(self, Self::Ai)
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Ai => write!(f, "ai"),
        }
    }
}

/// The role a combatant plays in the encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The human player's character.
    Player,
    /// An allied character travelling with the party.
    Companion,
    /// A hostile or neutral non-party combatant.
    Npc,
}

impl Role {
    /// Parse a role tag from adventure data.
    pub fn parse(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "player" | "jugador" => Ok(Self::Player),
            "companion" | "companero" | "compañero" => Ok(Self::Companion),
            "npc" | "enemy" | "enemigo" => Ok(Self::Npc),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }

    /// Returns true for party-side roles (player and companions).
    pub fn is_party(&self) -> bool {
        matches!(self, Self::Player | Self::Companion)
    }
}

/// An entry in the initiative order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    /// Canonical identifier of the underlying character or enemy record.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Initiative score; higher acts first.
    pub initiative: i32,
    /// Who controls this combatant.
    pub control: ControlKind,
    /// Party-or-enemy role tag.
    pub role: Role,
    /// One-turn skip flag for combatants ambushed at encounter start.
    /// Cleared the first time their turn comes up.
    #[serde(default)]
    pub surprised: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_control_kind() {
        assert_eq!(ControlKind::parse("Player").unwrap(), ControlKind::Player);
        assert_eq!(ControlKind::parse("IA").unwrap(), ControlKind::Ai);
        assert!(ControlKind::parse("daemon").is_err());
    }

    #[test]
    fn parse_role() {
        assert_eq!(Role::parse("companion").unwrap(), Role::Companion);
        assert_eq!(Role::parse("Enemigo").unwrap(), Role::Npc);
        assert!(Role::parse("observer").is_err());
    }

    #[test]
    fn party_side() {
        assert!(Role::Player.is_party());
        assert!(Role::Companion.is_party());
        assert!(!Role::Npc.is_party());
    }

    #[test]
    fn automated() {
        assert!(ControlKind::Ai.is_automated());
        assert!(!ControlKind::Player.is_automated());
    }
}
