//! Async collaborator ports.
//!
//! The engine consumes three external collaborators: a dice roller, a
//! tactician that chooses actions for automated combatants, and a narrator
//! that turns resolved actions into prose. All three are injected as trait
//! objects — never process-wide globals — so tests substitute deterministic
//! fakes. Calls within a turn are awaited sequentially; later calls depend
//! on earlier results.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mz_core::{Combatant, RollRequest, RollResult};
use mz_rules::DiceNotation;

/// A collaborator failure, carrying the raw message.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct OracleError(pub String);

impl OracleError {
    /// Wrap a message into an oracle error.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Rolls dice on behalf of the engine.
#[async_trait]
pub trait DiceRoller: Send + Sync {
    /// Resolve one roll request.
    async fn roll(&self, request: &RollRequest) -> Result<RollResult, OracleError>;
}

/// One combatant's condition as shown to the tactician: no exact numbers,
/// just the narration band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantCondition {
    /// Canonical identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Health band label ("Healthy", "Badly Wounded", ...).
    pub band: String,
}

/// Everything the tactician sees when choosing an automated action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticianContext {
    /// The combatant whose turn it is.
    pub actor: Combatant,
    /// Party conditions.
    pub party: Vec<CombatantCondition>,
    /// Visible enemy conditions.
    pub enemies: Vec<CombatantCondition>,
    /// Recent narration, oldest first.
    pub recent_narration: Vec<String>,
    /// Current location description, when known.
    pub location: Option<String>,
}

/// What the tactician decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticianDecision {
    /// Action label ("attack", "heal").
    pub action: String,
    /// Target identifier or display name.
    pub target: Option<String>,
    /// Rolls the tactician wants made: first entry is the attack roll,
    /// second the damage roll. Absent entries fall back to the actor's
    /// sheet or the encounter defaults.
    pub requested_rolls: Vec<RollRequest>,
}

/// Chooses actions for automated combatants.
#[async_trait]
pub trait Tactician: Send + Sync {
    /// Decide what the active combatant does. `Ok(None)` means no usable
    /// action; the engine reports `NO_ACTION` and leaves the turn pending.
    async fn decide(&self, context: &TacticianContext)
    -> Result<Option<TacticianDecision>, OracleError>;
}

/// Structured summary of a resolved action, handed to the narrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationSummary {
    /// Acting combatant's display name.
    pub attacker: String,
    /// Target's display name.
    pub target: String,
    /// Action label.
    pub action: String,
    /// The attack hit.
    pub hit: bool,
    /// Natural maximum on the attack die.
    pub critical: bool,
    /// Natural minimum on the attack die.
    pub fumble: bool,
    /// Damage dealt.
    pub damage: i32,
    /// Hit points restored.
    pub healing: i32,
    /// Target hit points before the action.
    pub hp_before: i32,
    /// Target hit points after the action.
    pub hp_after: i32,
    /// The target died.
    pub target_killed: bool,
    /// The target fell unconscious.
    pub target_unconscious: bool,
}

/// Turns resolved actions into prose. Best-effort: failures are logged and
/// swallowed, never aborting a resolved action.
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Produce narration for a resolved action.
    async fn narrate(&self, summary: &NarrationSummary) -> Result<String, OracleError>;
}

/// The injected collaborator bundle.
#[derive(Clone)]
pub struct Oracles {
    /// Dice roller.
    pub dice: Arc<dyn DiceRoller>,
    /// Tactician for automated combatants.
    pub tactician: Arc<dyn Tactician>,
    /// Narration generator.
    pub narrator: Arc<dyn Narrator>,
}

/// A seeded in-process dice roller for applications without an external
/// roller, and for deterministic tests.
pub struct LocalDiceRoller {
    rng: Mutex<StdRng>,
}

impl LocalDiceRoller {
    /// Create a roller from a seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

#[async_trait]
impl DiceRoller for LocalDiceRoller {
    async fn roll(&self, request: &RollRequest) -> Result<RollResult, OracleError> {
        let notation: DiceNotation = request
            .notation
            .parse()
            .map_err(|e: mz_rules::RulesError| OracleError::new(e.to_string()))?;
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| OracleError::new("dice roller lock poisoned"))?;
        Ok(notation.roll(&mut rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mz_core::RollOutcome;

    #[tokio::test]
    async fn local_roller_is_deterministic_per_seed() {
        let request = RollRequest::new("2d6+1", "prueba", "Alira");
        let a = LocalDiceRoller::seeded(99).roll(&request).await.unwrap();
        let b = LocalDiceRoller::seeded(99).roll(&request).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.rolls.len(), 2);
        assert_eq!(a.modifier, 1);
    }

    #[tokio::test]
    async fn local_roller_rejects_bad_notation() {
        let request = RollRequest::new("espada", "prueba", "Alira");
        assert!(LocalDiceRoller::seeded(1).roll(&request).await.is_err());
    }

    #[tokio::test]
    async fn local_roller_classifies_single_die() {
        let roller = LocalDiceRoller::seeded(3);
        let request = RollRequest::new("1d2", "prueba", "Alira");
        let mut outcomes = Vec::new();
        for _ in 0..30 {
            outcomes.push(roller.roll(&request).await.unwrap().outcome);
        }
        assert!(outcomes.contains(&RollOutcome::Crit));
        assert!(outcomes.contains(&RollOutcome::Fumble));
    }
}
