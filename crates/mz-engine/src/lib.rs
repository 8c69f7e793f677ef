//! Turn-based combat engine for Mazmorra.
//!
//! [`CombatSession`] owns one encounter's state and drives its phase
//! machine; each processed turn flows through the turn processor and action
//! executor, consulting the pure rules in `mz-rules` and the async
//! collaborator ports (dice roller, tactician, narrator) supplied by the
//! surrounding application. The engine is single-threaded per encounter:
//! callers serialize invocations per session instance.

/// Encounter configuration.
pub mod config;
/// Error types for the engine.
pub mod error;
/// Action execution: the single path both human and AI turns go through.
pub mod executor;
/// Async collaborator ports: dice roller, tactician, narrator.
pub mod ports;
/// Per-location enemy pools, filtering, and stat normalization.
pub mod roster;
/// The combat session phase machine.
pub mod session;
/// Serialized encounter snapshots.
pub mod snapshot;
/// Target reference resolution and display names.
pub mod target;
/// Combat trigger evaluation for exploration and interaction.
pub mod trigger;
/// Turn processing: intent validation and tactician consultation.
pub mod turn;

/// Re-export configuration.
pub use config::EncounterConfig;
/// Re-export error types.
pub use error::{EngineError, EngineResult};
/// Re-export the action executor surface.
pub use executor::{ActionExecutor, ActionOutcome, ActionPlan, ActionTarget};
/// Re-export the oracle ports and their contracts.
pub use ports::{
    DiceRoller, LocalDiceRoller, Narrator, NarrationSummary, OracleError, Oracles, Tactician,
    TacticianContext, TacticianDecision,
};
/// Re-export the session and its surface types.
pub use session::{CombatSession, Phase, TurnReport, TurnRequest};
/// Re-export snapshots.
pub use snapshot::EncounterSnapshot;
/// Re-export target resolution.
pub use target::{TargetResolution, display_names, resolve_target};
/// Re-export trigger evaluation.
pub use trigger::{Hazard, HazardKind, SurpriseSide, TriggerDecision, TriggerReason};
/// Re-export the player action shape and planning faults.
pub use turn::{PlayerAction, TurnFault};
