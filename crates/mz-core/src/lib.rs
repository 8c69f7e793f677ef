//! Core types for the Mazmorra combat engine: combatants, character and
//! enemy state, action results, and dice-roll records.
//!
//! This crate defines the data model that the engine mutates. It is
//! independent of the rules and of any I/O — you can construct encounter
//! state programmatically or deserialize it from JSON.

/// Action kinds, results, and the recoverable error taxonomy.
pub mod action;
/// Character state: hit points, modifiers, inventory.
pub mod character;
/// Initiative-order entries and control kinds.
pub mod combatant;
/// Enemy instance state and visibility.
pub mod enemy;
/// Error types used throughout the crate.
pub mod error;
/// Engine messages and dice-roll records.
pub mod message;
/// Text normalization for case- and accent-insensitive matching.
pub mod text;

/// Re-export action types.
pub use action::{ActionErrorCode, ActionKind, CombatActionResult};
/// Re-export character types.
pub use character::{AbilityModifiers, CharacterState, HitPoints, Item};
/// Re-export combatant types.
pub use combatant::{Combatant, ControlKind, Role};
/// Re-export enemy types.
pub use enemy::{Disposition, EnemyState, EnemyStatus};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export message and roll types.
pub use message::{Message, MessageKind, RollOutcome, RollRecord, RollRequest, RollResult};
