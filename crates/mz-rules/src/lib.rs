//! Pure combat rules for Mazmorra.
//!
//! Everything in this crate is a function of its inputs: HP status banding,
//! hit-point clamping and death resolution, dice-notation handling with
//! critical doubling, and end-of-combat detection. No state, no I/O — the
//! stateful engine lives in `mz-engine`.

/// HP status banding for narration context.
pub mod band;
/// End-of-combat detection.
pub mod end;
/// Error types for the rules crate.
pub mod error;
/// Dice notation parsing, rolling, and critical doubling.
pub mod notation;
/// Hit-point clamping, damage, and healing.
pub mod vitals;

/// Re-export banding.
pub use band::{HpBand, hp_status};
/// Re-export end-of-combat detection.
pub use end::{CombatEnd, check_end_of_combat};
/// Re-export error types.
pub use error::{RulesError, RulesResult};
/// Re-export dice notation.
pub use notation::{DiceNotation, critical_damage_notation};
/// Re-export vitals operations.
pub use vitals::{
    DEFAULT_MAX_HP, DamageApplication, apply_damage, apply_healing, is_incapacitated,
    resolve_character, resolve_enemy, resolve_hit_points,
};
