//! Hit-point clamping, damage application, and healing.
//!
//! These functions uphold the two numeric invariants the rest of the engine
//! relies on: after resolution `0 ≤ current ≤ max`, and a dead character has
//! zero current hit points. They never fail; malformed input is corrected.

use mz_core::{CharacterState, EnemyState, HitPoints};

/// Fallback maximum applied when source data carries a non-positive max.
pub const DEFAULT_MAX_HP: i32 = 10;

/// Clamp a hit-point pair into a structurally valid state.
///
/// A non-positive maximum is corrected to [`DEFAULT_MAX_HP`], then `current`
/// is clamped into `[0, max]`.
pub fn resolve_hit_points(hp: HitPoints) -> HitPoints {
    let max = if hp.max <= 0 { DEFAULT_MAX_HP } else { hp.max };
    HitPoints {
        current: hp.current.clamp(0, max),
        max,
    }
}

/// Clamp a character's hit points and reconcile the death flag.
///
/// If `is_dead` is set, current hit points are forced to zero. The converse
/// is deliberately not applied: zero hit points without the flag means
/// merely unconscious.
pub fn resolve_character(mut character: CharacterState) -> CharacterState {
    character.hit_points = resolve_hit_points(character.hit_points);
    if character.is_dead {
        character.hit_points.current = 0;
    }
    character
}

/// Clamp an enemy's hit points when they are known.
pub fn resolve_enemy(mut enemy: EnemyState) -> EnemyState {
    enemy.hit_points = enemy.hit_points.map(resolve_hit_points);
    enemy
}

/// Returns true if the combatant cannot act: dead, or at zero hit points.
pub fn is_incapacitated(hp: &HitPoints, is_dead: bool) -> bool {
    is_dead || hp.current <= 0
}

/// The outcome of applying damage to a hit-point pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageApplication {
    /// Hit points after the damage, resolved.
    pub hit_points: HitPoints,
    /// The target was brought to zero by this damage.
    pub dropped: bool,
    /// Damage beyond what was needed to reach zero.
    pub overflow: i32,
    /// Overflow reached the target's maximum: instant death instead of
    /// unconsciousness (house rule, kept as specified).
    pub massive: bool,
}

/// Apply damage, classifying knockout and massive-damage death.
pub fn apply_damage(hp: HitPoints, damage: i32) -> DamageApplication {
    let before = resolve_hit_points(hp);
    let damage = damage.max(0);
    let after = resolve_hit_points(HitPoints {
        current: before.current - damage,
        max: before.max,
    });
    let dropped = before.current > 0 && after.current == 0;
    let overflow = if after.current == 0 {
        (damage - before.current).max(0)
    } else {
        0
    };
    DamageApplication {
        hit_points: after,
        dropped,
        overflow,
        massive: dropped && overflow >= before.max,
    }
}

/// Add healing to current hit points, clamped at the maximum.
pub fn apply_healing(hp: HitPoints, amount: i32) -> HitPoints {
    let hp = resolve_hit_points(hp);
    resolve_hit_points(HitPoints {
        current: hp.current + amount.max(0),
        max: hp.max,
    })
}
