//! End-of-combat detection.

use std::fmt;

use serde::{Deserialize, Serialize};

use mz_core::{CharacterState, EnemyState};

/// Why an encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatEnd {
    /// Every enemy is at or below zero hit points.
    EnemiesDefeated,
    /// Every party member is dead.
    PartyDead,
    /// Every party member is at or below zero hit points, but not all dead.
    PartyUnconscious,
}

impl fmt::Display for CombatEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::EnemiesDefeated => "all enemies defeated",
            Self::PartyDead => "all allies dead",
            Self::PartyUnconscious => "all allies unconscious",
        };
        write!(f, "{reason}")
    }
}

/// Check whether the encounter is over, and why.
///
/// Precedence: enemies defeated, then all allies dead, then all allies
/// unconscious. A mixed party (some dead, some merely at zero) reports
/// "unconscious" — the dead reason requires literally every member dead.
pub fn check_end_of_combat(party: &[CharacterState], enemies: &[EnemyState]) -> Option<CombatEnd> {
    if enemies.iter().all(|e| !e.is_alive()) {
        return Some(CombatEnd::EnemiesDefeated);
    }
    if !party.is_empty() && party.iter().all(|c| c.is_dead) {
        return Some(CombatEnd::PartyDead);
    }
    if !party.is_empty() && party.iter().all(|c| c.hit_points.is_depleted()) {
        return Some(CombatEnd::PartyUnconscious);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use mz_core::{AbilityModifiers, ControlKind, HitPoints};

    fn member(current: i32, is_dead: bool) -> CharacterState {
        CharacterState {
            id: "pc".to_string(),
            name: "Alira".to_string(),
            hit_points: HitPoints { current, max: 20 },
            armor_class: 12,
            modifiers: AbilityModifiers::default(),
            proficiency: 2,
            inventory: Vec::new(),
            abilities: Vec::new(),
            control: ControlKind::Player,
            is_dead,
        }
    }

    fn enemy(current: i32) -> EnemyState {
        let mut e = EnemyState::hostile("goblin-1", "Goblin", 7);
        e.hit_points = Some(HitPoints { current, max: 7 });
        e
    }

    #[test]
    fn all_enemies_defeated() {
        let party = vec![member(15, false)];
        let enemies = vec![enemy(0), enemy(-2)];
        let end = check_end_of_combat(&party, &enemies).unwrap();
        assert_eq!(end, CombatEnd::EnemiesDefeated);
        assert_eq!(end.to_string(), "all enemies defeated");
    }

    #[test]
    fn all_allies_dead_beats_unconscious() {
        let party = vec![member(0, true)];
        let enemies = vec![enemy(5)];
        let end = check_end_of_combat(&party, &enemies).unwrap();
        assert_eq!(end, CombatEnd::PartyDead);
        assert_eq!(end.to_string(), "all allies dead");
    }

    #[test]
    fn all_allies_unconscious() {
        let party = vec![member(0, false)];
        let enemies = vec![enemy(5)];
        let end = check_end_of_combat(&party, &enemies).unwrap();
        assert_eq!(end, CombatEnd::PartyUnconscious);
        assert_eq!(end.to_string(), "all allies unconscious");
    }

    #[test]
    fn mixed_dead_and_unconscious_reports_unconscious() {
        let party = vec![member(0, true), member(0, false)];
        let enemies = vec![enemy(5)];
        assert_eq!(
            check_end_of_combat(&party, &enemies),
            Some(CombatEnd::PartyUnconscious)
        );
    }

    #[test]
    fn ongoing_combat() {
        let party = vec![member(3, false)];
        let enemies = vec![enemy(1)];
        assert_eq!(check_end_of_combat(&party, &enemies), None);
    }

    #[test]
    fn unknown_enemy_hp_keeps_combat_going() {
        let party = vec![member(10, false)];
        let mut unknown = enemy(0);
        unknown.hit_points = None;
        assert_eq!(check_end_of_combat(&party, &[unknown]), None);
    }
}
