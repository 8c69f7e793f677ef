//! Target reference resolution.
//!
//! Players refer to enemies by canonical id, by display name ("Goblin 2"),
//! or by bare type name ("Goblin"). Resolution is exact (case- and
//! accent-insensitive), never fuzzy: an ambiguous bare type is reported back
//! with the candidate display names so the player can pick, which is
//! distinct from a reference that matches nothing.

use mz_core::{CharacterState, EnemyState, text};

/// Outcome of resolving a target reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetResolution {
    /// Resolved to the enemy at this roster index.
    Enemy(usize),
    /// Resolved to the party member at this roster index.
    Ally(usize),
    /// Several live enemies share the referenced type name; the player must
    /// disambiguate among these display names.
    Ambiguous(Vec<String>),
    /// The reference matched nothing.
    NotFound,
}

/// Compute player-facing display names for the enemy roster.
///
/// Enemies are grouped by normalized type name; groups with more than one
/// member get 1-based ordinals in roster order ("Goblin 1", "Goblin 2"),
/// singletons keep their bare name. Ordinals are assigned over the full
/// roster — including still-hidden enemies — so they stay stable when a
/// hidden enemy is revealed mid-encounter.
pub fn display_names(enemies: &[EnemyState]) -> Vec<String> {
    let keys: Vec<String> = enemies.iter().map(|e| text::normalize(&e.name)).collect();
    enemies
        .iter()
        .enumerate()
        .map(|(i, enemy)| {
            let total = keys.iter().filter(|k| **k == keys[i]).count();
            if total <= 1 {
                enemy.name.clone()
            } else {
                let ordinal = keys[..=i].iter().filter(|k| **k == keys[i]).count();
                format!("{} {}", enemy.name, ordinal)
            }
        })
        .collect()
}

/// Resolve a free-text target reference.
///
/// Order, first match wins: exact instance id, exact display name, bare type
/// name (unique live instance, else ambiguous), then party member by id or
/// name (heal targets). Hidden enemies never match.
pub fn resolve_target(
    reference: &str,
    enemies: &[EnemyState],
    party: &[CharacterState],
) -> TargetResolution {
    let names = display_names(enemies);

    // 1. Exact canonical instance id.
    if let Some(i) = enemies
        .iter()
        .position(|e| !e.is_hidden() && text::matches(&e.id, reference))
    {
        return TargetResolution::Enemy(i);
    }

    // 2. Exact display name ("Goblin 2").
    if let Some(i) = (0..enemies.len())
        .find(|&i| !enemies[i].is_hidden() && text::matches(&names[i], reference))
    {
        return TargetResolution::Enemy(i);
    }

    // 3. Bare type name: unique live instance resolves, several are
    //    ambiguous, none falls through.
    let of_type: Vec<usize> = (0..enemies.len())
        .filter(|&i| {
            !enemies[i].is_hidden()
                && enemies[i].is_alive()
                && text::matches(&enemies[i].name, reference)
        })
        .collect();
    match of_type.as_slice() {
        [single] => return TargetResolution::Enemy(*single),
        [] => {}
        several => {
            return TargetResolution::Ambiguous(
                several.iter().map(|&i| names[i].clone()).collect(),
            );
        }
    }

    // 4. Party member by id or name.
    if let Some(i) = party
        .iter()
        .position(|c| text::matches(&c.id, reference) || text::matches(&c.name, reference))
    {
        return TargetResolution::Ally(i);
    }

    TargetResolution::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use mz_core::{AbilityModifiers, ControlKind, Disposition, EnemyStatus, HitPoints};

    fn goblin(id: &str) -> EnemyState {
        EnemyState::hostile(id, "Goblin", 7)
    }

    fn party_member(id: &str, name: &str) -> CharacterState {
        CharacterState {
            id: id.to_string(),
            name: name.to_string(),
            hit_points: HitPoints::full(20),
            armor_class: 12,
            modifiers: AbilityModifiers::default(),
            proficiency: 2,
            inventory: Vec::new(),
            abilities: Vec::new(),
            control: ControlKind::Player,
            is_dead: false,
        }
    }

    #[test]
    fn ordinals_only_for_duplicated_types() {
        let enemies = vec![
            goblin("goblin-1"),
            EnemyState::hostile("orc-1", "Orco", 15),
            goblin("goblin-2"),
        ];
        assert_eq!(display_names(&enemies), vec!["Goblin 1", "Orco", "Goblin 2"]);
    }

    #[test]
    fn ordinals_follow_roster_order_and_fold_accents() {
        let enemies = vec![
            EnemyState::hostile("v-1", "Víbora", 4),
            EnemyState::hostile("v-2", "Vibora", 4),
        ];
        assert_eq!(display_names(&enemies), vec!["Víbora 1", "Vibora 2"]);
    }

    #[test]
    fn exact_id_wins() {
        let enemies = vec![goblin("goblin-1"), goblin("goblin-2")];
        assert_eq!(
            resolve_target("goblin-2", &enemies, &[]),
            TargetResolution::Enemy(1)
        );
    }

    #[test]
    fn display_name_resolves_uniquely() {
        let enemies = vec![goblin("goblin-1"), goblin("goblin-2")];
        assert_eq!(
            resolve_target("Goblin 1", &enemies, &[]),
            TargetResolution::Enemy(0)
        );
        assert_eq!(
            resolve_target("goblin 2", &enemies, &[]),
            TargetResolution::Enemy(1)
        );
    }

    #[test]
    fn bare_type_with_two_live_instances_is_ambiguous() {
        let enemies = vec![goblin("goblin-1"), goblin("goblin-2")];
        match resolve_target("Goblin", &enemies, &[]) {
            TargetResolution::Ambiguous(names) => {
                assert_eq!(names, vec!["Goblin 1", "Goblin 2"]);
            }
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn bare_type_with_one_live_instance_resolves() {
        let mut dead = goblin("goblin-1");
        dead.hit_points = Some(HitPoints { current: 0, max: 7 });
        let enemies = vec![dead, goblin("goblin-2")];
        assert_eq!(
            resolve_target("Goblin", &enemies, &[]),
            TargetResolution::Enemy(1)
        );
    }

    #[test]
    fn hidden_enemies_never_match() {
        let mut mimic = EnemyState::hostile("mimic-1", "Mímico", 15);
        mimic.disposition = Disposition::Hidden;
        mimic.status = EnemyStatus::Hidden;
        assert_eq!(
            resolve_target("mimic-1", &[mimic], &[]),
            TargetResolution::NotFound
        );
    }

    #[test]
    fn party_member_resolves_by_name_for_heals() {
        let party = vec![party_member("pc-1", "Alira")];
        assert_eq!(
            resolve_target("alira", &[], &party),
            TargetResolution::Ally(0)
        );
    }

    #[test]
    fn unknown_reference_is_not_found() {
        let enemies = vec![goblin("goblin-1")];
        assert_eq!(
            resolve_target("dragón", &enemies, &[]),
            TargetResolution::NotFound
        );
    }

    #[test]
    fn accent_insensitive_reference() {
        let enemies = vec![EnemyState::hostile("vibora-1", "Víbora", 4)];
        assert_eq!(
            resolve_target("vibora", &enemies, &[]),
            TargetResolution::Enemy(0)
        );
    }
}
