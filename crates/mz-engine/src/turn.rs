//! Turn planning: from raw intent to an executable action plan.
//!
//! Human input arrives as an action label, an optional target reference, and
//! optional free text naming a weapon ("ataco al goblin con mi espada").
//! Tactician decisions arrive pre-structured. Both are validated here into
//! the same [`ActionPlan`]; anything wrong is a recoverable
//! [`ActionErrorCode`] with a player-facing message, never an engine error.

use serde::{Deserialize, Serialize};

use mz_core::{ActionErrorCode, ActionKind, CharacterState, EnemyState, Item, text};

use crate::config::EncounterConfig;
use crate::executor::{ActionPlan, ActionTarget};
use crate::ports::TacticianDecision;
use crate::target::{TargetResolution, display_names, resolve_target};

/// Healing notation used when nothing more specific is available.
const DEFAULT_HEAL: &str = "1d8";

/// A player's declared action for their turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAction {
    /// Action label ("attack", "atacar", "heal", "curar").
    pub kind: String,
    /// Target reference: instance id, display name, or bare type name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Free text the action was phrased in; a weapon may be named here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl PlayerAction {
    /// An attack against the given target reference.
    pub fn attack(target: impl Into<String>) -> Self {
        Self {
            kind: "attack".to_string(),
            target: Some(target.into()),
            text: None,
        }
    }

    /// A heal on the given target reference.
    pub fn heal(target: impl Into<String>) -> Self {
        Self {
            kind: "heal".to_string(),
            target: Some(target.into()),
            text: None,
        }
    }

    /// Attach the free-text phrasing.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// A recoverable planning failure: the turn stays pending and the player
/// gets `text` as clarification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnFault {
    /// The error taxonomy entry.
    pub code: ActionErrorCode,
    /// Player-facing clarification message.
    pub text: String,
}

impl TurnFault {
    fn new(code: ActionErrorCode, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }
}

/// Validate a player's action into an executable plan.
pub fn plan_player_action(
    actor: &CharacterState,
    action: &PlayerAction,
    party: &[CharacterState],
    enemies: &[EnemyState],
    config: &EncounterConfig,
) -> Result<ActionPlan, TurnFault> {
    let kind = ActionKind::parse(&action.kind).map_err(|_| {
        TurnFault::new(
            ActionErrorCode::InvalidAction,
            format!("No entiendo la acción \"{}\".", action.kind),
        )
    })?;

    let (target, target_display) = match kind {
        ActionKind::Attack => {
            let reference = action.target.as_deref().ok_or_else(|| {
                TurnFault::new(
                    ActionErrorCode::TargetRequired,
                    "Debes indicar un objetivo para atacar.",
                )
            })?;
            resolve_reference(reference, party, enemies)?
        }
        // A heal with no target lands on the healer.
        ActionKind::Heal => match action.target.as_deref() {
            Some(reference) => resolve_reference(reference, party, enemies)?,
            None => {
                let own = party
                    .iter()
                    .position(|c| c.id == actor.id)
                    .ok_or_else(|| {
                        TurnFault::new(
                            ActionErrorCode::PlayerNotFound,
                            format!("No encuentro la ficha de {}.", actor.name),
                        )
                    })?;
                (ActionTarget::Ally(own), actor.name.clone())
            }
        },
    };

    let effect_notation = match kind {
        ActionKind::Attack => weapon_notation(actor, action.text.as_deref(), config)?,
        ActionKind::Heal => DEFAULT_HEAL.to_string(),
    };

    Ok(ActionPlan {
        actor: actor.name.clone(),
        kind,
        attack_notation: format!("1d20{:+}", actor.attack_modifier()),
        effect_notation,
        target,
        target_display,
    })
}

/// Validate a tactician decision into an executable plan.
///
/// The first requested roll supplies the attack notation and the second the
/// damage notation; absent entries fall back to the encounter defaults.
pub fn plan_tactician_decision(
    actor_name: &str,
    decision: &TacticianDecision,
    party: &[CharacterState],
    enemies: &[EnemyState],
    config: &EncounterConfig,
) -> Result<ActionPlan, TurnFault> {
    let kind = ActionKind::parse(&decision.action).map_err(|_| {
        TurnFault::new(
            ActionErrorCode::InvalidAction,
            format!("No entiendo la acción \"{}\".", decision.action),
        )
    })?;

    let reference = decision.target.as_deref().ok_or_else(|| {
        TurnFault::new(
            ActionErrorCode::TargetRequired,
            format!("{actor_name} no eligió un objetivo."),
        )
    })?;
    let (target, target_display) = resolve_reference(reference, party, enemies)?;

    let attack_notation = decision
        .requested_rolls
        .first()
        .map_or_else(|| config.default_enemy_attack.clone(), |r| r.notation.clone());
    let effect_notation = decision
        .requested_rolls
        .get(1)
        .map_or_else(|| config.default_damage.clone(), |r| r.notation.clone());

    Ok(ActionPlan {
        actor: actor_name.to_string(),
        kind,
        attack_notation,
        effect_notation,
        target,
        target_display,
    })
}

fn resolve_reference(
    reference: &str,
    party: &[CharacterState],
    enemies: &[EnemyState],
) -> Result<(ActionTarget, String), TurnFault> {
    match resolve_target(reference, enemies, party) {
        TargetResolution::Enemy(i) => {
            let display = display_names(enemies)[i].clone();
            Ok((ActionTarget::Enemy(i), display))
        }
        TargetResolution::Ally(i) => Ok((ActionTarget::Ally(i), party[i].name.clone())),
        TargetResolution::Ambiguous(names) => Err(TurnFault::new(
            ActionErrorCode::TargetAmbiguous,
            format!("¿A cuál te refieres? Hay varios: {}.", names.join(", ")),
        )),
        TargetResolution::NotFound => Err(TurnFault::new(
            ActionErrorCode::TargetNotFound,
            format!("No veo a \"{reference}\" por aquí."),
        )),
    }
}

/// Pick the damage notation for an attack.
///
/// A weapon named in the free text must exist in the actor's inventory;
/// otherwise the first carried weapon is used, and a bare-handed actor falls
/// back to the encounter's default damage die.
fn weapon_notation(
    actor: &CharacterState,
    free_text: Option<&str>,
    config: &EncounterConfig,
) -> Result<String, TurnFault> {
    if let Some(phrase) = free_text.and_then(extract_weapon_phrase) {
        let item = find_named_item(actor, &phrase).ok_or_else(|| {
            TurnFault::new(
                ActionErrorCode::ResolutionFailed,
                format!("No llevas ningún objeto llamado \"{phrase}\"."),
            )
        })?;
        return Ok(item_damage(item, config));
    }
    Ok(actor
        .first_weapon()
        .map_or_else(|| config.default_damage.clone(), |w| item_damage(w, config)))
}

fn item_damage(item: &Item, config: &EncounterConfig) -> String {
    item.damage
        .clone()
        .unwrap_or_else(|| config.default_damage.clone())
}

/// Extract a weapon phrase from free text, highest-priority pattern first:
/// "con mi/el/la/un/una X", then "usando mi/el/la X", then bare "mi X",
/// then bare "el/la X". The phrase runs to the next punctuation mark.
fn extract_weapon_phrase(free_text: &str) -> Option<String> {
    const PATTERNS: &[&str] = &[
        "con mi ",
        "con el ",
        "con la ",
        "con un ",
        "con una ",
        "usando mi ",
        "usando el ",
        "usando la ",
        "mi ",
        "el ",
        "la ",
    ];
    let normalized = text::normalize(free_text);
    for pattern in PATTERNS {
        if let Some(rest) = match_at_word_boundary(&normalized, pattern) {
            let phrase: String = rest
                .chars()
                .take_while(|c| !matches!(c, '.' | ',' | ';' | '!' | '?'))
                .collect();
            let phrase = phrase.trim();
            if !phrase.is_empty() {
                return Some(phrase.to_string());
            }
        }
    }
    None
}

/// Find `pattern` starting at a word boundary; returns the text after it.
fn match_at_word_boundary<'t>(haystack: &'t str, pattern: &str) -> Option<&'t str> {
    let mut from = 0;
    while let Some(rel) = haystack[from..].find(pattern) {
        let pos = from + rel;
        let at_boundary = pos == 0 || haystack.as_bytes()[pos - 1] == b' ';
        if at_boundary {
            return Some(&haystack[pos + pattern.len()..]);
        }
        from = pos + pattern.len();
    }
    None
}

/// Match a phrase against inventory: exact name first, then progressively
/// dropping trailing words ("espada corta brillante" still finds "Espada
/// corta").
fn find_named_item<'c>(actor: &'c CharacterState, phrase: &str) -> Option<&'c Item> {
    let mut words: Vec<&str> = phrase.split_whitespace().collect();
    while !words.is_empty() {
        let candidate = words.join(" ");
        if let Some(item) = actor.find_item(&candidate) {
            return Some(item);
        }
        words.pop();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use mz_core::{AbilityModifiers, ControlKind, HitPoints, RollRequest};

    fn fighter() -> CharacterState {
        CharacterState {
            id: "pc-1".to_string(),
            name: "Alira".to_string(),
            hit_points: HitPoints::full(20),
            armor_class: 14,
            modifiers: AbilityModifiers {
                strength: 3,
                ..AbilityModifiers::default()
            },
            proficiency: 2,
            inventory: vec![
                Item::new("Antorcha"),
                Item::weapon("Espada corta", "1d6+1"),
                Item::weapon("Arco largo", "1d8"),
            ],
            abilities: Vec::new(),
            control: ControlKind::Player,
            is_dead: false,
        }
    }

    fn goblins() -> Vec<EnemyState> {
        let mut g1 = EnemyState::hostile("goblin-1", "Goblin", 7);
        g1.armor_class = Some(13);
        let mut g2 = EnemyState::hostile("goblin-2", "Goblin", 7);
        g2.armor_class = Some(13);
        vec![g1, g2]
    }

    #[test]
    fn weapon_phrase_patterns_by_priority() {
        assert_eq!(
            extract_weapon_phrase("ataco al goblin con mi espada corta"),
            Some("espada corta".to_string())
        );
        assert_eq!(
            extract_weapon_phrase("lo golpeo usando la antorcha, con fuerza"),
            Some("antorcha".to_string())
        );
        assert_eq!(
            extract_weapon_phrase("mi arco largo apunta al goblin"),
            Some("arco largo apunta al goblin".to_string())
        );
        assert_eq!(extract_weapon_phrase("ataco sin pensarlo"), None);
    }

    #[test]
    fn phrase_stops_at_punctuation_and_folds_accents() {
        assert_eq!(
            extract_weapon_phrase("golpeo con mi Espada Corta, rápido"),
            Some("espada corta".to_string())
        );
    }

    #[test]
    fn el_inside_a_word_does_not_match() {
        // "duelo" contains "el " nowhere at a word boundary.
        assert_eq!(extract_weapon_phrase("duelo cuerpo a cuerpo"), None);
    }

    #[test]
    fn named_weapon_is_used() {
        let actor = fighter();
        let action = PlayerAction::attack("goblin-1").with_text("ataco con mi arco largo");
        let plan =
            plan_player_action(&actor, &action, &[actor.clone()], &goblins(), &EncounterConfig::default())
                .unwrap();
        assert_eq!(plan.effect_notation, "1d8");
        assert_eq!(plan.attack_notation, "1d20+5");
    }

    #[test]
    fn trailing_words_do_not_hide_the_weapon() {
        let actor = fighter();
        let action =
            PlayerAction::attack("goblin-1").with_text("golpeo con mi espada corta brillante");
        let plan =
            plan_player_action(&actor, &action, &[actor.clone()], &goblins(), &EncounterConfig::default())
                .unwrap();
        assert_eq!(plan.effect_notation, "1d6+1");
    }

    #[test]
    fn missing_named_weapon_is_resolution_failed() {
        let actor = fighter();
        let action = PlayerAction::attack("goblin-1").with_text("ataco con mi lanza");
        let fault =
            plan_player_action(&actor, &action, &[actor.clone()], &goblins(), &EncounterConfig::default())
                .unwrap_err();
        assert_eq!(fault.code, ActionErrorCode::ResolutionFailed);
        assert!(fault.text.contains("lanza"));
    }

    #[test]
    fn no_text_falls_back_to_first_weapon() {
        let actor = fighter();
        let action = PlayerAction::attack("goblin-1");
        let plan =
            plan_player_action(&actor, &action, &[actor.clone()], &goblins(), &EncounterConfig::default())
                .unwrap();
        // Antorcha is not a weapon; Espada corta is the first that is.
        assert_eq!(plan.effect_notation, "1d6+1");
    }

    #[test]
    fn bare_handed_actor_uses_default_damage() {
        let mut actor = fighter();
        actor.inventory.clear();
        let action = PlayerAction::attack("goblin-1");
        let plan =
            plan_player_action(&actor, &action, &[actor.clone()], &goblins(), &EncounterConfig::default())
                .unwrap();
        assert_eq!(plan.effect_notation, "1d6");
    }

    #[test]
    fn attack_without_target_is_target_required() {
        let actor = fighter();
        let action = PlayerAction {
            kind: "attack".to_string(),
            target: None,
            text: None,
        };
        let fault =
            plan_player_action(&actor, &action, &[actor.clone()], &goblins(), &EncounterConfig::default())
                .unwrap_err();
        assert_eq!(fault.code, ActionErrorCode::TargetRequired);
    }

    #[test]
    fn ambiguous_target_lists_candidates() {
        let actor = fighter();
        let action = PlayerAction::attack("Goblin");
        let fault =
            plan_player_action(&actor, &action, &[actor.clone()], &goblins(), &EncounterConfig::default())
                .unwrap_err();
        assert_eq!(fault.code, ActionErrorCode::TargetAmbiguous);
        assert!(fault.text.contains("Goblin 1"));
        assert!(fault.text.contains("Goblin 2"));
    }

    #[test]
    fn unknown_target_is_not_found() {
        let actor = fighter();
        let action = PlayerAction::attack("dragón");
        let fault =
            plan_player_action(&actor, &action, &[actor.clone()], &goblins(), &EncounterConfig::default())
                .unwrap_err();
        assert_eq!(fault.code, ActionErrorCode::TargetNotFound);
    }

    #[test]
    fn unknown_action_label_is_invalid_action() {
        let actor = fighter();
        let action = PlayerAction {
            kind: "bailar".to_string(),
            target: Some("goblin-1".to_string()),
            text: None,
        };
        let fault =
            plan_player_action(&actor, &action, &[actor.clone()], &goblins(), &EncounterConfig::default())
                .unwrap_err();
        assert_eq!(fault.code, ActionErrorCode::InvalidAction);
    }

    #[test]
    fn heal_without_target_lands_on_self() {
        let actor = fighter();
        let action = PlayerAction {
            kind: "curar".to_string(),
            target: None,
            text: None,
        };
        let plan =
            plan_player_action(&actor, &action, &[actor.clone()], &goblins(), &EncounterConfig::default())
                .unwrap();
        assert_eq!(plan.target, ActionTarget::Ally(0));
        assert_eq!(plan.target_display, "Alira");
        assert_eq!(plan.effect_notation, DEFAULT_HEAL);
    }

    #[test]
    fn tactician_requested_rolls_feed_the_plan() {
        let decision = TacticianDecision {
            action: "attack".to_string(),
            target: Some("Alira".to_string()),
            requested_rolls: vec![
                RollRequest::new("1d20+4", "ataque", "Goblin"),
                RollRequest::new("1d6+2", "daño", "Goblin"),
            ],
        };
        let party = vec![fighter()];
        let plan = plan_tactician_decision(
            "Goblin",
            &decision,
            &party,
            &goblins(),
            &EncounterConfig::default(),
        )
        .unwrap();
        assert_eq!(plan.attack_notation, "1d20+4");
        assert_eq!(plan.effect_notation, "1d6+2");
        assert_eq!(plan.target, ActionTarget::Ally(0));
    }

    #[test]
    fn tactician_missing_rolls_use_encounter_defaults() {
        let decision = TacticianDecision {
            action: "attack".to_string(),
            target: Some("Alira".to_string()),
            requested_rolls: Vec::new(),
        };
        let party = vec![fighter()];
        let plan = plan_tactician_decision(
            "Goblin",
            &decision,
            &party,
            &goblins(),
            &EncounterConfig::default(),
        )
        .unwrap();
        assert_eq!(plan.attack_notation, "1d20+2");
        assert_eq!(plan.effect_notation, "1d6");
    }

    #[test]
    fn tactician_without_target_is_target_required() {
        let decision = TacticianDecision {
            action: "attack".to_string(),
            target: None,
            requested_rolls: Vec::new(),
        };
        let fault = plan_tactician_decision(
            "Goblin",
            &decision,
            &[],
            &goblins(),
            &EncounterConfig::default(),
        )
        .unwrap_err();
        assert_eq!(fault.code, ActionErrorCode::TargetRequired);
    }
}
