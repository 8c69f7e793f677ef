//! Combat trigger evaluation.
//!
//! Pure decisions about whether an encounter should begin — from exploring
//! a location (ambushes, visible hostiles, failed stealth) or from
//! interacting with an object (mimics). Hidden state lives elsewhere; these
//! functions see only what they are handed.

use serde::{Deserialize, Serialize};

use mz_core::text;

/// A hazard attached to a location in the adventure data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hazard {
    /// Hazard identifier, matched against the party's detected set.
    pub id: String,
    /// What kind of hazard this is.
    pub kind: HazardKind,
    /// Interactable target this hazard is bound to (mimics).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Text describing how the hazard springs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_text: Option<String>,
}

/// Hazard kinds the trigger evaluator understands.
///
/// Serialized as a plain string; kinds this evaluator does not know land in
/// [`HazardKind::Other`] instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HazardKind {
    /// Enemies lying in wait; springs when undetected.
    Ambush,
    /// A disguised monster bound to an interactable.
    Mimic,
    /// A mechanical trap. Never starts combat through this evaluator.
    Trap,
    /// Anything else the data declares.
    Other(String),
}

impl From<String> for HazardKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ambush" => Self::Ambush,
            "mimic" => Self::Mimic,
            "trap" => Self::Trap,
            _ => Self::Other(value),
        }
    }
}

impl From<HazardKind> for String {
    fn from(kind: HazardKind) -> Self {
        match kind {
            HazardKind::Ambush => "ambush".to_string(),
            HazardKind::Mimic => "mimic".to_string(),
            HazardKind::Trap => "trap".to_string(),
            HazardKind::Other(name) => name,
        }
    }
}

/// Why combat started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerReason {
    /// An undetected ambush sprang.
    Ambush,
    /// Visible hostiles closed in.
    Proximity,
    /// A stealth attempt failed.
    StealthFail,
    /// A mimic revealed itself.
    Mimic,
}

/// Which side gets the surprise round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurpriseSide {
    /// The enemies surprise the party.
    Enemy,
    /// The party surprises the enemies.
    Party,
}

/// The evaluator's decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerDecision {
    /// Whether combat should begin.
    pub start_combat: bool,
    /// Why, when it should.
    pub reason: Option<TriggerReason>,
    /// Who is surprised, when anyone is.
    pub surprise: Option<SurpriseSide>,
    /// Trigger text from the hazard, when one supplied it.
    pub text: Option<String>,
}

impl TriggerDecision {
    fn none() -> Self {
        Self {
            start_combat: false,
            reason: None,
            surprise: None,
            text: None,
        }
    }
}

/// Evaluate combat triggers while exploring a location.
///
/// Any *undetected* ambush hazard forces combat with enemy surprise; a
/// detected ambush never triggers. Separately, visible hostiles trigger by
/// proximity unless a supplied stealth check succeeded; an explicitly failed
/// stealth check triggers with reason `stealth_fail` instead.
pub fn evaluate_exploration(
    hazards: &[Hazard],
    detected: &[String],
    hostiles_visible: bool,
    stealth_passed: Option<bool>,
) -> TriggerDecision {
    for hazard in hazards {
        let was_detected = detected.iter().any(|d| text::matches(d, &hazard.id));
        if hazard.kind == HazardKind::Ambush && !was_detected {
            return TriggerDecision {
                start_combat: true,
                reason: Some(TriggerReason::Ambush),
                surprise: Some(SurpriseSide::Enemy),
                text: hazard.trigger_text.clone(),
            };
        }
    }

    if hostiles_visible {
        return match stealth_passed {
            Some(true) => TriggerDecision::none(),
            Some(false) => TriggerDecision {
                start_combat: true,
                reason: Some(TriggerReason::StealthFail),
                surprise: None,
                text: None,
            },
            None => TriggerDecision {
                start_combat: true,
                reason: Some(TriggerReason::Proximity),
                surprise: None,
                text: None,
            },
        };
    }

    TriggerDecision::none()
}

/// Evaluate combat triggers when interacting with a target.
///
/// Only a mimic hazard bound to the target starts combat here; other hazard
/// kinds have consequences outside this engine.
pub fn evaluate_interaction(target_id: &str, hazards: &[Hazard]) -> TriggerDecision {
    for hazard in hazards {
        let bound = hazard
            .target
            .as_deref()
            .is_some_and(|t| text::matches(t, target_id));
        if hazard.kind == HazardKind::Mimic && bound {
            return TriggerDecision {
                start_combat: true,
                reason: Some(TriggerReason::Mimic),
                surprise: Some(SurpriseSide::Enemy),
                text: hazard.trigger_text.clone(),
            };
        }
    }
    TriggerDecision::none()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ambush() -> Hazard {
        Hazard {
            id: "emboscada-goblins".to_string(),
            kind: HazardKind::Ambush,
            target: None,
            trigger_text: Some("Los goblins saltan desde las sombras.".to_string()),
        }
    }

    fn mimic() -> Hazard {
        Hazard {
            id: "mimico-cofre".to_string(),
            kind: HazardKind::Mimic,
            target: Some("cofre-tesoro".to_string()),
            trigger_text: Some("El cofre abre una boca llena de dientes.".to_string()),
        }
    }

    #[test]
    fn undetected_ambush_triggers_with_enemy_surprise() {
        let decision = evaluate_exploration(&[ambush()], &[], false, None);
        assert!(decision.start_combat);
        assert_eq!(decision.reason, Some(TriggerReason::Ambush));
        assert_eq!(decision.surprise, Some(SurpriseSide::Enemy));
        assert!(decision.text.unwrap().contains("sombras"));
    }

    #[test]
    fn detected_ambush_never_triggers() {
        let detected = vec!["emboscada-goblins".to_string()];
        let decision = evaluate_exploration(&[ambush()], &detected, false, None);
        assert!(!decision.start_combat);
    }

    #[test]
    fn visible_hostiles_trigger_by_proximity() {
        let decision = evaluate_exploration(&[], &[], true, None);
        assert!(decision.start_combat);
        assert_eq!(decision.reason, Some(TriggerReason::Proximity));
        assert_eq!(decision.surprise, None);
    }

    #[test]
    fn successful_stealth_avoids_combat() {
        let decision = evaluate_exploration(&[], &[], true, Some(true));
        assert!(!decision.start_combat);
    }

    #[test]
    fn failed_stealth_has_its_own_reason() {
        let decision = evaluate_exploration(&[], &[], true, Some(false));
        assert!(decision.start_combat);
        assert_eq!(decision.reason, Some(TriggerReason::StealthFail));
    }

    #[test]
    fn mimic_bound_to_target_triggers_on_interaction() {
        let decision = evaluate_interaction("cofre-tesoro", &[mimic()]);
        assert!(decision.start_combat);
        assert_eq!(decision.reason, Some(TriggerReason::Mimic));
        assert_eq!(decision.surprise, Some(SurpriseSide::Enemy));
    }

    #[test]
    fn mimic_bound_elsewhere_does_not_trigger() {
        let decision = evaluate_interaction("puerta-norte", &[mimic()]);
        assert!(!decision.start_combat);
    }

    #[test]
    fn unknown_kind_string_deserializes_as_other() {
        let hazard: Hazard =
            serde_json::from_str(r#"{"id":"niebla-maldita","kind":"curse"}"#).unwrap();
        assert_eq!(hazard.kind, HazardKind::Other("curse".to_string()));
        assert!(!evaluate_exploration(&[hazard], &[], false, None).start_combat);
    }

    #[test]
    fn known_kind_strings_round_trip() {
        let json = serde_json::to_string(&HazardKind::Ambush).unwrap();
        assert_eq!(json, "\"ambush\"");
        assert_eq!(
            serde_json::from_str::<HazardKind>(&json).unwrap(),
            HazardKind::Ambush
        );
    }

    #[test]
    fn non_mimic_hazards_do_not_trigger_interactions() {
        let trap = Hazard {
            id: "foso".to_string(),
            kind: HazardKind::Trap,
            target: Some("palanca".to_string()),
            trigger_text: None,
        };
        let decision = evaluate_interaction("palanca", &[trap]);
        assert!(!decision.start_combat);
    }
}
