//! Action execution.
//!
//! One resolution path for every action, whoever chose it: attack rolls
//! against armor class, critical doubling, damage and healing application,
//! and the system messages describing what happened. Narration is
//! best-effort on top; a narrator failure never undoes a resolved action.

use tracing::warn;

use mz_core::{
    ActionKind, CharacterState, CombatActionResult, EnemyState, Message, RollOutcome, RollRecord,
    RollRequest, RollResult,
};
use mz_rules::{DiceNotation, apply_damage, apply_healing, critical_damage_notation};

use crate::config::EncounterConfig;
use crate::error::EngineResult;
use crate::ports::{NarrationSummary, Oracles};

/// Where a planned action lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTarget {
    /// The enemy at this roster index.
    Enemy(usize),
    /// The party member at this roster index.
    Ally(usize),
}

/// A fully resolved plan, ready to execute. By this point target references
/// have been resolved and notations chosen; execution only rolls and applies.
#[derive(Debug, Clone)]
pub struct ActionPlan {
    /// Acting combatant's display name.
    pub actor: String,
    /// What the actor is doing.
    pub kind: ActionKind,
    /// Attack-roll notation ("1d20+5"). Unused for heals.
    pub attack_notation: String,
    /// Damage or healing notation ("1d8+3").
    pub effect_notation: String,
    /// Who the action lands on.
    pub target: ActionTarget,
    /// The target's display name, as shown in messages.
    pub target_display: String,
}

/// Everything one executed action produced.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    /// The structured result.
    pub result: CombatActionResult,
    /// Ordered messages describing the action.
    pub messages: Vec<Message>,
    /// Every roll made while resolving it.
    pub rolls: Vec<RollRecord>,
}

/// Executes resolved action plans against the live rosters.
pub struct ActionExecutor<'a> {
    config: &'a EncounterConfig,
    oracles: &'a Oracles,
}

impl<'a> ActionExecutor<'a> {
    /// Create an executor over the encounter's config and collaborators.
    pub fn new(config: &'a EncounterConfig, oracles: &'a Oracles) -> Self {
        Self { config, oracles }
    }

    /// Execute one plan, mutating the rosters in place.
    pub async fn execute(
        &self,
        plan: &ActionPlan,
        party: &mut [CharacterState],
        enemies: &mut [EnemyState],
    ) -> EngineResult<ActionOutcome> {
        match plan.kind {
            ActionKind::Attack => self.execute_attack(plan, party, enemies).await,
            ActionKind::Heal => self.execute_heal(plan, party, enemies).await,
        }
    }

    async fn execute_attack(
        &self,
        plan: &ActionPlan,
        party: &mut [CharacterState],
        enemies: &mut [EnemyState],
    ) -> EngineResult<ActionOutcome> {
        let mut messages = Vec::new();
        let mut rolls = Vec::new();

        let armor_class = self.target_armor_class(&plan.target, party, enemies);
        let hp_before = current_hp(&plan.target, party, enemies);

        let attack_request = RollRequest::new(
            plan.attack_notation.clone(),
            format!("Tirada de ataque de {}", plan.actor),
            plan.actor.clone(),
        );
        let attack = self.oracles.dice.roll(&attack_request).await?;
        rolls.push(RollRecord::new(attack_request, attack.clone()));

        let (critical, fumble) = classify_attack(&plan.attack_notation, &attack);
        let hit = !fumble && (critical || attack.total >= armor_class);

        if !hit {
            let text = if fumble {
                format!(
                    "¡Pifia! {} falla estrepitosamente su ataque contra {}.",
                    plan.actor, plan.target_display
                )
            } else {
                format!(
                    "{} falla su ataque contra {}.",
                    plan.actor, plan.target_display
                )
            };
            messages.push(Message::system(text));
            let result = CombatActionResult {
                hit: false,
                critical: false,
                fumble,
                damage: 0,
                healing: 0,
                target_killed: false,
                target_unconscious: false,
                party: party.to_vec(),
                enemies: enemies.to_vec(),
            };
            self.narrate(plan, &result, hp_before, &mut messages).await;
            return Ok(ActionOutcome {
                result,
                messages,
                rolls,
            });
        }

        let damage_notation = critical_damage_notation(&plan.effect_notation, critical);
        let damage_request = RollRequest::new(
            damage_notation,
            format!("Tirada de daño de {}", plan.actor),
            plan.actor.clone(),
        );
        let damage_roll = self.oracles.dice.roll(&damage_request).await?;
        let damage = damage_roll.total.max(0);
        rolls.push(RollRecord::new(damage_request, damage_roll));

        let mut target_killed = false;
        let mut target_unconscious = false;

        let prefix = if critical { "¡Crítico! " } else { "" };
        messages.push(Message::system(format!(
            "{}{} golpea a {} y causa {} puntos de daño.",
            prefix, plan.actor, plan.target_display, damage
        )));

        match plan.target {
            ActionTarget::Enemy(i) => {
                let enemy = &mut enemies[i];
                if let Some(hp) = enemy.hit_points {
                    let applied = apply_damage(hp, damage);
                    enemy.hit_points = Some(applied.hit_points);
                    if applied.dropped {
                        target_killed = true;
                        messages.push(Message::system(format!(
                            "{} ha sido derrotado.",
                            plan.target_display
                        )));
                    }
                }
            }
            ActionTarget::Ally(i) => {
                let character = &mut party[i];
                let applied = apply_damage(character.hit_points, damage);
                character.hit_points = applied.hit_points;
                if applied.massive {
                    character.is_dead = true;
                    target_killed = true;
                    messages.push(Message::system(format!(
                        "¡Daño masivo! {} muere en el acto.",
                        plan.target_display
                    )));
                    messages.push(Message::system(format!(
                        "{} ha acabado con {}.",
                        plan.actor, plan.target_display
                    )));
                } else if applied.dropped {
                    target_unconscious = true;
                    messages.push(Message::system(format!(
                        "{} cae inconsciente.",
                        plan.target_display
                    )));
                }
            }
        }

        let result = CombatActionResult {
            hit: true,
            critical,
            fumble: false,
            damage,
            healing: 0,
            target_killed,
            target_unconscious,
            party: party.to_vec(),
            enemies: enemies.to_vec(),
        };
        self.narrate(plan, &result, hp_before, &mut messages).await;
        Ok(ActionOutcome {
            result,
            messages,
            rolls,
        })
    }

    async fn execute_heal(
        &self,
        plan: &ActionPlan,
        party: &mut [CharacterState],
        enemies: &mut [EnemyState],
    ) -> EngineResult<ActionOutcome> {
        let mut messages = Vec::new();
        let mut rolls = Vec::new();
        let hp_before = current_hp(&plan.target, party, enemies);

        let heal_request = RollRequest::new(
            plan.effect_notation.clone(),
            format!("Tirada de curación de {}", plan.actor),
            plan.actor.clone(),
        );
        let heal_roll = self.oracles.dice.roll(&heal_request).await?;
        let healing = heal_roll.total.max(0);
        rolls.push(RollRecord::new(heal_request, heal_roll));

        match plan.target {
            ActionTarget::Ally(i) => {
                let character = &mut party[i];
                character.hit_points = apply_healing(character.hit_points, healing);
            }
            ActionTarget::Enemy(i) => {
                // Healing an enemy is unusual but not forbidden.
                let enemy = &mut enemies[i];
                if let Some(hp) = enemy.hit_points {
                    enemy.hit_points = Some(apply_healing(hp, healing));
                }
            }
        }

        messages.push(Message::system(format!(
            "{} cura a {} y restaura {} puntos de vida.",
            plan.actor, plan.target_display, healing
        )));

        let result = CombatActionResult {
            hit: false,
            critical: false,
            fumble: false,
            damage: 0,
            healing,
            target_killed: false,
            target_unconscious: false,
            party: party.to_vec(),
            enemies: enemies.to_vec(),
        };
        self.narrate(plan, &result, hp_before, &mut messages).await;
        Ok(ActionOutcome {
            result,
            messages,
            rolls,
        })
    }

    fn target_armor_class(
        &self,
        target: &ActionTarget,
        party: &[CharacterState],
        enemies: &[EnemyState],
    ) -> i32 {
        match *target {
            ActionTarget::Ally(i) => party[i].armor_class,
            ActionTarget::Enemy(i) => enemies[i].armor_class.unwrap_or_else(|| {
                warn!(
                    enemy = %enemies[i].id,
                    default = self.config.default_armor_class,
                    "enemy has no armor class, using default"
                );
                self.config.default_armor_class
            }),
        }
    }

    /// Ask the narrator for prose over the resolved action. Failures are
    /// logged and swallowed.
    async fn narrate(
        &self,
        plan: &ActionPlan,
        result: &CombatActionResult,
        hp_before: i32,
        messages: &mut Vec<Message>,
    ) {
        let hp_after = match plan.target {
            ActionTarget::Ally(i) => result.party[i].hit_points.current,
            ActionTarget::Enemy(i) => result.enemies[i]
                .hit_points
                .map_or(hp_before, |hp| hp.current),
        };
        let summary = NarrationSummary {
            attacker: plan.actor.clone(),
            target: plan.target_display.clone(),
            action: plan.kind.to_string(),
            hit: result.hit,
            critical: result.critical,
            fumble: result.fumble,
            damage: result.damage,
            healing: result.healing,
            hp_before,
            hp_after,
            target_killed: result.target_killed,
            target_unconscious: result.target_unconscious,
        };
        match self.oracles.narrator.narrate(&summary).await {
            Ok(prose) if !prose.trim().is_empty() => messages.push(Message::narrator(prose)),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "narrator failed, continuing without prose"),
        }
    }
}

/// Current hit points of the target, for narration context. Unknown enemy
/// hit points report zero.
fn current_hp(target: &ActionTarget, party: &[CharacterState], enemies: &[EnemyState]) -> i32 {
    match *target {
        ActionTarget::Ally(i) => party[i].hit_points.current,
        ActionTarget::Enemy(i) => enemies[i].hit_points.map_or(0, |hp| hp.current),
    }
}

/// Classify a natural critical or fumble on the attack die.
///
/// The natural value is the first rolled die compared against the sides of
/// the parsed attack notation; when the notation cannot be parsed, the
/// roller's own classification is trusted instead.
fn classify_attack(notation: &str, roll: &RollResult) -> (bool, bool) {
    if let (Ok(parsed), Some(&natural)) = (notation.parse::<DiceNotation>(), roll.rolls.first()) {
        let critical = parsed.count == 1 && natural as u32 == parsed.sides;
        let fumble = parsed.count == 1 && natural == 1;
        (critical, fumble)
    } else {
        (
            roll.outcome == RollOutcome::Crit,
            roll.outcome == RollOutcome::Fumble,
        )
    }
}
