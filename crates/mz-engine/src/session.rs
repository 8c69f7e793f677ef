//! The combat session: one encounter's state and its phase machine.
//!
//! A session owns the party, the enemy roster, and the initiative order,
//! and drives turns through the planner and executor. Automated turns chain
//! until a human combatant is reached (or, with
//! [`EncounterConfig::pause_after_ai_turn`], one automated turn at a time).
//! Callers serialize invocations per session; the session itself holds no
//! locks.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use mz_core::{
    ActionErrorCode, CharacterState, Combatant, ControlKind, EnemyState, Message, Role,
    RollRecord, RollRequest,
};
use mz_rules::{CombatEnd, check_end_of_combat, hp_status, is_incapacitated};

use crate::config::EncounterConfig;
use crate::error::{EngineError, EngineResult};
use crate::executor::{ActionExecutor, ActionOutcome, ActionPlan};
use crate::ports::{CombatantCondition, Oracles, TacticianContext};
use crate::roster;
use crate::target::display_names;
use crate::trigger::SurpriseSide;
use crate::turn::{PlayerAction, TurnFault, plan_player_action, plan_tactician_decision};

/// Where the session is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// A turn is beginning; skip checks run here.
    TurnStart,
    /// A human combatant's action is awaited.
    WaitingForAction,
    /// An action is being resolved.
    ProcessingAction,
    /// The action resolved; outcome messages are final.
    ActionResolved,
    /// The turn is over; the order advances.
    TurnEnd,
    /// The encounter is over.
    CombatEnd,
}

/// What the caller hands the session for the current turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnRequest {
    /// The active human combatant's declared action.
    Action(PlayerAction),
    /// Advance past the current combatant and keep processing.
    Continue,
}

/// Everything one processing call produced.
#[derive(Debug, Clone)]
pub struct TurnReport {
    /// Ordered messages for the chat log.
    pub messages: Vec<Message>,
    /// Every dice roll made during the call.
    pub rolls: Vec<RollRecord>,
    /// Party roster after the call.
    pub party: Vec<CharacterState>,
    /// Visible enemies after the call.
    pub enemies: Vec<EnemyState>,
    /// Session phase after the call.
    pub phase: Phase,
    /// Index of the active combatant in the initiative order.
    pub turn_index: usize,
    /// Display name of the active combatant, when combat continues.
    pub active: Option<String>,
    /// Recoverable condition, when the turn could not be consumed.
    pub error: Option<ActionErrorCode>,
    /// Why the encounter ended, when it did.
    pub end_reason: Option<String>,
}

impl TurnReport {
    /// True when the call resolved an action or ended the encounter.
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// One encounter in progress.
pub struct CombatSession {
    id: Uuid,
    config: EncounterConfig,
    oracles: Oracles,
    party: Vec<CharacterState>,
    enemies: Vec<EnemyState>,
    order: Vec<Combatant>,
    turn_index: usize,
    phase: Phase,
    narration: Vec<String>,
    location: Option<String>,
    open_doors: Vec<String>,
}

impl CombatSession {
    /// Create a session over a party and an enemy roster. Combat has not
    /// started until [`CombatSession::start`] runs.
    pub fn new(
        party: Vec<CharacterState>,
        enemies: Vec<EnemyState>,
        oracles: Oracles,
        config: EncounterConfig,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            oracles,
            party,
            enemies,
            order: Vec::new(),
            turn_index: 0,
            phase: Phase::TurnStart,
            narration: Vec::new(),
            location: None,
            open_doors: Vec::new(),
        }
    }

    /// Set the location description handed to the tactician.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// The session's unique identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The party roster.
    pub fn party(&self) -> &[CharacterState] {
        &self.party
    }

    /// Enemies the party can currently see.
    pub fn visible_enemies(&self) -> Vec<EnemyState> {
        roster::visible(&self.enemies)
    }

    /// The initiative order, fixed at combat start.
    pub fn order(&self) -> &[Combatant] {
        &self.order
    }

    /// The combatant whose turn it is.
    pub fn active_combatant(&self) -> Option<&Combatant> {
        self.order.get(self.turn_index)
    }

    /// Record a door opened during exploration, keyed `location:direction`.
    /// Persisted across snapshots so re-entering a room finds it open.
    pub fn open_door(&mut self, location_id: &str, direction: &str) {
        let key = format!("{location_id}:{direction}");
        if !self.open_doors.contains(&key) {
            self.open_doors.push(key);
        }
    }

    /// Whether a door has been recorded as open.
    pub fn door_open(&self, location_id: &str, direction: &str) -> bool {
        self.open_doors
            .contains(&format!("{location_id}:{direction}"))
    }

    /// Reveal a concealed enemy by id, keeping its roster position so
    /// display ordinals stay stable.
    pub fn reveal_enemy(&mut self, id: &str) {
        if let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == id) {
            *enemy = roster::reveal(enemy);
        }
    }

    /// Roll initiative, fix the order, and process turns up to the first
    /// human combatant.
    ///
    /// `surprise` marks one side as ambushed: those combatants lose their
    /// first turn. Initiative is a d20 plus dexterity for characters and a
    /// bare d20 for enemies; ties keep roster order (party first).
    pub async fn start(&mut self, surprise: Option<SurpriseSide>) -> EngineResult<TurnReport> {
        if self.party.is_empty() && self.enemies.is_empty() {
            return Err(EngineError::EmptyOrder);
        }
        let checkpoint = self.checkpoint();
        match self.start_inner(surprise).await {
            Ok(report) => Ok(report),
            Err(error) => {
                self.rollback(checkpoint);
                Err(error)
            }
        }
    }

    async fn start_inner(&mut self, surprise: Option<SurpriseSide>) -> EngineResult<TurnReport> {
        let mut order = Vec::new();
        for character in &self.party {
            let notation = format!("1d20{:+}", character.modifiers.dexterity);
            let request = RollRequest::new(
                notation,
                format!("Iniciativa de {}", character.name),
                character.name.clone(),
            );
            let roll = self.oracles.dice.roll(&request).await?;
            let role = match character.control {
                ControlKind::Player => Role::Player,
                ControlKind::Ai => Role::Companion,
            };
            order.push(Combatant {
                id: character.id.clone(),
                name: character.name.clone(),
                initiative: roll.total,
                control: character.control,
                role,
                surprised: surprise == Some(SurpriseSide::Enemy),
            });
        }
        let enemy_names = display_names(&self.enemies);
        for (enemy, display) in self.enemies.iter().zip(&enemy_names) {
            let request = RollRequest::new(
                "1d20",
                format!("Iniciativa de {display}"),
                display.clone(),
            );
            let roll = self.oracles.dice.roll(&request).await?;
            order.push(Combatant {
                id: enemy.id.clone(),
                name: display.clone(),
                initiative: roll.total,
                control: ControlKind::Ai,
                role: Role::Npc,
                surprised: surprise == Some(SurpriseSide::Party),
            });
        }
        // Stable: ties keep roster order, party first.
        order.sort_by_key(|c| std::cmp::Reverse(c.initiative));

        info!(session = %self.id, combatants = order.len(), "combat started");
        let mut messages = vec![Message::system("¡Comienza el combate!")];
        let listing = order
            .iter()
            .map(|c| format!("{} ({})", c.name, c.initiative))
            .collect::<Vec<_>>()
            .join(", ");
        messages.push(Message::system(format!("Orden de iniciativa: {listing}.")));

        self.order = order;
        self.turn_index = 0;
        self.phase = Phase::TurnStart;

        let mut report = self.drive_inner(None).await?;
        let mut all = messages;
        all.append(&mut report.messages);
        report.messages = all;
        Ok(report)
    }

    /// Process the current turn.
    ///
    /// With no request, automated turns run and the session stops at the
    /// first human combatant (phase `waiting_for_action`). With an action,
    /// the active human's turn resolves and automated turns chain after it.
    pub async fn process_current_turn(
        &mut self,
        request: Option<TurnRequest>,
    ) -> EngineResult<TurnReport> {
        if self.phase == Phase::CombatEnd || self.order.is_empty() {
            return Err(EngineError::NotInCombat);
        }
        match request {
            Some(TurnRequest::Continue) => self.continue_turn().await,
            Some(TurnRequest::Action(action)) => self.drive(Some(action)).await,
            None => self.drive(None).await,
        }
    }

    /// Resume a paused session.
    ///
    /// If the active combatant is human their turn is forfeited and the
    /// order advances; if automated, their turn is processed in place.
    pub async fn continue_turn(&mut self) -> EngineResult<TurnReport> {
        if self.phase == Phase::CombatEnd || self.order.is_empty() {
            return Err(EngineError::NotInCombat);
        }
        let checkpoint = self.checkpoint();
        let human_active = self
            .active_combatant()
            .is_some_and(|c| !c.control.is_automated());
        if human_active {
            self.advance();
        }
        match self.drive_inner(None).await {
            Ok(report) => Ok(report),
            Err(error) => {
                self.rollback(checkpoint);
                Err(error)
            }
        }
    }

    /// The turn loop. Consumes `action` for the first human turn reached.
    ///
    /// Transactional over oracle failures: if any oracle call errors, the
    /// session is restored to its state before this call, so no partially
    /// processed chain of turns is committed.
    async fn drive(&mut self, action: Option<PlayerAction>) -> EngineResult<TurnReport> {
        let checkpoint = self.checkpoint();
        match self.drive_inner(action).await {
            Ok(report) => Ok(report),
            Err(error) => {
                self.rollback(checkpoint);
                Err(error)
            }
        }
    }

    async fn drive_inner(&mut self, mut action: Option<PlayerAction>) -> EngineResult<TurnReport> {
        let mut messages = Vec::new();
        let mut rolls = Vec::new();
        // Bounded: a full cycle of pure skips means nobody can act.
        let mut skips = 0;

        loop {
            if let Some(end) = check_end_of_combat(&self.party, &self.enemies) {
                return Ok(self.finish(end, messages, rolls));
            }
            if skips > self.order.len() {
                debug!(session = %self.id, "no combatant able to act, pausing");
                self.phase = Phase::WaitingForAction;
                return Ok(self.report(messages, rolls, None));
            }

            self.phase = Phase::TurnStart;
            let active = self.order[self.turn_index].clone();

            if active.surprised {
                self.order[self.turn_index].surprised = false;
                messages.push(Message::system(format!(
                    "{} está sorprendido y pierde su turno.",
                    active.name
                )));
                self.advance();
                skips += 1;
                continue;
            }
            if self.cannot_act(&active) {
                self.advance();
                skips += 1;
                continue;
            }

            if active.control.is_automated() {
                match self.run_automated_turn(&active, &mut messages, &mut rolls).await? {
                    TurnStep::Resolved => {
                        self.phase = Phase::TurnEnd;
                        self.advance();
                        if self.config.pause_after_ai_turn {
                            // A paused session awaits continue_turn.
                            self.phase = Phase::WaitingForAction;
                            return Ok(self.report(messages, rolls, None));
                        }
                        skips = 0;
                        continue;
                    }
                    TurnStep::Pending(code) => {
                        self.phase = Phase::WaitingForAction;
                        return Ok(self.report(messages, rolls, Some(code)));
                    }
                }
            }

            // Human turn.
            let Some(declared) = action.take() else {
                self.phase = Phase::WaitingForAction;
                return Ok(self.report(messages, rolls, None));
            };
            match self.run_human_turn(&active, &declared, &mut messages, &mut rolls).await? {
                TurnStep::Resolved => {
                    self.phase = Phase::TurnEnd;
                    self.advance();
                    skips = 0;
                }
                TurnStep::Pending(code) => {
                    self.phase = Phase::WaitingForAction;
                    return Ok(self.report(messages, rolls, Some(code)));
                }
            }
        }
    }

    async fn run_human_turn(
        &mut self,
        active: &Combatant,
        action: &PlayerAction,
        messages: &mut Vec<Message>,
        rolls: &mut Vec<RollRecord>,
    ) -> EngineResult<TurnStep> {
        let Some(actor) = self.party.iter().find(|c| c.id == active.id).cloned() else {
            messages.push(Message::system(format!(
                "No encuentro la ficha de {}.",
                active.name
            )));
            return Ok(TurnStep::Pending(ActionErrorCode::PlayerNotFound));
        };

        self.phase = Phase::ProcessingAction;
        let plan =
            match plan_player_action(&actor, action, &self.party, &self.enemies, &self.config) {
                Ok(plan) => plan,
                Err(TurnFault { code, text }) => {
                    messages.push(Message::system(text));
                    return Ok(TurnStep::Pending(code));
                }
            };
        let outcome = self.execute_plan(&plan).await?;
        self.absorb(outcome, messages, rolls);
        Ok(TurnStep::Resolved)
    }

    async fn run_automated_turn(
        &mut self,
        active: &Combatant,
        messages: &mut Vec<Message>,
        rolls: &mut Vec<RollRecord>,
    ) -> EngineResult<TurnStep> {
        let context = self.tactician_context(active);
        let Some(decision) = self.oracles.tactician.decide(&context).await? else {
            messages.push(Message::system(format!(
                "{} duda y no hace nada.",
                active.name
            )));
            return Ok(TurnStep::Pending(ActionErrorCode::NoAction));
        };

        self.phase = Phase::ProcessingAction;
        let mut plan = match plan_tactician_decision(
            &active.name,
            &decision,
            &self.party,
            &self.enemies,
            &self.config,
        ) {
            Ok(plan) => plan,
            Err(TurnFault { code, text }) => {
                messages.push(Message::system(text));
                return Ok(TurnStep::Pending(code));
            }
        };

        // An automated companion without requested rolls attacks off its own
        // sheet, not the enemy defaults.
        if active.role.is_party() && decision.requested_rolls.is_empty() {
            if let Some(actor) = self.party.iter().find(|c| c.id == active.id) {
                plan.attack_notation = format!("1d20{:+}", actor.attack_modifier());
                if let Some(damage) = actor.first_weapon().and_then(|w| w.damage.clone()) {
                    plan.effect_notation = damage;
                }
            }
        }

        let outcome = self.execute_plan(&plan).await?;
        self.absorb(outcome, messages, rolls);
        Ok(TurnStep::Resolved)
    }

    async fn execute_plan(&mut self, plan: &ActionPlan) -> EngineResult<ActionOutcome> {
        let executor = ActionExecutor::new(&self.config, &self.oracles);
        let outcome = executor
            .execute(plan, &mut self.party, &mut self.enemies)
            .await?;
        self.phase = Phase::ActionResolved;
        Ok(outcome)
    }

    fn absorb(
        &mut self,
        outcome: ActionOutcome,
        messages: &mut Vec<Message>,
        rolls: &mut Vec<RollRecord>,
    ) {
        for message in &outcome.messages {
            self.narration.push(message.text.clone());
        }
        let keep = self.config.narration_history;
        if self.narration.len() > keep {
            let drop = self.narration.len() - keep;
            self.narration.drain(..drop);
        }
        messages.extend(outcome.messages);
        rolls.extend(outcome.rolls);
    }

    fn tactician_context(&self, active: &Combatant) -> TacticianContext {
        let party = self
            .party
            .iter()
            .map(|c| CombatantCondition {
                id: c.id.clone(),
                name: c.name.clone(),
                band: hp_status(c.hit_points.current, c.hit_points.max).to_string(),
            })
            .collect();
        let names = display_names(&self.enemies);
        let enemies = self
            .enemies
            .iter()
            .zip(&names)
            .filter(|(e, _)| !e.is_hidden() && e.is_alive())
            .map(|(e, display)| CombatantCondition {
                id: e.id.clone(),
                name: display.clone(),
                band: e
                    .hit_points
                    .map_or_else(|| "Unknown".to_string(), |hp| {
                        hp_status(hp.current, hp.max).to_string()
                    }),
            })
            .collect();
        TacticianContext {
            actor: active.clone(),
            party,
            enemies,
            recent_narration: self.narration.clone(),
            location: self.location.clone(),
        }
    }

    /// True when a combatant cannot take their turn: a downed character, a
    /// defeated enemy, or a still-concealed one.
    fn cannot_act(&self, combatant: &Combatant) -> bool {
        if combatant.role.is_party() {
            self.party
                .iter()
                .find(|c| c.id == combatant.id)
                .is_none_or(|c| is_incapacitated(&c.hit_points, c.is_dead))
        } else {
            self.enemies
                .iter()
                .find(|e| e.id == combatant.id)
                .is_none_or(|e| !e.is_alive() || e.is_hidden())
        }
    }

    fn advance(&mut self) {
        self.turn_index = (self.turn_index + 1) % self.order.len();
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            party: self.party.clone(),
            enemies: self.enemies.clone(),
            order: self.order.clone(),
            turn_index: self.turn_index,
            phase: self.phase,
            narration: self.narration.clone(),
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        self.party = checkpoint.party;
        self.enemies = checkpoint.enemies;
        self.order = checkpoint.order;
        self.turn_index = checkpoint.turn_index;
        self.phase = checkpoint.phase;
        self.narration = checkpoint.narration;
    }

    fn finish(
        &mut self,
        end: CombatEnd,
        mut messages: Vec<Message>,
        rolls: Vec<RollRecord>,
    ) -> TurnReport {
        info!(session = %self.id, reason = %end, "combat ended");
        let text = match end {
            CombatEnd::EnemiesDefeated => "¡Victoria! Todos los enemigos han sido derrotados.",
            CombatEnd::PartyDead => "El grupo ha caído. Todos han muerto.",
            CombatEnd::PartyUnconscious => "Todo el grupo yace inconsciente.",
        };
        messages.push(Message::system(text));
        self.phase = Phase::CombatEnd;
        self.order.clear();
        self.turn_index = 0;
        self.enemies.clear();
        TurnReport {
            messages,
            rolls,
            party: self.party.clone(),
            enemies: Vec::new(),
            phase: Phase::CombatEnd,
            turn_index: 0,
            active: None,
            error: None,
            end_reason: Some(end.to_string()),
        }
    }

    /// Capture a restorable snapshot of the encounter.
    pub fn snapshot(&self) -> crate::snapshot::EncounterSnapshot {
        crate::snapshot::EncounterSnapshot {
            id: self.id,
            party: self.party.clone(),
            enemies: self.enemies.clone(),
            order: self.order.clone(),
            turn_index: self.turn_index as i64,
            phase: self.phase,
            in_combat: !self.order.is_empty() && self.phase != Phase::CombatEnd,
            open_doors: self.open_doors.clone(),
            narration: self.narration.clone(),
            location: self.location.clone(),
            saved_at: chrono::Utc::now(),
        }
    }

    /// Rebuild a session from a snapshot, supplying fresh collaborators and
    /// configuration. An out-of-range turn index is clamped.
    pub fn restore(
        snapshot: crate::snapshot::EncounterSnapshot,
        oracles: Oracles,
        config: EncounterConfig,
    ) -> Self {
        let turn_index = snapshot.clamped_turn_index();
        Self {
            id: snapshot.id,
            config,
            oracles,
            party: snapshot.party,
            enemies: snapshot.enemies,
            order: snapshot.order,
            turn_index,
            phase: snapshot.phase,
            narration: snapshot.narration,
            location: snapshot.location,
            open_doors: snapshot.open_doors,
        }
    }

    fn report(
        &self,
        messages: Vec<Message>,
        rolls: Vec<RollRecord>,
        error: Option<ActionErrorCode>,
    ) -> TurnReport {
        TurnReport {
            messages,
            rolls,
            party: self.party.clone(),
            enemies: self.visible_enemies(),
            phase: self.phase,
            turn_index: self.turn_index,
            active: self.active_combatant().map(|c| c.name.clone()),
            error,
            end_reason: None,
        }
    }
}

/// Pre-call copy of the mutable encounter state, restored when an oracle
/// call fails mid-chain.
struct Checkpoint {
    party: Vec<CharacterState>,
    enemies: Vec<EnemyState>,
    order: Vec<Combatant>,
    turn_index: usize,
    phase: Phase,
    narration: Vec<String>,
}

/// Internal outcome of attempting one combatant's turn.
enum TurnStep {
    /// The turn was consumed.
    Resolved,
    /// The turn stays pending with this condition.
    Pending(ActionErrorCode),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Phase::WaitingForAction).unwrap(),
            "\"waiting_for_action\""
        );
        assert_eq!(
            serde_json::to_string(&Phase::CombatEnd).unwrap(),
            "\"combat_end\""
        );
    }

    #[test]
    fn report_success_tracks_error() {
        let report = TurnReport {
            messages: Vec::new(),
            rolls: Vec::new(),
            party: Vec::new(),
            enemies: Vec::new(),
            phase: Phase::WaitingForAction,
            turn_index: 0,
            active: None,
            error: None,
            end_reason: None,
        };
        assert!(report.success());
        let failed = TurnReport {
            error: Some(ActionErrorCode::TargetNotFound),
            ..report
        };
        assert!(!failed.success());
    }
}
