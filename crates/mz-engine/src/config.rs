//! Configuration for an encounter.

/// Tunable encounter behavior.
#[derive(Debug, Clone)]
pub struct EncounterConfig {
    /// Armor class assumed when a target's AC is missing or invalid.
    pub default_armor_class: i32,
    /// Attack notation for enemies whose stats carry no attack bonus.
    pub default_enemy_attack: String,
    /// Damage notation for attackers with no usable weapon.
    pub default_damage: String,
    /// Pause after each automated turn instead of chaining to the next
    /// combatant, so a UI can show the turn and resume with `continue_turn`.
    pub pause_after_ai_turn: bool,
    /// How many narration messages to keep for tactician context.
    pub narration_history: usize,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            default_armor_class: 10,
            default_enemy_attack: "1d20+2".to_string(),
            default_damage: "1d6".to_string(),
            pause_after_ai_turn: false,
            narration_history: 10,
        }
    }
}

impl EncounterConfig {
    /// Pause after each automated turn.
    pub fn with_ai_pauses(mut self) -> Self {
        self.pause_after_ai_turn = true;
        self
    }

    /// Set the default armor class.
    pub fn with_default_armor_class(mut self, ac: i32) -> Self {
        self.default_armor_class = ac;
        self
    }

    /// Set the narration history length (at least 1).
    pub fn with_narration_history(mut self, len: usize) -> Self {
        self.narration_history = len.max(1);
        self
    }
}
