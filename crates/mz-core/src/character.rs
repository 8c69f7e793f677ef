//! Character state: hit points, ability modifiers, and inventory.

use serde::{Deserialize, Serialize};

use crate::combatant::ControlKind;
use crate::text;

/// A current/maximum hit-point pair.
///
/// `current` may transiently hold out-of-range values while damage is being
/// applied; `mz_rules::resolve_hit_points` restores the `0 ≤ current ≤ max`
/// invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    /// Current hit points.
    pub current: i32,
    /// Maximum hit points.
    pub max: i32,
}

impl HitPoints {
    /// Create a hit-point pair at full health.
    pub fn full(max: i32) -> Self {
        Self { current: max, max }
    }

    /// Returns true if current hit points are at or below zero.
    pub fn is_depleted(&self) -> bool {
        self.current <= 0
    }
}

/// Ability-score modifiers used for attack and check rolls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityModifiers {
    /// Strength modifier (melee attacks).
    #[serde(default)]
    pub strength: i32,
    /// Dexterity modifier (initiative).
    #[serde(default)]
    pub dexterity: i32,
    /// Constitution modifier.
    #[serde(default)]
    pub constitution: i32,
    /// Intelligence modifier.
    #[serde(default)]
    pub intelligence: i32,
    /// Wisdom modifier.
    #[serde(default)]
    pub wisdom: i32,
    /// Charisma modifier.
    #[serde(default)]
    pub charisma: i32,
}

/// A named inventory item with an optional damage die.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item name as shown to the player ("Espada corta").
    pub name: String,
    /// Free-text description from the adventure data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Damage-die notation ("1d6+1") when the item is a weapon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<String>,
}

impl Item {
    /// Create a plain item with no description or damage die.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            damage: None,
        }
    }

    /// Create a weapon with a damage-die notation.
    pub fn weapon(name: impl Into<String>, damage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            damage: Some(damage.into()),
        }
    }

    /// Returns true if this item looks usable as a weapon: it either carries
    /// a damage die or its description mentions one ("1d6") or a blade.
    pub fn looks_like_weapon(&self) -> bool {
        if self.damage.is_some() {
            return true;
        }
        let Some(desc) = &self.description else {
            return false;
        };
        let desc = text::normalize(desc);
        desc.contains("dano") || desc.contains("arma") || contains_die_notation(&desc)
    }
}

/// Returns true if the text contains a digit immediately followed by 'd'
/// and another digit, e.g. "1d6".
fn contains_die_notation(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.windows(3).any(|w| {
        w[0].is_ascii_digit() && (w[1] == b'd' || w[1] == b'D') && w[2].is_ascii_digit()
    })
}

/// The full mechanical state of a player character or companion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterState {
    /// Canonical identifier, stable across the encounter.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Current and maximum hit points.
    pub hit_points: HitPoints,
    /// Armor class.
    pub armor_class: i32,
    /// Ability-score modifiers.
    #[serde(default)]
    pub modifiers: AbilityModifiers,
    /// Proficiency bonus added to attack rolls.
    #[serde(default)]
    pub proficiency: i32,
    /// Carried items.
    #[serde(default)]
    pub inventory: Vec<Item>,
    /// Known ability names.
    #[serde(default)]
    pub abilities: Vec<String>,
    /// Who controls this character.
    pub control: ControlKind,
    /// Set when the character has died. Implies zero current hit points
    /// after resolution; zero hit points alone means merely unconscious.
    #[serde(default)]
    pub is_dead: bool,
}

impl CharacterState {
    /// Find an inventory item by name, ignoring case and accents.
    pub fn find_item(&self, name: &str) -> Option<&Item> {
        self.inventory.iter().find(|i| text::matches(&i.name, name))
    }

    /// The first inventory item that looks like a weapon, if any.
    pub fn first_weapon(&self) -> Option<&Item> {
        self.inventory.iter().find(|i| i.looks_like_weapon())
    }

    /// Attack modifier: strength plus proficiency.
    pub fn attack_modifier(&self) -> i32 {
        self.modifiers.strength + self.proficiency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter() -> CharacterState {
        CharacterState {
            id: "pc-1".to_string(),
            name: "Alira".to_string(),
            hit_points: HitPoints::full(20),
            armor_class: 14,
            modifiers: AbilityModifiers {
                strength: 3,
                dexterity: 1,
                ..AbilityModifiers::default()
            },
            proficiency: 2,
            inventory: vec![
                Item::new("Antorcha"),
                Item::weapon("Espada corta", "1d6+1"),
            ],
            abilities: vec!["Ataque poderoso".to_string()],
            control: ControlKind::Player,
            is_dead: false,
        }
    }

    #[test]
    fn full_hit_points() {
        let hp = HitPoints::full(12);
        assert_eq!(hp.current, 12);
        assert_eq!(hp.max, 12);
        assert!(!hp.is_depleted());
    }

    #[test]
    fn depleted_at_zero_and_below() {
        assert!(HitPoints { current: 0, max: 10 }.is_depleted());
        assert!(HitPoints { current: -4, max: 10 }.is_depleted());
    }

    #[test]
    fn find_item_ignores_case_and_accents() {
        let c = fighter();
        assert!(c.find_item("espada corta").is_some());
        assert!(c.find_item("ESPADA CORTA").is_some());
        assert!(c.find_item("lanza").is_none());
    }

    #[test]
    fn first_weapon_skips_non_weapons() {
        let c = fighter();
        assert_eq!(c.first_weapon().unwrap().name, "Espada corta");
    }

    #[test]
    fn weapon_detection_from_description() {
        let dagger = Item {
            name: "Daga".to_string(),
            description: Some("Una hoja corta que causa 1d4 de daño".to_string()),
            damage: None,
        };
        assert!(dagger.looks_like_weapon());

        let rope = Item {
            name: "Cuerda".to_string(),
            description: Some("Diez metros de cáñamo".to_string()),
            damage: None,
        };
        assert!(!rope.looks_like_weapon());
    }

    #[test]
    fn attack_modifier_combines_strength_and_proficiency() {
        assert_eq!(fighter().attack_modifier(), 5);
    }

    #[test]
    fn serde_round_trip() {
        let c = fighter();
        let json = serde_json::to_string(&c).unwrap();
        let back: CharacterState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
