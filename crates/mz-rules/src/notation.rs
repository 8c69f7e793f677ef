//! Dice notation: parsing, rolling, and critical doubling.
//!
//! Notation is the `NdM+k` shape used across the adventure data ("1d8+3").
//! The dice-roller collaborator owns actual randomness in production; the
//! seeded roll here backs the built-in roller and deterministic tests.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::rngs::StdRng;

use mz_core::{RollOutcome, RollResult};

use crate::error::{RulesError, RulesResult};

/// A parsed `NdM+k` dice expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceNotation {
    /// Number of dice.
    pub count: u32,
    /// Sides per die.
    pub sides: u32,
    /// Flat modifier (may be negative).
    pub modifier: i32,
}

impl FromStr for DiceNotation {
    type Err = RulesError;

    fn from_str(s: &str) -> RulesResult<Self> {
        let raw = s.trim().to_lowercase();
        let invalid = || RulesError::InvalidNotation(s.to_string());

        let (dice_part, modifier) = match raw.find(['+', '-']) {
            Some(pos) => {
                let (dice, sign_and_value) = raw.split_at(pos);
                let value: i32 = sign_and_value.parse().map_err(|_| invalid())?;
                (dice, value)
            }
            None => (raw.as_str(), 0),
        };

        let (count_part, sides_part) = dice_part.split_once('d').ok_or_else(invalid)?;
        let count = if count_part.is_empty() {
            1
        } else {
            count_part.parse().map_err(|_| invalid())?
        };
        let sides: u32 = sides_part.parse().map_err(|_| invalid())?;
        if count == 0 || sides == 0 {
            return Err(invalid());
        }

        Ok(Self {
            count,
            sides,
            modifier,
        })
    }
}

impl fmt::Display for DiceNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "{m}"),
        }
    }
}

impl DiceNotation {
    /// Roll this expression with the given RNG.
    ///
    /// Single-die rolls are classified crit on the natural maximum and
    /// fumble on the natural minimum; everything else is neutral.
    pub fn roll(&self, rng: &mut StdRng) -> RollResult {
        let rolls: Vec<i32> = (0..self.count)
            .map(|_| rng.random_range(1..=self.sides) as i32)
            .collect();
        let total = rolls.iter().sum::<i32>() + self.modifier;
        let outcome = if self.count == 1 {
            match rolls[0] as u32 {
                v if v == self.sides => RollOutcome::Crit,
                1 => RollOutcome::Fumble,
                _ => RollOutcome::Neutral,
            }
        } else {
            RollOutcome::Neutral
        };
        RollResult {
            rolls,
            modifier: self.modifier,
            total,
            outcome,
        }
    }
}

/// Double the dice-count term of a damage expression on a critical hit.
///
/// The modifier is left untouched ("1d8+3" → "2d8+3"); a missing modifier is
/// treated as +0. Non-critical input and unparseable input are returned
/// unchanged.
pub fn critical_damage_notation(base: &str, critical: bool) -> String {
    if !critical {
        return base.to_string();
    }
    match base.parse::<DiceNotation>() {
        Ok(notation) => DiceNotation {
            count: notation.count * 2,
            ..notation
        }
        .to_string(),
        Err(_) => base.to_string(),
    }
}
