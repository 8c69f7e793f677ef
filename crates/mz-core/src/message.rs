//! Engine messages and dice-roll records.
//!
//! Messages are what the caller shows in the chat log; roll records mirror
//! the dice-roller collaborator contract so the UI can render every die that
//! was thrown during a turn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who a message speaks as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Mechanical status text from the engine itself.
    System,
    /// Prose from the narration oracle.
    Narrator,
}

/// An ordered, timestamped message produced while processing a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message channel.
    pub kind: MessageKind,
    /// Message text.
    pub text: String,
    /// When the message was produced.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a system message timestamped now.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::System,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a narrator message timestamped now.
    pub fn narrator(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Narrator,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Outcome classification attached to a dice roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollOutcome {
    /// The roll met its target.
    Success,
    /// The roll missed its target.
    Fail,
    /// Natural maximum.
    Crit,
    /// Natural minimum.
    #[serde(rename = "pifia")]
    Fumble,
    /// No target to compare against.
    Neutral,
}

/// A request sent to the dice-roller collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRequest {
    /// Dice notation, e.g. "1d20+5".
    pub notation: String,
    /// Human-readable purpose ("Tirada de ataque de Alira").
    pub description: String,
    /// Name of the combatant rolling.
    pub roller: String,
}

impl RollRequest {
    /// Create a roll request.
    pub fn new(
        notation: impl Into<String>,
        description: impl Into<String>,
        roller: impl Into<String>,
    ) -> Self {
        Self {
            notation: notation.into(),
            description: description.into(),
            roller: roller.into(),
        }
    }
}

/// What the dice-roller collaborator returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    /// Each individual die value.
    pub rolls: Vec<i32>,
    /// Flat modifier added to the dice.
    pub modifier: i32,
    /// Dice sum plus modifier.
    pub total: i32,
    /// Outcome classification.
    pub outcome: RollOutcome,
}

/// A request/result pair kept for the turn's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollRecord {
    /// The request that was sent.
    pub request: RollRequest,
    /// What came back.
    pub result: RollResult,
    /// When the roll resolved.
    pub timestamp: DateTime<Utc>,
}

impl RollRecord {
    /// Pair a request with its result, timestamped now.
    pub fn new(request: RollRequest, result: RollResult) -> Self {
        Self {
            request,
            result,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors() {
        let m = Message::system("El goblin cae.");
        assert_eq!(m.kind, MessageKind::System);
        let m = Message::narrator("La sala queda en silencio.");
        assert_eq!(m.kind, MessageKind::Narrator);
    }

    #[test]
    fn fumble_serializes_as_pifia() {
        let json = serde_json::to_string(&RollOutcome::Fumble).unwrap();
        assert_eq!(json, "\"pifia\"");
        let back: RollOutcome = serde_json::from_str("\"pifia\"").unwrap();
        assert_eq!(back, RollOutcome::Fumble);
    }

    #[test]
    fn roll_record_pairs_request_and_result() {
        let req = RollRequest::new("1d20+3", "Tirada de ataque", "Alira");
        let res = RollResult {
            rolls: vec![14],
            modifier: 3,
            total: 17,
            outcome: RollOutcome::Neutral,
        };
        let rec = RollRecord::new(req.clone(), res.clone());
        assert_eq!(rec.request, req);
        assert_eq!(rec.result, res);
    }
}
