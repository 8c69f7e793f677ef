//! Per-location enemy pools: selection, filtering, and stat normalization.
//!
//! Adventure data reaches the engine as ad-hoc JSON: stats may live under
//! `{"stats":{"hp":..,"ac":..}}`, as a bare numeric `"hp"`, or be missing
//! entirely. Normalization happens exactly once, at load time; after that
//! the engine only sees canonical [`EnemyState`] values.

use std::collections::HashMap;

use serde_json::Value;

use mz_core::{Disposition, EnemyState, EnemyStatus, HitPoints, text};
use mz_rules::DEFAULT_MAX_HP;

/// Pick the enemy pool for a location: the per-location map entry when one
/// exists, else the supplied fallback list, else empty.
pub fn enemies_for_location(
    by_location: &HashMap<String, Vec<Value>>,
    location_id: &str,
    fallback: &[Value],
) -> Vec<EnemyState> {
    match by_location.get(location_id) {
        Some(pool) => normalize_all(pool),
        None => normalize_all(fallback),
    }
}

/// Normalize a list of raw enemy records, assigning positional instance ids
/// where the data carries none.
pub fn normalize_all(values: &[Value]) -> Vec<EnemyState> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| normalize(v, i))
        .collect()
}

/// Normalize one raw enemy record.
///
/// Hit points and armor class are read from `stats.hp`/`stats.ac` or bare
/// `hp`/`ac`; a numeric hp becomes `{current: hp, max: hp}`, and an absent
/// or unparseable hp defaults to 10. Missing instance ids are derived from
/// the type name and roster position so duplicates stay distinguishable.
pub fn normalize(value: &Value, index: usize) -> EnemyState {
    let name = value["name"]
        .as_str()
        .or_else(|| value["type"].as_str())
        .unwrap_or("Criatura")
        .to_string();

    let id = value["id"].as_str().map_or_else(
        || format!("{}-{}", text::normalize(&name).replace(' ', "-"), index + 1),
        ToString::to_string,
    );

    let hp = read_number(&value["stats"]["hp"])
        .or_else(|| read_number(&value["hp"]))
        .unwrap_or(DEFAULT_MAX_HP);
    let hp = if hp > 0 { hp } else { DEFAULT_MAX_HP };

    let armor_class = read_number(&value["stats"]["ac"]).or_else(|| read_number(&value["ac"]));

    let disposition = match value["disposition"].as_str() {
        Some(d) if text::matches(d, "hidden") || text::matches(d, "oculto") => Disposition::Hidden,
        _ => Disposition::Hostile,
    };
    let status = match value["status"].as_str() {
        Some(s) if text::matches(s, "hidden") || text::matches(s, "oculto") => EnemyStatus::Hidden,
        _ => EnemyStatus::Active,
    };

    EnemyState {
        id,
        name,
        hit_points: Some(HitPoints::full(hp)),
        armor_class,
        disposition,
        status,
    }
}

/// Read a JSON number (or numeric string) as i32.
fn read_number(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().map(|v| v as i32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Enemies the party can see: hidden dispositions and statuses excluded.
pub fn visible(enemies: &[EnemyState]) -> Vec<EnemyState> {
    enemies.iter().filter(|e| !e.is_hidden()).cloned().collect()
}

/// Enemies still standing. Fails open: unknown or malformed hit points keep
/// the enemy in the list.
pub fn alive(enemies: &[EnemyState]) -> Vec<EnemyState> {
    enemies.iter().filter(|e| e.is_alive()).cloned().collect()
}

/// Reveal a concealed enemy: disposition hidden→hostile, status
/// hidden→active, everything else preserved.
pub fn reveal(enemy: &EnemyState) -> EnemyState {
    let mut revealed = enemy.clone();
    if revealed.disposition == Disposition::Hidden {
        revealed.disposition = Disposition::Hostile;
    }
    if revealed.status == EnemyStatus::Hidden {
        revealed.status = EnemyStatus::Active;
    }
    revealed
}
