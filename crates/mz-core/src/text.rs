//! Text normalization for case- and accent-insensitive matching.
//!
//! Player input and adventure data are Spanish; a reference like "Víbora 2"
//! must match the display name "Vibora 2" and vice versa. Normalization
//! lowercases and folds the Spanish diacritics instead of pulling in a full
//! Unicode normalization dependency.

/// Lowercase a string and fold Spanish diacritics (á→a, ñ→n, ü→u).
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Compare two strings ignoring case and Spanish accents.
pub fn matches(a: &str, b: &str) -> bool {
    normalize(a.trim()) == normalize(b.trim())
}
