//! Data keys rendered as natural-language text for embedding

/// Richer phrasings for common keys
const KEY_CONTEXT: &[(&str, &str)] = &[
    ("full name", "full name person"),
    ("email", "email address contact"),
    ("phone", "phone number telephone contact"),
    ("address", "street address location"),
    ("company", "company organization employer"),
    ("date of birth", "date of birth birthday"),
    ("zip code", "zip code postal code"),
    ("city", "city location"),
    ("country", "country location"),
];

/// Normalize a `snake_case` or `camelCase` key into lowercase words, then
/// expand it through the context table when an entry exists.
pub fn format_key_as_text(key: &str) -> String {
    let mut text = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch == '_' {
            text.push(' ');
        } else if ch.is_ascii_uppercase() {
            text.push(' ');
            text.push(ch.to_ascii_lowercase());
        } else {
            text.extend(ch.to_lowercase());
        }
    }
    let normalized = text.trim();

    KEY_CONTEXT
        .iter()
        .find(|(plain, _)| *plain == normalized)
        .map(|(_, expanded)| expanded.to_string())
        .unwrap_or_else(|| normalized.to_string())
}
