//! Structured-payload extraction from model text.
//!
//! Classifier-style prompts ask the model for a small JSON object, but real
//! responses arrive fenced, bare, or as free text. [`extract_label`] walks a
//! fallback chain (strip fences, try JSON, read the label field, else use
//! the trimmed text itself) and never fails: some label always comes out.

use serde_json::Value;

/// JSON field holding the chosen category in classifier responses.
pub const LABEL_FIELD: &str = "category_name";

/// Strips a leading/trailing markdown code fence (```json … ``` or ``` … ```)
/// and surrounding whitespace. Text without fences is only trimmed.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag (e.g. "json") up to the first line break.
    let body = match inner.find('\n') {
        Some(i) => &inner[i + 1..],
        None => inner.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim()
}

/// Extracts a label from a raw model response.
///
/// Chain: strip fences → parse JSON → string under `field` → bare JSON
/// string → trimmed text as-is. Malformed output is not an error; the router
/// sends unmapped labels to its default branch.
pub fn extract_label(raw: &str, field: &str) -> String {
    let stripped = strip_code_fences(raw);
    if let Ok(value) = serde_json::from_str::<Value>(stripped) {
        if let Some(label) = value.get(field).and_then(Value::as_str) {
            return label.trim().to_string();
        }
        if let Some(label) = value.as_str() {
            return label.trim().to_string();
        }
    }
    stripped.to_string()
}
