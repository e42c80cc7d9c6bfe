//! Recovering a JSON object from free-form model text.

use serde_json::Value;

/// The span from the first `{` to the last `}`, inclusive.
pub fn extract_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// The first brace-balanced object, ignoring braces inside string literals.
pub fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses the JSON object embedded in `text`.
///
/// Tries the whole text, then the greedy first-to-last brace span, then the
/// first balanced object. The error names why nothing parsed.
pub fn extract_json_object(text: &str) -> Result<Value, String> {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text.trim()) {
        return Ok(value);
    }

    let span = extract_json_span(text).ok_or_else(|| "No JSON object found in response".to_string())?;
    let greedy_err = match serde_json::from_str::<Value>(span) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    first_balanced_object(text)
        .filter(|candidate| candidate.len() < span.len())
        .and_then(|candidate| serde_json::from_str(candidate).ok())
        .ok_or_else(|| format!("Response JSON is malformed: {greedy_err}"))
}
