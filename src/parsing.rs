//! Structured-output extraction from oracle text.
//!
//! Oracle replies often wrap JSON in prose or markdown fences.
//! [`extract_json`] tries, in order: the raw text, a ```` ```json ```` block,
//! a bare ```` ``` ```` block, then the first balanced `{...}` object.
//! The `get_*` accessors return [`ParseError::MissingField`] for absent or
//! mistyped fields.

use crate::error::ParseError;

/// Extract the first JSON value from free-form oracle text.
///
/// # Errors
///
/// Returns [`ParseError::JsonParseFailed`] with a short preview of the text
/// if nothing parses.
pub fn extract_json(text: &str) -> Result<serde_json::Value, ParseError> {
    let trimmed = text.trim();

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    if let Some(json_str) = extract_from_code_block(trimmed, "```json") {
        return parse_with_context(&json_str, text);
    }

    if let Some(json_str) = extract_from_code_block(trimmed, "```") {
        return parse_with_context(&json_str, text);
    }

    if let Some(json_str) = extract_balanced_object(trimmed) {
        return parse_with_context(&json_str, text);
    }

    Err(ParseError::JsonParseFailed {
        message: format!("No valid JSON found in response: {}", preview(text, 100)),
    })
}

/// Content of the first code block opened by `prefix`.
fn extract_from_code_block(text: &str, prefix: &str) -> Option<String> {
    let start_idx = text.find(prefix)?;
    let remaining = text[start_idx + prefix.len()..].trim_start();
    let end_idx = remaining.find("```")?;
    let body = remaining[..end_idx].trim();
    (!body.is_empty()).then(|| body.to_string())
}

/// First `{...}` with balanced braces, ignoring braces inside strings.
fn extract_balanced_object(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(text[start..=start + i].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

fn parse_with_context(json_str: &str, original: &str) -> Result<serde_json::Value, ParseError> {
    serde_json::from_str(json_str).map_err(|e| ParseError::JsonParseFailed {
        message: format!("Failed to parse JSON: {e}. Preview: {}", preview(original, 100)),
    })
}

/// Truncate on a char boundary for error messages.
fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}

/// Required non-empty string field, trimmed.
pub fn get_str(json: &serde_json::Value, field: &str) -> Result<String, ParseError> {
    json.get(field)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or_else(|| ParseError::MissingField {
            field: field.to_string(),
        })
}

/// Optional string field, trimmed; empty strings count as absent.
#[must_use]
pub fn get_opt_str(json: &serde_json::Value, field: &str) -> Option<String> {
    json.get(field)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Required array field.
pub fn get_array<'a>(
    json: &'a serde_json::Value,
    field: &str,
) -> Result<&'a Vec<serde_json::Value>, ParseError> {
    json.get(field)
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| ParseError::MissingField {
            field: field.to_string(),
        })
}

/// Required object field.
pub fn get_object<'a>(
    json: &'a serde_json::Value,
    field: &str,
) -> Result<&'a serde_json::Map<String, serde_json::Value>, ParseError> {
    json.get(field)
        .and_then(serde_json::Value::as_object)
        .ok_or_else(|| ParseError::MissingField {
            field: field.to_string(),
        })
}

/// Required array of non-empty strings.
pub fn get_string_array(json: &serde_json::Value, field: &str) -> Result<Vec<String>, ParseError> {
    let items: Vec<String> = get_array(json, field)?
        .iter()
        .filter_map(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    if items.is_empty() {
        return Err(ParseError::MissingField {
            field: field.to_string(),
        });
    }
    Ok(items)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_raw_json() {
        let value = extract_json(r#"  {"a": 1}  "#).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_extract_json_code_block() {
        let text = "Here is the matrix:\n```json\n{\"a\": [1, 2]}\n```\nDone.";
        assert_eq!(extract_json(text).unwrap(), json!({"a": [1, 2]}));
    }

    #[test]
    fn test_extract_generic_code_block() {
        let text = "```\n{\"b\": true}\n```";
        assert_eq!(extract_json(text).unwrap(), json!({"b": true}));
    }

    #[test]
    fn test_extract_embedded_object_with_braces_in_strings() {
        let text = r#"After deliberation: {"reasoning": "use {care}", "n": 2} - end"#;
        assert_eq!(
            extract_json(text).unwrap(),
            json!({"reasoning": "use {care}", "n": 2})
        );
    }

    #[test]
    fn test_extract_fails_without_json() {
        let err = extract_json("No structure here at all").unwrap_err();
        assert!(matches!(err, ParseError::JsonParseFailed { .. }));
        assert!(err.to_string().contains("No valid JSON"));
    }

    #[test]
    fn test_extract_reports_broken_block() {
        let err = extract_json("```json\n{\"a\": }\n```").unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let text = "é".repeat(150);
        let p = preview(&text, 100);
        assert_eq!(p.chars().count(), 103);
    }

    #[test]
    fn test_get_str_rejects_blank() {
        let value = json!({"name": "  ", "other": "x"});
        assert_eq!(
            get_str(&value, "name").unwrap_err(),
            ParseError::MissingField {
                field: "name".into()
            }
        );
        assert_eq!(get_str(&value, "other").unwrap(), "x");
        assert!(get_opt_str(&value, "name").is_none());
    }

    #[test]
    fn test_get_collections() {
        let value = json!({"list": ["a", " ", "b"], "obj": {"k": 1}});
        assert_eq!(get_string_array(&value, "list").unwrap(), vec!["a", "b"]);
        assert_eq!(get_object(&value, "obj").unwrap().len(), 1);
        assert!(get_array(&value, "obj").is_err());
    }
}
