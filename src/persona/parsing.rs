//! Persona synthesis response parsing.

use std::collections::HashSet;

use crate::error::ParseError;
use crate::model::{Persona, UserProfile, DIRECTOR_NAME};
use crate::parsing::{extract_json, get_array, get_str, get_string_array};
use crate::prompts::persona_system_prompt;

/// Number of personas every session debates with.
pub const PERSONA_COUNT: usize = 3;

/// Shortest value anchor accepted.
pub const MIN_ANCHOR_CHARS: usize = 3;

/// `needle` occurs in `haystack` as whole words. Both must be lowercase.
fn contains_phrase(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(at, _)| {
        let before = haystack[..at].chars().next_back();
        let after = haystack[at + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Parse and check a persona synthesis reply.
///
/// # Errors
///
/// Returns [`ParseError`] naming the first defect: no JSON, wrong agent
/// count, missing fields, duplicate or reserved names, or value anchors that
/// are too short, absent from the user's core values as whole words, or
/// overlapping another persona's anchor.
pub fn parse_personas(text: &str, profile: &UserProfile) -> Result<Vec<Persona>, ParseError> {
    let json = extract_json(text)?;
    let agents = get_array(&json, "agents")?;

    if agents.len() != PERSONA_COUNT {
        return Err(ParseError::InvalidValue {
            field: "agents".into(),
            reason: format!("expected {PERSONA_COUNT} agents, got {}", agents.len()),
        });
    }

    let core_values = profile.core_values.to_lowercase();
    let mut names = HashSet::new();
    let mut anchors: Vec<String> = Vec::with_capacity(PERSONA_COUNT);
    let mut personas = Vec::with_capacity(PERSONA_COUNT);

    for agent in agents {
        let name = get_str(agent, "name")?;
        if name.eq_ignore_ascii_case(DIRECTOR_NAME) {
            return Err(ParseError::InvalidValue {
                field: "name".into(),
                reason: format!("'{DIRECTOR_NAME}' is reserved"),
            });
        }
        if !names.insert(name.to_lowercase()) {
            return Err(ParseError::InvalidValue {
                field: "name".into(),
                reason: format!("duplicate persona name '{name}'"),
            });
        }

        let value_anchor = get_str(agent, "value_anchor")?;
        let anchor_key = value_anchor.to_lowercase();
        if anchor_key.chars().count() < MIN_ANCHOR_CHARS {
            return Err(ParseError::InvalidValue {
                field: "value_anchor".into(),
                reason: format!(
                    "'{value_anchor}' is too short to name a value (at least {MIN_ANCHOR_CHARS} characters)"
                ),
            });
        }
        if !contains_phrase(&core_values, &anchor_key) {
            return Err(ParseError::InvalidValue {
                field: "value_anchor".into(),
                reason: format!(
                    "'{value_anchor}' does not appear in the core values as a whole word or phrase"
                ),
            });
        }
        if let Some(taken) = anchors.iter().find(|taken: &&String| {
            contains_phrase(taken, &anchor_key) || contains_phrase(&anchor_key, taken)
        }) {
            let reason = if taken.as_str() == anchor_key {
                format!("'{value_anchor}' is anchored by more than one persona")
            } else {
                format!("'{value_anchor}' overlaps '{taken}' anchored by another persona")
            };
            return Err(ParseError::InvalidValue {
                field: "value_anchor".into(),
                reason,
            });
        }
        anchors.push(anchor_key);

        let perspective = get_str(agent, "perspective")?;
        let description = get_str(agent, "persona_description")?;
        let strengths = get_string_array(agent, "key_strengths")?;
        let stance = get_str(agent, "debate_stance")?;
        let system_prompt = persona_system_prompt(
            &name,
            &perspective,
            &description,
            &strengths,
            &stance,
            profile,
        );

        personas.push(Persona {
            name,
            perspective,
            description,
            strengths,
            stance,
            value_anchor,
            system_prompt,
        });
    }

    Ok(personas)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::SessionSettings;
    use serde_json::{json, Value};

    fn profile() -> UserProfile {
        UserProfile::new(
            "Robots and astronomy",
            "Maths and patience",
            "High pay, meaningful impact, free time",
            vec!["Physics".into(), "Law".into()],
            SessionSettings::default(),
        )
        .unwrap()
    }

    fn agent(name: &str, anchor: &str) -> Value {
        json!({
            "name": name,
            "perspective": "Pragmatist",
            "persona_description": "Career coach",
            "key_strengths": ["labour markets", "negotiation", "budgeting"],
            "debate_stance": "Money matters",
            "value_anchor": anchor
        })
    }

    fn reply(agents: &[Value]) -> String {
        json!({ "agents": agents }).to_string()
    }

    #[test]
    fn test_parse_valid_panel() {
        let text = reply(&[
            agent("Ava", "high pay"),
            agent("Ben", "Meaningful Impact"),
            agent("Cleo", "free time"),
        ]);
        let personas = parse_personas(&text, &profile()).unwrap();
        assert_eq!(personas.len(), 3);
        assert_eq!(personas[1].value_anchor, "Meaningful Impact");
        assert!(personas[0].system_prompt.starts_with("You are Ava, Pragmatist."));
        assert_eq!(personas[2].strengths.len(), 3);
    }

    #[test]
    fn test_wrong_count_rejected() {
        let text = reply(&[agent("Ava", "high pay"), agent("Ben", "free time")]);
        let err = parse_personas(&text, &profile()).unwrap_err();
        assert!(err.to_string().contains("expected 3 agents, got 2"));
    }

    #[test]
    fn test_duplicate_name_case_insensitive() {
        let text = reply(&[
            agent("Ava", "high pay"),
            agent("ava", "free time"),
            agent("Cleo", "meaningful impact"),
        ]);
        let err = parse_personas(&text, &profile()).unwrap_err();
        assert!(err.to_string().contains("duplicate persona name"));
    }

    #[test]
    fn test_director_name_reserved() {
        let text = reply(&[
            agent("director", "high pay"),
            agent("Ben", "free time"),
            agent("Cleo", "meaningful impact"),
        ]);
        let err = parse_personas(&text, &profile()).unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }

    #[test]
    fn test_anchor_must_come_from_core_values() {
        let text = reply(&[
            agent("Ava", "high pay"),
            agent("Ben", "fame"),
            agent("Cleo", "free time"),
        ]);
        let err = parse_personas(&text, &profile()).unwrap_err();
        assert!(err.to_string().contains("'fame' does not appear"));
    }

    #[test]
    fn test_shared_anchor_rejected() {
        let text = reply(&[
            agent("Ava", "high pay"),
            agent("Ben", "High Pay"),
            agent("Cleo", "free time"),
        ]);
        let err = parse_personas(&text, &profile()).unwrap_err();
        assert!(err.to_string().contains("more than one persona"));
    }

    #[test]
    fn test_nested_anchor_rejected() {
        let text = reply(&[
            agent("Ava", "high pay"),
            agent("Ben", "pay"),
            agent("Cleo", "free time"),
        ]);
        let err = parse_personas(&text, &profile()).unwrap_err();
        assert!(err
            .to_string()
            .contains("'pay' overlaps 'high pay' anchored by another persona"));

        let text = reply(&[
            agent("Ava", "pay"),
            agent("Ben", "High pay"),
            agent("Cleo", "free time"),
        ]);
        let err = parse_personas(&text, &profile()).unwrap_err();
        assert!(err.to_string().contains("overlaps 'pay'"));
    }

    #[test]
    fn test_short_anchor_rejected() {
        let text = reply(&[
            agent("Ava", "h"),
            agent("Ben", "meaningful impact"),
            agent("Cleo", "free time"),
        ]);
        let err = parse_personas(&text, &profile()).unwrap_err();
        assert!(err.to_string().contains("'h' is too short"));
    }

    #[test]
    fn test_anchor_must_match_whole_words() {
        let text = reply(&[
            agent("Ava", "high pay"),
            agent("Ben", "eaningful impact"),
            agent("Cleo", "free time"),
        ]);
        let err = parse_personas(&text, &profile()).unwrap_err();
        assert!(err.to_string().contains("'eaningful impact' does not appear"));
    }

    #[test]
    fn test_missing_strengths_rejected() {
        let mut bad = agent("Cleo", "free time");
        bad["key_strengths"] = json!([]);
        let text = reply(&[agent("Ava", "high pay"), agent("Ben", "meaningful impact"), bad]);
        assert_eq!(
            parse_personas(&text, &profile()).unwrap_err(),
            ParseError::MissingField {
                field: "key_strengths".into()
            }
        );
    }
}
