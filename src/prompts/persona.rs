//! Persona synthesis prompts.

use std::fmt::Write as _;

use crate::model::UserProfile;

/// System prompt for the persona synthesis call.
pub const PERSONA_SYNTHESIS_SYSTEM: &str = "You design evaluation panels for academic advising. \
You read a student's self-description and create evaluators whose disagreements mirror the \
tensions in the student's own values. Respond with JSON only.";

/// Prompt asking for exactly three contrasting personas.
///
/// `feedback` names the defect of a previous attempt, if any.
#[must_use]
pub fn persona_synthesis_prompt(profile: &UserProfile, feedback: Option<&str>) -> String {
    let mut prompt = format!(
        r#"Analyse the three statements below together and create exactly 3 evaluator personas.

Interests: {interests}
Aptitudes: {aptitudes}
Core values: {core_values}
Candidate majors: {options}

Rules:
- Each persona champions a different value found in the core values statement.
- "value_anchor" must quote that value verbatim from the core values statement.
- No two personas may share a value_anchor, and no anchor may contain another.
- Names must be unique single first names. "Director" is reserved.
- Each persona lists exactly 3 key strengths.

Respond with a JSON object in this exact format:
{{
  "agents": [
    {{
      "name": "First name",
      "perspective": "Short label for the viewpoint",
      "persona_description": "Who this evaluator is",
      "key_strengths": ["strength 1", "strength 2", "strength 3"],
      "debate_stance": "The position this evaluator argues from",
      "value_anchor": "phrase quoted from the core values"
    }}
  ]
}}"#,
        interests = profile.interests.trim(),
        aptitudes = profile.aptitudes.trim(),
        core_values = profile.core_values.trim(),
        options = profile.options().join(", "),
    );

    if let Some(defect) = feedback {
        let _ = write!(
            prompt,
            "\n\nYour previous answer was rejected: {defect}\nFix this and answer again."
        );
    }

    prompt
}

/// Persistent system context for one persona's debate turns.
#[must_use]
pub fn persona_system_prompt(
    name: &str,
    perspective: &str,
    description: &str,
    strengths: &[String],
    stance: &str,
    profile: &UserProfile,
) -> String {
    format!(
        "You are {name}, {perspective}.\n\
         {description}\n\
         Key strengths: {strengths}\n\
         Debate stance: {stance}\n\n\
         You are helping a student choose a major.\n\
         Their interests: {interests}\n\
         Their aptitudes: {aptitudes}\n\
         Their core values: {core_values}\n\n\
         Stay in character, argue from your stance, and keep each turn under 150 words.",
        strengths = strengths.join(", "),
        interests = profile.interests.trim(),
        aptitudes = profile.aptitudes.trim(),
        core_values = profile.core_values.trim(),
    )
}
