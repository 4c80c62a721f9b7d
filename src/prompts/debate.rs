//! Debate turn and synthesis prompts.

use std::fmt::Write as _;

use crate::model::{DebateTurn, TurnType};

/// System context for the Director role.
#[must_use]
pub fn director_system_prompt() -> &'static str {
    "You are the Director of an academic advising panel. You read the full debate between \
three evaluators and turn it into a single structured decision. You are neutral, precise, \
and you always answer with one JSON object in the requested format."
}

/// Render a transcript as numbered speaker lines.
#[must_use]
pub fn render_transcript(turns: &[DebateTurn]) -> String {
    if turns.is_empty() {
        return "(no turns yet)".to_string();
    }
    let mut out = String::new();
    for turn in turns {
        let _ = write!(
            out,
            "[Turn {} | phase {} | {} | {}",
            turn.turn_index, turn.phase, turn.speaker, turn.turn_type
        );
        if !turn.target.is_empty() {
            let _ = write!(out, " -> {}", turn.target.join(", "));
        }
        let _ = writeln!(out, "]\n{}\n", turn.content.trim());
    }
    out
}

/// What the speaker is expected to do on this turn.
#[must_use]
pub fn role_instruction(turn_type: TurnType, targets: &[String]) -> String {
    match turn_type {
        TurnType::Proposal => "You lead this phase. Make your proposal.".to_string(),
        TurnType::Critique => format!(
            "Critique {}'s proposal from your stance. Name its weakest point.",
            targets.join(" and ")
        ),
        TurnType::Defense => format!(
            "Respond to the critiques from {}. Concede what is fair and defend the rest.",
            targets.join(" and ")
        ),
        TurnType::FinalDecision => "Synthesise the debate into the final decision.".to_string(),
    }
}

/// Prompt for one persona turn.
#[must_use]
pub fn turn_prompt(
    subject: &str,
    transcript: &[DebateTurn],
    role: &str,
    instruction: &str,
) -> String {
    format!(
        "Debate topic:\n{subject}\n\n\
         Transcript so far:\n{transcript}\n\
         Your turn: {role}\n{instruction}",
        transcript = render_transcript(transcript),
    )
}

/// Prompt for the Director's synthesis turn.
///
/// `correction` names what was wrong with a previous synthesis, if any.
#[must_use]
pub fn synthesis_prompt(
    subject: &str,
    transcript: &[DebateTurn],
    format_instruction: &str,
    correction: Option<&str>,
) -> String {
    let mut prompt = format!(
        "Debate topic:\n{subject}\n\n\
         Full transcript:\n{transcript}\n\
         Produce the final decision.\n{format_instruction}",
        transcript = render_transcript(transcript),
    );
    if let Some(correction) = correction {
        let _ = write!(
            prompt,
            "\n\nYour previous synthesis was rejected: {correction}\nCorrect it."
        );
    }
    prompt
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Speaker;
    use chrono::Utc;

    fn turn(index: u8, speaker: &str, turn_type: TurnType, target: &[&str]) -> DebateTurn {
        DebateTurn {
            turn_index: index,
            phase: 1,
            speaker: Speaker::from(speaker.to_string()),
            turn_type,
            target: target.iter().map(ToString::to_string).collect(),
            content: format!("content {index}"),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_empty_transcript() {
        assert_eq!(render_transcript(&[]), "(no turns yet)");
    }

    #[test]
    fn test_render_transcript_lines() {
        let rendered = render_transcript(&[
            turn(1, "Ava", TurnType::Proposal, &[]),
            turn(2, "Ben", TurnType::Critique, &["Ava"]),
        ]);
        assert!(rendered.contains("[Turn 1 | phase 1 | Ava | proposal]\ncontent 1"));
        assert!(rendered.contains("[Turn 2 | phase 1 | Ben | critique -> Ava]"));
    }

    #[test]
    fn test_role_instruction_names_targets() {
        let text = role_instruction(TurnType::Defense, &["Ben".into(), "Cleo".into()]);
        assert!(text.contains("Ben and Cleo"));
    }

    #[test]
    fn test_synthesis_prompt_correction() {
        let prompt = synthesis_prompt("topic", &[], "Return JSON", Some("need 3 criteria"));
        assert!(prompt.contains("Return JSON"));
        assert!(prompt.ends_with("rejected: need 3 criteria\nCorrect it."));
    }
}
