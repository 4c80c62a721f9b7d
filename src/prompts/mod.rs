//! Prompt builders.
//!
//! - `persona`: persona synthesis and each persona's persistent system context
//! - `debate`: transcript rendering, per-turn prompts, Director synthesis framing
//! - `rounds`: topic-specific instructions for criteria, pairwise and scoring rounds
//!
//! Prompts only ask for structure; all validation happens on the parsed output.

#![allow(clippy::missing_const_for_fn)]

mod debate;
mod persona;
mod rounds;

pub use debate::{
    director_system_prompt, render_transcript, role_instruction, synthesis_prompt, turn_prompt,
};
pub use persona::{persona_synthesis_prompt, persona_system_prompt, PERSONA_SYNTHESIS_SYSTEM};
pub use rounds::{
    criteria_subject, criteria_synthesis_format, criteria_turn_instruction, pairwise_subject,
    pairwise_synthesis_format, pairwise_turn_instruction, scoring_subject,
    scoring_synthesis_format, scoring_turn_instruction,
};
