//! Interview conversation state machine
//!
//! Tracks a six-step psychological intake interview: keyword extraction
//! into typed slots, per-step completion checking, context rendering for
//! the outbound agent request, and step advancement driven by both slot
//! completion and phrases in the agent's replies.

mod context;
mod extract;
pub mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use context::build_context;
pub use extract::extract_slots;
pub use state::{
    step_focus, step_title, ConversationState, DurationSlots, ImpactSlots, Role, SymptomSlots,
    TurnRecord, DEFAULT_CONCERNS, FINAL_STEP,
};
pub use transition::{apply_turn, step_requirements_met};
