//! Property-based tests for the interview state machine
//!
//! These tests verify the core invariants hold across arbitrary message
//! sequences: the step is monotone and bounded, history is append-only,
//! and set slots never accumulate duplicates.

use super::state::ConversationState;
use super::transition::apply_turn;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

/// User messages, biased toward keyword-bearing fragments so the slot and
/// advancement paths are actually exercised.
fn arb_message() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("my anxiety is at a 9 because of financial stress".to_string()),
        Just("i can't eat or sleep and feel disconnected".to_string()),
        Just("being outside and being present with others helps".to_string()),
        Just("it started months ago".to_string()),
        Just("it comes and goes in waves".to_string()),
        Just("work has become impossible lately".to_string()),
        Just("my daily routine fell apart".to_string()),
        Just("i'll go with option 2".to_string()),
        Just("cbt sounds right for me".to_string()),
        "[a-z0-9 ]{0,40}",
    ]
}

/// Agent replies, biased toward step-transition phrases.
fn arb_reply() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("could you tell me more about that?".to_string()),
        Just("thank you. step 1 complete, moving to step 2".to_string()),
        Just("moving to step 3".to_string()),
        Just("moving to step 4".to_string()),
        Just("step 4 complete, here are your options".to_string()),
        Just("moving to step 6".to_string()),
        Just("here is your comprehensive treatment plan".to_string()),
        "[a-z ]{0,40}",
    ]
}

fn arb_turns() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec((arb_message(), arb_reply()), 0..12)
}

fn run_turn(state: &mut ConversationState, message: &str, reply: &str) {
    state.record_user_turn(message);
    apply_turn(state, message, reply);
    state.record_agent_turn(reply);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn step_is_monotone_and_bounded(turns in arb_turns()) {
        let mut state = ConversationState::new();
        for (message, reply) in &turns {
            let before = state.current_step;
            run_turn(&mut state, message, reply);
            prop_assert!(state.current_step >= before);
            prop_assert!((1..=6).contains(&state.current_step));
        }
    }

    #[test]
    fn history_is_append_only(turns in arb_turns()) {
        let mut state = ConversationState::new();
        for (message, reply) in &turns {
            let prefix = state.history.clone();
            run_turn(&mut state, message, reply);
            prop_assert_eq!(state.history.len(), prefix.len() + 2);
            prop_assert_eq!(&state.history[..prefix.len()], &prefix[..]);
        }
    }

    #[test]
    fn set_slots_stay_duplicate_free(turns in arb_turns()) {
        let mut state = ConversationState::new();
        for (message, reply) in &turns {
            run_turn(&mut state, message, reply);
        }
        for set in [&state.symptoms.triggers, &state.impact.coping_mechanisms] {
            let mut seen = std::collections::HashSet::new();
            for label in set {
                prop_assert!(seen.insert(label.clone()), "duplicate label: {label}");
            }
        }
    }

    #[test]
    fn populated_scalars_are_never_cleared(turns in arb_turns()) {
        let mut state = ConversationState::new();
        for (message, reply) in &turns {
            let severity = state.symptoms.severity.clone();
            let duration = state.duration.symptom_duration.clone();
            let treatment = state.selected_treatment.clone();
            run_turn(&mut state, message, reply);
            if severity.is_some() {
                prop_assert_eq!(state.symptoms.severity.clone(), severity);
            }
            if duration.is_some() {
                prop_assert_eq!(state.duration.symptom_duration.clone(), duration);
            }
            if treatment.is_some() {
                prop_assert_eq!(state.selected_treatment.clone(), treatment);
            }
        }
    }

    #[test]
    fn completion_flags_only_latch(turns in arb_turns()) {
        let mut state = ConversationState::new();
        for (message, reply) in &turns {
            let before = state.completed_steps;
            run_turn(&mut state, message, reply);
            for (step, was_complete) in before.iter().enumerate() {
                if *was_complete {
                    prop_assert!(state.completed_steps[step]);
                }
            }
        }
    }
}
