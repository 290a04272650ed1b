//! Step completion and advancement rules
//!
//! Advancement is applied once per successfully processed message: keyword
//! extraction first, then automatic completion of steps 1-3, then
//! phrase-triggered jumps announced in the agent's reply, then the step 5
//! and step 6 special cases. Unmatched input leaves the state unchanged;
//! there are no failure states.

use super::extract::extract_slots;
use super::state::{ConversationState, FINAL_STEP};

/// Phrases an agent reply can use to announce a step transition, scanned in
/// this order; the first phrase found wins and ends the scan.
const STEP_PHRASES: &[(&str, u8)] = &[
    ("step 1 complete", 2),
    ("moving to step 2", 2),
    ("step 2 complete", 3),
    ("moving to step 3", 3),
    ("step 3 complete", 4),
    ("moving to step 4", 4),
    ("step 4 complete", 5),
    ("moving to step 5", 5),
    ("step 5 complete", 6),
    ("moving to step 6", 6),
];

/// Tokens in a user message that count as picking a treatment option
const TREATMENT_INDICATORS: &[&str] = &[
    "option 1", "option 2", "option 3", "first", "second", "third", "cbt", "dbt",
];

/// True iff the given step has gathered enough information to advance on
/// its own. Steps 4-6 never auto-complete; they advance only via phrases.
pub fn step_requirements_met(state: &ConversationState, step: u8) -> bool {
    match step {
        1 => {
            let has_severity = state.symptoms.severity.is_some();
            let has_triggers = !state.symptoms.triggers.is_empty();
            let has_symptoms = state.symptoms.eating_issues.is_some()
                || state.symptoms.sleep_issues.is_some()
                || state.symptoms.reality_perception.is_some();
            let has_coping = !state.impact.coping_mechanisms.is_empty();
            has_severity && has_triggers && has_symptoms && has_coping
        }
        2 => state.duration.symptom_duration.is_some() && state.duration.pattern.is_some(),
        3 => {
            let has_impact =
                state.impact.work_impact.is_some() || state.impact.daily_activities.is_some();
            has_impact && !state.impact.coping_mechanisms.is_empty()
        }
        _ => false,
    }
}

/// Apply one full message cycle to the state: extract slots from the user
/// message, then advance the step based on both sides of the exchange.
pub fn apply_turn(state: &mut ConversationState, user_message: &str, agent_reply: &str) {
    extract_slots(state, user_message);

    if (1..=3).contains(&state.current_step) && step_requirements_met(state, state.current_step) {
        let done = state.current_step;
        state.completed_steps[usize::from(done - 1)] = true;
        state.current_step = done + 1;
    }

    let reply_lower = agent_reply.to_lowercase();
    apply_phrase_jump(state, agent_reply, &reply_lower);
    apply_treatment_selection(state, user_message);

    if state.current_step == FINAL_STEP && reply_lower.contains("treatment plan") {
        state.treatment_plan_generated = true;
        state.assessment_complete = true;
    }
}

fn apply_phrase_jump(state: &mut ConversationState, agent_reply: &str, reply_lower: &str) {
    for &(phrase, target) in STEP_PHRASES {
        if !reply_lower.contains(phrase) {
            continue;
        }
        if target > state.current_step {
            // The reply that closes the diagnosis step carries the diagnosis
            // itself; keep it verbatim, set once.
            if state.current_step == 4 && state.diagnosis.is_none() {
                state.diagnosis = Some(agent_reply.to_string());
            }
            state.current_step = target;
            if target > 1 {
                // Only the step just before the target is marked complete,
                // even when the jump skips several steps.
                state.completed_steps[usize::from(target - 2)] = true;
            }
        }
        // First phrase found ends the scan whether or not it moved the step.
        break;
    }
}

fn apply_treatment_selection(state: &mut ConversationState, user_message: &str) {
    if state.current_step != 5 || state.selected_treatment.is_some() {
        return;
    }
    let lower = user_message.to_lowercase();
    if TREATMENT_INDICATORS
        .iter()
        .any(|indicator| lower.contains(indicator))
    {
        state.selected_treatment = Some(user_message.trim().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_step(step: u8) -> ConversationState {
        let mut state = ConversationState::new();
        state.current_step = step;
        state
    }

    /// Fills every step 1 requirement
    const FULL_STEP_ONE: &str = "My anxiety is at a 9 because of financial stress, \
         I can't sleep, and being outside is my only coping mechanism";

    #[test]
    fn step_one_advances_when_all_requirements_met() {
        let mut state = at_step(1);
        apply_turn(&mut state, FULL_STEP_ONE, "Thank you for sharing.");
        assert_eq!(state.current_step, 2);
        assert!(state.completed_steps[0]);
    }

    #[test]
    fn step_one_stays_when_any_requirement_missing() {
        // Each message drops exactly one of the four requirements.
        let missing_severity = "Financial stress keeps me from sleeping; being outside helps";
        let missing_trigger = "My anxiety is a 9, I can't sleep, being outside helps";
        let missing_symptom_flag = "My anxiety is a 9 from financial stress; being outside helps";
        let missing_coping = "My anxiety is a 9 from financial stress and I can't sleep";

        for message in [
            missing_severity,
            missing_trigger,
            missing_symptom_flag,
            missing_coping,
        ] {
            let mut state = at_step(1);
            apply_turn(&mut state, message, "Noted.");
            assert_eq!(state.current_step, 1, "should not advance on: {message}");
            assert!(!state.completed_steps[0]);
        }
    }

    #[test]
    fn step_one_requirements_accumulate_across_messages() {
        let mut state = at_step(1);
        apply_turn(&mut state, "My anxiety is at a 9", "Noted.");
        assert_eq!(state.current_step, 1);
        apply_turn(&mut state, "It's caused by financial pressure", "Noted.");
        assert_eq!(state.current_step, 1);
        apply_turn(&mut state, "I can't sleep at night", "Noted.");
        assert_eq!(state.current_step, 1);
        apply_turn(&mut state, "Being outside helps me cope", "Noted.");
        assert_eq!(state.current_step, 2);
    }

    #[test]
    fn step_two_needs_duration_and_pattern() {
        let mut state = at_step(2);
        apply_turn(&mut state, "It started three months ago", "Noted.");
        assert_eq!(state.current_step, 2);
        apply_turn(&mut state, "It comes in waves", "Noted.");
        assert_eq!(state.current_step, 3);
        assert!(state.completed_steps[1]);
    }

    #[test]
    fn step_three_needs_impact_and_coping() {
        let mut state = at_step(3);
        state.impact.coping_mechanisms.push("being outside".to_string());
        apply_turn(&mut state, "My job is suffering badly", "Noted.");
        assert_eq!(state.current_step, 4);
        assert!(state.completed_steps[2]);
    }

    #[test]
    fn step_three_without_coping_stays() {
        let mut state = at_step(3);
        apply_turn(&mut state, "My job is suffering badly", "Noted.");
        assert_eq!(state.current_step, 3);
    }

    #[test]
    fn phrase_jump_can_skip_steps() {
        let mut state = at_step(2);
        apply_turn(&mut state, "ok", "Great progress! Moving to step 4 now.");
        assert_eq!(state.current_step, 4);
        // The jump from 2 to 4 marks step 3 complete, not step 2.
        assert!(state.completed_steps[2]);
        assert!(!state.completed_steps[1]);
    }

    #[test]
    fn first_phrase_in_scan_order_wins() {
        let mut state = at_step(1);
        apply_turn(
            &mut state,
            "ok",
            "Step 1 complete. In fact, moving to step 3.",
        );
        assert_eq!(state.current_step, 2);
    }

    #[test]
    fn backward_phrase_is_ignored() {
        let mut state = at_step(5);
        apply_turn(&mut state, "ok", "moving to step 2");
        assert_eq!(state.current_step, 5);
        assert!(!state.completed_steps[0]);
    }

    #[test]
    fn backward_phrase_still_ends_the_scan() {
        // "step 1 complete" is found first and ignored; the later
        // "moving to step 6" is never reached.
        let mut state = at_step(3);
        apply_turn(&mut state, "ok", "step 1 complete and moving to step 6");
        assert_eq!(state.current_step, 3);
    }

    #[test]
    fn diagnosis_captured_when_step_four_closes() {
        let mut state = at_step(4);
        let reply = "Based on your answers this is consistent with generalized \
             anxiety disorder. Moving to step 5.";
        apply_turn(&mut state, "ok", reply);
        assert_eq!(state.current_step, 5);
        assert_eq!(state.diagnosis.as_deref(), Some(reply));

        // A later transition never replaces the recorded diagnosis.
        apply_turn(&mut state, "ok", "moving to step 6");
        assert_eq!(state.diagnosis.as_deref(), Some(reply));
    }

    #[test]
    fn treatment_selection_stores_exact_message() {
        let mut state = at_step(5);
        apply_turn(&mut state, "I'll go with option 2", "Good choice.");
        assert_eq!(state.selected_treatment.as_deref(), Some("I'll go with option 2"));
    }

    #[test]
    fn treatment_selection_is_not_overwritten() {
        let mut state = at_step(5);
        apply_turn(&mut state, "I'll go with option 2", "Good choice.");
        apply_turn(&mut state, "Actually, CBT sounds better", "Understood.");
        assert_eq!(state.selected_treatment.as_deref(), Some("I'll go with option 2"));
    }

    #[test]
    fn treatment_selection_only_in_step_five() {
        let mut state = at_step(4);
        apply_turn(&mut state, "I'd pick CBT", "Noted.");
        assert_eq!(state.selected_treatment, None);
    }

    #[test]
    fn selection_applies_after_jump_into_step_five() {
        let mut state = at_step(4);
        apply_turn(&mut state, "I'd pick CBT please", "Moving to step 5.");
        assert_eq!(state.current_step, 5);
        assert_eq!(state.selected_treatment.as_deref(), Some("I'd pick CBT please"));
    }

    #[test]
    fn plan_phrase_completes_assessment_in_step_six() {
        let mut state = at_step(6);
        apply_turn(&mut state, "thanks", "Here is your comprehensive treatment plan ...");
        assert!(state.treatment_plan_generated);
        assert!(state.assessment_complete);
    }

    #[test]
    fn plan_phrase_outside_step_six_is_ignored() {
        let mut state = at_step(5);
        apply_turn(&mut state, "thanks", "We will build a treatment plan soon.");
        assert!(!state.treatment_plan_generated);
        assert!(!state.assessment_complete);
    }

    #[test]
    fn jump_and_completion_in_same_reply() {
        let mut state = at_step(5);
        apply_turn(
            &mut state,
            "thanks",
            "Moving to step 6. Here is your treatment plan.",
        );
        assert_eq!(state.current_step, 6);
        assert!(state.assessment_complete);
        assert!(state.treatment_plan_generated);
    }
}
