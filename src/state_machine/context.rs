//! Context block rendering
//!
//! Renders the known slot values and step progress into the advisory text
//! block sent along with each agent request. The block has no effect on
//! local control flow; it exists so the agent stops re-asking for
//! information that has already been collected.

use super::state::{step_focus, ConversationState};

/// Number of trailing history entries included in the context block
const RECENT_TURNS: usize = 4;

/// Maximum characters of each history entry rendered into the block
const TURN_PREVIEW_CHARS: usize = 100;

/// Render the current state into the text block appended to the next
/// agent request.
pub fn build_context(state: &ConversationState) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(format!("Current Diagnostic Step: {}", state.current_step));
    parts.push(format!("Focus: {}", step_focus(state.current_step)));

    parts.push("\n**Information Already Collected:**".to_string());

    let mut symptom_info: Vec<String> = Vec::new();
    if let Some(severity) = &state.symptoms.severity {
        symptom_info.push(format!("- Severity: {severity}"));
    }
    if let Some(frequency) = &state.symptoms.frequency {
        symptom_info.push(format!("- Frequency: {frequency}"));
    }
    if !state.symptoms.triggers.is_empty() {
        symptom_info.push(format!("- Triggers: {}", state.symptoms.triggers.join(", ")));
    }
    if state.symptoms.eating_issues.unwrap_or(false) {
        symptom_info.push("- Eating difficulties: Yes (no appetite)".to_string());
    }
    if state.symptoms.reality_perception.unwrap_or(false) {
        symptom_info.push("- Reality perception issues: Yes (disconnection episodes)".to_string());
    }
    if !state.impact.coping_mechanisms.is_empty() {
        symptom_info.push(format!(
            "- Coping mechanisms: {}",
            state.impact.coping_mechanisms.join(", ")
        ));
    }
    if !symptom_info.is_empty() {
        parts.push("Symptom Information:".to_string());
        parts.extend(symptom_info);
    }

    if state.current_step >= 2 {
        let mut duration_info: Vec<String> = Vec::new();
        if let Some(duration) = &state.duration.symptom_duration {
            duration_info.push(format!("- Duration: {duration}"));
        }
        if let Some(pattern) = &state.duration.pattern {
            duration_info.push(format!("- Pattern: {pattern}"));
        }
        if !duration_info.is_empty() {
            parts.push("Duration/Pattern Information:".to_string());
            parts.extend(duration_info);
        }
    }

    if state.current_step >= 3 {
        let mut impact_info: Vec<String> = Vec::new();
        if let Some(work) = &state.impact.work_impact {
            impact_info.push(format!("- Work impact: {work}"));
        }
        if let Some(daily) = &state.impact.daily_activities {
            impact_info.push(format!("- Daily activities: {daily}"));
        }
        if !impact_info.is_empty() {
            parts.push("Functional Impact:".to_string());
            parts.extend(impact_info);
        }
    }

    parts.push(format!("\n**Step {} Progress:**", state.current_step));
    match state.current_step {
        1 => {
            let mut needed: Vec<&str> = Vec::new();
            if state.symptoms.severity.is_none() {
                needed.push("severity ratings");
            }
            if state.symptoms.triggers.is_empty() {
                needed.push("triggers");
            }
            if state.symptoms.frequency.is_none() {
                needed.push("frequency/patterns");
            }
            parts.push(progress_line(&needed, 1));
        }
        2 => {
            let mut needed: Vec<&str> = Vec::new();
            if state.duration.symptom_duration.is_none() {
                needed.push("symptom duration/timeline");
            }
            if state.duration.pattern.is_none() {
                needed.push("episodic vs continuous pattern");
            }
            parts.push(progress_line(&needed, 2));
        }
        3 => {
            let mut needed: Vec<&str> = Vec::new();
            if state.impact.work_impact.is_none() && state.impact.daily_activities.is_none() {
                needed.push("impact on work/daily activities");
            }
            parts.push(progress_line(&needed, 3));
        }
        _ => {}
    }

    if !state.history.is_empty() {
        parts.push("\n**Recent Conversation:**".to_string());
        let start = state.history.len().saturating_sub(RECENT_TURNS);
        for turn in &state.history[start..] {
            parts.push(format!(
                "- {}: {}...",
                turn.role.title(),
                truncate_chars(&turn.text, TURN_PREVIEW_CHARS)
            ));
        }
    }

    parts.join("\n")
}

fn progress_line(needed: &[&str], step: u8) -> String {
    if needed.is_empty() {
        format!(
            "\u{2713} Sufficient information collected for Step {}. Ready to move to Step {}.",
            step,
            step + 1
        )
    } else {
        format!("Still need to gather: {}", needed.join(", "))
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::extract_slots;
    use crate::state_machine::state::ConversationState;

    #[test]
    fn empty_state_lists_everything_still_needed() {
        let state = ConversationState::new();
        let context = build_context(&state);
        assert!(context.contains("Current Diagnostic Step: 1"));
        assert!(context.contains("Focus: Symptom Assessment"));
        assert!(context.contains(
            "Still need to gather: severity ratings, triggers, frequency/patterns"
        ));
        assert!(!context.contains("Recent Conversation"));
    }

    #[test]
    fn collected_slots_are_rendered() {
        let mut state = ConversationState::new();
        extract_slots(
            &mut state,
            "My anxiety is always at a 9 because of financial worries",
        );
        let context = build_context(&state);
        assert!(context.contains("- Severity: anxiety: 9"));
        assert!(context.contains("- Triggers: financial stress"));
        assert!(context.contains("- Frequency: My anxiety is always at a 9"));
        assert!(context.contains("\u{2713} Sufficient information collected for Step 1"));
    }

    #[test]
    fn sleep_flag_is_not_rendered() {
        let mut state = ConversationState::new();
        extract_slots(&mut state, "I have insomnia and no appetite");
        let context = build_context(&state);
        assert!(context.contains("- Eating difficulties: Yes (no appetite)"));
        assert!(!context.contains("insomnia"));
        assert!(!context.contains("Sleep"));
    }

    #[test]
    fn later_step_sections_are_gated_on_current_step() {
        let mut state = ConversationState::new();
        state.duration.symptom_duration = Some("three months".to_string());
        state.impact.work_impact = Some("missed deadlines".to_string());

        let context = build_context(&state);
        assert!(!context.contains("Duration/Pattern Information"));
        assert!(!context.contains("Functional Impact:"));

        state.current_step = 3;
        let context = build_context(&state);
        assert!(context.contains("- Duration: three months"));
        assert!(context.contains("- Work impact: missed deadlines"));
    }

    #[test]
    fn step_three_progress_clears_with_either_impact() {
        let mut state = ConversationState::new();
        state.current_step = 3;
        let context = build_context(&state);
        assert!(context.contains("Still need to gather: impact on work/daily activities"));

        state.impact.daily_activities = Some("skipping meals".to_string());
        let context = build_context(&state);
        assert!(context.contains("\u{2713} Sufficient information collected for Step 3"));
    }

    #[test]
    fn steps_past_three_have_no_needed_list() {
        let mut state = ConversationState::new();
        state.current_step = 4;
        let context = build_context(&state);
        assert!(context.contains("**Step 4 Progress:**"));
        assert!(!context.contains("Still need to gather"));
    }

    #[test]
    fn recent_conversation_shows_last_four_truncated() {
        let mut state = ConversationState::new();
        for i in 0..3 {
            state.record_user_turn(format!("message {i}"));
            state.record_agent_turn("a".repeat(150));
        }
        let context = build_context(&state);
        // Six turns recorded; only the last four appear.
        assert!(!context.contains("message 0"));
        assert!(context.contains("message 1"));
        assert!(context.contains("message 2"));
        let truncated = format!("- Agent: {}...", "a".repeat(100));
        assert!(context.contains(&truncated));
        assert!(!context.contains(&"a".repeat(101)));
    }
}
