//! Keyword extraction into conversation slots
//!
//! Deliberately shallow: case-insensitive substring containment against
//! fixed keyword lists, dispatched on the current step. No negation
//! handling, no disambiguation. Absence of a match is a no-op, so
//! extraction never fails.

use super::state::{push_unique, ConversationState};

const SEVERITY_GATE: &[&str] = &["anxiety", "depression", "stress"];
const FREQUENCY_TERMS: &[&str] = &[
    "frequent",
    "always",
    "sometimes",
    "rarely",
    "constant",
    "comes and goes",
];
const TRIGGER_GATE: &[&str] = &[
    "trigger",
    "caused by",
    "because",
    "stress",
    "financial",
    "work",
    "relationship",
];
const SYMPTOM_TERMS: &[&str] = &[
    "eat",
    "sleep",
    "appetite",
    "insomnia",
    "reality",
    "disconnected",
    "panic",
    "worry",
];
const COPING_GATE: &[&str] = &[
    "outside",
    "present with others",
    "exercise",
    "meditation",
    "coping",
];
const DURATION_TERMS: &[&str] = &[
    "days", "weeks", "months", "years", "started", "began", "since",
];
const PATTERN_TERMS: &[&str] = &[
    "episodic",
    "continuous",
    "comes and goes",
    "constant",
    "waves",
];
const WORK_TERMS: &[&str] = &["work", "job", "career", "employment"];
const RELATIONSHIP_TERMS: &[&str] = &["relationship", "family", "friends", "social"];
const DAILY_TERMS: &[&str] = &["daily", "routine", "activities", "self-care"];

/// Scan one user message for slot-relevant keywords and record any matches.
///
/// Which keyword sets apply depends on the step the conversation is in;
/// steps 4-6 extract nothing from user text.
pub fn extract_slots(state: &mut ConversationState, message: &str) {
    let lower = message.to_lowercase();
    match state.current_step {
        1 => extract_symptoms(state, message, &lower),
        2 => extract_duration(state, message, &lower),
        3 => extract_impact(state, message, &lower),
        _ => {}
    }
}

fn extract_symptoms(state: &mut ConversationState, message: &str, lower: &str) {
    // Severity only fires for messages that name anxiety alongside a number,
    // e.g. "my anxiety is at a 9".
    if contains_any(lower, SEVERITY_GATE)
        && lower.contains("anxiety")
        && message.chars().any(|c| c.is_ascii_digit())
        && state.symptoms.severity.is_none()
    {
        if let Some(token) = first_numeric_token(message) {
            state.symptoms.severity = Some(format!("anxiety: {token}"));
        }
    }

    if contains_any(lower, FREQUENCY_TERMS) && state.symptoms.frequency.is_none() {
        state.symptoms.frequency = Some(message.to_string());
    }

    if contains_any(lower, TRIGGER_GATE) && lower.contains("financial") {
        push_unique(&mut state.symptoms.triggers, "financial stress");
    }

    for term in SYMPTOM_TERMS {
        if !lower.contains(term) {
            continue;
        }
        match *term {
            "eat" | "appetite" => state.symptoms.eating_issues = Some(true),
            "sleep" | "insomnia" => state.symptoms.sleep_issues = Some(true),
            "reality" | "disconnected" => state.symptoms.reality_perception = Some(true),
            // "panic" and "worry" are scanned but map to no dedicated slot
            _ => {}
        }
    }

    if contains_any(lower, COPING_GATE) {
        if lower.contains("outside") {
            push_unique(&mut state.impact.coping_mechanisms, "being outside");
        }
        if lower.contains("present with others") {
            push_unique(&mut state.impact.coping_mechanisms, "social presence");
        }
    }
}

fn extract_duration(state: &mut ConversationState, message: &str, lower: &str) {
    if contains_any(lower, DURATION_TERMS) && state.duration.symptom_duration.is_none() {
        state.duration.symptom_duration = Some(message.to_string());
    }

    if contains_any(lower, PATTERN_TERMS) && state.duration.pattern.is_none() {
        state.duration.pattern = Some(message.to_string());
    }
}

fn extract_impact(state: &mut ConversationState, message: &str, lower: &str) {
    if contains_any(lower, WORK_TERMS) && state.impact.work_impact.is_none() {
        state.impact.work_impact = Some(message.to_string());
    }

    if contains_any(lower, RELATIONSHIP_TERMS) && state.impact.relationship_impact.is_none() {
        state.impact.relationship_impact = Some(message.to_string());
    }

    if contains_any(lower, DAILY_TERMS) && state.impact.daily_activities.is_none() {
        state.impact.daily_activities = Some(message.to_string());
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// First whitespace token that is all digits once commas and periods are
/// stripped. The token is returned raw, punctuation included.
fn first_numeric_token(message: &str) -> Option<&str> {
    message.split_whitespace().find(|token| {
        let stripped: String = token.chars().filter(|c| *c != ',' && *c != '.').collect();
        !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit())
    })
}
