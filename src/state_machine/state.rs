//! Conversation state types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of interview steps; step 6 is terminal.
pub const FINAL_STEP: u8 = 6;

/// Stands in for the patient's initial concerns when no history exists yet
pub const DEFAULT_CONCERNS: &str = "General psychological assessment requested";

/// Short name for a step, shown in the UI stage indicator
pub fn step_title(step: u8) -> &'static str {
    match step {
        1 => "Symptom Assessment",
        2 => "Duration & Patterns",
        3 => "Functional Impact",
        4 => "Clinical Diagnosis",
        5 => "Treatment Options",
        _ => "Treatment Plan",
    }
}

/// Focus line for a step, rendered into the outbound context block
pub fn step_focus(step: u8) -> &'static str {
    match step {
        1 => "Symptom Assessment - Gathering detailed symptom information",
        2 => "Duration and Temporal Patterns - Understanding timeline and patterns",
        3 => "Functional Impact Assessment - Exploring daily life impact",
        4 => "Clinical Diagnosis - Formulating diagnosis based on gathered information",
        5 => "Treatment Options - Presenting treatment options for patient selection",
        _ => "Treatment Plan Generation - Creating comprehensive treatment plan",
    }
}

/// Who produced a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Agent,
}

impl Role {
    /// Display form used when rendering history into context text
    pub fn title(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Agent => "Agent",
        }
    }
}

/// One entry in the conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub role: Role,
    pub text: String,
    /// The step the conversation was in when this turn was recorded
    pub step: u8,
}

/// Symptom information gathered during step 1
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomSlots {
    pub severity: Option<String>,
    pub frequency: Option<String>,
    /// Canonical trigger labels, insertion-ordered, no duplicates
    pub triggers: Vec<String>,
    pub onset: Option<String>,
    pub specific_symptoms: Vec<String>,
    pub eating_issues: Option<bool>,
    pub sleep_issues: Option<bool>,
    pub reality_perception: Option<bool>,
    pub physical_symptoms: Vec<String>,
}

/// Timeline information gathered during step 2
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationSlots {
    pub symptom_duration: Option<String>,
    /// Episodic vs continuous, in the patient's own words
    pub pattern: Option<String>,
    pub worst_period: Option<String>,
    pub best_period: Option<String>,
    pub changes_over_time: Option<String>,
}

/// Daily-life impact gathered during step 3
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactSlots {
    pub work_impact: Option<String>,
    pub relationship_impact: Option<String>,
    pub daily_activities: Option<String>,
    pub self_care: Option<String>,
    /// Canonical coping labels, insertion-ordered, no duplicates
    pub coping_mechanisms: Vec<String>,
    pub support_system: Option<String>,
}

/// Full per-session interview state.
///
/// Slots are write-once: a populated scalar is never overwritten or cleared,
/// and set slots only accumulate. `current_step` never decreases and history
/// is append-only; the mutation paths in [`super::extract`] and
/// [`super::transition`] maintain those invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub current_step: u8,
    pub history: Vec<TurnRecord>,
    pub symptoms: SymptomSlots,
    pub duration: DurationSlots,
    pub impact: ImpactSlots,
    pub diagnosis: Option<String>,
    pub selected_treatment: Option<String>,
    pub assessment_complete: bool,
    pub treatment_plan_generated: bool,
    /// Indexed by step - 1
    pub completed_steps: [bool; FINAL_STEP as usize],
    pub started_at: DateTime<Utc>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            current_step: 1,
            history: Vec::new(),
            symptoms: SymptomSlots::default(),
            duration: DurationSlots::default(),
            impact: ImpactSlots::default(),
            diagnosis: None,
            selected_treatment: None,
            assessment_complete: false,
            treatment_plan_generated: false,
            completed_steps: [false; FINAL_STEP as usize],
            started_at: Utc::now(),
        }
    }

    /// Append a user turn tagged with the current step
    pub fn record_user_turn(&mut self, text: impl Into<String>) {
        self.history.push(TurnRecord {
            role: Role::User,
            text: text.into(),
            step: self.current_step,
        });
    }

    /// Append an agent turn tagged with the current step
    pub fn record_agent_turn(&mut self, text: impl Into<String>) {
        self.history.push(TurnRecord {
            role: Role::Agent,
            text: text.into(),
            step: self.current_step,
        });
    }

    /// The patient's opening message, used as their stated concerns
    pub fn initial_concerns(&self) -> &str {
        self.history
            .first()
            .map_or(DEFAULT_CONCERNS, |turn| turn.text.as_str())
    }

    /// Fraction of the interview completed, for the UI progress bar
    pub fn progress(&self) -> f32 {
        f32::from(self.current_step) / f32::from(FINAL_STEP)
    }

    /// The first agent turn carrying the generated treatment plan, once the
    /// assessment is complete
    pub fn treatment_plan(&self) -> Option<&str> {
        if !self.assessment_complete {
            return None;
        }
        self.history
            .iter()
            .find(|turn| {
                turn.role == Role::Agent && turn.text.to_lowercase().contains("treatment plan")
            })
            .map(|turn| turn.text.as_str())
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

/// Add a label to an insertion-ordered set slot, ignoring duplicates
pub(crate) fn push_unique(set: &mut Vec<String>, label: &str) {
    if !set.iter().any(|existing| existing == label) {
        set.push(label.to_string());
    }
}
