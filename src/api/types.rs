//! API request and response types

use crate::session::Session;
use crate::state_machine::step_title;
use serde::{Deserialize, Serialize};

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Session summary shown in the UI sidebar
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub slug: String,
    pub current_step: u8,
    pub step_title: &'static str,
    pub progress: f32,
    pub assessment_complete: bool,
    pub treatment_plan_generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_treatment: Option<String>,
    pub message_count: usize,
}

impl SessionSummary {
    pub fn of(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            slug: session.slug.clone(),
            current_step: session.state.current_step,
            step_title: step_title(session.state.current_step),
            progress: session.state.progress(),
            assessment_complete: session.state.assessment_complete,
            treatment_plan_generated: session.state.treatment_plan_generated,
            selected_treatment: session.state.selected_treatment.clone(),
            message_count: session.state.history.len(),
        }
    }
}

/// One conversation turn as rendered to the UI
#[derive(Debug, Serialize)]
pub struct TurnView {
    pub role: &'static str,
    pub text: String,
    pub step: u8,
}

/// Response with a session summary
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: SessionSummary,
}

/// Response with a session and its conversation history
#[derive(Debug, Serialize)]
pub struct SessionWithMessagesResponse {
    pub session: SessionSummary,
    pub messages: Vec<TurnView>,
}

/// Response for a chat turn
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub session: SessionSummary,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
