//! Session driver
//!
//! Orchestrates one request/response cycle per user message: record the
//! user turn, render the context block, hand the enriched inputs to the
//! crew, advance the interview state from the reply, record the agent
//! turn, and return the reply text. A crew failure degrades to a fixed
//! apology embedding the error; it is recorded like any agent turn and
//! never propagated, and the interview state is left exactly as it was.

use crate::crew::{CrewService, KickoffInputs};
use crate::state_machine::{apply_turn, build_context, ConversationState};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Placeholder passed to the crew while no diagnosis is recorded
const DIAGNOSIS_PENDING: &str = "To be determined";

/// Placeholder passed to the crew while no treatment is selected
const TREATMENT_PENDING: &str = "To be selected";

/// One interview session: the conversation state plus its crew handle
pub struct Session {
    pub id: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub state: ConversationState,
    crew: Arc<dyn CrewService>,
}

impl Session {
    pub fn new(id: impl Into<String>, slug: impl Into<String>, crew: Arc<dyn CrewService>) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
            created_at: Utc::now(),
            state: ConversationState::new(),
            crew,
        }
    }

    /// Discard the conversation and start the interview over
    pub fn reset(&mut self) {
        self.state = ConversationState::new();
    }

    /// Process one user message to completion and return the agent's reply
    pub async fn process_message(&mut self, user_message: &str) -> String {
        self.state.record_user_turn(user_message);

        let inputs = KickoffInputs {
            user_message: Some(user_message.to_string()),
            current_step: Some(self.state.current_step),
            conversation_context: Some(build_context(&self.state)),
            patient_concerns: self.state.initial_concerns().to_string(),
            diagnosed_condition: self
                .state
                .diagnosis
                .clone()
                .unwrap_or_else(|| DIAGNOSIS_PENDING.to_string()),
            selected_treatment_option: self
                .state
                .selected_treatment
                .clone()
                .unwrap_or_else(|| TREATMENT_PENDING.to_string()),
        };

        match self.crew.kickoff(&inputs).await {
            Ok(output) => {
                let reply = output.text();
                apply_turn(&mut self.state, user_message, &reply);
                self.state.record_agent_turn(&reply);
                reply
            }
            Err(e) => {
                tracing::error!(session = %self.id, error = %e, "Crew invocation failed");
                let message = format!(
                    "I apologize, but I encountered an error processing your \
                     message. Please try again. Error: {e}"
                );
                self.state.record_agent_turn(&message);
                message
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::{CrewError, KickoffOutput};
    use crate::state_machine::Role;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Crew double that replays scripted outcomes and records its inputs
    struct ScriptedCrew {
        outcomes: Mutex<VecDeque<Result<KickoffOutput, CrewError>>>,
        inputs_seen: Mutex<Vec<KickoffInputs>>,
    }

    impl ScriptedCrew {
        fn replies(replies: &[&str]) -> Arc<Self> {
            let outcomes = replies
                .iter()
                .map(|reply| {
                    Ok(KickoffOutput {
                        task_id: "task".to_string(),
                        raw: Some((*reply).to_string()),
                        task_runs: Vec::new(),
                    })
                })
                .collect();
            Arc::new(Self {
                outcomes: Mutex::new(outcomes),
                inputs_seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(VecDeque::from([Err(CrewError::NoModel)])),
                inputs_seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CrewService for ScriptedCrew {
        async fn kickoff(&self, inputs: &KickoffInputs) -> Result<KickoffOutput, CrewError> {
            self.inputs_seen.lock().unwrap().push(inputs.clone());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(CrewError::NoModel))
        }
    }

    fn session(crew: Arc<ScriptedCrew>) -> Session {
        Session::new("session-1", "monday-morning-cedar-harbor", crew)
    }

    #[tokio::test]
    async fn reply_is_returned_and_recorded() {
        let crew = ScriptedCrew::replies(&["How long has this been going on?"]);
        let mut session = session(crew.clone());

        let reply = session.process_message("I feel anxious").await;
        assert_eq!(reply, "How long has this been going on?");

        assert_eq!(session.state.history.len(), 2);
        assert_eq!(session.state.history[0].role, Role::User);
        assert_eq!(session.state.history[1].role, Role::Agent);
        assert_eq!(session.state.history[1].text, reply);
    }

    #[tokio::test]
    async fn crew_receives_context_and_derived_fields() {
        let crew = ScriptedCrew::replies(&["Tell me more", "Noted"]);
        let mut session = session(crew.clone());

        session.process_message("I can't stop worrying").await;
        session.process_message("It happens at work").await;

        let inputs = crew.inputs_seen.lock().unwrap();
        assert_eq!(inputs[0].current_step, Some(1));
        assert_eq!(inputs[0].user_message.as_deref(), Some("I can't stop worrying"));
        assert_eq!(inputs[0].diagnosed_condition, DIAGNOSIS_PENDING);
        assert_eq!(inputs[0].selected_treatment_option, TREATMENT_PENDING);
        assert!(inputs[0]
            .conversation_context
            .as_deref()
            .unwrap()
            .contains("Current Diagnostic Step: 1"));

        // The opening message stays the patient's stated concerns.
        assert_eq!(inputs[1].patient_concerns, "I can't stop worrying");
    }

    #[tokio::test]
    async fn agent_turn_is_tagged_with_post_advancement_step() {
        let crew = ScriptedCrew::replies(&["Step 1 complete. Moving to step 2."]);
        let mut session = session(crew);

        session.process_message("ok").await;
        assert_eq!(session.state.current_step, 2);
        assert_eq!(session.state.history[0].step, 1);
        assert_eq!(session.state.history[1].step, 2);
    }

    #[tokio::test]
    async fn crew_failure_degrades_to_apology() {
        let crew = ScriptedCrew::failing();
        let mut session = session(crew);
        session.state.symptoms.severity = Some("anxiety: 9".to_string());
        let slots_before = session.state.symptoms.clone();
        let step_before = session.state.current_step;

        let reply = session.process_message("hello?").await;

        assert!(reply.contains("encountered an error"));
        assert!(reply.contains("no language model is configured"));
        // One user turn and exactly one agent turn were added.
        assert_eq!(session.state.history.len(), 2);
        assert_eq!(session.state.history[1].role, Role::Agent);
        assert_eq!(session.state.history[1].text, reply);
        // Slots and step are untouched by the failed call.
        assert_eq!(session.state.symptoms, slots_before);
        assert_eq!(session.state.current_step, step_before);
    }

    #[tokio::test]
    async fn selected_treatment_is_passed_after_selection() {
        let crew = ScriptedCrew::replies(&["Here are your options", "Good choice"]);
        let mut session = session(crew.clone());
        session.state.current_step = 5;

        session.process_message("I'll go with option 2").await;
        session.process_message("what happens next?").await;

        let inputs = crew.inputs_seen.lock().unwrap();
        assert_eq!(inputs[0].selected_treatment_option, TREATMENT_PENDING);
        assert_eq!(inputs[1].selected_treatment_option, "I'll go with option 2");
    }

    #[tokio::test]
    async fn reset_discards_conversation() {
        let crew = ScriptedCrew::replies(&["Noted"]);
        let mut session = session(crew);
        session.process_message("hello").await;
        assert!(!session.state.history.is_empty());

        session.reset();
        assert!(session.state.history.is_empty());
        assert_eq!(session.state.current_step, 1);
        assert_eq!(session.id, "session-1");
    }

    #[tokio::test]
    async fn json_fallback_when_no_raw_text() {
        let crew = Arc::new(ScriptedCrew {
            outcomes: Mutex::new(VecDeque::from([Ok(KickoffOutput {
                task_id: "task-7".to_string(),
                raw: None,
                task_runs: Vec::new(),
            })])),
            inputs_seen: Mutex::new(Vec::new()),
        });
        let mut session = session(crew);

        let reply = session.process_message("hello").await;
        assert!(reply.contains("task-7"));
    }
}
