//! Agent and task definitions for the intake crew

use super::KickoffInputs;

/// Upper bound on LLM round-trips per task
pub const MAX_TASK_ITERATIONS: u32 = 25;

/// Sampling temperature used by both agents
pub const AGENT_TEMPERATURE: f32 = 0.7;

pub const COORDINATOR_ROLE: &str = "Conversational Diagnostic Coordinator";
pub const PLAN_WRITER_ROLE: &str = "Treatment Plan Writer";

/// Configuration for one agent
#[derive(Debug, Clone)]
pub struct AgentSpec {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
    pub max_iterations: u32,
    pub temperature: f32,
}

impl AgentSpec {
    /// Render the agent configuration into a system prompt
    pub fn system_prompt(&self) -> String {
        format!(
            "You are the {role}.\n\nGoal: {goal}\n\n{backstory}",
            role = self.role,
            goal = self.goal,
            backstory = self.backstory
        )
    }
}

/// Configuration for one task; the description is a template interpolated
/// with the kickoff inputs
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub expected_output: &'static str,
    pub agent_role: &'static str,
}

const COORDINATOR_BACKSTORY: &str = "\
You are a licensed psychological assessment coordinator conducting a \
structured intake interview. The interview has six fixed steps:

1. Symptom Assessment - severity, frequency, triggers, specific symptoms, coping
2. Duration and Temporal Patterns - timeline, episodic vs continuous pattern
3. Functional Impact Assessment - work, relationships, daily activities
4. Clinical Diagnosis - a working diagnosis from the gathered information
5. Treatment Options - present two or three evidence-based options and ask \
the patient to choose
6. Treatment Plan Generation - hand off for the comprehensive plan

Interview style:
- Ask one focused question at a time and acknowledge what the patient shares.
- Never re-ask for information listed as already collected in the \
conversation context.
- When the context says a step has sufficient information, say so and \
announce the transition explicitly, e.g. \"Step 1 complete. Moving to step \
2.\" Always use that phrasing (\"step N complete\", \"moving to step N\") so \
progress is unambiguous.
- In step 4, state the working diagnosis plainly before moving on.
- In step 5, number the options (Option 1, Option 2, ...) so the patient can \
pick one by name.
- Use knowledge_search for established clinical practice and web_search for \
current treatment research when you need support for a recommendation.
- You are conducting an assessment, not providing emergency care; if the \
patient describes an immediate crisis, advise contacting local emergency \
services.";

const PLAN_WRITER_BACKSTORY: &str = "\
You are a clinical writer who turns completed intake assessments into \
professional treatment plans. Your plans are organized markdown documents \
with sections for presenting concerns, diagnosis, the selected treatment \
approach, goals with timelines, session structure, self-care strategies, \
and follow-up. Ground recommendations in the reference material available \
through knowledge_search, supplemented by web_search for current guidance. \
Always title the document as a treatment plan so its purpose is clear.";

/// The two agents of the intake crew, in task order
pub fn intake_agents() -> Vec<AgentSpec> {
    vec![
        AgentSpec {
            role: COORDINATOR_ROLE,
            goal: "Conduct an interactive six-step psychological assessment, \
                   gathering the information each step needs and announcing \
                   step transitions explicitly",
            backstory: COORDINATOR_BACKSTORY,
            max_iterations: MAX_TASK_ITERATIONS,
            temperature: AGENT_TEMPERATURE,
        },
        AgentSpec {
            role: PLAN_WRITER_ROLE,
            goal: "Produce a comprehensive, professional treatment plan for \
                   the assessed patient and their selected treatment option",
            backstory: PLAN_WRITER_BACKSTORY,
            max_iterations: MAX_TASK_ITERATIONS,
            temperature: AGENT_TEMPERATURE,
        },
    ]
}

/// The two tasks of the intake crew, run sequentially
pub fn intake_tasks() -> Vec<TaskSpec> {
    vec![
        TaskSpec {
            name: "interactive_diagnostic_assessment",
            description: "\
Continue the interactive psychological assessment with the patient.

Patient's initial concerns: {patient_concerns}
Current assessment step: {current_step}
Latest patient message: {user_message}

Conversation context:
{conversation_context}

Working diagnosis: {diagnosed_condition}
Selected treatment option: {selected_treatment_option}

Respond to the patient's latest message within the current step. Gather \
what the step still needs, and when the context shows the step is complete, \
announce the transition to the next step.",
            expected_output: "A single conversational reply to the patient, \
                              announcing any step transition with phrases \
                              like 'Step 1 complete' or 'Moving to step 2'.",
            agent_role: COORDINATOR_ROLE,
        },
        TaskSpec {
            name: "professional_treatment_plan_creation",
            description: "\
Prepare the treatment-plan material supporting the assessment above.

Patient's initial concerns: {patient_concerns}
Diagnosed condition: {diagnosed_condition}
Selected treatment option: {selected_treatment_option}

If the assessment has not yet reached treatment planning, briefly note \
what the eventual plan will need to cover for this patient and defer to \
the coordinator's reply. Once a treatment option has been selected, write \
the full professional treatment plan for that option.",
            expected_output: "Either the coordinator's reply passed through \
                              unchanged (assessment still in progress), or a \
                              complete professional treatment plan document.",
            agent_role: PLAN_WRITER_ROLE,
        },
    ]
}

/// Fill a task description template from the kickoff inputs.
///
/// Absent per-message fields render as empty strings, matching the one-shot
/// console flow that seeds only the concern fields.
pub fn interpolate(template: &str, inputs: &KickoffInputs) -> String {
    let current_step = inputs
        .current_step
        .map(|step| step.to_string())
        .unwrap_or_default();

    template
        .replace("{user_message}", inputs.user_message.as_deref().unwrap_or(""))
        .replace("{current_step}", &current_step)
        .replace(
            "{conversation_context}",
            inputs.conversation_context.as_deref().unwrap_or(""),
        )
        .replace("{patient_concerns}", &inputs.patient_concerns)
        .replace("{diagnosed_condition}", &inputs.diagnosed_condition)
        .replace(
            "{selected_treatment_option}",
            &inputs.selected_treatment_option,
        )
}
