//! Per-turn dispatch of chat messages to the panel.
//!
//! One turn holds its session's lock from classification until the reply
//! is produced, so concurrent messages for the same session apply in
//! sequence. Generation failures never surface as errors here; each path
//! has its own fixed reply.

use serde::{Deserialize, Serialize};

use super::classify::{classify_message, Condition, Intent};
use super::prompt::{
    build_condition_prompt, build_conversation_prompt, build_doctor_prompt,
    build_structuring_prompt, build_treatment_prompt, wrap_diagnosis,
    CONDITION_INFO_UNAVAILABLE, DIALOGUE_UNAVAILABLE, DOCTOR_NEEDS_SYMPTOMS,
    NO_DIAGNOSIS_FOR_DOCTOR, NO_DIAGNOSIS_FOR_TREATMENT, RECOMMENDATION_UNAVAILABLE,
    TREATMENT_NEEDS_SYMPTOMS,
};
use crate::generation::TextGenerator;
use crate::pipeline::bounding::{bound_words, has_content, DIAGNOSIS_WORD_LIMIT};
use crate::pipeline::DiagnosticPipeline;
use crate::session::{ConversationState, SessionError, SessionId, SessionStore};

/// Condition answers share the diagnosis bound.
const CONDITION_WORD_LIMIT: usize = DIAGNOSIS_WORD_LIMIT;

/// Reply to one chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReply {
    pub intent: Intent,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recommendation {
    Treatment,
    Doctor,
}

impl Recommendation {
    fn prompt(self, diagnosis: &str) -> String {
        match self {
            Self::Treatment => build_treatment_prompt(diagnosis),
            Self::Doctor => build_doctor_prompt(diagnosis),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Treatment => "treatment",
            Self::Doctor => "doctor",
        }
    }
}

pub struct IntentRouter<'a, G: TextGenerator + ?Sized> {
    generator: &'a G,
    pipeline: DiagnosticPipeline<'a, G>,
    sessions: &'a SessionStore,
}

impl<'a, G: TextGenerator + ?Sized> IntentRouter<'a, G> {
    pub fn new(generator: &'a G, sessions: &'a SessionStore) -> Self {
        Self::with_pipeline(generator, DiagnosticPipeline::new(generator), sessions)
    }

    pub fn with_pipeline(
        generator: &'a G,
        pipeline: DiagnosticPipeline<'a, G>,
        sessions: &'a SessionStore,
    ) -> Self {
        Self {
            generator,
            pipeline,
            sessions,
        }
    }

    /// Handle one user message for `session`.
    pub fn respond(&self, session: &SessionId, message: &str) -> Result<TurnReply, SessionError> {
        let intent = classify_message(message);
        tracing::debug!(session = %session, intent = ?intent, chars = message.len(), "Routing message");

        self.sessions.with_session(session, |state| {
            let text = match intent {
                Intent::ConditionLookup(condition) => self.condition_info(condition),
                Intent::SymptomDescription => self.diagnose_symptoms(state, message),
                Intent::TreatmentFollowUp => self
                    .recommend(state, Recommendation::Treatment)
                    .unwrap_or_else(|| TREATMENT_NEEDS_SYMPTOMS.to_string()),
                Intent::DoctorFollowUp => self
                    .recommend(state, Recommendation::Doctor)
                    .unwrap_or_else(|| DOCTOR_NEEDS_SYMPTOMS.to_string()),
                Intent::OpenDialogue => self.converse(state, message),
            };
            TurnReply { intent, text }
        })
    }

    /// Treatment advice for the session's current diagnosis.
    pub fn treatment_recommendations(&self, session: &SessionId) -> Result<String, SessionError> {
        self.sessions.with_session(session, |state| {
            self.recommend(state, Recommendation::Treatment)
                .unwrap_or_else(|| NO_DIAGNOSIS_FOR_TREATMENT.to_string())
        })
    }

    /// Doctor-visit advice for the session's current diagnosis.
    pub fn doctor_recommendation(&self, session: &SessionId) -> Result<String, SessionError> {
        self.sessions.with_session(session, |state| {
            self.recommend(state, Recommendation::Doctor)
                .unwrap_or_else(|| NO_DIAGNOSIS_FOR_DOCTOR.to_string())
        })
    }

    fn condition_info(&self, condition: Condition) -> String {
        match self.generator.generate(&build_condition_prompt(condition)) {
            Ok(response) if has_content(&response) => {
                bound_words(&response, CONDITION_WORD_LIMIT).text
            }
            Ok(_) => {
                tracing::warn!(condition = %condition, "Condition lookup returned empty text");
                CONDITION_INFO_UNAVAILABLE.to_string()
            }
            Err(e) => {
                tracing::warn!(condition = %condition, error = %e, "Condition lookup failed");
                CONDITION_INFO_UNAVAILABLE.to_string()
            }
        }
    }

    fn diagnose_symptoms(&self, state: &mut ConversationState, message: &str) -> String {
        let report = self.structure_symptoms(message);
        let outcome = self.pipeline.run(&report);
        let reply = wrap_diagnosis(&outcome.diagnosis.text);
        state.record_diagnosis(outcome.diagnosis, outcome.specialists);
        reply
    }

    /// Structured symptom summary, or the raw message if structuring fails.
    fn structure_symptoms(&self, message: &str) -> String {
        match self.generator.generate(&build_structuring_prompt(message)) {
            Ok(response) if !response.trim().is_empty() => response.trim().to_string(),
            Ok(_) => {
                tracing::warn!("Symptom structuring returned empty text, using raw message");
                message.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Symptom structuring failed, using raw message");
                message.to_string()
            }
        }
    }

    /// `None` when the session has no diagnosis yet; no call is made then.
    fn recommend(&self, state: &ConversationState, kind: Recommendation) -> Option<String> {
        let diagnosis = state.current_diagnosis()?;
        let reply = match self.generator.generate(&kind.prompt(&diagnosis.text)) {
            Ok(response) if !response.trim().is_empty() => response.trim().to_string(),
            Ok(_) => {
                tracing::warn!(kind = kind.label(), "Recommendation returned empty text");
                RECOMMENDATION_UNAVAILABLE.to_string()
            }
            Err(e) => {
                tracing::warn!(kind = kind.label(), error = %e, "Recommendation failed");
                RECOMMENDATION_UNAVAILABLE.to_string()
            }
        };
        Some(reply)
    }

    /// History only grows on a successful reply.
    fn converse(&self, state: &mut ConversationState, message: &str) -> String {
        let prompt = build_conversation_prompt(state.history(), message);
        match self.generator.generate(&prompt) {
            Ok(response) if !response.trim().is_empty() => {
                let reply = response.trim().to_string();
                state.push_exchange(message, &reply);
                reply
            }
            Ok(_) => {
                tracing::warn!("Dialogue turn returned empty text");
                DIALOGUE_UNAVAILABLE.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dialogue turn failed");
                DIALOGUE_UNAVAILABLE.to_string()
            }
        }
    }
}
