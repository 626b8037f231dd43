//! Entry point for the web layer: owns the generator, the session store
//! and the configuration, and hands out borrowed routers and pipelines.

use thiserror::Error;

use crate::chat::{IntentRouter, TurnReply};
use crate::config::{ConfigError, PanelConfig};
use crate::generation::{GenerationError, OllamaClient, TextGenerator};
use crate::pipeline::{DiagnosisReport, DiagnosticPipeline};
use crate::session::{SessionError, SessionId, SessionStore};

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Generation service error: {0}")]
    Generation(#[from] GenerationError),
}

pub struct MedicalPanel<G: TextGenerator> {
    generator: G,
    sessions: SessionStore,
    config: PanelConfig,
}

impl<G: TextGenerator> MedicalPanel<G> {
    pub fn new(generator: G, config: PanelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            generator,
            sessions: SessionStore::new(),
            config,
        })
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn pipeline(&self) -> DiagnosticPipeline<'_, G> {
        DiagnosticPipeline::with_workers(&self.generator, self.config.specialist_workers)
    }

    pub fn router(&self) -> IntentRouter<'_, G> {
        IntentRouter::with_pipeline(&self.generator, self.pipeline(), &self.sessions)
    }

    /// One chat turn for `session`.
    pub fn chat(&self, session: &SessionId, message: &str) -> Result<TurnReply, SessionError> {
        self.router().respond(session, message)
    }

    /// Run the panel on an uploaded report.
    ///
    /// With a session, the diagnosis and specialist outputs become that
    /// session's current diagnosis so follow-up questions can use them.
    pub fn analyze_report(
        &self,
        session: Option<&SessionId>,
        report: &str,
    ) -> Result<DiagnosisReport, SessionError> {
        let outcome = self.pipeline().run(report);
        let result = outcome.to_report();

        if let Some(id) = session {
            self.sessions.with_session(id, |state| {
                state.record_diagnosis(outcome.diagnosis, outcome.specialists);
            })?;
            tracing::debug!(session = %id, "Report diagnosis stored in session");
        }

        Ok(result)
    }

    pub fn treatment_recommendations(&self, session: &SessionId) -> Result<String, SessionError> {
        self.router().treatment_recommendations(session)
    }

    pub fn doctor_recommendation(&self, session: &SessionId) -> Result<String, SessionError> {
        self.router().doctor_recommendation(session)
    }

    /// Discard the session's state. Returns whether a state existed.
    pub fn clear_session(&self, session: &SessionId) -> Result<bool, SessionError> {
        self.sessions.clear(session)
    }
}

impl MedicalPanel<OllamaClient> {
    /// Panel backed by the Ollama instance named in `config`.
    pub fn from_config(config: PanelConfig) -> Result<Self, PanelError> {
        config.validate()?;
        let client = OllamaClient::from_config(&config)?;
        tracing::info!(url = client.base_url(), model = client.model(), "Medical panel ready");
        Ok(Self::new(client, config)?)
    }

    /// Whether the configured model is listed by the Ollama instance.
    pub fn check_model(&self) -> Result<bool, GenerationError> {
        self.generator.is_model_available()
    }
}
