pub mod config;
pub mod generation;
pub mod pipeline;
pub mod session;
pub mod chat;
pub mod panel;

pub use chat::{Intent, IntentRouter, TurnReply};
pub use config::{ConfigError, PanelConfig};
pub use generation::{GenerationError, OllamaClient, TextGenerator};
pub use panel::{MedicalPanel, PanelError};
pub use pipeline::{DiagnosisReport, DiagnosticPipeline, Role, ValidatedDiagnosis};
pub use session::{ConversationState, SessionError, SessionId, SessionStore};

use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber.
///
/// `RUST_LOG` wins over `config.log_filter`. Safe to call more than once;
/// later calls leave the first subscriber in place.
pub fn init_tracing(config: &PanelConfig) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(
            app = crate::config::APP_NAME,
            version = crate::config::APP_VERSION,
            model = %config.model,
            "Tracing initialized"
        );
    }
}
