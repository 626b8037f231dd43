pub mod bounding;
pub mod types;
pub mod specialist;
pub mod synthesis;
pub mod orchestrator;

pub use orchestrator::DiagnosticPipeline;
pub use types::{
    DiagnosisOutcome, DiagnosisReport, Role, SpecialistOutput, SpecialistReports,
    SynthesizedDiagnosis, ValidatedDiagnosis,
};
