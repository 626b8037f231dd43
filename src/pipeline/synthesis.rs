//! Synthesis of the three specialist outputs and the correction pass that
//! follows it.

use super::bounding::{bound_words, has_content, DIAGNOSIS_WORD_LIMIT};
use super::types::{Role, SpecialistReports, SynthesizedDiagnosis, ValidatedDiagnosis};
use crate::generation::TextGenerator;

pub const SYNTHESIS_FALLBACK: &str =
    "Unable to generate a diagnosis due to insufficient information.";

pub fn build_synthesis_prompt(reports: &SpecialistReports) -> String {
    format!(
        "You are a multidisciplinary medical team leader synthesizing specialist reports.

Given Reports:
Cardiologist Report: {cardiac}
Psychologist Report: {psychological}
Pulmonologist Report: {respiratory}

IMPORTANT: Create a concise, accurate final diagnosis based ONLY on information explicitly mentioned in the specialist reports. DO NOT assume or invent any conditions not specifically mentioned in the reports.

Please provide a brief analysis in this format:

[Brief 1-3 sentence summary of the main findings and recommendations]
• [Key finding 1]
• [Key finding 2 (if present)]
• [Key recommendation(s)]

Your final diagnosis should be under 100 words total.",
        cardiac = reports.get(Role::Cardiac).text,
        psychological = reports.get(Role::Psychological).text,
        respiratory = reports.get(Role::Respiratory).text,
    )
}

pub fn build_validation_prompt(
    synthesized: &SynthesizedDiagnosis,
    reports: &SpecialistReports,
) -> String {
    let mut prompt = String::from("Review this medical analysis for accuracy and hallucination:\n");
    prompt.push_str(&synthesized.text);
    prompt.push_str("\n\nSpecialist reports it must be supported by:\n");
    for output in reports.iter() {
        prompt.push_str(&format!("{}: {}\n", output.role.title(), output.text));
    }
    prompt.push_str(
        "
IMPORTANT INSTRUCTIONS:
1. Remove any statements not directly supported by the specialist reports
2. Check if the analysis invents or assumes any conditions not explicitly mentioned
3. Ensure all recommendations follow directly from the mentioned symptoms
4. Make the response concise (max 100 words)
5. Avoid diagnostic terms unless clearly supported

Corrected analysis:",
    );
    prompt
}

/// Combines specialist outputs into one bounded diagnosis.
pub struct SynthesisAgent<'a, G: TextGenerator + ?Sized> {
    generator: &'a G,
}

impl<'a, G: TextGenerator + ?Sized> SynthesisAgent<'a, G> {
    pub fn new(generator: &'a G) -> Self {
        Self { generator }
    }

    pub fn run(&self, reports: &SpecialistReports) -> SynthesizedDiagnosis {
        let prompt = build_synthesis_prompt(reports);
        match self.generator.generate(&prompt) {
            Ok(response) if has_content(&response) => {
                bound_words(&response, DIAGNOSIS_WORD_LIMIT).into()
            }
            Ok(_) => {
                tracing::warn!("Synthesis returned empty text, using fallback");
                Self::fallback()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Synthesis generation failed, using fallback");
                Self::fallback()
            }
        }
    }

    fn fallback() -> SynthesizedDiagnosis {
        SynthesizedDiagnosis {
            text: SYNTHESIS_FALLBACK.to_string(),
            truncated: false,
        }
    }

    /// Correction pass over a synthesized diagnosis.
    ///
    /// On failure the synthesized text is kept unchanged and marked
    /// `validated: false`.
    pub fn validate(
        &self,
        synthesized: &SynthesizedDiagnosis,
        reports: &SpecialistReports,
    ) -> ValidatedDiagnosis {
        let prompt = build_validation_prompt(synthesized, reports);
        match self.generator.generate(&prompt) {
            Ok(response) if has_content(&response) => {
                let bounded = bound_words(&response, DIAGNOSIS_WORD_LIMIT);
                ValidatedDiagnosis {
                    text: bounded.text,
                    truncated: bounded.truncated,
                    validated: true,
                }
            }
            Ok(_) => {
                tracing::warn!("Validation returned empty text, keeping synthesized diagnosis");
                ValidatedDiagnosis::unvalidated(synthesized)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Validation failed, keeping synthesized diagnosis");
                ValidatedDiagnosis::unvalidated(synthesized)
            }
        }
    }
}
