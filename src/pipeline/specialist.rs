//! Specialist agents: one role-specific analysis of a report.
//!
//! The three roles share one instruction shape and differ only in the
//! entries of `ROLE_PROFILES`. A failed generation never propagates; the
//! role's fallback sentence is returned instead.

use super::bounding::{bound_words, has_content, SPECIALIST_WORD_LIMIT};
use super::types::{Role, SpecialistOutput};
use crate::generation::TextGenerator;

/// Per-role template entries.
struct RoleProfile {
    role: Role,
    /// "cardiologist"
    specialist: &'static str,
    /// What the specialist is allowed to analyze.
    focus: &'static str,
    /// Symptom family named in the "none mentioned" instruction.
    symptom_family: &'static str,
    /// Subject of the one-line summary.
    findings: &'static str,
    fallback: &'static str,
}

const ROLE_PROFILES: [RoleProfile; 3] = [
    RoleProfile {
        role: Role::Cardiac,
        specialist: "cardiologist",
        focus: "cardiovascular symptoms and concerns",
        symptom_family: "cardiac symptoms",
        findings: "cardiac findings",
        fallback: "No cardiovascular findings or concerns identified in the provided report.",
    },
    RoleProfile {
        role: Role::Psychological,
        specialist: "psychologist",
        focus: "psychological/behavioral symptoms",
        symptom_family: "psychological symptoms",
        findings: "psychological findings",
        fallback: "No psychological findings or concerns identified in the provided report.",
    },
    RoleProfile {
        role: Role::Respiratory,
        specialist: "pulmonologist",
        focus: "respiratory symptoms and concerns",
        symptom_family: "respiratory symptoms",
        findings: "respiratory findings",
        fallback: "No respiratory findings or concerns identified in the provided report.",
    },
];

fn profile(role: Role) -> &'static RoleProfile {
    &ROLE_PROFILES[role.index()]
}

/// Deterministic text used when a role's generation fails.
pub fn fallback_text(role: Role) -> &'static str {
    profile(role).fallback
}

/// Render the role's instructions with `report` inserted verbatim.
pub fn render_specialist_prompt(role: Role, report: &str) -> String {
    let p = profile(role);
    format!(
        "You are a {specialist} examining a patient report.

Patient Report: {report}

IMPORTANT INSTRUCTIONS:
1. Analyze ONLY {focus} EXPLICITLY mentioned in this report
2. DO NOT assume or invent any medical history, conditions, or test results
3. If no {symptom_family} are mentioned, clearly state this (\"No information provided\")
4. Keep your report under 50 words
5. Be factual and avoid speculation

Format your brief analysis as:
[1-2 sentences summarizing {findings} and recommendations only]",
        specialist = p.specialist,
        focus = p.focus,
        symptom_family = p.symptom_family,
        findings = p.findings,
    )
}

/// Runs a single specialist role against a report.
pub struct SpecialistAgent<'a, G: TextGenerator + ?Sized> {
    generator: &'a G,
}

impl<'a, G: TextGenerator + ?Sized> SpecialistAgent<'a, G> {
    pub fn new(generator: &'a G) -> Self {
        Self { generator }
    }

    pub fn run(&self, report: &str, role: Role) -> SpecialistOutput {
        // Nothing to analyze: same answer the role would give, without a call.
        if report.trim().is_empty() {
            tracing::debug!(role = %role, "Empty report, using fallback");
            return self.fallback(role);
        }

        let prompt = render_specialist_prompt(role, report);
        match self.generator.generate(&prompt) {
            Ok(response) if has_content(&response) => {
                let output = SpecialistOutput::new(role, bound_words(&response, SPECIALIST_WORD_LIMIT));
                tracing::debug!(role = %role, truncated = output.truncated, "Specialist finished");
                output
            }
            Ok(_) => {
                tracing::warn!(role = %role, "Specialist returned empty text, using fallback");
                self.fallback(role)
            }
            Err(e) => {
                tracing::warn!(role = %role, error = %e, "Specialist generation failed, using fallback");
                self.fallback(role)
            }
        }
    }

    fn fallback(&self, role: Role) -> SpecialistOutput {
        SpecialistOutput {
            role,
            text: fallback_text(role).to_string(),
            truncated: false,
        }
    }
}
