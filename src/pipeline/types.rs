use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::bounding::BoundedText;

/// Specialist roles on the panel. The set is fixed.
///
/// Serialized under the specialist's title (`Cardiologist`, ...), which is
/// also the key used in outbound reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Cardiologist")]
    Cardiac,
    #[serde(rename = "Psychologist")]
    Psychological,
    #[serde(rename = "Pulmonologist")]
    Respiratory,
}

impl Role {
    pub fn all() -> &'static [Role] {
        &[Self::Cardiac, Self::Psychological, Self::Respiratory]
    }

    /// Position in `Role::all()`.
    pub fn index(self) -> usize {
        match self {
            Self::Cardiac => 0,
            Self::Psychological => 1,
            Self::Respiratory => 2,
        }
    }

    /// Title of the specialist playing this role.
    pub fn title(self) -> &'static str {
        match self {
            Self::Cardiac => "Cardiologist",
            Self::Psychological => "Psychologist",
            Self::Respiratory => "Pulmonologist",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cardiac => write!(f, "cardiac"),
            Self::Psychological => write!(f, "psychological"),
            Self::Respiratory => write!(f, "respiratory"),
        }
    }
}

/// One specialist's bounded analysis of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialistOutput {
    pub role: Role,
    pub text: String,
    pub truncated: bool,
}

impl SpecialistOutput {
    pub fn new(role: Role, bounded: BoundedText) -> Self {
        Self {
            role,
            text: bounded.text,
            truncated: bounded.truncated,
        }
    }
}

/// Exactly one output per role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialistReports {
    cardiac: SpecialistOutput,
    psychological: SpecialistOutput,
    respiratory: SpecialistOutput,
}

impl SpecialistReports {
    /// Build from per-role outputs. Returns `None` if an output is filed
    /// under the wrong role.
    pub fn new(
        cardiac: SpecialistOutput,
        psychological: SpecialistOutput,
        respiratory: SpecialistOutput,
    ) -> Option<Self> {
        if cardiac.role != Role::Cardiac
            || psychological.role != Role::Psychological
            || respiratory.role != Role::Respiratory
        {
            return None;
        }
        Some(Self {
            cardiac,
            psychological,
            respiratory,
        })
    }

    /// File each output under its own role; roles with no output get
    /// `missing(role)` as their text. A later output for the same role
    /// replaces an earlier one.
    pub fn assemble<I, F>(outputs: I, mut missing: F) -> Self
    where
        I: IntoIterator<Item = SpecialistOutput>,
        F: FnMut(Role) -> String,
    {
        let mut fill = |role| SpecialistOutput {
            role,
            text: missing(role),
            truncated: false,
        };
        let mut slots: [Option<SpecialistOutput>; 3] = [None, None, None];
        for output in outputs {
            let index = output.role.index();
            slots[index] = Some(output);
        }
        let [cardiac, psychological, respiratory] = slots;
        let cardiac = cardiac.unwrap_or_else(|| fill(Role::Cardiac));
        let psychological = psychological.unwrap_or_else(|| fill(Role::Psychological));
        let respiratory = respiratory.unwrap_or_else(|| fill(Role::Respiratory));
        Self {
            cardiac,
            psychological,
            respiratory,
        }
    }

    pub fn get(&self, role: Role) -> &SpecialistOutput {
        match role {
            Role::Cardiac => &self.cardiac,
            Role::Psychological => &self.psychological,
            Role::Respiratory => &self.respiratory,
        }
    }

    /// Outputs in `Role::all()` order.
    pub fn iter(&self) -> impl Iterator<Item = &SpecialistOutput> {
        [&self.cardiac, &self.psychological, &self.respiratory].into_iter()
    }

    /// Role → text, keyed for the outbound report.
    pub fn texts(&self) -> BTreeMap<Role, String> {
        self.iter().map(|o| (o.role, o.text.clone())).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesizedDiagnosis {
    pub text: String,
    pub truncated: bool,
}

impl From<BoundedText> for SynthesizedDiagnosis {
    fn from(bounded: BoundedText) -> Self {
        Self {
            text: bounded.text,
            truncated: bounded.truncated,
        }
    }
}

/// The diagnosis kept as a session's current diagnosis.
///
/// `validated` is false when the correction pass failed and the
/// synthesized text was kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedDiagnosis {
    pub text: String,
    pub truncated: bool,
    pub validated: bool,
}

impl ValidatedDiagnosis {
    pub fn unvalidated(synthesized: &SynthesizedDiagnosis) -> Self {
        Self {
            text: synthesized.text.clone(),
            truncated: synthesized.truncated,
            validated: false,
        }
    }
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisOutcome {
    pub specialists: SpecialistReports,
    pub synthesized: SynthesizedDiagnosis,
    pub diagnosis: ValidatedDiagnosis,
}

impl DiagnosisOutcome {
    pub fn to_report(&self) -> DiagnosisReport {
        DiagnosisReport {
            specialist_reports: self.specialists.texts(),
            final_diagnosis: self.diagnosis.text.clone(),
        }
    }
}

/// Outbound result of a report analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisReport {
    pub specialist_reports: BTreeMap<Role, String>,
    pub final_diagnosis: String,
}

impl DiagnosisReport {
    /// Text persisted alongside an analyzed report.
    pub fn render_final_diagnosis(&self) -> String {
        format!("### Final Diagnosis:\n\n{}", self.final_diagnosis)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
