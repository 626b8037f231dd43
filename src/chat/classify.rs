//! Keyword and phrase heuristics that pick a handling path for a chat
//! message.
//!
//! Paths are tried in a fixed order and the first match wins: condition
//! lookup, symptom description, treatment follow-up, doctor follow-up,
//! then open dialogue. A message naming a known condition inside a lookup
//! phrase is a lookup even if it also carries symptom vocabulary.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Conditions the panel answers general questions about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Flu,
    Cold,
    Covid,
    Headache,
    Stomach,
    Allergy,
    Fever,
}

impl Condition {
    pub fn all() -> &'static [Condition] {
        &[
            Self::Flu,
            Self::Cold,
            Self::Covid,
            Self::Headache,
            Self::Stomach,
            Self::Allergy,
            Self::Fever,
        ]
    }

    /// Name used in the information prompt.
    pub fn name(self) -> &'static str {
        match self {
            Self::Flu => "flu",
            Self::Cold => "cold",
            Self::Covid => "covid",
            Self::Headache => "headache",
            Self::Stomach => "stomach",
            Self::Allergy => "allergy",
            Self::Fever => "fever",
        }
    }

    /// Words a user may use for the condition.
    fn terms(self) -> &'static [&'static str] {
        match self {
            Self::Flu => &["flu", "influenza"],
            Self::Cold => &["cold", "common cold"],
            Self::Covid => &["covid", "coronavirus", "covid-19", "covid19"],
            Self::Headache => &["headache", "migraine"],
            Self::Stomach => &["stomach ache", "stomach pain", "stomachache", "indigestion"],
            Self::Allergy => &["allergy", "allergic", "allergies"],
            Self::Fever => &["fever", "high temperature"],
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handling path chosen for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "condition", rename_all = "snake_case")]
pub enum Intent {
    ConditionLookup(Condition),
    SymptomDescription,
    TreatmentFollowUp,
    DoctorFollowUp,
    OpenDialogue,
}

/// Classify a chat message into a handling path.
pub fn classify_message(text: &str) -> Intent {
    let lower = text.to_lowercase();

    if let Some(condition) = match_condition(&lower) {
        return Intent::ConditionLookup(condition);
    }

    if is_symptom_description(&lower) {
        return Intent::SymptomDescription;
    }

    if is_treatment_query(&lower) {
        return Intent::TreatmentFollowUp;
    }

    if is_doctor_query(&lower) {
        return Intent::DoctorFollowUp;
    }

    Intent::OpenDialogue
}

// ═══════════════════════════════════════════════════════════
// Condition lookup
// ═══════════════════════════════════════════════════════════

const ARTICLE: &str = r"(?:(?:the|a|an)\s+)?";

struct ConditionPattern {
    condition: Condition,
    regex: Regex,
}

/// Direct questions: "symptoms of X", "what is X", "do i have X".
static QUESTION_PATTERNS: LazyLock<Vec<ConditionPattern>> = LazyLock::new(|| {
    condition_patterns(|terms| {
        format!(
            r"\b(?:(?:symptoms|signs)\s+of|what\s+is|what's|how\s+do\s+i\s+know\s+if\s+i\s+have|do\s+i\s+have)\s+{ARTICLE}{terms}\b|\bwhat\s+are\s+{ARTICLE}{terms}\s+symptoms\b"
        )
    })
});

/// Topic mentions: "treatment for X", "about X", "X remedy".
static TOPIC_PATTERNS: LazyLock<Vec<ConditionPattern>> = LazyLock::new(|| {
    condition_patterns(|terms| {
        format!(
            r"\b(?:treatment(?:\s+options?)?\s+for|what\s+about|info\s+on|about|if\s+i\s+have)\s+{ARTICLE}{terms}\b|\b{terms}\s+(?:treatment|remedy|medicine)"
        )
    })
});

fn condition_patterns(template: impl Fn(&str) -> String) -> Vec<ConditionPattern> {
    Condition::all()
        .iter()
        .map(|&condition| ConditionPattern {
            condition,
            regex: Regex::new(&template(&term_alternation(condition)))
                .expect("Invalid condition regex pattern"),
        })
        .collect()
}

/// `(?:common\s+cold|cold)`, longest term first.
fn term_alternation(condition: Condition) -> String {
    let mut terms: Vec<&str> = condition.terms().to_vec();
    terms.sort_by_key(|t| std::cmp::Reverse(t.len()));
    let escaped: Vec<String> = terms
        .iter()
        .map(|t| regex::escape(t).replace(' ', r"\s+"))
        .collect();
    format!("(?:{})", escaped.join("|"))
}

/// The condition a lowercase message asks about, if any.
///
/// Direct questions are checked for every condition before topic mentions.
pub fn match_condition(lower: &str) -> Option<Condition> {
    QUESTION_PATTERNS
        .iter()
        .chain(TOPIC_PATTERNS.iter())
        .find(|p| p.regex.is_match(lower))
        .map(|p| p.condition)
}

// ═══════════════════════════════════════════════════════════
// Keyword families
// ═══════════════════════════════════════════════════════════

const SYMPTOM_KEYWORDS: &[&str] = &[
    // Physical
    "pain", "ache", "sore", "discomfort", "pressure", "tight", "numb", "tingling", "burning",
    "sharp", "dull", "throbbing", "fever", "chill", "sweat", "fatigue", "tired", "weak", "dizzy",
    "faint", "nausea", "vomit", "diarrhea", "constipation", "cough", "breath", "wheeze", "chest",
    "heart", "palpitation", "stomach", "headache", "migraine", "vision", "hearing", "rash", "itch",
    "swelling", "bleeding", "bruise",
    // Psychological
    "anxiety", "stress", "worry", "fear", "panic", "depression", "mood", "angry", "irritable",
    "confused", "memory", "concentration", "sleep", "insomnia", "nightmare", "appetite", "energy",
    // Descriptive
    "symptom", "feel", "experiencing", "notice", "problem", "condition", "issue", "concern",
    "worse", "better", "started", "developed", "changed", "constant", "intermittent",
];

/// Whole words only; "for" is left out because it appears in most questions.
const TEMPORAL_MARKERS: &[&str] = &[
    "since", "days", "weeks", "months", "years", "today", "yesterday",
];

const TREATMENT_KEYWORDS: &[&str] = &[
    "treatment", "cure", "medicine", "medication", "drug", "pill", "remedy", "heal", "therapy",
    "therapies", "care",
];

const DOCTOR_KEYWORDS: &[&str] = &[
    "doctor", "physician", "specialist", "hospital", "clinic", "appointment", "visit", "consult",
    "consultation",
];

fn whole_word_regex(words: &[&str]) -> Regex {
    let alternation: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    Regex::new(&format!(r"\b(?:{})\b", alternation.join("|"))).expect("Invalid keyword regex")
}

static TEMPORAL_REGEX: LazyLock<Regex> = LazyLock::new(|| whole_word_regex(TEMPORAL_MARKERS));

/// Keywords match anywhere in the text ("ache" matches "toothache").
fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Symptom vocabulary or a temporal marker.
pub fn is_symptom_description(lower: &str) -> bool {
    contains_any(lower, SYMPTOM_KEYWORDS) || TEMPORAL_REGEX.is_match(lower)
}

pub fn is_treatment_query(lower: &str) -> bool {
    contains_any(lower, TREATMENT_KEYWORDS)
}

pub fn is_doctor_query(lower: &str) -> bool {
    contains_any(lower, DOCTOR_KEYWORDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn what_is_the_flu_is_condition_lookup() {
        assert_eq!(
            classify_message("what is the flu"),
            Intent::ConditionLookup(Condition::Flu)
        );
    }

    #[test]
    fn chest_pain_since_yesterday_is_symptom_description() {
        assert_eq!(
            classify_message("I have chest pain since yesterday"),
            Intent::SymptomDescription
        );
    }

    #[test]
    fn direct_question_phrasings() {
        let cases = [
            ("What are the symptoms of influenza?", Condition::Flu),
            ("signs of a cold", Condition::Cold),
            ("what's covid-19", Condition::Covid),
            ("How do I know if I have a migraine", Condition::Headache),
            ("do i have allergies", Condition::Allergy),
            ("what are flu symptoms", Condition::Flu),
        ];
        for (message, expected) in cases {
            assert_eq!(
                classify_message(message),
                Intent::ConditionLookup(expected),
                "{message}"
            );
        }
    }

    #[test]
    fn topic_phrasings() {
        let cases = [
            ("treatment for the common cold", Condition::Cold),
            ("treatment options for indigestion", Condition::Stomach),
            ("what about coronavirus?", Condition::Covid),
            ("info on high temperature", Condition::Fever),
            ("headache remedy", Condition::Headache),
            ("best fever medicine", Condition::Fever),
        ];
        for (message, expected) in cases {
            assert_eq!(
                classify_message(message),
                Intent::ConditionLookup(expected),
                "{message}"
            );
        }
    }

    #[test]
    fn condition_lookup_beats_symptom_keywords() {
        // "pain" and "since" are symptom cues, but the lookup phrase wins.
        assert_eq!(
            classify_message("I've had pain since Monday, what are the signs of a stomach ache?"),
            Intent::ConditionLookup(Condition::Stomach)
        );
    }

    #[test]
    fn condition_terms_need_word_boundary() {
        assert_eq!(match_condition("what is fluid retention"), None);
        assert_eq!(match_condition("what is the flu"), Some(Condition::Flu));
    }

    #[test]
    fn temporal_marker_alone_is_symptom_description() {
        assert_eq!(classify_message("it started 3 days ago"), Intent::SymptomDescription);
        assert_eq!(classify_message("only since monday"), Intent::SymptomDescription);
    }

    #[test]
    fn psychological_vocabulary_is_symptom_description() {
        assert_eq!(classify_message("I can't sleep and I'm anxious"), Intent::SymptomDescription);
        assert_eq!(classify_message("Feeling irritable lately"), Intent::SymptomDescription);
    }

    #[test]
    fn compound_symptom_words_are_symptom_descriptions() {
        for message in [
            "I have a toothache",
            "my backache is bad",
            "bad earache",
            "bellyache all night",
        ] {
            assert_eq!(classify_message(message), Intent::SymptomDescription, "{message}");
        }
    }

    #[test]
    fn for_is_not_a_temporal_marker() {
        assert_eq!(
            classify_message("What medication should I take for this?"),
            Intent::TreatmentFollowUp
        );
    }

    #[test]
    fn treatment_follow_up() {
        assert_eq!(classify_message("What medication should I take?"), Intent::TreatmentFollowUp);
        assert_eq!(classify_message("is there a cure"), Intent::TreatmentFollowUp);
    }

    #[test]
    fn doctor_follow_up() {
        assert_eq!(classify_message("Should I see a doctor?"), Intent::DoctorFollowUp);
        assert_eq!(classify_message("do I need an appointment"), Intent::DoctorFollowUp);
    }

    #[test]
    fn treatment_outranks_doctor() {
        assert_eq!(
            classify_message("which doctor gives the right treatment"),
            Intent::TreatmentFollowUp
        );
    }

    #[test]
    fn everything_else_is_open_dialogue() {
        assert_eq!(classify_message("hello there"), Intent::OpenDialogue);
        assert_eq!(classify_message("thanks for the help"), Intent::OpenDialogue);
        assert_eq!(classify_message(""), Intent::OpenDialogue);
    }

    #[test]
    fn every_condition_reachable() {
        for condition in Condition::all() {
            for term in condition.terms() {
                let message = format!("tell me about {term}");
                assert_eq!(match_condition(&message), Some(*condition), "{message}");
            }
        }
    }
}
