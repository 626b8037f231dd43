use crate::session::DialogueTurn;

use super::classify::Condition;

/// Returned for a treatment question before any symptoms were described.
pub const TREATMENT_NEEDS_SYMPTOMS: &str = "I can't provide treatment recommendations without knowing your symptoms. \n\nWhat symptoms are you experiencing? Please be specific about what you're feeling.";

/// Returned for a doctor-visit question before any symptoms were described.
pub const DOCTOR_NEEDS_SYMPTOMS: &str = "To advise about seeing a doctor, I need to know your symptoms first.\n\nWhat symptoms are you experiencing, and how long have they been present?";

pub const NO_DIAGNOSIS_FOR_TREATMENT: &str = "I don't have any current diagnosis to provide treatment recommendations for. Please describe your symptoms first.";

pub const NO_DIAGNOSIS_FOR_DOCTOR: &str = "I don't have any current diagnosis to provide doctor visit recommendations for. Please describe your symptoms first.";

pub const CONDITION_INFO_UNAVAILABLE: &str = "I'm sorry, I couldn't retrieve information about that condition right now. Please try again in a moment.";

pub const RECOMMENDATION_UNAVAILABLE: &str = "I'm sorry, I couldn't generate recommendations right now. Please try again in a moment.";

pub const DIALOGUE_UNAVAILABLE: &str = "I'm sorry, I'm having trouble responding right now. Please try again in a moment.";

pub const CONVERSATION_SYSTEM_PROMPT: &str = r#"You are a medical AI assistant. Your primary goal is accuracy.

CRITICAL INSTRUCTIONS:
1. ONLY discuss symptoms and conditions that the user has EXPLICITLY mentioned
2. NEVER assume medical conditions, history, or test results
3. If you don't know something, clearly say so
4. Keep your responses brief and focused
5. When discussing an ailment mentioned by the user, limit yourself to basic information

When replying:
- If the user hasn't described symptoms, ask for them
- Do not diagnose specific conditions unless they were explicitly mentioned by the user
- Avoid using medical jargon without explanation
- If the user asks about a condition they haven't mentioned symptoms for, provide general information without assuming they have it

Your responses should be factual, brief, and avoid creating anxiety."#;

/// Standalone information request about a known condition.
pub fn build_condition_prompt(condition: Condition) -> String {
    format!(
        "Provide brief information about {condition}, including:

1. Common symptoms (list these first and in detail)
2. Basic home care recommendations
3. When to see a doctor

Keep this concise (under 100 words) and focus ONLY on {condition}.
Do NOT mention other conditions or assume the patient has any other conditions.
Start with the symptoms since that's what users are most interested in."
    )
}

/// Turns a free-text symptom message into a structured report.
pub fn build_structuring_prompt(message: &str) -> String {
    format!(
        "Analyze the following patient report and extract ONLY symptoms that are EXPLICITLY mentioned:
{message}

IMPORTANT INSTRUCTIONS:
1. ONLY list symptoms explicitly mentioned by the patient
2. DO NOT add or assume any symptoms, conditions, or medical history
3. DO NOT include symptoms that might \"typically\" occur but aren't mentioned
4. Structure the symptoms in a clear, concise format
5. If a symptom category has no information, state \"No information provided\"

Primary symptoms:
Secondary symptoms:
Duration (if mentioned):
Severity (if mentioned):
Associated factors (if mentioned):"
    )
}

pub fn build_treatment_prompt(diagnosis: &str) -> String {
    format!(
        "Based on the following diagnosis, provide specific treatment recommendations:
Diagnosis: {diagnosis}

Please include:
1. Immediate actions
2. Medications (if applicable)
3. Lifestyle changes
4. When to seek emergency care
5. Follow-up recommendations"
    )
}

pub fn build_doctor_prompt(diagnosis: &str) -> String {
    format!(
        "Based on the following diagnosis, should the patient see a doctor?
Diagnosis: {diagnosis}

Please provide:
1. Whether a doctor visit is necessary
2. Urgency level (immediate, soon, routine)
3. Which type of doctor to see
4. What to bring to the appointment"
    )
}

/// Open-dialogue turn carrying the whole session history.
pub fn build_conversation_prompt(history: &[DialogueTurn], input: &str) -> String {
    let mut prompt = String::from(CONVERSATION_SYSTEM_PROMPT);
    prompt.push_str("\n\nPrevious conversation:\n");
    for turn in history {
        prompt.push_str(&format!("{}: {}\n", turn.speaker.prompt_label(), turn.text));
    }
    prompt.push_str(&format!("\nCurrent user input: {input}\n\nResponse:"));
    prompt
}

/// Reply wrapping a fresh diagnosis from a symptom description.
pub fn wrap_diagnosis(diagnosis: &str) -> String {
    format!("Based on your described symptoms:\n\n{diagnosis}\n\nHow can I help you further?")
}
