//! Deterministic generators for tests and offline runs.

use std::sync::Mutex;

use super::{GenerationError, TextGenerator};

/// Returns the same reply for every prompt and records each prompt.
pub struct MockGenerator {
    response: String,
    calls: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in arrival order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl TextGenerator for MockGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(prompt.to_string());
        }
        Ok(self.response.clone())
    }
}

/// Fails every call with a connection error.
pub struct FailingGenerator {
    calls: Mutex<usize>,
}

impl FailingGenerator {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| *c).unwrap_or(0)
    }
}

impl Default for FailingGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TextGenerator for FailingGenerator {
    fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }
        Err(GenerationError::Connection("mock://offline".to_string()))
    }
}

enum Reply {
    Text(String),
    Fail,
}

/// Picks a reply by the first rule whose marker occurs in the prompt.
///
/// Prompts matching no rule get the default reply.
pub struct ScriptedGenerator {
    rules: Vec<(String, Reply)>,
    default_reply: String,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(default_reply: &str) -> Self {
        Self {
            rules: Vec::new(),
            default_reply: default_reply.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `response` when the prompt contains `marker`.
    pub fn on(mut self, marker: &str, response: &str) -> Self {
        self.rules
            .push((marker.to_string(), Reply::Text(response.to_string())));
        self
    }

    /// Fail when the prompt contains `marker`.
    pub fn fail_on(mut self, marker: &str) -> Self {
        self.rules.push((marker.to_string(), Reply::Fail));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Number of received prompts containing `marker`.
    pub fn calls_containing(&self, marker: &str) -> usize {
        self.calls
            .lock()
            .map(|c| c.iter().filter(|p| p.contains(marker)).count())
            .unwrap_or(0)
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(prompt.to_string());
        }
        let reply = self
            .rules
            .iter()
            .find(|(marker, _)| prompt.contains(marker.as_str()))
            .map(|(_, reply)| reply);
        match reply {
            Some(Reply::Text(text)) => Ok(text.clone()),
            Some(Reply::Fail) => Err(GenerationError::Http("scripted failure".to_string())),
            None => Ok(self.default_reply.clone()),
        }
    }
}
