//! Diagnostic pipeline: specialists in parallel → synthesis → validation.
//!
//! Specialist roles are queued for a bounded pool of scoped worker
//! threads. The pool is joined before synthesis starts, so synthesis
//! always sees one output per role. No stage returns an error: every
//! generation failure degrades to fallback text.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use super::specialist::{fallback_text, SpecialistAgent};
use super::synthesis::SynthesisAgent;
use super::types::{DiagnosisOutcome, Role, SpecialistOutput, SpecialistReports, ValidatedDiagnosis};
use crate::config::MIN_SPECIALIST_WORKERS;
use crate::generation::TextGenerator;

pub struct DiagnosticPipeline<'a, G: TextGenerator + ?Sized> {
    generator: &'a G,
    workers: usize,
}

impl<'a, G: TextGenerator + ?Sized> DiagnosticPipeline<'a, G> {
    pub fn new(generator: &'a G) -> Self {
        Self::with_workers(generator, MIN_SPECIALIST_WORKERS)
    }

    /// Pool sizes below one worker per role are raised to the minimum.
    pub fn with_workers(generator: &'a G, workers: usize) -> Self {
        Self {
            generator,
            workers: workers.max(MIN_SPECIALIST_WORKERS),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Final diagnosis for `report`.
    pub fn diagnose(&self, report: &str) -> ValidatedDiagnosis {
        self.run(report).diagnosis
    }

    /// Full run, including the intermediate specialist outputs.
    pub fn run(&self, report: &str) -> DiagnosisOutcome {
        tracing::debug!(report_chars = report.len(), workers = self.workers, "Diagnostic pipeline started");

        // Step 1-2: fan out, then barrier
        let specialists = self.run_specialists(report);

        // Step 3: synthesis
        let agent = SynthesisAgent::new(self.generator);
        let synthesized = agent.run(&specialists);

        // Step 4: correction pass (degrades to the synthesized text)
        let diagnosis = agent.validate(&synthesized, &specialists);

        tracing::info!(
            validated = diagnosis.validated,
            truncated = diagnosis.truncated,
            "Diagnostic pipeline finished"
        );

        DiagnosisOutcome {
            specialists,
            synthesized,
            diagnosis,
        }
    }

    fn run_specialists(&self, report: &str) -> SpecialistReports {
        let roles = Role::all();
        let next = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<SpecialistOutput>();
        let pool_size = self.workers.min(roles.len());
        let generator = self.generator;

        thread::scope(|scope| {
            let handles: Vec<_> = (0..pool_size)
                .map(|_| {
                    let tx = tx.clone();
                    let next = &next;
                    scope.spawn(move || {
                        let agent = SpecialistAgent::new(generator);
                        while let Some(&role) = roles.get(next.fetch_add(1, Ordering::SeqCst)) {
                            if tx.send(agent.run(report, role)).is_err() {
                                break;
                            }
                        }
                    })
                })
                .collect();

            for handle in handles {
                if handle.join().is_err() {
                    tracing::warn!("Specialist worker panicked; its roles fall back");
                }
            }
        });
        drop(tx);

        SpecialistReports::assemble(rx.iter(), |role| {
            tracing::warn!(role = %role, "No specialist output collected, using fallback");
            fallback_text(role).to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::generation::mock::{FailingGenerator, ScriptedGenerator};
    use crate::generation::GenerationError;
    use crate::pipeline::bounding::word_count;
    use crate::pipeline::synthesis::SYNTHESIS_FALLBACK;

    const SYNTHESIS_MARKER: &str = "multidisciplinary medical team leader";
    const VALIDATION_MARKER: &str = "Corrected analysis:";

    fn scripted() -> ScriptedGenerator {
        ScriptedGenerator::new("unexpected prompt")
            .on(SYNTHESIS_MARKER, "Synthesized: chest tightness and anxiety.")
            .on(VALIDATION_MARKER, "Validated: chest tightness and anxiety.")
            .on("You are a cardiologist", "Chest tightness on exertion.")
            .on("You are a psychologist", "Anxiety before work.")
            .on("You are a pulmonologist", "No information provided.")
    }

    #[test]
    fn run_produces_all_stages() {
        let generator = scripted();
        let outcome = DiagnosticPipeline::new(&generator).run("chest tight and anxious");

        assert_eq!(outcome.specialists.get(Role::Cardiac).text, "Chest tightness on exertion.");
        assert_eq!(outcome.specialists.get(Role::Psychological).text, "Anxiety before work.");
        assert_eq!(outcome.specialists.get(Role::Respiratory).text, "No information provided.");
        assert_eq!(outcome.synthesized.text, "Synthesized: chest tightness and anxiety.");
        assert_eq!(outcome.diagnosis.text, "Validated: chest tightness and anxiety.");
        assert!(outcome.diagnosis.validated);
        // 3 specialists + synthesis + validation
        assert_eq!(generator.call_count(), 5);
    }

    #[test]
    fn synthesis_receives_every_specialist_output() {
        let generator = scripted();
        DiagnosticPipeline::new(&generator).run("report");
        let synthesis_prompt = generator
            .calls()
            .into_iter()
            .find(|p| p.contains(SYNTHESIS_MARKER))
            .unwrap();
        assert!(synthesis_prompt.contains("Chest tightness on exertion."));
        assert!(synthesis_prompt.contains("Anxiety before work."));
        assert!(synthesis_prompt.contains("No information provided."));
    }

    #[test]
    fn all_failures_still_yield_diagnosis() {
        let generator = FailingGenerator::new();
        let outcome = DiagnosticPipeline::new(&generator).run("anything");
        for role in Role::all() {
            assert_eq!(outcome.specialists.get(*role).text, fallback_text(*role));
        }
        assert_eq!(outcome.diagnosis.text, SYNTHESIS_FALLBACK);
        assert!(!outcome.diagnosis.text.is_empty());
        assert!(!outcome.diagnosis.validated);
        assert_eq!(generator.call_count(), 5);
    }

    #[test]
    fn one_failed_specialist_does_not_abort() {
        let generator = ScriptedGenerator::new("unexpected prompt")
            .fail_on("You are a psychologist")
            .on(SYNTHESIS_MARKER, "Synth")
            .on(VALIDATION_MARKER, "Valid")
            .on("You are a", "Specialist finding.");
        let outcome = DiagnosticPipeline::new(&generator).run("report");
        assert_eq!(
            outcome.specialists.get(Role::Psychological).text,
            fallback_text(Role::Psychological)
        );
        assert_eq!(outcome.specialists.get(Role::Cardiac).text, "Specialist finding.");
        assert_eq!(outcome.specialists.get(Role::Respiratory).text, "Specialist finding.");
        assert_eq!(outcome.diagnosis.text, "Valid");
    }

    #[test]
    fn validation_failure_keeps_synthesis() {
        let generator = ScriptedGenerator::new("Specialist finding.")
            .on(SYNTHESIS_MARKER, "Synthesized text.")
            .fail_on(VALIDATION_MARKER);
        let diagnosis = DiagnosticPipeline::new(&generator).diagnose("report");
        assert_eq!(diagnosis.text, "Synthesized text.");
        assert!(!diagnosis.validated);
    }

    #[test]
    fn outputs_respect_word_bounds() {
        let long = vec!["word"; 500].join(" ");
        let generator = ScriptedGenerator::new(&long);
        let outcome = DiagnosticPipeline::new(&generator).run("report");
        for output in outcome.specialists.iter() {
            assert!(word_count(&output.text) <= 60);
            assert!(output.truncated);
            assert!(output.text.ends_with("..."));
        }
        assert!(word_count(&outcome.synthesized.text) <= 120);
        assert!(word_count(&outcome.diagnosis.text) <= 120);
        assert!(outcome.diagnosis.truncated);
    }

    #[test]
    fn undersized_pool_raised_to_minimum() {
        let generator = FailingGenerator::new();
        assert_eq!(DiagnosticPipeline::with_workers(&generator, 1).workers(), 3);
        assert_eq!(DiagnosticPipeline::with_workers(&generator, 8).workers(), 8);
    }

    /// Cardiologist call blocks until released; everything is logged in order.
    struct GatedGenerator {
        gate: Mutex<Option<mpsc::Receiver<()>>>,
        started: Mutex<mpsc::Sender<&'static str>>,
        log: Mutex<Vec<&'static str>>,
    }

    impl GatedGenerator {
        fn label(prompt: &str) -> &'static str {
            if prompt.contains(SYNTHESIS_MARKER) {
                "synthesis"
            } else if prompt.contains(VALIDATION_MARKER) {
                "validation"
            } else if prompt.contains("You are a cardiologist") {
                "cardiac"
            } else if prompt.contains("You are a psychologist") {
                "psychological"
            } else {
                "respiratory"
            }
        }
    }

    impl TextGenerator for GatedGenerator {
        fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            let label = Self::label(prompt);
            if let Ok(tx) = self.started.lock() {
                let _ = tx.send(label);
            }
            if label == "cardiac" {
                let gate = self.gate.lock().unwrap().take();
                if let Some(rx) = gate {
                    rx.recv().unwrap();
                }
            }
            self.log.lock().unwrap().push(label);
            Ok(format!("{label} done"))
        }
    }

    #[test]
    fn synthesis_waits_for_stalled_specialist() {
        let (release_tx, release_rx) = mpsc::channel();
        let (started_tx, started_rx) = mpsc::channel();
        let generator = Arc::new(GatedGenerator {
            gate: Mutex::new(Some(release_rx)),
            started: Mutex::new(started_tx),
            log: Mutex::new(Vec::new()),
        });

        let worker = {
            let generator = Arc::clone(&generator);
            thread::spawn(move || DiagnosticPipeline::new(generator.as_ref()).run("report"))
        };

        // All three specialists start concurrently even though cardiac is stalled.
        let mut started: Vec<&str> = (0..3)
            .map(|_| started_rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        started.sort();
        assert_eq!(started, vec!["cardiac", "psychological", "respiratory"]);

        // With cardiac still blocked, synthesis must not start.
        assert!(started_rx.recv_timeout(Duration::from_millis(200)).is_err());
        {
            let log = generator.log.lock().unwrap();
            assert_eq!(log.len(), 2);
            assert!(!log.contains(&"synthesis"));
        }

        release_tx.send(()).unwrap();
        let outcome = worker.join().unwrap();

        let log = generator.log.lock().unwrap().clone();
        assert_eq!(log.len(), 5);
        let pos = |label| log.iter().position(|l| *l == label).unwrap();
        assert!(pos("cardiac") < pos("synthesis"));
        assert!(pos("psychological") < pos("synthesis"));
        assert!(pos("respiratory") < pos("synthesis"));
        assert!(pos("synthesis") < pos("validation"));
        assert_eq!(outcome.specialists.get(Role::Cardiac).text, "cardiac done");
    }
}
