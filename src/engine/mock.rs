/*!
 * Scripted engine for testing.
 *
 * `ScriptedEngine` hands out workers that return predetermined detection and
 * recognition results. An `EngineTracker` records every worker created and
 * terminated so tests can check the lifecycle guarantees:
 * - `ScriptedEngine::new()` - detects Latin, recognizes a short sentence
 * - `.detects(..)` / `.recognizes(..)` - change the scripted results
 * - `.detection_fails(..)` / `.recognition_fails(..)` - make a call error
 * - `.with_gate(..)` - block recognition until the gate is notified
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

use crate::errors::EngineError;

use super::{EngineFactory, Recognition, ScriptReport, Worker, WorkerMode};

/// Lifecycle and call counters shared by an engine and its workers
#[derive(Debug, Default)]
pub struct EngineTracker {
    created: AtomicUsize,
    terminated: AtomicUsize,
    detect_calls: AtomicUsize,
    recognize_calls: AtomicUsize,
    modes: Mutex<Vec<WorkerMode>>,
}

impl EngineTracker {
    /// Number of workers created
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Number of terminate calls received
    pub fn terminated(&self) -> usize {
        self.terminated.load(Ordering::SeqCst)
    }

    /// Workers created but not yet terminated
    pub fn live(&self) -> usize {
        self.created().saturating_sub(self.terminated())
    }

    pub fn detect_calls(&self) -> usize {
        self.detect_calls.load(Ordering::SeqCst)
    }

    pub fn recognize_calls(&self) -> usize {
        self.recognize_calls.load(Ordering::SeqCst)
    }

    /// Modes of all created workers, in creation order
    pub fn modes(&self) -> Vec<WorkerMode> {
        self.modes.lock().clone()
    }
}

/// Engine returning scripted results
#[derive(Debug)]
pub struct ScriptedEngine {
    detection: Result<ScriptReport, EngineError>,
    recognition: Result<Recognition, EngineError>,
    create_failure: Option<EngineError>,
    gate: Option<Arc<Notify>>,
    tracker: Arc<EngineTracker>,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedEngine {
    /// Engine that detects Latin script and recognizes a short sentence
    pub fn new() -> Self {
        Self {
            detection: Ok(ScriptReport {
                script: "Latin".to_string(),
                confidence: Some(1.0),
            }),
            recognition: Ok(Recognition {
                text: "Hello world\n".to_string(),
                confidence: Some(90.0),
            }),
            create_failure: None,
            gate: None,
            tracker: Arc::new(EngineTracker::default()),
        }
    }

    /// Report the given raw script label on detection
    pub fn detects(mut self, script: impl Into<String>) -> Self {
        self.detection = Ok(ScriptReport {
            script: script.into(),
            confidence: Some(1.0),
        });
        self
    }

    /// Fail every detection call
    pub fn detection_fails(mut self, error: EngineError) -> Self {
        self.detection = Err(error);
        self
    }

    /// Return the given text on recognition
    pub fn recognizes(mut self, text: impl Into<String>) -> Self {
        self.recognition = Ok(Recognition {
            text: text.into(),
            confidence: Some(90.0),
        });
        self
    }

    /// Fail every recognition call
    pub fn recognition_fails(mut self, error: EngineError) -> Self {
        self.recognition = Err(error);
        self
    }

    /// Fail worker creation
    pub fn fails_to_create(mut self, error: EngineError) -> Self {
        self.create_failure = Some(error);
        self
    }

    /// Hold every recognition call until the gate is notified
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Get the shared tracker
    pub fn tracker(&self) -> Arc<EngineTracker> {
        self.tracker.clone()
    }
}

#[async_trait]
impl EngineFactory for ScriptedEngine {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn create_worker(&self, mode: WorkerMode) -> Result<Box<dyn Worker>, EngineError> {
        if let Some(error) = &self.create_failure {
            return Err(error.clone());
        }

        self.tracker.created.fetch_add(1, Ordering::SeqCst);
        self.tracker.modes.lock().push(mode);

        Ok(Box::new(ScriptedWorker {
            mode,
            detection: self.detection.clone(),
            recognition: self.recognition.clone(),
            gate: self.gate.clone(),
            tracker: self.tracker.clone(),
        }))
    }
}

#[derive(Debug)]
struct ScriptedWorker {
    mode: WorkerMode,
    detection: Result<ScriptReport, EngineError>,
    recognition: Result<Recognition, EngineError>,
    gate: Option<Arc<Notify>>,
    tracker: Arc<EngineTracker>,
}

#[async_trait]
impl Worker for ScriptedWorker {
    fn mode(&self) -> WorkerMode {
        self.mode
    }

    async fn detect(&mut self, _image: &[u8]) -> Result<ScriptReport, EngineError> {
        self.tracker.detect_calls.fetch_add(1, Ordering::SeqCst);
        self.detection.clone()
    }

    async fn recognize(&mut self, _image: &[u8]) -> Result<Recognition, EngineError> {
        self.tracker.recognize_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.recognition.clone()
    }

    async fn terminate(&mut self) -> Result<(), EngineError> {
        self.tracker.terminated.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
