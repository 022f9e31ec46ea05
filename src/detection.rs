use log::{debug, warn};
use std::sync::Arc;

use crate::engine::{EngineFactory, WorkerMode};
use crate::errors::EngineError;
use crate::language_utils::{OcrLanguage, ScriptLabel};
use crate::lifecycle::{ImageResource, WorkerGuard};

// @module: Script detection ahead of text extraction

/// Outcome of a detection call
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    /// Classified script
    pub script: ScriptLabel,
    /// Label exactly as the engine reported it
    pub raw_label: String,
    /// Engine confidence, when reported
    pub confidence: Option<f32>,
}

impl DetectionResult {
    /// Recognition hint to use for this script
    pub fn ocr_language(&self) -> OcrLanguage {
        self.script.ocr_language()
    }
}

/// Classifies the writing system of an image
#[derive(Debug, Clone)]
pub struct ScriptDetector {
    engine: Arc<dyn EngineFactory>,
}

impl ScriptDetector {
    pub fn new(engine: Arc<dyn EngineFactory>) -> Self {
        Self { engine }
    }

    /// Detect the script of an image with a single, scoped detection worker.
    ///
    /// Labels outside the known table come back as `ScriptLabel::Other`; only
    /// a failing engine call is an error.
    pub async fn detect(&self, image: &ImageResource) -> Result<DetectionResult, EngineError> {
        let mut guard = WorkerGuard::acquire(self.engine.as_ref(), WorkerMode::ScriptDetection).await?;
        let outcome = guard.detect(image.bytes()).await;
        if let Err(e) = guard.release().await {
            warn!("Failed to terminate detection worker: {}", e);
        }

        let report = outcome?;
        let script = ScriptLabel::from_label(&report.script);
        if script == ScriptLabel::Other {
            debug!("Unrecognized script label '{}', treating as plain text", report.script);
        }

        Ok(DetectionResult {
            script,
            raw_label: report.script,
            confidence: report.confidence,
        })
    }
}
