use log::{debug, warn};
use std::sync::Arc;

use crate::engine::{EngineFactory, WorkerMode};
use crate::errors::ExtractionError;
use crate::language_utils::OcrLanguage;
use crate::lifecycle::{ImageResource, WorkerGuard};

// @module: Text extraction through the recognition engine

/// Text recognized in an image
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    /// Recognized text with its original whitespace and line breaks
    pub text: String,
    /// Language hint the engine ran with
    pub language: OcrLanguage,
    /// Engine confidence, when reported
    pub confidence: Option<f32>,
}

/// Extracts text from images
#[derive(Debug, Clone)]
pub struct TextExtractor {
    engine: Arc<dyn EngineFactory>,
}

impl TextExtractor {
    pub fn new(engine: Arc<dyn EngineFactory>) -> Self {
        Self { engine }
    }

    /// Recognize the text of an image with a single, scoped recognition worker.
    ///
    /// Fails with `ExtractionError::NoText` when nothing but whitespace was
    /// recognized. No retry is attempted.
    pub async fn extract(&self, image: &ImageResource, language: OcrLanguage) -> Result<ExtractionResult, ExtractionError> {
        let mut guard = WorkerGuard::acquire(self.engine.as_ref(), WorkerMode::Recognition(language)).await?;
        let outcome = guard.recognize(image.bytes()).await;
        if let Err(e) = guard.release().await {
            warn!("Failed to terminate recognition worker: {}", e);
        }

        let recognition = outcome?;
        if recognition.text.trim().is_empty() {
            return Err(ExtractionError::NoText);
        }

        debug!("Recognized {} characters with '{}'", recognition.text.chars().count(), language);
        Ok(ExtractionResult {
            text: recognition.text,
            language,
            confidence: recognition.confidence,
        })
    }
}
