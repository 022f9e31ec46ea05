/*!
 * Pipeline controller.
 *
 * The controller drives one run at a time through detection, extraction and
 * translation. It never issues two external calls at once within a run and
 * refuses a second submission while a run is active.
 */

use log::{error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

use crate::detection::ScriptDetector;
use crate::engine::EngineFactory;
use crate::errors::PipelineError;
use crate::extraction::TextExtractor;
use crate::language_utils::{self, DEFAULT_OCR_LANGUAGE, OcrLanguage, SourceLanguage};
use crate::lifecycle::ImageResource;
use crate::providers::Translator;

use super::state::{PipelineState, RunContext, RunRequest};

/// Clears the busy flag when the run ends, however it ends
struct RunSlot<'a> {
    busy: &'a AtomicBool,
}

impl<'a> RunSlot<'a> {
    fn claim(busy: &'a AtomicBool) -> Option<Self> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { busy })
    }
}

impl Drop for RunSlot<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Orchestrates script detection, text extraction and translation
#[derive(Debug)]
pub struct PipelineController {
    detector: ScriptDetector,
    extractor: TextExtractor,
    translator: Arc<dyn Translator>,
    /// Fail the run when the detection engine errors instead of falling back
    strict_detection: bool,
    busy: AtomicBool,
    updates: watch::Sender<RunContext>,
}

impl PipelineController {
    /// Create a controller over an engine and a translator
    pub fn new(engine: Arc<dyn EngineFactory>, translator: Arc<dyn Translator>) -> Self {
        let (updates, _) = watch::channel(RunContext::idle());

        Self {
            detector: ScriptDetector::new(engine.clone()),
            extractor: TextExtractor::new(engine),
            translator,
            strict_detection: false,
            busy: AtomicBool::new(false),
            updates,
        }
    }

    /// Fail runs whose detection engine call errors
    pub fn with_strict_detection(mut self, strict: bool) -> Self {
        self.strict_detection = strict;
        self
    }

    /// Follow every context transition
    pub fn subscribe(&self) -> watch::Receiver<RunContext> {
        self.updates.subscribe()
    }

    /// Latest published context
    pub fn current(&self) -> RunContext {
        self.updates.borrow().clone()
    }

    /// Whether a run is in progress
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run the pipeline for one image.
    ///
    /// Returns `Err(PipelineError::Busy)` when another run is active. Any
    /// other outcome, success or phase failure, comes back as the final
    /// context, with the failure recorded in `RunContext::error`.
    pub async fn submit(&self, image: &ImageResource, request: RunRequest) -> Result<RunContext, PipelineError> {
        let Some(_slot) = RunSlot::claim(&self.busy) else {
            warn!("Rejected submission while a run is in progress");
            return Err(PipelineError::Busy);
        };

        let context = RunContext::new(&request);
        info!(
            "Run {} started: {} bytes, {} -> {}",
            context.run_id, image.len(), request.source, request.target
        );
        self.publish(&context);

        let finished = self.run_phases(image, context).await?;
        info!("Run {} finished in state {}", finished.run_id, finished.state);
        Ok(finished)
    }

    async fn run_phases(&self, image: &ImageResource, mut context: RunContext) -> Result<RunContext, PipelineError> {
        let source = context.source;
        let language = match source {
            SourceLanguage::Explicit(language) => language,
            SourceLanguage::Auto => {
                context = self.advance(&context, PipelineState::DetectingScript)?;
                match self.detect_language(image, &mut context).await {
                    Ok(language) => language,
                    Err(e) => return self.fail(&context, e),
                }
            }
        };

        context = self.advance(&context.with_ocr_language(language), PipelineState::Extracting)?;
        let extraction = match self.extractor.extract(image, language).await {
            Ok(extraction) => extraction,
            Err(e) => return self.fail(&context, e.into()),
        };

        context = self.advance(&context.with_extracted_text(extraction.text.as_str()), PipelineState::Translating)?;
        let source_locale = language_utils::translation_source(&source, context.detected_script);
        match self.translator.translate(&extraction.text, &source_locale, &context.target).await {
            Ok(translation) => self.advance(&context.with_translation(translation), PipelineState::Done),
            Err(e) => self.fail(&context, e.into()),
        }
    }

    /// Pick the recognition hint for an auto-detected run
    async fn detect_language(&self, image: &ImageResource, context: &mut RunContext) -> Result<OcrLanguage, PipelineError> {
        match self.detector.detect(image).await {
            Ok(detection) => {
                let language = detection.ocr_language();
                info!("Detected {} script ('{}'), extracting with '{}'", detection.script, detection.raw_label, language);
                *context = context.with_detected_script(detection.script);
                Ok(language)
            }
            Err(e) if self.strict_detection => Err(PipelineError::Detection(e)),
            Err(e) => {
                warn!("Script detection failed, extracting with '{}': {}", DEFAULT_OCR_LANGUAGE, e);
                Ok(language_utils::extraction_hint(None))
            }
        }
    }

    fn advance(&self, context: &RunContext, next: PipelineState) -> Result<RunContext, PipelineError> {
        let advanced = context.transition(next)?;
        info!("Run {}: {} -> {}", advanced.run_id, context.state, next);
        self.publish(&advanced);
        Ok(advanced)
    }

    fn fail(&self, context: &RunContext, cause: PipelineError) -> Result<RunContext, PipelineError> {
        error!("Run {} failed during {}: {}", context.run_id, context.state, cause);
        let failed = context.fail(cause)?;
        self.publish(&failed);
        Ok(failed)
    }

    fn publish(&self, context: &RunContext) {
        self.updates.send_replace(context.clone());
    }
}
