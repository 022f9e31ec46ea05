use std::fmt;
use uuid::Uuid;

use crate::errors::PipelineError;
use crate::language_utils::{DEFAULT_LOCALE, LocaleCode, OcrLanguage, ScriptLabel, SourceLanguage};

/// Phase of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Idle,
    DetectingScript,
    Extracting,
    Translating,
    Done,
    Failed,
}

impl PipelineState {
    /// `Done` and `Failed` end a run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether the state machine allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;

        matches!(
            (self, next),
            (Idle, DetectingScript)
                | (Idle, Extracting)
                | (DetectingScript, Extracting)
                | (DetectingScript, Failed)
                | (Extracting, Translating)
                | (Extracting, Failed)
                | (Translating, Done)
                | (Translating, Failed)
        )
    }

    /// Short progress message for this phase
    pub fn status_message(&self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::DetectingScript => "Detecting script...",
            Self::Extracting => "Scanning image...",
            Self::Translating => "Translating...",
            Self::Done => "Done!",
            Self::Failed => "Error occurred",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::DetectingScript => "DetectingScript",
            Self::Extracting => "Extracting",
            Self::Translating => "Translating",
            Self::Done => "Done",
            Self::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// Language selection for a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRequest {
    /// Source language, or `Auto` to detect it from the image
    pub source: SourceLanguage,
    /// Target locale
    pub target: LocaleCode,
}

impl RunRequest {
    pub fn new(source: SourceLanguage, target: LocaleCode) -> Self {
        Self { source, target }
    }
}

/// Snapshot of a run. Every transition produces a new snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    /// Unique id of the run (nil for the idle placeholder)
    pub run_id: Uuid,
    /// Current phase
    pub state: PipelineState,
    /// Requested source language
    pub source: SourceLanguage,
    /// Requested target locale
    pub target: LocaleCode,
    /// Script classification, when detection ran and succeeded
    pub detected_script: Option<ScriptLabel>,
    /// Recognition hint the extraction phase used
    pub ocr_language: Option<OcrLanguage>,
    /// Extracted text; never cleared once set
    pub extracted_text: Option<String>,
    /// Translated text, only present once the run is `Done`
    pub translated_text: Option<String>,
    /// Failure that ended the run
    pub error: Option<PipelineError>,
}

impl RunContext {
    /// Placeholder context before any run has been submitted
    pub fn idle() -> Self {
        Self {
            run_id: Uuid::nil(),
            state: PipelineState::Idle,
            source: SourceLanguage::Auto,
            target: DEFAULT_LOCALE,
            detected_script: None,
            ocr_language: None,
            extracted_text: None,
            translated_text: None,
            error: None,
        }
    }

    /// Fresh context for a new run
    pub fn new(request: &RunRequest) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            source: request.source,
            target: request.target,
            ..Self::idle()
        }
    }

    /// Move to the next phase, refusing transitions the state machine forbids
    pub fn transition(&self, next: PipelineState) -> Result<Self, PipelineError> {
        if !self.state.can_transition_to(next) {
            return Err(PipelineError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        Ok(Self {
            state: next,
            ..self.clone()
        })
    }

    /// Enter `Failed`, recording the error
    pub fn fail(&self, error: PipelineError) -> Result<Self, PipelineError> {
        let mut failed = self.transition(PipelineState::Failed)?;
        failed.error = Some(error);
        Ok(failed)
    }

    pub fn with_detected_script(&self, script: ScriptLabel) -> Self {
        Self {
            detected_script: Some(script),
            ..self.clone()
        }
    }

    pub fn with_ocr_language(&self, language: OcrLanguage) -> Self {
        Self {
            ocr_language: Some(language),
            ..self.clone()
        }
    }

    pub fn with_extracted_text(&self, text: impl Into<String>) -> Self {
        Self {
            extracted_text: Some(text.into()),
            ..self.clone()
        }
    }

    pub fn with_translation(&self, text: impl Into<String>) -> Self {
        Self {
            translated_text: Some(text.into()),
            ..self.clone()
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == PipelineState::Done
    }

    pub fn is_failed(&self) -> bool {
        self.state == PipelineState::Failed
    }

    /// Translated text of a finished run, or the error that ended it
    pub fn into_result(self) -> Result<String, PipelineError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        match (self.state, self.translated_text) {
            (PipelineState::Done, Some(text)) => Ok(text),
            (state, _) => Err(PipelineError::InvalidTransition {
                from: state,
                to: PipelineState::Done,
            }),
        }
    }
}
