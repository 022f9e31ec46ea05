/*!
 * Detection and recognition engine contract.
 *
 * The pipeline never talks to an OCR engine directly. It asks an
 * `EngineFactory` for a `Worker` bound to one mode, uses it, and terminates
 * it. Implementations:
 * - `tesseract`: drives the `tesseract` command-line binary
 * - `mock`: scripted engine with call tracking, used by tests
 */

use async_trait::async_trait;
use std::fmt::{self, Debug};

use crate::errors::EngineError;
use crate::language_utils::OcrLanguage;

/// What a worker is created to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerMode {
    /// Classify the writing system of an image
    ScriptDetection,
    /// Recognize text in the given language
    Recognition(OcrLanguage),
}

impl fmt::Display for WorkerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScriptDetection => f.write_str("script detection"),
            Self::Recognition(lang) => write!(f, "recognition:{}", lang),
        }
    }
}

/// Raw output of a detection call
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptReport {
    /// Script name as reported by the engine
    pub script: String,
    /// Engine confidence, when reported
    pub confidence: Option<f32>,
}

/// Raw output of a recognition call
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    /// Recognized text, untouched
    pub text: String,
    /// Engine confidence, when reported
    pub confidence: Option<f32>,
}

/// Creates engine workers
#[async_trait]
pub trait EngineFactory: Send + Sync + Debug {
    /// Short engine name used in logs
    fn name(&self) -> &'static str;

    /// Create a worker for the given mode
    ///
    /// Every worker returned here must later be terminated exactly once.
    async fn create_worker(&self, mode: WorkerMode) -> Result<Box<dyn Worker>, EngineError>;
}

/// A single engine instance bound to one mode
#[async_trait]
pub trait Worker: Send + Debug {
    /// Mode this worker was created for
    fn mode(&self) -> WorkerMode;

    /// Classify the script of an image (detection mode only)
    async fn detect(&mut self, image: &[u8]) -> Result<ScriptReport, EngineError>;

    /// Recognize the text of an image (recognition mode only)
    async fn recognize(&mut self, image: &[u8]) -> Result<Recognition, EngineError>;

    /// Release everything the worker holds
    async fn terminate(&mut self) -> Result<(), EngineError>;
}

pub mod mock;
pub mod tesseract;
