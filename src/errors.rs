/*!
 * Error types for the lingolens application.
 *
 * Each pipeline phase has its own error type so a terminal failure can always
 * say which phase failed. All payloads are plain strings, which keeps the
 * errors cloneable and lets them travel inside a `RunContext` snapshot.
 */

use thiserror::Error;

use crate::pipeline::PipelineState;

/// Errors raised by a detection or recognition engine worker
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The engine could not be started or reached
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    /// The engine has no model for the requested language
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The image could not be decoded by the engine
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// The engine call did not finish in time
    #[error("Engine call timed out after {0} seconds")]
    Timeout(u64),

    /// Any other engine failure
    #[error("Engine call failed: {0}")]
    Failed(String),
}

/// Errors that end the extraction phase
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// The engine ran but recognized nothing usable
    #[error("No text could be recognized in the image")]
    NoText,

    /// The engine itself failed
    #[error("{0}")]
    Engine(#[from] EngineError),
}

/// Errors that can occur when talking to the translation bridge
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// The request was rejected before it was sent
    #[error("Invalid translation request: {0}")]
    InvalidRequest(String),

    /// The bridge could not be reached
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The bridge answered with a non-success status
    #[error("Bridge responded with error: {status_code} - {message}")]
    Bridge {
        /// HTTP status code
        status_code: u16,
        /// Error message surfaced to the caller
        message: String,
    },

    /// The bridge answered but the body was not understood
    #[error("Malformed bridge response: {0}")]
    MalformedResponse(String),
}

/// Errors surfaced by the pipeline controller
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A run is already active for this controller
    #[error("A run is already in progress")]
    Busy,

    /// The controller attempted a transition the state machine forbids
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: PipelineState,
        to: PipelineState,
    },

    /// Script detection failed and strict detection is enabled
    #[error("Script detection failed: {0}")]
    Detection(EngineError),

    /// Text extraction failed
    #[error("Text extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// Translation failed
    #[error("Translation failed: {0}")]
    Translation(#[from] TranslationError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a pipeline run
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
