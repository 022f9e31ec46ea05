/*!
 * # LingoLens - image text translation
 *
 * A Rust library that reads the text in an image and translates it.
 *
 * ## Features
 *
 * - Script detection to pick the right recognition language
 * - Text extraction through a Tesseract engine
 * - Translation through an HTTP translation bridge
 * - Scoped engine workers and revocable image handles
 * - Observable pipeline state for progress reporting
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `language_utils`: Language, script and locale code mapping
 * - `engine`: Recognition engine abstraction:
 *   - `engine::tesseract`: Tesseract command line engine
 *   - `engine::mock`: Scripted engine for tests
 * - `lifecycle`: Worker guards and image handles
 * - `detection`: Script detection
 * - `extraction`: Text extraction
 * - `providers`: Translator implementations:
 *   - `providers::bridge`: Translation bridge HTTP client
 *   - `providers::mock`: Mock translator for tests
 * - `pipeline`: Run state machine and controller
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod detection;
pub mod engine;
pub mod errors;
pub mod extraction;
pub mod language_utils;
pub mod lifecycle;
pub mod pipeline;
pub mod providers;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use detection::{DetectionResult, ScriptDetector};
pub use extraction::{ExtractionResult, TextExtractor};
pub use language_utils::{LocaleCode, OcrLanguage, ScriptLabel, SourceLanguage, get_language_name, map_identifier};
pub use lifecycle::{ImageResource, ImageSlot, ImageStore, WorkerGuard};
pub use pipeline::{PipelineController, PipelineState, RunContext, RunRequest};
pub use providers::Translator;
pub use providers::bridge::TranslationClient;
pub use errors::{AppError, EngineError, ExtractionError, PipelineError, TranslationError};
