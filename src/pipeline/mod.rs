/*!
 * Image-to-translation pipeline.
 *
 * One run per submitted image moves through these phases:
 * 1. **DetectingScript**: only when the source language is `auto`
 * 2. **Extracting**: text recognition with the chosen language hint
 * 3. **Translating**: the extracted text goes to the translator
 *
 * Each transition produces a new `RunContext` snapshot that observers can
 * follow through `PipelineController::subscribe`.
 */

pub mod controller;
pub mod state;

pub use controller::PipelineController;
pub use state::{PipelineState, RunContext, RunRequest};
