use anyhow::{Result, Context, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use crate::app_config::Config;
use crate::engine::EngineFactory;
use crate::engine::tesseract::TesseractEngine;
use crate::lifecycle::{ImageSlot, ImageStore};
use crate::pipeline::{PipelineController, RunContext, RunRequest};
use crate::providers::Translator;
use crate::providers::bridge::TranslationClient;

// @module: Application controller for image translation

/// Main application controller: one image slot in front of one pipeline
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Issuer of image handles
    images: ImageStore,
    // @field: Currently selected image
    slot: ImageSlot,
    // @field: Pipeline driving the runs
    pipeline: PipelineController,
    // @field: Whether to draw a progress spinner
    show_progress: bool,
}

impl Controller {
    // @method: Create a controller with the tesseract engine and the bridge client
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        let engine = Arc::new(TesseractEngine::from_config(&config.engine));
        let translator = Arc::new(TranslationClient::from_config(&config.bridge)?);

        Ok(Self::with_components(config, engine, translator))
    }

    /// Create a controller over explicit engine and translator implementations
    pub fn with_components(config: Config, engine: Arc<dyn EngineFactory>, translator: Arc<dyn Translator>) -> Self {
        let pipeline = PipelineController::new(engine, translator)
            .with_strict_detection(config.engine.strict_detection);
        let images = ImageStore::new();

        Self {
            config,
            slot: ImageSlot::new(images.clone()),
            images,
            pipeline,
            show_progress: true,
        }
    }

    /// Disable the progress spinner
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pipeline(&self) -> &PipelineController {
        &self.pipeline
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Select an image file, revoking the previously selected one
    pub async fn load_image(&mut self, path: &Path) -> Result<()> {
        let bytes = tokio::fs::read(path).await
            .with_context(|| format!("Failed to read image: {}", path.display()))?;

        if bytes.is_empty() {
            return Err(anyhow!("Image file is empty: {}", path.display()));
        }

        let image = self.slot.replace(bytes);
        info!("Loaded {} ({} bytes) as {}", path.display(), image.len(), image.id());
        Ok(())
    }

    /// Load an image file and run the pipeline on it
    pub async fn run(&mut self, input_file: &Path) -> Result<RunContext> {
        self.load_image(input_file).await?;
        self.run_loaded().await
    }

    /// Run the pipeline on the currently selected image
    pub async fn run_loaded(&self) -> Result<RunContext> {
        let image = self.slot.current()
            .ok_or_else(|| anyhow!("No image selected"))?;

        let request = RunRequest::new(self.config.source()?, self.config.target()?);

        let start_time = Instant::now();
        let progress = self.show_progress.then(|| self.spawn_progress());

        let outcome = self.pipeline.submit(image, request).await;

        if let Some((bar, watcher)) = progress {
            watcher.abort();
            bar.finish_and_clear();
        }

        let context = outcome?;
        if context.is_done() {
            info!("Translation completed in {}.", Self::format_duration(start_time.elapsed()));
        } else {
            warn!("Run ended after {} in state {}", Self::format_duration(start_time.elapsed()), context.state);
        }

        Ok(context)
    }

    /// Spinner that follows the pipeline's phase transitions
    fn spawn_progress(&self) -> (ProgressBar, JoinHandle<()>) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(120));

        let mut updates = self.pipeline.subscribe();
        let spinner = bar.clone();
        let watcher = tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let state = updates.borrow_and_update().state;
                spinner.set_message(state.status_message());
                if state.is_terminal() {
                    break;
                }
            }
        });

        (bar, watcher)
    }

    // @returns: Human-readable duration
    fn format_duration(duration: Duration) -> String {
        let total_ms = duration.as_millis();
        if total_ms < 1000 {
            format!("{}ms", total_ms)
        } else {
            let secs = duration.as_secs();
            let millis = duration.subsec_millis();
            if secs < 60 {
                format!("{}.{:01}s", secs, millis / 100)
            } else {
                format!("{}m {}s", secs / 60, secs % 60)
            }
        }
    }
}
