use async_trait::async_trait;
use log::{debug, error};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;

use crate::app_config::EngineConfig;
use crate::errors::EngineError;

use super::{EngineFactory, Recognition, ScriptReport, Worker, WorkerMode};

static OSD_SCRIPT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^Script:\s*(\S+)").expect("valid OSD script pattern")
});

static OSD_SCRIPT_CONFIDENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^Script confidence:\s*([0-9]+(?:\.[0-9]+)?)").expect("valid OSD confidence pattern")
});

/// Engine backed by the `tesseract` command-line binary
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    /// Path or name of the tesseract binary
    binary: PathBuf,
    /// Upper bound for a single engine invocation
    timeout: Duration,
}

impl TesseractEngine {
    /// Create an engine for the given binary
    pub fn new(binary: impl Into<PathBuf>, timeout_secs: u64) -> Self {
        Self {
            binary: binary.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Create an engine from the engine section of the configuration
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.tesseract_path, config.timeout_secs)
    }
}

#[async_trait]
impl EngineFactory for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn create_worker(&self, mode: WorkerMode) -> Result<Box<dyn Worker>, EngineError> {
        let workdir = tempfile::Builder::new()
            .prefix("lingolens-worker-")
            .tempdir()
            .map_err(|e| EngineError::Unavailable(format!("Failed to create worker directory: {}", e)))?;

        debug!("Created tesseract worker ({}) in {:?}", mode, workdir.path());

        Ok(Box::new(TesseractWorker {
            binary: self.binary.clone(),
            timeout: self.timeout,
            mode,
            workdir: Some(workdir),
        }))
    }
}

/// One tesseract "instance": a private working directory plus a mode
#[derive(Debug)]
struct TesseractWorker {
    binary: PathBuf,
    timeout: Duration,
    mode: WorkerMode,
    workdir: Option<TempDir>,
}

impl TesseractWorker {
    /// Write the image into the worker directory and return its path
    async fn stage_image(&self, image: &[u8]) -> Result<PathBuf, EngineError> {
        if image.is_empty() {
            return Err(EngineError::InvalidImage("image is empty".to_string()));
        }

        let workdir = self.workdir.as_ref()
            .ok_or_else(|| EngineError::Failed("worker has been terminated".to_string()))?;

        let path = workdir.path().join("input.img");
        tokio::fs::write(&path, image).await
            .map_err(|e| EngineError::Failed(format!("Failed to stage image: {}", e)))?;

        Ok(path)
    }

    /// Run tesseract with the given arguments and return its stdout
    async fn run(&self, args: Vec<OsString>) -> Result<String, EngineError> {
        let mut command = Command::new(&self.binary);
        command.args(&args).kill_on_drop(true);
        let command_future = command.output();

        let output = tokio::select! {
            result = command_future => {
                result.map_err(|e| match e.kind() {
                    ErrorKind::NotFound => EngineError::Unavailable(
                        format!("tesseract binary not found at {:?}", self.binary)
                    ),
                    _ => EngineError::Failed(format!("Failed to execute tesseract: {}", e)),
                })?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(EngineError::Timeout(self.timeout.as_secs()));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("tesseract failed ({}): {}", self.mode, stderr.trim());
            return Err(classify_failure(&stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Worker for TesseractWorker {
    fn mode(&self) -> WorkerMode {
        self.mode
    }

    async fn detect(&mut self, image: &[u8]) -> Result<ScriptReport, EngineError> {
        if self.mode != WorkerMode::ScriptDetection {
            return Err(EngineError::Failed(format!("{} worker cannot detect scripts", self.mode)));
        }

        let path = self.stage_image(image).await?;
        let stdout = self.run(vec![
            path.into_os_string(),
            "stdout".into(),
            "-l".into(),
            "osd".into(),
            "--psm".into(),
            "0".into(),
        ]).await?;

        parse_osd(&stdout)
    }

    async fn recognize(&mut self, image: &[u8]) -> Result<Recognition, EngineError> {
        let WorkerMode::Recognition(language) = self.mode else {
            return Err(EngineError::Failed(format!("{} worker cannot recognize text", self.mode)));
        };

        let path = self.stage_image(image).await?;
        let text = self.run(vec![
            path.into_os_string(),
            "stdout".into(),
            "-l".into(),
            language.code().into(),
        ]).await?;

        Ok(Recognition { text, confidence: None })
    }

    async fn terminate(&mut self) -> Result<(), EngineError> {
        match self.workdir.take() {
            Some(workdir) => {
                let path = workdir.path().to_path_buf();
                workdir.close()
                    .map_err(|e| EngineError::Failed(format!("Failed to remove worker directory: {}", e)))?;
                debug!("Terminated tesseract worker ({}), removed {:?}", self.mode, path);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Extract the script and its confidence from tesseract OSD output
pub fn parse_osd(output: &str) -> Result<ScriptReport, EngineError> {
    let script = OSD_SCRIPT.captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| EngineError::Failed("OSD output did not report a script".to_string()))?;

    let confidence = OSD_SCRIPT_CONFIDENCE.captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f32>().ok());

    Ok(ScriptReport { script, confidence })
}

/// Map tesseract stderr onto the engine error taxonomy
fn classify_failure(stderr: &str) -> EngineError {
    let message = stderr.trim().to_string();
    let lowered = message.to_lowercase();

    if lowered.contains("failed loading language") || lowered.contains("error opening data file") {
        EngineError::UnsupportedLanguage(message)
    } else if lowered.contains("pixread") || lowered.contains("unsupported image") || lowered.contains("image file") {
        EngineError::InvalidImage(message)
    } else {
        EngineError::Failed(message)
    }
}
