use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use url::Url;

use crate::errors::AppError;
use crate::language_utils::{LocaleCode, SourceLanguage};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language: a recognition identifier (e.g. "jpn") or "auto"
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target locale code (ISO 639)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation bridge config
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Detection and recognition engine config
    #[serde(default)]
    pub engine: EngineConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation bridge configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BridgeConfig {
    /// Base URL of the bridge
    #[serde(default = "default_bridge_endpoint")]
    pub endpoint: String,

    /// Service credential passed to the bridge
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_bridge_timeout_secs")]
    pub timeout_secs: u64,

    /// Show the bridge's own error text instead of a generic message
    #[serde(default)]
    pub expose_bridge_errors: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            endpoint: default_bridge_endpoint(),
            api_key: String::new(),
            timeout_secs: default_bridge_timeout_secs(),
            expose_bridge_errors: false,
        }
    }
}

/// Detection and recognition engine configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    /// Path or name of the tesseract binary
    #[serde(default = "default_tesseract_path")]
    pub tesseract_path: String,

    /// Timeout for a single engine call in seconds
    #[serde(default = "default_engine_timeout_secs")]
    pub timeout_secs: u64,

    /// Fail the run when script detection errors, instead of falling back to English
    #[serde(default)]
    pub strict_detection: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tesseract_path: default_tesseract_path(),
            timeout_secs: default_engine_timeout_secs(),
            strict_detection: false,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching `log` crate filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "auto".to_string()
}

fn default_target_language() -> String {
    "es".to_string()
}

fn default_bridge_endpoint() -> String {
    "http://localhost:3001".to_string()
}

fn default_bridge_timeout_secs() -> u64 {
    30
}

fn default_tesseract_path() -> String {
    "tesseract".to_string()
}

fn default_engine_timeout_secs() -> u64 {
    120 // OCR on large images can take a while
}

impl Config {

    /// Parsed source language
    pub fn source(&self) -> Result<SourceLanguage, AppError> {
        self.source_language.parse()
            .map_err(|e: anyhow::Error| AppError::Configuration(e.to_string()))
    }

    /// Parsed target locale
    pub fn target(&self) -> Result<LocaleCode, AppError> {
        let target: LocaleCode = self.target_language.parse()
            .map_err(|e: anyhow::Error| AppError::Configuration(e.to_string()))?;

        if target.is_auto() {
            return Err(AppError::Configuration("Target language cannot be 'auto'".to_string()));
        }

        Ok(target)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), AppError> {
        // Validate languages
        self.source()?;
        self.target()?;

        Url::parse(&self.bridge.endpoint)
            .map_err(|e| AppError::Configuration(format!("Invalid bridge endpoint '{}': {}", self.bridge.endpoint, e)))?;

        if self.bridge.timeout_secs == 0 {
            return Err(AppError::Configuration("Bridge timeout must be greater than zero".to_string()));
        }
        if self.engine.timeout_secs == 0 {
            return Err(AppError::Configuration("Engine timeout must be greater than zero".to_string()));
        }

        // Missing credential is fatal before any run starts
        if self.bridge.api_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "Translation bridge credential is missing (set LINGO_API_KEY or bridge.api_key)".to_string()
            ));
        }

        Ok(())
    }

    /// Load the configuration file, creating it with defaults when absent
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;

            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();

        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            bridge: BridgeConfig::default(),
            engine: EngineConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
