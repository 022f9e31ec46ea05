use anyhow::{Result, Context};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::app_config::BridgeConfig;
use crate::errors::TranslationError;
use crate::language_utils::LocaleCode;

use super::Translator;

/// Message surfaced to callers when bridge errors are not exposed
pub const GENERIC_FAILURE_MESSAGE: &str = "Translation failed. Please try again.";

/// Client for the translation bridge (`POST /api/translate`)
#[derive(Debug)]
pub struct TranslationClient {
    /// HTTP client for API requests
    client: Client,
    /// Fully resolved translate endpoint
    translate_url: Url,
    /// Credential passed to the bridge
    api_key: String,
    /// Whether bridge error text is passed through to callers
    expose_bridge_errors: bool,
}

/// Translate request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    /// Text to translate
    pub text: String,
    /// Source locale or `"auto"`
    pub source_lang: String,
    /// Target locale
    pub target_lang: String,
}

/// Translate response body, success or failure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslateResponse {
    /// Translated text on success
    #[serde(default)]
    pub translation: Option<String>,
    /// Error message on failure
    #[serde(default)]
    pub error: Option<String>,
}

impl TranslationClient {
    /// Create a new bridge client
    pub fn new(endpoint: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(endpoint)
            .with_context(|| format!("Invalid bridge endpoint: {}", endpoint))?;

        // Url::join drops the last path segment unless the base ends with '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let translate_url = base.join("api/translate")
            .with_context(|| format!("Invalid bridge endpoint: {}", endpoint))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            translate_url,
            api_key: api_key.into(),
            expose_bridge_errors: false,
        })
    }

    /// Create a client from the bridge section of the configuration
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        Ok(Self::new(&config.endpoint, config.api_key.clone(), Duration::from_secs(config.timeout_secs))?
            .expose_bridge_errors(config.expose_bridge_errors))
    }

    /// Pass the bridge's own error text through instead of the generic message
    pub fn expose_bridge_errors(mut self, expose: bool) -> Self {
        self.expose_bridge_errors = expose;
        self
    }

    /// Endpoint requests are sent to
    pub fn translate_url(&self) -> &Url {
        &self.translate_url
    }
}

#[async_trait]
impl Translator for TranslationClient {
    async fn translate(&self, text: &str, source: &LocaleCode, target: &LocaleCode) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Err(TranslationError::InvalidRequest("text is empty".to_string()));
        }
        if target.is_auto() {
            return Err(TranslationError::InvalidRequest("target language must be a concrete locale".to_string()));
        }

        let body = TranslateRequest {
            text: text.to_string(),
            source_lang: source.as_str().to_string(),
            target_lang: target.as_str().to_string(),
        };

        debug!("Sending {} characters to bridge: {} -> {}", text.chars().count(), source, target);

        let mut request = self.client.post(self.translate_url.clone()).json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await
            .map_err(|e| TranslationError::ConnectionError(format!("Failed to reach translation bridge: {}", e)))?;

        let status = response.status();
        let raw = response.text().await
            .map_err(|e| TranslationError::ConnectionError(format!("Failed to read bridge response: {}", e)))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<TranslateResponse>(&raw)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| raw.trim().to_string());

            error!("Translation bridge error ({}): {}", status, detail);

            let message = if self.expose_bridge_errors && !detail.is_empty() {
                detail
            } else {
                GENERIC_FAILURE_MESSAGE.to_string()
            };

            return Err(TranslationError::Bridge {
                status_code: status.as_u16(),
                message,
            });
        }

        let parsed: TranslateResponse = serde_json::from_str(&raw)
            .map_err(|e| TranslationError::MalformedResponse(format!("Failed to parse bridge response: {}", e)))?;

        parsed.translation
            .ok_or_else(|| TranslationError::MalformedResponse("response has no translation field".to_string()))
    }
}
