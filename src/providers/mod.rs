/*!
 * Translation provider implementations.
 *
 * This module contains the clients the pipeline can translate through:
 * - bridge: HTTP client for the local translation bridge
 * - mock: scripted translator for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::TranslationError;
use crate::language_utils::LocaleCode;

/// Common trait for everything that can translate extracted text
///
/// The pipeline only depends on this trait, so the bridge client and the
/// test doubles can be used interchangeably.
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Translate text from one locale to another
    ///
    /// # Arguments
    /// * `text` - The text to translate
    /// * `source` - Source locale, or `LocaleCode::Auto` to let the service infer it
    /// * `target` - Target locale
    ///
    /// # Returns
    /// * `Result<String, TranslationError>` - The translated text or an error
    async fn translate(&self, text: &str, source: &LocaleCode, target: &LocaleCode) -> Result<String, TranslationError>;
}

pub mod bridge;
pub mod mock;
