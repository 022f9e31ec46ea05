/*!
 * Mock translator implementations for testing.
 *
 * This module provides a translator that simulates different behaviors:
 * - `MockTranslator::working()` - Always succeeds with a tagged translation
 * - `MockTranslator::failing(..)` - Always fails with the given error
 * - `MockTranslator::slow(..)` - Succeeds after a delay
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::TranslationError;
use crate::language_utils::LocaleCode;
use crate::providers::Translator;

/// A translation request as the mock received it
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
    /// Source locale
    pub source: LocaleCode,
    /// Target locale
    pub target: LocaleCode,
}

/// Behavior mode for the mock translator
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds, returning `[<target>] <text>`
    Working,
    /// Always fails with the given error
    Failing(TranslationError),
    /// Succeeds after a delay
    Slow { delay_ms: u64 },
}

/// Mock translator recording every request it receives
#[derive(Debug)]
pub struct MockTranslator {
    behavior: MockBehavior,
    requests: Arc<Mutex<Vec<MockRequest>>>,
}

impl MockTranslator {
    /// Create a new mock translator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock translator that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock translator
    pub fn failing(error: TranslationError) -> Self {
        Self::new(MockBehavior::Failing(error))
    }

    /// Create a mock translator that answers after a delay
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn tagged(text: &str, target: &LocaleCode) -> String {
        format!("[{}] {}", target.as_str().to_uppercase(), text)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, source: &LocaleCode, target: &LocaleCode) -> Result<String, TranslationError> {
        self.requests.lock().push(MockRequest {
            text: text.to_string(),
            source: *source,
            target: *target,
        });

        match &self.behavior {
            MockBehavior::Working => Ok(Self::tagged(text, target)),
            MockBehavior::Failing(error) => Err(error.clone()),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                Ok(Self::tagged(text, target))
            }
        }
    }
}
