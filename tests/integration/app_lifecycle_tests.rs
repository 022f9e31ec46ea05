/*!
 * Integration tests for application lifecycle
 */

use anyhow::Result;
use lingolens::app_config::Config;
use lingolens::app_controller::Controller;
use lingolens::engine::mock::ScriptedEngine;
use lingolens::language_utils::ScriptLabel;
use lingolens::pipeline::PipelineState;
use lingolens::providers::Translator;
use lingolens::providers::bridge::TranslationClient;
use lingolens::providers::mock::MockTranslator;
use std::sync::Arc;
use crate::common;
use crate::common::mock_bridge::MockBridge;

fn controller_with(config: Config, engine: ScriptedEngine, translator: Arc<dyn Translator>) -> Controller {
    Controller::with_components(config, Arc::new(engine), translator).without_progress()
}

/// Test the controller initialization with a valid config
#[test]
fn test_controller_withValidConfig_shouldInitialize() -> Result<()> {
    let controller = Controller::with_config(common::valid_config())?;
    assert!(!controller.pipeline().is_busy());
    assert_eq!(controller.images().live_handles(), 0);
    Ok(())
}

/// Image loading works from a plain blocking test
#[test]
fn test_loadImage_withBlockingRuntime_shouldIssueHandle() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let image_path = common::create_test_image(temp_dir.path(), "photo.png")?;
    let mut controller = controller_with(
        common::valid_config(),
        ScriptedEngine::new(),
        Arc::new(MockTranslator::working()),
    );

    tokio_test::block_on(controller.load_image(&image_path))?;

    assert_eq!(controller.images().live_handles(), 1);
    Ok(())
}

/// Missing credential fails before any run can start
#[test]
fn test_controller_withoutCredential_shouldFailFast() {
    assert!(Controller::with_config(Config::default()).is_err());
}

#[tokio::test]
async fn test_run_withImageFile_shouldTranslateAndKeepHandle() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let image_path = common::create_test_image(temp_dir.path(), "sign.png")?;

    let engine = ScriptedEngine::new().detects("Cyrillic").recognizes("Привет");
    let translator = Arc::new(MockTranslator::working());
    let mut controller = controller_with(common::valid_config(), engine, translator.clone());

    let context = controller.run(&image_path).await?;

    assert_eq!(context.state, PipelineState::Done);
    assert_eq!(context.detected_script, Some(ScriptLabel::Cyrillic));
    assert_eq!(context.translated_text.as_deref(), Some("[ES] Привет"));
    assert_eq!(translator.requests()[0].source.as_str(), "ru");
    assert_eq!(controller.images().live_handles(), 1);
    Ok(())
}

#[tokio::test]
async fn test_run_withSecondImage_shouldRevokeFirst() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let first = common::create_test_image(temp_dir.path(), "first.png")?;
    let second = common::create_test_image(temp_dir.path(), "second.png")?;

    let mut controller = controller_with(
        common::valid_config(),
        ScriptedEngine::new(),
        Arc::new(MockTranslator::working()),
    );

    controller.run(&first).await?;
    controller.run(&second).await?;

    assert_eq!(controller.images().live_handles(), 1);
    assert_eq!(controller.images().revoked(), 1);
    Ok(())
}

#[tokio::test]
async fn test_run_withConfiguredSource_shouldSkipDetection() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let image_path = common::create_test_image(temp_dir.path(), "menu.png")?;

    let mut config = common::valid_config();
    config.source_language = "fra".to_string();
    config.target_language = "en".to_string();

    let engine = ScriptedEngine::new().recognizes("Bonjour");
    let tracker = engine.tracker();
    let translator = Arc::new(MockTranslator::working());
    let mut controller = controller_with(config, engine, translator.clone());

    let context = controller.run(&image_path).await?;

    assert!(context.is_done());
    assert_eq!(tracker.detect_calls(), 0);
    assert_eq!(translator.requests()[0].source.as_str(), "fr");
    assert_eq!(translator.requests()[0].target.as_str(), "en");
    Ok(())
}

#[tokio::test]
async fn test_run_withMissingFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut controller = controller_with(
        common::valid_config(),
        ScriptedEngine::new(),
        Arc::new(MockTranslator::working()),
    );

    let result = controller.run(&temp_dir.path().join("missing.png")).await;
    assert!(result.is_err());
    assert_eq!(controller.images().live_handles(), 0);
    Ok(())
}

#[tokio::test]
async fn test_loadImage_withEmptyFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let empty = common::create_test_file(temp_dir.path(), "empty.png", b"")?;
    let mut controller = controller_with(
        common::valid_config(),
        ScriptedEngine::new(),
        Arc::new(MockTranslator::working()),
    );

    assert!(controller.load_image(&empty).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_runLoaded_withoutImage_shouldFail() {
    let controller = controller_with(
        common::valid_config(),
        ScriptedEngine::new(),
        Arc::new(MockTranslator::working()),
    );

    assert!(controller.run_loaded().await.is_err());
}

/// Full stack through the HTTP bridge client
#[tokio::test]
async fn test_run_throughBridgeClient_shouldReturnBridgeTranslation() -> Result<()> {
    let bridge = MockBridge::translating_to("Bonjour le monde").await?;
    let temp_dir = common::create_temp_dir()?;
    let image_path = common::create_test_image(temp_dir.path(), "hello.png")?;

    let mut config = common::valid_config();
    config.bridge.endpoint = bridge.url().to_string();
    config.target_language = "fr".to_string();
    let client = Arc::new(TranslationClient::from_config(&config.bridge)?);

    let mut controller = controller_with(config, ScriptedEngine::new(), client);
    let context = controller.run(&image_path).await?;

    assert_eq!(context.into_result()?, "Bonjour le monde");
    let body = bridge.requests()[0].json();
    assert_eq!(body["text"], "Hello world\n");
    assert_eq!(body["sourceLang"], "auto");
    assert_eq!(body["targetLang"], "fr");
    Ok(())
}

#[tokio::test]
async fn test_run_withBridgeFailure_shouldKeepExtractedText() -> Result<()> {
    let bridge = MockBridge::failing_with(500, "provider exploded").await?;
    let temp_dir = common::create_temp_dir()?;
    let image_path = common::create_test_image(temp_dir.path(), "hello.png")?;

    let mut config = common::valid_config();
    config.bridge.endpoint = bridge.url().to_string();
    let client = Arc::new(TranslationClient::from_config(&config.bridge)?);

    let mut controller = controller_with(config, ScriptedEngine::new(), client);
    let context = controller.run(&image_path).await?;

    assert!(context.is_failed());
    assert_eq!(context.extracted_text.as_deref(), Some("Hello world\n"));
    let message = context.error.map(|e| e.to_string()).unwrap_or_default();
    assert!(message.contains("Translation failed. Please try again."));
    assert!(!message.contains("provider exploded"));
    Ok(())
}
