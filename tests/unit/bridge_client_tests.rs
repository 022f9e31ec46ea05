/*!
 * Tests for the translation bridge client
 */

use lingolens::app_config::BridgeConfig;
use lingolens::errors::TranslationError;
use lingolens::language_utils::LocaleCode;
use lingolens::providers::Translator;
use lingolens::providers::bridge::{GENERIC_FAILURE_MESSAGE, TranslationClient};
use std::time::Duration;
use crate::common;
use crate::common::mock_bridge::{self, MockBridge};

fn locale(code: &str) -> LocaleCode {
    code.parse().unwrap()
}

fn client_for(url: &str) -> TranslationClient {
    TranslationClient::new(url, "test-key", Duration::from_secs(5)).unwrap()
}

#[test]
fn test_new_withBaseUrl_shouldResolveTranslateEndpoint() {
    let client = client_for("http://localhost:3001");
    assert_eq!(client.translate_url().as_str(), "http://localhost:3001/api/translate");

    let nested = client_for("http://example.com/bridge");
    assert_eq!(nested.translate_url().as_str(), "http://example.com/bridge/api/translate");
}

#[test]
fn test_new_withInvalidUrl_shouldFail() {
    assert!(TranslationClient::new("not a url", "key", Duration::from_secs(5)).is_err());
}

#[tokio::test]
async fn test_translate_withSuccessResponse_shouldReturnTranslation() {
    common::init_logging();
    let bridge = MockBridge::translating_to("Hola mundo").await.unwrap();
    let client = client_for(bridge.url());

    let translation = client.translate("Hello world", &LocaleCode::Auto, &locale("es")).await.unwrap();
    assert_eq!(translation, "Hola mundo");

    let requests = bridge.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/api/translate");
    assert_eq!(request.header("authorization"), Some("Bearer test-key"));
    assert!(request.header("content-type").unwrap_or_default().contains("application/json"));

    let body = request.json();
    assert_eq!(body["text"], "Hello world");
    assert_eq!(body["sourceLang"], "auto");
    assert_eq!(body["targetLang"], "es");
}

#[tokio::test]
async fn test_translate_withExplicitSource_shouldSendLocaleCode() {
    let bridge = MockBridge::translating_to("Hello").await.unwrap();
    let client = client_for(bridge.url());

    client.translate("こんにちは", &locale("ja"), &locale("en")).await.unwrap();

    let body = bridge.requests()[0].json();
    assert_eq!(body["sourceLang"], "ja");
    assert_eq!(body["targetLang"], "en");
}

#[tokio::test]
async fn test_translate_withBridgeError_shouldHideDetailsByDefault() {
    let bridge = MockBridge::failing_with(500, "Upstream quota exceeded").await.unwrap();
    let client = client_for(bridge.url());

    let result = client.translate("Hello", &LocaleCode::Auto, &locale("es")).await;
    match result {
        Err(TranslationError::Bridge { status_code, message }) => {
            assert_eq!(status_code, 500);
            assert_eq!(message, GENERIC_FAILURE_MESSAGE);
        }
        other => panic!("Expected bridge error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_translate_withBridgeErrorExposed_shouldPassMessageThrough() {
    let bridge = MockBridge::failing_with(500, "Upstream quota exceeded").await.unwrap();
    let client = client_for(bridge.url()).expose_bridge_errors(true);

    let result = client.translate("Hello", &LocaleCode::Auto, &locale("es")).await;
    assert_eq!(
        result,
        Err(TranslationError::Bridge {
            status_code: 500,
            message: "Upstream quota exceeded".to_string(),
        })
    );
}

#[tokio::test]
async fn test_translate_withMalformedBody_shouldFail() {
    let bridge = MockBridge::start(200, "<html>oops</html>").await.unwrap();
    let client = client_for(bridge.url());

    let result = client.translate("Hello", &LocaleCode::Auto, &locale("es")).await;
    assert!(matches!(result, Err(TranslationError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_translate_withMissingTranslationField_shouldFail() {
    let bridge = MockBridge::start(200, r#"{"result":"Hola"}"#).await.unwrap();
    let client = client_for(bridge.url());

    let result = client.translate("Hello", &LocaleCode::Auto, &locale("es")).await;
    assert!(matches!(result, Err(TranslationError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_translate_withUnreachableBridge_shouldBeConnectionError() {
    let client = client_for(&mock_bridge::unreachable_url().unwrap());

    let result = client.translate("Hello", &LocaleCode::Auto, &locale("es")).await;
    assert!(matches!(result, Err(TranslationError::ConnectionError(_))));
}

#[tokio::test]
async fn test_translate_withInvalidInput_shouldNotSendRequest() {
    let bridge = MockBridge::translating_to("unused").await.unwrap();
    let client = client_for(bridge.url());

    let auto_target = client.translate("Hello", &LocaleCode::Auto, &LocaleCode::Auto).await;
    assert!(matches!(auto_target, Err(TranslationError::InvalidRequest(_))));

    let empty_text = client.translate("   ", &LocaleCode::Auto, &locale("es")).await;
    assert!(matches!(empty_text, Err(TranslationError::InvalidRequest(_))));

    assert!(bridge.requests().is_empty());
}

#[tokio::test]
async fn test_fromConfig_shouldCarryCredentialAndExposure() {
    let bridge = MockBridge::failing_with(502, "bad gateway detail").await.unwrap();
    let config = BridgeConfig {
        endpoint: bridge.url().to_string(),
        api_key: "config-key".to_string(),
        timeout_secs: 5,
        expose_bridge_errors: true,
    };
    let client = TranslationClient::from_config(&config).unwrap();

    let result = client.translate("Hello", &LocaleCode::Auto, &locale("fr")).await;
    assert!(matches!(result, Err(TranslationError::Bridge { status_code: 502, ref message }) if message == "bad gateway detail"));
    assert_eq!(bridge.requests()[0].header("authorization"), Some("Bearer config-key"));
}
