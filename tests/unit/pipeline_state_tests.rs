/*!
 * Tests for the pipeline state machine and run context
 */

use lingolens::errors::{PipelineError, TranslationError};
use lingolens::language_utils::{LocaleCode, OcrLanguage, ScriptLabel, SourceLanguage};
use lingolens::pipeline::{PipelineState, RunContext, RunRequest};

fn request() -> RunRequest {
    RunRequest::new(SourceLanguage::Auto, "es".parse::<LocaleCode>().unwrap())
}

#[test]
fn test_canTransitionTo_shouldFollowTransitionTable() {
    use PipelineState::*;

    let allowed = [
        (Idle, DetectingScript),
        (Idle, Extracting),
        (DetectingScript, Extracting),
        (DetectingScript, Failed),
        (Extracting, Translating),
        (Extracting, Failed),
        (Translating, Done),
        (Translating, Failed),
    ];
    let all = [Idle, DetectingScript, Extracting, Translating, Done, Failed];

    for from in all {
        for to in all {
            assert_eq!(
                from.can_transition_to(to),
                allowed.contains(&(from, to)),
                "{} -> {}",
                from,
                to
            );
        }
    }
}

#[test]
fn test_statusMessage_shouldDescribeEachPhase() {
    assert_eq!(PipelineState::Idle.status_message(), "Ready");
    assert_eq!(PipelineState::DetectingScript.status_message(), "Detecting script...");
    assert_eq!(PipelineState::Extracting.status_message(), "Scanning image...");
    assert_eq!(PipelineState::Translating.status_message(), "Translating...");
    assert_eq!(PipelineState::Done.status_message(), "Done!");
    assert_eq!(PipelineState::Failed.status_message(), "Error occurred");
}

#[test]
fn test_runContext_new_shouldStartIdleWithFreshId() {
    let first = RunContext::new(&request());
    let second = RunContext::new(&request());

    assert_eq!(first.state, PipelineState::Idle);
    assert_ne!(first.run_id, second.run_id);
    assert!(first.extracted_text.is_none());
    assert!(first.translated_text.is_none());
    assert!(first.error.is_none());
    assert!(RunContext::idle().run_id.is_nil());
}

#[test]
fn test_runContext_transition_withForbiddenStep_shouldFail() {
    let context = RunContext::new(&request());
    let result = context.transition(PipelineState::Translating);

    assert_eq!(
        result,
        Err(PipelineError::InvalidTransition {
            from: PipelineState::Idle,
            to: PipelineState::Translating,
        })
    );
}

#[test]
fn test_runContext_transition_shouldLeaveOriginalUntouched() {
    let idle = RunContext::new(&request());
    let detecting = idle.transition(PipelineState::DetectingScript).unwrap();

    assert_eq!(idle.state, PipelineState::Idle);
    assert_eq!(detecting.state, PipelineState::DetectingScript);
    assert_eq!(detecting.run_id, idle.run_id);
}

#[test]
fn test_runContext_fullRun_shouldYieldTranslation() {
    let done = RunContext::new(&request())
        .transition(PipelineState::DetectingScript).unwrap()
        .with_detected_script(ScriptLabel::Japanese)
        .with_ocr_language(OcrLanguage::Japanese)
        .transition(PipelineState::Extracting).unwrap()
        .with_extracted_text("こんにちは")
        .transition(PipelineState::Translating).unwrap()
        .with_translation("Hola")
        .transition(PipelineState::Done).unwrap();

    assert!(done.is_done());
    assert!(done.state.is_terminal());
    assert_eq!(done.detected_script, Some(ScriptLabel::Japanese));
    assert_eq!(done.ocr_language, Some(OcrLanguage::Japanese));
    assert_eq!(done.into_result(), Ok("Hola".to_string()));
}

#[test]
fn test_runContext_fail_fromTranslating_shouldKeepTextAndError() {
    let error = PipelineError::Translation(TranslationError::ConnectionError("refused".to_string()));
    let failed = RunContext::new(&request())
        .transition(PipelineState::Extracting).unwrap()
        .with_extracted_text("Hello")
        .transition(PipelineState::Translating).unwrap()
        .fail(error.clone()).unwrap();

    assert!(failed.is_failed());
    assert_eq!(failed.extracted_text.as_deref(), Some("Hello"));
    assert!(failed.translated_text.is_none());
    assert_eq!(failed.into_result(), Err(error));
}

#[test]
fn test_runContext_fail_fromDone_shouldBeRejected() {
    let done = RunContext::new(&request())
        .transition(PipelineState::Extracting).unwrap()
        .transition(PipelineState::Translating).unwrap()
        .transition(PipelineState::Done).unwrap();

    assert!(done.fail(PipelineError::Busy).is_err());
}
