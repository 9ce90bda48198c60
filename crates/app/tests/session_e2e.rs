//! End-to-end consultation flow against scripted provider and backend

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use medscribe_app::runtime::{ConsultationSession, SessionOptions};
use medscribe_export::render_text;
use medscribe_foundation::GenerationError;
use medscribe_report::{
    PatientDetails, PatientVitals, ReportBackend, ReportRequest, NOT_APPLICABLE, NOT_DISCUSSED,
};
use medscribe_stt::providers::MockProvider;
use medscribe_stt::{ControllerState, ProviderErrorCode, ProviderEvent, Segment};

struct CannedBackend(String);

#[async_trait]
impl ReportBackend for CannedBackend {
    async fn generate(&self, _request: &ReportRequest) -> Result<String, GenerationError> {
        Ok(self.0.clone())
    }
}

fn session_with(
    provider: &MockProvider,
    backend_reply: &str,
    credits: u32,
) -> ConsultationSession {
    ConsultationSession::start(
        Arc::new(provider.clone()),
        SessionOptions {
            language: "en".to_string(),
            credits,
            backend: Arc::new(CannedBackend(backend_reply.to_string())),
        },
    )
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

fn child_patient() -> PatientDetails {
    PatientDetails {
        name: "Arun".to_string(),
        age: "6".to_string(),
        gender: "child-male".to_string(),
        ..Default::default()
    }
}

const CHILD_REPLY: &str = r#"```json
{
  "patientInfo": {
    "symptoms": ["fever"],
    "currentCondition": "Febrile child, alert"
  },
  "childrenBirthHistory": "Full term, uneventful delivery",
  "diagnosis": "Viral fever",
  "advice": ["tepid sponging"],
  "followUp": "Review in 3 days"
}
```"#;

#[tokio::test(start_paused = true)]
async fn record_generate_and_render_a_child_consultation() {
    let provider = MockProvider::default();
    let session = session_with(&provider, CHILD_REPLY, 5);

    session.begin_recording().await;
    settle().await;
    assert!(session.recorder_state().listening);

    provider
        .emit(ProviderEvent::Result {
            segments: vec![Segment::final_with_confidence("Patient has fever", 0.95)],
        })
        .await;
    settle().await;

    let entries = session.transcript();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "Patient has fever");

    session.stop_recording().await;
    settle().await;
    assert!(!session.recorder_state().listening);

    let (generated, snapshot) = session
        .generate(&child_patient(), &PatientVitals::default())
        .await
        .expect("report");

    let report = &generated.report;
    assert!(!generated.used_fallback);
    assert_eq!(report.consultation_transcript, "Patient has fever");
    // Birth history comes from upstream for a child; pregnancy history is
    // gated off by category.
    assert_eq!(report.body.children_birth_history, "Full term, uneventful delivery");
    assert_ne!(report.body.children_birth_history, NOT_DISCUSSED);
    assert_eq!(report.body.pregnancy_history, NOT_APPLICABLE);

    let text = render_text(report, &snapshot);
    assert!(text.contains("── BIRTH HISTORY ──"));
    assert!(!text.contains("── PREGNANCY HISTORY ──"));
    assert!(text.contains("Name: Arun"));

    assert_eq!(session.credits().used, 1);
    assert_eq!(session.last_report().map(|r| r.id), Some(report.id.clone()));

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn silence_timeouts_do_not_interrupt_a_consultation() {
    let provider = MockProvider::default();
    let session = session_with(&provider, "{}", 5);

    session.begin_recording().await;
    settle().await;

    provider
        .emit(ProviderEvent::Result {
            segments: vec![Segment::final_with_confidence("fever since monday", 0.9)],
        })
        .await;
    provider
        .emit(ProviderEvent::Error {
            code: ProviderErrorCode::NoSpeech,
            message: None,
        })
        .await;
    // Past the debounce: the controller restarts transparently.
    tokio::time::sleep(Duration::from_millis(250)).await;

    assert!(session.recorder_state().listening);
    assert_eq!(session.recorder_state().last_error, None);

    provider
        .emit(ProviderEvent::Result {
            segments: vec![Segment::final_with_confidence("now has a cough", 0.9)],
        })
        .await;
    settle().await;

    // Both sides of the silence gap were captured, in order.
    let texts: Vec<_> = session.transcript().into_iter().map(|e| e.text).collect();
    assert_eq!(texts, vec!["fever since monday", "now has a cough"]);

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn clearing_the_transcript_invalidates_the_held_report() {
    let provider = MockProvider::default();
    let session = session_with(&provider, "{}", 5);

    session.begin_recording().await;
    settle().await;
    provider
        .emit(ProviderEvent::Result {
            segments: vec![Segment::final_with_confidence("short consult", 0.9)],
        })
        .await;
    settle().await;
    session.stop_recording().await;

    session
        .generate(&PatientDetails::default(), &PatientVitals::default())
        .await
        .expect("report");
    assert!(session.last_report().is_some());

    session.clear_transcript();
    assert!(session.last_report().is_none());
    assert_eq!(session.transcript_len(), 0);

    // With an empty log, generation is rejected locally.
    let result = session
        .generate(&PatientDetails::default(), &PatientVitals::default())
        .await;
    assert!(matches!(result, Err(GenerationError::EmptyTranscript)));

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn failed_generation_preserves_the_transcript() {
    struct FailingBackend;
    #[async_trait]
    impl ReportBackend for FailingBackend {
        async fn generate(&self, _r: &ReportRequest) -> Result<String, GenerationError> {
            Err(GenerationError::RateLimited)
        }
    }

    let provider = MockProvider::default();
    let session = ConsultationSession::start(
        Arc::new(provider.clone()),
        SessionOptions {
            language: "en".to_string(),
            credits: 5,
            backend: Arc::new(FailingBackend),
        },
    );

    session.begin_recording().await;
    settle().await;
    provider
        .emit(ProviderEvent::Result {
            segments: vec![Segment::final_with_confidence("keep me", 0.9)],
        })
        .await;
    settle().await;
    session.stop_recording().await;
    settle().await;
    assert_eq!(session.controller_state(), ControllerState::Stopped);

    let result = session
        .generate(&PatientDetails::default(), &PatientVitals::default())
        .await;
    assert!(matches!(result, Err(GenerationError::RateLimited)));

    // Nothing was lost: retry is possible without re-recording.
    assert_eq!(session.transcript_len(), 1);
    assert_eq!(session.credits().used, 0);
    assert!(session.last_report().is_none());

    session.shutdown().await;
}
