//! Generation service tests with a scripted backend

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use medscribe_foundation::{test_clock, GenerationError};
use medscribe_report::{
    AccountService, GenerationService, MemoryAccount, PatientDetails, PatientSnapshot,
    PatientVitals, ReportBackend, ReportRequest, NOT_APPLICABLE,
};
use medscribe_stt::TranscriptEntry;

const CHILD_REPORT_JSON: &str = r#"{
  "patientInfo": {
    "symptoms": ["fever"],
    "medicalHistory": "Not discussed",
    "currentCondition": "Febrile, otherwise stable"
  },
  "childrenBirthHistory": "Full term, normal vaginal delivery",
  "pregnancyHistory": "",
  "diagnosis": "Viral fever",
  "medications": [
    {
      "name": "Paracetamol syrup",
      "dosage": "250mg/5ml",
      "frequency": "three times daily",
      "duration": "3 days",
      "instructions": "after food"
    }
  ],
  "advice": ["plenty of fluids"],
  "followUp": "Review after 3 days"
}"#;

/// Scripted backend: counts calls, returns a canned reply or error
struct ScriptedBackend {
    reply: Result<String, GenerationError>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(error: GenerationError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(error),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportBackend for ScriptedBackend {
    async fn generate(&self, _request: &ReportRequest) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(GenerationError::RateLimited) => Err(GenerationError::RateLimited),
            Err(GenerationError::QuotaExceeded) => Err(GenerationError::QuotaExceeded),
            Err(e) => Err(GenerationError::Upstream(e.to_string())),
        }
    }
}

/// Backend that parks until released, for exercising the in-flight gate
struct ParkedBackend {
    release: Notify,
}

#[async_trait]
impl ReportBackend for ParkedBackend {
    async fn generate(&self, _request: &ReportRequest) -> Result<String, GenerationError> {
        self.release.notified().await;
        Ok("{}".to_string())
    }
}

fn entries(texts: &[&str]) -> Vec<TranscriptEntry> {
    let clock = test_clock();
    texts
        .iter()
        .map(|t| TranscriptEntry::commit(t.to_string(), "en".to_string(), &clock))
        .collect()
}

fn snapshot(gender: &str) -> PatientSnapshot {
    let details = PatientDetails {
        gender: gender.to_string(),
        ..Default::default()
    };
    PatientSnapshot::capture(&details, &PatientVitals::default())
}

fn service(backend: Arc<dyn ReportBackend>, credits: u32) -> (GenerationService, Arc<MemoryAccount>) {
    let account = Arc::new(MemoryAccount::local(credits));
    let svc = GenerationService::new(backend, Arc::clone(&account) as Arc<dyn AccountService>, test_clock());
    (svc, account)
}

#[tokio::test]
async fn fever_consultation_for_a_child_gates_histories() {
    let backend = ScriptedBackend::replying(CHILD_REPORT_JSON);
    let (svc, account) = service(backend.clone(), 3);

    let log = entries(&["Patient has fever"]);
    let generated = svc
        .generate(&log, &snapshot("child-male"), "en")
        .await
        .expect("report");

    assert!(!generated.used_fallback);
    let report = &generated.report;
    assert!(report.id.starts_with("rx-"));
    assert_eq!(report.consultation_transcript, "Patient has fever");
    assert_eq!(
        report.body.children_birth_history,
        "Full term, normal vaginal delivery"
    );
    assert_eq!(report.body.pregnancy_history, NOT_APPLICABLE);
    assert_eq!(report.body.medications.len(), 1);
    assert_eq!(report.body.medications[0].name, "Paracetamol syrup");

    assert_eq!(backend.calls(), 1);
    assert_eq!(account.credits().used, 1);
}

#[tokio::test]
async fn adult_female_report_gates_birth_history() {
    let backend = ScriptedBackend::replying(
        r#"{"pregnancyHistory": "G2P1, last delivery 2023", "childrenBirthHistory": "ignored"}"#,
    );
    let (svc, _account) = service(backend, 3);

    let generated = svc
        .generate(&entries(&["routine antenatal review"]), &snapshot("female"), "en")
        .await
        .expect("report");

    assert_eq!(
        generated.report.body.pregnancy_history,
        "G2P1, last delivery 2023"
    );
    assert_eq!(generated.report.body.children_birth_history, NOT_APPLICABLE);
}

#[tokio::test]
async fn empty_transcript_is_rejected_without_a_network_call() {
    let backend = ScriptedBackend::replying("{}");
    let (svc, account) = service(backend.clone(), 3);

    let result = svc.generate(&[], &snapshot("male"), "en").await;
    assert!(matches!(result, Err(GenerationError::EmptyTranscript)));
    assert_eq!(backend.calls(), 0);
    assert_eq!(account.credits().used, 0);
    assert!(!svc.is_generating());
}

#[tokio::test]
async fn zero_credits_block_before_the_network_call() {
    let backend = ScriptedBackend::replying("{}");
    let (svc, _account) = service(backend.clone(), 0);

    let result = svc
        .generate(&entries(&["hello"]), &snapshot("male"), "en")
        .await;
    assert!(matches!(result, Err(GenerationError::CreditsExhausted)));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn malformed_reply_yields_fallback_and_still_consumes_a_credit() {
    let backend = ScriptedBackend::replying("I'm sorry, I can't produce JSON today.");
    let (svc, account) = service(backend, 2);

    let generated = svc
        .generate(&entries(&["some consultation"]), &snapshot("male"), "en")
        .await
        .expect("fallback report is still a report");

    assert!(generated.used_fallback);
    let body = &generated.report.body;
    assert!(body.medications.is_empty());
    assert!(body
        .advice
        .iter()
        .any(|a| a.contains("healthcare professional")));
    assert_eq!(account.credits().used, 1);
}

#[tokio::test]
async fn backend_errors_propagate_and_leave_credits_untouched() {
    let backend = ScriptedBackend::failing(GenerationError::RateLimited);
    let (svc, account) = service(backend, 2);

    let log = entries(&["some consultation"]);
    let result = svc.generate(&log, &snapshot("male"), "en").await;
    assert!(matches!(result, Err(GenerationError::RateLimited)));
    assert_eq!(account.credits().used, 0);
    // The in-flight flag is cleared on the error path too.
    assert!(!svc.is_generating());

    // The transcript snapshot survives the failed attempt unchanged.
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].text, "some consultation");
}

#[tokio::test]
async fn concurrent_generations_are_rejected() {
    let parked = Arc::new(ParkedBackend {
        release: Notify::new(),
    });
    let account = Arc::new(MemoryAccount::local(5));
    let svc = Arc::new(GenerationService::new(
        Arc::clone(&parked) as Arc<dyn ReportBackend>,
        account as Arc<dyn AccountService>,
        test_clock(),
    ));

    let log = entries(&["long consultation"]);
    let first = {
        let svc = Arc::clone(&svc);
        let log = log.clone();
        tokio::spawn(async move { svc.generate(&log, &snapshot("male"), "en").await })
    };

    // Wait until the first call is parked inside the backend.
    while !svc.is_generating() {
        tokio::task::yield_now().await;
    }

    let second = svc.generate(&log, &snapshot("male"), "en").await;
    assert!(matches!(second, Err(GenerationError::InFlight)));

    parked.release.notify_one();
    let first = first.await.expect("task").expect("report");
    assert!(first.report.id.starts_with("rx-"));
    assert!(!svc.is_generating());
}

#[tokio::test]
async fn report_ids_are_unique_across_generations() {
    let backend = ScriptedBackend::replying("{}");
    let (svc, _account) = service(backend, 5);
    let log = entries(&["consult"]);

    let a = svc
        .generate(&log, &snapshot("male"), "en")
        .await
        .expect("first");
    let b = svc
        .generate(&log, &snapshot("male"), "en")
        .await
        .expect("second");
    assert_ne!(a.report.id, b.report.id);
}
