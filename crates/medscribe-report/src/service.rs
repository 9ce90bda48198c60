//! Report generation service
//!
//! Orchestrates one generation attempt: local validation, credit gate,
//! backend call, parse with fallback, sentinel normalization, and
//! stamping. One outstanding call at a time; the in-flight flag is
//! cleared on every exit path. The transcript snapshot and patient
//! snapshot are never mutated by any outcome, so a failed attempt can be
//! retried without re-recording.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use medscribe_foundation::{GenerationError, SharedClock};
use medscribe_stt::TranscriptEntry;

use crate::account::AccountService;
use crate::backend::ReportBackend;
use crate::parse::parse_report_payload;
use crate::patient::PatientSnapshot;
use crate::request::assemble_request;
use crate::types::Report;

/// Generates session-unique report sequence numbers
static REPORT_SEQ: AtomicU64 = AtomicU64::new(1);

fn next_report_seq() -> u64 {
    REPORT_SEQ.fetch_add(1, Ordering::SeqCst)
}

/// Outcome of a successful generation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReport {
    pub report: Report,
    /// True when the model reply was malformed and the deterministic
    /// fallback body was substituted
    pub used_fallback: bool,
}

pub struct GenerationService {
    backend: Arc<dyn ReportBackend>,
    account: Arc<dyn AccountService>,
    clock: SharedClock,
    in_flight: AtomicBool,
}

impl GenerationService {
    pub fn new(
        backend: Arc<dyn ReportBackend>,
        account: Arc<dyn AccountService>,
        clock: SharedClock,
    ) -> Self {
        Self {
            backend,
            account,
            clock,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Run one generation attempt against a transcript-log snapshot.
    pub async fn generate(
        &self,
        entries: &[TranscriptEntry],
        snapshot: &PatientSnapshot,
        language_code: &str,
    ) -> Result<GeneratedReport, GenerationError> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        // Local validation happens before any network traffic.
        let request = assemble_request(entries, snapshot, language_code)?;
        if self.account.credits().remaining() == 0 {
            return Err(GenerationError::CreditsExhausted);
        }

        info!(
            target: "report",
            "generating prescription report ({} entries, language: {})",
            entries.len(),
            request.language
        );

        let content = self.backend.generate(&request).await?;

        let parsed = parse_report_payload(&content);
        let used_fallback = parsed.is_fallback();
        let body = parsed
            .into_body()
            .normalize(snapshot.is_child, snapshot.is_female);

        let now = self.clock.now();
        let report = Report {
            id: format!("rx-{}-{}", now.timestamp_millis(), next_report_seq()),
            body,
            generated_at: now,
            consultation_transcript: request.transcript,
        };

        // The upstream call was made either way, so a fallback report
        // still consumes the credit.
        self.account.consume_credit()?;

        if used_fallback {
            warn!(target: "report", "model reply was malformed; substituted fallback report {}", report.id);
        } else {
            info!(target: "report", "prescription report {} generated", report.id);
        }

        Ok(GeneratedReport {
            report,
            used_fallback,
        })
    }
}

/// RAII in-flight marker: acquisition fails while another generation is
/// outstanding, and dropping it clears the flag on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, GenerationError> {
        if flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            Ok(Self(flag))
        } else {
            Err(GenerationError::InFlight)
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
