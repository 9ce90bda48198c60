//! Consultation session wiring
//!
//! Connects the session controller to the shared transcript log through
//! an entry pump task, and hangs the generation service plus the held
//! report off the same session object. Clearing the transcript also
//! invalidates the held report, since a report is only meaningful
//! against the log it was generated from.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use medscribe_foundation::{real_clock, GenerationError, SharedClock};
use medscribe_report::{
    AccountService, Credits, GeneratedReport, GenerationService, MemoryAccount, PatientDetails,
    PatientSnapshot, PatientVitals, Report, ReportBackend,
};
use medscribe_stt::{
    shared_log, ControllerConfig, ControllerHandle, ControllerState, SessionController,
    SessionState, SharedTranscriptLog, SpeechProvider, TranscriptEntry,
};

/// Options for starting a consultation session
pub struct SessionOptions {
    pub language: String,
    pub credits: u32,
    pub backend: Arc<dyn ReportBackend>,
}

/// One live consultation: recorder, transcript log, and report service
pub struct ConsultationSession {
    language: String,
    controller: ControllerHandle,
    log: SharedTranscriptLog,
    service: GenerationService,
    account: Arc<MemoryAccount>,
    last_report: Mutex<Option<Report>>,
    pump: JoinHandle<()>,
}

impl ConsultationSession {
    pub fn start(provider: Arc<dyn SpeechProvider>, options: SessionOptions) -> Self {
        let clock: SharedClock = real_clock();
        let log = shared_log();

        let (entry_tx, mut entry_rx) = mpsc::channel::<TranscriptEntry>(64);
        let controller = SessionController::spawn(
            provider,
            ControllerConfig {
                language: options.language.clone(),
                ..Default::default()
            },
            Arc::clone(&clock),
            entry_tx,
        );

        // Single writer: only the pump appends to the log.
        let pump_log = Arc::clone(&log);
        let pump = tokio::spawn(async move {
            while let Some(entry) = entry_rx.recv().await {
                info!(target: "app", "committed: {}", entry.text);
                pump_log.write().append(entry);
            }
        });

        let account = Arc::new(MemoryAccount::local(options.credits));
        let service = GenerationService::new(
            options.backend,
            Arc::clone(&account) as Arc<dyn AccountService>,
            clock,
        );

        Self {
            language: options.language,
            controller,
            log,
            service,
            account,
            last_report: Mutex::new(None),
            pump,
        }
    }

    pub async fn begin_recording(&self) {
        self.controller.start().await;
    }

    pub async fn stop_recording(&self) {
        self.controller.stop().await;
    }

    pub async fn set_language(&mut self, code: String) {
        self.controller.set_language(code.clone()).await;
        self.language = code;
    }

    pub fn recorder_state(&self) -> SessionState {
        self.controller.session_state()
    }

    pub fn controller_state(&self) -> ControllerState {
        self.controller.controller_state()
    }

    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.log.read().snapshot()
    }

    pub fn transcript_len(&self) -> usize {
        self.log.read().len()
    }

    /// Clear the transcript log. Also invalidates any held report.
    pub fn clear_transcript(&self) {
        self.log.write().clear();
        *self.last_report.lock() = None;
    }

    pub fn credits(&self) -> Credits {
        self.account.credits()
    }

    pub fn last_report(&self) -> Option<Report> {
        self.last_report.lock().clone()
    }

    /// Generate a report from the current transcript snapshot. The log
    /// and the snapshot survive a failed attempt unchanged.
    pub async fn generate(
        &self,
        details: &PatientDetails,
        vitals: &PatientVitals,
    ) -> Result<(GeneratedReport, PatientSnapshot), GenerationError> {
        let snapshot = PatientSnapshot::capture(details, vitals);
        let entries = self.log.read().snapshot();
        let generated = self
            .service
            .generate(&entries, &snapshot, &self.language)
            .await?;
        *self.last_report.lock() = Some(generated.report.clone());
        Ok((generated, snapshot))
    }

    /// Stop recording and tear down the controller and pump tasks.
    pub async fn shutdown(self) {
        self.controller.shutdown().await;
        // The controller task dropped the entry sender; the pump drains
        // and exits on its own.
        let _ = self.pump.await;
    }
}
