//! Continuous transcription session controller
//!
//! Owns the lifecycle of one recognition session: creates provider
//! handles bound to the selected consultation language, merges interim
//! and final segments into committed transcript entries, and keeps the
//! session alive across recoverable provider failures (silence timeouts,
//! spontaneous termination) with a debounced, cancellable restart.
//!
//! The provider's callback-style notifications are modeled as inputs to
//! an explicit state machine so the central invariant — no provider
//! restart after `stop()` — is a transition guard, not a scattering of
//! boolean checks. The manual-stop flag is set before the provider stop
//! call on every stop path, and re-checked at the moment the restart
//! timer fires.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use medscribe_foundation::{language, SharedClock, SttError};

use crate::provider::{RecognizerHandle, SpeechProvider};
use crate::transcript::TranscriptEntry;
use crate::types::{
    ControllerState, ProviderErrorCode, ProviderEvent, RecognizerConfig, SessionState, SttMetrics,
};

/// Capacity of the per-session provider event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Capacity of the command channel
const COMMAND_CHANNEL_CAPACITY: usize = 16;

/// Commands accepted by a running controller
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Start,
    Stop,
    /// Select the consultation language. Takes effect when the next
    /// provider session is created.
    SetLanguage(String),
}

/// Controller configuration
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Consultation language code (registry key, not a locale tag)
    pub language: String,
    /// Fixed wait before a recoverable-failure restart, preventing tight
    /// restart loops against a provider that keeps failing immediately
    pub restart_debounce: Duration,
    /// Provider error codes that trigger the debounced restart instead of
    /// being surfaced. Unknown codes are always surfaced and never
    /// auto-restarted.
    pub restartable_errors: Vec<ProviderErrorCode>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            restart_debounce: Duration::from_millis(100),
            restartable_errors: vec![ProviderErrorCode::NoSpeech],
        }
    }
}

/// How a pending restart re-acquires a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RestartKind {
    /// Try `start()` on the existing handle, re-create on failure
    Reuse,
    /// Discard the handle and create a fresh session
    Recreate,
}

#[derive(Debug)]
struct PendingRestart {
    deadline: tokio::time::Instant,
    kind: RestartKind,
}

/// One live provider session: the handle plus its event channel. Dropping
/// the receiver invalidates any in-flight events from a discarded handle.
struct ActiveSession {
    handle: Box<dyn RecognizerHandle>,
    events: mpsc::Receiver<ProviderEvent>,
}

/// The session controller task. Constructed via [`SessionController::spawn`];
/// interact through the returned [`ControllerHandle`].
pub struct SessionController {
    provider: Arc<dyn SpeechProvider>,
    config: ControllerConfig,
    clock: SharedClock,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    entry_tx: mpsc::Sender<TranscriptEntry>,
    session: Option<ActiveSession>,
    state: ControllerState,
    fsm_state: Arc<RwLock<ControllerState>>,
    shared: Arc<RwLock<SessionState>>,
    metrics: Arc<RwLock<SttMetrics>>,
    pending_restart: Option<PendingRestart>,
}

/// Handle to a spawned controller
pub struct ControllerHandle {
    cmd_tx: mpsc::Sender<SessionCommand>,
    shared: Arc<RwLock<SessionState>>,
    fsm_state: Arc<RwLock<ControllerState>>,
    metrics: Arc<RwLock<SttMetrics>>,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    pub async fn start(&self) {
        let _ = self.cmd_tx.send(SessionCommand::Start).await;
    }

    pub async fn stop(&self) {
        let _ = self.cmd_tx.send(SessionCommand::Stop).await;
    }

    pub async fn set_language(&self, code: impl Into<String>) {
        let _ = self
            .cmd_tx
            .send(SessionCommand::SetLanguage(code.into()))
            .await;
    }

    /// Snapshot of the observable session state
    pub fn session_state(&self) -> SessionState {
        self.shared.read().clone()
    }

    /// Current state-machine state
    pub fn controller_state(&self) -> ControllerState {
        *self.fsm_state.read()
    }

    pub fn is_listening(&self) -> bool {
        self.shared.read().listening
    }

    pub fn is_supported(&self) -> bool {
        self.shared.read().supported
    }

    pub fn interim_text(&self) -> String {
        self.shared.read().interim_text.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.shared.read().last_error.clone()
    }

    pub fn metrics(&self) -> SttMetrics {
        self.metrics.read().clone()
    }

    /// Tear the controller down. Identical cleanup to `stop()`: the task
    /// cancels any pending restart, stops and discards the provider
    /// handle, then exits.
    pub async fn shutdown(self) {
        drop(self.cmd_tx);
        let _ = self.task.await;
    }
}

impl SessionController {
    /// Probe the provider capability once and spawn the controller task.
    /// Committed entries are emitted on `entry_tx` exactly once each, in
    /// commit order.
    pub fn spawn(
        provider: Arc<dyn SpeechProvider>,
        config: ControllerConfig,
        clock: SharedClock,
        entry_tx: mpsc::Sender<TranscriptEntry>,
    ) -> ControllerHandle {
        let supported = provider.is_supported();
        let state = if supported {
            ControllerState::Idle
        } else {
            info!(target: "stt", "no speech recognition capability in this environment");
            ControllerState::Unsupported
        };

        let shared = Arc::new(RwLock::new(SessionState::new(supported)));
        let fsm_state = Arc::new(RwLock::new(state));
        let metrics = Arc::new(RwLock::new(SttMetrics::default()));
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        let controller = Self {
            provider,
            config,
            clock,
            cmd_rx,
            entry_tx,
            session: None,
            state,
            fsm_state: Arc::clone(&fsm_state),
            shared: Arc::clone(&shared),
            metrics: Arc::clone(&metrics),
            pending_restart: None,
        };
        let task = tokio::spawn(controller.run());

        ControllerHandle {
            cmd_tx,
            shared,
            fsm_state,
            metrics,
            task,
        }
    }

    /// Controller event loop. All transitions execute synchronously
    /// relative to the event that triggers them; the restart timer is the
    /// only asynchronous element and is armed only while a restart is
    /// pending.
    async fn run(mut self) {
        debug!(target: "stt", "session controller started (language: {})", self.config.language);

        loop {
            let restart_at = self.pending_restart.as_ref().map(|p| p.deadline);

            tokio::select! {
                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(SessionCommand::Start) => self.handle_start(),
                        Some(SessionCommand::Stop) => self.handle_stop(),
                        Some(SessionCommand::SetLanguage(code)) => {
                            debug!(target: "stt", "language set to {}", code);
                            self.config.language = code;
                        }
                        None => {
                            // Consumer went away: identical cleanup to stop().
                            self.handle_stop();
                            break;
                        }
                    }
                }
                event = Self::next_session_event(&mut self.session) => {
                    match event {
                        Some(ev) => self.handle_provider_event(ev).await,
                        None => self.handle_session_channel_closed(),
                    }
                }
                _ = Self::sleep_until_opt(restart_at) => {
                    self.handle_restart_elapsed();
                }
            }
        }

        debug!(target: "stt", "session controller exited");
    }

    async fn next_session_event(session: &mut Option<ActiveSession>) -> Option<ProviderEvent> {
        match session.as_mut() {
            Some(s) => s.events.recv().await,
            None => std::future::pending().await,
        }
    }

    async fn sleep_until_opt(deadline: Option<tokio::time::Instant>) {
        match deadline {
            Some(d) => tokio::time::sleep_until(d).await,
            None => std::future::pending().await,
        }
    }

    // ─── Commands ───────────────────────────────────────────────────

    fn handle_start(&mut self) {
        if self.state == ControllerState::Unsupported {
            self.shared.write().last_error = Some(SttError::NotSupported.to_string());
            return;
        }
        // A fresh attempt supersedes any pending restart.
        self.pending_restart = None;
        self.start_session();
    }

    fn handle_stop(&mut self) {
        if self.state == ControllerState::Unsupported {
            return;
        }
        // Flag first: an in-flight ended/error callback must observe it
        // and never race into a restart.
        {
            let mut shared = self.shared.write();
            shared.manual_stop_requested = true;
            shared.listening = false;
            shared.interim_text.clear();
        }
        self.pending_restart = None;
        self.discard_session(true);
        self.transition(ControllerState::Stopped);
    }

    // ─── Provider events ────────────────────────────────────────────

    async fn handle_provider_event(&mut self, event: ProviderEvent) {
        self.metrics.write().last_event_time = Some(std::time::Instant::now());
        match event {
            ProviderEvent::Started => self.handle_started(),
            ProviderEvent::Ended => self.handle_ended(true),
            ProviderEvent::Error { code, message } => self.handle_error(code, message),
            ProviderEvent::Result { segments } => self.handle_result(segments).await,
        }
    }

    fn handle_started(&mut self) {
        if self.state == ControllerState::Listening {
            // Duplicate started notification from a chatty provider.
            return;
        }
        debug!(target: "stt", "recognition session started");
        {
            let mut shared = self.shared.write();
            shared.listening = true;
            shared.last_error = None;
            shared.manual_stop_requested = false;
        }
        self.transition(ControllerState::Listening);
    }

    async fn handle_result(&mut self, segments: Vec<crate::types::Segment>) {
        if !matches!(
            self.state,
            ControllerState::Listening | ControllerState::Starting
        ) {
            debug!(target: "stt", "dropping result batch in state {:?}", self.state);
            return;
        }

        let mut interim = String::new();
        let mut committed = 0u64;
        let mut interims = 0u64;
        let mut dropped = 0u64;

        // Provider-delivered order is preserved: finals are committed in
        // batch order, interim text is the concatenation of the rest.
        for segment in segments {
            if segment.is_final {
                let trimmed = segment.text.trim();
                if trimmed.is_empty() {
                    dropped += 1;
                    continue;
                }
                let entry = TranscriptEntry::commit(
                    trimmed.to_string(),
                    self.config.language.clone(),
                    &self.clock,
                );
                info!(target: "stt", "final: {}", entry.text);
                if self.entry_tx.send(entry).await.is_err() {
                    debug!(target: "stt", "entry channel closed");
                }
                committed += 1;
            } else {
                interim.push_str(&segment.text);
                interims += 1;
            }
        }

        // Replaced wholesale on each batch, including by the empty string
        // when a batch carries only finals.
        self.shared.write().interim_text = interim;

        let mut metrics = self.metrics.write();
        metrics.batches_in += 1;
        metrics.final_count += committed;
        metrics.interim_count += interims;
        metrics.empty_finals_dropped += dropped;
    }

    fn handle_error(&mut self, code: ProviderErrorCode, message: Option<String>) {
        self.metrics.write().error_count += 1;

        match code {
            ProviderErrorCode::NotAllowed => {
                warn!(target: "stt", "microphone permission denied");
                self.pending_restart = None;
                self.discard_session(true);
                {
                    let mut shared = self.shared.write();
                    shared.last_error = Some(SttError::PermissionDenied.to_string());
                    shared.listening = false;
                }
                self.transition(ControllerState::Stopped);
            }
            ProviderErrorCode::Aborted => {
                // Expected side effect of our own stop or forced restart.
                debug!(target: "stt", "recognition aborted");
            }
            code if self.config.restartable_errors.contains(&code) => {
                debug!(
                    target: "stt",
                    "recoverable recognition error: {}", code.as_str()
                );
                if self.shared.read().manual_stop_requested {
                    return;
                }
                if self.state != ControllerState::RestartPending {
                    // A silence timeout leaves the handle unusable:
                    // re-create rather than resume.
                    self.schedule_restart(RestartKind::Recreate);
                }
            }
            code => {
                error!(
                    target: "stt",
                    "recognition error: {} ({})",
                    code.as_str(),
                    message.as_deref().unwrap_or("no detail")
                );
                // Surfaced verbatim; unknown failure classes never
                // auto-restart.
                self.shared.write().last_error = Some(
                    SttError::Provider {
                        code: code.as_str().to_string(),
                        message,
                    }
                    .to_string(),
                );
            }
        }
    }

    /// `reusable` is false when the session's event channel closed
    /// outright, meaning the handle cannot be resumed.
    fn handle_ended(&mut self, reusable: bool) {
        debug!(target: "stt", "recognition session ended");

        if self.shared.read().manual_stop_requested {
            // Normal termination path.
            self.discard_session(false);
            {
                let mut shared = self.shared.write();
                shared.listening = false;
                shared.interim_text.clear();
            }
            self.transition(ControllerState::Stopped);
            return;
        }

        // Spontaneous end: the user has not asked to stop, so recording
        // continuity must be preserved.
        if self.state != ControllerState::RestartPending {
            let kind = if reusable {
                RestartKind::Reuse
            } else {
                RestartKind::Recreate
            };
            self.schedule_restart(kind);
        }
    }

    fn handle_session_channel_closed(&mut self) {
        debug!(target: "stt", "session event channel closed");
        self.discard_session(false);
        if matches!(
            self.state,
            ControllerState::Starting | ControllerState::Listening
        ) {
            self.handle_ended(false);
        }
    }

    // ─── Restart timer ──────────────────────────────────────────────

    fn schedule_restart(&mut self, kind: RestartKind) {
        debug!(
            target: "stt",
            "restart pending ({:?}) in {:?}", kind, self.config.restart_debounce
        );
        self.pending_restart = Some(PendingRestart {
            deadline: tokio::time::Instant::now() + self.config.restart_debounce,
            kind,
        });
        self.transition(ControllerState::RestartPending);
    }

    fn handle_restart_elapsed(&mut self) {
        let Some(pending) = self.pending_restart.take() else {
            return;
        };
        // Checked at the moment the timer fires, not just when it was
        // scheduled: stop() may have raced in between.
        if self.shared.read().manual_stop_requested {
            debug!(target: "stt", "restart suppressed: manual stop requested");
            return;
        }

        self.metrics.write().restart_count += 1;

        if pending.kind == RestartKind::Reuse {
            if let Some(session) = self.session.as_mut() {
                match session.handle.start() {
                    Ok(()) => {
                        debug!(target: "stt", "restarted existing recognition session");
                        self.transition(ControllerState::Starting);
                        return;
                    }
                    Err(e) => {
                        debug!(target: "stt", "could not restart session ({e}); recreating");
                    }
                }
            }
        }
        self.start_session();
    }

    // ─── Session lifecycle ──────────────────────────────────────────

    /// Create and start a fresh provider session bound to the currently
    /// selected language. Any prior handle is discarded first.
    fn start_session(&mut self) {
        self.discard_session(true);

        let locale = language::resolve_speech_locale(&self.config.language);
        let config = RecognizerConfig {
            locale: locale.to_string(),
            ..RecognizerConfig::default()
        };
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let started = self
            .provider
            .create_session(&config, event_tx)
            .and_then(|mut handle| handle.start().map(|_| handle));

        match started {
            Ok(handle) => {
                self.session = Some(ActiveSession {
                    handle,
                    events: event_rx,
                });
                self.transition(ControllerState::Starting);
            }
            Err(e) => {
                error!(target: "stt", "failed to start recognition session: {e}");
                {
                    let mut shared = self.shared.write();
                    shared.last_error = Some(SttError::StartFailed.to_string());
                    shared.listening = false;
                }
                self.transition(ControllerState::Stopped);
            }
        }
    }

    /// Drop the live session. Stopping an already-dead handle is not a
    /// failure; dropping the receiver discards any in-flight events it
    /// still had queued.
    fn discard_session(&mut self, stop_first: bool) {
        if let Some(mut session) = self.session.take() {
            if stop_first {
                session.handle.stop();
            }
        }
    }

    // ─── State machine ──────────────────────────────────────────────

    fn transition(&mut self, next: ControllerState) {
        let valid = is_valid_transition(self.state, next);
        debug_assert!(
            valid,
            "invalid state transition: {:?} -> {:?}",
            self.state, next
        );
        if !valid {
            warn!(
                target: "stt",
                "invalid state transition: {:?} -> {:?}", self.state, next
            );
        }
        debug!(target: "stt", "state transition: {:?} -> {:?}", self.state, next);
        self.state = next;
        *self.fsm_state.write() = next;
    }
}

/// Transition table for the session state machine. `Unsupported` is
/// terminal and unreachable from any other state.
fn is_valid_transition(current: ControllerState, next: ControllerState) -> bool {
    use ControllerState::*;
    matches!(
        (current, next),
        (Idle, Starting)
            | (Idle, Stopped)
            | (Starting, Starting)
            | (Starting, Listening)
            | (Starting, RestartPending)
            | (Starting, Stopped)
            | (Listening, Starting)
            | (Listening, RestartPending)
            | (Listening, Stopped)
            | (RestartPending, Starting)
            | (RestartPending, Stopped)
            | (Stopped, Starting)
            | (Stopped, Stopped)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ControllerState::*;

    #[test]
    fn restart_is_only_reachable_from_an_active_session() {
        assert!(is_valid_transition(Listening, RestartPending));
        assert!(is_valid_transition(Starting, RestartPending));
        assert!(!is_valid_transition(Stopped, RestartPending));
        assert!(!is_valid_transition(Idle, RestartPending));
    }

    #[test]
    fn unsupported_is_terminal() {
        for next in [Idle, Starting, Listening, RestartPending, Stopped] {
            assert!(!is_valid_transition(Unsupported, next));
        }
        for from in [Idle, Starting, Listening, RestartPending, Stopped] {
            assert!(!is_valid_transition(from, Unsupported));
        }
    }

    #[test]
    fn stop_is_reachable_from_every_active_state() {
        for from in [Idle, Starting, Listening, RestartPending, Stopped] {
            assert!(is_valid_transition(from, Stopped), "{from:?} -> Stopped");
        }
    }

    #[test]
    fn default_config_restarts_on_silence_only() {
        let config = ControllerConfig::default();
        assert_eq!(config.restartable_errors, vec![ProviderErrorCode::NoSpeech]);
        assert_eq!(config.restart_debounce, Duration::from_millis(100));
    }
}
