//! Scripted speech provider for testing the session controller
//!
//! Tests drive the provider by injecting events into the live session's
//! channel and asserting on call counters afterwards.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use medscribe_foundation::SttError;

use crate::provider::{RecognizerHandle, SpeechProvider};
use crate::types::{ProviderEvent, RecognizerConfig};

/// Configuration for the scripted provider
#[derive(Debug, Clone)]
pub struct MockProviderConfig {
    /// Capability probe answer
    pub supported: bool,
    /// Emit `Started` automatically on each successful `start()` call
    pub auto_started: bool,
    /// Fail this many `start()` calls before succeeding
    pub fail_starts: usize,
}

impl Default for MockProviderConfig {
    fn default() -> Self {
        Self {
            supported: true,
            auto_started: true,
            fail_starts: 0,
        }
    }
}

#[derive(Default)]
struct MockCounters {
    sessions_created: AtomicUsize,
    starts: AtomicUsize,
    stops: AtomicUsize,
    aborts: AtomicUsize,
    live_handles: AtomicUsize,
    remaining_start_failures: AtomicUsize,
}

/// Scripted provider. Cheap to clone; all clones share counters and the
/// current session channel.
#[derive(Clone)]
pub struct MockProvider {
    config: MockProviderConfig,
    counters: Arc<MockCounters>,
    current_tx: Arc<Mutex<Option<mpsc::Sender<ProviderEvent>>>>,
    last_locale: Arc<Mutex<Option<String>>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(MockProviderConfig::default())
    }
}

impl MockProvider {
    pub fn new(config: MockProviderConfig) -> Self {
        let counters = MockCounters {
            remaining_start_failures: AtomicUsize::new(config.fail_starts),
            ..Default::default()
        };
        Self {
            config,
            counters: Arc::new(counters),
            current_tx: Arc::new(Mutex::new(None)),
            last_locale: Arc::new(Mutex::new(None)),
        }
    }

    pub fn unsupported() -> Self {
        Self::new(MockProviderConfig {
            supported: false,
            ..Default::default()
        })
    }

    /// Inject a provider event into the current live session. Returns
    /// false if no session is live or the controller already discarded
    /// its receiver.
    pub async fn emit(&self, event: ProviderEvent) -> bool {
        let tx = self.current_tx.lock().clone();
        match tx {
            Some(tx) => tx.send(event).await.is_ok(),
            None => false,
        }
    }

    pub fn sessions_created(&self) -> usize {
        self.counters.sessions_created.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.counters.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.counters.stops.load(Ordering::SeqCst)
    }

    pub fn aborts(&self) -> usize {
        self.counters.aborts.load(Ordering::SeqCst)
    }

    /// Number of handles created and not yet dropped
    pub fn live_handles(&self) -> usize {
        self.counters.live_handles.load(Ordering::SeqCst)
    }

    /// Locale the most recent session was configured with
    pub fn last_locale(&self) -> Option<String> {
        self.last_locale.lock().clone()
    }
}

impl SpeechProvider for MockProvider {
    fn is_supported(&self) -> bool {
        self.config.supported
    }

    fn create_session(
        &self,
        config: &RecognizerConfig,
        events: mpsc::Sender<ProviderEvent>,
    ) -> Result<Box<dyn RecognizerHandle>, SttError> {
        if !self.config.supported {
            return Err(SttError::NotSupported);
        }
        self.counters.sessions_created.fetch_add(1, Ordering::SeqCst);
        self.counters.live_handles.fetch_add(1, Ordering::SeqCst);
        *self.last_locale.lock() = Some(config.locale.clone());
        *self.current_tx.lock() = Some(events.clone());

        Ok(Box::new(MockSession {
            auto_started: self.config.auto_started,
            counters: Arc::clone(&self.counters),
            events,
        }))
    }
}

struct MockSession {
    auto_started: bool,
    counters: Arc<MockCounters>,
    events: mpsc::Sender<ProviderEvent>,
}

impl RecognizerHandle for MockSession {
    fn start(&mut self) -> Result<(), SttError> {
        let failures = &self.counters.remaining_start_failures;
        if failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(SttError::StartFailed);
        }
        self.counters.starts.fetch_add(1, Ordering::SeqCst);
        if self.auto_started {
            let _ = self.events.try_send(ProviderEvent::Started);
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.counters.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn abort(&mut self) {
        self.counters.aborts.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.counters.live_handles.fetch_sub(1, Ordering::SeqCst);
    }
}
