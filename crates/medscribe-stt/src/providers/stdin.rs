//! Line-oriented demo provider
//!
//! Turns each stdin line into one final recognition segment so the full
//! pipeline can be exercised from a terminal without a microphone. One
//! consultation per process: the session owns stdin while it runs, and
//! once stdin is exhausted the provider refuses further sessions so the
//! controller settles in `Stopped` instead of restart-looping on EOF.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use medscribe_foundation::SttError;

use crate::provider::{RecognizerHandle, SpeechProvider};
use crate::types::{ProviderErrorCode, ProviderEvent, RecognizerConfig, Segment};

#[derive(Debug, Clone, Default)]
pub struct StdinProvider {
    exhausted: Arc<AtomicBool>,
}

impl StdinProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once stdin reached end of file
    pub fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::SeqCst)
    }
}

impl SpeechProvider for StdinProvider {
    fn is_supported(&self) -> bool {
        true
    }

    fn create_session(
        &self,
        config: &RecognizerConfig,
        events: mpsc::Sender<ProviderEvent>,
    ) -> Result<Box<dyn RecognizerHandle>, SttError> {
        if self.is_exhausted() {
            return Err(SttError::StartFailed);
        }
        debug!(target: "stt", "stdin session created (locale: {})", config.locale);
        Ok(Box::new(StdinSession {
            events,
            reader: None,
            exhausted: Arc::clone(&self.exhausted),
        }))
    }
}

struct StdinSession {
    events: mpsc::Sender<ProviderEvent>,
    reader: Option<JoinHandle<()>>,
    exhausted: Arc<AtomicBool>,
}

impl RecognizerHandle for StdinSession {
    fn start(&mut self) -> Result<(), SttError> {
        if self.exhausted.load(Ordering::SeqCst) {
            return Err(SttError::StartFailed);
        }
        if self.reader.is_some() {
            return Ok(());
        }
        let _ = self.events.try_send(ProviderEvent::Started);

        let events = self.events.clone();
        let exhausted = Arc::clone(&self.exhausted);
        self.reader = Some(tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let batch = ProviderEvent::Result {
                            segments: vec![Segment::final_with_confidence(line, 1.0)],
                        };
                        if events.send(batch).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        exhausted.store(true, Ordering::SeqCst);
                        let _ = events.send(ProviderEvent::Ended).await;
                        break;
                    }
                    Err(e) => {
                        let _ = events
                            .send(ProviderEvent::Error {
                                code: ProviderErrorCode::Other("audio-capture".to_string()),
                                message: Some(e.to_string()),
                            })
                            .await;
                        break;
                    }
                }
            }
        }));
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        let _ = self.events.try_send(ProviderEvent::Ended);
    }

    fn abort(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

impl Drop for StdinSession {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}
