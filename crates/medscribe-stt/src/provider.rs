//! Speech provider capability boundary
//!
//! The controller never talks to a concrete recognition engine. It talks
//! to a [`SpeechProvider`], probed once at construction for capability,
//! which hands out [`RecognizerHandle`]s bound to an event channel. The
//! handle surface deliberately mirrors what continuous-recognition
//! engines expose: start, best-effort stop, abort.

use tokio::sync::mpsc;

use medscribe_foundation::SttError;

use crate::types::{ProviderEvent, RecognizerConfig};

/// Environment capability for speech recognition
pub trait SpeechProvider: Send + Sync {
    /// Capability probe. Checked once when a controller is constructed;
    /// a `false` answer routes the controller to `Unsupported`
    /// permanently.
    fn is_supported(&self) -> bool;

    /// Create a recognition session configured per `config`. Events are
    /// delivered on `events`; the session must emit `Started` after a
    /// successful `start()` call and `Ended` when it terminates.
    fn create_session(
        &self,
        config: &RecognizerConfig,
        events: mpsc::Sender<ProviderEvent>,
    ) -> Result<Box<dyn RecognizerHandle>, SttError>;
}

/// Handle to one live recognition session
pub trait RecognizerHandle: Send {
    /// Begin (or resume) capturing. May fail if the underlying session
    /// is no longer usable, in which case the controller re-creates it.
    fn start(&mut self) -> Result<(), SttError>;

    /// Best-effort stop. Stopping an already-dead session is not a
    /// failure, so this is infallible by contract.
    fn stop(&mut self);

    /// Abort immediately, discarding any in-flight results.
    fn abort(&mut self);
}
