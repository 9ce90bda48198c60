//! Capability-absent probe result

use tokio::sync::mpsc;

use medscribe_foundation::SttError;

use crate::provider::{RecognizerHandle, SpeechProvider};
use crate::types::{ProviderEvent, RecognizerConfig};

/// A provider for environments with no recognition capability. The
/// controller probes it once and parks in `Unsupported` for its
/// lifetime.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedProvider;

impl UnsupportedProvider {
    pub fn new() -> Self {
        Self
    }
}

impl SpeechProvider for UnsupportedProvider {
    fn is_supported(&self) -> bool {
        false
    }

    fn create_session(
        &self,
        _config: &RecognizerConfig,
        _events: mpsc::Sender<ProviderEvent>,
    ) -> Result<Box<dyn RecognizerHandle>, SttError> {
        Err(SttError::NotSupported)
    }
}
