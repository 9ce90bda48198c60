//! Core types for the transcription session

use std::time::Instant;

/// One unit of recognized speech delivered by the provider in a result
/// batch. Interim segments are subject to revision; final segments are
/// committed by the controller.
#[derive(Debug, Clone)]
pub struct Segment {
    pub text: String,
    pub is_final: bool,
    /// Best-guess confidence (0.0-1.0)
    pub confidence: f32,
}

impl Segment {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
            confidence: 0.0,
        }
    }

    pub fn final_with_confidence(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            is_final: true,
            confidence,
        }
    }
}

/// Provider error classification
///
/// Mirrors the error strings recognition engines report: silence
/// timeouts, microphone permission failures, and aborts caused by our
/// own stop/restart calls. Everything else is carried verbatim in
/// `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderErrorCode {
    NoSpeech,
    NotAllowed,
    Aborted,
    Other(String),
}

impl ProviderErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ProviderErrorCode::NoSpeech => "no-speech",
            ProviderErrorCode::NotAllowed => "not-allowed",
            ProviderErrorCode::Aborted => "aborted",
            ProviderErrorCode::Other(code) => code,
        }
    }
}

/// Events emitted by a recognition session
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    /// The session has begun capturing audio
    Started,
    /// The session terminated (spontaneously or after a stop call)
    Ended,
    /// Provider-level error
    Error {
        code: ProviderErrorCode,
        message: Option<String>,
    },
    /// A batch of recognition segments, in provider-delivered order
    Result { segments: Vec<Segment> },
}

/// Configuration handed to the provider when a session is created
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    /// Keep capturing across utterance boundaries
    pub continuous: bool,
    /// Deliver interim (not yet final) segments
    pub interim_results: bool,
    /// Recognition locale tag, e.g. `en-IN`
    pub locale: String,
    /// Alternatives per segment; the controller only consumes the best one
    pub max_alternatives: u32,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            continuous: true,
            interim_results: true,
            locale: medscribe_foundation::FALLBACK_SPEECH_LOCALE.to_string(),
            max_alternatives: 1,
        }
    }
}

/// Session controller state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Starting,
    Listening,
    RestartPending,
    Stopped,
    /// The environment offers no recognition capability. Entered once at
    /// construction and terminal for the controller's lifetime.
    Unsupported,
}

/// Observable state of the active recording attempt, updated
/// synchronously with each controller transition.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub listening: bool,
    pub supported: bool,
    pub last_error: Option<String>,
    pub interim_text: String,
    pub manual_stop_requested: bool,
}

impl SessionState {
    pub fn new(supported: bool) -> Self {
        Self {
            listening: false,
            supported,
            last_error: None,
            interim_text: String::new(),
            manual_stop_requested: false,
        }
    }
}

/// Session controller metrics
#[derive(Debug, Clone, Default)]
pub struct SttMetrics {
    /// Result batches received
    pub batches_in: u64,
    /// Interim segments observed
    pub interim_count: u64,
    /// Committed transcript entries
    pub final_count: u64,
    /// Final segments dropped because their trimmed text was empty
    pub empty_finals_dropped: u64,
    /// Debounced session restarts performed
    pub restart_count: u64,
    /// Provider errors observed (all classes)
    pub error_count: u64,
    /// Time of the last provider event
    pub last_event_time: Option<Instant>,
}
