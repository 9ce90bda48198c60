//! Speech-capability boundary and session control for MedScribe
//!
//! This crate provides the core abstractions for continuous consultation
//! transcription: the provider capability traits, the session controller
//! that keeps a recognition session alive across recoverable provider
//! failures, and the append-only transcript log fed by committed
//! segments.

pub mod controller;
pub mod provider;
pub mod providers;
pub mod transcript;
pub mod types;

pub use controller::{ControllerConfig, ControllerHandle, SessionCommand, SessionController};
pub use provider::{RecognizerHandle, SpeechProvider};
pub use transcript::{shared_log, SharedTranscriptLog, TranscriptEntry, TranscriptLog};
pub use types::{
    ControllerState, ProviderErrorCode, ProviderEvent, RecognizerConfig, Segment, SessionState,
    SttMetrics,
};
