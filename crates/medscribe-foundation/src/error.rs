use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribeError {
    #[error("Speech recognition error: {0}")]
    Stt(#[from] SttError),

    #[error("Report generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fatal error, cannot recover: {0}")]
    Fatal(String),
}

#[derive(Error, Debug)]
pub enum SttError {
    #[error("Speech recognition is not supported in this environment")]
    NotSupported,

    #[error("Microphone access denied. Please allow microphone access.")]
    PermissionDenied,

    #[error("Failed to start speech recognition")]
    StartFailed,

    #[error("Recognition error: {code}")]
    Provider { code: String, message: Option<String> },
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("No transcription available. Please record a consultation first.")]
    EmptyTranscript,

    #[error("A report generation is already in progress")]
    InFlight,

    #[error("No report credits remaining. Please contact your administrator.")]
    CreditsExhausted,

    #[error("Rate limit exceeded. Please try again in a moment.")]
    RateLimited,

    #[error("AI service quota exceeded. Please contact support.")]
    QuotaExceeded,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to generate prescription: {0}")]
    Upstream(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {setting}: {value}")]
    Invalid { setting: &'static str, value: String },
}

impl GenerationError {
    /// Whether the user can reasonably retry the same request without
    /// changing anything else first.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::RateLimited | GenerationError::Transport(_) | GenerationError::InFlight
        )
    }
}
