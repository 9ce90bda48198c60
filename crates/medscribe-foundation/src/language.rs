//! Consultation language registry
//!
//! Maps a consultation language code to the recognizer locale tag and the
//! display names used in prompts and in the UI. Lookups are total: an
//! unknown code falls back to the `en-IN` locale and echoes the code as
//! its display name.

/// A supported consultation language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
    pub speech_locale: &'static str,
}

/// Locale used when a language code is not in the registry
pub const FALLBACK_SPEECH_LOCALE: &str = "en-IN";

pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language { code: "en", name: "English", native_name: "English", speech_locale: "en-IN" },
    Language { code: "hi", name: "Hindi", native_name: "हिंदी", speech_locale: "hi-IN" },
    Language { code: "te", name: "Telugu", native_name: "తెలుగు", speech_locale: "te-IN" },
    Language { code: "ta", name: "Tamil", native_name: "தமிழ்", speech_locale: "ta-IN" },
    Language { code: "kn", name: "Kannada", native_name: "ಕನ್ನಡ", speech_locale: "kn-IN" },
    Language { code: "mr", name: "Marathi", native_name: "मराठी", speech_locale: "mr-IN" },
];

/// Look up a language by code
pub fn find(code: &str) -> Option<&'static Language> {
    SUPPORTED_LANGUAGES.iter().find(|l| l.code == code)
}

/// Resolve the recognizer locale tag for a language code
pub fn resolve_speech_locale(code: &str) -> &'static str {
    find(code).map(|l| l.speech_locale).unwrap_or(FALLBACK_SPEECH_LOCALE)
}

/// English display name for a language code; unknown codes echo back
pub fn display_name(code: &str) -> String {
    find(code).map(|l| l.name.to_string()).unwrap_or_else(|| code.to_string())
}

/// Native-script display name for a language code; unknown codes echo back
pub fn native_name(code: &str) -> String {
    find(code)
        .map(|l| l.native_name.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// All registered languages, in display order
pub fn all() -> &'static [Language] {
    SUPPORTED_LANGUAGES
}
