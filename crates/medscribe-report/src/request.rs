//! Outbound report request assembly

use serde::Serialize;

use medscribe_foundation::{language, GenerationError};
use medscribe_stt::TranscriptEntry;

use crate::patient::{PatientDetails, PatientSnapshot, PatientVitals};

/// One outbound generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub transcript: String,
    pub language: String,
    pub patient_details: PatientDetails,
    pub vitals: PatientVitals,
    pub is_child: bool,
    pub is_female: bool,
}

/// Build the request from a transcript-log snapshot. Rejected locally
/// when the log is empty — no network call is made. Patient fields are
/// defaulted to explicit placeholders so the model distinguishes "not
/// provided" from absence.
pub fn assemble_request(
    entries: &[TranscriptEntry],
    snapshot: &PatientSnapshot,
    language_code: &str,
) -> Result<ReportRequest, GenerationError> {
    if entries.is_empty() {
        return Err(GenerationError::EmptyTranscript);
    }

    let transcript = entries
        .iter()
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let d = &snapshot.details;
    let patient_details = PatientDetails {
        name: or_placeholder(&d.name, "Not provided"),
        age: or_placeholder(&d.age, "N/A"),
        gender: or_placeholder(&d.gender, "N/A"),
        address: or_placeholder(&d.address, "N/A"),
        occupation: or_placeholder(&d.occupation, "N/A"),
    };

    Ok(ReportRequest {
        transcript,
        language: language::display_name(language_code),
        patient_details,
        vitals: snapshot.vitals.clone(),
        is_child: snapshot.is_child,
        is_female: snapshot.is_female,
    })
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}
