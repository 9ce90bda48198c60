//! Model reply parsing
//!
//! The payload may arrive wrapped in a fenced code block; fencing is
//! stripped before parsing. Parsing never fails outward: a malformed
//! reply is replaced by a deterministic fallback body so the report
//! invariant (list fields always present) holds for every outcome.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::types::{PatientInfoSection, ReportBody};

/// Service-style replies wrap the body in a `prescription` envelope
#[derive(Deserialize)]
struct PrescriptionEnvelope {
    prescription: ReportBody,
}

/// Outcome of parsing a model reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReport {
    /// The reply deserialized into the expected shape
    Parsed(ReportBody),
    /// The reply was malformed; a deterministic substitute is carried
    Fallback(ReportBody),
}

impl ParsedReport {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ParsedReport::Fallback(_))
    }

    pub fn into_body(self) -> ReportBody {
        match self {
            ParsedReport::Parsed(body) | ParsedReport::Fallback(body) => body,
        }
    }
}

/// Parse a raw model reply into a report body. Total: malformed input
/// yields `Fallback`, never an error.
pub fn parse_report_payload(content: &str) -> ParsedReport {
    let stripped = strip_code_fence(content).trim();
    // The envelope must be tried first: a bare-body parse would accept
    // an enveloped payload too and yield an all-default body.
    if let Ok(envelope) = serde_json::from_str::<PrescriptionEnvelope>(stripped) {
        return ParsedReport::Parsed(envelope.prescription);
    }
    match serde_json::from_str::<ReportBody>(stripped) {
        Ok(body) => ParsedReport::Parsed(body),
        Err(e) => {
            warn!(target: "report", "failed to parse model reply as JSON: {e}");
            ParsedReport::Fallback(fallback_body())
        }
    }
}

/// Locate and unwrap a ```json fenced block, if present
fn strip_code_fence(content: &str) -> &str {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("static fence pattern")
    });
    fence
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(content)
}

/// The substitute report used when the model reply cannot be parsed.
/// Narrative fields say the analysis failed, list fields stay empty, and
/// the advice explicitly recommends professional review.
fn fallback_body() -> ReportBody {
    ReportBody {
        patient_info: PatientInfoSection {
            symptoms: Vec::new(),
            medical_history: "Not available".to_string(),
            current_condition: "Please review the original transcript".to_string(),
        },
        diagnosis: "Consultation analysis incomplete".to_string(),
        advice: vec![
            "Please consult with a healthcare professional for accurate diagnosis".to_string(),
        ],
        follow_up: "Schedule a follow-up appointment".to_string(),
        ..Default::default()
    }
}
