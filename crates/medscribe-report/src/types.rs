//! Typed prescription report
//!
//! The wire form is camelCase JSON with every field defaulted, so a
//! reply missing fields still deserializes and list-typed fields are
//! always sequences — renderers never null-check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel for a section that applies to the patient but was absent
/// from the transcript
pub const NOT_DISCUSSED: &str = "Not discussed";

/// Sentinel for a section that does not apply to the patient category
pub const NOT_APPLICABLE: &str = "Not applicable";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientInfoSection {
    pub symptoms: Vec<String>,
    pub medical_history: String,
    pub current_condition: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub instructions: String,
}

/// The model's report payload as it crosses the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportBody {
    pub patient_info: PatientInfoSection,
    pub past_history: String,
    pub drug_history: String,
    pub vaccination_history: String,
    pub children_birth_history: String,
    pub pregnancy_history: String,
    pub family_history: String,
    pub investigations: Vec<String>,
    pub diagnosis: String,
    pub medications: Vec<Medication>,
    pub advice: Vec<String>,
    pub diet_chart: Vec<String>,
    pub follow_up: String,
}

impl ReportBody {
    /// Apply the sentinel contract for the given patient category:
    /// narrative fields that came back empty become "Not discussed", and
    /// category-gated histories are forced to "Not applicable" when the
    /// category does not match. Birth history applies to child patients
    /// only; pregnancy history to adult female patients only.
    pub fn normalize(mut self, is_child: bool, is_female: bool) -> Self {
        fill(&mut self.patient_info.medical_history, NOT_DISCUSSED);
        fill(&mut self.patient_info.current_condition, NOT_DISCUSSED);
        fill(&mut self.past_history, NOT_DISCUSSED);
        fill(&mut self.drug_history, NOT_DISCUSSED);
        fill(&mut self.vaccination_history, NOT_DISCUSSED);
        fill(&mut self.family_history, NOT_DISCUSSED);
        fill(&mut self.diagnosis, "Pending further tests");
        fill(&mut self.follow_up, NOT_DISCUSSED);

        if is_child {
            fill(&mut self.children_birth_history, NOT_DISCUSSED);
        } else {
            self.children_birth_history = NOT_APPLICABLE.to_string();
        }
        if is_female && !is_child {
            fill(&mut self.pregnancy_history, NOT_DISCUSSED);
        } else {
            self.pregnancy_history = NOT_APPLICABLE.to_string();
        }
        self
    }
}

fn fill(field: &mut String, sentinel: &str) {
    if field.trim().is_empty() {
        *field = sentinel.to_string();
    }
}

/// A complete generated prescription report: the parsed body plus
/// locally stamped identity, generation time, and the transcript it was
/// generated from. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    #[serde(flatten)]
    pub body: ReportBody,
    pub generated_at: DateTime<Utc>,
    pub consultation_transcript: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_fills_empty_narratives() {
        let body = ReportBody::default().normalize(false, false);
        assert_eq!(body.past_history, NOT_DISCUSSED);
        assert_eq!(body.drug_history, NOT_DISCUSSED);
        assert_eq!(body.family_history, NOT_DISCUSSED);
        assert_eq!(body.diagnosis, "Pending further tests");
        assert_eq!(body.children_birth_history, NOT_APPLICABLE);
        assert_eq!(body.pregnancy_history, NOT_APPLICABLE);
    }

    #[test]
    fn normalize_keeps_upstream_text() {
        let body = ReportBody {
            past_history: "Hypertension for 3 years".to_string(),
            ..Default::default()
        }
        .normalize(false, true);
        assert_eq!(body.past_history, "Hypertension for 3 years");
        assert_eq!(body.pregnancy_history, NOT_DISCUSSED);
    }

    #[test]
    fn category_gating_is_symmetric() {
        let child = ReportBody {
            children_birth_history: "Full term, normal delivery".to_string(),
            pregnancy_history: "G2P1".to_string(),
            ..Default::default()
        }
        .normalize(true, true);
        assert_eq!(child.children_birth_history, "Full term, normal delivery");
        assert_eq!(child.pregnancy_history, NOT_APPLICABLE);

        let adult_female = ReportBody {
            children_birth_history: "Full term".to_string(),
            pregnancy_history: "G2P1".to_string(),
            ..Default::default()
        }
        .normalize(false, true);
        assert_eq!(adult_female.children_birth_history, NOT_APPLICABLE);
        assert_eq!(adult_female.pregnancy_history, "G2P1");
    }
}
