//! Patient demographics, vitals, and the immutable pre-generation snapshot

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientDetails {
    pub name: String,
    pub age: String,
    /// One of: `male`, `female`, `child-male`, `child-female` (free-form
    /// values are tolerated and treated as an adult male category)
    pub gender: String,
    pub address: String,
    pub occupation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientVitals {
    pub blood_pressure: String,
    pub pulse: String,
    pub temperature: String,
    pub weight: String,
    pub height: String,
    pub respiratory_rate: String,
    pub spo2: String,
}

/// Immutable copy of the patient form taken at the moment a report is
/// requested. The generation call never observes later edits to the
/// live form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientSnapshot {
    pub details: PatientDetails,
    pub vitals: PatientVitals,
    pub is_child: bool,
    pub is_female: bool,
}

impl PatientSnapshot {
    pub fn capture(details: &PatientDetails, vitals: &PatientVitals) -> Self {
        let is_child = details.gender.contains("child");
        let is_female = details.gender == "female" || details.gender == "child-female";
        Self {
            details: details.clone(),
            vitals: vitals.clone(),
            is_child,
            is_female,
        }
    }
}
