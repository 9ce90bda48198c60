//! Command-line configuration

use std::path::PathBuf;

use clap::Parser;

use medscribe_foundation::{language, ConfigError};
use medscribe_report::{PatientDetails, PatientVitals};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "medscribe",
    about = "Record a consultation, transcribe it, and generate a prescription report"
)]
pub struct Cli {
    /// Consultation language code (en, hi, te, ta, kn, mr)
    #[arg(long, default_value = "en")]
    pub language: String,

    /// Chat-completions endpoint for report generation
    #[arg(long, env = "MEDSCRIBE_ENDPOINT")]
    pub endpoint: String,

    /// Bearer token for the report backend
    #[arg(long, env = "MEDSCRIBE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Model identifier sent to the backend
    #[arg(long, default_value = "google/gemini-3-flash-preview")]
    pub model: String,

    /// Directory export artifacts are written to
    #[arg(long, default_value = "reports")]
    pub out_dir: PathBuf,

    /// Report credits available to this session
    #[arg(long, default_value_t = 10)]
    pub credits: u32,

    /// Patient name
    #[arg(long, default_value = "")]
    pub patient_name: String,

    /// Patient age
    #[arg(long, default_value = "")]
    pub patient_age: String,

    /// Patient gender: male, female, child-male, child-female
    #[arg(long, default_value = "")]
    pub patient_gender: String,

    /// Patient address
    #[arg(long, default_value = "")]
    pub patient_address: String,

    /// Patient occupation
    #[arg(long, default_value = "")]
    pub patient_occupation: String,
}

impl Cli {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if language::find(&self.language).is_none() {
            return Err(ConfigError::Invalid {
                setting: "language",
                value: self.language.clone(),
            });
        }
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Missing("endpoint"));
        }
        Ok(())
    }

    pub fn patient_details(&self) -> PatientDetails {
        PatientDetails {
            name: self.patient_name.clone(),
            age: self.patient_age.clone(),
            gender: self.patient_gender.clone(),
            address: self.patient_address.clone(),
            occupation: self.patient_occupation.clone(),
        }
    }

    pub fn patient_vitals(&self) -> PatientVitals {
        // Vitals entry is a form concern; the console session sends
        // explicit placeholders instead.
        PatientVitals::default()
    }
}
