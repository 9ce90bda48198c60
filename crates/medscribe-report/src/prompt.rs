//! Fixed prompt contract for the report model
//!
//! The model is instructed to always answer in English and in the exact
//! report JSON shape, regardless of the consultation language. This
//! contract is part of the external interface; changing it changes what
//! the parser can rely on.

use crate::request::ReportRequest;

pub const SYSTEM_PROMPT: &str = r#"You are a medical AI assistant that analyzes patient-doctor consultation transcripts and generates detailed prescription reports. You understand multiple Indian languages including English, Hindi, Telugu, Tamil, Kannada, and Marathi.

Your task is to analyze the consultation transcript and extract:
1. Patient symptoms mentioned
2. Any medical history discussed
3. Current condition assessment
4. Past history, drug history, vaccination history, birth history, pregnancy history, and family history where discussed
5. Investigations ordered or recommended
6. Diagnosis (if mentioned or can be reasonably inferred)
7. Medications prescribed with dosage, frequency, and duration
8. Medical advice and diet recommendations given
9. Follow-up recommendations

IMPORTANT: Always respond in English regardless of the input language. Parse the medical information accurately even if the consultation was in a regional language.

Return your response as a valid JSON object with this exact structure:
{
  "patientInfo": {
    "symptoms": ["symptom1", "symptom2"],
    "medicalHistory": "brief medical history or 'Not discussed' if not mentioned",
    "currentCondition": "description of current condition"
  },
  "pastHistory": "past illnesses and surgeries or 'Not discussed'",
  "drugHistory": "current and recent medications or 'Not discussed'",
  "vaccinationHistory": "vaccination status or 'Not discussed'",
  "childrenBirthHistory": "birth history for child patients, otherwise 'Not applicable'",
  "pregnancyHistory": "pregnancy history for adult female patients, otherwise 'Not applicable'",
  "familyHistory": "relevant family history or 'Not discussed'",
  "investigations": ["test or investigation ordered"],
  "diagnosis": "primary diagnosis or 'Pending further tests' if unclear",
  "medications": [
    {
      "name": "medication name",
      "dosage": "e.g., 500mg",
      "frequency": "e.g., twice daily",
      "duration": "e.g., 7 days",
      "instructions": "e.g., take after meals"
    }
  ],
  "advice": ["advice point 1", "advice point 2"],
  "dietChart": ["diet recommendation 1"],
  "followUp": "follow-up recommendation"
}

Use "Not discussed" for any section that applies to the patient but was not mentioned in the transcript. Use "Not applicable" only for sections that do not apply to the patient category: childrenBirthHistory applies only to child patients, pregnancyHistory applies only to adult female patients.

If any information is not clearly mentioned in the transcript, use your medical knowledge to provide reasonable defaults or indicate "Not specified" where appropriate."#;

/// Render the user message for one request. Patient fields arrive
/// already placeholder-defaulted so the model sees an explicit signal
/// for missing context rather than absence.
pub fn user_message(request: &ReportRequest) -> String {
    let d = &request.patient_details;
    let v = &request.vitals;
    let category = match (request.is_child, request.is_female) {
        (true, true) => "child (female)",
        (true, false) => "child (male)",
        (false, true) => "adult female",
        (false, false) => "adult male",
    };

    format!(
        "Consultation Language: {language}\n\n\
         Patient Details:\n\
         - Name: {name}\n\
         - Age: {age}\n\
         - Gender: {gender}\n\
         - Address: {address}\n\
         - Occupation: {occupation}\n\
         - Category: {category}\n\n\
         Vitals:\n\
         - Blood Pressure: {bp}\n\
         - Pulse: {pulse}\n\
         - Temperature: {temp}\n\
         - Weight: {weight}\n\
         - Height: {height}\n\
         - Respiratory Rate: {rr}\n\
         - SpO2: {spo2}\n\n\
         Consultation Transcript:\n{transcript}",
        language = request.language,
        name = d.name,
        age = d.age,
        gender = d.gender,
        address = d.address,
        occupation = d.occupation,
        category = category,
        bp = placeholder(&v.blood_pressure),
        pulse = placeholder(&v.pulse),
        temp = placeholder(&v.temperature),
        weight = placeholder(&v.weight),
        height = placeholder(&v.height),
        rr = placeholder(&v.respiratory_rate),
        spo2 = placeholder(&v.spo2),
        transcript = request.transcript,
    )
}

fn placeholder(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::{PatientDetails, PatientVitals};

    #[test]
    fn system_prompt_pins_the_contract() {
        assert!(SYSTEM_PROMPT.contains("Always respond in English"));
        assert!(SYSTEM_PROMPT.contains("\"childrenBirthHistory\""));
        assert!(SYSTEM_PROMPT.contains("\"dietChart\""));
        assert!(SYSTEM_PROMPT.contains("valid JSON object"));
    }

    #[test]
    fn user_message_carries_transcript_and_context() {
        let request = ReportRequest {
            transcript: "Patient has fever".to_string(),
            language: "Telugu".to_string(),
            patient_details: PatientDetails {
                name: "Ravi".to_string(),
                age: "34".to_string(),
                gender: "male".to_string(),
                address: "N/A".to_string(),
                occupation: "N/A".to_string(),
            },
            vitals: PatientVitals::default(),
            is_child: false,
            is_female: false,
        };
        let message = user_message(&request);
        assert!(message.contains("Consultation Language: Telugu"));
        assert!(message.contains("- Name: Ravi"));
        assert!(message.contains("- Category: adult male"));
        assert!(message.ends_with("Consultation Transcript:\nPatient has fever"));
        // Empty vitals show an explicit placeholder, never a blank.
        assert!(message.contains("- Blood Pressure: N/A"));
    }
}
