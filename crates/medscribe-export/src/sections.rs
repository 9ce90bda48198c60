//! Shared section layout for all export formats
//!
//! Every renderer walks the same ordered section list: patient details,
//! vitals, symptoms, medical history, current condition, the history
//! block (birth and pregnancy histories appear only for the matching
//! patient category), investigations, diagnosis, numbered medications,
//! advice, diet chart, follow-up.

use medscribe_report::{PatientSnapshot, Report};

/// One titled block of report content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub lines: Vec<String>,
}

impl Section {
    fn paragraph(title: &'static str, text: &str) -> Self {
        Self {
            title,
            lines: vec![text.to_string()],
        }
    }

    fn bullets(title: &'static str, items: &[String], empty_note: &str) -> Self {
        let lines = if items.is_empty() {
            vec![empty_note.to_string()]
        } else {
            items.iter().map(|i| format!("• {i}")).collect()
        };
        Self { title, lines }
    }
}

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}

/// Build the ordered section list for one report
pub fn build_sections(report: &Report, patient: &PatientSnapshot) -> Vec<Section> {
    let body = &report.body;
    let d = &patient.details;
    let v = &patient.vitals;

    let mut sections = vec![
        Section {
            title: "PATIENT DETAILS",
            lines: vec![
                format!("Name: {}", or_na(&d.name)),
                format!("Age: {}", or_na(&d.age)),
                format!("Gender: {}", or_na(&d.gender)),
                format!("Address: {}", or_na(&d.address)),
                format!("Occupation: {}", or_na(&d.occupation)),
            ],
        },
        Section {
            title: "VITALS",
            lines: vec![
                format!("Blood Pressure: {}", or_na(&v.blood_pressure)),
                format!("Pulse: {}", or_na(&v.pulse)),
                format!("Temperature: {}", or_na(&v.temperature)),
                format!("Weight: {}", or_na(&v.weight)),
                format!("Height: {}", or_na(&v.height)),
                format!("Respiratory Rate: {}", or_na(&v.respiratory_rate)),
                format!("SpO2: {}", or_na(&v.spo2)),
            ],
        },
        Section::bullets(
            "PATIENT SYMPTOMS",
            &body.patient_info.symptoms,
            "None noted",
        ),
        Section::paragraph("MEDICAL HISTORY", &body.patient_info.medical_history),
        Section::paragraph("CURRENT CONDITION", &body.patient_info.current_condition),
        Section::paragraph("PAST HISTORY", &body.past_history),
        Section::paragraph("DRUG HISTORY", &body.drug_history),
        Section::paragraph("VACCINATION HISTORY", &body.vaccination_history),
    ];

    if patient.is_child {
        sections.push(Section::paragraph(
            "BIRTH HISTORY",
            &body.children_birth_history,
        ));
    }
    if patient.is_female && !patient.is_child {
        sections.push(Section::paragraph(
            "PREGNANCY HISTORY",
            &body.pregnancy_history,
        ));
    }

    sections.push(Section::paragraph("FAMILY HISTORY", &body.family_history));
    sections.push(Section::bullets(
        "INVESTIGATIONS",
        &body.investigations,
        "None ordered",
    ));
    sections.push(Section::paragraph("DIAGNOSIS", &body.diagnosis));

    let medication_lines = if body.medications.is_empty() {
        vec!["None prescribed".to_string()]
    } else {
        body.medications
            .iter()
            .enumerate()
            .flat_map(|(i, med)| {
                vec![
                    format!("{}. {}", i + 1, med.name),
                    format!("   Dosage: {}", med.dosage),
                    format!("   Frequency: {}", med.frequency),
                    format!("   Duration: {}", med.duration),
                    format!("   Instructions: {}", med.instructions),
                ]
            })
            .collect()
    };
    sections.push(Section {
        title: "MEDICATIONS",
        lines: medication_lines,
    });

    sections.push(Section::bullets("ADVICE", &body.advice, "None given"));
    sections.push(Section::bullets("DIET CHART", &body.diet_chart, "None given"));
    sections.push(Section::paragraph("FOLLOW-UP", &body.follow_up));

    sections
}
