//! Plain-text export

use medscribe_report::{PatientSnapshot, Report};

use crate::sections::build_sections;
use crate::{BRAND_NAME, BRAND_TAGLINE};

const RULE: &str = "═══════════════════════════════════════";

/// Render the report as a shareable plain-text document with fixed
/// section markers.
pub fn render_text(report: &Report, patient: &PatientSnapshot) -> String {
    let mut lines: Vec<String> = vec![
        RULE.to_string(),
        "         PRESCRIPTION REPORT".to_string(),
        format!("              {BRAND_NAME}"),
        RULE.to_string(),
        String::new(),
        format!(
            "Generated: {}",
            report.generated_at.format("%d/%m/%Y %H:%M:%S UTC")
        ),
        format!("Report ID: {}", report.id),
        String::new(),
    ];

    for section in build_sections(report, patient) {
        lines.push(format!("── {} ──", section.title));
        lines.extend(section.lines);
        lines.push(String::new());
    }

    lines.push(RULE.to_string());
    lines.push(format!("{BRAND_NAME} — {BRAND_TAGLINE}"));
    lines.push(RULE.to_string());

    lines.join("\n")
}
