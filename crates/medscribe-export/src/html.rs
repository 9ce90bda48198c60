//! Printable HTML export
//!
//! A standalone page suitable for print-to-PDF through the host's print
//! dialog: fixed branding header and footer, the shared section order,
//! and minimal embedded CSS.

use std::fmt::Write;

use medscribe_report::{PatientSnapshot, Report};

use crate::sections::build_sections;
use crate::{BRAND_NAME, BRAND_TAGLINE};

const STYLE: &str = r#"
  body { font-family: Georgia, 'Times New Roman', serif; color: #1f2937; margin: 2rem auto; max-width: 52rem; }
  header { border-bottom: 3px solid #0f766e; padding-bottom: 0.75rem; margin-bottom: 1.5rem; }
  header h1 { color: #0f766e; margin: 0; font-size: 1.6rem; }
  header p { margin: 0.25rem 0 0; color: #6b7280; font-size: 0.9rem; }
  section { margin-bottom: 1.1rem; }
  h2 { font-size: 1rem; color: #0f766e; border-bottom: 1px solid #d1d5db; padding-bottom: 0.2rem; }
  ul { margin: 0.3rem 0; padding-left: 1.4rem; }
  footer { border-top: 3px solid #0f766e; margin-top: 2rem; padding-top: 0.6rem; color: #6b7280; font-size: 0.85rem; }
  @media print { body { margin: 0.5rem; } }
"#;

/// Render the report as a standalone printable HTML document
pub fn render_html(report: &Report, patient: &PatientSnapshot) -> String {
    let mut out = String::new();

    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Prescription Report {id}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <header>\n<h1>{brand} — Prescription Report</h1>\n\
         <p>Generated {generated} · Report ID {id}</p>\n</header>\n",
        id = escape(&report.id),
        brand = BRAND_NAME,
        generated = report.generated_at.format("%d/%m/%Y %H:%M:%S UTC"),
    );

    for section in build_sections(report, patient) {
        let _ = write!(out, "<section>\n<h2>{}</h2>\n", escape(section.title));
        let bullets: Vec<&String> = section
            .lines
            .iter()
            .filter(|l| l.starts_with("• "))
            .collect();
        if bullets.len() == section.lines.len() && !bullets.is_empty() {
            out.push_str("<ul>\n");
            for line in bullets {
                let _ = write!(out, "<li>{}</li>\n", escape(line.trim_start_matches("• ")));
            }
            out.push_str("</ul>\n");
        } else {
            for line in &section.lines {
                let _ = write!(out, "<p>{}</p>\n", escape(line));
            }
        }
        out.push_str("</section>\n");
    }

    let _ = write!(
        out,
        "<footer>{brand} — {tagline}</footer>\n</body>\n</html>\n",
        brand = BRAND_NAME,
        tagline = BRAND_TAGLINE,
    );

    out
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use medscribe_report::{PatientDetails, PatientVitals, ReportBody};

    fn sample() -> (Report, PatientSnapshot) {
        let patient = PatientSnapshot::capture(
            &PatientDetails {
                name: "A <b>bold</b> name & co".to_string(),
                gender: "female".to_string(),
                ..Default::default()
            },
            &PatientVitals::default(),
        );
        let report = Report {
            id: "rx-1".to_string(),
            body: ReportBody {
                advice: vec!["rest".to_string(), "fluids".to_string()],
                ..Default::default()
            }
            .normalize(false, true),
            generated_at: chrono::DateTime::from_timestamp(1_700_000_000, 0)
                .expect("valid timestamp"),
            consultation_transcript: String::new(),
        };
        (report, patient)
    }

    #[test]
    fn html_is_a_standalone_document() {
        let (report, patient) = sample();
        let html = render_html(&report, &patient);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h2>PREGNANCY HISTORY</h2>"));
        assert!(html.contains("<li>rest</li>"));
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn patient_text_is_escaped() {
        let (report, patient) = sample();
        let html = render_html(&report, &patient);
        assert!(html.contains("A &lt;b&gt;bold&lt;/b&gt; name &amp; co"));
        assert!(!html.contains("<b>bold</b>"));
    }
}
