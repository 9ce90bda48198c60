//! Paginated print document
//!
//! Wraps section content to a fixed column width and chunks it into
//! pages, each carrying the branding header and a numbered footer. The
//! page model is renderer-agnostic; print drivers consume it line by
//! line.

use medscribe_report::{PatientSnapshot, Report};

use crate::sections::build_sections;
use crate::{BRAND_NAME, BRAND_TAGLINE};

/// Printable column width
const PAGE_WIDTH: usize = 78;

/// Body lines per page, excluding header and footer
const BODY_LINES_PER_PAGE: usize = 52;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub header: Vec<String>,
    pub body: Vec<String>,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintDocument {
    pub pages: Vec<Page>,
}

impl PrintDocument {
    /// Flatten the document back to plain lines, page by page
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for page in &self.pages {
            lines.extend(page.header.iter().cloned());
            lines.extend(page.body.iter().cloned());
            lines.push(page.footer.clone());
        }
        lines
    }
}

/// Render the report as a paginated print document
pub fn render_pages(report: &Report, patient: &PatientSnapshot) -> PrintDocument {
    let mut body_lines: Vec<String> = Vec::new();
    body_lines.push(format!(
        "Generated: {}    Report ID: {}",
        report.generated_at.format("%d/%m/%Y %H:%M:%S UTC"),
        report.id
    ));
    body_lines.push(String::new());

    for section in build_sections(report, patient) {
        body_lines.push(format!("── {} ──", section.title));
        for line in &section.lines {
            body_lines.extend(wrap(line, PAGE_WIDTH));
        }
        body_lines.push(String::new());
    }

    let chunks: Vec<&[String]> = body_lines.chunks(BODY_LINES_PER_PAGE).collect();
    let total = chunks.len().max(1);

    let pages = if chunks.is_empty() {
        vec![make_page(1, total, Vec::new())]
    } else {
        chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| make_page(i + 1, total, chunk.to_vec()))
            .collect()
    };

    PrintDocument { pages }
}

fn make_page(number: usize, total: usize, body: Vec<String>) -> Page {
    Page {
        number,
        header: vec![
            format!("{BRAND_NAME} — Prescription Report"),
            "─".repeat(PAGE_WIDTH),
        ],
        body,
        footer: format!("{BRAND_TAGLINE} · Page {number} of {total}"),
    }
}

/// Greedy whitespace wrap. Words longer than the width are emitted on
/// their own line rather than split.
fn wrap(line: &str, width: usize) -> Vec<String> {
    if line.chars().count() <= width {
        return vec![line.to_string()];
    }

    let mut wrapped = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            wrapped.push(current);
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        wrapped.push(current);
    }
    if wrapped.is_empty() {
        wrapped.push(String::new());
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use medscribe_report::{PatientDetails, PatientVitals, ReportBody};

    fn sample(advice_items: usize) -> (Report, PatientSnapshot) {
        let patient = PatientSnapshot::capture(
            &PatientDetails::default(),
            &PatientVitals::default(),
        );
        let report = Report {
            id: "rx-1".to_string(),
            body: ReportBody {
                advice: (0..advice_items)
                    .map(|i| format!("advice item number {i}"))
                    .collect(),
                ..Default::default()
            }
            .normalize(false, false),
            generated_at: chrono::DateTime::from_timestamp(1_700_000_000, 0)
                .expect("valid timestamp"),
            consultation_transcript: String::new(),
        };
        (report, patient)
    }

    #[test]
    fn wrap_respects_width() {
        let long = "a consultation narrative that goes on for quite a while and certainly \
                    exceeds the printable column width of the page model";
        for line in wrap(long, 40) {
            assert!(line.chars().count() <= 40, "line too wide: {line}");
        }
    }

    #[test]
    fn wrap_keeps_short_lines_intact() {
        assert_eq!(wrap("short line", 78), vec!["short line".to_string()]);
        assert_eq!(wrap("", 78), vec![String::new()]);
    }

    #[test]
    fn every_page_has_header_and_numbered_footer() {
        let (report, patient) = sample(100);
        let doc = render_pages(&report, &patient);
        assert!(doc.pages.len() > 1, "expected multi-page document");
        let total = doc.pages.len();
        for (i, page) in doc.pages.iter().enumerate() {
            assert_eq!(page.number, i + 1);
            assert!(page.header[0].contains(BRAND_NAME));
            assert_eq!(page.footer, format!("{BRAND_TAGLINE} · Page {} of {total}", i + 1));
            assert!(page.body.len() <= BODY_LINES_PER_PAGE);
        }
    }

    #[test]
    fn pagination_is_deterministic() {
        let (report, patient) = sample(40);
        assert_eq!(render_pages(&report, &patient), render_pages(&report, &patient));
    }
}
