//! Report renderers
//!
//! Pure functions from `(Report, PatientSnapshot)` to exportable
//! artifacts: a plain-text document, a paginated print document, and a
//! standalone printable HTML page. Deterministic given identical inputs;
//! the generation timestamp is already embedded in the report.

pub mod html;
pub mod pages;
pub mod sections;
pub mod text;

pub use html::render_html;
pub use pages::{render_pages, Page, PrintDocument};
pub use sections::{build_sections, Section};
pub use text::render_text;

/// Product name shown in export headers and footers
pub const BRAND_NAME: &str = "MedScribe";

/// Tagline for export footers
pub const BRAND_TAGLINE: &str = "AI Consultation Assistant";
