//! AgeLens core: audits static web pages for age-inclusive accessibility and
//! rewrites them with common issues fixed.
//!
//! The pipeline is deliberately simple and one-directional: a fetched page is
//! parsed into the [`dom::Document`] model, read by [`audit`] to produce a
//! scored [`audit::AuditResult`], or mutated by [`remedy`] to produce an
//! age-friendly copy plus an ordered change log. [`crawl`] drives either over
//! a bounded same-domain crawl.

pub mod audit;
pub mod contrast;
pub mod crawl;
pub mod dom;
pub mod readability;
pub mod remedy;
pub mod report;

pub use audit::{audit_document, audit_html, AuditResult, PageChecks, ScoreBreakdown};
pub use contrast::{
    contrast_ratio, find_low_contrast_nodes, parse_color, relative_luminance, ColorValue,
    ContrastFinding,
};
pub use readability::{reading_ease, syllable_count};
pub use remedy::{build_age_friendly_css, transform_html, RemediationConfig};

pub fn print_banner() {
    println!(
        r#"
      _             _
  __ _ __ _ ___| |___ _ _  ___
 / _` / _` / -_) / -_) ' \(_-<
 \__,_\__, \___|_\___|_||_/__/
      |___/
"#
    );
    println!(
        "  AgeLens v{} - age-inclusive web accessibility audits\n",
        env!("CARGO_PKG_VERSION")
    );
}
