// Report generation from audit results

use crate::audit::AuditResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

pub fn generate_text_report(results: &[AuditResult]) -> String {
    let mut report = String::new();

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("                     AGELENS AGE-INCLUSION AUDIT REPORT\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    report.push_str(&format!("Pages audited: {}\n", results.len()));
    if !results.is_empty() {
        report.push_str(&format!("Average score: {}\n", average_score(results)));
    }
    report.push('\n');

    for result in results {
        report.push_str("──────────────────────────────────────────────────────────────────────────────\n");
        report.push_str(&format!("URL:    {}\n", result.url));
        report.push_str(&format!(
            "Score:  {}/100  ({})\n\n",
            result.score,
            score_band(result.score)
        ));

        report.push_str("Breakdown:\n");
        let b = &result.breakdown;
        report.push_str(&format!("  Structure & Nav:         {:>3}\n", b.structure_nav.round() as i64));
        report.push_str(&format!("  Text Readability:        {:>3}\n", b.text_readability.round() as i64));
        report.push_str(&format!("  Visual Alternatives:     {:>3}\n", b.visual_alternatives.round() as i64));
        report.push_str(&format!("  Controls & Forms:        {:>3}\n", b.controls_forms.round() as i64));
        report.push_str(&format!("  Mobile & Zoom:           {:>3}\n", b.mobile_zoom.round() as i64));
        report.push_str(&format!("  Link Clarity:            {:>3}\n", b.link_clarity.round() as i64));
        report.push_str(&format!("  Contact Discoverability: {:>3}\n", b.discoverability.round() as i64));
        report.push('\n');

        let c = &result.checks;
        report.push_str("Key checks:\n");
        report.push_str(&format!("  Skip link: {}   H1: {}   Heading jumps: {}   Landmarks: {}/4\n",
            yes_no(c.has_skip_link), yes_no(c.has_h1), c.heading_jumps, c.landmark_count));
        report.push_str(&format!("  Flesch: {}   Alt coverage: {}%   Viewport: {}   Blocks zoom: {}\n",
            c.reading_ease.round() as i64,
            (c.img_alt_coverage * 100.0).round() as i64,
            yes_no(c.viewport_meta),
            yes_no(c.viewport_blocks_zoom)));
        report.push_str(&format!("  Vague links: {}/{}   External w/o rel=noopener: {}   Low-contrast elements: {}\n",
            c.vague_links, c.total_links, c.external_no_warn, c.low_contrast_count));
        report.push('\n');

        if !result.recommendations.is_empty() {
            report.push_str("Recommendations:\n");
            for recommendation in &result.recommendations {
                report.push_str(&wrap_text(recommendation, 76, "  - "));
            }
            report.push('\n');
        }
    }

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("                               End of Report\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("\nGenerated by AgeLens - age-inclusive web accessibility audits\n\n");

    report
}

pub fn generate_json_report(results: &[AuditResult]) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "AgeLens",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json",
                "standards": "WCAG 2.2 AA + W3C WAI Older Users guidance"
            },
            "summary": {
                "pages_audited": results.len(),
                "average_score": if results.is_empty() { 0 } else { average_score(results) }
            },
            "results": results
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_markdown_report(results: &[AuditResult]) -> String {
    let mut report = String::new();

    report.push_str("# AgeLens Audit Report\n\n");
    report.push_str(&format!("Pages audited: **{}**\n\n", results.len()));

    report.push_str("| URL | Score |\n");
    report.push_str("| --- | ----- |\n");
    for result in results {
        report.push_str(&format!("| {} | {} |\n", result.url, result.score));
    }
    report.push('\n');

    for result in results {
        report.push_str(&format!("## {}\n\n", result.url));
        report.push_str(&format!(
            "Score **{}/100** ({})\n\n",
            result.score,
            score_band(result.score)
        ));

        let b = &result.breakdown;
        report.push_str("| Category | Subscore |\n");
        report.push_str("| -------- | -------- |\n");
        report.push_str(&format!("| Structure & Nav | {} |\n", b.structure_nav.round() as i64));
        report.push_str(&format!("| Text Readability | {} |\n", b.text_readability.round() as i64));
        report.push_str(&format!("| Visual Alternatives | {} |\n", b.visual_alternatives.round() as i64));
        report.push_str(&format!("| Controls & Forms | {} |\n", b.controls_forms.round() as i64));
        report.push_str(&format!("| Mobile & Zoom | {} |\n", b.mobile_zoom.round() as i64));
        report.push_str(&format!("| Link Clarity | {} |\n", b.link_clarity.round() as i64));
        report.push_str(&format!("| Contact Discoverability | {} |\n", b.discoverability.round() as i64));
        report.push('\n');

        if !result.recommendations.is_empty() {
            report.push_str("Recommendations:\n\n");
            for recommendation in &result.recommendations {
                report.push_str(&format!("- {recommendation}\n"));
            }
            report.push('\n');
        }
    }

    report
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

// Helper functions

fn average_score(results: &[AuditResult]) -> i64 {
    let total: i64 = results.iter().map(|r| r.score as i64).sum();
    (total as f64 / results.len() as f64).round() as i64
}

fn score_band(score: u8) -> &'static str {
    match score {
        70..=100 => "strong alignment",
        50..=69 => "partial alignment",
        _ => "major barriers",
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn wrap_text(text: &str, width: usize, prefix: &str) -> String {
    let continuation = " ".repeat(prefix.len());
    let mut result = String::new();
    let mut current_line = String::new();
    let mut first = true;

    for word in text.split_whitespace() {
        if !current_line.is_empty() && current_line.len() + word.len() + 1 > width {
            result.push_str(if first { prefix } else { &continuation });
            result.push_str(&current_line);
            result.push('\n');
            current_line.clear();
            first = false;
        }

        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        result.push_str(if first { prefix } else { &continuation });
        result.push_str(&current_line);
        result.push('\n');
    }

    result
}
