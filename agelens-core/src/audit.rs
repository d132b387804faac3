//! Structural and content audit of a single page.
//!
//! Each extraction rule reads the document independently and tolerates
//! absence: a malformed or missing element degrades to a neutral default
//! (zero, false, empty) instead of failing the audit. The weighted score is
//! reproducible for identical input, and recommendations are generated by
//! re-checking the underlying conditions in a fixed order so each message
//! fires at most once.

use crate::contrast::{find_low_contrast_nodes, ContrastFinding};
use crate::dom::{Document, NodeId};
use crate::readability::reading_ease;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use url::Url;

/// Anchor texts that say nothing about the destination.
pub const VAGUE_LINK_PHRASES: &[&str] = &[
    "click here",
    "here",
    "read more",
    "learn more",
    "more",
    "this",
    "link",
];

static CONTACT_KEYWORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(contact|support|help|call us|phone)\b").unwrap());
static TEL_HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^tel:\+?[0-9]").unwrap());
static USER_SCALABLE_NO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)user-scalable\s*=\s*no").unwrap());
static MAXIMUM_SCALE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)maximum-scale\s*=\s*([0-9]+(?:\.[0-9]+)?)").unwrap());

/// The four landmark region kinds a page is expected to expose, matched by
/// tag name or explicit role.
const LANDMARKS: &[(&str, &str)] = &[
    ("main", "main"),
    ("nav", "navigation"),
    ("header", "banner"),
    ("footer", "contentinfo"),
];

/// Weighted category subscores, each clamped to [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub structure_nav: f64,
    pub text_readability: f64,
    pub visual_alternatives: f64,
    pub controls_forms: f64,
    pub mobile_zoom: f64,
    pub link_clarity: f64,
    pub discoverability: f64,
}

/// Raw metrics behind the subscores, kept for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageChecks {
    pub word_count: usize,
    pub reading_ease: f64,
    pub has_h1: bool,
    pub heading_jumps: usize,
    pub has_skip_link: bool,
    pub landmark_count: usize,
    pub img_alt_coverage: f64,
    pub unlabeled_buttons: usize,
    pub unlabeled_inputs: usize,
    pub input_types: HashMap<String, usize>,
    pub missing_email_type: bool,
    pub missing_tel_type: bool,
    pub missing_autocomplete: usize,
    pub viewport_meta: bool,
    pub viewport_blocks_zoom: bool,
    pub total_links: usize,
    pub vague_links: usize,
    pub external_no_warn: usize,
    pub has_tel_link: bool,
    pub has_mailto: bool,
    pub has_contact_word: bool,
    pub low_contrast_count: usize,
    pub low_contrast_examples: Vec<ContrastFinding>,
}

/// Complete audit of one URL. Created fresh per page, immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    pub url: String,
    pub score: u8,
    pub breakdown: ScoreBreakdown,
    pub checks: PageChecks,
    pub recommendations: Vec<String>,
}

/// Lowercase host of a URL, if it has one.
pub fn page_host(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Parse and audit a raw HTML page.
pub fn audit_html(url: &str, html: &str) -> AuditResult {
    let doc = Document::parse(html);
    audit_document(url, &doc)
}

/// Audit an already-parsed document.
pub fn audit_document(url: &str, doc: &Document) -> AuditResult {
    let body_text = doc
        .body()
        .map(|body| doc.normalized_text(body))
        .unwrap_or_default();
    let word_count = body_text.split_whitespace().count();

    // Headings and structure
    let heading_levels: Vec<u32> = doc
        .elements()
        .into_iter()
        .filter_map(|id| heading_level(doc, id))
        .collect();
    let has_h1 = heading_levels.contains(&1);
    let heading_jumps = heading_levels
        .windows(2)
        .filter(|pair| pair[1] > pair[0] + 1)
        .count();

    // Skip link and landmarks
    let links: Vec<NodeId> = doc.elements_by_tag("a");
    let has_skip_link = links.iter().any(|&a| is_skip_link(doc, a));
    let landmark_count = LANDMARKS
        .iter()
        .filter(|(tag, role)| has_landmark(doc, tag, role))
        .count();

    // Readability
    let ease = reading_ease(&body_text);

    // Visual alternatives
    let images = doc.elements_by_tag("img");
    let with_alt = images
        .iter()
        .filter(|&&img| {
            doc.attr(img, "alt")
                .map(|alt| !alt.trim().is_empty())
                .unwrap_or(false)
        })
        .count();
    let img_alt_coverage = if images.is_empty() {
        1.0
    } else {
        with_alt as f64 / images.len() as f64
    };

    // Controls and forms
    let unlabeled_buttons = doc
        .elements()
        .into_iter()
        .filter(|&id| is_button_like(doc, id) && is_unlabeled_control(doc, id))
        .count();

    let label_targets: HashSet<String> = doc
        .elements_by_tag("label")
        .into_iter()
        .filter_map(|label| doc.attr(label, "for"))
        .filter(|target| !target.is_empty())
        .map(|target| target.to_string())
        .collect();
    let form_fields: Vec<NodeId> = doc
        .elements()
        .into_iter()
        .filter(|&id| is_form_field(doc, id))
        .collect();
    let unlabeled_inputs = form_fields
        .iter()
        .filter(|&&id| is_unlabeled_field(doc, id, &label_targets))
        .count();

    // Input hygiene
    let inputs = doc.elements_by_tag("input");
    let mut input_types: HashMap<String, usize> = HashMap::new();
    for &input in &inputs {
        let declared = attr_lower(doc, input, "type");
        *input_types.entry(declared).or_insert(0) += 1;
    }
    let missing_email_type = inputs.iter().any(|&input| {
        attr_lower(doc, input, "type") != "email" && name_id(doc, input).contains("email")
    });
    let missing_tel_type = inputs.iter().any(|&input| {
        let name_id = name_id(doc, input);
        attr_lower(doc, input, "type") != "tel"
            && (name_id.contains("phone") || name_id.contains("tel"))
    });
    let missing_autocomplete = form_fields
        .iter()
        .filter(|&&id| {
            doc.attr(id, "autocomplete")
                .map(|value| value.trim().is_empty())
                .unwrap_or(true)
        })
        .count();

    // Viewport and zoom
    let viewport_content = doc
        .elements_by_tag("meta")
        .into_iter()
        .find(|&meta| {
            doc.attr(meta, "name")
                .map(|name| name.eq_ignore_ascii_case("viewport"))
                .unwrap_or(false)
        })
        .map(|meta| doc.attr(meta, "content").unwrap_or("").to_string());
    let viewport_meta = viewport_content.is_some();
    let viewport_blocks_zoom = viewport_content
        .as_deref()
        .map(blocks_zoom)
        .unwrap_or(false);

    // Link clarity
    let host = page_host(url).unwrap_or_default();
    let mut total_links = 0usize;
    let mut vague_links = 0usize;
    let mut external_no_warn = 0usize;
    for &a in &links {
        let Some(href) = doc.attr(a, "href") else {
            continue;
        };
        let href = href.to_string();
        total_links += 1;

        let label = doc.normalized_text(a).to_lowercase();
        if VAGUE_LINK_PHRASES.contains(&label.as_str()) {
            vague_links += 1;
        }

        if href.starts_with("http") {
            let link_host = page_host(&href).unwrap_or_default();
            if !link_host.is_empty() && link_host != host && !has_safety_rel(doc, a) {
                external_no_warn += 1;
            }
        }
    }

    // Contact discoverability
    let has_tel_link = links.iter().any(|&a| {
        doc.attr(a, "href")
            .map(|href| TEL_HREF.is_match(href))
            .unwrap_or(false)
    });
    let has_mailto = links.iter().any(|&a| {
        doc.attr(a, "href")
            .map(|href| href.to_lowercase().starts_with("mailto:"))
            .unwrap_or(false)
    });
    let has_contact_word = CONTACT_KEYWORDS.is_match(&body_text);

    // Contrast
    let low_contrast = find_low_contrast_nodes(doc);

    // Subscores, all clamped to [0, 100]
    let heading_score = (if has_h1 { 60.0 } else { 0.0 })
        + (40.0 - 10.0 * heading_jumps.min(4) as f64).max(0.0);
    let structure_nav = 0.4 * (if has_skip_link { 100.0 } else { 0.0 })
        + 0.4 * heading_score
        + 0.2 * (100.0 * landmark_count as f64 / 4.0).min(100.0);
    let text_readability = ease.clamp(0.0, 100.0);
    let visual_alternatives = img_alt_coverage * 100.0;
    let controls_forms = (100.0
        - (0.6 * (5.0 * unlabeled_buttons as f64).min(100.0)
            + 0.4 * (5.0 * unlabeled_inputs as f64).min(100.0)))
    .max(0.0);
    let mobile_zoom = 0.6 * (if viewport_meta { 100.0 } else { 0.0 })
        + 0.4 * (if viewport_blocks_zoom { 0.0 } else { 100.0 });
    let link_clarity = if total_links == 0 {
        100.0
    } else {
        (100.0 - 100.0 * vague_links as f64 / total_links as f64).max(0.0)
    };
    let discoverability: f64 = ((if has_tel_link { 35.0f64 } else { 0.0 })
        + (if has_mailto { 25.0 } else { 0.0 })
        + (if has_contact_word { 40.0 } else { 0.0 }))
    .min(100.0);

    let score = (0.18 * structure_nav
        + 0.20 * text_readability
        + 0.15 * visual_alternatives
        + 0.20 * controls_forms
        + 0.12 * mobile_zoom
        + 0.10 * link_clarity
        + 0.05 * discoverability)
        .round()
        .clamp(0.0, 100.0) as u8;

    // Recommendations, fixed rule order, one message per condition
    let mut recommendations = Vec::new();
    if !has_skip_link {
        recommendations.push("Add a visible 'Skip to content' link (WCAG 2.4.1).".to_string());
    }
    if !has_h1 {
        recommendations.push("Add a single, descriptive H1.".to_string());
    }
    if heading_jumps > 0 {
        recommendations.push("Fix heading hierarchy to avoid level jumps.".to_string());
    }
    if landmark_count < 3 {
        recommendations
            .push("Include landmarks: <main>, <nav>, <header>, <footer>.".to_string());
    }
    if img_alt_coverage < 1.0 {
        recommendations.push(format!(
            "Add alt text (~{}% of images missing it) (WCAG 1.1.1).",
            ((1.0 - img_alt_coverage) * 100.0).round() as i64
        ));
    }
    if unlabeled_buttons > 0 {
        recommendations.push(format!(
            "Label buttons and controls ({unlabeled_buttons} unlabeled) (WCAG 4.1.2)."
        ));
    }
    if unlabeled_inputs > 0 {
        recommendations.push(format!(
            "Associate labels with inputs ({unlabeled_inputs} unlabeled) (WCAG 3.3.2)."
        ));
    }
    if !viewport_meta {
        recommendations.push("Add a responsive viewport meta tag (WCAG 1.4.10).".to_string());
    }
    if viewport_blocks_zoom {
        recommendations.push(
            "Allow pinch-zoom (remove user-scalable=no / maximum-scale=1) (WCAG 1.4.4)."
                .to_string(),
        );
    }
    if text_readability < 60.0 {
        recommendations.push(format!(
            "Simplify copy; Flesch score {} (target 60-70).",
            text_readability.round() as i64
        ));
    }
    if vague_links > 0 {
        recommendations.push(format!(
            "Replace vague link text ({vague_links}) with descriptive labels (WCAG 2.4.4)."
        ));
    }
    if !has_tel_link {
        recommendations.push("Expose a tap-to-call link (tel:).".to_string());
    }
    if !has_mailto {
        recommendations.push("Expose a mailto support link or contact form.".to_string());
    }
    if missing_email_type {
        recommendations.push("Use <input type='email'> for email fields.".to_string());
    }
    if missing_tel_type {
        recommendations.push("Use <input type='tel'> for phone fields.".to_string());
    }
    if missing_autocomplete > 0 {
        recommendations
            .push("Add autocomplete hints (name, email, address...).".to_string());
    }
    if external_no_warn > 0 {
        recommendations
            .push("Mark external links with rel=noopener and clear labels.".to_string());
    }
    if !low_contrast.is_empty() {
        recommendations.push(format!(
            "Improve low text/background contrast on {} element(s).",
            low_contrast.len()
        ));
    }

    let low_contrast_count = low_contrast.len();
    let low_contrast_examples = low_contrast.into_iter().take(10).collect();

    AuditResult {
        url: url.to_string(),
        score,
        breakdown: ScoreBreakdown {
            structure_nav,
            text_readability,
            visual_alternatives,
            controls_forms,
            mobile_zoom,
            link_clarity,
            discoverability,
        },
        checks: PageChecks {
            word_count,
            reading_ease: ease,
            has_h1,
            heading_jumps,
            has_skip_link,
            landmark_count,
            img_alt_coverage,
            unlabeled_buttons,
            unlabeled_inputs,
            input_types,
            missing_email_type,
            missing_tel_type,
            missing_autocomplete,
            viewport_meta,
            viewport_blocks_zoom,
            total_links,
            vague_links,
            external_no_warn,
            has_tel_link,
            has_mailto,
            has_contact_word,
            low_contrast_count,
            low_contrast_examples,
        },
        recommendations,
    }
}

/// True when viewport content disables scaling or caps maximum-scale at 1.
pub fn blocks_zoom(viewport_content: &str) -> bool {
    if USER_SCALABLE_NO.is_match(viewport_content) {
        return true;
    }
    MAXIMUM_SCALE
        .captures_iter(viewport_content)
        .any(|caps| caps[1].parse::<f64>().map(|v| v == 1.0).unwrap_or(false))
}

fn heading_level(doc: &Document, id: NodeId) -> Option<u32> {
    match doc.tag(id)? {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn is_skip_link(doc: &Document, a: NodeId) -> bool {
    let href = doc.attr(a, "href").unwrap_or("").to_lowercase();
    if !href.contains('#') {
        return false;
    }
    href.contains("content")
        || href.contains("main")
        || href.contains("skip")
        || doc.normalized_text(a).to_lowercase().contains("skip")
}

fn has_landmark(doc: &Document, tag: &str, role: &str) -> bool {
    doc.elements().into_iter().any(|id| {
        doc.tag(id) == Some(tag) || attr_lower(doc, id, "role").trim() == role
    })
}

pub(crate) fn is_button_like(doc: &Document, id: NodeId) -> bool {
    doc.tag(id) == Some("button") || attr_lower(doc, id, "role").trim() == "button"
}

pub(crate) fn is_unlabeled_control(doc: &Document, id: NodeId) -> bool {
    doc.normalized_text(id).is_empty()
        && doc
            .attr(id, "aria-label")
            .map(|label| label.trim().is_empty())
            .unwrap_or(true)
}

fn is_form_field(doc: &Document, id: NodeId) -> bool {
    matches!(doc.tag(id), Some("input") | Some("select") | Some("textarea"))
}

fn is_unlabeled_field(doc: &Document, id: NodeId, label_targets: &HashSet<String>) -> bool {
    if attr_lower(doc, id, "type") == "hidden" {
        return false;
    }

    let has_aria = [doc.attr(id, "aria-label"), doc.attr(id, "aria-labelledby")]
        .into_iter()
        .flatten()
        .any(|value| !value.trim().is_empty());
    let has_for = doc
        .attr(id, "id")
        .map(|field_id| !field_id.is_empty() && label_targets.contains(field_id))
        .unwrap_or(false);
    let wrapped = doc.has_ancestor_tag(id, "label");

    !(has_for || wrapped || has_aria)
}

fn has_safety_rel(doc: &Document, a: NodeId) -> bool {
    doc.attr(a, "rel")
        .map(|rel| {
            rel.split_whitespace()
                .any(|token| token == "noopener" || token == "noreferrer")
        })
        .unwrap_or(false)
}

fn attr_lower(doc: &Document, id: NodeId, name: &str) -> String {
    doc.attr(id, name).unwrap_or("").to_lowercase()
}

fn name_id(doc: &Document, id: NodeId) -> String {
    format!(
        "{}{}",
        doc.attr(id, "name").unwrap_or(""),
        doc.attr(id, "id").unwrap_or("")
    )
    .to_lowercase()
}
