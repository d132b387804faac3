//! Rule-based remediation of common age-inclusion issues.
//!
//! The transformer runs a fixed, ordered list of rules over the document.
//! Every rule is an independent precondition/effect pair that appends a
//! human-readable entry to the change log for each mutation it performs.
//! Rules 1-6 are idempotent: once their precondition is satisfied, a second
//! run produces no further mutations and no further log entries. Rule 7
//! (stylesheet injection) appends a new style block on every run; the block
//! carries a stable id so callers can detect duplicates, but the transformer
//! itself does not de-duplicate.

use crate::audit::{
    is_button_like, is_unlabeled_control, page_host, VAGUE_LINK_PHRASES,
};
use crate::dom::Document;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_FONT_STACK: &str =
    "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif";

const DEFAULT_TEXT_SCALE: f32 = 1.25;
const TEXT_SCALE_RANGE: std::ops::RangeInclusive<f32> = 1.0..=1.6;

/// Inline style that keeps the skip link out of view until focused.
const VISUALLY_HIDDEN: &str =
    "position:absolute;left:-9999px;top:auto;width:1px;height:1px;overflow:hidden;";

/// Stable id on the injected stylesheet, so repeated runs are detectable.
pub const INJECTED_STYLE_ID: &str = "agelens-css";

static USER_SCALABLE_NO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)user-scalable\s*=\s*no").unwrap());
static MAXIMUM_SCALE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)maximum-scale\s*=\s*([0-9]+(?:\.[0-9]+)?)").unwrap());

/// Name/id keyword to autocomplete hint, checked in order.
const AUTOCOMPLETE_HINTS: &[(&[&str], &str)] = &[
    (&["email"], "email"),
    (&["first", "name"], "given-name"),
    (&["last", "name"], "family-name"),
    (&["phone"], "tel"),
    (&["tel"], "tel"),
];

/// Tunables for the rewritten page. Every field has a safe default and
/// invalid values fall back to it rather than failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemediationConfig {
    pub text_scale: f32,
    pub underline_links: bool,
    pub min_touch_targets: bool,
    pub focus_outline: bool,
    pub reduced_motion: bool,
    pub font_stack: String,
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            text_scale: DEFAULT_TEXT_SCALE,
            underline_links: true,
            min_touch_targets: true,
            focus_outline: true,
            reduced_motion: true,
            font_stack: DEFAULT_FONT_STACK.to_string(),
        }
    }
}

impl RemediationConfig {
    /// Copy of the config with out-of-range or invalid values replaced by
    /// their defaults.
    pub fn normalized(&self) -> Self {
        let mut cfg = self.clone();
        if !cfg.text_scale.is_finite() || !TEXT_SCALE_RANGE.contains(&cfg.text_scale) {
            cfg.text_scale = DEFAULT_TEXT_SCALE;
        }
        if cfg.font_stack.trim().is_empty() {
            cfg.font_stack = DEFAULT_FONT_STACK.to_string();
        }
        cfg
    }
}

/// Generate the age-friendly stylesheet for a configuration.
///
/// Pure and deterministic: the same config always yields the same CSS.
pub fn build_age_friendly_css(config: &RemediationConfig) -> String {
    let cfg = config.normalized();

    let mut rules = vec![
        format!("html {{ font-size: calc(16px * {}); }}", cfg.text_scale),
        format!(
            "body {{ line-height: 1.6; font-family: {}; max-width: 90ch; margin-inline: auto; padding: 1rem; }}",
            cfg.font_stack
        ),
        "p { margin: 0.75em 0; }".to_string(),
    ];

    if cfg.underline_links {
        rules.push("a { text-decoration: underline; text-underline-offset: 2px; }".to_string());
        rules.push("a:visited { opacity: 0.9; }".to_string());
    }
    if cfg.min_touch_targets {
        rules.push(
            "button, a, input, select, textarea { min-height: 44px; min-width: 44px; }"
                .to_string(),
        );
        rules.push("button, input, select, textarea { font-size: 1em; }".to_string());
    }
    if cfg.focus_outline {
        rules.push(
            "*:focus { outline: 3px solid #1a73e8 !important; outline-offset: 2px; }".to_string(),
        );
    }
    if cfg.reduced_motion {
        rules.push(
            "@media (prefers-reduced-motion: reduce) { * { animation: none !important; transition: none !important; scroll-behavior: auto !important; } }"
                .to_string(),
        );
    }

    rules.join("\n")
}

struct RuleContext<'a> {
    base_host: String,
    css: Option<&'a str>,
}

type RemedyRule = fn(&mut Document, &RuleContext, &mut Vec<String>);

/// Rewrite a page in place and return the serialized result plus the ordered
/// change log. The rules run in a fixed order; each appends one log entry
/// per mutation it actually performs.
pub fn transform_html(
    html: &str,
    base_url: &str,
    style_css: Option<&str>,
) -> (String, Vec<String>) {
    let mut doc = Document::parse(html);
    let changes = apply_remediations(&mut doc, base_url, style_css);
    (doc.html(), changes)
}

/// Run the remediation rules against an already-parsed document.
pub fn apply_remediations(
    doc: &mut Document,
    base_url: &str,
    style_css: Option<&str>,
) -> Vec<String> {
    let ctx = RuleContext {
        base_host: page_host(base_url).unwrap_or_default(),
        css: style_css,
    };

    let rules: [RemedyRule; 7] = [
        ensure_skip_link,
        normalize_viewport,
        ensure_landmarks,
        label_unlabeled_controls,
        fix_input_purpose,
        harden_links,
        inject_stylesheet,
    ];

    let mut changes = Vec::new();
    for rule in rules {
        rule(doc, &ctx, &mut changes);
    }
    changes
}

/// Rule 1: insert a visually-hidden skip link as the first body element,
/// pointing at an existing or newly-created main container.
fn ensure_skip_link(doc: &mut Document, _ctx: &RuleContext, changes: &mut Vec<String>) {
    let already_present = doc.elements_by_tag("a").into_iter().any(|a| {
        let href = doc.attr(a, "href").unwrap_or("").to_lowercase();
        (href.starts_with('#') && (href.contains("main") || href.contains("content")))
            || href.contains("skip")
    });
    if already_present {
        return;
    }
    let Some(body) = doc.body() else {
        return;
    };

    let (main, created) = match doc.first_by_tag("main") {
        Some(main) => (main, false),
        None => (doc.create_element("main"), true),
    };
    let needs_id = doc
        .attr(main, "id")
        .map(|id| id.trim().is_empty())
        .unwrap_or(true);
    if needs_id {
        doc.set_attr(main, "id", "main");
    }
    let target = doc.attr(main, "id").unwrap_or("main").to_string();
    if created {
        doc.prepend_child(body, main);
    }

    let skip = doc.create_element("a");
    doc.set_attr(skip, "href", &format!("#{target}"));
    doc.set_attr(skip, "style", VISUALLY_HIDDEN);
    let label = doc.create_text("Skip to content");
    doc.append_child(skip, label);
    doc.prepend_child(body, skip);

    changes.push("Added 'Skip to content' link and main landmark.".to_string());
}

/// Rule 2: add a responsive viewport meta if missing, otherwise rewrite any
/// zoom-blocking directives in place. Logs only when content changes.
fn normalize_viewport(doc: &mut Document, _ctx: &RuleContext, changes: &mut Vec<String>) {
    let viewport = doc.elements_by_tag("meta").into_iter().find(|&meta| {
        doc.attr(meta, "name")
            .map(|name| name.eq_ignore_ascii_case("viewport"))
            .unwrap_or(false)
    });

    match viewport {
        None => {
            let Some(head) = doc.head() else {
                return;
            };
            let meta = doc.create_element("meta");
            doc.set_attr(meta, "name", "viewport");
            doc.set_attr(meta, "content", "width=device-width, initial-scale=1");
            doc.append_child(head, meta);
            changes.push("Added responsive viewport meta.".to_string());
        }
        Some(meta) => {
            let content = doc.attr(meta, "content").unwrap_or("").to_string();
            let rewritten = USER_SCALABLE_NO.replace_all(&content, "user-scalable=yes");
            let rewritten = MAXIMUM_SCALE
                .replace_all(&rewritten, |caps: &regex::Captures| {
                    let capped = caps[1].parse::<f64>().map(|v| v == 1.0).unwrap_or(false);
                    if capped {
                        "maximum-scale=5".to_string()
                    } else {
                        caps[0].to_string()
                    }
                })
                .to_string();
            if rewritten != content {
                doc.set_attr(meta, "content", &rewritten);
                changes.push("Enabled pinch-zoom in viewport meta.".to_string());
            }
        }
    }
}

/// Rule 3: append an empty placeholder for each missing landmark kind.
fn ensure_landmarks(doc: &mut Document, _ctx: &RuleContext, changes: &mut Vec<String>) {
    for (tag, role) in [("header", "banner"), ("nav", "navigation"), ("footer", "contentinfo")] {
        let present = doc.elements().into_iter().any(|id| {
            doc.tag(id) == Some(tag)
                || doc
                    .attr(id, "role")
                    .map(|r| r.trim().to_lowercase() == role)
                    .unwrap_or(false)
        });
        if present {
            continue;
        }
        let Some(body) = doc.body() else {
            return;
        };
        let landmark = doc.create_element(tag);
        doc.append_child(body, landmark);
        changes.push(format!("Inserted <{tag}> landmark placeholder."));
    }
}

/// Rule 4: give a generic accessible label to controls with no visible text
/// and no label attribute.
fn label_unlabeled_controls(doc: &mut Document, _ctx: &RuleContext, changes: &mut Vec<String>) {
    for id in doc.elements() {
        if is_button_like(doc, id) && is_unlabeled_control(doc, id) {
            doc.set_attr(id, "aria-label", "Action");
            changes.push("Added aria-label to unlabeled control.".to_string());
        }
    }
}

/// Rule 5: correct declared input types that contradict the field's name/id,
/// and infer an autocomplete hint when none is present.
fn fix_input_purpose(doc: &mut Document, _ctx: &RuleContext, changes: &mut Vec<String>) {
    for input in doc.elements_by_tag("input") {
        let name_id = format!(
            "{} {}",
            doc.attr(input, "name").unwrap_or(""),
            doc.attr(input, "id").unwrap_or("")
        )
        .to_lowercase();
        let declared = doc.attr(input, "type").unwrap_or("").to_lowercase();

        if name_id.contains("email") && declared != "email" {
            doc.set_attr(input, "type", "email");
            changes.push("Corrected input type to email.".to_string());
        }
        if (name_id.contains("phone") || name_id.contains("tel")) && declared != "tel" {
            doc.set_attr(input, "type", "tel");
            changes.push("Corrected input type to tel.".to_string());
        }

        let has_autocomplete = doc
            .attr(input, "autocomplete")
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false);
        if !has_autocomplete
            && let Some(hint) = infer_autocomplete(&name_id)
        {
            doc.set_attr(input, "autocomplete", hint);
            changes.push(format!("Added autocomplete hint '{hint}'."));
        }
    }
}

fn infer_autocomplete(name_id: &str) -> Option<&'static str> {
    AUTOCOMPLETE_HINTS
        .iter()
        .find(|(keywords, _)| keywords.iter().all(|keyword| name_id.contains(keyword)))
        .map(|(_, hint)| *hint)
}

/// Rule 6: mark cross-domain links with rel=noopener and rewrite vague link
/// text from the title attribute, the last URL path segment, or a fallback.
fn harden_links(doc: &mut Document, ctx: &RuleContext, changes: &mut Vec<String>) {
    for a in doc.elements_by_tag("a") {
        let Some(href) = doc.attr(a, "href").map(str::to_string) else {
            continue;
        };

        if href.starts_with("http") && page_host(&href).unwrap_or_default() != ctx.base_host {
            let rel = doc.attr(a, "rel").unwrap_or("").to_string();
            let mut tokens: Vec<&str> = rel.split_whitespace().collect();
            if !tokens.contains(&"noopener") {
                tokens.push("noopener");
                doc.set_attr(a, "rel", &tokens.join(" "));
                changes.push("Added rel=noopener to external link.".to_string());
            }
        }

        let label = doc.normalized_text(a).to_lowercase();
        if VAGUE_LINK_PHRASES.contains(&label.as_str()) {
            let new_label = doc
                .attr(a, "title")
                .map(str::trim)
                .filter(|title| !title.is_empty())
                .map(str::to_string)
                .or_else(|| last_path_segment(&href))
                .unwrap_or_else(|| "Learn more".to_string());
            doc.set_text(a, &new_label);
            changes.push(format!("Rewrote vague link text to '{new_label}'."));
        }
    }
}

fn last_path_segment(href: &str) -> Option<String> {
    let path = Url::parse(href)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| {
            href.split(['?', '#'])
                .next()
                .unwrap_or("")
                .to_string()
        });
    path.trim_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
}

/// Rule 7: inject the generated stylesheet as the first child of head.
///
/// Deliberately appends on every run (the original behavior); the stable
/// element id makes the duplication observable to callers.
fn inject_stylesheet(doc: &mut Document, ctx: &RuleContext, changes: &mut Vec<String>) {
    let Some(css) = ctx.css else {
        return;
    };
    let Some(head) = doc.head() else {
        return;
    };

    let style = doc.create_element("style");
    doc.set_attr(style, "id", INJECTED_STYLE_ID);
    let body = doc.create_text(css);
    doc.append_child(style, body);
    doc.prepend_child(head, style);

    changes.push("Injected age-friendly stylesheet.".to_string());
}
