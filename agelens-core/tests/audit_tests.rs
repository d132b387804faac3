// Tests for the structural/content auditor

use agelens_core::audit::{audit_html, blocks_zoom};
use std::collections::HashSet;

const BASE_URL: &str = "https://example.com/";

// ============================================================================
// Heading Structure Tests
// ============================================================================

#[test]
fn test_h1_to_h3_counts_one_jump() {
    let result = audit_html(BASE_URL, "<body><h1>Title</h1><h3>Sub</h3></body>");
    assert!(result.checks.has_h1);
    assert_eq!(result.checks.heading_jumps, 1);
}

#[test]
fn test_orderly_headings_have_no_jumps() {
    let result = audit_html(
        BASE_URL,
        "<body><h1>A</h1><h2>B</h2><h3>C</h3><h2>D</h2></body>",
    );
    assert_eq!(result.checks.heading_jumps, 0);
}

#[test]
fn test_missing_h1_is_detected() {
    let result = audit_html(BASE_URL, "<body><h2>Not a title</h2></body>");
    assert!(!result.checks.has_h1);
}

// ============================================================================
// Skip Link and Landmark Tests
// ============================================================================

#[test]
fn test_skip_link_detected_by_fragment_href() {
    let result = audit_html(
        BASE_URL,
        r##"<body><a href="#main-content">Jump</a></body>"##,
    );
    assert!(result.checks.has_skip_link);
}

#[test]
fn test_skip_link_detected_by_visible_text() {
    let result = audit_html(
        BASE_URL,
        r##"<body><a href="#top">Skip navigation</a></body>"##,
    );
    assert!(result.checks.has_skip_link);
}

#[test]
fn test_plain_fragment_link_is_not_a_skip_link() {
    let result = audit_html(BASE_URL, r##"<body><a href="#section2">Next</a></body>"##);
    assert!(!result.checks.has_skip_link);
}

#[test]
fn test_landmarks_counted_by_tag_or_role() {
    let by_tag = audit_html(
        BASE_URL,
        "<body><header></header><nav></nav><main></main><footer></footer></body>",
    );
    assert_eq!(by_tag.checks.landmark_count, 4);

    let by_role = audit_html(
        BASE_URL,
        r#"<body>
            <div role="banner"></div>
            <div role="navigation"></div>
            <div role="main"></div>
            <div role="contentinfo"></div>
        </body>"#,
    );
    assert_eq!(by_role.checks.landmark_count, 4);

    let partial = audit_html(BASE_URL, "<body><nav></nav></body>");
    assert_eq!(partial.checks.landmark_count, 1);
}

// ============================================================================
// Visual Alternatives Tests
// ============================================================================

#[test]
fn test_zero_images_is_perfect_coverage() {
    let result = audit_html(BASE_URL, "<body><p>No pictures here.</p></body>");
    assert_eq!(result.checks.img_alt_coverage, 1.0);
    assert_eq!(result.breakdown.visual_alternatives, 100.0);
}

#[test]
fn test_alt_coverage_is_a_ratio() {
    let result = audit_html(
        BASE_URL,
        r#"<body><img src="a.png" alt="A chart"><img src="b.png"><img src="c.png" alt="  "></body>"#,
    );
    assert!((result.checks.img_alt_coverage - 1.0 / 3.0).abs() < 1e-9);
}

// ============================================================================
// Controls and Forms Tests
// ============================================================================

#[test]
fn test_unlabeled_buttons_are_counted() {
    let result = audit_html(
        BASE_URL,
        r#"<body>
            <button></button>
            <button aria-label="Close"></button>
            <button>Go</button>
            <div role="button"></div>
        </body>"#,
    );
    assert_eq!(result.checks.unlabeled_buttons, 2);
}

#[test]
fn test_input_labeling_variants() {
    let result = audit_html(
        BASE_URL,
        r#"<body>
            <label for="a">Name</label><input id="a" type="text">
            <label>Wrapped <input type="text"></label>
            <input type="text" aria-label="Search">
            <input type="hidden" name="csrf">
            <input type="text" name="lonely">
        </body>"#,
    );
    assert_eq!(result.checks.unlabeled_inputs, 1);
}

#[test]
fn test_input_type_histogram_and_mismatches() {
    let result = audit_html(
        BASE_URL,
        r#"<body>
            <input type="text" name="email">
            <input type="text" name="username">
            <input name="phone">
        </body>"#,
    );
    assert_eq!(result.checks.input_types.get("text"), Some(&2));
    assert_eq!(result.checks.input_types.get(""), Some(&1));
    assert!(result.checks.missing_email_type);
    assert!(result.checks.missing_tel_type);
    assert_eq!(result.checks.missing_autocomplete, 3);
}

#[test]
fn test_correct_input_types_are_not_flagged() {
    let result = audit_html(
        BASE_URL,
        r#"<body>
            <input type="email" name="email" autocomplete="email">
            <input type="tel" name="phone" autocomplete="tel">
        </body>"#,
    );
    assert!(!result.checks.missing_email_type);
    assert!(!result.checks.missing_tel_type);
    assert_eq!(result.checks.missing_autocomplete, 0);
}

// ============================================================================
// Viewport and Zoom Tests
// ============================================================================

#[test]
fn test_missing_viewport_meta() {
    let result = audit_html(BASE_URL, "<body><p>x</p></body>");
    assert!(!result.checks.viewport_meta);
    assert_eq!(result.breakdown.mobile_zoom, 40.0);
}

#[test]
fn test_healthy_viewport_meta() {
    let result = audit_html(
        BASE_URL,
        r#"<head><meta name="viewport" content="width=device-width, initial-scale=1"></head><body></body>"#,
    );
    assert!(result.checks.viewport_meta);
    assert!(!result.checks.viewport_blocks_zoom);
    assert_eq!(result.breakdown.mobile_zoom, 100.0);
}

#[test]
fn test_user_scalable_no_blocks_zoom() {
    let result = audit_html(
        BASE_URL,
        r#"<head><meta name="viewport" content="width=device-width, user-scalable=no"></head><body></body>"#,
    );
    assert!(result.checks.viewport_blocks_zoom);
    assert_eq!(result.breakdown.mobile_zoom, 60.0);
}

#[test]
fn test_blocks_zoom_variants() {
    assert!(blocks_zoom("user-scalable = no"));
    assert!(blocks_zoom("maximum-scale=1"));
    assert!(blocks_zoom("maximum-scale=1.0"));
    assert!(blocks_zoom("width=device-width, maximum-scale=1.00"));
    assert!(!blocks_zoom("maximum-scale=1.5"));
    assert!(!blocks_zoom("maximum-scale=5"));
    assert!(!blocks_zoom("width=device-width, initial-scale=1"));
}

// ============================================================================
// Link Clarity Tests
// ============================================================================

#[test]
fn test_vague_external_link_counts_both_ways() {
    // Scenario: "Click here" to another registered domain, no rel marker.
    let result = audit_html(
        BASE_URL,
        r#"<body><a href="https://other.com/page">Click here</a></body>"#,
    );
    assert_eq!(result.checks.total_links, 1);
    assert_eq!(result.checks.vague_links, 1);
    assert_eq!(result.checks.external_no_warn, 1);
    assert_eq!(result.breakdown.link_clarity, 0.0);
}

#[test]
fn test_rel_noopener_marks_external_link_safe() {
    let result = audit_html(
        BASE_URL,
        r#"<body><a href="https://other.com/page" rel="noopener">Partner site</a></body>"#,
    );
    assert_eq!(result.checks.external_no_warn, 0);

    let noreferrer = audit_html(
        BASE_URL,
        r#"<body><a href="https://other.com/page" rel="noreferrer">Partner site</a></body>"#,
    );
    assert_eq!(noreferrer.checks.external_no_warn, 0);
}

#[test]
fn test_same_domain_link_is_not_external() {
    let result = audit_html(
        BASE_URL,
        r#"<body><a href="https://example.com/about">About us</a></body>"#,
    );
    assert_eq!(result.checks.external_no_warn, 0);
}

#[test]
fn test_vague_phrases_match_case_insensitively() {
    let result = audit_html(
        BASE_URL,
        r#"<body>
            <a href="/a">READ MORE</a>
            <a href="/b">Learn More</a>
            <a href="/c">Our pricing plans</a>
        </body>"#,
    );
    assert_eq!(result.checks.total_links, 3);
    assert_eq!(result.checks.vague_links, 2);
}

#[test]
fn test_no_links_is_full_clarity() {
    let result = audit_html(BASE_URL, "<body><p>plain text</p></body>");
    assert_eq!(result.checks.total_links, 0);
    assert_eq!(result.breakdown.link_clarity, 100.0);
}

// ============================================================================
// Discoverability Tests
// ============================================================================

#[test]
fn test_discoverability_components() {
    let result = audit_html(
        BASE_URL,
        r#"<body>
            <a href="tel:+15551234567">Call us</a>
            <a href="mailto:help@example.com">Email</a>
            <p>Contact our support team.</p>
        </body>"#,
    );
    assert!(result.checks.has_tel_link);
    assert!(result.checks.has_mailto);
    assert!(result.checks.has_contact_word);
    assert_eq!(result.breakdown.discoverability, 100.0);
}

#[test]
fn test_tel_link_requires_digits() {
    let result = audit_html(BASE_URL, r#"<body><a href="tel:nope">Call</a></body>"#);
    assert!(!result.checks.has_tel_link);
}

#[test]
fn test_contact_keyword_alone_scores_forty() {
    let result = audit_html(BASE_URL, "<body><p>Phone lines are open.</p></body>");
    assert!(result.checks.has_contact_word);
    assert_eq!(result.breakdown.discoverability, 40.0);
}

// ============================================================================
// Scoring Tests
// ============================================================================

#[test]
fn test_empty_page_scores_deterministically() {
    let result = audit_html(BASE_URL, "");
    // structureNav 16, readability 100, visual 100, controls 100,
    // mobileZoom 40, linkClarity 100, discoverability 0 -> 72.68 -> 73.
    assert_eq!(result.score, 73);
    assert_eq!(result.breakdown.structure_nav, 16.0);
    assert_eq!(result.breakdown.mobile_zoom, 40.0);
    assert_eq!(result.breakdown.discoverability, 0.0);
}

#[test]
fn test_well_built_page_scores_one_hundred() {
    let html = r##"<!DOCTYPE html>
<html><head><meta name="viewport" content="width=device-width, initial-scale=1"></head>
<body>
<header></header>
<nav><a href="#main">Skip to content</a></nav>
<main id="main">
  <h1>Hi</h1>
  <h2>Sub</h2>
  <p>We can help. Call us now. It is easy.</p>
  <img src="a.png" alt="A photo">
  <a href="tel:+15551234567">Call</a>
  <a href="mailto:help@example.com">Email</a>
  <label for="name">Name</label><input id="name" type="text" autocomplete="name">
  <button>Go</button>
</main>
<footer></footer>
</body></html>"##;
    let result = audit_html(BASE_URL, html);
    assert_eq!(result.score, 100);
    assert_eq!(result.breakdown.structure_nav, 100.0);
    assert_eq!(result.breakdown.text_readability, 100.0);
    assert_eq!(result.breakdown.visual_alternatives, 100.0);
    assert_eq!(result.breakdown.controls_forms, 100.0);
    assert_eq!(result.breakdown.mobile_zoom, 100.0);
    assert_eq!(result.breakdown.link_clarity, 100.0);
    assert_eq!(result.breakdown.discoverability, 100.0);
}

#[test]
fn test_score_is_bounded_for_hostile_markup() {
    let html = r#"<body>
        <h2>No h1</h2><h6>Jump</h6>
        <meta name="viewport" content="user-scalable=no">
        <img src="x"><img src="y">
        <button></button><button></button><button></button>
        <input><input><input>
        <a href="https://a.com/x">here</a>
        <a href="https://b.com/y">more</a>
        <p style="color:#777;background-color:#888;">mud</p>
    </body>"#;
    let result = audit_html(BASE_URL, html);
    assert!(result.score <= 100);
}

#[test]
fn test_audit_is_deterministic() {
    let html = r#"<body><h1>T</h1><a href="/x">here</a><input name="email"></body>"#;
    let a = serde_json::to_value(audit_html(BASE_URL, html)).unwrap();
    let b = serde_json::to_value(audit_html(BASE_URL, html)).unwrap();
    assert_eq!(a, b);
}

// ============================================================================
// Recommendation Tests
// ============================================================================

#[test]
fn test_recommendations_fire_once_each() {
    let html = r#"<body>
        <a href="/a">here</a>
        <a href="/b">more</a>
        <a href="/c">this</a>
    </body>"#;
    let result = audit_html(BASE_URL, html);
    let unique: HashSet<&String> = result.recommendations.iter().collect();
    assert_eq!(unique.len(), result.recommendations.len());
}

#[test]
fn test_recommendations_are_export_safe() {
    let result = audit_html(BASE_URL, "<body><h2>x</h2><input name=\"email\"></body>");
    assert!(!result.recommendations.is_empty());
    for recommendation in &result.recommendations {
        assert!(
            recommendation.chars().all(|c| !c.is_control()),
            "control character in {recommendation:?}"
        );
    }
}

#[test]
fn test_clean_page_has_few_recommendations() {
    let clean = audit_html(
        BASE_URL,
        r##"<head><meta name="viewport" content="width=device-width, initial-scale=1"></head>
        <body><header></header><nav><a href="#main">Skip to content</a></nav>
        <main id="main"><h1>Hello</h1><p>We can help. Contact us. Use the phone.</p>
        <a href="tel:+15550000000">Call</a><a href="mailto:hi@example.com">Email</a></main>
        <footer></footer></body>"##,
    );
    assert!(clean.recommendations.is_empty(), "{:?}", clean.recommendations);
}

#[test]
fn test_weights_sum_to_one() {
    let weights = [0.18, 0.20, 0.15, 0.20, 0.12, 0.10, 0.05];
    let total: f64 = weights.iter().sum();
    assert!((total - 1.0).abs() < 1e-9);
}
