//! WCAG contrast math over inline styles.
//!
//! Only elements that declare BOTH `color` and `background-color` inline can
//! be checked; styles coming from stylesheets or computed by the browser are
//! invisible here. That blind spot is inherent to static-markup analysis and
//! is surfaced as a documented limitation rather than papered over.

use crate::dom::Document;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Parsed CSS color, all channels in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorValue {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// One element whose inline colors fall below the WCAG contrast threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContrastFinding {
    pub tag: String,
    pub text: String,
    pub ratio: f64,
    pub color: String,
    #[serde(rename = "bg")]
    pub background: String,
}

static FONT_SIZE_PX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]*\.?[0-9]+)\s*px").unwrap());

/// Parse a CSS color: `#abc`, `#aabbcc`, `rgb(r, g, b)` or `rgba(r, g, b, a)`.
///
/// Returns `None` on anything malformed; there are no partial results. An
/// alpha channel above 1 is assumed to be on the 0-255 scale and divided
/// down. Missing alpha defaults to 1.0.
pub fn parse_color(spec: &str) -> Option<ColorValue> {
    let s = spec.trim().to_lowercase();

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    if let Some(body) = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))
    {
        let body = body.strip_suffix(')')?;
        return parse_functional(body);
    }

    None
}

fn parse_hex(hex: &str) -> Option<ColorValue> {
    let (r, g, b) = match hex.len() {
        3 => {
            let mut chars = hex.chars();
            let r = hex_digit_pair(chars.next()?)?;
            let g = hex_digit_pair(chars.next()?)?;
            let b = hex_digit_pair(chars.next()?)?;
            (r, g, b)
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            (r, g, b)
        }
        _ => return None,
    };

    Some(ColorValue {
        r: r as f32 / 255.0,
        g: g as f32 / 255.0,
        b: b as f32 / 255.0,
        a: 1.0,
    })
}

fn hex_digit_pair(c: char) -> Option<u8> {
    let digit = c.to_digit(16)? as u8;
    Some(digit * 16 + digit)
}

fn parse_functional(body: &str) -> Option<ColorValue> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let r: f32 = parts[0].parse().ok()?;
    let g: f32 = parts[1].parse().ok()?;
    let b: f32 = parts[2].parse().ok()?;
    let mut a: f32 = if parts.len() == 4 {
        parts[3].parse().ok()?
    } else {
        1.0
    };
    if a > 1.0 {
        a /= 255.0;
    }

    Some(ColorValue {
        r: (r / 255.0).clamp(0.0, 1.0),
        g: (g / 255.0).clamp(0.0, 1.0),
        b: (b / 255.0).clamp(0.0, 1.0),
        a: a.clamp(0.0, 1.0),
    })
}

/// Relative luminance per WCAG 2.1: sRGB channels linearized with the
/// standard gamma curve, then weighted 0.2126 / 0.7152 / 0.0722.
pub fn relative_luminance(color: ColorValue) -> f64 {
    fn linearize(channel: f32) -> f64 {
        let c = channel as f64;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }

    0.2126 * linearize(color.r) + 0.7152 * linearize(color.g) + 0.0722 * linearize(color.b)
}

/// WCAG 2.1 contrast ratio, in [1.0, 21.0]. Symmetric in its arguments.
pub fn contrast_ratio(fg: ColorValue, bg: ColorValue) -> f64 {
    let l1 = relative_luminance(fg);
    let l2 = relative_luminance(bg);
    let (lighter, darker) = if l1 >= l2 { (l1, l2) } else { (l2, l1) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Look up one declaration in an inline `style` attribute.
pub(crate) fn style_lookup(style: &str, property: &str) -> Option<String> {
    for declaration in style.split(';') {
        if let Some((name, value)) = declaration.split_once(':')
            && name.trim().eq_ignore_ascii_case(property)
        {
            return Some(value.trim().to_string());
        }
    }
    None
}

/// Scan every element carrying both inline `color` and `background-color`
/// declarations and non-empty text, and report those whose contrast ratio
/// falls below the WCAG threshold: 3.0 for large text (inline `font-size`
/// of at least 18.66px, the usual proxy for bold 14pt), 4.5 otherwise.
///
/// Unparseable colors produce no finding for that element; they never fail
/// the audit.
pub fn find_low_contrast_nodes(doc: &Document) -> Vec<ContrastFinding> {
    let mut findings = Vec::new();

    for id in doc.elements() {
        let Some(style) = doc.attr(id, "style") else {
            continue;
        };

        let color_raw = style_lookup(style, "color");
        let bg_raw = style_lookup(style, "background-color");
        let (Some(color_raw), Some(bg_raw)) = (color_raw, bg_raw) else {
            continue;
        };
        let (Some(fg), Some(bg)) = (parse_color(&color_raw), parse_color(&bg_raw)) else {
            continue;
        };

        let text = doc.normalized_text(id);
        if text.is_empty() {
            continue;
        }

        let ratio = contrast_ratio(fg, bg);

        let is_large = style_lookup(style, "font-size")
            .and_then(|fs| {
                FONT_SIZE_PX
                    .captures(&fs)
                    .and_then(|caps| caps[1].parse::<f64>().ok())
            })
            .map(|px| px >= 18.66)
            .unwrap_or(false);
        let threshold = if is_large { 3.0 } else { 4.5 };

        if ratio < threshold {
            findings.push(ContrastFinding {
                tag: doc.tag(id).unwrap_or_default().to_string(),
                text: text.chars().take(120).collect(),
                ratio: (ratio * 100.0).round() / 100.0,
                color: color_raw,
                background: bg_raw,
            });
        }
    }

    findings
}
