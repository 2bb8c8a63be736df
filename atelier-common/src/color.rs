//! Color contrast utilities for artist theme colors
//!
//! Artists supply their own theme colors, so text drawn on top of them has to
//! be chosen at render time. Everything here follows WCAG 2.1:
//!
//! - relative luminance uses sRGB gamma expansion and the BT.709 weights
//! - contrast ratio is `(L_lighter + 0.05) / (L_darker + 0.05)`, in `1.0..=21.0`
//! - AA for normal text is 4.5:1, AAA is 7:1
//!
//! All functions are pure.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::{Error, Result};

/// Minimum contrast ratio for normal text (WCAG AA)
pub const WCAG_AA: f64 = 4.5;

/// Minimum contrast ratio for enhanced contrast (WCAG AAA)
pub const WCAG_AAA: f64 = 7.0;

/// Perceived-brightness threshold above which a background counts as light
const LIGHT_BRIGHTNESS_THRESHOLD: f64 = 186.0;

pub const WHITE: &str = "#ffffff";
pub const BLACK: &str = "#000000";
pub const LIGHT_GRAY: &str = "#f8f9fa";
pub const DARK_GRAY: &str = "#212529";

/// Foreground candidates, in tie-break order
const TEXT_CANDIDATES: [&str; 4] = [WHITE, BLACK, LIGHT_GRAY, DARK_GRAY];

const LIGHT_TEXT_TAG_BG: &str = "rgba(255,255,255,0.18)";
const LIGHT_TEXT_SHADOW: &str = "rgba(0,0,0,0.1)";
const DARK_TEXT_TAG_BG: &str = "rgba(0,0,0,0.08)";
const DARK_TEXT_SHADOW: &str = "rgba(255,255,255,0.1)";

/// 8-bit sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb` (leading `#` optional, case-insensitive)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidInput(format!("invalid hex color '{}'", hex)));
        }

        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => {
                return Err(Error::InvalidInput(format!(
                    "expected a 3 or 6 digit hex color, got '{}'",
                    hex
                )))
            }
        };

        let channel = |range: std::ops::Range<usize>| {
            expanded
                .get(range)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| Error::InvalidInput(format!("invalid hex color '{}'", hex)))
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Lowercase `#rrggbb` form
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// WCAG relative luminance in `[0, 1]`
    pub fn relative_luminance(self) -> f64 {
        fn linear(channel: u8) -> f64 {
            let c = f64::from(channel) / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }

        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    /// Perceived brightness on the 0-255 scale (ITU-R BT.601 weights)
    pub fn perceived_brightness(self) -> f64 {
        f64::from(self.r) * 0.299 + f64::from(self.g) * 0.587 + f64::from(self.b) * 0.114
    }

    /// Whether the color reads as a light background
    pub fn is_light(self) -> bool {
        self.perceived_brightness() > LIGHT_BRIGHTNESS_THRESHOLD
    }
}

impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Contrast ratio between two colors, symmetric, in `1.0..=21.0`
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let la = a.relative_luminance();
    let lb = b.relative_luminance();
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Relative luminance of a hex color string
pub fn relative_luminance(hex: &str) -> Result<f64> {
    Ok(Rgb::from_hex(hex)?.relative_luminance())
}

/// Contrast ratio between two hex color strings
pub fn contrast_ratio_hex(a: &str, b: &str) -> Result<f64> {
    Ok(contrast_ratio(Rgb::from_hex(a)?, Rgb::from_hex(b)?))
}

/// Whether a hex color reads as light. Unparsable input counts as dark.
pub fn is_color_light(hex: &str) -> bool {
    Rgb::from_hex(hex).map(Rgb::is_light).unwrap_or(false)
}

/// Text styling chosen for a background color
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPalette {
    pub text_color: String,
    pub tag_background: String,
    pub shadow_color: String,
    pub contrast_ratio: f64,
    pub is_accessible: bool,
}

impl TextPalette {
    fn for_text(text_color: &str, contrast_ratio: f64) -> Self {
        let light_text = text_color == WHITE || text_color == LIGHT_GRAY;
        let (tag_background, shadow_color) = if light_text {
            (LIGHT_TEXT_TAG_BG, LIGHT_TEXT_SHADOW)
        } else {
            (DARK_TEXT_TAG_BG, DARK_TEXT_SHADOW)
        };

        Self {
            text_color: text_color.to_string(),
            tag_background: tag_background.to_string(),
            shadow_color: shadow_color.to_string(),
            contrast_ratio,
            is_accessible: contrast_ratio >= WCAG_AA,
        }
    }

    /// Palette used when there is no usable background color
    fn unthemed(text_color: &str) -> Self {
        Self::for_text(text_color, 21.0)
    }
}

/// Pick the most legible text color for `background`
///
/// Evaluates white, black, light gray and dark gray and keeps the highest
/// contrast (earliest candidate wins ties). If the winner is still below AA,
/// pure black or white is forced according to the background's perceived
/// brightness. Empty or unparsable backgrounds get white text.
pub fn optimal_text_color(background: &str) -> TextPalette {
    let Ok(bg) = Rgb::from_hex(background) else {
        return TextPalette::unthemed(WHITE);
    };

    let mut best = (WHITE, 0.0_f64);
    for candidate in TEXT_CANDIDATES {
        let Ok(fg) = Rgb::from_hex(candidate) else {
            continue;
        };
        let ratio = contrast_ratio(bg, fg);
        if ratio > best.1 {
            best = (candidate, ratio);
        }
    }

    if best.1 < WCAG_AA {
        let forced = if bg.is_light() { BLACK } else { WHITE };
        let forced_rgb = if bg.is_light() { Rgb::BLACK } else { Rgb::WHITE };
        best = (forced, contrast_ratio(bg, forced_rgb));
    }

    TextPalette::for_text(best.0, best.1)
}

/// Palette for an optional background, falling back to `fallback_text`
///
/// Themes frequently omit colors; a missing background keeps the caller's
/// default text color and reports full contrast.
pub fn palette_for_background(background: Option<&str>, fallback_text: &str) -> TextPalette {
    match background.map(str::trim).filter(|bg| !bg.is_empty()) {
        Some(bg) => optimal_text_color(bg),
        None => TextPalette::unthemed(fallback_text),
    }
}

/// WCAG conformance level for a contrast ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WcagLevel {
    #[serde(rename = "AAA")]
    Aaa,
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "FAIL")]
    Fail,
}

impl WcagLevel {
    pub fn for_ratio(ratio: f64) -> Self {
        if ratio >= WCAG_AAA {
            WcagLevel::Aaa
        } else if ratio >= WCAG_AA {
            WcagLevel::Aa
        } else {
            WcagLevel::Fail
        }
    }
}

impl fmt::Display for WcagLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WcagLevel::Aaa => "AAA",
            WcagLevel::Aa => "AA",
            WcagLevel::Fail => "FAIL",
        };
        f.write_str(label)
    }
}

/// Result of checking a foreground/background pair
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityReport {
    pub is_valid: bool,
    pub contrast_ratio: f64,
    pub wcag_level: WcagLevel,
    pub suggestions: Vec<String>,
}

/// Classify a color pair against WCAG and suggest fixes when it fails
pub fn validate_accessibility(background: &str, foreground: &str) -> Result<AccessibilityReport> {
    let ratio = contrast_ratio_hex(background, foreground)?;
    let wcag_level = WcagLevel::for_ratio(ratio);

    let suggestions = if wcag_level == WcagLevel::Fail {
        vec![
            "Consider using a higher contrast color combination".to_string(),
            "Try white text on dark backgrounds or black text on light backgrounds".to_string(),
        ]
    } else {
        Vec::new()
    };

    Ok(AccessibilityReport {
        is_valid: wcag_level != WcagLevel::Fail,
        contrast_ratio: ratio,
        wcag_level,
        suggestions,
    })
}

/// Five-color palette derived from a base theme color
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessiblePalette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub text: String,
    pub background: String,
}

/// Build a palette whose text/background polarity matches `base`
pub fn accessible_palette(base: &str) -> Result<AccessiblePalette> {
    let rgb = Rgb::from_hex(base)?;
    let light = rgb.is_light();

    let pick = |if_light: &str, if_dark: &str| {
        let chosen = if light { if_light } else { if_dark };
        chosen.to_string()
    };

    Ok(AccessiblePalette {
        primary: rgb.to_hex(),
        secondary: pick(BLACK, WHITE),
        accent: pick("#ff6b35", "#00ff9d"),
        text: pick(BLACK, WHITE),
        background: pick(WHITE, BLACK),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_parse_short_and_long_forms() {
        assert_eq!(Rgb::from_hex("#fff").unwrap(), Rgb::WHITE);
        assert_eq!(Rgb::from_hex("000000").unwrap(), Rgb::BLACK);
        assert_eq!(Rgb::from_hex("#17624A").unwrap(), Rgb::new(0x17, 0x62, 0x4a));
        assert_eq!(Rgb::from_hex("#17624a").unwrap().to_hex(), "#17624a");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Rgb::from_hex("").is_err());
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#gggggg").is_err());
        // from_str_radix alone would accept a sign
        assert!(Rgb::from_hex("#+f+f+f").is_err());
        assert!(Rgb::from_hex("+ff").is_err());
        assert!(Rgb::from_hex("var(--card, #18181b)").is_err());
    }

    #[test]
    fn test_luminance_extremes() {
        assert!(approx(Rgb::BLACK.relative_luminance(), 0.0));
        assert!(approx(Rgb::WHITE.relative_luminance(), 1.0));
    }

    #[test]
    fn test_black_on_white_is_21() {
        assert!(approx(contrast_ratio(Rgb::WHITE, Rgb::BLACK), 21.0));
    }

    #[test]
    fn test_brand_green_gets_white_text() {
        let palette = optimal_text_color("#17624A");
        assert_eq!(palette.text_color, WHITE);
        assert!(palette.is_accessible);
        assert!(palette.contrast_ratio > 7.0);
        assert_eq!(palette.tag_background, LIGHT_TEXT_TAG_BG);
        assert_eq!(palette.shadow_color, LIGHT_TEXT_SHADOW);
    }

    #[test]
    fn test_light_background_gets_dark_text() {
        let palette = optimal_text_color("#fafafa");
        assert_eq!(palette.text_color, BLACK);
        assert_eq!(palette.tag_background, DARK_TEXT_TAG_BG);
        assert_eq!(palette.shadow_color, DARK_TEXT_SHADOW);
    }

    #[test]
    fn test_unparsable_background_uses_white() {
        let palette = optimal_text_color("var(--card)");
        assert_eq!(palette.text_color, WHITE);
        assert!(approx(palette.contrast_ratio, 21.0));
        assert!(palette.is_accessible);
    }

    #[test]
    fn test_missing_background_keeps_fallback_text() {
        let palette = palette_for_background(None, BLACK);
        assert_eq!(palette.text_color, BLACK);
        assert_eq!(palette.tag_background, DARK_TEXT_TAG_BG);

        let palette = palette_for_background(Some("  "), WHITE);
        assert_eq!(palette.text_color, WHITE);
    }

    #[test]
    fn test_wcag_levels() {
        assert_eq!(WcagLevel::for_ratio(21.0), WcagLevel::Aaa);
        assert_eq!(WcagLevel::for_ratio(7.0), WcagLevel::Aaa);
        assert_eq!(WcagLevel::for_ratio(4.5), WcagLevel::Aa);
        assert_eq!(WcagLevel::for_ratio(4.49), WcagLevel::Fail);
        assert_eq!(WcagLevel::Aaa.to_string(), "AAA");
    }

    #[test]
    fn test_palette_polarity() {
        let dark = accessible_palette("#0f2027").unwrap();
        assert_eq!(dark.text, WHITE);
        assert_eq!(dark.background, BLACK);
        assert_eq!(dark.accent, "#00ff9d");

        let light = accessible_palette("#ffffff").unwrap();
        assert_eq!(light.text, BLACK);
        assert_eq!(light.accent, "#ff6b35");
    }
}
