//! Contrast engine properties
//!
//! Sweeps a grid of sRGB colors rather than a handful of hand-picked ones so
//! the AA guarantee is checked across the whole gamut.

use atelier_common::color::{
    contrast_ratio, contrast_ratio_hex, optimal_text_color, relative_luminance,
    validate_accessibility, Rgb, WcagLevel, BLACK, WHITE,
};

fn color_grid() -> Vec<Rgb> {
    let steps = [0u8, 0x17, 0x40, 0x62, 0x77, 0x88, 0xa0, 0xc8, 0xe6, 0xff];
    let mut colors = Vec::new();
    for r in steps {
        for g in steps {
            for b in steps {
                colors.push(Rgb::new(r, g, b));
            }
        }
    }
    colors
}

#[test]
fn test_contrast_is_symmetric() {
    let colors = color_grid();
    for (i, a) in colors.iter().enumerate().step_by(7) {
        for b in colors.iter().skip(i % 13).step_by(11) {
            assert_eq!(contrast_ratio(*a, *b), contrast_ratio(*b, *a), "{} vs {}", a, b);
        }
    }
}

#[test]
fn test_contrast_with_self_is_one() {
    for color in color_grid() {
        assert_eq!(contrast_ratio(color, color), 1.0, "{}", color);
    }
}

#[test]
fn test_contrast_bounds() {
    for color in color_grid() {
        let ratio = contrast_ratio(color, Rgb::BLACK);
        assert!((1.0..=21.0 + 1e-9).contains(&ratio), "{} -> {}", color, ratio);
    }
}

#[test]
fn test_luminance_in_unit_range() {
    for color in color_grid() {
        let l = color.relative_luminance();
        assert!((0.0..=1.0 + 1e-12).contains(&l), "{} -> {}", color, l);
    }
}

#[test]
fn test_every_background_gets_accessible_text() {
    for color in color_grid() {
        let palette = optimal_text_color(&color.to_hex());
        assert!(
            palette.contrast_ratio >= 4.5,
            "{} picked {} at {:.2}",
            color,
            palette.text_color,
            palette.contrast_ratio
        );
        assert!(palette.is_accessible);
    }
}

#[test]
fn test_brand_green_is_accessible_black_or_white() {
    let palette = optimal_text_color("#17624A");
    assert!(palette.is_accessible);
    assert!(palette.text_color == WHITE || palette.text_color == BLACK);
}

#[test]
fn test_black_on_white_is_aaa_21() {
    let report = validate_accessibility("#ffffff", "#000000").unwrap();
    assert_eq!(report.wcag_level, WcagLevel::Aaa);
    assert!((report.contrast_ratio - 21.0).abs() < 1e-9);
    assert!(report.is_valid);
    assert!(report.suggestions.is_empty());
}

#[test]
fn test_mid_grays_fail_with_suggestions() {
    let report = validate_accessibility("#777777", "#888888").unwrap();
    assert_eq!(report.wcag_level, WcagLevel::Fail);
    assert!(!report.is_valid);
    assert!(!report.suggestions.is_empty());
}

#[test]
fn test_aa_band() {
    // #767676 on white is the classic lowest-passing gray (~4.54:1)
    let report = validate_accessibility("#ffffff", "#767676").unwrap();
    assert_eq!(report.wcag_level, WcagLevel::Aa);
}

#[test]
fn test_hex_helpers_reject_invalid_input() {
    assert!(relative_luminance("#xyz").is_err());
    assert!(contrast_ratio_hex("#fff", "nope").is_err());
    assert!(validate_accessibility("", "#000").is_err());
}

#[test]
fn test_report_serializes_wcag_label() {
    let report = validate_accessibility("#ffffff", "#000000").unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["wcagLevel"], "AAA");
    assert_eq!(json["isValid"], true);
}
