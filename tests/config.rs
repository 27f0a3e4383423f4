//! Configuration and Presentation Tests

use std::collections::HashMap;
use std::time::Duration;

use social_proof::app::theme::{secondary_color, Position, Presentation};
use social_proof::config::{FeedFormat, WidgetConfig};

fn attributes(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

// ===========================================================================
// WidgetConfig
// ===========================================================================

#[test]
fn defaults() {
    let config = WidgetConfig::default();

    assert_eq!(config.display_duration, Duration::from_millis(4000));
    assert_eq!(config.delay_between, Duration::from_millis(3000));
    assert_eq!(config.initial_delay, Duration::from_millis(2000));
    assert_eq!(config.probe_timeout, Duration::from_millis(3000));
    assert_eq!(config.max_notifications, 5);
    assert_eq!(config.hide_after, 10);
    assert_eq!(config.sheet_gid, "0");
    assert_eq!(config.feed_format, FeedFormat::Csv);
    assert_eq!(config.position, "bottom-left");
    assert_eq!(config.primary_color, "#667eea");
    assert!(config.show_verification);
    assert_eq!(config.verification_text, "Verified by Google");
    assert!(config.show_time_ago);
    assert_eq!(config.spreadsheet_id, None);
}

#[test]
fn attributes_override_defaults() {
    let config = WidgetConfig::from_attributes(&attributes(&[
        ("spreadsheet-id", "sheet-123"),
        ("sheet-gid", "7"),
        ("feed-format", "json"),
        ("display-duration", "5000"),
        ("delay-between", "1500"),
        ("max-notifications", "3"),
        ("hide-after", "4"),
        ("position", "top-right"),
        ("primary-color", "#ff0000"),
        ("show-verification", "false"),
        ("verification-text", "Checked"),
        ("show-time-ago", "false"),
    ]));

    assert_eq!(config.spreadsheet_id.as_deref(), Some("sheet-123"));
    assert_eq!(config.sheet_gid, "7");
    assert_eq!(config.feed_format, FeedFormat::Json);
    assert_eq!(config.display_duration, Duration::from_millis(5000));
    assert_eq!(config.delay_between, Duration::from_millis(1500));
    assert_eq!(config.max_notifications, 3);
    assert_eq!(config.hide_after, 4);
    assert_eq!(config.position, "top-right");
    assert_eq!(config.primary_color, "#ff0000");
    assert!(!config.show_verification);
    assert_eq!(config.verification_text, "Checked");
    assert!(!config.show_time_ago);
}

#[test]
fn unparseable_or_zero_numbers_keep_defaults() {
    let config = WidgetConfig::from_attributes(&attributes(&[
        ("display-duration", "soon"),
        ("delay-between", "0"),
        ("max-notifications", "-2"),
        ("hide-after", ""),
        ("feed-format", "xml"),
    ]));

    assert_eq!(config.display_duration, Duration::from_millis(4000));
    assert_eq!(config.delay_between, Duration::from_millis(3000));
    assert_eq!(config.max_notifications, 5);
    assert_eq!(config.hide_after, 10);
    assert_eq!(config.feed_format, FeedFormat::Csv);
    assert_eq!(config.spreadsheet_id, None);
}

#[test]
fn flags_are_on_unless_exactly_false() {
    let config = WidgetConfig::from_attributes(&attributes(&[
        ("show-verification", "no"),
        ("show-time-ago", "FALSE"),
    ]));

    assert!(config.show_verification);
    assert!(config.show_time_ago);
}

#[test]
fn environment_overrides() {
    std::env::set_var("SPW_SPREADSHEET_ID", "env-sheet");
    std::env::set_var("SPW_HIDE_AFTER", "3");
    std::env::set_var("SPW_FEED_FORMAT", "gviz");
    let config = WidgetConfig::from_env().unwrap();
    assert_eq!(config.spreadsheet_id.as_deref(), Some("env-sheet"));
    assert_eq!(config.hide_after, 3);
    assert_eq!(config.feed_format, FeedFormat::Json);

    std::env::set_var("SPW_HIDE_AFTER", "many");
    let err = WidgetConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("invalid SPW_HIDE_AFTER"));

    std::env::remove_var("SPW_SPREADSHEET_ID");
    std::env::remove_var("SPW_HIDE_AFTER");
    std::env::remove_var("SPW_FEED_FORMAT");
}

// ===========================================================================
// Presentation
// ===========================================================================

#[test]
fn position_parsing_falls_back_to_bottom_left() {
    assert_eq!(Position::parse("top-right"), Position::TopRight);
    assert_eq!(Position::parse(" Bottom-Right "), Position::BottomRight);
    assert_eq!(Position::parse("middle"), Position::BottomLeft);
    assert_eq!(Position::TopLeft.css_offsets(), "top: 20px; left: 20px;");
}

#[test]
fn secondary_color_darkens_primary() {
    assert_eq!(secondary_color("#667eea").as_deref(), Some("#525bce"));
    assert_eq!(secondary_color("ffffff").as_deref(), Some("#ccb8e0"));
    assert_eq!(secondary_color("#fff"), None);
    assert_eq!(secondary_color("#zzzzzz"), None);
}

#[test]
fn presentation_passes_settings_through() {
    let config = WidgetConfig {
        position: "top-left".to_string(),
        show_verification: false,
        ..WidgetConfig::default()
    };

    let presentation = Presentation::from_config(&config);

    assert_eq!(presentation.position, Position::TopLeft);
    assert_eq!(presentation.primary_color, "#667eea");
    assert_eq!(presentation.secondary_color.as_deref(), Some("#525bce"));
    assert!(!presentation.show_verification);
    assert_eq!(presentation.verification_text, "Verified by Google");
}
