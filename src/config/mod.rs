use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_DISPLAY_DURATION_MS: u64 = 4000;
const DEFAULT_DELAY_BETWEEN_MS: u64 = 3000;
const DEFAULT_INITIAL_DELAY_MS: u64 = 2000;
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 3000;
const DEFAULT_MAX_NOTIFICATIONS: usize = 5;
const DEFAULT_HIDE_AFTER: u32 = 10;
const DEFAULT_AVATAR_SIZE: u32 = 96;
const DEFAULT_POSITION: &str = "bottom-left";
const DEFAULT_PRIMARY_COLOR: &str = "#667eea";
const DEFAULT_VERIFICATION_TEXT: &str = "Verified by Google";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Csv,
    /// gviz JSON-P (`tqx=out:json`)
    Json,
}

impl FromStr for FeedFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" | "jsonp" | "gviz" => Ok(Self::Json),
            other => Err(anyhow!("unknown feed format: {}", other)),
        }
    }
}

impl FeedFormat {
    pub fn as_tqx(&self) -> &'static str {
        match self {
            Self::Csv => "out:csv",
            Self::Json => "out:json",
        }
    }
}

#[derive(Clone, Debug)]
pub struct WidgetConfig {
    pub spreadsheet_id: Option<String>,
    pub sheet_gid: String,
    pub feed_format: FeedFormat,
    pub display_duration: Duration,
    pub delay_between: Duration,
    pub initial_delay: Duration,
    pub probe_timeout: Duration,
    pub max_notifications: usize,
    pub hide_after: u32,
    pub avatar_size: u32,
    // Presentation only, handed to the host untouched.
    pub position: String,
    pub primary_color: String,
    pub show_verification: bool,
    pub verification_text: String,
    pub show_time_ago: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            sheet_gid: "0".to_string(),
            feed_format: FeedFormat::Csv,
            display_duration: Duration::from_millis(DEFAULT_DISPLAY_DURATION_MS),
            delay_between: Duration::from_millis(DEFAULT_DELAY_BETWEEN_MS),
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            max_notifications: DEFAULT_MAX_NOTIFICATIONS,
            hide_after: DEFAULT_HIDE_AFTER,
            avatar_size: DEFAULT_AVATAR_SIZE,
            position: DEFAULT_POSITION.to_string(),
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            show_verification: true,
            verification_text: DEFAULT_VERIFICATION_TEXT.to_string(),
            show_time_ago: true,
        }
    }
}

impl WidgetConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            spreadsheet_id: std::env::var("SPW_SPREADSHEET_ID")
                .ok()
                .filter(|value| !value.trim().is_empty()),
            sheet_gid: env_or("SPW_SHEET_GID", "0"),
            feed_format: env_or_parse("SPW_FEED_FORMAT", "csv")?,
            display_duration: env_millis("SPW_DISPLAY_DURATION_MS", DEFAULT_DISPLAY_DURATION_MS)?,
            delay_between: env_millis("SPW_DELAY_BETWEEN_MS", DEFAULT_DELAY_BETWEEN_MS)?,
            initial_delay: env_millis("SPW_INITIAL_DELAY_MS", DEFAULT_INITIAL_DELAY_MS)?,
            probe_timeout: env_millis("SPW_PROBE_TIMEOUT_MS", DEFAULT_PROBE_TIMEOUT_MS)?,
            max_notifications: env_or_parse("SPW_MAX_NOTIFICATIONS", "5")?,
            hide_after: env_or_parse("SPW_HIDE_AFTER", "10")?,
            avatar_size: env_or_parse("SPW_AVATAR_SIZE", "96")?,
            position: env_or("SPW_POSITION", DEFAULT_POSITION),
            primary_color: env_or("SPW_PRIMARY_COLOR", DEFAULT_PRIMARY_COLOR),
            show_verification: env_or_parse("SPW_SHOW_VERIFICATION", "true")?,
            verification_text: env_or("SPW_VERIFICATION_TEXT", DEFAULT_VERIFICATION_TEXT),
            show_time_ago: env_or_parse("SPW_SHOW_TIME_AGO", "true")?,
        })
    }

    /// Build from script-tag data attributes (`data-display-duration` is
    /// passed as `display-duration`). Numbers that fail to parse, or are zero,
    /// keep their defaults. Flags are on unless exactly `"false"`.
    pub fn from_attributes(attributes: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| {
            attributes
                .get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
        };
        let millis = |key: &str, default: Duration| {
            lenient_number::<u64>(get(key))
                .map(Duration::from_millis)
                .unwrap_or(default)
        };
        let flag = |key: &str| get(key) != Some("false");

        Self {
            spreadsheet_id: get("spreadsheet-id").map(str::to_string),
            sheet_gid: get("sheet-gid").unwrap_or("0").to_string(),
            feed_format: get("feed-format")
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.feed_format),
            display_duration: millis("display-duration", defaults.display_duration),
            delay_between: millis("delay-between", defaults.delay_between),
            initial_delay: millis("initial-delay", defaults.initial_delay),
            probe_timeout: millis("probe-timeout", defaults.probe_timeout),
            max_notifications: lenient_number(get("max-notifications"))
                .unwrap_or(defaults.max_notifications),
            hide_after: lenient_number(get("hide-after")).unwrap_or(defaults.hide_after),
            avatar_size: lenient_number(get("avatar-size")).unwrap_or(defaults.avatar_size),
            position: get("position").unwrap_or(DEFAULT_POSITION).to_string(),
            primary_color: get("primary-color")
                .unwrap_or(DEFAULT_PRIMARY_COLOR)
                .to_string(),
            show_verification: flag("show-verification"),
            verification_text: get("verification-text")
                .unwrap_or(DEFAULT_VERIFICATION_TEXT)
                .to_string(),
            show_time_ago: flag("show-time-ago"),
        }
    }
}

fn lenient_number<T>(value: Option<&str>) -> Option<T>
where
    T: FromStr + PartialEq + Default,
{
    value
        .and_then(|value| value.parse::<T>().ok())
        .filter(|parsed| *parsed != T::default())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
    value
        .parse::<T>()
        .map_err(|err| anyhow!("invalid {}: {}", key, err))
}

fn env_millis(key: &str, default: u64) -> Result<Duration> {
    env_or_parse::<u64>(key, &default.to_string()).map(Duration::from_millis)
}
