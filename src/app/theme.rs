use serde::Serialize;

use crate::config::WidgetConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    BottomLeft,
    BottomRight,
    TopLeft,
    TopRight,
}

impl Position {
    /// Unknown values land bottom-left.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "bottom-right" => Self::BottomRight,
            "top-left" => Self::TopLeft,
            "top-right" => Self::TopRight,
            _ => Self::BottomLeft,
        }
    }

    pub fn css_offsets(&self) -> &'static str {
        match self {
            Self::BottomLeft => "bottom: 20px; left: 20px;",
            Self::BottomRight => "bottom: 20px; right: 20px;",
            Self::TopLeft => "top: 20px; left: 20px;",
            Self::TopRight => "top: 20px; right: 20px;",
        }
    }
}

/// Display settings the core never interprets, handed to the host as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presentation {
    pub position: Position,
    pub primary_color: String,
    pub secondary_color: Option<String>,
    pub show_verification: bool,
    pub verification_text: String,
    pub show_time_ago: bool,
}

impl Presentation {
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self {
            position: Position::parse(&config.position),
            primary_color: config.primary_color.clone(),
            secondary_color: secondary_color(&config.primary_color),
            show_verification: config.show_verification,
            verification_text: config.verification_text.clone(),
            show_time_ago: config.show_time_ago,
        }
    }
}

/// Darker companion shade for a `#rrggbb` color, used for gradients.
pub fn secondary_color(primary: &str) -> Option<String> {
    let hex = primary.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    let (red, green, blue) = (channel(0..2)?, channel(2..4)?, channel(4..6)?);

    let scale = |value: u8, factor: f64| (f64::from(value) * factor).round().clamp(0.0, 255.0) as u8;
    Some(format!(
        "#{:02x}{:02x}{:02x}",
        scale(red, 0.8),
        scale(green, 0.8 * 0.9),
        scale(blue, 0.8 * 1.1)
    ))
}
