use serde::{Deserialize, Serialize};
use url::Url;

/// How a notification's avatar should be drawn. Derived per display, never
/// stored. Serializes as `{"kind": ..., "value": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AvatarResolution {
    Emoji(String),
    ImageUrl {
        url: Url,
        fallback_initial: char,
    },
    HashAvatarUrl {
        hash: String,
        url: Url,
        fallback_initial: char,
    },
    Initial(char),
}

impl AvatarResolution {
    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::ImageUrl { url, .. } | Self::HashAvatarUrl { url, .. } => Some(url),
            Self::Emoji(_) | Self::Initial(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Emoji(_) => "emoji",
            Self::ImageUrl { .. } => "image_url",
            Self::HashAvatarUrl { .. } => "hash_avatar_url",
            Self::Initial(_) => "initial",
        }
    }
}

/// Uppercase first character of a display name, `'?'` when empty.
pub fn initial_for(name: &str) -> char {
    name.trim()
        .chars()
        .next()
        .and_then(|first| first.to_uppercase().next())
        .unwrap_or('?')
}
