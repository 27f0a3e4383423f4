use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::app::hash::email_hash;
use crate::config::WidgetConfig;
use crate::domain::avatar::{initial_for, AvatarResolution};
use crate::domain::notification::NotificationRecord;
use crate::error::WidgetError;

const HASH_AVATAR_BASE: &str = "https://www.gravatar.com/avatar/";

/// What came back from loading an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Loaded,
    Failed,
    TimedOut,
}

/// Attempts to load an image, reporting whether it is usable.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn probe(&self, url: &Url) -> ProbeOutcome;
}

#[derive(Debug, Clone)]
pub struct AvatarSettings {
    pub hash_avatar_base: Url,
    pub size: u32,
    pub probe_timeout: Duration,
}

impl AvatarSettings {
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self {
            size: config.avatar_size,
            probe_timeout: config.probe_timeout,
            ..Self::default()
        }
    }
}

impl Default for AvatarSettings {
    fn default() -> Self {
        Self {
            hash_avatar_base: Url::parse(HASH_AVATAR_BASE).expect("static url is valid"),
            size: 96,
            probe_timeout: Duration::from_secs(3),
        }
    }
}

#[derive(Clone)]
pub struct AvatarResolver {
    probe: Arc<dyn ImageProbe>,
    settings: AvatarSettings,
}

impl AvatarResolver {
    pub fn new(probe: Arc<dyn ImageProbe>, settings: AvatarSettings) -> Self {
        Self { probe, settings }
    }

    pub fn settings(&self) -> &AvatarSettings {
        &self.settings
    }

    /// Pick an avatar for `record`. Hash avatar, then emoji, then image URL,
    /// then the name's initial. Never fails.
    pub async fn resolve(&self, record: &NotificationRecord) -> AvatarResolution {
        let fallback_initial = initial_for(&record.name);

        if let Some(email) = record.email.as_deref().filter(|email| email.contains('@')) {
            let hash = email_hash(email);
            match self.hash_avatar_url(&hash) {
                Some(url) => match self.load(&url).await {
                    Ok(()) => {
                        return AvatarResolution::HashAvatarUrl {
                            hash,
                            url,
                            fallback_initial,
                        }
                    }
                    Err(err) => tracing::debug!(error = %err, "hash avatar unavailable"),
                },
                None => tracing::warn!(hash = %hash, "could not build hash avatar url"),
            }
        }

        if let Some(picture) = record.picture.as_deref().map(str::trim) {
            if is_emoji(picture) {
                return AvatarResolution::Emoji(picture.to_string());
            }

            if let Some(url) = parse_image_url(picture) {
                match self.load(&url).await {
                    Ok(()) => {
                        return AvatarResolution::ImageUrl {
                            url,
                            fallback_initial,
                        }
                    }
                    Err(err) => tracing::debug!(error = %err, "picture unavailable"),
                }
            }
        }

        AvatarResolution::Initial(fallback_initial)
    }

    /// `{base}{hash}?s={size}&d=404`; `d=404` makes a missing profile image a
    /// probe failure instead of a generic placeholder.
    pub fn hash_avatar_url(&self, hash: &str) -> Option<Url> {
        let mut url = self.settings.hash_avatar_base.join(hash).ok()?;
        url.query_pairs_mut()
            .append_pair("s", &self.settings.size.to_string())
            .append_pair("d", "404");
        Some(url)
    }

    async fn load(&self, url: &Url) -> Result<(), WidgetError> {
        let outcome = tokio::time::timeout(self.settings.probe_timeout, self.probe.probe(url))
            .await
            .unwrap_or(ProbeOutcome::TimedOut);

        match outcome {
            ProbeOutcome::Loaded => Ok(()),
            ProbeOutcome::Failed => Err(WidgetError::AvatarProbeFailed {
                url: url.to_string(),
                reason: "load error",
            }),
            ProbeOutcome::TimedOut => Err(WidgetError::AvatarProbeFailed {
                url: url.to_string(),
                reason: "timed out",
            }),
        }
    }
}

fn parse_image_url(value: &str) -> Option<Url> {
    Url::parse(value)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
}

/// A single pictographic glyph, possibly a ZWJ sequence, with optional
/// variation selectors and skin-tone modifiers, or a regional-indicator flag.
pub fn is_emoji(value: &str) -> bool {
    let value = value.trim();
    let mut chars = value.chars();
    let first = match chars.next() {
        Some(first) => first,
        None => return false,
    };

    if is_regional_indicator(first) {
        return matches!(
            (chars.next(), chars.next()),
            (Some(second), None) if is_regional_indicator(second)
        );
    }

    if !is_pictographic(first) {
        return false;
    }

    let mut after_joiner = false;
    for ch in chars {
        match ch {
            '\u{200D}' => {
                if after_joiner {
                    return false;
                }
                after_joiner = true;
            }
            '\u{FE0E}' | '\u{FE0F}' | '\u{1F3FB}'..='\u{1F3FF}' if !after_joiner => {}
            ch if after_joiner && is_pictographic(ch) => after_joiner = false,
            _ => return false,
        }
    }

    !after_joiner
}

fn is_pictographic(ch: char) -> bool {
    matches!(
        ch,
        '\u{1F300}'..='\u{1F5FF}'
            | '\u{1F600}'..='\u{1F64F}'
            | '\u{1F680}'..='\u{1F6FF}'
            | '\u{1F900}'..='\u{1F9FF}'
            | '\u{1FA70}'..='\u{1FAFF}'
            | '\u{2600}'..='\u{26FF}'
            | '\u{2700}'..='\u{27BF}'
            | '\u{2B50}'
    )
}

fn is_regional_indicator(ch: char) -> bool {
    matches!(ch, '\u{1F1E6}'..='\u{1F1FF}')
}
