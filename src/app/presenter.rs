use std::sync::Arc;

use anyhow::{Context, Result};
use time::OffsetDateTime;

use crate::app::avatar::AvatarResolver;
use crate::app::time_ago::format_time_ago;
use crate::domain::avatar::AvatarResolution;
use crate::domain::notification::NotificationRecord;

/// The single notification surface a widget draws on.
pub trait RenderTarget: Send + Sync {
    fn set_message(&self, text: &str) -> Result<()>;
    fn set_avatar(&self, avatar: &AvatarResolution) -> Result<()>;
    fn set_time_label(&self, text: &str) -> Result<()>;
    fn show(&self) -> Result<()>;
    fn hide(&self) -> Result<()>;
    /// Take the whole container off the page once the cycle is over.
    fn suspend(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct Presenter {
    target: Arc<dyn RenderTarget>,
    resolver: AvatarResolver,
    show_time_ago: bool,
}

impl Presenter {
    pub fn new(target: Arc<dyn RenderTarget>, resolver: AvatarResolver, show_time_ago: bool) -> Self {
        Self {
            target,
            resolver,
            show_time_ago,
        }
    }

    pub fn target(&self) -> &Arc<dyn RenderTarget> {
        &self.target
    }

    /// Fill the surface with `record` and make it visible. `is_current` is
    /// checked once the avatar is resolved; when it returns false the
    /// notification is abandoned before the avatar or `show` reach the target.
    pub async fn present<F>(&self, record: &NotificationRecord, is_current: F) -> Result<()>
    where
        F: Fn() -> bool + Send,
    {
        self.target
            .set_message(&record.message())
            .context("failed to set message")?;

        if self.show_time_ago {
            let label = format_time_ago(record.timestamp.as_deref(), OffsetDateTime::now_utc());
            self.target
                .set_time_label(&label)
                .context("failed to set time label")?;
        }

        let avatar = self.resolver.resolve(record).await;
        tracing::debug!(name = %record.name, avatar = avatar.kind(), "avatar resolved");
        if !is_current() {
            tracing::debug!(name = %record.name, "display cancelled while resolving avatar");
            return Ok(());
        }

        self.target
            .set_avatar(&avatar)
            .context("failed to set avatar")?;

        self.target.show().context("failed to show notification")
    }

    pub fn dismiss(&self) -> Result<()> {
        self.target.hide().context("failed to hide notification")
    }

    pub fn suspend(&self) -> Result<()> {
        self.target.suspend().context("failed to suspend widget")
    }
}
