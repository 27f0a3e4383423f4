use std::sync::Mutex;

use anyhow::Result;
use tracing::info;

use crate::app::presenter::RenderTarget;
use crate::domain::avatar::AvatarResolution;

#[derive(Default)]
struct Surface {
    message: String,
    time_label: Option<String>,
    avatar: Option<AvatarResolution>,
}

/// Render target that writes each notification to the log. Used by the
/// binary in place of a page.
pub struct ConsoleTarget {
    container_id: String,
    surface: Mutex<Surface>,
}

impl ConsoleTarget {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            surface: Mutex::new(Surface::default()),
        }
    }

    fn with_surface<R>(&self, f: impl FnOnce(&mut Surface) -> R) -> R {
        let mut surface = self
            .surface
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut surface)
    }
}

impl RenderTarget for ConsoleTarget {
    fn set_message(&self, text: &str) -> Result<()> {
        self.with_surface(|surface| surface.message = text.to_string());
        Ok(())
    }

    fn set_avatar(&self, avatar: &AvatarResolution) -> Result<()> {
        self.with_surface(|surface| surface.avatar = Some(avatar.clone()));
        Ok(())
    }

    fn set_time_label(&self, text: &str) -> Result<()> {
        self.with_surface(|surface| surface.time_label = Some(text.to_string()));
        Ok(())
    }

    fn show(&self) -> Result<()> {
        self.with_surface(|surface| {
            let avatar = match &surface.avatar {
                Some(AvatarResolution::Emoji(glyph)) => glyph.clone(),
                Some(AvatarResolution::Initial(initial)) => initial.to_string(),
                Some(other) => other.url().map(|url| url.to_string()).unwrap_or_default(),
                None => String::new(),
            };
            info!(
                container = %self.container_id,
                avatar = %avatar,
                time = surface.time_label.as_deref().unwrap_or(""),
                "{}",
                surface.message
            );
        });
        Ok(())
    }

    fn hide(&self) -> Result<()> {
        self.with_surface(|surface| *surface = Surface::default());
        Ok(())
    }

    fn suspend(&self) -> Result<()> {
        info!(container = %self.container_id, "widget hidden");
        Ok(())
    }
}
