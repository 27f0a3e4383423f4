use std::sync::Arc;

use tokio::sync::watch;
use uuid::Uuid;

use crate::app::avatar::{AvatarResolver, AvatarSettings, ImageProbe};
use crate::app::feed::{FeedService, FeedSource};
use crate::app::presenter::{Presenter, RenderTarget};
use crate::app::theme::Presentation;
use crate::config::WidgetConfig;
use crate::domain::notification::NotificationRecord;
use crate::domain::schedule::{Phase, ScheduleState};
use crate::jobs::display_cycle::{CycleTiming, DisplayScheduler};

/// One embedded widget: its own feed, render target and display cycle.
/// Instances share nothing, so several can live on the same page.
pub struct Widget {
    id: Uuid,
    config: WidgetConfig,
    feed: FeedService,
    presenter: Presenter,
    scheduler: Option<DisplayScheduler>,
}

impl Widget {
    pub fn new(
        config: WidgetConfig,
        source: Arc<dyn FeedSource>,
        probe: Arc<dyn ImageProbe>,
        target: Arc<dyn RenderTarget>,
    ) -> Self {
        let resolver = AvatarResolver::new(probe, AvatarSettings::from_config(&config));
        let presenter = Presenter::new(target, resolver, config.show_time_ago);
        let feed = FeedService::new(source, config.max_notifications);

        Self {
            id: Uuid::new_v4(),
            config,
            feed,
            presenter,
            scheduler: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Element id for this instance's container.
    pub fn container_id(&self) -> String {
        format!("spw-{}", self.id.simple())
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn presentation(&self) -> Presentation {
        Presentation::from_config(&self.config)
    }

    /// Load notifications and start the display cycle. Replaces any cycle
    /// from an earlier call. Returns how many notifications were loaded.
    pub async fn init(&mut self) -> usize {
        self.destroy();

        let notifications = self.feed.load().await;
        let count = notifications.len();
        tracing::info!(widget = %self.id, notifications = count, "widget initialized");

        let scheduler = DisplayScheduler::new(
            notifications,
            CycleTiming::from_config(&self.config),
            self.presenter.clone(),
        );
        scheduler.start();
        self.scheduler = Some(scheduler);
        count
    }

    pub fn notifications(&self) -> &[NotificationRecord] {
        self.scheduler
            .as_ref()
            .map(DisplayScheduler::notifications)
            .unwrap_or(&[])
    }

    pub fn state(&self) -> ScheduleState {
        self.scheduler
            .as_ref()
            .map(DisplayScheduler::state)
            .unwrap_or_default()
    }

    pub fn subscribe(&self) -> Option<watch::Receiver<Phase>> {
        self.scheduler.as_ref().map(DisplayScheduler::subscribe)
    }

    pub fn restart(&self) {
        if let Some(scheduler) = &self.scheduler {
            scheduler.restart();
        }
    }

    pub fn stop(&self) {
        if let Some(scheduler) = &self.scheduler {
            scheduler.stop();
        }
    }

    /// Stop the cycle and drop the loaded notifications.
    pub fn destroy(&mut self) {
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.stop();
            tracing::debug!(widget = %self.id, "widget destroyed");
        }
    }
}
