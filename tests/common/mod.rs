#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::watch;
use url::Url;

use social_proof::app::avatar::{AvatarResolver, AvatarSettings, ImageProbe, ProbeOutcome};
use social_proof::app::feed::FeedSource;
use social_proof::app::presenter::{Presenter, RenderTarget};
use social_proof::domain::notification::RawRow;
use social_proof::domain::schedule::Phase;
use social_proof::{AvatarResolution, NotificationRecord, WidgetError};

// ---------------------------------------------------------------------------
// RecordingTarget: remembers every call the widget makes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Message(String),
    Avatar(AvatarResolution),
    TimeLabel(String),
    Show,
    Hide,
    Suspend,
}

#[derive(Default)]
pub struct RecordingTarget {
    events: Mutex<Vec<RenderEvent>>,
    fail_messages: AtomicBool,
    panic_messages: AtomicBool,
}

impl RecordingTarget {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A target whose `set_message` always errors.
    pub fn failing() -> Arc<Self> {
        let target = Self::default();
        target.fail_messages.store(true, Ordering::SeqCst);
        Arc::new(target)
    }

    /// A target whose `set_message` always panics.
    pub fn panicking() -> Arc<Self> {
        let target = Self::default();
        target.panic_messages.store(true, Ordering::SeqCst);
        Arc::new(target)
    }

    pub fn events(&self) -> Vec<RenderEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RenderEvent::Message(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn avatars(&self) -> Vec<AvatarResolution> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RenderEvent::Avatar(avatar) => Some(avatar),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &RenderEvent) -> usize {
        self.events().iter().filter(|event| *event == wanted).count()
    }

    fn record(&self, event: RenderEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl RenderTarget for RecordingTarget {
    fn set_message(&self, text: &str) -> Result<()> {
        self.record(RenderEvent::Message(text.to_string()));
        if self.fail_messages.load(Ordering::SeqCst) {
            return Err(anyhow!("message element missing"));
        }
        if self.panic_messages.load(Ordering::SeqCst) {
            panic!("message element detached");
        }
        Ok(())
    }

    fn set_avatar(&self, avatar: &AvatarResolution) -> Result<()> {
        self.record(RenderEvent::Avatar(avatar.clone()));
        Ok(())
    }

    fn set_time_label(&self, text: &str) -> Result<()> {
        self.record(RenderEvent::TimeLabel(text.to_string()));
        Ok(())
    }

    fn show(&self) -> Result<()> {
        self.record(RenderEvent::Show);
        Ok(())
    }

    fn hide(&self) -> Result<()> {
        self.record(RenderEvent::Hide);
        Ok(())
    }

    fn suspend(&self) -> Result<()> {
        self.record(RenderEvent::Suspend);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ScriptedProbe: answers image loads without a network
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeBehavior {
    Load,
    Fail,
    /// Never answers; the resolver's timeout has to kick in.
    Hang,
}

pub struct ScriptedProbe {
    default: ProbeBehavior,
    by_host: HashMap<String, ProbeBehavior>,
    calls: Mutex<Vec<Url>>,
}

impl ScriptedProbe {
    pub fn always(behavior: ProbeBehavior) -> Arc<Self> {
        Arc::new(Self {
            default: behavior,
            by_host: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Per-host behavior, `default` for everything else.
    pub fn by_host(default: ProbeBehavior, hosts: &[(&str, ProbeBehavior)]) -> Arc<Self> {
        Arc::new(Self {
            default,
            by_host: hosts
                .iter()
                .map(|(host, behavior)| (host.to_string(), *behavior))
                .collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Url> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageProbe for ScriptedProbe {
    async fn probe(&self, url: &Url) -> ProbeOutcome {
        self.calls.lock().unwrap().push(url.clone());
        let behavior = url
            .host_str()
            .and_then(|host| self.by_host.get(host))
            .copied()
            .unwrap_or(self.default);

        match behavior {
            ProbeBehavior::Load => ProbeOutcome::Loaded,
            ProbeBehavior::Fail => ProbeOutcome::Failed,
            ProbeBehavior::Hang => std::future::pending().await,
        }
    }
}

// ---------------------------------------------------------------------------
// StaticFeed: canned feed rows or a canned failure
// ---------------------------------------------------------------------------

pub struct StaticFeed {
    rows: Option<Vec<RawRow>>,
}

impl StaticFeed {
    pub fn rows(rows: Vec<RawRow>) -> Arc<Self> {
        Arc::new(Self { rows: Some(rows) })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self { rows: None })
    }
}

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch_rows(&self) -> Result<Vec<RawRow>, WidgetError> {
        self.rows
            .clone()
            .ok_or_else(|| WidgetError::feed("connection refused"))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn row(pairs: &[(&str, &str)]) -> RawRow {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

pub fn record(name: &str) -> NotificationRecord {
    NotificationRecord::new(name, "Springfield", "Widget Pro")
}

pub fn resolver(probe: Arc<dyn ImageProbe>) -> AvatarResolver {
    AvatarResolver::new(probe, AvatarSettings::default())
}

pub fn presenter(target: Arc<RecordingTarget>, show_time_ago: bool) -> Presenter {
    Presenter::new(
        target,
        resolver(ScriptedProbe::always(ProbeBehavior::Fail)),
        show_time_ago,
    )
}

/// Wait (on the paused test clock) until the cycle reaches `Stopped`.
pub async fn wait_until_stopped(mut phases: watch::Receiver<Phase>) {
    tokio::time::timeout(
        Duration::from_secs(3_600),
        phases.wait_for(|phase| *phase == Phase::Stopped),
    )
    .await
    .expect("display cycle did not stop")
    .expect("scheduler dropped");
}
