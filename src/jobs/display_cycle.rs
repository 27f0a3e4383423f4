use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::app::presenter::Presenter;
use crate::config::WidgetConfig;
use crate::domain::notification::NotificationRecord;
use crate::domain::schedule::{Phase, ScheduleState, Tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTiming {
    pub initial_delay: Duration,
    pub display_duration: Duration,
    pub delay_between: Duration,
    /// Total displays before the cycle stops for good.
    pub hide_after: u32,
}

impl CycleTiming {
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self {
            initial_delay: config.initial_delay,
            display_duration: config.display_duration,
            delay_between: config.delay_between,
            hide_after: config.hide_after,
        }
    }
}

/// Drives the show/hide cycle for one widget. At most one timer task is alive
/// at a time; `start`, `stop` and drop cancel the previous one by aborting its
/// handle.
pub struct DisplayScheduler {
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

struct Shared {
    notifications: Vec<NotificationRecord>,
    timing: CycleTiming,
    presenter: Presenter,
    cursor: Mutex<Cursor>,
    phase_tx: watch::Sender<Phase>,
}

struct Cursor {
    state: ScheduleState,
    /// Bumped by every start and stop; a task holding an older value is
    /// superseded and must not touch the state or the target.
    generation: u64,
}

impl DisplayScheduler {
    pub fn new(notifications: Vec<NotificationRecord>, timing: CycleTiming, presenter: Presenter) -> Self {
        let (phase_tx, _) = watch::channel(Phase::Idle);
        Self {
            shared: Arc::new(Shared {
                notifications,
                timing,
                presenter,
                cursor: Mutex::new(Cursor {
                    state: ScheduleState::default(),
                    generation: 0,
                }),
                phase_tx,
            }),
            task: Mutex::new(None),
        }
    }

    pub fn notifications(&self) -> &[NotificationRecord] {
        &self.shared.notifications
    }

    pub fn timing(&self) -> CycleTiming {
        self.shared.timing
    }

    pub fn state(&self) -> ScheduleState {
        self.shared.lock_cursor().state
    }

    /// Phase changes as they happen.
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.shared.phase_tx.subscribe()
    }

    /// Begin a fresh cycle from the first record after the initial delay.
    /// Does nothing when there are no notifications. Must be called inside a
    /// tokio runtime.
    pub fn start(&self) {
        if self.shared.notifications.is_empty() {
            debug!("no notifications to display, not starting");
            return;
        }

        let mut task = self.lock_task();
        if let Some(previous) = task.take() {
            previous.abort();
        }

        let generation = self.shared.begin();
        let shared = Arc::clone(&self.shared);
        *task = Some(tokio::spawn(run(shared, generation)));

        debug!(
            notifications = self.shared.notifications.len(),
            hide_after = self.shared.timing.hide_after,
            "display cycle started"
        );
    }

    /// Reset the display budget and start over.
    pub fn restart(&self) {
        info!("restarting display cycle");
        self.start();
    }

    /// Cancel the pending timer and any in-flight avatar probe. Safe to call
    /// repeatedly.
    pub fn stop(&self) {
        if let Some(task) = self.lock_task().take() {
            task.abort();
        }

        if self.shared.cancel() {
            debug!("display cycle stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock_task()
            .as_ref()
            .map_or(false, |task| !task.is_finished())
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for DisplayScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.lock_task().take() {
            task.abort();
        }
    }
}

impl Shared {
    fn lock_cursor(&self) -> MutexGuard<'_, Cursor> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> u64 {
        let mut cursor = self.lock_cursor();
        cursor.generation += 1;
        cursor.state.reset();
        self.phase_tx.send_replace(cursor.state.phase);
        cursor.generation
    }

    fn cancel(&self) -> bool {
        let mut cursor = self.lock_cursor();
        cursor.generation += 1;
        let stopped = cursor.state.stop();
        self.phase_tx.send_replace(cursor.state.phase);
        stopped
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock_cursor().generation == generation
    }

    /// Apply `change` if `generation` is still current.
    fn update<R>(&self, generation: u64, change: impl FnOnce(&mut ScheduleState) -> R) -> Option<R> {
        let mut cursor = self.lock_cursor();
        if cursor.generation != generation {
            return None;
        }
        let result = change(&mut cursor.state);
        self.phase_tx.send_replace(cursor.state.phase);
        Some(result)
    }
}

async fn run(shared: Arc<Shared>, generation: u64) {
    let timing = shared.timing;
    let len = shared.notifications.len();

    tokio::time::sleep(timing.initial_delay).await;

    loop {
        let tick = match shared.update(generation, |state| state.tick(len, timing.hide_after)) {
            Some(tick) => tick,
            None => return,
        };

        let index = match tick {
            Tick::Show(index) => index,
            Tick::Stop => {
                info!(displayed = timing.hide_after, "display limit reached, suspending widget");
                match panic::catch_unwind(AssertUnwindSafe(|| shared.presenter.suspend())) {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => warn!(error = ?err, "failed to suspend widget"),
                    Err(payload) => warn!(panic = panic_message(&*payload), "render target panicked while suspending"),
                }
                return;
            }
        };

        let record = &shared.notifications[index];
        debug!(index, name = %record.name, "showing notification");
        let rendered = AssertUnwindSafe(shared.presenter.present(record, || shared.is_current(generation)))
            .catch_unwind()
            .await;
        match rendered {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(error = ?err, index, "failed to render notification"),
            Err(payload) => warn!(panic = panic_message(&*payload), index, "render target panicked while showing"),
        }

        tokio::time::sleep(timing.display_duration).await;

        if shared.update(generation, ScheduleState::hide).is_none() {
            return;
        }
        match panic::catch_unwind(AssertUnwindSafe(|| shared.presenter.dismiss())) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(error = ?err, index, "failed to hide notification"),
            Err(payload) => warn!(panic = panic_message(&*payload), index, "render target panicked while hiding"),
        }

        tokio::time::sleep(timing.delay_between).await;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
