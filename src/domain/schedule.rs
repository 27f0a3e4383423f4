use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Showing,
    Hidden,
    Stopped,
}

/// Outcome of one cycle tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Display the record at this index.
    Show(usize),
    /// The display budget is spent.
    Stop,
}

/// Cursor over the notification list. `display_count` never exceeds the
/// `hide_after` limit passed to [`ScheduleState::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleState {
    pub current_index: usize,
    pub display_count: u32,
    pub phase: Phase,
}

impl Default for ScheduleState {
    fn default() -> Self {
        Self {
            current_index: 0,
            display_count: 0,
            phase: Phase::Idle,
        }
    }
}

impl ScheduleState {
    pub fn visible(&self) -> bool {
        self.phase == Phase::Showing
    }

    pub fn is_stopped(&self) -> bool {
        self.phase == Phase::Stopped
    }

    pub fn tick(&mut self, len: usize, hide_after: u32) -> Tick {
        if self.phase == Phase::Stopped || len == 0 || self.display_count >= hide_after {
            self.phase = Phase::Stopped;
            return Tick::Stop;
        }

        let index = self.current_index % len;
        self.phase = Phase::Showing;
        self.current_index = (index + 1) % len;
        self.display_count += 1;
        Tick::Show(index)
    }

    /// Returns false when nothing was showing.
    pub fn hide(&mut self) -> bool {
        if self.phase != Phase::Showing {
            return false;
        }
        self.phase = Phase::Hidden;
        true
    }

    /// Returns false when already stopped.
    pub fn stop(&mut self) -> bool {
        if self.phase == Phase::Stopped {
            return false;
        }
        self.phase = Phase::Stopped;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
