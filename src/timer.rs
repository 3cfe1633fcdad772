//! Practice session timer.
//!
//! Poll-driven: the owner calls [`PracticeTimer::tick`] on its own cadence
//! and reads the display whenever it redraws. No thread of its own.

use std::time::{Duration, Instant};

/// Display wraps back to zero after 9:59:59.
const WRAP_SECS: u64 = 36_000;

/// Timer direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// Count up from zero.
    Stopwatch,
    /// Count down from the target and latch when it runs out.
    Countdown,
}

/// Practice timer with stopwatch and countdown modes.
pub struct PracticeTimer {
    mode: TimerMode,
    target_minutes: u32,
    accumulated: Duration,
    started_at: Option<Instant>,
    finished: bool,
}

impl PracticeTimer {
    pub fn new() -> Self {
        Self {
            mode: TimerMode::Stopwatch,
            target_minutes: 30,
            accumulated: Duration::ZERO,
            started_at: None,
            finished: false,
        }
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    /// Switch modes; timing starts over in the new mode.
    pub fn set_mode(&mut self, mode: TimerMode) {
        self.mode = mode;
        self.reset();
    }

    pub fn target_minutes(&self) -> u32 {
        self.target_minutes
    }

    pub fn set_target_minutes(&mut self, minutes: u32) {
        self.target_minutes = minutes.clamp(1, 599);
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// True once a countdown has run out, until [`reset`](Self::reset).
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Start or resume. A finished countdown stays put until reset.
    pub fn start(&mut self) {
        if self.finished || self.started_at.is_some() {
            return;
        }
        self.started_at = Some(Instant::now());
    }

    /// Stop the clock, keeping the elapsed time.
    pub fn pause(&mut self) {
        if let Some(started_at) = self.started_at.take() {
            self.accumulated += started_at.elapsed();
        }
    }

    pub fn toggle(&mut self) {
        if self.is_running() {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Clear elapsed time and the finished latch; leaves the timer stopped.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.started_at = None;
        self.finished = false;
    }

    /// Whole seconds on the clock, wrapped at ten hours.
    pub fn elapsed_secs(&self) -> u64 {
        let running = self
            .started_at
            .map(|started_at| started_at.elapsed())
            .unwrap_or(Duration::ZERO);
        (self.accumulated + running).as_secs() % WRAP_SECS
    }

    /// Seconds left on a countdown, floored at zero.
    pub fn remaining_secs(&self) -> u64 {
        let target = u64::from(self.target_minutes) * 60;
        target.saturating_sub(self.elapsed_secs())
    }

    /// Advance the finished latch. Returns true exactly once, on the poll
    /// where a running countdown hits zero.
    pub fn tick(&mut self) -> bool {
        if self.mode == TimerMode::Countdown
            && !self.finished
            && self.started_at.is_some()
            && self.remaining_secs() == 0
        {
            self.pause();
            self.finished = true;
            return true;
        }
        false
    }

    /// Clock face for the current mode.
    pub fn display(&self) -> String {
        let secs = match self.mode {
            TimerMode::Stopwatch => self.elapsed_secs(),
            TimerMode::Countdown => self.remaining_secs(),
        };
        format_secs(secs)
    }
}

impl Default for PracticeTimer {
    fn default() -> Self {
        Self::new()
    }
}

fn format_secs(total: u64) -> String {
    let hours = total / 3600;
    let minutes = total % 3600 / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}
