//! The look-ahead beat scheduler.
//!
//! A coarse 25ms poll decides *what* to schedule; the times it hands to the
//! sound trigger are computed purely in output-clock seconds, so playback
//! stays sample-accurate no matter how unevenly the poll fires. Each pass
//! queues every beat falling inside the look-ahead window, re-reading the
//! configuration per beat so live edits land at the next beat boundary.

use std::thread;
use std::time::Duration;

use crate::config::{ConfigStore, MetronomeConfig};
use crate::engine::{OutputClock, PlaybackState, SoundTrigger};

/// How far ahead of the output clock beats are queued. Large enough to ride
/// out a late poll, small enough that a stop never leaves more than a
/// window's worth of queued sound.
pub const LOOK_AHEAD_SECS: f64 = 0.1;

/// Poll period of the scheduling loop.
pub const TICK_INTERVAL: Duration = Duration::from_millis(25);

/// Lead applied to the very first beat so it is never scheduled at the
/// clock's exact current position, which some backends drop.
const START_LEAD_SECS: f64 = 0.05;

/// Rolling playback state for one continuous run.
///
/// Owned by whatever drives the tick cadence: [`Metronome`] hands it to its
/// scheduler thread, tests and embedders with their own timer call
/// [`pass`](SchedulerCore::pass) directly. Recreated on every start; nothing
/// here survives a stop.
///
/// [`Metronome`]: crate::engine::Metronome
pub struct SchedulerCore {
    /// Output-clock time of the next beat to schedule.
    next_beat_time: f64,
    /// Beats scheduled since playback start.
    beat_index: u64,
    /// 0-based measure counter.
    measure: u64,
    /// Measure at which the last tempo-ramp step was committed.
    last_ramp_measure: u64,
}

impl SchedulerCore {
    /// Reset rolling state and fire beat 0 just ahead of the clock.
    ///
    /// Beat 0 goes out immediately (measure 0 is audible for any valid
    /// silent-practice cycle, but the cycle is still consulted) and the
    /// next beat is lined up one interval later.
    pub fn start(
        clock: &dyn OutputClock,
        trigger: &dyn SoundTrigger,
        store: &ConfigStore,
        state: &PlaybackState,
    ) -> Self {
        let config = store.snapshot();
        let first_beat = clock.now() + START_LEAD_SECS;

        let silenced = config.silent.is_silent_measure(0);
        if !silenced {
            fire(trigger, &config, 0, first_beat);
        }
        state.publish_beat(0, 0, silenced);

        SchedulerCore {
            next_beat_time: first_beat + config.time_signature.beat_interval(config.bpm),
            beat_index: 1,
            measure: 0,
            last_ramp_measure: 0,
        }
    }

    /// One look-ahead pass: queue every beat due inside the window.
    ///
    /// The configuration is re-read from the store for every beat, so a
    /// tempo or signature change mid-measure shapes the very next interval.
    /// Measure boundaries evaluate the tempo ramp before the silence cycle;
    /// a committed ramp step already applies to the interval that follows
    /// the boundary beat.
    pub fn pass(
        &mut self,
        clock: &dyn OutputClock,
        trigger: &dyn SoundTrigger,
        store: &ConfigStore,
        state: &PlaybackState,
    ) {
        let horizon = clock.now() + LOOK_AHEAD_SECS;
        while self.next_beat_time < horizon {
            let mut config = store.snapshot();
            let beats_per_measure = config.time_signature.beat_count() as u64;
            let beat_in_measure = (self.beat_index % beats_per_measure) as usize;

            if beat_in_measure == 0 && self.beat_index > 0 {
                self.measure += 1;
                if config.tempo_ramp.enabled
                    && self.measure - self.last_ramp_measure
                        >= u64::from(config.tempo_ramp.every_bars)
                {
                    self.last_ramp_measure = self.measure;
                    if let Some(bpm) = store.commit_ramp_step() {
                        log::debug!("tempo ramp: {bpm} bpm at measure {}", self.measure);
                        config.bpm = bpm;
                    }
                }
            }

            let silenced = config.silent.is_silent_measure(self.measure);
            if !silenced {
                fire(trigger, &config, beat_in_measure, self.next_beat_time);
            }
            state.publish_beat(beat_in_measure as i32, self.measure, silenced);

            self.next_beat_time += config.time_signature.beat_interval(config.bpm);
            self.beat_index += 1;
        }
    }
}

fn fire(trigger: &dyn SoundTrigger, config: &MetronomeConfig, beat: usize, when: f64) {
    if config.beat_pattern.is_empty() {
        return;
    }
    // The store heals pattern length on every update; modulo keeps a
    // stale read in range.
    let accent = config.beat_pattern[beat % config.beat_pattern.len()];
    if accent.is_audible() {
        trigger.trigger(accent, when);
    }
}

/// Tick loop run by the scheduler thread until the playing flag drops.
pub(crate) fn run(
    mut core: SchedulerCore,
    store: &ConfigStore,
    clock: &dyn OutputClock,
    trigger: &dyn SoundTrigger,
    state: &PlaybackState,
) {
    while state.is_playing() {
        core.pass(clock, trigger, store, state);
        thread::sleep(TICK_INTERVAL);
    }
}
