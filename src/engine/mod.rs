//! Playback engine: the collaborator seams, the look-ahead scheduler, and
//! the metronome facade that owns the tick thread.

mod scheduler;

pub use scheduler::{SchedulerCore, LOOK_AHEAD_SECS, TICK_INTERVAL};

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use thiserror::Error;

use crate::click::SoundType;
use crate::config::{ConfigStore, MetronomeConfig, SilentUpdate, TempoRampUpdate};
use crate::meter::{BeatAccent, TimeSignature};

/// Monotonic time source the scheduler plans beats against, in seconds.
///
/// The audio engine implements this as frames-rendered over sample rate;
/// tests implement it as a hand-advanced counter.
pub trait OutputClock: Send + Sync {
    /// Current clock position. Never moves backwards.
    fn now(&self) -> f64;

    /// Whether the clock is actually advancing. A clock backed by a dead
    /// audio stream reports false and `start()` refuses to run against it.
    fn is_ready(&self) -> bool {
        true
    }
}

/// Sink for scheduled clicks.
pub trait SoundTrigger: Send + Sync {
    /// Queue a click of the given accent at `when` on the output clock.
    ///
    /// The scheduler filters mute accents before calling; implementations
    /// ignore them anyway.
    fn trigger(&self, accent: BeatAccent, when: f64);
}

/// Why `start()` refused to run.
#[derive(Debug, Error)]
pub enum StartError {
    /// The output clock is not advancing (no audio backend, dead stream).
    #[error("audio output is not available")]
    OutputUnavailable,
}

/// UI-facing playback state, published by the scheduler and read anywhere.
///
/// `current_beat` is the position within the measure, or -1 while stopped.
pub struct PlaybackState {
    playing: AtomicBool,
    beat: AtomicI32,
    measure: AtomicU64,
    silenced: AtomicBool,
}

impl PlaybackState {
    pub fn new() -> Self {
        PlaybackState {
            playing: AtomicBool::new(false),
            beat: AtomicI32::new(-1),
            measure: AtomicU64::new(0),
            silenced: AtomicBool::new(false),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Beat index inside the current measure, -1 while stopped.
    pub fn current_beat(&self) -> i32 {
        self.beat.load(Ordering::Acquire)
    }

    pub fn current_measure(&self) -> u64 {
        self.measure.load(Ordering::Acquire)
    }

    /// Whether the measure being scheduled falls in a silent bar.
    pub fn is_silenced(&self) -> bool {
        self.silenced.load(Ordering::Acquire)
    }

    pub(crate) fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Release);
    }

    pub(crate) fn publish_beat(&self, beat: i32, measure: u64, silenced: bool) {
        self.beat.store(beat, Ordering::Release);
        self.measure.store(measure, Ordering::Release);
        self.silenced.store(silenced, Ordering::Release);
    }

    pub(crate) fn reset_stopped(&self) {
        self.beat.store(-1, Ordering::Release);
        self.measure.store(0, Ordering::Release);
        self.silenced.store(false, Ordering::Release);
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState::new()
    }
}

/// The metronome: configuration store, shared playback state, and the
/// scheduler thread while playing.
///
/// Construction wires in the two collaborators; playback is driven entirely
/// through [`start`](Metronome::start) / [`stop`](Metronome::stop) and the
/// configuration mutators, all of which are safe to call mid-playback.
pub struct Metronome {
    store: ConfigStore,
    state: Arc<PlaybackState>,
    clock: Arc<dyn OutputClock>,
    trigger: Arc<dyn SoundTrigger>,
    worker: Option<JoinHandle<()>>,
}

impl Metronome {
    pub fn new(clock: Arc<dyn OutputClock>, trigger: Arc<dyn SoundTrigger>) -> Self {
        Metronome::with_config(MetronomeConfig::default(), clock, trigger)
    }

    pub fn with_config(
        config: MetronomeConfig,
        clock: Arc<dyn OutputClock>,
        trigger: Arc<dyn SoundTrigger>,
    ) -> Self {
        Metronome {
            store: ConfigStore::new(config),
            state: Arc::new(PlaybackState::new()),
            clock,
            trigger,
            worker: None,
        }
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> MetronomeConfig {
        self.store.snapshot()
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Beat index inside the current measure, -1 while stopped.
    pub fn current_beat(&self) -> i32 {
        self.state.current_beat()
    }

    pub fn current_measure(&self) -> u64 {
        self.state.current_measure()
    }

    pub fn is_measure_silenced(&self) -> bool {
        self.state.is_silenced()
    }

    pub fn set_bpm(&self, bpm: u16) {
        self.store.set_bpm(bpm);
    }

    pub fn set_time_signature(&self, time_signature: TimeSignature) {
        self.store.set_time_signature(time_signature);
    }

    /// Cycle the accent at `index`. Panics on an out-of-range index.
    pub fn toggle_beat_accent(&self, index: usize) {
        self.store.toggle_beat_accent(index);
    }

    pub fn set_sound(&self, sound: SoundType) {
        self.store.set_sound(sound);
    }

    pub fn set_volume(&self, volume: u8) {
        self.store.set_volume(volume);
    }

    pub fn set_silent(&self, update: SilentUpdate) {
        self.store.set_silent(update);
    }

    pub fn set_tempo_ramp(&self, update: TempoRampUpdate) {
        self.store.set_tempo_ramp(update);
    }

    /// Replace the whole configuration (preset loading).
    pub fn apply_config(&self, config: MetronomeConfig) {
        self.store.apply(config);
    }

    /// Begin playback: fire beat 0 just ahead of the clock and hand the
    /// rolling state to a fresh scheduler thread. No-op when already
    /// playing. Fails if the output clock is not ready.
    pub fn start(&mut self) -> Result<(), StartError> {
        if self.worker.is_some() {
            return Ok(());
        }
        if !self.clock.is_ready() {
            log::warn!("start refused: output clock not ready");
            return Err(StartError::OutputUnavailable);
        }

        self.state.set_playing(true);
        let core = SchedulerCore::start(
            self.clock.as_ref(),
            self.trigger.as_ref(),
            &self.store,
            &self.state,
        );
        log::info!("playback started at {} bpm", self.store.snapshot().bpm);

        let store = self.store.clone();
        let clock = Arc::clone(&self.clock);
        let trigger = Arc::clone(&self.trigger);
        let state = Arc::clone(&self.state);
        self.worker = Some(thread::spawn(move || {
            scheduler::run(core, &store, clock.as_ref(), trigger.as_ref(), &state);
        }));
        Ok(())
    }

    /// Stop playback: end the tick loop, then reset the beat indicator to
    /// the stopped sentinel and the measure to 0. Clicks already queued with
    /// the trigger play out; nothing is retracted.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.state.set_playing(false);
        if worker.join().is_err() {
            log::error!("scheduler thread panicked");
        }
        self.state.reset_stopped();
        log::info!("playback stopped");
    }

    pub fn toggle_play(&mut self) -> Result<(), StartError> {
        if self.worker.is_some() {
            self.stop();
            Ok(())
        } else {
            self.start()
        }
    }
}

impl Drop for Metronome {
    fn drop(&mut self) {
        self.stop();
    }
}
