//! End-to-end scheduling sessions driven through the public API.

use std::sync::{Arc, Mutex};

use tactus::config::{ConfigStore, SilentUpdate, TempoRampUpdate};
use tactus::engine::{
    Metronome, OutputClock, PlaybackState, SchedulerCore, SoundTrigger, TICK_INTERVAL,
};
use tactus::meter::BeatAccent;

struct ManualClock(Mutex<f64>);

impl ManualClock {
    fn at(secs: f64) -> Self {
        ManualClock(Mutex::new(secs))
    }

    fn advance(&self, secs: f64) {
        *self.0.lock().unwrap() += secs;
    }
}

impl OutputClock for ManualClock {
    fn now(&self) -> f64 {
        *self.0.lock().unwrap()
    }
}

#[derive(Default)]
struct RecordingTrigger(Mutex<Vec<(BeatAccent, f64)>>);

impl RecordingTrigger {
    fn events(&self) -> Vec<(BeatAccent, f64)> {
        self.0.lock().unwrap().clone()
    }
}

impl SoundTrigger for RecordingTrigger {
    fn trigger(&self, accent: BeatAccent, when: f64) {
        self.0.lock().unwrap().push((accent, when));
    }
}

/// A whole practice session: tempo ramp and silent bars running together,
/// with the configuration edited mid-flight.
#[test]
fn practice_session_with_ramp_and_silent_bars() {
    let clock = ManualClock::at(0.0);
    let trigger = RecordingTrigger::default();
    let store = ConfigStore::default();
    let state = PlaybackState::new();

    store.set_bpm(120);
    store.set_tempo_ramp(TempoRampUpdate {
        enabled: Some(true),
        target_bpm: Some(140),
        step_bpm: Some(10),
        every_bars: Some(1),
        ..Default::default()
    });
    store.set_silent(SilentUpdate {
        enabled: Some(true),
        sound_bars: Some(2),
        silent_bars: Some(1),
        ..Default::default()
    });
    let reference = store.snapshot();

    let mut core = SchedulerCore::start(&clock, &trigger, &store, &state);

    // Sample the published silenced flag at each new measure while running
    // thirty seconds of clock.
    let mut silenced_by_measure = vec![state.is_silenced()];
    while clock.now() < 30.0 {
        clock.advance(TICK_INTERVAL.as_secs_f64());
        core.pass(&clock, &trigger, &store, &state);
        let measure = state.current_measure() as usize;
        if measure == silenced_by_measure.len() {
            silenced_by_measure.push(state.is_silenced());
        }
    }

    // The ramp reached its target and stopped there.
    assert_eq!(store.snapshot().bpm, 140);

    // Thirty seconds of 4/4 at 120..=140 bpm covers at least 12 measures.
    assert!(state.current_measure() >= 12);

    // Every third measure was silent, starting at measure 2.
    assert!(silenced_by_measure.len() >= 9);
    for (measure, &silenced) in silenced_by_measure.iter().enumerate() {
        assert_eq!(
            silenced,
            measure % 3 == 2,
            "wrong silence for measure {measure}"
        );
    }

    // Clicks went out in order, none muted, none in the past.
    let events = trigger.events();
    assert!(!events.is_empty());
    for window in events.windows(2) {
        assert!(window[0].1 < window[1].1);
    }
    assert!(events.iter().all(|(accent, _)| accent.is_audible()));

    // The ramp only ever touched the tempo.
    let after = store.snapshot();
    assert_eq!(after.time_signature, reference.time_signature);
    assert_eq!(after.beat_pattern, reference.beat_pattern);
    assert_eq!(after.silent, reference.silent);
    assert_eq!(after.tempo_ramp, reference.tempo_ramp);
}

/// The facade round trip: start publishes the downbeat, stop resets the
/// published position, restarting fires the downbeat again.
#[test]
fn metronome_start_stop_restart() {
    let clock = Arc::new(ManualClock::at(0.0));
    let trigger = Arc::new(RecordingTrigger::default());
    let mut metronome = Metronome::new(clock, Arc::clone(&trigger) as Arc<dyn SoundTrigger>);

    assert!(!metronome.is_playing());
    assert_eq!(metronome.current_beat(), -1);

    metronome.start().unwrap();
    assert!(metronome.is_playing());
    assert_eq!(metronome.current_beat(), 0);
    assert_eq!(metronome.current_measure(), 0);
    assert_eq!(trigger.events().len(), 1);

    // Config edits while running go through the same store the scheduler
    // reads.
    metronome.set_bpm(180);
    assert_eq!(metronome.config().bpm, 180);

    metronome.stop();
    assert!(!metronome.is_playing());
    assert_eq!(metronome.current_beat(), -1);
    assert_eq!(metronome.current_measure(), 0);

    metronome.start().unwrap();
    assert_eq!(metronome.current_beat(), 0);
    assert_eq!(trigger.events().len(), 2);
    metronome.stop();
}
