//! Benchmarks for the scheduling pass and click rendering.
//!
//! Run with: cargo bench
//!
//! The scheduling pass runs every 25ms on its own thread; one pass must stay
//! far below that period even when several beats fall inside the look-ahead
//! window. Click rendering happens once at stream start, so it only has to
//! be unremarkable.

use std::hint::black_box;
use std::sync::Mutex;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use tactus::click::ClickBank;
use tactus::config::ConfigStore;
use tactus::engine::{OutputClock, PlaybackState, SchedulerCore, SoundTrigger, TICK_INTERVAL};
use tactus::meter::BeatAccent;

struct SteppedClock(Mutex<f64>);

impl SteppedClock {
    fn advance(&self, secs: f64) {
        *self.0.lock().unwrap() += secs;
    }
}

impl OutputClock for SteppedClock {
    fn now(&self) -> f64 {
        *self.0.lock().unwrap()
    }
}

struct NullTrigger;

impl SoundTrigger for NullTrigger {
    fn trigger(&self, accent: BeatAccent, when: f64) {
        black_box((accent, when));
    }
}

fn bench_scheduler_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler/pass");

    // Faster tempos push more beats into each look-ahead window.
    for &bpm in &[60u16, 120, 240, 300] {
        let clock = SteppedClock(Mutex::new(0.0));
        let trigger = NullTrigger;
        let store = ConfigStore::default();
        store.set_bpm(bpm);
        let state = PlaybackState::new();
        let mut core = SchedulerCore::start(&clock, &trigger, &store, &state);

        group.bench_with_input(BenchmarkId::new("bpm", bpm), &bpm, |b, _| {
            b.iter(|| {
                clock.advance(TICK_INTERVAL.as_secs_f64());
                core.pass(&clock, &trigger, &store, &state);
            })
        });
    }

    group.finish();
}

fn bench_click_bank(c: &mut Criterion) {
    let mut group = c.benchmark_group("click/render");

    for &sample_rate in &[44_100.0f32, 48_000.0] {
        group.bench_with_input(
            BenchmarkId::new("bank", sample_rate as u32),
            &sample_rate,
            |b, &sample_rate| b.iter(|| ClickBank::render(black_box(sample_rate))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_scheduler_pass, bench_click_bank);
criterion_main!(benches);
