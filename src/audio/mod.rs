//! Real-time audio output.
//!
//! [`AudioEngine`] owns the cpal output stream and the pre-rendered click
//! buffers. Everything else talks to it through [`EngineHandle`], which
//! implements both [`OutputClock`] (the callback's frame counter divided by
//! the sample rate) and [`SoundTrigger`] (clicks queued over a lock-free
//! ring into the callback).

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};

use crate::click::{ClickBank, SoundType};
use crate::engine::{OutputClock, SoundTrigger};
use crate::meter::BeatAccent;

/// Errors raised while opening the output stream.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no default audio output device")]
    NoDevice,

    #[error("failed to query the default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build the output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start the output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// Clicks the scheduler can queue ahead of the callback.
const CLICK_QUEUE_SIZE: usize = 64;

/// Clicks mixed simultaneously; the queue holds any excess until a slot
/// frees up on a later block.
const MAX_ACTIVE_CLICKS: usize = 8;

/// A click waiting to sound at an absolute output frame.
///
/// The sound is resolved when the click is queued, so changing the sound
/// mid-flight never retunes clicks that are already on their way.
#[derive(Debug, Clone, Copy)]
struct ScheduledClick {
    sound: SoundType,
    accent: BeatAccent,
    start_frame: u64,
}

/// Shared control surface for the audio engine.
///
/// Cheap to clone behind an [`Arc`] and safe to hand to the scheduler
/// thread; the stream itself stays with [`AudioEngine`] on the thread that
/// created it.
pub struct EngineHandle {
    sample_rate: f64,
    frames: AtomicU64,
    live: AtomicBool,
    gain_bits: AtomicU32,
    sound: AtomicU8,
    tx: Mutex<Producer<ScheduledClick>>,
}

impl EngineHandle {
    fn new(sample_rate: f64, tx: Producer<ScheduledClick>) -> Self {
        Self {
            sample_rate,
            frames: AtomicU64::new(0),
            live: AtomicBool::new(true),
            gain_bits: AtomicU32::new(1.0f32.to_bits()),
            sound: AtomicU8::new(0),
            tx: Mutex::new(tx),
        }
    }

    /// Set the output gain from a 0..=100 volume setting.
    pub fn set_volume(&self, volume: u8) {
        let gain = f32::from(volume.min(100)) / 100.0;
        self.gain_bits.store(gain.to_bits(), Ordering::Release);
    }

    /// Select the timbre used for clicks queued from now on.
    pub fn set_sound(&self, sound: SoundType) {
        self.sound.store(sound as u8, Ordering::Release);
    }

    fn gain(&self) -> f32 {
        f32::from_bits(self.gain_bits.load(Ordering::Acquire))
    }

    fn sound(&self) -> SoundType {
        let index = self.sound.load(Ordering::Acquire) as usize;
        SoundType::ALL[index % SoundType::ALL.len()]
    }
}

impl OutputClock for EngineHandle {
    fn now(&self) -> f64 {
        self.frames.load(Ordering::Acquire) as f64 / self.sample_rate
    }

    fn is_ready(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

impl SoundTrigger for EngineHandle {
    fn trigger(&self, accent: BeatAccent, when: f64) {
        if !accent.is_audible() {
            return;
        }
        let click = ScheduledClick {
            sound: self.sound(),
            accent,
            // Round to the nearest frame so times that came out of the
            // clock's own division land back on the frame they meant.
            start_frame: (when.max(0.0) * self.sample_rate).round() as u64,
        };
        // A full queue means the callback has stalled; dropping the click
        // is the only real-time-safe option left.
        let _ = self.tx.lock().unwrap().push(click);
    }
}

/// Default-device output stream driving the click mixer.
pub struct AudioEngine {
    handle: Arc<EngineHandle>,
    _stream: cpal::Stream,
}

impl AudioEngine {
    /// Open the default output device and start rendering.
    pub fn start() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        let config = device.default_output_config()?;

        let sample_rate = f64::from(config.sample_rate().0);
        let channels = config.channels() as usize;

        let bank = ClickBank::render(config.sample_rate().0 as f32);
        let (tx, mut rx) = RingBuffer::<ScheduledClick>::new(CLICK_QUEUE_SIZE);
        let handle = Arc::new(EngineHandle::new(sample_rate, tx));

        let mix_handle = Arc::clone(&handle);
        let mut active: Vec<ScheduledClick> = Vec::with_capacity(MAX_ACTIVE_CLICKS);
        let err_handle = Arc::clone(&handle);

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                render_block(data, channels, &mix_handle, &mut rx, &bank, &mut active);
            },
            move |err| {
                log::error!("audio stream error: {err}");
                err_handle.live.store(false, Ordering::Release);
            },
            None,
        )?;
        stream.play()?;

        log::info!("audio output open at {sample_rate} Hz, {channels} channel(s)");

        Ok(Self {
            handle,
            _stream: stream,
        })
    }

    /// Shared handle implementing [`OutputClock`] and [`SoundTrigger`].
    pub fn handle(&self) -> Arc<EngineHandle> {
        Arc::clone(&self.handle)
    }
}

/// Mix due clicks into one interleaved output block.
fn render_block(
    data: &mut [f32],
    channels: usize,
    handle: &EngineHandle,
    rx: &mut Consumer<ScheduledClick>,
    bank: &ClickBank,
    active: &mut Vec<ScheduledClick>,
) {
    data.fill(0.0);

    let block_start = handle.frames.load(Ordering::Acquire);
    let block_frames = (data.len() / channels.max(1)) as u64;
    let block_end = block_start + block_frames;
    let gain = handle.gain();

    while active.len() < MAX_ACTIVE_CLICKS {
        match rx.pop() {
            Ok(click) => active.push(click),
            Err(_) => break,
        }
    }

    for click in active.iter() {
        let buf = bank.click(click.sound, click.accent);
        // First frame of this click that falls inside the block. Clicks
        // that arrived late simply play their remainder.
        let begin = click.start_frame.max(block_start);
        if begin >= block_end {
            continue;
        }
        let in_block = (begin - block_start) as usize;
        let in_click = (begin - click.start_frame) as usize;
        if in_click >= buf.len() {
            continue;
        }
        let frames = (buf.len() - in_click).min((block_end - begin) as usize);
        for i in 0..frames {
            let sample = buf[in_click + i] * gain;
            let base = (in_block + i) * channels;
            for ch in 0..channels {
                data[base + ch] += sample;
            }
        }
    }

    active.retain(|click| {
        let len = bank.click(click.sound, click.accent).len() as u64;
        click.start_frame + len > block_end
    });

    handle.frames.store(block_end, Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_handle(sample_rate: f64) -> (Arc<EngineHandle>, Consumer<ScheduledClick>) {
        let (tx, rx) = RingBuffer::<ScheduledClick>::new(CLICK_QUEUE_SIZE);
        (Arc::new(EngineHandle::new(sample_rate, tx)), rx)
    }

    #[test]
    fn clock_follows_the_frame_counter() {
        let (handle, _rx) = test_handle(48_000.0);
        assert_eq!(handle.now(), 0.0);

        handle.frames.store(24_000, Ordering::Release);
        assert!((handle.now() - 0.5).abs() < 1e-12);

        handle.frames.store(96_000, Ordering::Release);
        assert!((handle.now() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn volume_maps_to_unit_gain() {
        let (handle, _rx) = test_handle(48_000.0);
        assert_eq!(handle.gain(), 1.0);

        handle.set_volume(50);
        assert!((handle.gain() - 0.5).abs() < 1e-6);

        handle.set_volume(0);
        assert_eq!(handle.gain(), 0.0);

        handle.set_volume(200);
        assert_eq!(handle.gain(), 1.0);
    }

    #[test]
    fn trigger_queues_audible_clicks_only() {
        let (handle, mut rx) = test_handle(48_000.0);

        handle.trigger(BeatAccent::Strong, 0.5);
        handle.trigger(BeatAccent::Mute, 0.75);
        handle.trigger(BeatAccent::Normal, 1.0);

        let first = rx.pop().unwrap();
        assert_eq!(first.accent, BeatAccent::Strong);
        assert_eq!(first.start_frame, 24_000);

        let second = rx.pop().unwrap();
        assert_eq!(second.accent, BeatAccent::Normal);
        assert_eq!(second.start_frame, 48_000);

        assert!(rx.pop().is_err());
    }

    #[test]
    fn trigger_carries_the_selected_sound() {
        let (handle, mut rx) = test_handle(48_000.0);
        handle.set_sound(SoundType::WoodBlock);
        handle.trigger(BeatAccent::Strong, 0.0);

        assert_eq!(rx.pop().unwrap().sound, SoundType::WoodBlock);
    }

    #[test]
    fn render_places_a_click_at_its_exact_frame() {
        let sample_rate = 48_000.0;
        let (handle, mut rx) = test_handle(sample_rate);
        let bank = ClickBank::render(sample_rate as f32);
        let mut active = Vec::new();

        handle.trigger(BeatAccent::Strong, 100.0 / sample_rate);

        let channels = 2;
        let mut data = vec![0.0f32; 256 * channels];
        render_block(&mut data, channels, &handle, &mut rx, &bank, &mut active);

        let click = bank.click(SoundType::Click, BeatAccent::Strong);
        // Silent up to frame 100, then the click's own samples on both
        // channels.
        assert!(data[..100 * channels].iter().all(|&s| s == 0.0));
        assert_eq!(data[100 * channels], click[0]);
        assert_eq!(data[100 * channels + 1], click[0]);
        assert_eq!(data[101 * channels], click[1]);

        assert_eq!(handle.frames.load(Ordering::Acquire), 256);
    }

    #[test]
    fn render_continues_a_click_across_blocks() {
        let sample_rate = 48_000.0;
        let (handle, mut rx) = test_handle(sample_rate);
        let bank = ClickBank::render(sample_rate as f32);
        let mut active = Vec::new();

        handle.trigger(BeatAccent::Normal, 100.0 / sample_rate);

        let channels = 1;
        let mut first = vec![0.0f32; 128];
        let mut second = vec![0.0f32; 128];
        render_block(&mut first, channels, &handle, &mut rx, &bank, &mut active);
        render_block(&mut second, channels, &handle, &mut rx, &bank, &mut active);

        let click = bank.click(SoundType::Click, BeatAccent::Normal);
        assert_eq!(first[100], click[0]);
        assert_eq!(first[127], click[27]);
        assert_eq!(second[0], click[28]);
        assert_eq!(second[1], click[29]);
    }

    #[test]
    fn render_plays_the_remainder_of_a_late_click() {
        let sample_rate = 48_000.0;
        let (handle, mut rx) = test_handle(sample_rate);
        let bank = ClickBank::render(sample_rate as f32);
        let mut active = Vec::new();

        // The callback is already 1000 frames in when the click for frame
        // 400 arrives.
        handle.frames.store(1000, Ordering::Release);
        handle.trigger(BeatAccent::Strong, 400.0 / sample_rate);

        let channels = 1;
        let mut data = vec![0.0f32; 256];
        render_block(&mut data, channels, &handle, &mut rx, &bank, &mut active);

        let click = bank.click(SoundType::Click, BeatAccent::Strong);
        assert_eq!(data[0], click[600]);
        assert_eq!(data[1], click[601]);
    }

    #[test]
    fn render_applies_the_gain() {
        let sample_rate = 48_000.0;
        let (handle, mut rx) = test_handle(sample_rate);
        let bank = ClickBank::render(sample_rate as f32);
        let mut active = Vec::new();

        handle.set_volume(50);
        handle.trigger(BeatAccent::Strong, 0.0);

        let channels = 1;
        let mut data = vec![0.0f32; 64];
        render_block(&mut data, channels, &handle, &mut rx, &bank, &mut active);

        let click = bank.click(SoundType::Click, BeatAccent::Strong);
        assert!((data[0] - click[0] * 0.5).abs() < 1e-6);
    }

    #[test]
    fn finished_clicks_are_retired() {
        let sample_rate = 48_000.0;
        let (handle, mut rx) = test_handle(sample_rate);
        let bank = ClickBank::render(sample_rate as f32);
        let mut active = Vec::new();

        handle.trigger(BeatAccent::Strong, 0.0);
        let click_len = bank.click(SoundType::Click, BeatAccent::Strong).len();

        let channels = 1;
        let mut data = vec![0.0f32; click_len + 64];
        render_block(&mut data, channels, &handle, &mut rx, &bank, &mut active);

        assert!(active.is_empty());
        assert!(data[click_len..].iter().all(|&s| s == 0.0));
    }
}
