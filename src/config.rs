//! Declarative metronome configuration and the shared store that owns it.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::click::SoundType;
use crate::meter::{BeatAccent, TimeSignature};

/// Tempo bounds enforced on every mutation.
pub const MIN_BPM: u16 = 30;
pub const MAX_BPM: u16 = 300;

fn clamp_bpm(bpm: u16) -> u16 {
    bpm.clamp(MIN_BPM, MAX_BPM)
}

/// Silent-practice cycle: `sound_bars` audible measures followed by
/// `silent_bars` silenced ones, repeating while enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SilentConfig {
    pub enabled: bool,
    pub sound_bars: u32,
    pub silent_bars: u32,
}

impl SilentConfig {
    /// Whether `measure` falls in the silenced phase of the cycle.
    pub fn is_silent_measure(&self, measure: u64) -> bool {
        if !self.enabled {
            return false;
        }
        let cycle = u64::from(self.sound_bars) + u64::from(self.silent_bars);
        if cycle == 0 {
            return false;
        }
        measure % cycle >= u64::from(self.sound_bars)
    }
}

impl Default for SilentConfig {
    fn default() -> Self {
        SilentConfig {
            enabled: false,
            sound_bars: 2,
            silent_bars: 1,
        }
    }
}

/// Direction of a tempo ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RampMode {
    Up,
    Down,
}

impl RampMode {
    pub fn flipped(self) -> Self {
        match self {
            RampMode::Up => RampMode::Down,
            RampMode::Down => RampMode::Up,
        }
    }
}

/// Stepped tempo change: every `every_bars` measures, bpm moves `step_bpm`
/// toward `target_bpm` and never past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoRampConfig {
    pub enabled: bool,
    pub mode: RampMode,
    pub target_bpm: u16,
    pub step_bpm: u16,
    pub every_bars: u32,
}

impl TempoRampConfig {
    /// Tempo after one ramp step from `current`, clamped at the target.
    ///
    /// A tempo already past the target snaps to it rather than stepping
    /// further away.
    pub fn stepped(&self, current: u16) -> u16 {
        match self.mode {
            RampMode::Up => current.saturating_add(self.step_bpm).min(self.target_bpm),
            RampMode::Down => current.saturating_sub(self.step_bpm).max(self.target_bpm),
        }
    }
}

impl Default for TempoRampConfig {
    fn default() -> Self {
        TempoRampConfig {
            enabled: false,
            mode: RampMode::Up,
            target_bpm: 100,
            step_bpm: 5,
            every_bars: 4,
        }
    }
}

/// The full declarative configuration the scheduler reads every pass.
///
/// `sound` and `volume` are carried for the audio collaborator; the
/// scheduler itself never looks at them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetronomeConfig {
    pub bpm: u16,
    pub time_signature: TimeSignature,
    pub beat_pattern: Vec<BeatAccent>,
    pub sound: SoundType,
    pub volume: u8,
    pub silent: SilentConfig,
    pub tempo_ramp: TempoRampConfig,
}

impl MetronomeConfig {
    /// Restore every invariant a deserialized or hand-built config may have
    /// broken: bpm and volume ranges, minimum bar counts, and the rule that
    /// the pattern length equals the time signature's beat count (a
    /// mismatched pattern is replaced by the signature's default).
    pub fn normalized(mut self) -> Self {
        self.bpm = clamp_bpm(self.bpm);
        self.volume = self.volume.min(100);
        if self.beat_pattern.len() != self.time_signature.beat_count() {
            self.beat_pattern = self.time_signature.default_pattern();
        }
        self.silent.sound_bars = self.silent.sound_bars.max(1);
        self.silent.silent_bars = self.silent.silent_bars.max(1);
        self.tempo_ramp.target_bpm = clamp_bpm(self.tempo_ramp.target_bpm);
        self.tempo_ramp.step_bpm = self.tempo_ramp.step_bpm.max(1);
        self.tempo_ramp.every_bars = self.tempo_ramp.every_bars.max(1);
        self
    }
}

impl Default for MetronomeConfig {
    fn default() -> Self {
        MetronomeConfig {
            bpm: 100,
            time_signature: TimeSignature::FourFour,
            beat_pattern: TimeSignature::FourFour.default_pattern(),
            sound: SoundType::Click,
            volume: 100,
            silent: SilentConfig::default(),
            tempo_ramp: TempoRampConfig::default(),
        }
    }
}

/// Field-selective update for [`SilentConfig`]; `None` keeps a field as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentUpdate {
    pub enabled: Option<bool>,
    pub sound_bars: Option<u32>,
    pub silent_bars: Option<u32>,
}

/// Field-selective update for [`TempoRampConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TempoRampUpdate {
    pub enabled: Option<bool>,
    pub mode: Option<RampMode>,
    pub target_bpm: Option<u16>,
    pub step_bpm: Option<u16>,
    pub every_bars: Option<u32>,
}

/// Shared handle to the live configuration.
///
/// Every mutator locks, merges its own fields, and leaves the rest alone, so
/// a scheduler-committed ramp step and a user edit landing in the same tick
/// window compose instead of clobbering each other. The scheduler snapshots
/// the store on every pass; nothing captures a config at playback start.
#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<Mutex<MetronomeConfig>>,
}

impl ConfigStore {
    pub fn new(config: MetronomeConfig) -> Self {
        ConfigStore {
            inner: Arc::new(Mutex::new(config.normalized())),
        }
    }

    /// Clone of the current configuration.
    pub fn snapshot(&self) -> MetronomeConfig {
        self.inner.lock().unwrap().clone()
    }

    fn update(&self, apply: impl FnOnce(&mut MetronomeConfig)) {
        let mut config = self.inner.lock().unwrap();
        apply(&mut config);
    }

    /// Set the tempo, clamped into `[MIN_BPM, MAX_BPM]`.
    pub fn set_bpm(&self, bpm: u16) {
        self.update(|config| config.bpm = clamp_bpm(bpm));
    }

    /// Change the time signature. The beat pattern always resets to the new
    /// signature's default; a stale pattern length is never tolerated.
    pub fn set_time_signature(&self, time_signature: TimeSignature) {
        self.update(|config| {
            config.time_signature = time_signature;
            config.beat_pattern = time_signature.default_pattern();
        });
    }

    /// Cycle the accent at `index` through strong -> normal -> mute.
    ///
    /// Panics if `index` is outside the current pattern.
    pub fn toggle_beat_accent(&self, index: usize) {
        self.update(|config| {
            assert!(
                index < config.beat_pattern.len(),
                "beat index {index} out of range for {} beats",
                config.beat_pattern.len()
            );
            config.beat_pattern[index] = config.beat_pattern[index].toggled();
        });
    }

    pub fn set_sound(&self, sound: SoundType) {
        self.update(|config| config.sound = sound);
    }

    /// Set the output volume, clamped to 0..=100.
    pub fn set_volume(&self, volume: u8) {
        self.update(|config| config.volume = volume.min(100));
    }

    /// Merge the given fields into the silent-practice config. Bar counts
    /// clamp to at least one.
    pub fn set_silent(&self, update: SilentUpdate) {
        self.update(|config| {
            if let Some(enabled) = update.enabled {
                config.silent.enabled = enabled;
            }
            if let Some(sound_bars) = update.sound_bars {
                config.silent.sound_bars = sound_bars.max(1);
            }
            if let Some(silent_bars) = update.silent_bars {
                config.silent.silent_bars = silent_bars.max(1);
            }
        });
    }

    /// Merge the given fields into the tempo-ramp config. The target clamps
    /// into the playable bpm range, step and bar counts to at least one.
    pub fn set_tempo_ramp(&self, update: TempoRampUpdate) {
        self.update(|config| {
            if let Some(enabled) = update.enabled {
                config.tempo_ramp.enabled = enabled;
            }
            if let Some(mode) = update.mode {
                config.tempo_ramp.mode = mode;
            }
            if let Some(target_bpm) = update.target_bpm {
                config.tempo_ramp.target_bpm = clamp_bpm(target_bpm);
            }
            if let Some(step_bpm) = update.step_bpm {
                config.tempo_ramp.step_bpm = step_bpm.max(1);
            }
            if let Some(every_bars) = update.every_bars {
                config.tempo_ramp.every_bars = every_bars.max(1);
            }
        });
    }

    /// Replace the whole configuration (preset loading). The value is
    /// normalized first, so a corrupted preset cannot plant a pattern whose
    /// length disagrees with its time signature.
    pub fn apply(&self, config: MetronomeConfig) {
        let config = config.normalized();
        self.update(|current| *current = config);
    }

    /// Commit one ramp step against the live tempo. This is the only
    /// mutation the scheduler issues; it flows through the same lock as any
    /// user edit and touches nothing but the bpm field. Returns the new
    /// tempo when it actually changed.
    pub(crate) fn commit_ramp_step(&self) -> Option<u16> {
        let mut config = self.inner.lock().unwrap();
        let next = clamp_bpm(config.tempo_ramp.stepped(config.bpm));
        if next == config.bpm {
            return None;
        }
        config.bpm = next;
        Some(next)
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        ConfigStore::new(MetronomeConfig::default())
    }
}
