//! Click voice synthesis.
//!
//! Every timbre is rendered once into short mono buffers, one per accent
//! strength, so the audio callback only ever copies samples. The recipes aim
//! for audibly distinct, accent-differentiated clicks, not realism: strong
//! beats are brighter and louder than normal beats, and a mute accent has no
//! buffer at all.

use std::f32::consts::{FRAC_2_PI, PI, TAU};

use serde::{Deserialize, Serialize};

use crate::meter::BeatAccent;

/// Selectable click timbre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundType {
    /// Bright sine click.
    Click,
    /// Softer triangle beep.
    Beep,
    /// Short clave-like knock.
    WoodBlock,
    /// Filtered noise tick.
    HiHat,
}

impl SoundType {
    /// Every timbre, in the order the UI cycles through them.
    pub const ALL: [SoundType; 4] = [
        SoundType::Click,
        SoundType::Beep,
        SoundType::WoodBlock,
        SoundType::HiHat,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SoundType::Click => "Click",
            SoundType::Beep => "Beep",
            SoundType::WoodBlock => "Wood Block",
            SoundType::HiHat => "Hi-hat",
        }
    }

    /// Next timbre in display order, wrapping at the end.
    pub fn next(self) -> Self {
        match self {
            SoundType::Click => SoundType::Beep,
            SoundType::Beep => SoundType::WoodBlock,
            SoundType::WoodBlock => SoundType::HiHat,
            SoundType::HiHat => SoundType::Click,
        }
    }
}

#[derive(Clone, Copy)]
enum Wave {
    Sine,
    Triangle,
    /// White noise; `freq_hz` is the high-pass cutoff instead of a pitch.
    Noise,
}

/// One click recipe: waveform, pitch (or cutoff), length, peak level.
#[derive(Clone, Copy)]
struct Voice {
    wave: Wave,
    freq_hz: f32,
    duration: f32,
    level: f32,
}

fn recipe(sound: SoundType, strong: bool) -> Voice {
    use SoundType::*;
    use Wave::*;
    match (sound, strong) {
        (Click, true) => Voice { wave: Sine, freq_hz: 1000.0, duration: 0.060, level: 0.7 },
        (Click, false) => Voice { wave: Sine, freq_hz: 800.0, duration: 0.040, level: 0.4 },
        (Beep, true) => Voice { wave: Triangle, freq_hz: 700.0, duration: 0.050, level: 0.7 },
        (Beep, false) => Voice { wave: Triangle, freq_hz: 500.0, duration: 0.030, level: 0.4 },
        (WoodBlock, true) => Voice { wave: Sine, freq_hz: 2500.0, duration: 0.035, level: 0.9 },
        (WoodBlock, false) => Voice { wave: Sine, freq_hz: 1900.0, duration: 0.025, level: 0.55 },
        (HiHat, true) => Voice { wave: Noise, freq_hz: 7000.0, duration: 0.050, level: 0.8 },
        (HiHat, false) => Voice { wave: Noise, freq_hz: 6000.0, duration: 0.030, level: 0.5 },
    }
}

/// Pre-rendered click buffers for every timbre and accent strength.
pub struct ClickBank {
    // Indexed by slot(): two buffers per timbre, strong after normal.
    buffers: Vec<Vec<f32>>,
}

impl ClickBank {
    pub fn render(sample_rate: f32) -> Self {
        let mut buffers = Vec::with_capacity(SoundType::ALL.len() * 2);
        for sound in SoundType::ALL {
            buffers.push(render_voice(recipe(sound, false), sample_rate));
            buffers.push(render_voice(recipe(sound, true), sample_rate));
        }
        ClickBank { buffers }
    }

    /// Buffer for one scheduled click. Empty for a mute accent.
    pub fn click(&self, sound: SoundType, accent: BeatAccent) -> &[f32] {
        let strong = match accent {
            BeatAccent::Strong => true,
            BeatAccent::Normal => false,
            BeatAccent::Mute => return &[],
        };
        &self.buffers[slot(sound, strong)]
    }
}

fn slot(sound: SoundType, strong: bool) -> usize {
    let sound_index = SoundType::ALL
        .iter()
        .position(|s| *s == sound)
        .unwrap_or(0);
    sound_index * 2 + usize::from(strong)
}

// Envelope decay rate, normalized to the buffer length. exp(-8) leaves the
// tail at about 0.03% of peak, inaudible without a hard cutoff artifact.
const DECAY: f32 = 8.0;

fn render_voice(voice: Voice, sample_rate: f32) -> Vec<f32> {
    let len = (voice.duration * sample_rate) as usize;
    let mut buffer = Vec::with_capacity(len);

    match voice.wave {
        Wave::Sine => {
            for i in 0..len {
                let phase = TAU * voice.freq_hz * i as f32 / sample_rate;
                buffer.push(phase.sin() * envelope(i, len) * voice.level);
            }
        }
        Wave::Triangle => {
            for i in 0..len {
                let phase = TAU * voice.freq_hz * i as f32 / sample_rate;
                let tri = phase.sin().asin() * FRAC_2_PI;
                buffer.push(tri * envelope(i, len) * voice.level);
            }
        }
        Wave::Noise => {
            let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
            for i in 0..len {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                let noise = ((state >> 32) as f32 / u32::MAX as f32 - 0.5) * 2.0;
                buffer.push(noise * envelope(i, len));
            }
            highpass(&mut buffer, voice.freq_hz, sample_rate);
            // The filter moves the peak around; rescale so level means level.
            let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
            if peak > 0.0 {
                let scale = voice.level / peak;
                for sample in buffer.iter_mut() {
                    *sample *= scale;
                }
            }
        }
    }

    buffer
}

fn envelope(i: usize, len: usize) -> f32 {
    let t = i as f32 / len as f32;
    (-t * DECAY).exp()
}

/// One resonance-free state-variable filter pass, high-pass output only.
fn highpass(buffer: &mut [f32], cutoff_hz: f32, sample_rate: f32) {
    let g = (PI * cutoff_hz / sample_rate).tan();
    let k = 2.0;
    let h = 1.0 / (1.0 + g * (g + k));

    let mut ic1 = 0.0f32;
    let mut ic2 = 0.0f32;
    for sample in buffer.iter_mut() {
        let v3 = *sample - ic2;
        let v1 = h * (ic1 + g * v3);
        let v2 = ic2 + g * v1;
        ic1 = 2.0 * v1 - ic1;
        ic2 = 2.0 * v2 - ic2;
        *sample -= k * v1 + v2;
    }
}
