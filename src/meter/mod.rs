//! Musical meter: the supported time signatures and per-beat accents.

mod accent;
mod time_signature;

pub use accent::BeatAccent;
pub use time_signature::TimeSignature;
