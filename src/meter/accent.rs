use serde::{Deserialize, Serialize};

/// Accent level assigned to one beat position in a measure.
///
/// `Mute` suppresses the click but keeps the beat in the timing grid and
/// the UI progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeatAccent {
    /// Emphasized click (downbeats, group leads).
    Strong,
    /// Regular click.
    Normal,
    /// No sound; the beat still advances timing and UI state.
    Mute,
}

impl BeatAccent {
    /// Next accent in the edit cycle: strong -> normal -> mute -> strong.
    pub fn toggled(self) -> Self {
        match self {
            BeatAccent::Strong => BeatAccent::Normal,
            BeatAccent::Normal => BeatAccent::Mute,
            BeatAccent::Mute => BeatAccent::Strong,
        }
    }

    /// Whether this accent produces sound at all.
    pub fn is_audible(self) -> bool {
        !matches!(self, BeatAccent::Mute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_cycles_strong_normal_mute() {
        assert_eq!(BeatAccent::Strong.toggled(), BeatAccent::Normal);
        assert_eq!(BeatAccent::Normal.toggled(), BeatAccent::Mute);
        assert_eq!(BeatAccent::Mute.toggled(), BeatAccent::Strong);
    }

    #[test]
    fn toggle_is_a_three_cycle() {
        for accent in [BeatAccent::Strong, BeatAccent::Normal, BeatAccent::Mute] {
            assert_eq!(accent.toggled().toggled().toggled(), accent);
        }
    }

    #[test]
    fn only_mute_is_inaudible() {
        assert!(BeatAccent::Strong.is_audible());
        assert!(BeatAccent::Normal.is_audible());
        assert!(!BeatAccent::Mute.is_audible());
    }
}
