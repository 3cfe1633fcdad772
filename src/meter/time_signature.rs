use std::fmt;

use serde::{Deserialize, Serialize};

use crate::meter::BeatAccent;

/// Time signature from the fixed set the metronome supports.
///
/// Simple meters (denominator 4) count quarter-note beats. Compound meters
/// (denominator 8) count eighth-note subdivisions grouped in threes, so one
/// written "beat" is a third of a dotted-quarter pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeSignature {
    /// 2/4 time (march, simple duple)
    #[serde(rename = "2/4")]
    TwoFour,
    /// 3/4 time (waltz, simple triple)
    #[serde(rename = "3/4")]
    ThreeFour,
    /// Standard 4/4 time (simple quadruple)
    #[serde(rename = "4/4")]
    FourFour,
    /// 5/4 time (asymmetric simple meter)
    #[serde(rename = "5/4")]
    FiveFour,
    /// 3/8 time (one compound pulse)
    #[serde(rename = "3/8")]
    ThreeEight,
    /// 6/8 time (compound duple)
    #[serde(rename = "6/8")]
    SixEight,
    /// 9/8 time (compound triple)
    #[serde(rename = "9/8")]
    NineEight,
    /// 12/8 time (compound quadruple)
    #[serde(rename = "12/8")]
    TwelveEight,
}

impl TimeSignature {
    /// Every supported signature, in the order the UI cycles through them.
    pub const ALL: [TimeSignature; 8] = [
        TimeSignature::TwoFour,
        TimeSignature::ThreeFour,
        TimeSignature::FourFour,
        TimeSignature::FiveFour,
        TimeSignature::ThreeEight,
        TimeSignature::SixEight,
        TimeSignature::NineEight,
        TimeSignature::TwelveEight,
    ];

    /// Beats per bar (the numerator).
    pub fn numerator(self) -> u8 {
        match self {
            TimeSignature::TwoFour => 2,
            TimeSignature::ThreeFour | TimeSignature::ThreeEight => 3,
            TimeSignature::FourFour => 4,
            TimeSignature::FiveFour => 5,
            TimeSignature::SixEight => 6,
            TimeSignature::NineEight => 9,
            TimeSignature::TwelveEight => 12,
        }
    }

    /// Note value that gets one written beat (4 = quarter, 8 = eighth).
    pub fn denominator(self) -> u8 {
        if self.is_compound() {
            8
        } else {
            4
        }
    }

    /// Number of scheduled beats per measure. Equals the numerator: compound
    /// meters click every eighth-note subdivision, not every dotted-quarter
    /// pulse.
    pub fn beat_count(self) -> usize {
        self.numerator() as usize
    }

    /// Whether this is a compound meter (eighth-note denominator).
    pub fn is_compound(self) -> bool {
        matches!(
            self,
            TimeSignature::ThreeEight
                | TimeSignature::SixEight
                | TimeSignature::NineEight
                | TimeSignature::TwelveEight
        )
    }

    /// Duration of one scheduled beat in seconds at the given tempo.
    ///
    /// Simple meters: `60 / bpm`. Compound meters: `60 / bpm / 3`, since the
    /// tempo names the dotted-quarter pulse and each written beat is one of
    /// its three eighth-note subdivisions.
    pub fn beat_interval(self, bpm: u16) -> f64 {
        let quarter = 60.0 / f64::from(bpm);
        if self.is_compound() {
            quarter / 3.0
        } else {
            quarter
        }
    }

    /// The accent pattern a fresh measure of this signature starts with.
    ///
    /// Simple meters lead with a strong beat and fill with normal beats.
    /// Compound meters accent the start of each three-subdivision group
    /// (strong for the first group, normal for the rest) and mute the two
    /// subdivisions inside each group.
    ///
    /// Returns a newly allocated pattern on every call.
    pub fn default_pattern(self) -> Vec<BeatAccent> {
        let count = self.beat_count();
        if self.is_compound() {
            let mut pattern = Vec::with_capacity(count);
            for group in 0..count / 3 {
                pattern.push(if group == 0 {
                    BeatAccent::Strong
                } else {
                    BeatAccent::Normal
                });
                pattern.push(BeatAccent::Mute);
                pattern.push(BeatAccent::Mute);
            }
            pattern
        } else {
            let mut pattern = vec![BeatAccent::Normal; count];
            pattern[0] = BeatAccent::Strong;
            pattern
        }
    }

    /// Next signature in display order, wrapping at the end.
    pub fn next(self) -> Self {
        let pos = TimeSignature::ALL
            .iter()
            .position(|ts| *ts == self)
            .unwrap_or(0);
        TimeSignature::ALL[(pos + 1) % TimeSignature::ALL.len()]
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator(), self.denominator())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BeatAccent::{Mute, Normal, Strong};

    #[test]
    fn test_beat_counts() {
        assert_eq!(TimeSignature::TwoFour.beat_count(), 2);
        assert_eq!(TimeSignature::FourFour.beat_count(), 4);
        assert_eq!(TimeSignature::FiveFour.beat_count(), 5);
        assert_eq!(TimeSignature::SixEight.beat_count(), 6);
        assert_eq!(TimeSignature::TwelveEight.beat_count(), 12);
    }

    #[test]
    fn test_compound_meters_have_eighth_denominator() {
        for ts in TimeSignature::ALL {
            assert_eq!(ts.is_compound(), ts.denominator() == 8, "{ts}");
        }
        assert!(!TimeSignature::FourFour.is_compound());
        assert!(TimeSignature::NineEight.is_compound());
    }

    #[test]
    fn test_beat_interval_simple_meter() {
        // 120 bpm in 4/4: one beat is half a second.
        assert_eq!(TimeSignature::FourFour.beat_interval(120), 0.5);
        assert_eq!(TimeSignature::ThreeFour.beat_interval(60), 1.0);
    }

    #[test]
    fn test_beat_interval_compound_meter() {
        // Compound meters subdivide the quarter-equivalent by three.
        assert_eq!(TimeSignature::SixEight.beat_interval(120), 0.5 / 3.0);
        for ts in TimeSignature::ALL {
            let expected = if ts.is_compound() {
                60.0 / 90.0 / 3.0
            } else {
                60.0 / 90.0
            };
            assert_eq!(ts.beat_interval(90), expected, "{ts}");
        }
    }

    #[test]
    fn test_default_pattern_length_matches_beat_count() {
        for ts in TimeSignature::ALL {
            assert_eq!(ts.default_pattern().len(), ts.beat_count(), "{ts}");
        }
    }

    #[test]
    fn test_default_pattern_simple_meter() {
        assert_eq!(
            TimeSignature::FourFour.default_pattern(),
            vec![Strong, Normal, Normal, Normal]
        );
        assert_eq!(TimeSignature::TwoFour.default_pattern(), vec![Strong, Normal]);
    }

    #[test]
    fn test_default_pattern_compound_meter() {
        assert_eq!(TimeSignature::ThreeEight.default_pattern(), vec![Strong, Mute, Mute]);
        assert_eq!(
            TimeSignature::SixEight.default_pattern(),
            vec![Strong, Mute, Mute, Normal, Mute, Mute]
        );
        assert_eq!(
            TimeSignature::NineEight.default_pattern(),
            vec![Strong, Mute, Mute, Normal, Mute, Mute, Normal, Mute, Mute]
        );
    }

    #[test]
    fn test_display_format() {
        assert_eq!(TimeSignature::FourFour.to_string(), "4/4");
        assert_eq!(TimeSignature::SixEight.to_string(), "6/8");
    }

    #[test]
    fn test_next_cycles_through_all() {
        let mut ts = TimeSignature::TwoFour;
        for _ in 0..TimeSignature::ALL.len() {
            ts = ts.next();
        }
        assert_eq!(ts, TimeSignature::TwoFour);
    }
}
