// Melodic interval classification.
//
// Maps a pair of MIDI pitches to one of 13 named intervals (unison through
// octave) and labels the interval with the longer of the two notes'
// notated durations. The label later selects the interval's scoring weight
// (see `config::DurationWeights`).
//
// Spans wider than an octave reduce modulo 12, except that any exact
// multiple of 12 stays an octave: 19 semitones is a perfect fifth, 24 is an
// octave, 0 is a unison. Direction is ignored, so classification is
// symmetric in its arguments.
//
// Used by detect.rs for every adjacent note pair of the primary voice,
// including the pair that crosses a meter boundary.

use crate::score::NoteDuration;
use score_affect_taxonomy::FeatureCategory;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    Unison,
    MinorSecond,
    MajorSecond,
    MinorThird,
    MajorThird,
    PerfectFourth,
    AugmentedFourth,
    PerfectFifth,
    MinorSixth,
    MajorSixth,
    MinorSeventh,
    MajorSeventh,
    Octave,
}

impl Interval {
    /// Indexed by semitone count 0-12.
    pub const ALL: [Interval; 13] = [
        Interval::Unison,
        Interval::MinorSecond,
        Interval::MajorSecond,
        Interval::MinorThird,
        Interval::MajorThird,
        Interval::PerfectFourth,
        Interval::AugmentedFourth,
        Interval::PerfectFifth,
        Interval::MinorSixth,
        Interval::MajorSixth,
        Interval::MinorSeventh,
        Interval::MajorSeventh,
        Interval::Octave,
    ];

    /// Classify an undirected span in semitones.
    pub fn from_span(span: u32) -> Interval {
        if span == 0 {
            Interval::Unison
        } else if span % 12 == 0 {
            Interval::Octave
        } else {
            Interval::ALL[(span % 12) as usize]
        }
    }

    /// Size in semitones (0-12).
    pub fn semitones(self) -> u8 {
        self as u8
    }

    /// The taxonomy category this interval is detected as.
    pub fn category(self) -> FeatureCategory {
        match self {
            Interval::Unison => FeatureCategory::UnisonInterval,
            Interval::MinorSecond => FeatureCategory::MinorSecondInterval,
            Interval::MajorSecond => FeatureCategory::MajorSecondInterval,
            Interval::MinorThird => FeatureCategory::MinorThirdInterval,
            Interval::MajorThird => FeatureCategory::MajorThirdInterval,
            Interval::PerfectFourth => FeatureCategory::PerfectFourthInterval,
            Interval::AugmentedFourth => FeatureCategory::AugmentedFourthInterval,
            Interval::PerfectFifth => FeatureCategory::PerfectFifthInterval,
            Interval::MinorSixth => FeatureCategory::MinorSixthInterval,
            Interval::MajorSixth => FeatureCategory::MajorSixthInterval,
            Interval::MinorSeventh => FeatureCategory::MinorSeventhInterval,
            Interval::MajorSeventh => FeatureCategory::MajorSeventhInterval,
            Interval::Octave => FeatureCategory::OctaveInterval,
        }
    }
}

/// Classify the interval between two pitches and pick its duration label.
///
/// The label is the longer of the two durations; equal durations return
/// that duration.
pub fn classify_interval(
    pitch_a: u8,
    pitch_b: u8,
    duration_a: NoteDuration,
    duration_b: NoteDuration,
) -> (Interval, NoteDuration) {
    let span = (pitch_a as i32 - pitch_b as i32).unsigned_abs();
    (Interval::from_span(span), duration_a.max(duration_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    const Q: NoteDuration = NoteDuration::Quarter;

    #[test]
    fn test_simple_intervals() {
        assert_eq!(classify_interval(60, 64, Q, Q).0, Interval::MajorThird);
        assert_eq!(classify_interval(64, 67, Q, Q).0, Interval::MinorThird);
        assert_eq!(classify_interval(60, 67, Q, Q).0, Interval::PerfectFifth);
        assert_eq!(classify_interval(60, 66, Q, Q).0, Interval::AugmentedFourth);
        assert_eq!(classify_interval(62, 60, Q, Q).0, Interval::MajorSecond);
        assert_eq!(classify_interval(71, 60, Q, Q).0, Interval::MajorSeventh);
    }

    #[test]
    fn test_identical_pitch_is_unison() {
        for pitch in 0..=127u8 {
            assert_eq!(classify_interval(pitch, pitch, Q, Q).0, Interval::Unison);
        }
    }

    #[test]
    fn test_classification_is_symmetric() {
        for a in 0..=127u8 {
            for b in 0..=127u8 {
                assert_eq!(
                    classify_interval(a, b, NoteDuration::Half, NoteDuration::Eighth),
                    classify_interval(b, a, NoteDuration::Eighth, NoteDuration::Half),
                    "asymmetric for {a} and {b}"
                );
            }
        }
    }

    #[test]
    fn test_octave_multiples_stay_octave() {
        for a in 0..=91u8 {
            assert_eq!(classify_interval(a, a + 12, Q, Q).0, Interval::Octave);
            if a + 24 <= 127 {
                assert_eq!(classify_interval(a, a + 24, Q, Q).0, Interval::Octave);
            }
            if a + 36 <= 127 {
                assert_eq!(classify_interval(a, a + 36, Q, Q).0, Interval::Octave);
            }
        }
    }

    #[test]
    fn test_compound_intervals_reduce() {
        // Major tenth -> major third, twelfth -> perfect fifth.
        assert_eq!(classify_interval(48, 64, Q, Q).0, Interval::MajorThird);
        assert_eq!(classify_interval(48, 67, Q, Q).0, Interval::PerfectFifth);
        assert_eq!(classify_interval(40, 73, Q, Q).0, Interval::MinorSixth);
    }

    #[test]
    fn test_duration_label_is_longer_note() {
        assert_eq!(
            classify_interval(60, 62, NoteDuration::Eighth, NoteDuration::Whole).1,
            NoteDuration::Whole
        );
        assert_eq!(
            classify_interval(60, 62, NoteDuration::Half, NoteDuration::Sixteenth).1,
            NoteDuration::Half
        );
        assert_eq!(
            classify_interval(60, 62, NoteDuration::ThirtySecond, NoteDuration::ThirtySecond).1,
            NoteDuration::ThirtySecond
        );
    }

    #[test]
    fn test_semitones_match_table_index() {
        for (i, interval) in Interval::ALL.iter().enumerate() {
            assert_eq!(interval.semitones() as usize, i);
            assert_eq!(Interval::from_span(i as u32), *interval);
        }
    }
}
