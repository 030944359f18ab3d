// Data-driven analysis configuration.
//
// Every constant the detector and the scoring reducer read lives here in
// `AffectConfig`: the tempo reference range, interval duration weights, the
// tone weight, the mode contribution, pitch/range/direction thresholds and
// the per-track meter limit. `AffectConfig::default()` reproduces the fixed
// design values; a JSON override may replace any subset of them (missing
// fields fall back to the defaults via `#[serde(default)]`).
//
// These are design constants, not fitted parameters. Nothing in the crate
// adjusts them at runtime.
//
// See also: `scoring.rs` (weights, mode contribution), `tempo.rs` (tempo
// range), `detect.rs` (thresholds), `sequencer.rs` (limits).

use crate::error::AffectError;
use crate::score::NoteDuration;
use serde::{Deserialize, Serialize};

/// Tempo reference range and the fallback used when a score has no tempo.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TempoConfig {
    /// Lowest BPM accepted; maps to `min_arousal`.
    pub min_bpm: f64,
    /// Highest BPM accepted; maps to `max_arousal`.
    pub max_bpm: f64,
    pub min_arousal: f64,
    pub max_arousal: f64,
    /// BPM assumed when the score carries no usable tempo mark (Andante).
    pub default_bpm: f64,
}

impl Default for TempoConfig {
    fn default() -> Self {
        TempoConfig {
            min_bpm: 30.0,
            max_bpm: 220.0,
            min_arousal: -10.0,
            max_arousal: 10.0,
            default_bpm: 96.0,
        }
    }
}

/// Weight of an interval feature by the notated duration of its longer note.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationWeights {
    pub whole: f64,
    pub half: f64,
    pub quarter: f64,
    pub eighth: f64,
    pub sixteenth: f64,
    pub thirty_second: f64,
    /// Durations without their own entry (breve, 64th) and intervals with no
    /// duration label.
    pub other: f64,
}

impl Default for DurationWeights {
    fn default() -> Self {
        DurationWeights {
            whole: 1.5,
            half: 1.25,
            quarter: 1.0,
            eighth: 0.3,
            sixteenth: 0.15,
            thirty_second: 0.075,
            other: 1.0,
        }
    }
}

impl DurationWeights {
    pub fn for_duration(&self, duration: Option<NoteDuration>) -> f64 {
        match duration {
            Some(NoteDuration::Whole) => self.whole,
            Some(NoteDuration::Half) => self.half,
            Some(NoteDuration::Quarter) => self.quarter,
            Some(NoteDuration::Eighth) => self.eighth,
            Some(NoteDuration::Sixteenth) => self.sixteenth,
            Some(NoteDuration::ThirtySecond) => self.thirty_second,
            Some(NoteDuration::Breve) | Some(NoteDuration::SixtyFourth) | None => self.other,
        }
    }
}

/// Weights applied by the scoring reducer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    pub intervals: DurationWeights,
    /// Weight of tone-class features (pitch, pitch range, timbre).
    pub tone: f64,
    /// Valence added for a major track, subtracted for a minor one.
    pub mode_valence: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        WeightConfig {
            intervals: DurationWeights::default(),
            tone: 0.5,
            mode_valence: 3.0,
        }
    }
}

/// Classification thresholds used by the per-meter detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Average MIDI pitch strictly above this is high.
    pub high_pitch_above: f64,
    /// Average MIDI pitch strictly below this is low.
    pub low_pitch_below: f64,
    /// Pitch range (semitones) strictly below this is narrow.
    pub narrow_range_below: u8,
    /// Pitch range (semitones) strictly above this is wide. Values between
    /// the two bounds emit no range feature.
    pub wide_range_above: u8,
    /// Net step count beyond which a meter is ascending or descending.
    pub direction_threshold: i32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        ThresholdConfig {
            high_pitch_above: 71.0,
            low_pitch_below: 56.0,
            narrow_range_below: 8,
            wide_range_above: 11,
            direction_threshold: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    pub max_meters_per_track: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        LimitConfig {
            max_meters_per_track: 10_000,
        }
    }
}

/// Complete analysis configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffectConfig {
    pub tempo: TempoConfig,
    pub weights: WeightConfig,
    pub thresholds: ThresholdConfig,
    pub limits: LimitConfig,
}

impl AffectConfig {
    /// Parse a configuration from JSON. Omitted fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, AffectError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_design_constants() {
        let config = AffectConfig::default();
        assert_eq!(config.tempo.min_bpm, 30.0);
        assert_eq!(config.tempo.max_bpm, 220.0);
        assert_eq!(config.weights.tone, 0.5);
        assert_eq!(config.weights.mode_valence, 3.0);
        assert_eq!(config.thresholds.narrow_range_below, 8);
        assert_eq!(config.limits.max_meters_per_track, 10_000);
    }

    #[test]
    fn test_duration_weights() {
        let w = DurationWeights::default();
        assert_eq!(w.for_duration(Some(NoteDuration::Whole)), 1.5);
        assert_eq!(w.for_duration(Some(NoteDuration::Half)), 1.25);
        assert_eq!(w.for_duration(Some(NoteDuration::Quarter)), 1.0);
        assert_eq!(w.for_duration(Some(NoteDuration::Eighth)), 0.3);
        assert_eq!(w.for_duration(Some(NoteDuration::Sixteenth)), 0.15);
        assert_eq!(w.for_duration(Some(NoteDuration::ThirtySecond)), 0.075);
        assert_eq!(w.for_duration(Some(NoteDuration::Breve)), 1.0);
        assert_eq!(w.for_duration(None), 1.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AffectConfig::from_json(
            r#"{"tempo": {"default_bpm": 120.0}, "limits": {"max_meters_per_track": 16}}"#,
        )
        .unwrap();
        assert_eq!(config.tempo.default_bpm, 120.0);
        assert_eq!(config.tempo.max_bpm, 220.0);
        assert_eq!(config.limits.max_meters_per_track, 16);
        assert_eq!(config.weights, WeightConfig::default());
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = AffectConfig::from_json("{\"tempo\": 5}").unwrap_err();
        assert!(matches!(err, AffectError::Config(_)));
    }

    #[test]
    fn test_roundtrip_through_json() {
        let config = AffectConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(AffectConfig::from_json(&json).unwrap(), config);
    }
}
