// Affect scoring: reduce one meter's feature set to an (arousal, valence)
// pair.
//
// Each feature contributes through the effect tags its category triggers in
// the taxonomy, scaled by a per-feature weight:
//
// - Intervals: weighted by the duration of the longer note
//   (`config::DurationWeights`).
// - Tone-class features (pitch, pitch range, timbre): the tone weight (0.5).
// - Everything else: 1.0.
//
// Tag contributions per unit weight:
//
//   VeryHighArousal +2   HighArousal +1.5   MediumArousal 0
//   LowArousal -1.5      VeryLowArousal -2
//   VeryPositiveValence +2   PositiveValence +1.5   MediumPositiveValence +1
//   LowNegativeValence -1    NegativeValence -1.5   VeryNegativeValence -2
//
// In a major-mode track the major second and minor seventh intervals are
// suppressed entirely. Tempo and mode are never scored from the feature
// set; they arrive as track-level inputs. Mode adds +3 valence (major) or
// -3 (minor); the tempo adds its rounded arousal contribution.
//
// The per-axis contributions are sorted before summation, so the result is
// the same for every ordering of the feature set.
//
// Called by sequencer.rs once per detected meter.

use crate::config::AffectConfig;
use crate::detect::FeatureInstance;
use crate::error::AffectError;
use crate::score::Mode;
use crate::tempo::{ResolvedTempo, tempo_contribution};
use score_affect_taxonomy::{EffectTag, FeatureCategory, FeatureClass, Taxonomy};
use serde::{Deserialize, Serialize};

/// The affect of one meter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AffectScore {
    pub arousal: f64,
    pub valence: f64,
}

/// Which axis an effect tag moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Arousal,
    Valence,
}

/// Axis and unit contribution of one effect tag.
pub fn effect_delta(tag: EffectTag) -> (Axis, f64) {
    match tag {
        EffectTag::VeryHighArousal => (Axis::Arousal, 2.0),
        EffectTag::HighArousal => (Axis::Arousal, 1.5),
        EffectTag::MediumArousal => (Axis::Arousal, 0.0),
        EffectTag::LowArousal => (Axis::Arousal, -1.5),
        EffectTag::VeryLowArousal => (Axis::Arousal, -2.0),
        EffectTag::VeryPositiveValence => (Axis::Valence, 2.0),
        EffectTag::PositiveValence => (Axis::Valence, 1.5),
        EffectTag::MediumPositiveValence => (Axis::Valence, 1.0),
        EffectTag::LowNegativeValence => (Axis::Valence, -1.0),
        EffectTag::NegativeValence => (Axis::Valence, -1.5),
        EffectTag::VeryNegativeValence => (Axis::Valence, -2.0),
    }
}

/// Major seconds and minor sevenths do not count in a major-mode track.
pub fn is_suppressed(category: FeatureCategory, mode: Option<Mode>) -> bool {
    mode == Some(Mode::Major)
        && matches!(
            category,
            FeatureCategory::MajorSecondInterval | FeatureCategory::MinorSeventhInterval
        )
}

/// True for categories that only enter the score as track-level inputs.
fn is_track_level(taxonomy: &Taxonomy, category: FeatureCategory) -> bool {
    taxonomy.is_a(category, FeatureClass::Tempo) || taxonomy.is_a(category, FeatureClass::Mode)
}

/// Scaling applied to every tag the feature triggers.
pub fn feature_weight(
    feature: &FeatureInstance,
    taxonomy: &Taxonomy,
    config: &AffectConfig,
) -> f64 {
    if taxonomy.is_a(feature.category, FeatureClass::Intervals) {
        config.weights.intervals.for_duration(feature.duration)
    } else if taxonomy.is_a(feature.category, FeatureClass::Tone) {
        config.weights.tone
    } else {
        1.0
    }
}

/// Valence contributed by the track's mode.
pub fn mode_valence(mode: Option<Mode>, config: &AffectConfig) -> f64 {
    match mode {
        Some(Mode::Major) => config.weights.mode_valence,
        Some(Mode::Minor) => -config.weights.mode_valence,
        None => 0.0,
    }
}

/// Score one meter's features.
///
/// Fails with `UnknownCategory` when a feature's category has no taxonomy
/// entry, and with `TempoOutOfRange` when the tempo lies outside the
/// configured reference range.
pub fn score<'a>(
    features: impl IntoIterator<Item = &'a FeatureInstance>,
    mode: Option<Mode>,
    tempo: &ResolvedTempo,
    taxonomy: &Taxonomy,
    config: &AffectConfig,
) -> Result<AffectScore, AffectError> {
    let mut arousal_terms = Vec::new();
    let mut valence_terms = Vec::new();

    for feature in features {
        let triggers = taxonomy
            .triggers(feature.category)
            .ok_or(AffectError::UnknownCategory(feature.category))?;
        if is_suppressed(feature.category, mode) || is_track_level(taxonomy, feature.category) {
            continue;
        }
        let weight = feature_weight(feature, taxonomy, config);
        for &tag in triggers {
            match effect_delta(tag) {
                (Axis::Arousal, delta) => arousal_terms.push(delta * weight),
                (Axis::Valence, delta) => valence_terms.push(delta * weight),
            }
        }
    }

    let arousal = ordered_sum(arousal_terms) + tempo_contribution(tempo, &config.tempo)?;
    let valence = ordered_sum(valence_terms) + mode_valence(mode, config);
    Ok(AffectScore { arousal, valence })
}

/// Sum in ascending order so the result does not depend on input order.
fn ordered_sum(mut terms: Vec<f64>) -> f64 {
    terms.sort_by(f64::total_cmp);
    terms.iter().sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TempoConfig;
    use crate::score::NoteDuration;
    use crate::tempo::resolve_tempo;
    use score_affect_taxonomy::default_taxonomy;

    const NO_FEATURES: [FeatureInstance; 0] = [];

    fn tempo(bpm: f64) -> ResolvedTempo {
        resolve_tempo(Some(bpm), &TempoConfig::default())
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_features_give_track_level_terms_only() {
        let taxonomy = default_taxonomy();
        let config = AffectConfig::default();
        let result =
            score(&NO_FEATURES, Some(Mode::Minor), &tempo(125.0), &taxonomy, &config).unwrap();
        assert_eq!(result.valence, -3.0);
        assert!(approx(result.arousal, 0.0));

        let result = score(&NO_FEATURES, None, &tempo(220.0), &taxonomy, &config).unwrap();
        assert_eq!(result, AffectScore { arousal: 10.0, valence: 0.0 });
    }

    #[test]
    fn test_suppressed_intervals_in_major() {
        let taxonomy = default_taxonomy();
        let config = AffectConfig::default();
        let features = [
            FeatureInstance::with_duration(
                FeatureCategory::MajorSecondInterval,
                NoteDuration::Quarter,
            ),
            FeatureInstance::with_duration(
                FeatureCategory::MinorSeventhInterval,
                NoteDuration::Half,
            ),
        ];
        let t = tempo(100.0);
        let major = score(&features, Some(Mode::Major), &t, &taxonomy, &config).unwrap();
        assert_eq!(major.valence, 3.0);
        assert_eq!(major.arousal, tempo_contribution(&t, &config.tempo).unwrap());

        // In minor the same intervals count.
        let minor = score(&features, Some(Mode::Minor), &t, &taxonomy, &config).unwrap();
        assert_ne!(minor.valence, -3.0);
    }

    #[test]
    fn test_interval_weight_follows_duration() {
        let taxonomy = default_taxonomy();
        let config = AffectConfig::default();
        let t = tempo(125.0);
        // Perfect fifth triggers VeryPositiveValence (+2).
        let whole = [FeatureInstance::with_duration(
            FeatureCategory::PerfectFifthInterval,
            NoteDuration::Whole,
        )];
        let eighth = [FeatureInstance::with_duration(
            FeatureCategory::PerfectFifthInterval,
            NoteDuration::Eighth,
        )];
        assert!(approx(score(&whole, None, &t, &taxonomy, &config).unwrap().valence, 3.0));
        assert!(approx(score(&eighth, None, &t, &taxonomy, &config).unwrap().valence, 0.6));
    }

    #[test]
    fn test_tone_features_use_tone_weight() {
        let taxonomy = default_taxonomy();
        let config = AffectConfig::default();
        let feature = FeatureInstance::new(FeatureCategory::HighPitch);
        assert_eq!(feature_weight(&feature, &taxonomy, &config), 0.5);
        let feature = FeatureInstance::new(FeatureCategory::Staccato);
        assert_eq!(feature_weight(&feature, &taxonomy, &config), 1.0);
    }

    #[test]
    fn test_tempo_and_mode_features_are_not_scored() {
        let taxonomy = default_taxonomy();
        let config = AffectConfig::default();
        let t = tempo(125.0);
        let features = [
            FeatureInstance::new(FeatureCategory::PrestoTempo),
            FeatureInstance::new(FeatureCategory::MinorMode),
        ];
        let result = score(&features, None, &t, &taxonomy, &config).unwrap();
        assert!(approx(result.arousal, 0.0));
        assert_eq!(result.valence, 0.0);
    }

    #[test]
    fn test_order_independent() {
        let taxonomy = default_taxonomy();
        let config = AffectConfig::default();
        let t = tempo(137.0);
        let mut features = vec![
            FeatureInstance::new(FeatureCategory::Forte),
            FeatureInstance::new(FeatureCategory::Staccato),
            FeatureInstance::new(FeatureCategory::HighPitch),
            FeatureInstance::new(FeatureCategory::AscendingMelody),
            FeatureInstance::with_duration(
                FeatureCategory::MinorSixthInterval,
                NoteDuration::Eighth,
            ),
            FeatureInstance::with_duration(
                FeatureCategory::AugmentedFourthInterval,
                NoteDuration::Sixteenth,
            ),
            FeatureInstance::with_duration(FeatureCategory::MajorThirdInterval, NoteDuration::Half),
            FeatureInstance::new(FeatureCategory::Crescendo),
        ];
        let expected = score(&features, Some(Mode::Minor), &t, &taxonomy, &config).unwrap();
        for rotation in 1..features.len() {
            features.rotate_left(1);
            let got = score(&features, Some(Mode::Minor), &t, &taxonomy, &config).unwrap();
            assert_eq!(got, expected, "rotation {rotation}");
        }
        features.reverse();
        let got = score(&features, Some(Mode::Minor), &t, &taxonomy, &config).unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_unknown_category_is_error() {
        let taxonomy = Taxonomy::from_json(
            r#"{"classes": [{"name": "Melody", "parent": "MusicalFeature"},
                            {"name": "MelodyDirection", "parent": "Melody"}],
                "categories": [{"category": "AscendingMelody", "parent": "MelodyDirection",
                                "triggers": ["HighArousal"]}]}"#,
        )
        .unwrap();
        let config = AffectConfig::default();
        let features = [FeatureInstance::new(FeatureCategory::Staccato)];
        let err = score(&features, None, &tempo(100.0), &taxonomy, &config).unwrap_err();
        assert!(matches!(err, AffectError::UnknownCategory(FeatureCategory::Staccato)));
    }

    #[test]
    fn test_out_of_range_tempo_is_error() {
        let taxonomy = default_taxonomy();
        let config = AffectConfig::default();
        let err = score(&NO_FEATURES, None, &tempo(250.0), &taxonomy, &config).unwrap_err();
        assert!(matches!(err, AffectError::TempoOutOfRange { .. }));
    }

    #[test]
    fn test_medium_arousal_contributes_nothing() {
        assert_eq!(effect_delta(EffectTag::MediumArousal), (Axis::Arousal, 0.0));
    }
}
