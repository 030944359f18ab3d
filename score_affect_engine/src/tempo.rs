// Track tempo: category classification and arousal contribution.
//
// A track has exactly one tempo. The parser hands over the first metronome
// mark in BPM (or nothing); `resolve_tempo` turns that into a
// `ResolvedTempo` (category + BPM), falling back to the configured default
// (Andante, 96 BPM) when the score has no mark or a mark of 0.
//
// The arousal contribution of tempo is a linear map of BPM from the
// configured reference range ([30, 220] by default) onto
// [min_arousal, max_arousal] ([-10, 10]). BPM outside the reference range is
// a range error, never clamped.

use crate::config::TempoConfig;
use crate::error::AffectError;
use score_affect_taxonomy::FeatureCategory;
use serde::{Deserialize, Serialize};

/// Named tempo bands, slowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TempoCategory {
    Grave,
    Largo,
    Adagio,
    Andante,
    Moderato,
    Allegro,
    Vivace,
    Presto,
    Prestissimo,
}

impl TempoCategory {
    /// Band a BPM value. Band upper bounds are inclusive.
    pub fn from_bpm(bpm: f64) -> TempoCategory {
        match bpm {
            b if b <= 40.0 => TempoCategory::Grave,
            b if b <= 55.0 => TempoCategory::Largo,
            b if b <= 71.0 => TempoCategory::Adagio,
            b if b <= 108.0 => TempoCategory::Andante,
            b if b <= 120.0 => TempoCategory::Moderato,
            b if b <= 156.0 => TempoCategory::Allegro,
            b if b <= 168.0 => TempoCategory::Vivace,
            b if b <= 200.0 => TempoCategory::Presto,
            _ => TempoCategory::Prestissimo,
        }
    }

    pub fn category(self) -> FeatureCategory {
        match self {
            TempoCategory::Grave => FeatureCategory::Grave,
            TempoCategory::Largo => FeatureCategory::LargoTempo,
            TempoCategory::Adagio => FeatureCategory::Adagio,
            TempoCategory::Andante => FeatureCategory::Andante,
            TempoCategory::Moderato => FeatureCategory::Moderato,
            TempoCategory::Allegro => FeatureCategory::AllegroTempo,
            TempoCategory::Vivace => FeatureCategory::Vivace,
            TempoCategory::Presto => FeatureCategory::PrestoTempo,
            TempoCategory::Prestissimo => FeatureCategory::Prestissimo,
        }
    }
}

/// The single tempo that applies to every meter of a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTempo {
    pub category: TempoCategory,
    pub bpm: f64,
    /// True when the score had no mark (or 0) and the default was used.
    pub defaulted: bool,
}

/// Resolve a track's tempo mark. Only an absent or zero mark falls back to
/// `config.default_bpm`; any other value is kept as given, so a negative or
/// non-finite mark fails the range check in `tempo_contribution`.
pub fn resolve_tempo(tempo_bpm: Option<f64>, config: &TempoConfig) -> ResolvedTempo {
    match tempo_bpm {
        Some(bpm) if bpm != 0.0 => ResolvedTempo {
            category: TempoCategory::from_bpm(bpm),
            bpm,
            defaulted: false,
        },
        _ => {
            log::warn!(
                "no tempo mark ({:?}), assuming {} BPM",
                tempo_bpm,
                config.default_bpm
            );
            ResolvedTempo {
                category: TempoCategory::from_bpm(config.default_bpm),
                bpm: config.default_bpm,
                defaulted: true,
            }
        }
    }
}

/// Map BPM linearly from the reference range onto the arousal range.
pub fn bpm_to_arousal(bpm: f64, config: &TempoConfig) -> Result<f64, AffectError> {
    if !(config.min_bpm..=config.max_bpm).contains(&bpm) {
        return Err(AffectError::TempoOutOfRange {
            bpm,
            min: config.min_bpm,
            max: config.max_bpm,
        });
    }
    let normalized = (bpm - config.min_bpm) / (config.max_bpm - config.min_bpm);
    Ok(normalized * (config.max_arousal - config.min_arousal) + config.min_arousal)
}

/// Arousal added to every meter for the track's tempo, rounded to three
/// decimals.
pub fn tempo_contribution(tempo: &ResolvedTempo, config: &TempoConfig) -> Result<f64, AffectError> {
    let arousal = bpm_to_arousal(tempo.bpm, config)?;
    Ok((arousal * 1000.0).round() / 1000.0)
}
