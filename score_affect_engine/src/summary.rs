// Coarse affect bands and whole-track summaries.
//
// Bands divide each axis into four named regions so reports can label a
// meter ("very positive, medium-low arousal") without exposing raw numbers.
// Band edges are inclusive lower bounds.

use crate::scoring::AffectScore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValenceBand {
    VeryPositive,
    LowPositive,
    LowNegative,
    VeryNegative,
}

impl ValenceBand {
    pub fn from_valence(valence: f64) -> ValenceBand {
        if valence >= 3.9 {
            ValenceBand::VeryPositive
        } else if valence >= 0.25 {
            ValenceBand::LowPositive
        } else if valence >= -3.9 {
            ValenceBand::LowNegative
        } else {
            ValenceBand::VeryNegative
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArousalBand {
    VeryHigh,
    MediumHigh,
    MediumLow,
    VeryLow,
}

impl ArousalBand {
    pub fn from_arousal(arousal: f64) -> ArousalBand {
        if arousal >= 7.0 {
            ArousalBand::VeryHigh
        } else if arousal >= 0.4 {
            ArousalBand::MediumHigh
        } else if arousal >= -4.5 {
            ArousalBand::MediumLow
        } else {
            ArousalBand::VeryLow
        }
    }
}

/// Both bands of one meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectBands {
    pub valence: ValenceBand,
    pub arousal: ArousalBand,
}

impl AffectBands {
    pub fn of(score: &AffectScore) -> AffectBands {
        AffectBands {
            valence: ValenceBand::from_valence(score.valence),
            arousal: ArousalBand::from_arousal(score.arousal),
        }
    }
}

/// Track-level averages. A track without meters averages to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub meters: usize,
    pub mean_valence: f64,
    pub mean_arousal: f64,
}

impl TrackSummary {
    pub fn from_scores<'a>(scores: impl IntoIterator<Item = &'a AffectScore>) -> TrackSummary {
        let mut meters = 0;
        let mut valence = 0.0;
        let mut arousal = 0.0;
        for score in scores {
            meters += 1;
            valence += score.valence;
            arousal += score.arousal;
        }
        if meters == 0 {
            return TrackSummary {
                meters,
                mean_valence: 0.0,
                mean_arousal: 0.0,
            };
        }
        TrackSummary {
            meters,
            mean_valence: valence / meters as f64,
            mean_arousal: arousal / meters as f64,
        }
    }

    pub fn bands(&self) -> AffectBands {
        AffectBands::of(&AffectScore {
            arousal: self.mean_arousal,
            valence: self.mean_valence,
        })
    }
}
