// Error taxonomy for track analysis.
//
// Every variant here is fatal to the track being analyzed: the meter chain
// carries state forward, so there is no meaningful partial affect curve once
// a meter fails. Soft absences (a meter with no notes, no dynamic marking
// seen yet, no predecessor note) are valid states and never reach this type.
//
// Independent tracks are isolated failure domains: `analyze_tracks` returns
// one `Result` per track so the caller decides whether to continue.

use score_affect_taxonomy::FeatureCategory;

#[derive(Debug, thiserror::Error)]
pub enum AffectError {
    /// Input-shape error in one meter (empty chord, pitch outside MIDI
    /// range, meter numbers out of order).
    #[error("meter {meter} is malformed: {reason}")]
    MalformedMeter { meter: u32, reason: String },

    /// Tempo outside the supported reference range. Never clamped.
    #[error("tempo {bpm} BPM is outside the supported range [{min}, {max}]")]
    TempoOutOfRange { bpm: f64, min: f64, max: f64 },

    /// A detected category has no row in the taxonomy table. Indicates a
    /// detector/taxonomy mismatch; never defaulted to a zero contribution.
    #[error("feature category {0} is not present in the taxonomy")]
    UnknownCategory(FeatureCategory),

    /// Guard against malformed input producing unbounded iteration.
    #[error("track has {count} meters, more than the limit of {limit}")]
    TooManyMeters { count: usize, limit: usize },

    #[error("configuration JSON is malformed: {0}")]
    Config(#[from] serde_json::Error),
}

impl AffectError {
    pub(crate) fn malformed(meter: u32, reason: impl Into<String>) -> Self {
        AffectError::MalformedMeter {
            meter,
            reason: reason.into(),
        }
    }
}
