// Score Affect Engine
//
// Scores a symbolic music score meter by meter on two affect axes: valence
// (pleasant/unpleasant) and arousal (calm/excited). Each meter's musical
// features (dynamics, articulations, directives, melody direction, pitch
// height and range, intervals) are detected, looked up in the static
// feature taxonomy, and reduced to an (arousal, valence) pair together with
// the track's tempo and mode. The result is two equal-length time series per
// track.
//
// Architecture:
// - score.rs: Parsed score input model (Track, RawMeter, notes, chords,
//   dynamics, directives) as handed over by a score parser, JSON via serde
// - config.rs: AffectConfig with every design constant (tempo range,
//   duration weights, thresholds, meter limit)
// - error.rs: AffectError (malformed meter, tempo range, unknown category,
//   meter limit, bad config)
// - interval.rs: Interval classification with the longer-note duration label
// - tempo.rs: Tempo bands, default tempo, BPM-to-arousal mapping
// - key.rs: Krumhansl-Schmuckler mode estimation for tracks without a mode
// - detect.rs: Per-meter feature detection with explicit carried state
// - scoring.rs: Per-meter affect reduction (weights, mode suppression,
//   order-independent summation)
// - summary.rs: Valence/arousal bands and track averages
// - sequencer.rs: Track driver (sequential per track, rayon across tracks)
//
// The taxonomy itself lives in the score_affect_taxonomy crate. Analysis is
// a pure function of the track, the taxonomy and the config.

pub mod config;
pub mod detect;
pub mod error;
pub mod interval;
pub mod key;
pub mod score;
pub mod scoring;
pub mod sequencer;
pub mod summary;
pub mod tempo;

pub use config::AffectConfig;
pub use error::AffectError;
pub use score::{Mode, RawMeter, Track};
pub use sequencer::{AffectSeries, MeterAffect, analyze_track, analyze_tracks};
pub use summary::{ArousalBand, TrackSummary, ValenceBand};
