// Track driver: runs detection and scoring over every meter of a track.
//
// A single forward pass. The tempo and mode are resolved once at track
// start; `CarriedState` is then threaded through `detect::detect` meter by
// meter, and each meter's features are reduced by `scoring::score`. Meters
// must be processed in order (last note and last dynamic carry forward), so
// there is no parallelism within a track.
//
// Any error aborts the track: there is no meaningful partial affect curve
// once the state chain is broken. Independent tracks share nothing but the
// read-only taxonomy and config, so `analyze_tracks` fans them out over
// rayon and returns one `Result` per track.
//
// The output `AffectSeries` holds one `MeterAffect` per input meter, in
// input order; `valence()` and `arousal()` give the two equal-length
// series for plotting or reporting.

use crate::config::AffectConfig;
use crate::detect::{CarriedState, FeatureSet, detect};
use crate::error::AffectError;
use crate::score::{Mode, TimeSignature, Track};
use crate::scoring::{AffectScore, score};
use crate::summary::{AffectBands, TrackSummary};
use crate::tempo::{ResolvedTempo, resolve_tempo, tempo_contribution};
use rayon::prelude::*;
use score_affect_taxonomy::Taxonomy;
use serde::{Deserialize, Serialize};

/// The scored affect of one meter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterAffect {
    pub number: u32,
    pub valence: f64,
    pub arousal: f64,
    pub features: FeatureSet,
    pub bands: AffectBands,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_signature: Option<TimeSignature>,
}

impl MeterAffect {
    pub fn score(&self) -> AffectScore {
        AffectScore {
            arousal: self.arousal,
            valence: self.valence,
        }
    }
}

/// Per-meter affect of a whole track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectSeries {
    pub title: String,
    pub mode: Option<Mode>,
    pub tempo: ResolvedTempo,
    pub meters: Vec<MeterAffect>,
}

impl AffectSeries {
    pub fn len(&self) -> usize {
        self.meters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meters.is_empty()
    }

    /// Valence per meter, in meter order.
    pub fn valence(&self) -> Vec<f64> {
        self.meters.iter().map(|m| m.valence).collect()
    }

    /// Arousal per meter, in meter order.
    pub fn arousal(&self) -> Vec<f64> {
        self.meters.iter().map(|m| m.arousal).collect()
    }

    pub fn summary(&self) -> TrackSummary {
        let scores: Vec<AffectScore> = self.meters.iter().map(MeterAffect::score).collect();
        TrackSummary::from_scores(&scores)
    }
}

/// Analyze one track.
pub fn analyze_track(
    track: &Track,
    taxonomy: &Taxonomy,
    config: &AffectConfig,
) -> Result<AffectSeries, AffectError> {
    let limit = config.limits.max_meters_per_track;
    if track.meters.len() > limit {
        return Err(AffectError::TooManyMeters {
            count: track.meters.len(),
            limit,
        });
    }

    let tempo = resolve_tempo(track.tempo_bpm, &config.tempo);
    // Range errors are fatal before any meter is looked at.
    tempo_contribution(&tempo, &config.tempo)?;

    let mut state = CarriedState::new(track.mode, tempo);
    let mut meters = Vec::with_capacity(track.meters.len());
    let mut previous_number = None;

    for raw in &track.meters {
        if let Some(previous) = previous_number {
            if raw.number <= previous {
                return Err(AffectError::malformed(
                    raw.number,
                    format!("meter number does not follow meter {previous}"),
                ));
            }
        }
        previous_number = Some(raw.number);

        let (detected, next) = detect(raw, state, taxonomy, &config.thresholds)?;
        let affect = score(&detected.features, next.mode, &next.tempo, taxonomy, config)?;
        log::debug!(
            "{}: meter {} has {} features, arousal {:.3}, valence {:.3}",
            track.title,
            detected.number,
            detected.features.len(),
            affect.arousal,
            affect.valence
        );
        log::trace!(
            "{}: carrying dynamic {:?}, note {:?}",
            track.title,
            next.last_dynamic,
            next.last_note.as_ref().map(|n| n.pitch)
        );

        meters.push(MeterAffect {
            number: detected.number,
            valence: affect.valence,
            arousal: affect.arousal,
            features: detected.features,
            bands: AffectBands::of(&affect),
            time_signature: detected.time_signature,
        });
        state = next;
    }

    let series = AffectSeries {
        title: track.title.clone(),
        mode: track.mode,
        tempo,
        meters,
    };
    let summary = series.summary();
    log::info!(
        "{}: scored {} meters ({:?}, {:?}), mean arousal {:.3}, mean valence {:.3}",
        series.title,
        summary.meters,
        series.mode,
        series.tempo.category,
        summary.mean_arousal,
        summary.mean_valence
    );
    Ok(series)
}

/// Analyze independent tracks in parallel. Results are in input order and
/// one failing track does not affect the others.
pub fn analyze_tracks(
    tracks: &[Track],
    taxonomy: &Taxonomy,
    config: &AffectConfig,
) -> Vec<Result<AffectSeries, AffectError>> {
    tracks
        .par_iter()
        .map(|track| analyze_track(track, taxonomy, config))
        .collect()
}
