// Per-meter feature detection.
//
// Given one parsed meter and the state carried over from the previous meter,
// produces the meter's feature set and the state for the next meter. The
// detection steps are independent of each other within a meter:
//
// - Dynamics: every recognized marking on either staff is emitted; with no
//   marking the carried last dynamic is re-emitted (dynamics persist until
//   changed). "sf"/"sfz" marks emit the Sforzando instruction instead.
// - Articulations: from the primary voice's notes and every note on the
//   secondary staff, at most one feature per category.
// - Directives: wedges and words give at most one dynamic shape and one
//   rhythm change (last one wins), plus deduplicated direct instructions.
// - Melody direction, average pitch, pitch range and intervals: from the
//   primary voice, with the carried last note as the predecessor of the
//   first note. A meter without notes emits none of these and clears the
//   carried note, so no interval spans a silent meter.
//
// Primary voice: voice "1", unvoiced events, or everything when the meter
// has no voice markup at all. Chords reduce to their highest note (octave
// first, then pitch; the first of equal notes wins).
//
// Consumed by sequencer.rs, which threads `CarriedState` from meter to meter
// and hands each `FeatureSet` to scoring.rs.

use crate::config::ThresholdConfig;
use crate::error::AffectError;
use crate::interval::classify_interval;
use crate::score::{
    Directive, Mode, NoteDuration, NoteEvent, RawMeter, ScoreEvent, TimeSignature, WedgeKind,
};
use crate::tempo::ResolvedTempo;
use score_affect_taxonomy::{FeatureCategory, Taxonomy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One detected feature: a category plus, for intervals, the duration label
/// and frequency ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureInstance {
    pub category: FeatureCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<NoteDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<String>,
}

impl FeatureInstance {
    pub fn new(category: FeatureCategory) -> Self {
        FeatureInstance {
            category,
            duration: None,
            ratio: None,
        }
    }

    pub fn with_duration(category: FeatureCategory, duration: NoteDuration) -> Self {
        FeatureInstance {
            category,
            duration: Some(duration),
            ratio: None,
        }
    }
}

/// The features detected in one meter. Order carries no meaning; interval
/// and dynamic features may repeat, other categories appear at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet(Vec<FeatureInstance>);

impl FeatureSet {
    pub fn new() -> Self {
        FeatureSet(Vec::new())
    }

    pub fn push(&mut self, feature: FeatureInstance) {
        self.0.push(feature);
    }

    /// Add a plain feature unless its category is already present.
    pub fn push_unique(&mut self, category: FeatureCategory) {
        if !self.contains(category) {
            self.0.push(FeatureInstance::new(category));
        }
    }

    pub fn contains(&self, category: FeatureCategory) -> bool {
        self.0.iter().any(|f| f.category == category)
    }

    pub fn count(&self, category: FeatureCategory) -> usize {
        self.0.iter().filter(|f| f.category == category).count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeatureInstance> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[FeatureInstance] {
        &self.0
    }
}

impl From<Vec<FeatureInstance>> for FeatureSet {
    fn from(features: Vec<FeatureInstance>) -> Self {
        FeatureSet(features)
    }
}

impl<'a> IntoIterator for &'a FeatureSet {
    type Item = &'a FeatureInstance;
    type IntoIter = std::slice::Iter<'a, FeatureInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// State threaded from one meter to the next within a single track.
#[derive(Debug, Clone, PartialEq)]
pub struct CarriedState {
    pub last_dynamic: Option<FeatureCategory>,
    /// Last primary-voice note of the previous meter; None after a meter
    /// without notes.
    pub last_note: Option<NoteEvent>,
    pub last_time_signature: Option<TimeSignature>,
    /// Track-invariant; never changed by detection.
    pub mode: Option<Mode>,
    /// Track-invariant; never changed by detection.
    pub tempo: ResolvedTempo,
}

impl CarriedState {
    /// Initial state at the start of a track.
    pub fn new(mode: Option<Mode>, tempo: ResolvedTempo) -> Self {
        CarriedState {
            last_dynamic: None,
            last_note: None,
            last_time_signature: None,
            mode,
            tempo,
        }
    }
}

/// Detection output for one meter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedMeter {
    pub number: u32,
    pub features: FeatureSet,
    /// Primary-voice notes after chord reduction.
    pub note_count: usize,
    /// The meter's own time signature, or the last one in effect.
    pub time_signature: Option<TimeSignature>,
}

/// Detect one meter's features given the carried state.
pub fn detect(
    meter: &RawMeter,
    state: CarriedState,
    taxonomy: &Taxonomy,
    thresholds: &ThresholdConfig,
) -> Result<(DetectedMeter, CarriedState), AffectError> {
    meter.validate()?;

    let mut features = FeatureSet::new();
    let mut next = state;

    // Dynamics
    let mut levels = Vec::new();
    for mark in dynamic_marks(meter) {
        match dynamic_token(mark) {
            Some(DynamicToken::Level(category)) => levels.push(category),
            Some(DynamicToken::Sforzando) => features.push_unique(FeatureCategory::Sforzando),
            None => log::warn!("meter {}: ignoring dynamic mark {:?}", meter.number, mark),
        }
    }
    if let Some(&last) = levels.last() {
        for &category in &levels {
            features.push(FeatureInstance::new(category));
        }
        next.last_dynamic = Some(last);
    } else if let Some(carried) = next.last_dynamic {
        features.push(FeatureInstance::new(carried));
    }

    // Articulations
    let notes = primary_voice_notes(&meter.primary);
    let secondary_tokens = meter
        .secondary
        .iter()
        .flatten()
        .flat_map(articulation_tokens);
    let primary_tokens = primary_voice_events(&meter.primary).flat_map(articulation_tokens);
    for token in primary_tokens.chain(secondary_tokens) {
        match articulation_category(token) {
            Some(category) => features.push_unique(category),
            None => log::debug!("meter {}: ignoring articulation {:?}", meter.number, token),
        }
    }

    // Directives
    let directives = read_directives(&meter.directives);
    if let Some(shape) = directives.dynamic_shape {
        features.push_unique(shape);
    }
    if let Some(change) = directives.rhythm_change {
        features.push_unique(change);
    }
    for instruction in directives.instructions {
        features.push_unique(instruction);
    }

    // Melody
    if notes.is_empty() {
        if next.last_note.is_some() {
            log::trace!("meter {}: no notes, clearing carried note", meter.number);
        }
        next.last_note = None;
    } else {
        let predecessor = next.last_note.as_ref();

        let steps = melody_steps(predecessor, &notes);
        features.push_unique(classify_direction(steps, thresholds.direction_threshold));

        let pitches: Vec<u8> = notes.iter().map(|n| n.pitch).collect();
        let average = pitches.iter().map(|&p| p as f64).sum::<f64>() / pitches.len() as f64;
        features.push_unique(classify_average_pitch(average, thresholds));

        let highest = pitches.iter().copied().max().unwrap_or_default();
        let lowest = pitches.iter().copied().min().unwrap_or_default();
        if let Some(range) = classify_pitch_range(highest - lowest, thresholds) {
            features.push_unique(range);
        }

        let pairs = predecessor
            .map(|prev| (prev, notes[0]))
            .into_iter()
            .chain(notes.windows(2).map(|pair| (pair[0], pair[1])));
        for (a, b) in pairs {
            let (interval, duration) = classify_interval(a.pitch, b.pitch, a.duration, b.duration);
            let category = interval.category();
            features.push(FeatureInstance {
                category,
                duration: Some(duration),
                ratio: taxonomy.ratio(category).map(str::to_string),
            });
        }

        next.last_note = notes.last().copied().cloned();
    }

    if meter.time_signature.is_some() {
        next.last_time_signature = meter.time_signature;
    }

    let detected = DetectedMeter {
        number: meter.number,
        features,
        note_count: notes.len(),
        time_signature: next.last_time_signature,
    };
    Ok((detected, next))
}

/// Notes and chords that belong to the primary voice.
///
/// With no voice markup anywhere in the meter, every note and chord belongs
/// to it; otherwise voice "1" and unvoiced events do.
pub(crate) fn primary_voice_events(events: &[ScoreEvent]) -> impl Iterator<Item = &ScoreEvent> {
    let voiced = events.iter().any(|e| e.voice().is_some());
    events.iter().filter(move |event| match event {
        ScoreEvent::Note(_) | ScoreEvent::Chord(_) => {
            !voiced || matches!(event.voice(), None | Some("1"))
        }
        _ => false,
    })
}

/// Ordered primary-voice notes with chords reduced to their highest note.
pub(crate) fn primary_voice_notes(events: &[ScoreEvent]) -> Vec<&NoteEvent> {
    primary_voice_events(events)
        .filter_map(|event| match event {
            ScoreEvent::Note(note) => Some(note),
            ScoreEvent::Chord(chord) => highest_note(&chord.notes),
            _ => None,
        })
        .collect()
}

/// Highest note of a chord: octave first, then pitch. Ties keep the earlier
/// note.
pub fn highest_note(notes: &[NoteEvent]) -> Option<&NoteEvent> {
    let mut iter = notes.iter();
    let first = iter.next()?;
    Some(iter.fold(first, |best, note| {
        if note.height() > best.height() { note } else { best }
    }))
}

/// +1 if `b` is higher than `a`, -1 if lower, 0 if equal.
fn step(a: &NoteEvent, b: &NoteEvent) -> i32 {
    match b.height().cmp(&a.height()) {
        Ordering::Greater => 1,
        Ordering::Less => -1,
        Ordering::Equal => 0,
    }
}

/// Net signed step count across the meter, including the step from the
/// carried predecessor into the first note.
pub fn melody_steps(predecessor: Option<&NoteEvent>, notes: &[&NoteEvent]) -> i32 {
    let cross = match (predecessor, notes.first()) {
        (Some(prev), Some(first)) => step(prev, first),
        _ => 0,
    };
    cross + notes.windows(2).map(|pair| step(pair[0], pair[1])).sum::<i32>()
}

pub fn classify_direction(steps: i32, threshold: i32) -> FeatureCategory {
    if steps > threshold {
        FeatureCategory::AscendingMelody
    } else if steps < -threshold {
        FeatureCategory::DescendingMelody
    } else {
        FeatureCategory::UndulatingMelody
    }
}

pub fn classify_average_pitch(average: f64, thresholds: &ThresholdConfig) -> FeatureCategory {
    if average > thresholds.high_pitch_above {
        FeatureCategory::HighPitch
    } else if average < thresholds.low_pitch_below {
        FeatureCategory::LowPitch
    } else {
        FeatureCategory::MediumPitch
    }
}

/// Narrow or wide range; None inside the indifference band between them.
pub fn classify_pitch_range(range: u8, thresholds: &ThresholdConfig) -> Option<FeatureCategory> {
    if range < thresholds.narrow_range_below {
        Some(FeatureCategory::NarrowPitchRange)
    } else if range > thresholds.wide_range_above {
        Some(FeatureCategory::WidePitchRange)
    } else {
        None
    }
}

enum DynamicToken {
    Level(FeatureCategory),
    Sforzando,
}

fn dynamic_token(mark: &str) -> Option<DynamicToken> {
    let level = match mark.trim() {
        "pp" => FeatureCategory::Pianissimo,
        "p" => FeatureCategory::Piano,
        "mp" | "m" => FeatureCategory::MezzoPiano,
        "mf" => FeatureCategory::MezzoForte,
        "f" => FeatureCategory::Forte,
        "ff" => FeatureCategory::Fortissimo,
        "sf" | "sfz" => return Some(DynamicToken::Sforzando),
        _ => return None,
    };
    Some(DynamicToken::Level(level))
}

/// Dynamic marks in notated order: primary staff first, then secondary.
fn dynamic_marks(meter: &RawMeter) -> impl Iterator<Item = &str> {
    meter
        .primary
        .iter()
        .chain(meter.secondary.iter().flatten())
        .filter_map(|event| match event {
            ScoreEvent::Dynamic { mark } => Some(mark.as_str()),
            _ => None,
        })
}

fn articulation_tokens(event: &ScoreEvent) -> Box<dyn Iterator<Item = &str> + '_> {
    match event {
        ScoreEvent::Note(note) => Box::new(note.articulations.iter().map(String::as_str)),
        ScoreEvent::Chord(chord) => Box::new(
            chord
                .articulations
                .iter()
                .chain(chord.notes.iter().flat_map(|n| n.articulations.iter()))
                .map(String::as_str),
        ),
        _ => Box::new(std::iter::empty()),
    }
}

fn articulation_category(token: &str) -> Option<FeatureCategory> {
    match token.trim().to_ascii_lowercase().as_str() {
        "accent" => Some(FeatureCategory::Accent),
        "staccato" => Some(FeatureCategory::Staccato),
        "legato" => Some(FeatureCategory::Legato),
        "tenuto" => Some(FeatureCategory::Tenuto),
        _ => None,
    }
}

#[derive(Default)]
struct DirectiveFeatures {
    dynamic_shape: Option<FeatureCategory>,
    rhythm_change: Option<FeatureCategory>,
    instructions: Vec<FeatureCategory>,
}

/// Read wedges and words. Later directives override earlier ones for the
/// dynamic shape and the rhythm change.
fn read_directives(directives: &[Directive]) -> DirectiveFeatures {
    let mut out = DirectiveFeatures::default();
    for directive in directives {
        match directive {
            Directive::Wedge { wedge } => match wedge {
                WedgeKind::Crescendo => out.dynamic_shape = Some(FeatureCategory::Crescendo),
                WedgeKind::Diminuendo => out.dynamic_shape = Some(FeatureCategory::Diminuendo),
                WedgeKind::Stop => {}
            },
            Directive::Words { text } => {
                let word = text.trim().trim_end_matches('.').to_ascii_lowercase();
                match word.as_str() {
                    "accel" | "accelerando" => {
                        out.rhythm_change = Some(FeatureCategory::Accelerando)
                    }
                    "rit" | "ritardando" => out.rhythm_change = Some(FeatureCategory::Ritardando),
                    "riten" | "ritenuto" => out.rhythm_change = Some(FeatureCategory::Ritenuto),
                    "cresc" | "crescendo" => out.dynamic_shape = Some(FeatureCategory::Crescendo),
                    "dim" | "diminuendo" => out.dynamic_shape = Some(FeatureCategory::Diminuendo),
                    "scherzando" => out.instructions.push(FeatureCategory::Scherzando),
                    "vivo" => out.instructions.push(FeatureCategory::Vivo),
                    "largo" => out.instructions.push(FeatureCategory::Largo),
                    "allegro" => out.instructions.push(FeatureCategory::AllegroInstruction),
                    "presto" => out.instructions.push(FeatureCategory::PrestoInstruction),
                    _ => {}
                }
            }
        }
    }
    out
}
