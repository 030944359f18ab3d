// Parsed score representation: the input handed over by a score parser.
//
// A `Track` is an ordered sequence of `RawMeter`s plus the track-invariant
// tempo mark and mode. Each meter holds the events of its primary staff
// (notes, chords, rests, dynamic marks, possibly split into voices), the
// events of an optional secondary staff, directive annotations (wedges and
// words such as "accel." or "cresc") and an optional time signature.
//
// Parsing a notation interchange format into this shape is the parser's job;
// this crate only consumes it. Everything derives serde so a parser in any
// language can hand tracks over as JSON (`Track::from_json`).
//
// Pitches are MIDI numbers (middle C = 60). The notated octave is kept
// separately because the highest-note and melody-direction rules compare
// octave first, then pitch, which differs from plain MIDI order for
// enharmonic spellings such as B#3 vs C4.
//
// Consumed by detect.rs (per-meter features) and key.rs (mode estimation).

use crate::error::AffectError;
use serde::{Deserialize, Serialize};

/// Track mode (major/minor). A track whose mode could not be determined
/// carries `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Major,
    Minor,
}

/// Notated duration class of a note.
///
/// Declared shortest first so that `Ord` ranks longer durations higher:
/// `a.max(b)` is the longer of two durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NoteDuration {
    #[serde(rename = "64th")]
    SixtyFourth,
    #[serde(rename = "32nd")]
    ThirtySecond,
    #[serde(rename = "16th")]
    Sixteenth,
    #[serde(rename = "eighth")]
    Eighth,
    #[serde(rename = "quarter")]
    Quarter,
    #[serde(rename = "half")]
    Half,
    #[serde(rename = "whole")]
    Whole,
    #[serde(rename = "breve")]
    Breve,
}

impl NoteDuration {
    /// Length in quarter notes.
    pub fn quarter_length(self) -> f64 {
        match self {
            NoteDuration::SixtyFourth => 0.0625,
            NoteDuration::ThirtySecond => 0.125,
            NoteDuration::Sixteenth => 0.25,
            NoteDuration::Eighth => 0.5,
            NoteDuration::Quarter => 1.0,
            NoteDuration::Half => 2.0,
            NoteDuration::Whole => 4.0,
            NoteDuration::Breve => 8.0,
        }
    }
}

/// A single pitched event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// MIDI pitch number (0-127).
    pub pitch: u8,
    /// Notated octave (scientific pitch notation). Derived from `pitch` when
    /// the parser does not supply one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub octave: Option<i8>,
    pub duration: NoteDuration,
    /// Voice id from the voice markup, if the measure has any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    /// Articulation tokens ("staccato", "accent", ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub articulations: Vec<String>,
}

impl NoteEvent {
    pub fn new(pitch: u8, duration: NoteDuration) -> Self {
        NoteEvent {
            pitch,
            octave: None,
            duration,
            voice: None,
            articulations: Vec::new(),
        }
    }

    pub fn in_voice(mut self, voice: &str) -> Self {
        self.voice = Some(voice.to_string());
        self
    }

    pub fn with_articulation(mut self, token: &str) -> Self {
        self.articulations.push(token.to_string());
        self
    }

    /// Notated octave, or the octave implied by the MIDI number (C4 = 60).
    pub fn octave(&self) -> i8 {
        self.octave.unwrap_or((self.pitch / 12) as i8 - 1)
    }

    /// Sort key for "which note is higher": octave first, then pitch.
    pub fn height(&self) -> (i8, u8) {
        (self.octave(), self.pitch)
    }
}

/// A simultaneity of notes sharing a voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordEvent {
    pub notes: Vec<NoteEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub articulations: Vec<String>,
}

/// One event on a staff, in notated order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScoreEvent {
    Note(NoteEvent),
    Chord(ChordEvent),
    Rest { duration: NoteDuration },
    /// A dynamic marking token ("p", "mf", "ff", ...).
    Dynamic { mark: String },
}

impl ScoreEvent {
    /// Voice id of a note or chord; None for other events.
    pub fn voice(&self) -> Option<&str> {
        match self {
            ScoreEvent::Note(note) => note.voice.as_deref(),
            ScoreEvent::Chord(chord) => chord.voice.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WedgeKind {
    Crescendo,
    Diminuendo,
    Stop,
}

/// A directive annotation attached to the meter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Directive {
    Wedge { wedge: WedgeKind },
    /// Free text written on the staff ("accel.", "rit", "cresc", ...).
    Words { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub beats: u8,
    pub beat_type: u8,
}

/// One measure as delivered by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMeter {
    /// Measure number. Tracks may start at a number other than 1.
    pub number: u32,
    /// Events on the primary staff (notes, chords, rests, dynamics).
    #[serde(default)]
    pub primary: Vec<ScoreEvent>,
    /// Events on a secondary staff. Only articulations and dynamics are
    /// read from it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<Vec<ScoreEvent>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_signature: Option<TimeSignature>,
}

impl RawMeter {
    pub fn new(number: u32) -> Self {
        RawMeter {
            number,
            primary: Vec::new(),
            secondary: None,
            directives: Vec::new(),
            time_signature: None,
        }
    }

    pub fn with_notes(mut self, notes: impl IntoIterator<Item = NoteEvent>) -> Self {
        self.primary.extend(notes.into_iter().map(ScoreEvent::Note));
        self
    }

    pub fn with_event(mut self, event: ScoreEvent) -> Self {
        self.primary.push(event);
        self
    }

    pub fn with_dynamic(self, mark: &str) -> Self {
        self.with_event(ScoreEvent::Dynamic {
            mark: mark.to_string(),
        })
    }

    pub fn with_directive(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }

    /// Check the input-shape invariants the detector relies on.
    pub fn validate(&self) -> Result<(), AffectError> {
        let staves = std::iter::once(&self.primary).chain(self.secondary.as_ref());
        for events in staves {
            for event in events {
                match event {
                    ScoreEvent::Note(note) => self.check_pitch(note)?,
                    ScoreEvent::Chord(chord) => {
                        if chord.notes.is_empty() {
                            return Err(AffectError::malformed(self.number, "chord without notes"));
                        }
                        for note in &chord.notes {
                            self.check_pitch(note)?;
                        }
                    }
                    ScoreEvent::Rest { .. } | ScoreEvent::Dynamic { .. } => {}
                }
            }
        }
        if let Some(ts) = self.time_signature {
            if ts.beats == 0 || ts.beat_type == 0 {
                return Err(AffectError::malformed(
                    self.number,
                    format!("time signature {}/{}", ts.beats, ts.beat_type),
                ));
            }
        }
        Ok(())
    }

    fn check_pitch(&self, note: &NoteEvent) -> Result<(), AffectError> {
        if note.pitch > 127 {
            return Err(AffectError::malformed(
                self.number,
                format!("pitch {} outside MIDI range", note.pitch),
            ));
        }
        // Enharmonic spellings (B#3, Cb4) sit one octave off the MIDI number.
        if let Some(octave) = note.octave {
            let implied = i16::from(note.pitch / 12) - 1;
            if (i16::from(octave) - implied).abs() > 1 {
                return Err(AffectError::malformed(
                    self.number,
                    format!("octave {octave} contradicts pitch {}", note.pitch),
                ));
            }
        }
        Ok(())
    }
}

/// A complete score as delivered by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    /// Key mode, if the parser determined one.
    #[serde(default)]
    pub mode: Option<Mode>,
    /// Tempo mark in BPM. Absent or zero means the score carries none.
    #[serde(default)]
    pub tempo_bpm: Option<f64>,
    pub meters: Vec<RawMeter>,
}

impl Track {
    pub fn new(title: &str, mode: Option<Mode>, tempo_bpm: Option<f64>) -> Self {
        Track {
            title: title.to_string(),
            mode,
            tempo_bpm,
            meters: Vec::new(),
        }
    }

    pub fn with_meter(mut self, meter: RawMeter) -> Self {
        self.meters.push(meter);
        self
    }

    /// Parse a track from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Fill in a missing mode by key-profile estimation over the primary
    /// voice. A mode the parser already supplied is kept.
    pub fn with_estimated_mode(mut self) -> Self {
        if self.mode.is_none() {
            self.mode = crate::key::estimate_mode(&self.meters);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_order_longer_is_greater() {
        assert!(NoteDuration::Whole > NoteDuration::Half);
        assert!(NoteDuration::Quarter > NoteDuration::Eighth);
        assert!(NoteDuration::Sixteenth > NoteDuration::ThirtySecond);
        assert_eq!(
            NoteDuration::Eighth.max(NoteDuration::Half),
            NoteDuration::Half
        );
    }

    #[test]
    fn test_octave_derived_from_pitch() {
        assert_eq!(NoteEvent::new(60, NoteDuration::Quarter).octave(), 4);
        assert_eq!(NoteEvent::new(59, NoteDuration::Quarter).octave(), 3);
        let mut b_sharp = NoteEvent::new(60, NoteDuration::Quarter);
        b_sharp.octave = Some(3);
        assert_eq!(b_sharp.height(), (3, 60));
    }

    #[test]
    fn test_track_from_json() {
        let json = r#"{
            "title": "Etude",
            "mode": "minor",
            "tempo_bpm": 132,
            "meters": [
                {
                    "number": 1,
                    "time_signature": {"beats": 3, "beat_type": 4},
                    "primary": [
                        {"kind": "dynamic", "mark": "p"},
                        {
                            "kind": "note",
                            "pitch": 69,
                            "duration": "quarter",
                            "articulations": ["staccato"]
                        },
                        {"kind": "chord", "notes": [
                            {"pitch": 64, "duration": "half"},
                            {"pitch": 72, "duration": "half"}
                        ]},
                        {"kind": "rest", "duration": "16th"}
                    ],
                    "directives": [
                        {"kind": "words", "text": "rit."},
                        {"kind": "wedge", "wedge": "crescendo"}
                    ]
                },
                {"number": 2}
            ]
        }"#;
        let track = Track::from_json(json).unwrap();
        assert_eq!(track.mode, Some(Mode::Minor));
        assert_eq!(track.tempo_bpm, Some(132.0));
        assert_eq!(track.meters.len(), 2);
        let first = &track.meters[0];
        assert_eq!(first.primary.len(), 4);
        assert_eq!(first.time_signature, Some(TimeSignature { beats: 3, beat_type: 4 }));
        assert!(matches!(first.primary[3], ScoreEvent::Rest { duration: NoteDuration::Sixteenth }));
        assert!(track.meters[1].primary.is_empty());
    }

    #[test]
    fn test_validate_rejects_empty_chord() {
        let meter = RawMeter::new(4).with_event(ScoreEvent::Chord(ChordEvent {
            notes: Vec::new(),
            voice: None,
            articulations: Vec::new(),
        }));
        let err = meter.validate().unwrap_err();
        assert!(matches!(err, AffectError::MalformedMeter { meter: 4, .. }));
    }

    #[test]
    fn test_validate_rejects_out_of_range_pitch() {
        let meter = RawMeter::new(2).with_notes([NoteEvent::new(130, NoteDuration::Quarter)]);
        assert!(meter.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_contradictory_octave() {
        let spelled = |pitch: u8, octave: i8| {
            let mut note = NoteEvent::new(pitch, NoteDuration::Quarter);
            note.octave = Some(octave);
            note
        };
        // A rising line whose octaves would make it read as falling.
        for (pitch, octave) in [(40, 8), (80, 1), (90, 0)] {
            let meter = RawMeter::new(3).with_notes([spelled(pitch, octave)]);
            let err = meter.validate().unwrap_err();
            assert!(
                matches!(err, AffectError::MalformedMeter { meter: 3, .. }),
                "pitch {pitch} octave {octave}: {err}"
            );
        }
        // Chord members are checked too.
        let meter = RawMeter::new(5).with_event(ScoreEvent::Chord(ChordEvent {
            notes: vec![spelled(64, 4), spelled(67, 9)],
            voice: None,
            articulations: Vec::new(),
        }));
        assert!(meter.validate().is_err());

        // B#3 and Cb4 are enharmonic spellings one octave off the MIDI number.
        let meter = RawMeter::new(1).with_notes([spelled(60, 3), spelled(59, 4), spelled(60, 4)]);
        assert!(meter.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_time_signature() {
        let mut meter = RawMeter::new(1);
        meter.time_signature = Some(TimeSignature { beats: 4, beat_type: 0 });
        assert!(meter.validate().is_err());
    }

    #[test]
    fn test_validate_checks_secondary_staff() {
        let mut meter = RawMeter::new(9);
        meter.secondary = Some(vec![ScoreEvent::Note(NoteEvent::new(200, NoteDuration::Half))]);
        assert!(meter.validate().is_err());
    }
}
