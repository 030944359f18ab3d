// Core taxonomy types: feature classes, leaf feature categories, and effect tags.
//
// These types are shared by the engine crate (detection and scoring) and by
// anything that wants to read the taxonomy table on its own. The hierarchy is
// expressed as data rather than as nested Rust types:
// - `FeatureClass`: an inner node of the musical-feature hierarchy
//   (Tempo, Intervals, Tone, Dynamics, ...). `MusicalFeature` is the root.
// - `FeatureCategory`: a leaf classification that detection emits and
//   scoring looks up (Staccato, PerfectFifthInterval, HighPitch, ...).
// - `EffectTag`: a named affect a category triggers (HighArousal, ...).
//
// Which class a category belongs to and which tags it triggers live in
// `data/feature_taxonomy.json`, loaded by `Taxonomy` in lib.rs.
//
// Serde names are the variant names verbatim, matching the JSON table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inner node of the feature hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeatureClass {
    /// Root of the hierarchy. Never declared in the table.
    MusicalFeature,
    Rhythm,
    Tempo,
    SlowTempo,
    MediumTempo,
    FastTempo,
    RhythmChange,
    Melody,
    MelodyRange,
    MelodyDirection,
    Intervals,
    ConsonantIntervals,
    IntermediateIntervals,
    DissonantIntervals,
    MelodyMotion,
    Phrasing,
    PhrasingLength,
    MelodyConsistency,
    MelodyCadence,
    Articulation,
    DynamicShape,
    Dynamics,
    SoftDynamics,
    ModerateDynamics,
    LoudDynamics,
    DirectInstructions,
    Tone,
    Pitch,
    PitchRange,
    Timbre,
    Mode,
    Harmony,
    ChordType,
    ChordChangeRate,
    TonalModulation,
    ModulationExpectancy,
    ExpectedTonalModulation,
    UnexpectedTonalModulation,
    AmbiguousTonalModulation,
}

/// Leaf feature category. Every value detection can emit is one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeatureCategory {
    // Tempo
    Grave,
    LargoTempo,
    Adagio,
    Andante,
    Moderato,
    Allegretto,
    AllegroModerato,
    AllegroTempo,
    Vivace,
    PrestoTempo,
    Prestissimo,
    // Rhythm change
    Accelerando,
    Ritenuto,
    Ritardando,
    // Melody range and direction
    WideMelodyRange,
    NarrowMelodyRange,
    AscendingMelody,
    DescendingMelody,
    UndulatingMelody,
    // Intervals
    UnisonInterval,
    OctaveInterval,
    PerfectFifthInterval,
    PerfectFourthInterval,
    MajorThirdInterval,
    MajorSixthInterval,
    MinorThirdInterval,
    MinorSixthInterval,
    AugmentedFourthInterval,
    MinorSeventhInterval,
    MajorSecondInterval,
    MajorSeventhInterval,
    MinorSecondInterval,
    // Melody motion and phrasing
    ConjunctMelody,
    DisjunctMelody,
    ShortPhrasingLength,
    LongPhrasingLength,
    ConsistentMelody,
    InconsistentMelody,
    PerfectCadence,
    ImperfectCadence,
    PlagalCadence,
    InterruptedCadence,
    // Articulation
    Legato,
    Staccato,
    Tenuto,
    Accent,
    // Dynamic shape
    Crescendo,
    Diminuendo,
    // Dynamics
    Pianissimo,
    Piano,
    MezzoPiano,
    MezzoForte,
    Forte,
    Fortissimo,
    // Direct instructions
    Scherzando,
    Sforzando,
    Vivo,
    Largo,
    AllegroInstruction,
    PrestoInstruction,
    // Tone
    HighPitch,
    MediumPitch,
    LowPitch,
    NarrowPitchRange,
    WidePitchRange,
    BrightTimbre,
    MellowTimbre,
    HarshTimbre,
    // Mode
    MajorMode,
    MinorMode,
    // Harmony
    MajorChord,
    MinorChord,
    MajorSeventhChord,
    MinorSeventhChord,
    NinthChord,
    DiminishedChord,
    SuspendedFourthChord,
    SeventhMinorNinthChord,
    AddedNinthChord,
    SlowChordChangeRate,
    MediumChordChangeRate,
    FastChordChangeRate,
    // Tonal modulation
    ExpectedMajorToMajor,
    ExpectedMajorToMinor,
    ExpectedMinorToMajor,
    ExpectedMinorToMinor,
    UnexpectedMajorToMajor,
    UnexpectedMajorToMinor,
    UnexpectedMinorToMajor,
    UnexpectedMinorToMinor,
    AmbiguousMajorToMajor,
    AmbiguousMajorToMinor,
    AmbiguousMinorToMajor,
    AmbiguousMinorToMinor,
}

impl FeatureCategory {
    /// Every leaf category, in declaration order.
    pub const ALL: [FeatureCategory; 94] = [
        FeatureCategory::Grave,
        FeatureCategory::LargoTempo,
        FeatureCategory::Adagio,
        FeatureCategory::Andante,
        FeatureCategory::Moderato,
        FeatureCategory::Allegretto,
        FeatureCategory::AllegroModerato,
        FeatureCategory::AllegroTempo,
        FeatureCategory::Vivace,
        FeatureCategory::PrestoTempo,
        FeatureCategory::Prestissimo,
        FeatureCategory::Accelerando,
        FeatureCategory::Ritenuto,
        FeatureCategory::Ritardando,
        FeatureCategory::WideMelodyRange,
        FeatureCategory::NarrowMelodyRange,
        FeatureCategory::AscendingMelody,
        FeatureCategory::DescendingMelody,
        FeatureCategory::UndulatingMelody,
        FeatureCategory::UnisonInterval,
        FeatureCategory::OctaveInterval,
        FeatureCategory::PerfectFifthInterval,
        FeatureCategory::PerfectFourthInterval,
        FeatureCategory::MajorThirdInterval,
        FeatureCategory::MajorSixthInterval,
        FeatureCategory::MinorThirdInterval,
        FeatureCategory::MinorSixthInterval,
        FeatureCategory::AugmentedFourthInterval,
        FeatureCategory::MinorSeventhInterval,
        FeatureCategory::MajorSecondInterval,
        FeatureCategory::MajorSeventhInterval,
        FeatureCategory::MinorSecondInterval,
        FeatureCategory::ConjunctMelody,
        FeatureCategory::DisjunctMelody,
        FeatureCategory::ShortPhrasingLength,
        FeatureCategory::LongPhrasingLength,
        FeatureCategory::ConsistentMelody,
        FeatureCategory::InconsistentMelody,
        FeatureCategory::PerfectCadence,
        FeatureCategory::ImperfectCadence,
        FeatureCategory::PlagalCadence,
        FeatureCategory::InterruptedCadence,
        FeatureCategory::Legato,
        FeatureCategory::Staccato,
        FeatureCategory::Tenuto,
        FeatureCategory::Accent,
        FeatureCategory::Crescendo,
        FeatureCategory::Diminuendo,
        FeatureCategory::Pianissimo,
        FeatureCategory::Piano,
        FeatureCategory::MezzoPiano,
        FeatureCategory::MezzoForte,
        FeatureCategory::Forte,
        FeatureCategory::Fortissimo,
        FeatureCategory::Scherzando,
        FeatureCategory::Sforzando,
        FeatureCategory::Vivo,
        FeatureCategory::Largo,
        FeatureCategory::AllegroInstruction,
        FeatureCategory::PrestoInstruction,
        FeatureCategory::HighPitch,
        FeatureCategory::MediumPitch,
        FeatureCategory::LowPitch,
        FeatureCategory::NarrowPitchRange,
        FeatureCategory::WidePitchRange,
        FeatureCategory::BrightTimbre,
        FeatureCategory::MellowTimbre,
        FeatureCategory::HarshTimbre,
        FeatureCategory::MajorMode,
        FeatureCategory::MinorMode,
        FeatureCategory::MajorChord,
        FeatureCategory::MinorChord,
        FeatureCategory::MajorSeventhChord,
        FeatureCategory::MinorSeventhChord,
        FeatureCategory::NinthChord,
        FeatureCategory::DiminishedChord,
        FeatureCategory::SuspendedFourthChord,
        FeatureCategory::SeventhMinorNinthChord,
        FeatureCategory::AddedNinthChord,
        FeatureCategory::SlowChordChangeRate,
        FeatureCategory::MediumChordChangeRate,
        FeatureCategory::FastChordChangeRate,
        FeatureCategory::ExpectedMajorToMajor,
        FeatureCategory::ExpectedMajorToMinor,
        FeatureCategory::ExpectedMinorToMajor,
        FeatureCategory::ExpectedMinorToMinor,
        FeatureCategory::UnexpectedMajorToMajor,
        FeatureCategory::UnexpectedMajorToMinor,
        FeatureCategory::UnexpectedMinorToMajor,
        FeatureCategory::UnexpectedMinorToMinor,
        FeatureCategory::AmbiguousMajorToMajor,
        FeatureCategory::AmbiguousMajorToMinor,
        FeatureCategory::AmbiguousMinorToMajor,
        FeatureCategory::AmbiguousMinorToMinor,
    ];
}

impl fmt::Display for FeatureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A named affect that a feature category triggers.
///
/// `MediumArousal` is part of the vocabulary but moves neither axis when
/// scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectTag {
    VeryHighArousal,
    HighArousal,
    MediumArousal,
    LowArousal,
    VeryLowArousal,
    VeryPositiveValence,
    PositiveValence,
    MediumPositiveValence,
    LowNegativeValence,
    NegativeValence,
    VeryNegativeValence,
}
