// Benchmarks for track analysis: one long track end to end, and a batch of
// tracks through the parallel driver.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use score_affect_engine::score::{NoteDuration, NoteEvent};
use score_affect_engine::{AffectConfig, Mode, RawMeter, Track, analyze_track, analyze_tracks};
use score_affect_taxonomy::default_taxonomy;

const DURATIONS: [NoteDuration; 4] = [
    NoteDuration::Quarter,
    NoteDuration::Eighth,
    NoteDuration::Half,
    NoteDuration::Sixteenth,
];

/// A deterministic pseudo-melody: a rising and falling line with a dynamic
/// mark every eight meters.
fn synthetic_track(title: &str, meters: u32) -> Track {
    let mut track = Track::new(title, Some(Mode::Minor), Some(112.0));
    for number in 1..=meters {
        let notes = (0..8u32).map(|i| {
            let step = (number * 8 + i) % 24;
            let offset = if step < 12 { step } else { 24 - step };
            NoteEvent::new(57 + offset as u8, DURATIONS[(i % 4) as usize])
        });
        let mut meter = RawMeter::new(number).with_notes(notes);
        if number % 8 == 1 {
            meter = meter.with_dynamic(if number % 16 == 1 { "p" } else { "f" });
        }
        track = track.with_meter(meter);
    }
    track
}

fn bench_analyze_track(c: &mut Criterion) {
    let taxonomy = default_taxonomy();
    let config = AffectConfig::default();
    let track = synthetic_track("long", 500);

    c.bench_function("analyze_track_500_meters", |b| {
        b.iter(|| analyze_track(black_box(&track), &taxonomy, &config));
    });
}

fn bench_analyze_tracks(c: &mut Criterion) {
    let taxonomy = default_taxonomy();
    let config = AffectConfig::default();
    let tracks: Vec<Track> = (0..16).map(|i| synthetic_track(&format!("t{i}"), 200)).collect();

    c.bench_function("analyze_tracks_16x200", |b| {
        b.iter(|| analyze_tracks(black_box(&tracks), &taxonomy, &config));
    });
}

criterion_group!(benches, bench_analyze_track, bench_analyze_tracks);
criterion_main!(benches);
