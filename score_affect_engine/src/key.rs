// Key-profile mode estimation for tracks without a declared mode.
//
// Builds a duration-weighted pitch-class histogram over the primary voice of
// every meter (chords reduced to their highest note, as in detection) and
// correlates it against the 24 rotated Krumhansl-Kessler probe-tone
// profiles. The mode of the best-correlating key wins.
//
// `estimate_mode` reports only the mode; `estimate_key` also exposes the
// tonic and the correlation.

use crate::detect::primary_voice_notes;
use crate::score::{Mode, RawMeter};

const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Best-matching key: tonic pitch class (0 = C), mode and correlation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEstimate {
    pub tonic: u8,
    pub mode: Mode,
    pub correlation: f64,
}

/// Duration-weighted pitch-class histogram of the primary voice.
pub fn pitch_class_histogram(meters: &[RawMeter]) -> [f64; 12] {
    let mut histogram = [0.0; 12];
    for meter in meters {
        for note in primary_voice_notes(&meter.primary) {
            histogram[(note.pitch % 12) as usize] += note.duration.quarter_length();
        }
    }
    histogram
}

fn pearson(xs: &[f64; 12], ys: &[f64; 12]) -> Option<f64> {
    let mean_x = xs.iter().sum::<f64>() / 12.0;
    let mean_y = ys.iter().sum::<f64>() / 12.0;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    (denom > f64::EPSILON).then(|| cov / denom)
}

/// Profile rotated so that index `tonic` holds the tonic weight.
fn rotated(profile: &[f64; 12], tonic: usize) -> [f64; 12] {
    let mut out = [0.0; 12];
    for (pc, slot) in out.iter_mut().enumerate() {
        *slot = profile[(pc + 12 - tonic) % 12];
    }
    out
}

/// Best key for a histogram; None when the histogram is flat or empty.
///
/// Ties keep the earlier candidate: major before minor, lower tonic first.
pub fn estimate_key(histogram: &[f64; 12]) -> Option<KeyEstimate> {
    let mut best: Option<KeyEstimate> = None;
    for (mode, profile) in [(Mode::Major, &MAJOR_PROFILE), (Mode::Minor, &MINOR_PROFILE)] {
        for tonic in 0..12 {
            let correlation = pearson(histogram, &rotated(profile, tonic))?;
            if best.is_none_or(|b| correlation > b.correlation) {
                best = Some(KeyEstimate {
                    tonic: tonic as u8,
                    mode,
                    correlation,
                });
            }
        }
    }
    best
}

/// Estimate the mode of a track from its meters.
pub fn estimate_mode(meters: &[RawMeter]) -> Option<Mode> {
    let estimate = estimate_key(&pitch_class_histogram(meters))?;
    log::debug!(
        "estimated key: tonic {} {:?} (r = {:.3})",
        estimate.tonic,
        estimate.mode,
        estimate.correlation
    );
    Some(estimate.mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{NoteDuration, NoteEvent};

    fn meter_of(pitches: &[u8], duration: NoteDuration) -> RawMeter {
        RawMeter::new(1).with_notes(pitches.iter().map(|&p| NoteEvent::new(p, duration)))
    }

    #[test]
    fn test_c_major_scale() {
        let meters = [
            meter_of(&[60, 62, 64, 65], NoteDuration::Quarter),
            meter_of(&[67, 69, 71, 72], NoteDuration::Quarter),
            meter_of(&[60, 64, 67, 60], NoteDuration::Half),
        ];
        let key = estimate_key(&pitch_class_histogram(&meters)).unwrap();
        assert_eq!(key.tonic, 0);
        assert_eq!(key.mode, Mode::Major);
        assert_eq!(estimate_mode(&meters), Some(Mode::Major));
    }

    #[test]
    fn test_a_minor_arpeggios() {
        let meters = [
            meter_of(&[69, 72, 76, 72], NoteDuration::Half),
            meter_of(&[69, 71, 72, 74], NoteDuration::Quarter),
            meter_of(&[76, 72, 69, 64], NoteDuration::Half),
        ];
        assert_eq!(estimate_mode(&meters), Some(Mode::Minor));
    }

    #[test]
    fn test_no_notes_gives_none() {
        assert_eq!(estimate_mode(&[RawMeter::new(1), RawMeter::new(2)]), None);
        assert_eq!(estimate_mode(&[]), None);
    }

    #[test]
    fn test_histogram_weights_by_duration() {
        let meters = [
            meter_of(&[60], NoteDuration::Whole),
            meter_of(&[62, 74], NoteDuration::Eighth),
        ];
        let histogram = pitch_class_histogram(&meters);
        assert_eq!(histogram[0], 4.0);
        assert_eq!(histogram[2], 1.0);
        assert_eq!(histogram.iter().sum::<f64>(), 5.0);
    }

    #[test]
    fn test_rotation_puts_tonic_weight_at_tonic() {
        let r = rotated(&MAJOR_PROFILE, 7);
        assert_eq!(r[7], MAJOR_PROFILE[0]);
        assert_eq!(r[6], MAJOR_PROFILE[11]);
    }
}
