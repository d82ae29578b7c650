//! Windowed averaging that maps the sample buffer onto visual data points.
//!
//! Each of the N points averages a window of samples centered on its slot in
//! the buffer. Windows are widened to eight times the natural slot so that
//! neighboring points overlap heavily, which is what smooths the drawing.
//! The buffer is treated as circular: windows that run off either end wrap
//! around to the other.

use std::ops::Range;

use crate::audio::Samples;

/// Window half-width multiplier. Each point's window spans `offset * 8`
/// samples to either side of its slot instead of just `offset`.
const SPREAD: isize = 8;

/// Averaged amplitude for point `index` out of `points`, in roughly [-1, 1].
///
/// Byte samples are normalized with `v / 255 - 0.5` as they are summed, so
/// both sample capabilities produce deflections on the same scale.
pub fn deflection(samples: &Samples<'_>, index: usize, points: usize) -> f32 {
    let (head, tail) = window_ranges(samples.len(), index, points);
    match samples {
        Samples::Float(buf) => mean(buf[head].iter().chain(&buf[tail]).copied()),
        Samples::Byte(buf) => mean(
            buf[head]
                .iter()
                .chain(&buf[tail])
                .map(|&v| normalize_byte(v)),
        ),
    }
}

/// Maps a byte sample onto the float scale. Spans [-0.5, 0.5], with the
/// 128 equilibrium landing just above zero. Kept exactly as tuned.
pub fn normalize_byte(v: u8) -> f32 {
    v as f32 / 255.0 - 0.5
}

/// In-bounds index ranges for the widened window of point `index`.
///
/// A window entirely inside the buffer comes back as `(range, empty)`. A
/// window running past either end comes back as two ranges, the wrapped part
/// second when the start underflows and first when the end overflows. Ranges
/// clamp at the buffer length, so a window wider than the buffer covers it
/// at most once per side.
fn window_ranges(len: usize, index: usize, points: usize) -> (Range<usize>, Range<usize>) {
    if len == 0 || points == 0 {
        return (0..0, 0..0);
    }
    let len_i = len as isize;
    let size = len as f32 / points as f32;
    let center = (index as f32 * size) as isize;
    let offset = (size / 2.0) as isize;
    let span = offset * SPREAD;
    let start = center - span;
    let end = center + span;

    if start < 0 {
        let head = (start + len_i).max(0) as usize..len;
        let tail = 0..end.min(len_i) as usize;
        (head, tail)
    } else if end >= len_i {
        let head = start as usize..len;
        let tail = 0..(end - len_i).min(len_i) as usize;
        (head, tail)
    } else {
        (start as usize..end as usize, 0..0)
    }
}

fn mean(values: impl Iterator<Item = f32>) -> f32 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 { 0.0 } else { sum / count as f32 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn windows_cover_every_index() {
        let len = 256;
        let points = 16;
        let mut seen = vec![false; len];
        for i in 0..points {
            let (head, tail) = window_ranges(len, i, points);
            for idx in head.chain(tail) {
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|&s| s), "every sample index feeds some point");
    }

    #[test]
    fn wrapped_window_matches_manual_concatenation() {
        // len 16, 4 points: size 4, offset 2, so each window spans 16 to
        // either side of its slot and wraps on both ends.
        let buf: Vec<f32> = (0..16).map(|v| v as f32).collect();
        let samples = Samples::Float(&buf);

        let (head, tail) = window_ranges(16, 0, 4);
        assert_eq!(head, 0..16);
        assert_eq!(tail, 0..16);

        // The window for point 0 is the whole buffer twice over.
        let manual: Vec<f32> = buf.iter().chain(buf.iter()).copied().collect();
        let expected = manual.iter().sum::<f32>() / manual.len() as f32;
        assert_relative_eq!(deflection(&samples, 0, 4), expected);
        assert_relative_eq!(deflection(&samples, 0, 4), 7.5);
    }

    #[test]
    fn wrapped_window_clamps_overflowing_tail() {
        // Point 3 of 4: start 12 - 16 = -4, end 12 + 16 = 28. The tail slice
        // clamps at the buffer length instead of wrapping a second time.
        let buf: Vec<f32> = (0..16).map(|v| v as f32).collect();
        let (head, tail) = window_ranges(16, 3, 4);
        assert_eq!(head, 12..16);
        assert_eq!(tail, 0..16);

        let samples = Samples::Float(&buf);
        let manual: f32 = (12..16).chain(0..16).map(|v| v as f32).sum::<f32>() / 20.0;
        assert_relative_eq!(deflection(&samples, 3, 4), manual);
    }

    #[test]
    fn interior_window_stays_unwrapped() {
        // size 16, offset 8, span 64; center 32 * 16 = 512.
        let (head, tail) = window_ranges(1024, 32, 64);
        assert_eq!(head, 448..576);
        assert!(tail.is_empty());
    }

    #[test]
    fn byte_samples_are_normalized() {
        assert_relative_eq!(normalize_byte(0), -0.5);
        assert_relative_eq!(normalize_byte(255), 0.5);
        assert!((normalize_byte(128) - 0.00196).abs() < 1e-4);
    }

    #[test]
    fn uniform_byte_buffer_deflects_to_its_normalized_value() {
        for v in [0u8, 128, 255] {
            let buf = vec![v; 64];
            let samples = Samples::Byte(&buf);
            assert_relative_eq!(deflection(&samples, 1, 4), normalize_byte(v));
        }
    }

    #[test]
    fn byte_and_float_capabilities_agree() {
        let bytes: Vec<u8> = (0..64).map(|i| (i * 4) as u8).collect();
        let floats: Vec<f32> = bytes.iter().map(|&v| normalize_byte(v)).collect();
        for i in 0..4 {
            assert_relative_eq!(
                deflection(&Samples::Byte(&bytes), i, 4),
                deflection(&Samples::Float(&floats), i, 4),
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn degenerate_window_is_silent() {
        // size < 2 makes offset 0 and the window empty.
        let buf = vec![1.0f32; 16];
        assert_eq!(deflection(&Samples::Float(&buf), 0, 16), 0.0);
        assert_eq!(deflection(&Samples::Float(&[]), 0, 4), 0.0);
    }
}
