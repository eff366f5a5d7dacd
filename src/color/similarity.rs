use image::RgbaImage;

use crate::error::{Result, VisionError};

/// Distance at which a pixel stops contributing to the score.
const MAX_DISTANCE: i32 = 127;

/// Soft similarity of `subject` to the best of several reference samples.
///
/// Each sample's alpha channel weights its pixels independently, so a
/// sample can mask out parts of the subject it has no opinion on. For
/// every pixel the best-scoring sample wins. The result is normalised to
/// `[0, 1]` and is a confidence, not a hard match.
pub fn similarity(subject: &RgbaImage, samples: &[RgbaImage]) -> Result<f32> {
    let (w, h) = subject.dimensions();
    for sample in samples {
        if sample.dimensions() != (w, h) {
            return Err(VisionError::SizeMismatch {
                subject_width: w,
                subject_height: h,
                sample_width: sample.width(),
                sample_height: sample.height(),
            });
        }
    }

    let mut score: u64 = 0;
    let mut max_score: u64 = 0;

    for (x, y, p) in subject.enumerate_pixels() {
        let mut best: u64 = 0;
        let mut weight: u64 = 0;
        for sample in samples {
            let s = sample.get_pixel(x, y);
            let alpha = s[3] as u64;
            let distance = (0..3)
                .map(|c| (p[c] as i32 - s[c] as i32).abs())
                .max()
                .unwrap_or(0);
            let contribution = (MAX_DISTANCE - distance).max(0) as u64 * alpha;
            best = best.max(contribution);
            weight = weight.max(alpha);
        }
        score += best;
        max_score += MAX_DISTANCE as u64 * weight;
    }

    if max_score == 0 {
        return Ok(0.0);
    }
    Ok(score as f32 / max_score as f32)
}
