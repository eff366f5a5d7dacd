//! Colour model: HSV conversion, lighting compensation and similarity.

pub mod hsv;
pub mod lighting;
pub mod similarity;

pub use hsv::{to_hsv, HsvColor, HsvRange};
pub use lighting::{correct, correct_region, uncorrect, uncorrect_region, LightingState};
pub use similarity::similarity;

use image::Rgba;

/// Perceptual brightness used by the recogniser: midpoint of the channel range.
pub fn brightness(pixel: &Rgba<u8>) -> u8 {
    let [r, g, b, _] = pixel.0;
    let min = r.min(g).min(b) as u16;
    let max = r.max(g).max(b) as u16;
    ((min + max) / 2) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brightness_midpoint() {
        assert_eq!(brightness(&Rgba([255, 0, 0, 255])), 127);
        assert_eq!(brightness(&Rgba([200, 200, 200, 0])), 200);
        assert_eq!(brightness(&Rgba([10, 90, 50, 255])), 50);
    }
}
