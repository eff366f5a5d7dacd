use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::probe;
use crate::color::{to_hsv, uncorrect, HsvRange, LightingState};
use crate::geometry::Quad;

/// Probe offset from the bezel's top-left corner, as fractions of the bezel.
pub const LIGHT_OFFSET: (f32, f32) = (0.87, 0.11);

pub const SOLVED_RANGE: HsvRange = HsvRange::new([90.0, 150.0], [0.55, 1.0], [0.5, 1.0]);
pub const STRIKE_RANGE: HsvRange = HsvRange::new([340.0, 20.0], [0.45, 1.0], [0.6, 1.0]);

/// State of a module's status light.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightStatus {
    Solved,
    Strike,
    Off,
}

pub fn classify_light(pixel: Rgba<u8>) -> LightStatus {
    let hsv = to_hsv(pixel);
    if SOLVED_RANGE.contains(hsv) {
        LightStatus::Solved
    } else if STRIKE_RANGE.contains(hsv) {
        LightStatus::Strike
    } else {
        LightStatus::Off
    }
}

/// Classifies the light inside `bezel`, after undoing `lighting`.
///
/// A probe point outside the image reads as `Off`.
pub fn read_status_light(image: &RgbaImage, bezel: &Quad, lighting: LightingState) -> LightStatus {
    let at = bezel.point_at(LIGHT_OFFSET.0, LIGHT_OFFSET.1);
    let status = probe(image, at)
        .map(|p| classify_light(uncorrect(p, lighting)))
        .unwrap_or(LightStatus::Off);
    trace!(?at, ?status, "status light");
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::correct;
    use crate::geometry::{Point, Rect};

    fn bezel_with(pixel: Rgba<u8>) -> (RgbaImage, Quad) {
        let bezel = Quad::from(Rect::new(20, 30, 100, 100));
        let mut img = RgbaImage::from_pixel(160, 160, Rgba([40, 40, 40, 255]));
        let at = bezel.point_at(LIGHT_OFFSET.0, LIGHT_OFFSET.1);
        img.put_pixel(at.x as u32, at.y as u32, pixel);
        (img, bezel)
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify_light(Rgba([0, 255, 0, 255])), LightStatus::Solved);
        assert_eq!(classify_light(Rgba([255, 0, 0, 255])), LightStatus::Strike);
        assert_eq!(classify_light(Rgba([0, 0, 0, 255])), LightStatus::Off);
        // Strike hue wraps through 0°
        assert_eq!(classify_light(Rgba([255, 0, 40, 255])), LightStatus::Strike);
        // Washed-out green is not solved
        assert_eq!(classify_light(Rgba([180, 220, 180, 255])), LightStatus::Off);
    }

    #[test]
    fn test_probe_offset() {
        let bezel = Quad::from(Rect::new(20, 30, 100, 100));
        assert_eq!(bezel.point_at(LIGHT_OFFSET.0, LIGHT_OFFSET.1), Point::new(107, 41));
    }

    #[test]
    fn test_read_under_full_lighting() {
        for (pixel, expected) in [
            (Rgba([0, 255, 0, 255]), LightStatus::Solved),
            (Rgba([255, 0, 0, 255]), LightStatus::Strike),
            (Rgba([0, 0, 0, 255]), LightStatus::Off),
        ] {
            let (img, bezel) = bezel_with(pixel);
            assert_eq!(read_status_light(&img, &bezel, LightingState::On), expected);
        }
    }

    #[test]
    fn test_read_under_dim_lighting() {
        let (img, bezel) = bezel_with(correct(Rgba([0, 255, 0, 255]), LightingState::Dim));
        assert_eq!(read_status_light(&img, &bezel, LightingState::Dim), LightStatus::Solved);
    }

    #[test]
    fn test_outside_image_is_off() {
        let img = RgbaImage::from_pixel(10, 10, Rgba([0, 255, 0, 255]));
        let bezel = Quad::from(Rect::new(50, 50, 40, 40));
        assert_eq!(read_status_light(&img, &bezel, LightingState::On), LightStatus::Off);
    }
}
