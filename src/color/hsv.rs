//! RGBA ↔ HSV conversion and HSV range predicates.
//!
//! Every thresholding rule in the crate is written in terms of hue,
//! saturation and value, so the conversion follows the conventional
//! definition exactly.

use image::Rgba;
use serde::{Deserialize, Serialize};

/// A colour in hue/saturation/value form.
///
/// `h` is in degrees `[0, 360)`, `s` and `v` are in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HsvColor {
    pub h: f32,
    pub s: f32,
    pub v: f32,
    pub a: u8,
}

/// Converts an RGBA pixel to HSV.
///
/// Grey pixels (no channel spread) get hue 0.
pub fn to_hsv(pixel: Rgba<u8>) -> HsvColor {
    let [r, g, b, a] = pixel.0;
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let h = if h >= 360.0 { h - 360.0 } else { h };

    let s = if max > 0.0 { delta / max } else { 0.0 };

    HsvColor {
        h,
        s,
        v: max / 255.0,
        a,
    }
}

impl HsvColor {
    pub fn new(h: f32, s: f32, v: f32) -> Self {
        Self { h, s, v, a: 255 }
    }

    /// Converts back to an RGBA pixel, rounding each channel.
    pub fn to_rgba(&self) -> Rgba<u8> {
        let h = self.h.rem_euclid(360.0);
        let c = self.v * self.s;
        let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
        let m = self.v - c;

        let (r, g, b) = match (h / 60.0) as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let to_byte = |f: f32| ((f + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgba([to_byte(r), to_byte(g), to_byte(b), self.a])
    }
}

/// An inclusive HSV box used as a pixel predicate.
///
/// When `hue[0] > hue[1]` the hue interval wraps through 0°, so
/// `[340, 20]` accepts reds on both sides of the wheel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HsvRange {
    pub hue: [f32; 2],
    pub saturation: [f32; 2],
    pub value: [f32; 2],
}

impl HsvRange {
    pub const fn new(hue: [f32; 2], saturation: [f32; 2], value: [f32; 2]) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }

    /// Accepts any hue and saturation above the value floor.
    pub const fn brighter_than(value: f32) -> Self {
        Self::new([0.0, 360.0], [0.0, 1.0], [value, 1.0])
    }

    pub fn contains(&self, c: HsvColor) -> bool {
        let [lo, hi] = self.hue;
        let hue_ok = if lo <= hi {
            c.h >= lo && c.h <= hi
        } else {
            c.h >= lo || c.h <= hi
        };
        hue_ok
            && c.s >= self.saturation[0]
            && c.s <= self.saturation[1]
            && c.v >= self.value[0]
            && c.v <= self.value[1]
    }

    /// Converts and tests a raw pixel.
    pub fn matches(&self, pixel: &Rgba<u8>) -> bool {
        self.contains(to_hsv(*pixel))
    }
}
