//! Lighting compensation for the four in-game lighting regimes.
//!
//! The room lighting changes how every colour on the display is rendered.
//! Each regime is modelled as an independent affine map per channel,
//! fitted offline by regression over sample captures. The coefficients are
//! calibration data and are not derived here.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geometry::Rect;

/// Ambient lighting regime of the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightingState {
    /// Fully lit. Colours appear as calibrated; all transforms are identity.
    #[default]
    On,
    /// Flickering, partially dimmed lights.
    Dim,
    /// Lights out.
    Off,
    /// Red emergency lighting.
    Emergency,
}

/// `y = gain * x + offset` for a single channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelCoefficients {
    pub gain: f32,
    pub offset: f32,
}

const fn cc(gain: f32, offset: f32) -> ChannelCoefficients {
    ChannelCoefficients { gain, offset }
}

// R, G, B
const DIM: [ChannelCoefficients; 3] = [cc(0.58, 6.0), cc(0.55, 7.0), cc(0.61, 9.0)];
const OFF: [ChannelCoefficients; 3] = [cc(0.31, 3.0), cc(0.30, 4.0), cc(0.36, 6.0)];
const EMERGENCY: [ChannelCoefficients; 3] = [cc(0.88, 22.0), cc(0.34, 2.0), cc(0.33, 3.0)];

impl LightingState {
    pub const ALL: [LightingState; 4] = [
        LightingState::On,
        LightingState::Dim,
        LightingState::Off,
        LightingState::Emergency,
    ];

    /// Per-channel coefficients, or `None` for the identity regime.
    pub fn coefficients(self) -> Option<&'static [ChannelCoefficients; 3]> {
        match self {
            LightingState::On => None,
            LightingState::Dim => Some(&DIM),
            LightingState::Off => Some(&OFF),
            LightingState::Emergency => Some(&EMERGENCY),
        }
    }
}

impl std::fmt::Display for LightingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LightingState::On => write!(f, "on"),
            LightingState::Dim => write!(f, "dim"),
            LightingState::Off => write!(f, "off"),
            LightingState::Emergency => write!(f, "emergency"),
        }
    }
}

impl std::str::FromStr for LightingState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "on" => Ok(LightingState::On),
            "dim" => Ok(LightingState::Dim),
            "off" => Ok(LightingState::Off),
            "emergency" => Ok(LightingState::Emergency),
            other => Err(format!("unknown lighting state '{}'", other)),
        }
    }
}

fn apply(value: u8, gain: f32, offset: f32) -> u8 {
    (gain * value as f32 + offset).round().clamp(0.0, 255.0) as u8
}

/// Maps a canonical (fully lit) colour to its appearance under `state`.
pub fn correct(pixel: Rgba<u8>, state: LightingState) -> Rgba<u8> {
    let Some(table) = state.coefficients() else {
        return pixel;
    };
    let [r, g, b, a] = pixel.0;
    Rgba([
        apply(r, table[0].gain, table[0].offset),
        apply(g, table[1].gain, table[1].offset),
        apply(b, table[2].gain, table[2].offset),
        a,
    ])
}

/// Maps a pixel observed under `state` back to its canonical colour.
///
/// Approximate inverse of [`correct`]: after rounding, the round trip is
/// within two levels per channel.
pub fn uncorrect(pixel: Rgba<u8>, state: LightingState) -> Rgba<u8> {
    let Some(table) = state.coefficients() else {
        return pixel;
    };
    let [r, g, b, a] = pixel.0;
    let inv = |v: u8, c: &ChannelCoefficients| apply(v, 1.0 / c.gain, -c.offset / c.gain);
    Rgba([inv(r, &table[0]), inv(g, &table[1]), inv(b, &table[2]), a])
}

fn map_region(image: &mut RgbaImage, region: Rect, f: impl Fn(Rgba<u8>) -> Rgba<u8>) {
    let r = region.clip(image.width(), image.height());
    for y in r.y..r.bottom() {
        for x in r.x..r.right() {
            let p = *image.get_pixel(x, y);
            image.put_pixel(x, y, f(p));
        }
    }
}

/// Applies [`correct`] in place to a sub-rectangle of a scratch image.
pub fn correct_region(image: &mut RgbaImage, region: Rect, state: LightingState) {
    if state == LightingState::On {
        return;
    }
    trace!(?region, %state, "correcting region");
    map_region(image, region, |p| correct(p, state));
}

/// Applies [`uncorrect`] in place to a sub-rectangle of a scratch image.
pub fn uncorrect_region(image: &mut RgbaImage, region: Rect, state: LightingState) {
    if state == LightingState::On {
        return;
    }
    trace!(?region, %state, "uncorrecting region");
    map_region(image, region, |p| uncorrect(p, state));
}
