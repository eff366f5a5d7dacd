//! Seven-segment display decoding.
//!
//! Segments are numbered the usual way, bit `i` of the mask for segment `i`:
//!
//! ```text
//!  aaa
//! f   b
//!  ggg
//! e   c
//!  ddd
//! ```

use image::{Rgba, RgbaImage};
use tracing::{debug, trace};

use super::probe;
use crate::error::{Result, VisionError};
use crate::geometry::Quad;

/// Mask to character table. Hex letters use the usual mixed-case glyphs.
pub static SEGMENT_CODES: [(u8, char); 17] = [
    (0b0111111, '0'),
    (0b0000110, '1'),
    (0b1011011, '2'),
    (0b1001111, '3'),
    (0b1100110, '4'),
    (0b1101101, '5'),
    (0b1111101, '6'),
    (0b0000111, '7'),
    (0b0100111, '7'),
    (0b1111111, '8'),
    (0b1101111, '9'),
    (0b1110111, 'A'),
    (0b1111100, 'b'),
    (0b0111001, 'C'),
    (0b1011110, 'd'),
    (0b1111001, 'E'),
    (0b1110001, 'F'),
];

/// Probe position of each segment, a..g, as fractions of the digit cell.
pub const SEGMENT_PROBES: [(f32, f32); 7] = [
    (0.50, 0.08),
    (0.82, 0.28),
    (0.82, 0.72),
    (0.50, 0.92),
    (0.18, 0.72),
    (0.18, 0.28),
    (0.50, 0.50),
];

/// Looks up a segment mask. Only the low seven bits are significant.
pub fn decode_segments(mask: u8) -> Result<char> {
    let mask = mask & 0x7F;
    SEGMENT_CODES
        .iter()
        .find(|(m, _)| *m == mask)
        .map(|&(_, c)| c)
        .ok_or(VisionError::DecodeError { mask })
}

/// Probes the seven segments of the digit cell `quad`.
///
/// Probes falling outside the image count as unlit.
pub fn segment_mask<F>(image: &RgbaImage, quad: &Quad, lit: F) -> u8
where
    F: Fn(&Rgba<u8>) -> bool,
{
    SEGMENT_PROBES
        .iter()
        .enumerate()
        .filter(|(_, (s, t))| probe(image, quad.point_at(*s, *t)).is_some_and(|p| lit(&p)))
        .fold(0u8, |mask, (i, _)| mask | (1 << i))
}

/// Reads one digit. `Ok(None)` means every segment is dark.
pub fn read_digit<F>(image: &RgbaImage, quad: &Quad, lit: F) -> Result<Option<char>>
where
    F: Fn(&Rgba<u8>) -> bool,
{
    let mask = segment_mask(image, quad, lit);
    if mask == 0 {
        trace!(?quad, "blank digit");
        return Ok(None);
    }
    match decode_segments(mask) {
        Ok(c) => {
            trace!(?quad, mask, %c, "digit decoded");
            Ok(Some(c))
        }
        Err(e) => {
            debug!(?quad, mask, "unmapped segment pattern");
            Err(e)
        }
    }
}
