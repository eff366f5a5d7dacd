//! Decoders shared by the module readers: segment digits, status lights,
//! selection highlights and stage indicators.

pub mod highlight;
pub mod segment;
pub mod stage;
pub mod status_light;

pub use highlight::{find_highlight, highlight_signature, DEFAULT_STRIDE};
pub use segment::{decode_segments, read_digit, segment_mask};
pub use stage::count_stages;
pub use status_light::{classify_light, read_status_light, LightStatus};

use image::{Rgba, RgbaImage};

use crate::geometry::Point;

/// Pixel at `p`, or `None` outside the image.
pub(crate) fn probe(image: &RgbaImage, p: Point) -> Option<Rgba<u8>> {
    if p.x < 0 || p.y < 0 {
        return None;
    }
    image.get_pixel_checked(p.x as u32, p.y as u32).copied()
}
