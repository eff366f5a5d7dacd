//! Perspective undistortion of a quadrilateral into a rectangular buffer.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geometry::Quad;

/// How source pixels are read at fractional coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sampling {
    /// Round to the nearest source pixel.
    #[default]
    Nearest,
    /// Blend the four surrounding pixels by fractional distance.
    Bilinear,
}

/// Resamples `quad` of `source` into an axis-aligned `width` x `height` image.
///
/// Destination `(x, y)` maps to `quad.interpolate(x / width, y / height)`.
/// The quad is expected to lie within the source; indices are only
/// clamped as far as needed to read the bilinear neighbours.
pub fn undistort(source: &RgbaImage, quad: &Quad, mode: Sampling, (width, height): (u32, u32)) -> RgbaImage {
    trace!(?quad, ?mode, width, height, "undistorting");
    RgbaImage::from_fn(width, height, |x, y| {
        let (sx, sy) = quad.interpolate(x as f32 / width as f32, y as f32 / height as f32);
        match mode {
            Sampling::Nearest => sample_nearest(source, sx, sy),
            Sampling::Bilinear => sample_bilinear(source, sx, sy),
        }
    })
}

fn clamp_index(v: f32, len: u32) -> u32 {
    (v.max(0.0) as u32).min(len.saturating_sub(1))
}

/// Reads the source pixel nearest to `(x, y)`.
pub fn sample_nearest(source: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let px = clamp_index(x.round(), source.width());
    let py = clamp_index(y.round(), source.height());
    *source.get_pixel(px, py)
}

/// Bilinear blend of the four pixels around `(x, y)`, rounded per channel.
pub fn sample_bilinear(source: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let (fx, fy) = (x.floor(), y.floor());
    let (tx, ty) = (x - fx, y - fy);

    let x0 = clamp_index(fx, source.width());
    let y0 = clamp_index(fy, source.height());
    let x1 = (x0 + 1).min(source.width() - 1);
    let y1 = (y0 + 1).min(source.height() - 1);

    let p00 = source.get_pixel(x0, y0);
    let p10 = source.get_pixel(x1, y0);
    let p01 = source.get_pixel(x0, y1);
    let p11 = source.get_pixel(x1, y1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] as f32 * (1.0 - tx) + p10[c] as f32 * tx;
        let bottom = p01[c] as f32 * (1.0 - tx) + p11[c] as f32 * tx;
        out[c] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rect};

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([(x * 3) as u8, (y * 5) as u8, ((x + y) % 256) as u8, 255]))
    }

    #[test]
    fn test_nearest_identity_on_matching_rect() {
        let img = gradient(80, 50);
        let region = Rect::new(12, 7, 40, 30);
        let out = undistort(&img, &Quad::from(region), Sampling::Nearest, (40, 30));

        for (x, y, p) in out.enumerate_pixels() {
            assert_eq!(*p, *img.get_pixel(region.x + x, region.y + y), "pixel ({x}, {y})");
        }
    }

    #[test]
    fn test_bilinear_identity_on_matching_rect() {
        let img = gradient(64, 64);
        let region = Rect::new(0, 0, 64, 64);
        let out = undistort(&img, &Quad::from(region), Sampling::Bilinear, (64, 64));
        assert_eq!(out, img);
    }

    #[test]
    fn test_bilinear_midpoint_blend() {
        let img = RgbaImage::from_fn(2, 1, |x, _| if x == 0 { Rgba([0, 0, 0, 255]) } else { Rgba([200, 100, 50, 255]) });
        assert_eq!(sample_bilinear(&img, 0.5, 0.0), Rgba([100, 50, 25, 255]));
        assert_eq!(sample_bilinear(&img, 0.25, 0.0), Rgba([50, 25, 13, 255]));
    }

    #[test]
    fn test_downscale_nearest() {
        // 2x2 checker cells of 4 pixels each
        let img = RgbaImage::from_fn(8, 8, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 { Rgba([255, 255, 255, 255]) } else { Rgba([0, 0, 0, 255]) }
        });
        let out = undistort(&img, &Quad::from(Rect::of_image(8, 8)), Sampling::Nearest, (2, 2));
        assert_eq!(out.get_pixel(0, 0)[0], 255);
        assert_eq!(out.get_pixel(1, 0)[0], 0);
        assert_eq!(out.get_pixel(0, 1)[0], 0);
        assert_eq!(out.get_pixel(1, 1)[0], 255);
    }

    #[test]
    fn test_skewed_quad_rectifies() {
        // A parallelogram sheared right by one pixel per two rows
        let img = RgbaImage::from_fn(64, 40, |x, y| {
            let left = 10 + y / 2;
            if x >= left && x < left + 20 { Rgba([255, 0, 0, 255]) } else { Rgba([0, 0, 0, 255]) }
        });
        let quad = Quad::new(Point::new(10, 0), Point::new(30, 0), Point::new(30, 40), Point::new(50, 40));
        let out = undistort(&img, &quad, Sampling::Nearest, (20, 40));
        let red = out.pixels().filter(|p| p[0] == 255).count();
        // Nearly everything sampled lands inside the band
        assert!(red >= 20 * 40 - 40, "only {red} red pixels");
    }

    #[test]
    fn test_empty_output() {
        let img = gradient(4, 4);
        let out = undistort(&img, &Quad::from(Rect::of_image(4, 4)), Sampling::Bilinear, (0, 0));
        assert_eq!(out.dimensions(), (0, 0));
    }
}
