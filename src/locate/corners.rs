use image::{ImageBuffer, Pixel};
use tracing::{debug, trace};

use crate::error::{Result, VisionError};
use crate::geometry::{Corner, Point, Quad, Rect};

/// Number of probe points checked along the inward diagonal.
pub const CONTINUITY_PROBES: u32 = 16;

/// Which end of each diagonal a sweep starts from.
#[derive(Clone, Copy)]
enum Sweep {
    /// Starts on the corner's horizontal (top or bottom) side.
    FromHorizontal,
    /// Starts on the corner's vertical (left or right) side.
    FromVertical,
}

/// Walks diagonals inward from one corner of `bounds`.
struct CornerWalk {
    origin: (i64, i64),
    dir: (i64, i64),
    width: u32,
    height: u32,
}

impl CornerWalk {
    fn new(bounds: Rect, corner: Corner) -> Self {
        let (x0, y0) = (bounds.x as i64, bounds.y as i64);
        let (x1, y1) = (bounds.right() as i64 - 1, bounds.bottom() as i64 - 1);
        let (origin, dir) = match corner {
            Corner::TopLeft => ((x0, y0), (1, 1)),
            Corner::TopRight => ((x1, y0), (-1, 1)),
            Corner::BottomLeft => ((x0, y1), (1, -1)),
            Corner::BottomRight => ((x1, y1), (-1, -1)),
        };
        Self {
            origin,
            dir,
            width: bounds.width,
            height: bounds.height,
        }
    }

    /// Image position of local offset `u` across and `v` down from the corner.
    fn at(&self, u: u32, v: u32) -> (u32, u32) {
        (
            (self.origin.0 + self.dir.0 * u as i64) as u32,
            (self.origin.1 + self.dir.1 * v as i64) as u32,
        )
    }

    fn qualifies<P, F>(&self, image: &ImageBuffer<P, Vec<P::Subpixel>>, predicate: &F, continuity: u32, u: u32, v: u32) -> bool
    where
        P: Pixel,
        F: Fn(&P) -> bool,
    {
        let (x, y) = self.at(u, v);
        if !predicate(image.get_pixel(x, y)) {
            return false;
        }
        if continuity == 0 {
            return true;
        }
        let hits = (1..=CONTINUITY_PROBES)
            .filter(|&i| u + i < self.width && v + i < self.height)
            .filter(|&i| {
                let (px, py) = self.at(u + i, v + i);
                predicate(image.get_pixel(px, py))
            })
            .count() as u32;
        hits >= continuity
    }

    fn sweep<P, F>(&self, image: &ImageBuffer<P, Vec<P::Subpixel>>, predicate: &F, continuity: u32, sweep: Sweep) -> Option<(u32, u32)>
    where
        P: Pixel,
        F: Fn(&P) -> bool,
    {
        let (w, h) = (self.width, self.height);
        let levels = (w - 1) + (h - 1);
        for k in 0..=levels {
            match sweep {
                Sweep::FromHorizontal => {
                    // v grows from the horizontal side, u = k - v
                    let v_min = k.saturating_sub(w - 1);
                    let v_max = k.min(h - 1);
                    for v in v_min..=v_max {
                        if self.qualifies(image, predicate, continuity, k - v, v) {
                            return Some((k - v, v));
                        }
                    }
                }
                Sweep::FromVertical => {
                    let u_min = k.saturating_sub(h - 1);
                    let u_max = k.min(w - 1);
                    for u in u_min..=u_max {
                        if self.qualifies(image, predicate, continuity, u, k - u) {
                            return Some((u, k - u));
                        }
                    }
                }
            }
        }
        None
    }
}

/// Locates the four corners of a region matching `predicate` inside `bounds`.
///
/// For each corner of `bounds`, two sweeps walk the diagonals inward,
/// one starting from each adjacent side, and stop at the first pixel that
/// satisfies `predicate`. With `continuity > 0` a hit is only accepted if
/// at least `continuity` of the next 16 points along the inward diagonal
/// also satisfy it, which rejects anti-aliasing and speckle. The two hits
/// are averaged into the corner.
pub fn find_corners<P, F>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    bounds: Rect,
    predicate: F,
    continuity: u32,
) -> Result<Quad>
where
    P: Pixel,
    F: Fn(&P) -> bool,
{
    let bounds = bounds.clip(image.width(), image.height());
    if bounds.is_empty() {
        return Err(VisionError::NotFound("corner search bounds are empty".to_string()));
    }
    let continuity = continuity.min(CONTINUITY_PROBES);

    let mut quad = Quad::default();
    for corner in Corner::ALL {
        let walk = CornerWalk::new(bounds, corner);
        let a = walk.sweep(image, &predicate, continuity, Sweep::FromHorizontal);
        let b = walk.sweep(image, &predicate, continuity, Sweep::FromVertical);
        let (Some(a), Some(b)) = (a, b) else {
            debug!(?bounds, ?corner, continuity, "corner sweep exhausted");
            return Err(VisionError::NotFound(format!("{:?} corner inside {:?}", corner, bounds)));
        };

        let (ax, ay) = walk.at(a.0, a.1);
        let (bx, by) = walk.at(b.0, b.1);
        quad[corner] = Point::new(
            ((ax + bx) as f32 / 2.0).round() as i32,
            ((ay + by) as f32 / 2.0).round() as i32,
        );
    }

    trace!(?bounds, ?quad, "corners found");
    Ok(quad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    const FILL: Rgba<u8> = Rgba([30, 200, 60, 255]);
    const BACKGROUND: Rgba<u8> = Rgba([20, 20, 20, 255]);

    fn is_fill(p: &Rgba<u8>) -> bool {
        p[1] > 150 && p[0] < 100
    }

    fn cross(o: Point, a: Point, x: i32, y: i32) -> i64 {
        ((a.x - o.x) as i64) * ((y - o.y) as i64) - ((a.y - o.y) as i64) * ((x - o.x) as i64)
    }

    /// Fills the quad (edges inclusive) on a uniform background.
    fn filled_quad(size: u32, q: &Quad) -> RgbaImage {
        let ring = [q.top_left, q.top_right, q.bottom_right, q.bottom_left];
        RgbaImage::from_fn(size, size, |x, y| {
            let signs: Vec<i64> = (0..4)
                .map(|i| cross(ring[i], ring[(i + 1) % 4], x as i32, y as i32))
                .collect();
            if signs.iter().all(|&s| s >= 0) || signs.iter().all(|&s| s <= 0) {
                FILL
            } else {
                BACKGROUND
            }
        })
    }

    #[test]
    fn test_skewed_quad_corners() {
        let truth = Quad::new(
            Point::new(40, 40),
            Point::new(200, 60),
            Point::new(30, 220),
            Point::new(210, 200),
        );
        let img = filled_quad(256, &truth);
        let found = find_corners(&img, Rect::of_image(256, 256), is_fill, 4).unwrap();

        for corner in Corner::ALL {
            assert!(
                found[corner].distance_max(truth[corner]) <= 2,
                "{:?}: found {:?}, expected {:?}",
                corner,
                found[corner],
                truth[corner]
            );
        }
    }

    #[test]
    fn test_continuity_rejects_speckle() {
        let truth = Quad::from(Rect::new(50, 50, 100, 80));
        let mut img = filled_quad(200, &truth);
        // Isolated noise pixel nearer the top-left corner than the panel
        img.put_pixel(10, 10, FILL);

        let noisy = find_corners(&img, Rect::of_image(200, 200), is_fill, 0).unwrap();
        assert_eq!(noisy.top_left, Point::new(10, 10));

        let filtered = find_corners(&img, Rect::of_image(200, 200), is_fill, 8).unwrap();
        assert_eq!(filtered.top_left, Point::new(50, 50));
    }

    #[test]
    fn test_axis_aligned_box() {
        let img = RgbaImage::from_fn(64, 64, |x, y| {
            if (10..30).contains(&x) && (20..50).contains(&y) { FILL } else { BACKGROUND }
        });
        let q = find_corners(&img, Rect::of_image(64, 64), is_fill, 4).unwrap();
        assert_eq!(q.top_left, Point::new(10, 20));
        assert_eq!(q.top_right, Point::new(29, 20));
        assert_eq!(q.bottom_left, Point::new(10, 49));
        assert_eq!(q.bottom_right, Point::new(29, 49));
    }

    #[test]
    fn test_not_found_when_absent() {
        let img = RgbaImage::from_pixel(32, 32, BACKGROUND);
        assert!(matches!(
            find_corners(&img, Rect::of_image(32, 32), is_fill, 0),
            Err(VisionError::NotFound(_))
        ));
    }

    #[test]
    fn test_not_found_when_too_thin_for_continuity() {
        // A one-pixel line can never pass a diagonal continuity check
        let img = RgbaImage::from_fn(32, 32, |x, _| if x == 16 { FILL } else { BACKGROUND });
        assert!(find_corners(&img, Rect::of_image(32, 32), is_fill, 3).is_err());
    }
}
