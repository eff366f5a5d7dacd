use image::{ImageBuffer, Pixel};
use tracing::{debug, trace};

use crate::error::{Result, VisionError};
use crate::geometry::Rect;

/// Shrinks `start` until each side touches a pixel satisfying `predicate`.
///
/// Sides are shrunk top, bottom, left, right. Left and right only look at
/// rows inside the already-shrunk vertical span. The result is always a
/// subset of `start` (clipped to the image), and running the search again
/// on its own output returns the same rectangle.
pub fn find_edges<P, F>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    start: Rect,
    predicate: F,
) -> Result<Rect>
where
    P: Pixel,
    F: Fn(&P) -> bool,
{
    let r = start.clip(image.width(), image.height());
    let (mut top, mut bottom) = (r.y, r.bottom());
    let (mut left, mut right) = (r.x, r.right());

    let row_hit = |y: u32, left: u32, right: u32| (left..right).any(|x| predicate(image.get_pixel(x, y)));
    let col_hit = |x: u32, top: u32, bottom: u32| (top..bottom).any(|y| predicate(image.get_pixel(x, y)));

    while top < bottom && !row_hit(top, left, right) {
        top += 1;
    }
    while top < bottom && !row_hit(bottom - 1, left, right) {
        bottom -= 1;
    }
    if top >= bottom || left >= right {
        debug!(?start, "edge search found no matching row");
        return Err(VisionError::NotFound(format!("no edges inside {:?}", start)));
    }

    while left < right && !col_hit(left, top, bottom) {
        left += 1;
    }
    while left < right && !col_hit(right - 1, top, bottom) {
        right -= 1;
    }
    if left >= right {
        debug!(?start, "edge search found no matching column");
        return Err(VisionError::NotFound(format!("no edges inside {:?}", start)));
    }

    let found = Rect::new(left, top, right - left, bottom - top);
    trace!(?start, ?found, "edges found");
    Ok(found)
}
