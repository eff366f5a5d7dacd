use image::RgbaImage;
use tracing::trace;

use crate::color::{HsvRange, LightingState};
use crate::geometry::{Point, Rect};

/// Default row and column step of the highlight scan.
pub const DEFAULT_STRIDE: u32 = 4;

/// Rendered appearance of the yellow selection highlight under each regime.
pub fn highlight_signature(lighting: LightingState) -> HsvRange {
    match lighting {
        LightingState::On => HsvRange::new([40.0, 70.0], [0.5, 1.0], [0.7, 1.0]),
        LightingState::Dim => HsvRange::new([40.0, 70.0], [0.45, 1.0], [0.4, 1.0]),
        LightingState::Off => HsvRange::new([35.0, 75.0], [0.4, 1.0], [0.2, 1.0]),
        LightingState::Emergency => HsvRange::new([12.0, 45.0], [0.6, 1.0], [0.7, 1.0]),
    }
}

/// Scans `region` in `stride` steps, row by row, for the highlight colour.
///
/// Returns the first matching pixel, or `None` when the region holds no
/// highlight.
pub fn find_highlight(image: &RgbaImage, region: Rect, lighting: LightingState, stride: u32) -> Option<Point> {
    let region = region.clip(image.width(), image.height());
    let signature = highlight_signature(lighting);
    let step = stride.max(1) as usize;

    let found = (region.y..region.bottom()).step_by(step).find_map(|y| {
        (region.x..region.right())
            .step_by(step)
            .find(|&x| signature.matches(image.get_pixel(x, y)))
            .map(|x| Point::new(x as i32, y as i32))
    });
    trace!(?region, ?lighting, ?found, "highlight scan");
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::correct;
    use image::Rgba;

    const HIGHLIGHT: Rgba<u8> = Rgba([255, 220, 0, 255]);
    const PANEL: Rgba<u8> = Rgba([60, 70, 90, 255]);

    fn panel_with_highlight(lighting: LightingState) -> RgbaImage {
        RgbaImage::from_fn(100, 60, |x, y| {
            let canonical = if (40..52).contains(&x) && (20..30).contains(&y) { HIGHLIGHT } else { PANEL };
            correct(canonical, lighting)
        })
    }

    #[test]
    fn test_found_under_every_lighting() {
        for lighting in LightingState::ALL {
            let img = panel_with_highlight(lighting);
            let found = find_highlight(&img, Rect::of_image(100, 60), lighting, DEFAULT_STRIDE);
            assert_eq!(found, Some(Point::new(40, 20)), "{lighting}");
        }
    }

    #[test]
    fn test_none_without_highlight() {
        for lighting in LightingState::ALL {
            let img = RgbaImage::from_fn(100, 60, |_, _| correct(PANEL, lighting));
            assert_eq!(find_highlight(&img, Rect::of_image(100, 60), lighting, DEFAULT_STRIDE), None);
        }
    }

    #[test]
    fn test_stride_can_skip_small_marks() {
        let mut img = RgbaImage::from_pixel(40, 40, PANEL);
        img.put_pixel(5, 5, HIGHLIGHT);
        let full = Rect::of_image(40, 40);
        assert_eq!(find_highlight(&img, full, LightingState::On, 4), None);
        assert_eq!(find_highlight(&img, full, LightingState::On, 1), Some(Point::new(5, 5)));
    }

    #[test]
    fn test_region_limits_scan() {
        let img = panel_with_highlight(LightingState::On);
        assert_eq!(find_highlight(&img, Rect::new(60, 0, 40, 60), LightingState::On, 2), None);
        assert_eq!(find_highlight(&img, Rect::new(42, 22, 30, 30), LightingState::On, 2), Some(Point::new(42, 22)));
    }
}
