use image::RgbaImage;
use tracing::trace;

use crate::color::{to_hsv, uncorrect, HsvRange, LightingState};

/// Colour of a lit stage bar.
pub const STAGE_LIT: HsvRange = HsvRange::new([80.0, 160.0], [0.4, 1.0], [0.35, 1.0]);

/// Counts lit bars along column `x` over rows `[y_start, y_end)`.
///
/// A bar is counted on its first lit row; the count only rises again
/// after at least one unlit row. Rows outside the image are ignored.
pub fn count_stages(image: &RgbaImage, x: u32, y_start: u32, y_end: u32, lighting: LightingState) -> u32 {
    if x >= image.width() {
        return 0;
    }
    let y_end = y_end.min(image.height());

    let mut count = 0;
    let mut was_lit = false;
    for y in y_start..y_end {
        let lit = STAGE_LIT.contains(to_hsv(uncorrect(*image.get_pixel(x, y), lighting)));
        if lit && !was_lit {
            count += 1;
        }
        was_lit = lit;
    }
    trace!(x, y_start, y_end, count, "stage tally");
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::correct;
    use image::Rgba;

    const BAR: Rgba<u8> = Rgba([40, 200, 70, 255]);
    const GAP: Rgba<u8> = Rgba([25, 30, 25, 255]);

    fn indicator(lit_bars: &[(u32, u32)], lighting: LightingState) -> RgbaImage {
        RgbaImage::from_fn(20, 100, |_, y| {
            let on = lit_bars.iter().any(|&(a, b)| y >= a && y < b);
            correct(if on { BAR } else { GAP }, lighting)
        })
    }

    #[test]
    fn test_three_lit_bars() {
        let img = indicator(&[(10, 20), (30, 40), (50, 60)], LightingState::On);
        assert_eq!(count_stages(&img, 10, 0, 100, LightingState::On), 3);
    }

    #[test]
    fn test_adjacent_rows_are_one_bar() {
        let img = indicator(&[(10, 20), (20, 30)], LightingState::On);
        assert_eq!(count_stages(&img, 10, 0, 100, LightingState::On), 1);
    }

    #[test]
    fn test_bar_at_scan_start_counts() {
        let img = indicator(&[(0, 5), (40, 45)], LightingState::On);
        assert_eq!(count_stages(&img, 3, 0, 100, LightingState::On), 2);
        assert_eq!(count_stages(&img, 3, 2, 30, LightingState::On), 1);
    }

    #[test]
    fn test_dark_lighting() {
        let img = indicator(&[(10, 20), (30, 40), (50, 60)], LightingState::Off);
        assert_eq!(count_stages(&img, 10, 0, 100, LightingState::Off), 3);
    }

    #[test]
    fn test_out_of_range() {
        let img = indicator(&[(10, 20)], LightingState::On);
        assert_eq!(count_stages(&img, 50, 0, 100, LightingState::On), 0);
        assert_eq!(count_stages(&img, 5, 0, 500, LightingState::On), 1);
        assert_eq!(count_stages(&img, 5, 60, 10, LightingState::On), 0);
    }
}
