//! Screen-space geometry: points, half-open rectangles and quadrilaterals.
//!
//! All coordinates are absolute pixel positions in the source screenshot.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A pixel position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance, used when comparing detected and expected corners.
    pub fn distance_max(self, other: Point) -> u32 {
        (self.x - other.x).unsigned_abs().max((self.y - other.y).unsigned_abs())
    }
}

/// An axis-aligned rectangle, half-open on the right and bottom.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle covering a whole image.
    pub const fn of_image(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f32 / self.height as f32
    }

    pub fn contains(&self, p: Point) -> bool {
        let (x, y) = (p.x as i64, p.y as i64);
        x >= self.x as i64 && y >= self.y as i64 && x < self.right() as i64 && y < self.bottom() as i64
    }

    /// True when `other` lies entirely within `self`.
    pub fn encloses(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Clamps the rectangle to an image of the given size.
    pub fn clip(&self, image_width: u32, image_height: u32) -> Rect {
        let x0 = self.x.min(image_width);
        let y0 = self.y.min(image_height);
        let x1 = self.right().min(image_width);
        let y1 = self.bottom().min(image_height);
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }
}

/// Names the four corners of a [`Quad`] in index order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft = 0,
    TopRight = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];
}

/// Four corner points of a perspective-skewed planar region.
///
/// The points are not required to form a convex or well-ordered shape.
/// Detection can produce a mild skew and every consumer tolerates it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quad {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
}

impl Quad {
    pub const fn new(top_left: Point, top_right: Point, bottom_left: Point, bottom_right: Point) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }
    }

    pub fn corners(&self) -> [Point; 4] {
        [self.top_left, self.top_right, self.bottom_left, self.bottom_right]
    }

    /// Maps fractional coordinates `(s, t)` in `[0, 1]²` into the quad.
    ///
    /// Interpolates down the left edge and the right edge by `t`, then
    /// across between those two points by `s`.
    pub fn interpolate(&self, s: f32, t: f32) -> (f32, f32) {
        let lerp = |a: Point, b: Point, f: f32| {
            (
                a.x as f32 + (b.x - a.x) as f32 * f,
                a.y as f32 + (b.y - a.y) as f32 * f,
            )
        };
        let (lx, ly) = lerp(self.top_left, self.bottom_left, t);
        let (rx, ry) = lerp(self.top_right, self.bottom_right, t);
        (lx + (rx - lx) * s, ly + (ry - ly) * s)
    }

    /// Same as [`Quad::interpolate`], rounded to the nearest pixel.
    pub fn point_at(&self, s: f32, t: f32) -> Point {
        let (x, y) = self.interpolate(s, t);
        Point::new(x.round() as i32, y.round() as i32)
    }

    /// Smallest rectangle containing all four corners (clamped at zero).
    pub fn bounding_rect(&self) -> Rect {
        let xs = self.corners().map(|p| p.x.max(0) as u32);
        let ys = self.corners().map(|p| p.y.max(0) as u32);
        let (x0, x1) = (xs.iter().min().copied().unwrap_or(0), xs.iter().max().copied().unwrap_or(0));
        let (y0, y1) = (ys.iter().min().copied().unwrap_or(0), ys.iter().max().copied().unwrap_or(0));
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }
}

impl From<Rect> for Quad {
    /// The right and bottom corners sit on the exclusive edge, so that
    /// undistorting to `rect`'s own size maps pixels one to one.
    fn from(r: Rect) -> Self {
        let (x0, y0) = (r.x as i32, r.y as i32);
        let (x1, y1) = (r.right() as i32, r.bottom() as i32);
        Quad::new(
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x0, y1),
            Point::new(x1, y1),
        )
    }
}

impl Index<Corner> for Quad {
    type Output = Point;

    fn index(&self, corner: Corner) -> &Point {
        match corner {
            Corner::TopLeft => &self.top_left,
            Corner::TopRight => &self.top_right,
            Corner::BottomLeft => &self.bottom_left,
            Corner::BottomRight => &self.bottom_right,
        }
    }
}

impl IndexMut<Corner> for Quad {
    fn index_mut(&mut self, corner: Corner) -> &mut Point {
        match corner {
            Corner::TopLeft => &mut self.top_left,
            Corner::TopRight => &mut self.top_right,
            Corner::BottomLeft => &mut self.bottom_left,
            Corner::BottomRight => &mut self.bottom_right,
        }
    }
}

impl Index<usize> for Quad {
    type Output = Point;

    /// Panics for indices above 3.
    fn index(&self, i: usize) -> &Point {
        &self[Corner::ALL[i]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_clip() {
        let r = Rect::new(90, 95, 20, 20);
        assert_eq!(r.clip(100, 100), Rect::new(90, 95, 10, 5));

        let outside = Rect::new(150, 10, 5, 5);
        assert!(outside.clip(100, 100).is_empty());
    }

    #[test]
    fn test_oversized_rect_clips_instead_of_overflowing() {
        let r = Rect::new(10, 20, u32::MAX, u32::MAX);
        assert_eq!(r.right(), u32::MAX);
        assert_eq!(r.bottom(), u32::MAX);
        assert_eq!(r.clip(100, 80), Rect::new(10, 20, 90, 60));
        assert!(r.contains(Point::new(i32::MAX, 30)));
        assert!(!r.contains(Point::new(5, 30)));
    }

    #[test]
    fn test_rect_contains_half_open() {
        let r = Rect::new(10, 10, 5, 5);
        assert!(r.contains(Point::new(10, 10)));
        assert!(r.contains(Point::new(14, 14)));
        assert!(!r.contains(Point::new(15, 14)));
        assert!(!r.contains(Point::new(14, 15)));
    }

    #[test]
    fn test_quad_index_order() {
        let q = Quad::new(
            Point::new(1, 2),
            Point::new(3, 4),
            Point::new(5, 6),
            Point::new(7, 8),
        );
        assert_eq!(q[0], Point::new(1, 2));
        assert_eq!(q[1], Point::new(3, 4));
        assert_eq!(q[2], Point::new(5, 6));
        assert_eq!(q[3], Point::new(7, 8));
        assert_eq!(q[Corner::BottomLeft], q[2]);
    }

    #[test]
    fn test_quad_interpolate_corners() {
        let q = Quad::new(
            Point::new(40, 40),
            Point::new(200, 60),
            Point::new(30, 220),
            Point::new(210, 200),
        );
        assert_eq!(q.point_at(0.0, 0.0), q.top_left);
        assert_eq!(q.point_at(1.0, 0.0), q.top_right);
        assert_eq!(q.point_at(0.0, 1.0), q.bottom_left);
        assert_eq!(q.point_at(1.0, 1.0), q.bottom_right);
        // Centre is the average of the four corners for a bilinear map
        assert_eq!(q.point_at(0.5, 0.5), Point::new(120, 130));
    }

    #[test]
    fn test_quad_from_rect_uses_exclusive_edges() {
        let q = Quad::from(Rect::new(10, 20, 30, 40));
        assert_eq!(q.top_left, Point::new(10, 20));
        assert_eq!(q.bottom_right, Point::new(40, 60));
        assert_eq!(q.bounding_rect(), Rect::new(10, 20, 30, 40));
    }
}
