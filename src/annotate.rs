//! Structured annotations emitted by readers, and a renderer that draws them.
//!
//! The engine itself never draws. Readers push geometry into an optional
//! [`AnnotationSink`]; callers that want a picture attach a
//! [`PreviewRenderer`].

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Quad, Rect};
use crate::recognise::{BitmapFont, GlyphSource};

pub const COLOR_RECT: Rgba<u8> = Rgba([0, 255, 0, 255]); // Green
pub const COLOR_QUAD: Rgba<u8> = Rgba([0, 128, 255, 255]); // Blue
pub const COLOR_POINT: Rgba<u8> = Rgba([255, 0, 0, 255]); // Red
pub const COLOR_LABEL: Rgba<u8> = Rgba([255, 255, 0, 255]); // Yellow

/// A labelled piece of geometry in screenshot coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Annotation {
    Rect { label: String, rect: Rect },
    Quad { label: String, quad: Quad },
    Point { label: String, point: Point },
}

impl Annotation {
    pub fn rect(label: impl Into<String>, rect: Rect) -> Self {
        Annotation::Rect { label: label.into(), rect }
    }

    pub fn quad(label: impl Into<String>, quad: Quad) -> Self {
        Annotation::Quad { label: label.into(), quad }
    }

    pub fn point(label: impl Into<String>, point: Point) -> Self {
        Annotation::Point { label: label.into(), point }
    }

    pub fn label(&self) -> &str {
        match self {
            Annotation::Rect { label, .. } | Annotation::Quad { label, .. } | Annotation::Point { label, .. } => label,
        }
    }
}

/// Receives geometry from readers.
pub trait AnnotationSink {
    fn annotate(&mut self, annotation: Annotation);
}

impl AnnotationSink for Vec<Annotation> {
    fn annotate(&mut self, annotation: Annotation) {
        self.push(annotation);
    }
}

/// Draws annotations onto its own copy of a screenshot.
pub struct PreviewRenderer {
    image: RgbaImage,
}

impl PreviewRenderer {
    pub fn new(screenshot: &RgbaImage) -> Self {
        Self {
            image: screenshot.clone(),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl AnnotationSink for PreviewRenderer {
    fn annotate(&mut self, annotation: Annotation) {
        let img = &mut self.image;
        let anchor = match &annotation {
            Annotation::Rect { rect, .. } => {
                draw_rect(img, rect.x, rect.y, rect.width, rect.height, COLOR_RECT, 2);
                Point::new(rect.x as i32, rect.y as i32)
            }
            Annotation::Quad { quad, .. } => {
                draw_quad(img, quad, COLOR_QUAD);
                quad.top_left
            }
            Annotation::Point { point, .. } => {
                if point.x >= 0 && point.y >= 0 {
                    draw_crosshair(img, point.x as u32, point.y as u32, COLOR_POINT, 6);
                }
                *point
            }
        };
        draw_label(img, annotation.label(), anchor, COLOR_LABEL);
    }
}

/// Draws a rectangle border on an image.
pub fn draw_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>, thickness: u32) {
    let (img_w, img_h) = img.dimensions();
    let mut put = |px: u32, py: u32| {
        if px < img_w && py < img_h {
            img.put_pixel(px, py, color);
        }
    };

    for t in 0..thickness.min(h) {
        for dx in 0..w {
            // Top and bottom edges
            put(x + dx, y + t);
            put(x + dx, y + h - 1 - t);
        }
    }
    for t in 0..thickness.min(w) {
        for dy in 0..h {
            // Left and right edges
            put(x + t, y + dy);
            put(x + w - 1 - t, y + dy);
        }
    }
}

/// Draws a crosshair at a point.
pub fn draw_crosshair(img: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>, arm_length: u32) {
    let (img_w, img_h) = img.dimensions();
    let (cx, cy, arm) = (x as i64, y as i64, arm_length as i64);

    for d in -arm..=arm {
        // Three pixels thick on both arms
        for off in -1..=1 {
            for (px, py) in [(cx + d, cy + off), (cx + off, cy + d)] {
                if px >= 0 && py >= 0 && (px as u32) < img_w && (py as u32) < img_h {
                    img.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }
}

/// Draws a one-pixel line with Bresenham's algorithm, clipped to the image.
pub fn draw_line(img: &mut RgbaImage, from: Point, to: Point, color: Rgba<u8>) {
    let (img_w, img_h) = img.dimensions();
    let (mut x, mut y) = (from.x as i64, from.y as i64);
    let (x1, y1) = (to.x as i64, to.y as i64);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x >= 0 && y >= 0 && (x as u32) < img_w && (y as u32) < img_h {
            img.put_pixel(x as u32, y as u32, color);
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Outlines a quad, TL → TR → BR → BL → TL.
pub fn draw_quad(img: &mut RgbaImage, quad: &Quad, color: Rgba<u8>) {
    let ring = [quad.top_left, quad.top_right, quad.bottom_right, quad.bottom_left];
    for i in 0..4 {
        draw_line(img, ring[i], ring[(i + 1) % 4], color);
    }
}

/// Writes `text` in the built-in font just above `anchor`.
fn draw_label(img: &mut RgbaImage, text: &str, anchor: Point, color: Rgba<u8>) {
    if text.is_empty() {
        return;
    }
    let font = BitmapFont;
    let (cw, ch) = font.cell_size();
    let advance = (cw + font.spacing()) as i64;
    let top = anchor.y as i64 - ch as i64 - 2;
    let (img_w, img_h) = img.dimensions();

    for (i, c) in text.chars().enumerate() {
        let left = anchor.x as i64 + i as i64 * advance;
        for row in 0..ch {
            for col in 0..cw {
                let (px, py) = (left + col as i64, top + row as i64);
                if font.ink(c, col, row) && px >= 0 && py >= 0 && (px as u32) < img_w && (py as u32) < img_h {
                    img.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    #[test]
    fn test_draw_rect() {
        let mut img = RgbaImage::from_pixel(100, 100, BLACK);
        draw_rect(&mut img, 10, 10, 50, 30, COLOR_RECT, 2);

        assert_eq!(*img.get_pixel(10, 10), COLOR_RECT);
        assert_eq!(*img.get_pixel(59, 39), COLOR_RECT);
        assert_eq!(*img.get_pixel(35, 25), BLACK);
    }

    #[test]
    fn test_draw_rect_clipped() {
        let mut img = RgbaImage::from_pixel(20, 20, BLACK);
        draw_rect(&mut img, 15, 15, 50, 50, COLOR_RECT, 1);
        assert_eq!(*img.get_pixel(15, 19), COLOR_RECT);
        assert_eq!(*img.get_pixel(19, 15), COLOR_RECT);
    }

    #[test]
    fn test_draw_crosshair() {
        let mut img = RgbaImage::from_pixel(100, 100, BLACK);
        draw_crosshair(&mut img, 50, 50, COLOR_POINT, 10);

        assert_eq!(*img.get_pixel(50, 50), COLOR_POINT);
        assert_eq!(*img.get_pixel(60, 50), COLOR_POINT);
        assert_eq!(*img.get_pixel(50, 41), COLOR_POINT);
        assert_eq!(*img.get_pixel(45, 45), BLACK);
    }

    #[test]
    fn test_crosshair_near_origin() {
        let mut img = RgbaImage::from_pixel(10, 10, BLACK);
        draw_crosshair(&mut img, 0, 0, COLOR_POINT, 4);
        assert_eq!(*img.get_pixel(4, 0), COLOR_POINT);
    }

    #[test]
    fn test_quad_outline_hits_corners() {
        let mut img = RgbaImage::from_pixel(64, 64, BLACK);
        let quad = Quad::new(Point::new(5, 8), Point::new(50, 4), Point::new(9, 60), Point::new(58, 55));
        draw_quad(&mut img, &quad, COLOR_QUAD);
        for p in quad.corners() {
            assert_eq!(*img.get_pixel(p.x as u32, p.y as u32), COLOR_QUAD);
        }
        assert_eq!(*img.get_pixel(30, 30), BLACK);
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<Annotation> = Vec::new();
        sink.annotate(Annotation::point("light", Point::new(3, 4)));
        sink.annotate(Annotation::rect("panel", Rect::new(0, 0, 5, 5)));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].label(), "light");
    }

    #[test]
    fn test_renderer_leaves_source_untouched() {
        let screenshot = RgbaImage::from_pixel(80, 80, BLACK);
        let mut renderer = PreviewRenderer::new(&screenshot);
        renderer.annotate(Annotation::rect("A", Rect::new(20, 20, 30, 30)));
        renderer.annotate(Annotation::point("", Point::new(40, 40)));

        let out = renderer.into_image();
        assert_eq!(*out.get_pixel(20, 20), COLOR_RECT);
        assert_eq!(*out.get_pixel(40, 40), COLOR_POINT);
        // Label sits above the rectangle
        assert!((11..18).any(|y| (20..25).any(|x| *out.get_pixel(x, y) == COLOR_LABEL)));
        assert!(screenshot.pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn test_annotation_json() {
        let a = Annotation::quad("bezel", Quad::from(Rect::new(1, 2, 3, 4)));
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("\"kind\":\"quad\""));
        let back: Annotation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
