use image::{GrayImage, Luma, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::font::{render_text, text_extent, GlyphSource};
use crate::color::brightness;
use crate::error::{Result, VisionError};
use crate::geometry::Rect;
use crate::locate::find_edges;

/// Side length of the pruning blocks used when comparing maps.
pub const BLOCK: u32 = 8;

/// Rendering and comparison parameters shared by every template of a recogniser.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerParams {
    /// Integer glyph scale passed to the font renderer.
    pub scale: u32,
    /// Render canvas (width, height).
    pub canvas: (u32, u32),
    /// Offset of the first glyph from the canvas top-left.
    pub margin: u32,
    /// Brightness of the canvas and of unlit screen pixels.
    pub background: u8,
    /// Brightness of rendered ink and of lit screen pixels.
    pub foreground: u8,
    /// Stored map resolution; both sides must be multiples of 8.
    pub template_size: (u32, u32),
}

impl Default for RecognizerParams {
    fn default() -> Self {
        Self {
            scale: 2,
            canvas: (256, 32),
            margin: 4,
            background: 0,
            foreground: 255,
            template_size: (64, 16),
        }
    }
}

/// Rescales a brightness against a `(bg, fg)` reference with a squared contrast curve.
pub fn normalise(value: u8, bg: u8, fg: u8) -> u8 {
    if fg == bg {
        return 0;
    }
    let n = ((value as f32 - bg as f32) / (fg as f32 - bg as f32)).clamp(0.0, 1.0);
    (n * n * 255.0).round() as u8
}

/// One pre-rendered candidate.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphTemplate {
    pub label: String,
    /// Width over height of the tight ink crop.
    pub aspect_ratio: f32,
    /// Normalised brightness, row-major at the recogniser's template size.
    pub map: Vec<u8>,
}

impl GlyphTemplate {
    fn build<G: GlyphSource + ?Sized>(font: &G, label: &str, params: &RecognizerParams) -> Result<Self> {
        let (cw, ch) = params.canvas;
        // Glyphs past the canvas are dropped silently, so check the full extent
        let (tw, th) = text_extent(font, label, params.scale);
        if params.margin + tw >= cw || params.margin + th >= ch {
            return Err(VisionError::RecognitionFailure(format!(
                "candidate {:?} does not fit the {}x{} canvas",
                label, cw, ch
            )));
        }

        let canvas = render_text(
            font,
            label,
            params.scale,
            params.canvas,
            (params.margin, params.margin),
            params.background,
            params.foreground,
        );

        let bg = params.background;
        let crop = find_edges(&canvas, Rect::of_image(cw, ch), |p: &Luma<u8>| p[0] != bg)
            .map_err(|_| VisionError::RecognitionFailure(format!("candidate {:?} renders no ink", label)))?;

        if crop.x == 0 || crop.y == 0 || crop.right() == cw || crop.bottom() == ch {
            return Err(VisionError::RecognitionFailure(format!(
                "candidate {:?} touches the {}x{} canvas edge",
                label, cw, ch
            )));
        }

        let map = resample_gray(&canvas, crop, params.template_size)
            .into_iter()
            .map(|v| normalise(v, params.background, params.foreground))
            .collect();

        Ok(Self {
            label: label.to_string(),
            aspect_ratio: crop.aspect_ratio(),
            map,
        })
    }
}

/// Integer-division nearest resample of `rect` to `(tw, th)`.
fn resample_gray(img: &GrayImage, rect: Rect, (tw, th): (u32, u32)) -> Vec<u8> {
    let mut out = Vec::with_capacity((tw * th) as usize);
    for ty in 0..th {
        let sy = rect.y + ty * rect.height / th;
        for tx in 0..tw {
            let sx = rect.x + tx * rect.width / tw;
            out.push(img.get_pixel(sx, sy)[0]);
        }
    }
    out
}

/// Best match reported by [`TemplateRecognizer::recognise_scored`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    pub label: String,
    /// Summed squared brightness distance of the winner.
    pub distance: u64,
    /// `1 - distance / max_distance`, in [0, 1].
    pub confidence: f32,
}

/// Matches screen regions against a fixed set of rendered candidate strings.
///
/// Templates are immutable once built, so a recogniser can be shared by
/// reference across threads.
#[derive(Clone, Debug)]
pub struct TemplateRecognizer {
    params: RecognizerParams,
    templates: Vec<GlyphTemplate>,
}

impl TemplateRecognizer {
    /// Renders and crops every candidate.
    ///
    /// Fails if the template size is not a positive multiple of 8, or if a
    /// candidate renders no ink or touches the canvas edge. An empty
    /// candidate list is accepted here and rejected by every `recognise` call.
    pub fn new<G, S>(font: &G, candidates: &[S], params: RecognizerParams) -> Result<Self>
    where
        G: GlyphSource + ?Sized,
        S: AsRef<str>,
    {
        let (tw, th) = params.template_size;
        if tw == 0 || th == 0 || tw % BLOCK != 0 || th % BLOCK != 0 {
            return Err(VisionError::RecognitionFailure(format!(
                "template size {}x{} is not a multiple of {}",
                tw, th, BLOCK
            )));
        }

        let templates = candidates
            .iter()
            .map(|c| GlyphTemplate::build(font, c.as_ref(), &params))
            .collect::<Result<Vec<_>>>()?;

        debug!(count = templates.len(), template_size = ?params.template_size, "templates built");
        Ok(Self { params, templates })
    }

    pub fn params(&self) -> &RecognizerParams {
        &self.params
    }

    pub fn templates(&self) -> &[GlyphTemplate] {
        &self.templates
    }

    /// Label of the closest template.
    pub fn recognise(&self, image: &RgbaImage, rect: Rect, reference: Option<(u8, u8)>) -> Result<String> {
        self.recognise_scored(image, rect, reference).map(|r| r.label)
    }

    /// Closest template together with its distance and confidence.
    ///
    /// `reference` overrides the `(background, foreground)` pair used to
    /// normalise the screen region.
    pub fn recognise_scored(&self, image: &RgbaImage, rect: Rect, reference: Option<(u8, u8)>) -> Result<Recognition> {
        if self.templates.is_empty() {
            return Err(VisionError::RecognitionFailure("no candidates registered".to_string()));
        }
        if rect.is_empty() || !Rect::of_image(image.width(), image.height()).encloses(&rect) {
            return Err(VisionError::RecognitionFailure(format!(
                "region {:?} is empty or outside the {}x{} image",
                rect,
                image.width(),
                image.height()
            )));
        }

        let (bg, fg) = reference.unwrap_or((self.params.background, self.params.foreground));
        let subject = self.subject_map(image, rect, bg, fg);

        let aspect = rect.aspect_ratio();
        let mut viable: Vec<&GlyphTemplate> = self
            .templates
            .iter()
            .filter(|t| t.aspect_ratio >= aspect * 0.5 && t.aspect_ratio <= aspect * 2.0)
            .collect();
        if viable.is_empty() {
            viable = self.templates.iter().collect();
        }

        let mut best: Option<(&GlyphTemplate, u64)> = None;
        for template in viable {
            let limit = best.map(|(_, d)| d);
            if let Some(d) = self.block_distance(&subject, &template.map, limit) {
                if limit.is_none_or(|l| d < l) {
                    best = Some((template, d));
                }
            }
        }

        // The first template is never pruned, so a winner always exists
        let Some((winner, distance)) = best else {
            return Err(VisionError::RecognitionFailure("no template evaluated".to_string()));
        };

        let (tw, th) = self.params.template_size;
        let max_distance = (tw * th) as u64 * 255 * 255;
        let confidence = 1.0 - distance as f32 / max_distance as f32;

        trace!(?rect, label = %winner.label, distance, confidence, "recognised");
        Ok(Recognition {
            label: winner.label.clone(),
            distance,
            confidence,
        })
    }

    fn subject_map(&self, image: &RgbaImage, rect: Rect, bg: u8, fg: u8) -> Vec<u8> {
        let (tw, th) = self.params.template_size;
        let mut out = Vec::with_capacity((tw * th) as usize);
        for ty in 0..th {
            let sy = rect.y + ty * rect.height / th;
            for tx in 0..tw {
                let sx = rect.x + tx * rect.width / tw;
                out.push(normalise(brightness(image.get_pixel(sx, sy)), bg, fg));
            }
        }
        out
    }

    /// Squared distance summed block by block; `None` once the running
    /// total exceeds `limit`.
    fn block_distance(&self, subject: &[u8], template: &[u8], limit: Option<u64>) -> Option<u64> {
        let (tw, th) = self.params.template_size;
        let mut total = 0u64;
        for by in (0..th).step_by(BLOCK as usize) {
            for bx in (0..tw).step_by(BLOCK as usize) {
                let mut block = 0u64;
                for y in by..by + BLOCK {
                    let row = (y * tw) as usize;
                    for x in bx..bx + BLOCK {
                        let i = row + x as usize;
                        let d = subject[i] as i64 - template[i] as i64;
                        block += (d * d) as u64;
                    }
                }
                total += block;
                if limit.is_some_and(|l| total > l) {
                    return None;
                }
            }
        }
        Some(total)
    }
}
