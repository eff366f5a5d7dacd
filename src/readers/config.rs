//! Reader configurations: the thin per-module layer over the engine.
//!
//! Each variant names a region, a colour predicate or a candidate list and
//! maps onto one engine operation. Configurations are plain data and load
//! from JSON.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::annotate::{Annotation, AnnotationSink};
use crate::color::{brightness, uncorrect, HsvRange, LightingState};
use crate::decode::{count_stages, find_highlight, read_digit, read_status_light, LightStatus, DEFAULT_STRIDE};
use crate::error::Result;
use crate::geometry::{Point, Quad, Rect};
use crate::locate::{find_corners, find_edges};
use crate::recognise::{normalise, text_extent, BitmapFont, RecognizerParams, TemplateRecognizer};

fn default_stride() -> u32 {
    DEFAULT_STRIDE
}

fn default_continuity() -> u32 {
    4
}

fn default_scale() -> u32 {
    2
}

/// One reader, tagged by `type` in JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReaderConfig {
    /// Tight bounding box of `colour` inside `region`.
    Edges { region: Rect, colour: HsvRange },
    /// Corners of a (possibly skewed) panel of `colour` inside `region`.
    Panel {
        region: Rect,
        colour: HsvRange,
        #[serde(default = "default_continuity")]
        continuity: u32,
    },
    /// Seven-segment digits, one quad per cell, read left to right.
    Digits { digits: Vec<Quad>, lit: HsvRange },
    /// Status light of the bezel found inside `bezel_region`.
    StatusLight {
        bezel_region: Rect,
        bezel_colour: HsvRange,
        #[serde(default = "default_continuity")]
        continuity: u32,
    },
    /// Selection highlight anywhere in `region`.
    Highlight {
        region: Rect,
        #[serde(default = "default_stride")]
        stride: u32,
    },
    /// Lit bars along column `x`.
    StageIndicator { x: u32, y_start: u32, y_end: u32 },
    /// Which of `candidates` is written in `region`.
    ///
    /// `reference` is the `(background, foreground)` brightness of the text
    /// on screen. Without it the text is assumed white on black.
    Text {
        region: Rect,
        candidates: Vec<String>,
        #[serde(default = "default_scale")]
        scale: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reference: Option<(u8, u8)>,
    },
}

/// Result of one reader.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Reading {
    Region(Rect),
    Corners(Quad),
    Digits(String),
    Status(LightStatus),
    Selection(Option<Point>),
    Stages(u32),
    Text { label: String, confidence: f32 },
}

fn emit(sink: &mut Option<&mut dyn AnnotationSink>, annotation: Annotation) {
    if let Some(s) = sink.as_deref_mut() {
        s.annotate(annotation);
    }
}

impl ReaderConfig {
    /// Short name of the variant, used as the annotation label.
    pub fn kind(&self) -> &'static str {
        match self {
            ReaderConfig::Edges { .. } => "edges",
            ReaderConfig::Panel { .. } => "panel",
            ReaderConfig::Digits { .. } => "digits",
            ReaderConfig::StatusLight { .. } => "status_light",
            ReaderConfig::Highlight { .. } => "highlight",
            ReaderConfig::StageIndicator { .. } => "stage_indicator",
            ReaderConfig::Text { .. } => "text",
        }
    }

    /// Builds the recogniser a `text` reader needs. Other readers need none.
    pub fn prepare(&self) -> Option<Result<TemplateRecognizer>> {
        match self {
            ReaderConfig::Text { candidates, scale, .. } => Some(text_recogniser(candidates, *scale)),
            _ => None,
        }
    }

    /// Evaluates this reader against `image` captured under `lighting`.
    ///
    /// Colour predicates are tested after undoing `lighting`, so ranges are
    /// always written for the fully lit display.
    pub fn read(&self, image: &RgbaImage, lighting: LightingState, sink: Option<&mut dyn AnnotationSink>) -> Result<Reading> {
        let recogniser = self.prepare().transpose()?;
        self.read_prepared(image, lighting, recogniser.as_ref(), sink)
    }

    /// Like [`read`](Self::read), reusing a recogniser from [`prepare`](Self::prepare).
    ///
    /// A `text` reader given no recogniser builds its own.
    pub fn read_prepared(
        &self,
        image: &RgbaImage,
        lighting: LightingState,
        recogniser: Option<&TemplateRecognizer>,
        mut sink: Option<&mut dyn AnnotationSink>,
    ) -> Result<Reading> {
        let label = self.kind();
        let canonical = |range: &HsvRange| {
            let range = *range;
            move |p: &Rgba<u8>| range.matches(&uncorrect(*p, lighting))
        };

        let reading = match self {
            ReaderConfig::Edges { region, colour } => {
                let found = find_edges(image, *region, canonical(colour))?;
                emit(&mut sink, Annotation::rect(label, found));
                Reading::Region(found)
            }
            ReaderConfig::Panel {
                region,
                colour,
                continuity,
            } => {
                let quad = find_corners(image, *region, canonical(colour), *continuity)?;
                emit(&mut sink, Annotation::quad(label, quad));
                Reading::Corners(quad)
            }
            ReaderConfig::Digits { digits, lit } => {
                let mut text = String::new();
                for (i, quad) in digits.iter().enumerate() {
                    emit(&mut sink, Annotation::quad(format!("{label}{i}"), *quad));
                    if let Some(c) = read_digit(image, quad, canonical(lit))? {
                        text.push(c);
                    }
                }
                Reading::Digits(text)
            }
            ReaderConfig::StatusLight {
                bezel_region,
                bezel_colour,
                continuity,
            } => {
                let bezel = find_corners(image, *bezel_region, canonical(bezel_colour), *continuity)?;
                emit(&mut sink, Annotation::quad(label, bezel));
                Reading::Status(read_status_light(image, &bezel, lighting))
            }
            ReaderConfig::Highlight { region, stride } => {
                let found = find_highlight(image, *region, lighting, *stride);
                if let Some(p) = found {
                    emit(&mut sink, Annotation::point(label, p));
                }
                Reading::Selection(found)
            }
            ReaderConfig::StageIndicator { x, y_start, y_end } => {
                Reading::Stages(count_stages(image, *x, *y_start, *y_end, lighting))
            }
            ReaderConfig::Text {
                region,
                candidates,
                scale,
                reference,
            } => {
                let built;
                let recogniser = match recogniser {
                    Some(r) => r,
                    None => {
                        built = text_recogniser(candidates, *scale)?;
                        &built
                    }
                };
                let params = recogniser.params();
                let (bg, fg) = reference.unwrap_or((params.background, params.foreground));
                let ink = find_edges(image, *region, |p: &Rgba<u8>| {
                    normalise(brightness(&uncorrect(*p, lighting)), bg, fg) >= 128
                })?;
                emit(&mut sink, Annotation::rect(label, ink));

                let scratch = lit_copy(image, ink, lighting);
                let r = recogniser.recognise_scored(&scratch, Rect::new(0, 0, ink.width, ink.height), Some((bg, fg)))?;
                Reading::Text {
                    label: r.label,
                    confidence: r.confidence,
                }
            }
        };

        trace!(kind = label, ?reading, "reader done");
        Ok(reading)
    }
}

/// Builds a recogniser whose canvas fits the longest candidate.
fn text_recogniser(candidates: &[String], scale: u32) -> Result<TemplateRecognizer> {
    let defaults = RecognizerParams::default();
    let scale = scale.max(1);
    let (w, h) = candidates
        .iter()
        .map(|c| text_extent(&BitmapFont, c, scale))
        .fold((0, 0), |(w, h), (cw, ch)| (w.max(cw), h.max(ch)));
    let params = RecognizerParams {
        scale,
        canvas: (w + 2 * defaults.margin, h + 2 * defaults.margin),
        ..defaults
    };
    TemplateRecognizer::new(&BitmapFont, candidates, params)
}

/// Copies `rect` out of `image` into a scratch buffer with lighting undone.
fn lit_copy(image: &RgbaImage, rect: Rect, lighting: LightingState) -> RgbaImage {
    RgbaImage::from_fn(rect.width, rect.height, |x, y| {
        uncorrect(*image.get_pixel(rect.x + x, rect.y + y), lighting)
    })
}
