//! Visual state extraction for a fixed-layout game display.
//!
//! Turns regions of a screenshot into calibrated, perspective-corrected
//! pixel data and then into discrete facts: positions, colours, digits,
//! words and on/off flags. Everything here is synchronous and pure apart
//! from the explicitly in-place lighting mutators.

pub mod annotate;
pub mod color;
pub mod config;
pub mod decode;
pub mod error;
pub mod geometry;
pub mod locate;
pub mod logging;
pub mod paths;
pub mod readers;
pub mod recognise;
pub mod sample;

pub use annotate::{Annotation, AnnotationSink, PreviewRenderer};
pub use color::{HsvColor, HsvRange, LightingState};
pub use config::ProbePlan;
pub use error::{Result, VisionError};
pub use geometry::{Corner, Point, Quad, Rect};
pub use readers::{run_readers, NamedReader, ReaderConfig, ReaderReport, ReaderSet, Reading};
pub use recognise::{BitmapFont, GlyphSource, RecognizerParams, TemplateRecognizer};
pub use sample::{undistort, Sampling};
