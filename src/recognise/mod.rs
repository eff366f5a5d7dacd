//! Template recognition of short rendered strings.

pub mod font;
pub mod template;

pub use font::{render_text, text_extent, BitmapFont, GlyphSource};
pub use template::{normalise, GlyphTemplate, Recognition, RecognizerParams, TemplateRecognizer};
