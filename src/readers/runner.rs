use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::config::{ReaderConfig, Reading};
use crate::annotate::{Annotation, AnnotationSink};
use crate::color::LightingState;
use crate::error::Result;
use crate::recognise::TemplateRecognizer;

/// A reader with the name its result is reported under.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedReader {
    pub name: String,
    pub config: ReaderConfig,
}

/// Outcome of one reader, in a form that serialises cleanly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReaderReport {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading: Option<Reading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReaderReport {
    pub fn new(name: &str, result: &Result<Reading>) -> Self {
        match result {
            Ok(reading) => Self {
                name: name.to_string(),
                reading: Some(reading.clone()),
                error: None,
            },
            Err(e) => Self {
                name: name.to_string(),
                reading: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Prefixes every label with the reader name before forwarding.
struct Prefixed<'a> {
    name: &'a str,
    inner: &'a mut dyn AnnotationSink,
}

impl AnnotationSink for Prefixed<'_> {
    fn annotate(&mut self, annotation: Annotation) {
        let relabel = |label: String| format!("{}/{}", self.name, label);
        let annotation = match annotation {
            Annotation::Rect { label, rect } => Annotation::Rect {
                label: relabel(label),
                rect,
            },
            Annotation::Quad { label, quad } => Annotation::Quad {
                label: relabel(label),
                quad,
            },
            Annotation::Point { label, point } => Annotation::Point {
                label: relabel(label),
                point,
            },
        };
        self.inner.annotate(annotation);
    }
}

/// A reader list with its recognisers built up front.
///
/// Build once, then [`run`](Self::run) against as many screenshots as needed.
/// A recogniser that fails to build is reported against its own reader on
/// every run.
pub struct ReaderSet {
    readers: Vec<NamedReader>,
    prepared: Vec<Option<Result<TemplateRecognizer>>>,
}

impl ReaderSet {
    pub fn new(readers: Vec<NamedReader>) -> Self {
        let prepared: Vec<_> = readers.iter().map(|r| r.config.prepare()).collect();
        debug!(
            readers = readers.len(),
            recognisers = prepared.iter().flatten().filter(|p| p.is_ok()).count(),
            "reader set built"
        );
        Self { readers, prepared }
    }

    pub fn readers(&self) -> &[NamedReader] {
        &self.readers
    }

    /// Runs every reader against one screenshot.
    ///
    /// Readers are independent: a failure is recorded against its reader and
    /// the rest still run. Results come back in input order.
    pub fn run(
        &self,
        image: &RgbaImage,
        lighting: LightingState,
        mut sink: Option<&mut dyn AnnotationSink>,
    ) -> Vec<(String, Result<Reading>)> {
        info!(count = self.readers.len(), %lighting, "running readers");

        self.readers
            .iter()
            .zip(&self.prepared)
            .map(|(reader, prepared)| {
                let result = match prepared {
                    Some(Err(e)) => Err(e.clone()),
                    Some(Ok(recogniser)) => read_one(reader, image, lighting, Some(recogniser), sink.as_deref_mut()),
                    None => read_one(reader, image, lighting, None, sink.as_deref_mut()),
                };
                if let Err(e) = &result {
                    warn!(reader = %reader.name, "read failed: {}", e);
                }
                (reader.name.clone(), result)
            })
            .collect()
    }
}

fn read_one(
    reader: &NamedReader,
    image: &RgbaImage,
    lighting: LightingState,
    recogniser: Option<&TemplateRecognizer>,
    sink: Option<&mut (dyn AnnotationSink + '_)>,
) -> Result<Reading> {
    match sink {
        Some(inner) => {
            let mut prefixed = Prefixed {
                name: &reader.name,
                inner,
            };
            reader.config.read_prepared(image, lighting, recogniser, Some(&mut prefixed))
        }
        None => reader.config.read_prepared(image, lighting, recogniser, None),
    }
}

/// Runs `readers` once against one screenshot. See [`ReaderSet::run`].
pub fn run_readers(
    image: &RgbaImage,
    lighting: LightingState,
    readers: &[NamedReader],
    sink: Option<&mut dyn AnnotationSink>,
) -> Vec<(String, Result<Reading>)> {
    ReaderSet::new(readers.to_vec()).run(image, lighting, sink)
}
