//! Per-module readers as plain configuration over the engine.

pub mod config;
pub mod runner;

pub use config::{ReaderConfig, Reading};
pub use runner::{run_readers, NamedReader, ReaderReport, ReaderSet};
