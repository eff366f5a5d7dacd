//! Log setup for the probe binary: stderr plus `logs/panel_probe.log`.

use chrono::Local;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::fmt::{self, format::Writer, time::FormatTime};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::paths;

/// Wall-clock `HH:MM:SS.mmm` timestamps.
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "[{}]", Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the `info` default.
///
/// If the log file cannot be opened, logging continues on stderr only.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_timer(LocalTime)
        .with_writer(std::io::stderr);

    let log_file = paths::ensure_directories()
        .and_then(|_| OpenOptions::new().create(true).append(true).open(paths::get_log_file()));
    let (file_layer, file_error) = match log_file {
        Ok(file) => {
            let layer = fmt::layer()
                .with_target(false)
                .with_timer(LocalTime)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        tracing::warn!("Log file unavailable: {}", e);
    }

    // Route panics through the log so they reach the file too
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        tracing::error!("[PANIC]{} {}", location, msg);
    }));
}
