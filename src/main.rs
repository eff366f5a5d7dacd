//! panel-probe
//!
//! Loads a screenshot and a probe plan, runs every reader in the plan and
//! prints the results as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use panel_vision::annotate::AnnotationSink;
use panel_vision::{logging, LightingState, PreviewRenderer, ProbePlan, ReaderReport, ReaderSet};

#[derive(Parser)]
#[command(name = "panel-probe", version, about = "Run panel readers against a screenshot")]
struct Args {
    /// PNG screenshot to read
    screenshot: PathBuf,
    /// Probe plan JSON (default: probe.json next to the executable)
    #[arg(long)]
    plan: Option<PathBuf>,
    /// Lighting override: on, dim, off or emergency
    #[arg(long)]
    lighting: Option<LightingState>,
    /// Write an annotated copy of the screenshot here
    #[arg(long)]
    preview: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init();

    let plan = ProbePlan::load_or_default(args.plan.as_deref());
    let lighting = args.lighting.unwrap_or(plan.lighting);

    let screenshot = image::open(&args.screenshot)
        .with_context(|| format!("Failed to open screenshot {}", args.screenshot.display()))?
        .to_rgba8();
    info!(
        "Screenshot {} ({}x{}), lighting {}",
        args.screenshot.display(),
        screenshot.width(),
        screenshot.height(),
        lighting
    );

    let mut renderer = args.preview.as_ref().map(|_| PreviewRenderer::new(&screenshot));
    let readers = ReaderSet::new(plan.readers);
    let results = readers.run(&screenshot, lighting, renderer.as_mut().map(|r| r as &mut dyn AnnotationSink));

    let reports: Vec<ReaderReport> = results.iter().map(|(name, result)| ReaderReport::new(name, result)).collect();
    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    info!("{} readers done, {} failed", reports.len(), failed);

    println!("{}", serde_json::to_string_pretty(&reports)?);

    if let (Some(path), Some(renderer)) = (&args.preview, renderer) {
        renderer
            .into_image()
            .save(path)
            .with_context(|| format!("Failed to save preview {}", path.display()))?;
        info!("Preview saved to {}", path.display());
    }

    Ok(())
}
