//! Probe plan: which readers to run, loaded from JSON.
//!
//! Looks for `probe.json` next to the executable unless a path is given.
//! A missing or broken plan is logged and replaced with the default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::color::LightingState;
use crate::paths;
use crate::readers::NamedReader;

/// Complete probe configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbePlan {
    /// Lighting the screenshot was taken under, unless overridden on the command line.
    pub lighting: LightingState,
    /// Readers to evaluate, reported in this order.
    pub readers: Vec<NamedReader>,
}

impl ProbePlan {
    /// Reads and parses a plan, failing on any I/O or JSON error.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let plan = serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(plan)
    }

    /// Loads `path`, or the default plan location, falling back to an empty plan.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let plan_path: PathBuf = path.map(Path::to_path_buf).unwrap_or_else(paths::default_plan_path);

        info!("Looking for probe plan at: {}", plan_path.display());

        if !plan_path.exists() {
            info!("{} not found. Using default plan.", plan_path.display());
            return ProbePlan::default();
        }

        match ProbePlan::from_file(&plan_path) {
            Ok(plan) => {
                info!("Probe plan loaded with {} readers", plan.readers.len());
                plan
            }
            Err(e) => {
                warn!("{:#}. Using default plan.", e);
                ProbePlan::default()
            }
        }
    }
}
