use std::{fs, path::Path};

use anyhow::{Context, Result};
use pitchcal_core::{PitchDimensions, RansacOptions};
use pitchcal_linear::ValidationOptions;
use pitchcal_optim::PoseSolverOptions;
use serde::{Deserialize, Serialize};

/// Configuration of the whole calibration workflow.
///
/// Every section falls back to its defaults when omitted from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchCalConfig {
    /// Pitch size and coordinate origin.
    pub pitch: PitchDimensions,
    /// Robust homography fit.
    pub homography: RansacOptions,
    /// Acceptance threshold for the pixel→pitch calibration.
    pub validation: ValidationOptions,
    /// Camera pose search.
    pub pose: PoseSolverOptions,
}

impl PitchCalConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid pitchcal configuration")
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json_str(&data).with_context(|| format!("in {}", path.display()))
    }
}
