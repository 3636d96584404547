//! Scenario file loading.
//!
//! A scenario is a TOML file with the five parameter group tables at the
//! top level and an optional `[sampling]` table:
//!
//! ```toml
//! [farm_data]
//! area = [0.1409]
//! "yield" = [2700.0]
//! group = ["annual"]
//!
//! [crop_parameters]
//! moisture = [14.0]
//!
//! [sampling]
//! num_samples = 10
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cress_core::parameters::ParameterSet;
use cress_sweep::SamplingSettings;
use serde::Deserialize;

/// A parsed scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// The five parameter groups
    #[serde(flatten)]
    pub parameters: ParameterSet,
    /// Sampling expansion settings for scientific mode
    #[serde(default)]
    pub sampling: SamplingSettings,
}

/// Read and parse a scenario file.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse scenario file {}", path.display()))
}
