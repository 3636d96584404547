//! Execution modes for sensitivity analysis.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How an aggregator executes its calculation.
///
/// Farmer mode performs a single deterministic evaluation of the baseline
/// scenario. Scientific mode sweeps each multi-valued parameter one at a
/// time while holding all others at baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Farmer,
    Scientific,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Farmer => write!(f, "farmer"),
            Mode::Scientific => write!(f, "scientific"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "farmer" => Ok(Mode::Farmer),
            "scientific" => Ok(Mode::Scientific),
            other => Err(format!(
                "Unknown mode '{other}'. Expected 'farmer' or 'scientific'"
            )),
        }
    }
}
