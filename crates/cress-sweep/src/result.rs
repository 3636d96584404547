//! Sensitivity analysis result containers.
//!
//! Results come in two shapes. Farmer mode produces a flat mapping from
//! metric name to a single-element value array. Scientific mode nests a
//! mapping like that under every swept variable, with each curve aligned
//! index-for-index with the variable's own sample array. Both shapes
//! serialise untagged, so JSON reports stay flat or two-level with no enum
//! wrapper in between.

use cress_core::errors::{CressError, CressResult};
use cress_core::mode::Mode;
use cress_core::values::FloatValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered metric name to value curve mapping.
pub type MetricCurves = IndexMap<String, Vec<FloatValue>>;

/// Output of one aggregator's `analyze()` call.
///
/// Index 0 of every curve holds the baseline, so
/// [`SensitivityResult::baseline_metric`] works on both shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensitivityResult {
    /// Single baseline evaluation, metric name to one-element array
    Farmer(MetricCurves),
    /// Swept variable to its per-metric curves
    Scientific(IndexMap<String, MetricCurves>),
}

impl SensitivityResult {
    /// The mode this result was produced in
    pub fn mode(&self) -> Mode {
        match self {
            SensitivityResult::Farmer(_) => Mode::Farmer,
            SensitivityResult::Scientific(_) => Mode::Scientific,
        }
    }

    /// Get the flat curves if this is a Farmer result
    pub fn as_farmer(&self) -> Option<&MetricCurves> {
        match self {
            SensitivityResult::Farmer(curves) => Some(curves),
            _ => None,
        }
    }

    /// Get the per-variable mapping if this is a Scientific result
    pub fn as_scientific(&self) -> Option<&IndexMap<String, MetricCurves>> {
        match self {
            SensitivityResult::Scientific(results) => Some(results),
            _ => None,
        }
    }

    /// Names of the swept variables, empty for a Farmer result
    pub fn swept_variables(&self) -> Vec<&str> {
        match self {
            SensitivityResult::Farmer(_) => Vec::new(),
            SensitivityResult::Scientific(results) => {
                results.keys().map(String::as_str).collect()
            }
        }
    }

    /// Get one variable's metric curve in a Scientific result
    pub fn metric_curve(&self, variable: &str, metric: &str) -> CressResult<&[FloatValue]> {
        let missing = || CressError::MissingMetric {
            variable: variable.to_string(),
            metric: metric.to_string(),
        };
        match self {
            SensitivityResult::Farmer(_) => Err(missing()),
            SensitivityResult::Scientific(results) => {
                let curve = results
                    .get(variable)
                    .and_then(|curves| curves.get(metric))
                    .ok_or_else(missing)?;
                if curve.is_empty() {
                    return Err(missing());
                }
                Ok(curve.as_slice())
            }
        }
    }

    /// The baseline value of a metric.
    ///
    /// Reads index 0 of the metric's curve. For a Scientific result any
    /// variable's curve would do, since index 0 always holds the same
    /// unperturbed value; the first swept variable is used.
    pub fn baseline_metric(&self, metric: &str) -> CressResult<FloatValue> {
        match self {
            SensitivityResult::Farmer(curves) => curves
                .get(metric)
                .and_then(|curve| curve.first())
                .copied()
                .ok_or_else(|| CressError::MissingMetric {
                    variable: "baseline".to_string(),
                    metric: metric.to_string(),
                }),
            SensitivityResult::Scientific(results) => {
                let (variable, curves) =
                    results.first().ok_or_else(|| CressError::MissingMetric {
                        variable: "baseline".to_string(),
                        metric: metric.to_string(),
                    })?;
                curves
                    .get(metric)
                    .and_then(|curve| curve.first())
                    .copied()
                    .ok_or_else(|| CressError::MissingMetric {
                        variable: variable.clone(),
                        metric: metric.to_string(),
                    })
            }
        }
    }
}
