//! Emission Combination Aggregator
//!
//! Combines the emission factor and residue sensitivity results into direct
//! N2O emission curves. The two upstream namespaces are disjoint: climate
//! and modifier names on one side, crop parameter names on the other. For a
//! variable swept on one side, the other side's input stays pinned at its
//! baseline, so every curve isolates the effect of exactly one parameter.
//!
//! Nothing is recomputed here. Each step selects the right index from an
//! upstream curve and runs the cheap emission kernel, keeping the total
//! cost proportional to the number of swept samples.

use crate::result::SensitivityResult;
use crate::sweep::collect_curves;
use cress_core::errors::{CressError, CressResult};
use cress_core::kernels::emission::{EmissionInputs, EmissionKernel, EmissionOutputs};
use cress_core::kernels::emission_factor::VAR_EF;
use cress_core::kernels::residue::VAR_N_CROP_RESIDUE;
use cress_core::mode::Mode;
use cress_core::values::FloatValue;
use indexmap::IndexMap;
use rayon::prelude::*;

/// Which upstream result a variable belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    EmissionFactor,
    Residue,
}

/// Cross-namespace combination of the two upstream sensitivity results.
///
/// Construction checks that both results have the shape the resolved mode
/// requires, classifies every swept variable onto exactly one side, and
/// reads the two baselines. A variable claimed by both sides is a fatal
/// conflict rather than a silent pick.
#[derive(Debug)]
pub struct EmissionAggregator<'a> {
    ef_result: &'a SensitivityResult,
    n_result: &'a SensitivityResult,
    variables: Vec<(String, Side)>,
    mode: Mode,
    kernel: EmissionKernel,
    ef_baseline: FloatValue,
    n_baseline: FloatValue,
}

impl<'a> EmissionAggregator<'a> {
    /// Validate the upstream results and build the aggregator.
    pub fn new(
        ef_result: &'a SensitivityResult,
        n_result: &'a SensitivityResult,
        requested_mode: Mode,
    ) -> CressResult<Self> {
        let mode = match requested_mode {
            Mode::Scientific => match (ef_result.mode(), n_result.mode()) {
                (Mode::Scientific, Mode::Scientific) => Mode::Scientific,
                (Mode::Farmer, Mode::Farmer) => {
                    log::warn!(
                        "Both upstream results hold only baseline values. Switching to farmer mode"
                    );
                    Mode::Farmer
                }
                _ => {
                    return Err(CressError::ModeMismatch {
                        expected: Mode::Scientific,
                        actual: Mode::Farmer,
                    })
                }
            },
            Mode::Farmer => {
                if ef_result.mode() != Mode::Farmer || n_result.mode() != Mode::Farmer {
                    return Err(CressError::ModeMismatch {
                        expected: Mode::Farmer,
                        actual: Mode::Scientific,
                    });
                }
                Mode::Farmer
            }
        };

        // Classify the variable universe, testing membership on both sides
        let mut variables = Vec::new();
        if mode == Mode::Scientific {
            let ef_variables = ef_result.swept_variables();
            let n_variables = n_result.swept_variables();
            for name in ef_variables.iter().chain(n_variables.iter()) {
                let on_ef_side = ef_variables.contains(name);
                let on_n_side = n_variables.contains(name);
                if on_ef_side && on_n_side {
                    return Err(CressError::NamespaceConflict {
                        name: name.to_string(),
                    });
                }
                let side = if on_ef_side {
                    Side::EmissionFactor
                } else {
                    Side::Residue
                };
                variables.push((name.to_string(), side));
            }
        }

        let ef_baseline = ef_result.baseline_metric(VAR_EF)?;
        let n_baseline = n_result.baseline_metric(VAR_N_CROP_RESIDUE)?;

        Ok(Self {
            ef_result,
            n_result,
            variables,
            mode,
            kernel: EmissionKernel::new(),
            ef_baseline,
            n_baseline,
        })
    }

    /// The resolved execution mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Run the combination.
    ///
    /// Farmer mode is a single kernel call on the two baselines. Scientific
    /// mode walks every upstream variable: the swept side supplies the
    /// per-index value, the other side stays at baseline.
    pub fn analyze(&self) -> CressResult<SensitivityResult> {
        match self.mode {
            Mode::Farmer => {
                let outputs = self.kernel.evaluate(&EmissionInputs {
                    ef: self.ef_baseline,
                    n_crop_residue: self.n_baseline,
                });
                Ok(SensitivityResult::Farmer(collect_curves([
                    outputs.metrics()
                ])))
            }
            Mode::Scientific => {
                let mut results = IndexMap::new();
                for (variable, side) in &self.variables {
                    let outputs: Vec<EmissionOutputs> = match side {
                        Side::EmissionFactor => {
                            let curve = self.ef_result.metric_curve(variable, VAR_EF)?;
                            curve
                                .par_iter()
                                .map(|&ef| {
                                    self.kernel.evaluate(&EmissionInputs {
                                        ef,
                                        n_crop_residue: self.n_baseline,
                                    })
                                })
                                .collect()
                        }
                        Side::Residue => {
                            let curve =
                                self.n_result.metric_curve(variable, VAR_N_CROP_RESIDUE)?;
                            curve
                                .par_iter()
                                .map(|&n_crop_residue| {
                                    self.kernel.evaluate(&EmissionInputs {
                                        ef: self.ef_baseline,
                                        n_crop_residue,
                                    })
                                })
                                .collect()
                        }
                    };
                    results.insert(
                        variable.clone(),
                        collect_curves(outputs.iter().map(|o| o.metrics())),
                    );
                }
                Ok(SensitivityResult::Scientific(results))
            }
        }
    }
}
