//! Emission Factor Sensitivity Aggregator
//!
//! Runs the emission factor kernel over the `climate_data` and `modifiers`
//! groups. Geometry entries such as `locations` take part in array length
//! validation but are excluded from the sweep variable list; every other
//! governed parameter must be a kernel input.
//!
//! Each sweep evaluation assembles a complete record, every input at
//! baseline except the one being varied.

use crate::result::SensitivityResult;
use crate::sweep::{collect_curves, collect_sweeps, resolve_mode, SweepVariable};
use cress_core::errors::{CressError, CressResult};
use cress_core::kernels::emission_factor::{
    EmissionFactorInputs, EmissionFactorKernel, EmissionFactorOutputs,
};
use cress_core::mode::Mode;
use cress_core::parameters::{GroupId, ParameterSet};
use indexmap::IndexMap;
use rayon::prelude::*;

/// Groups this aggregator sweeps
const GOVERNED: [GroupId; 2] = [GroupId::ClimateData, GroupId::Modifiers];

/// One-factor-at-a-time sensitivity analysis of the emission factor kernel.
#[derive(Debug)]
pub struct EmissionFactorAggregator {
    baseline: EmissionFactorInputs,
    sweeps: Vec<SweepVariable>,
    mode: Mode,
    kernel: EmissionFactorKernel,
}

impl EmissionFactorAggregator {
    /// Validate the scenario and build the aggregator.
    ///
    /// Follows the same protocol as the residue side: mode resolution with
    /// scientific to farmer downgrade, a validated baseline record, and
    /// fatal errors for unknown governed parameters or wrong array lengths,
    /// all before any kernel call.
    pub fn new(set: &ParameterSet, requested_mode: Mode) -> CressResult<Self> {
        for id in GOVERNED {
            for (name, values) in set.group(id).iter() {
                // Geometry is validated for length but never swept
                if values.first().is_some_and(|v| v.is_coordinates()) {
                    continue;
                }
                if !EmissionFactorInputs::is_input(name) {
                    return Err(CressError::UnknownParameter {
                        group: id.to_string(),
                        name: name.clone(),
                    });
                }
            }
        }

        let mode = resolve_mode(requested_mode, set, &GOVERNED, "emission factor")?;
        let baseline = EmissionFactorInputs::from_set(set)?;
        let sweeps = match mode {
            Mode::Scientific => collect_sweeps(set, &GOVERNED)?,
            Mode::Farmer => Vec::new(),
        };

        Ok(Self {
            baseline,
            sweeps,
            mode,
            kernel: EmissionFactorKernel::new(),
        })
    }

    /// The resolved execution mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Run the analysis.
    ///
    /// Farmer mode returns the four metrics as one-element curves.
    /// Scientific mode nests them per swept variable.
    pub fn analyze(&self) -> CressResult<SensitivityResult> {
        match self.mode {
            Mode::Farmer => {
                let outputs = self.kernel.evaluate(&self.baseline);
                Ok(SensitivityResult::Farmer(collect_curves([
                    outputs.metrics()
                ])))
            }
            Mode::Scientific => {
                let mut results = IndexMap::new();
                for variable in &self.sweeps {
                    let outputs: Vec<EmissionFactorOutputs> = variable
                        .values
                        .par_iter()
                        .map(|&value| {
                            let record =
                                self.baseline
                                    .with_value(variable.group, &variable.name, value)?;
                            Ok(self.kernel.evaluate(&record))
                        })
                        .collect::<CressResult<Vec<_>>>()?;
                    results.insert(
                        variable.name.clone(),
                        collect_curves(outputs.iter().map(|o| o.metrics())),
                    );
                }
                Ok(SensitivityResult::Scientific(results))
            }
        }
    }
}
