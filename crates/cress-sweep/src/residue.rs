//! Residue Sensitivity Aggregator
//!
//! Runs the crop residue kernel over the `crop_group_params` and
//! `crop_parameters` groups. `farm_data` contributes the field area, yield
//! and crop class to the baseline record but is held fixed and never swept.
//!
//! In farmer mode this is a single baseline evaluation. In scientific mode
//! every multi-valued governed parameter is swept one at a time, producing
//! six metric curves per swept parameter.

use crate::result::SensitivityResult;
use crate::sweep::{collect_curves, collect_sweeps, resolve_mode, SweepVariable};
use cress_core::errors::{CressError, CressResult};
use cress_core::kernels::residue::{ResidueInputs, ResidueKernel, ResidueOutputs};
use cress_core::mode::Mode;
use cress_core::parameters::{GroupId, ParameterSet};
use indexmap::IndexMap;
use rayon::prelude::*;

/// Groups this aggregator sweeps
const GOVERNED: [GroupId; 2] = [GroupId::CropGroupParams, GroupId::CropParameters];

/// One-factor-at-a-time sensitivity analysis of the residue kernel.
///
/// Construction validates the scenario and resolves the execution mode;
/// [`ResidueAggregator::analyze`] then runs without touching the scenario
/// again. A scientific request with no multi-valued governed parameter
/// downgrades to farmer mode, observable through
/// [`ResidueAggregator::mode`].
#[derive(Debug)]
pub struct ResidueAggregator {
    baseline: ResidueInputs,
    sweeps: Vec<SweepVariable>,
    mode: Mode,
    kernel: ResidueKernel,
}

impl ResidueAggregator {
    /// Validate the scenario and build the aggregator.
    ///
    /// Fails fast: unknown governed parameters, wrong array lengths for the
    /// resolved mode, and missing or malformed baseline values are all
    /// rejected here, before any kernel call.
    pub fn new(set: &ParameterSet, requested_mode: Mode) -> CressResult<Self> {
        for id in GOVERNED {
            for (name, _) in set.group(id).iter() {
                if !ResidueInputs::is_input(name) {
                    return Err(CressError::UnknownParameter {
                        group: id.to_string(),
                        name: name.clone(),
                    });
                }
            }
        }

        let mode = resolve_mode(requested_mode, set, &GOVERNED, "residue")?;
        let baseline = ResidueInputs::from_set(set)?;
        let sweeps = match mode {
            Mode::Scientific => collect_sweeps(set, &GOVERNED)?,
            Mode::Farmer => Vec::new(),
        };

        Ok(Self {
            baseline,
            sweeps,
            mode,
            kernel: ResidueKernel::new(),
        })
    }

    /// The resolved execution mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Run the analysis.
    ///
    /// Farmer mode returns the six metrics as one-element curves.
    /// Scientific mode returns them per swept parameter, each curve as long
    /// as that parameter's sample array and with the baseline at index 0.
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
                    let outputs: Vec<ResidueOutputs> = variable
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
