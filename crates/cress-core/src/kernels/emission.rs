//! Direct Emission Kernel
//!
//! Converts residue nitrogen and an emission factor into direct N2O and
//! CO2-equivalent emissions. Crop residue is the only direct source
//! considered; the other inventory sources (synthetic fertiliser, manure)
//! are zero here.
//!
//! # Inputs
//!
//! - `EF` (kg N2O-N/kg N) - Emission factor from the emission factor kernel
//! - `n_crop_residue` (kg N) - Residue nitrogen from the residue kernel
//!
//! # Outputs
//!
//! - `n_crop_direct` (kg N2O-N) - Direct emissions as nitrogen
//! - `no2_crop_direct` (kg N2O) - Direct emissions as nitrous oxide
//! - `co2_crop_direct` (kg CO2e) - Direct emissions as CO2 equivalent

use crate::values::FloatValue;
use serde::{Deserialize, Serialize};

/// Output metric names as they appear in results and reports
pub const VAR_N_CROP_DIRECT: &str = "n_crop_direct";
pub const VAR_NO2_CROP_DIRECT: &str = "no2_crop_direct";
pub const VAR_CO2_CROP_DIRECT: &str = "co2_crop_direct";

/// Mass ratio converting N2O-N to N2O
const N2O_N_TO_N2O: FloatValue = 44.0 / 28.0;

/// 100-year global warming potential of N2O (IPCC AR6)
const GWP_N2O: FloatValue = 273.0;

/// Input record for the emission kernel.
///
/// Unlike the other kernels this one takes upstream results rather than
/// scenario parameters, so there is no `from_set` constructor. The
/// aggregator selects the right EF and nitrogen value per sweep index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionInputs {
    /// Emission factor
    /// unit: kg N2O-N/kg N
    pub ef: FloatValue,
    /// Residue nitrogen
    /// unit: kg N
    pub n_crop_residue: FloatValue,
}

/// Outputs of a single emission kernel evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionOutputs {
    /// Direct emissions as nitrogen
    /// unit: kg N2O-N
    pub n_crop_direct: FloatValue,
    /// Direct emissions as nitrous oxide
    /// unit: kg N2O
    pub no2_crop_direct: FloatValue,
    /// Direct emissions as CO2 equivalent
    /// unit: kg CO2e
    pub co2_crop_direct: FloatValue,
}

impl EmissionOutputs {
    /// Project the outputs as (metric name, value) pairs in report order
    pub fn metrics(&self) -> [(&'static str, FloatValue); 3] {
        [
            (VAR_N_CROP_DIRECT, self.n_crop_direct),
            (VAR_NO2_CROP_DIRECT, self.no2_crop_direct),
            (VAR_CO2_CROP_DIRECT, self.co2_crop_direct),
        ]
    }
}

/// Direct N2O emission kernel
#[derive(Debug, Clone, Copy, Default)]
pub struct EmissionKernel;

impl EmissionKernel {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate the kernel for one input record
    pub fn evaluate(&self, inputs: &EmissionInputs) -> EmissionOutputs {
        let n_crop_direct = inputs.n_crop_residue * inputs.ef;
        let no2_crop_direct = n_crop_direct * N2O_N_TO_N2O;
        let co2_crop_direct = no2_crop_direct * GWP_N2O;

        EmissionOutputs {
            n_crop_direct,
            no2_crop_direct,
            co2_crop_direct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    // ===== Conversion Tests =====

    #[test]
    fn test_conversion_chain() {
        let outputs = EmissionKernel::new().evaluate(&EmissionInputs {
            ef: 0.01098705,
            n_crop_residue: 6.0895633,
        });

        assert!(is_close!(
            outputs.n_crop_direct,
            6.0895633 * 0.01098705
        ));
        assert!(is_close!(
            outputs.no2_crop_direct,
            outputs.n_crop_direct * 44.0 / 28.0
        ));
        assert!(is_close!(
            outputs.co2_crop_direct,
            outputs.no2_crop_direct * 273.0
        ));
    }

    #[test]
    fn test_zero_nitrogen_means_zero_emissions() {
        let outputs = EmissionKernel::new().evaluate(&EmissionInputs {
            ef: 0.011,
            n_crop_residue: 0.0,
        });
        assert_eq!(outputs.n_crop_direct, 0.0);
        assert_eq!(outputs.no2_crop_direct, 0.0);
        assert_eq!(outputs.co2_crop_direct, 0.0);
    }

    #[test]
    fn test_emissions_scale_with_ef() {
        let kernel = EmissionKernel::new();
        let base = kernel.evaluate(&EmissionInputs {
            ef: 0.01,
            n_crop_residue: 5.0,
        });
        let doubled = kernel.evaluate(&EmissionInputs {
            ef: 0.02,
            n_crop_residue: 5.0,
        });
        assert!(is_close!(doubled.co2_crop_direct, base.co2_crop_direct * 2.0));
    }
}
