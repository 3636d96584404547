//! Emission Factor Kernel
//!
//! Calculates the direct N2O emission factor for a field from growing-season
//! climate, topography and management modifiers.
//!
//! # What This Kernel Does
//!
//! 1. Derives precipitation and evapotranspiration based emission factors
//!    using the exponential relationship of Rochette et al. (2008).
//!
//! 2. Blends them by the topographic low-lying fraction when the site is
//!    moisture limited, then scales the result by soil texture and the
//!    nitrogen source, tillage, cropping system and application method
//!    modifiers.
//!
//! # Inputs
//!
//! - `climate_data`: `P` (mm), `PE` (mm), `FR_Topo` (%), `soil_texture`
//! - `modifiers`: `RF_NS`, `RF_Till`, `RF_CS`, `RF_AM`
//!
//! # Outputs
//!
//! - `EF_CT_P`, `EF_CT_PE`, `EF_Topo`, `EF` (kg N2O-N/kg N)

use crate::errors::{CressError, CressResult};
use crate::parameters::{GroupId, ParameterSet};
use crate::values::FloatValue;
use serde::{Deserialize, Serialize};

/// Output metric names as they appear in results and reports
pub const VAR_EF_CT_P: &str = "EF_CT_P";
pub const VAR_EF_CT_PE: &str = "EF_CT_PE";
pub const VAR_EF_TOPO: &str = "EF_Topo";
pub const VAR_EF: &str = "EF";

/// Slope and intercept of the Rochette et al. (2008) growing-season
/// emission factor relationship
const EF_SLOPE: FloatValue = 0.00558;
const EF_INTERCEPT: FloatValue = -7.7;

/// Reference soil texture factor the country-wide relationship was fitted
/// at, divided out before applying the site texture
const REFERENCE_TEXTURE: FloatValue = 0.645;

/// Validated input record for the emission factor kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactorInputs {
    /// Growing season precipitation
    /// unit: mm
    pub precipitation: FloatValue,
    /// Growing season potential evapotranspiration
    /// unit: mm
    pub evapotranspiration: FloatValue,
    /// Fraction of the field in topographic lows
    /// unit: %
    pub fr_topo: FloatValue,
    /// Soil texture factor (RF_TX)
    pub soil_texture: FloatValue,
    /// Nitrogen source modifier
    pub rf_ns: FloatValue,
    /// Tillage modifier
    pub rf_till: FloatValue,
    /// Cropping system modifier
    pub rf_cs: FloatValue,
    /// Application method modifier
    pub rf_am: FloatValue,
}

/// Wire names of the sweepable inputs
const SWEEPABLE_INPUTS: [&str; 8] = [
    "P", "PE", "FR_Topo", "soil_texture", "RF_NS", "RF_Till", "RF_CS", "RF_AM",
];

impl EmissionFactorInputs {
    /// Build the baseline record from a scenario's `climate_data` and
    /// `modifiers` groups
    pub fn from_set(set: &ParameterSet) -> CressResult<Self> {
        let climate = set.group(GroupId::ClimateData);
        let modifiers = set.group(GroupId::Modifiers);

        Ok(Self {
            precipitation: climate.baseline_number("P")?,
            evapotranspiration: climate.baseline_number("PE")?,
            fr_topo: climate.baseline_number("FR_Topo")?,
            soil_texture: climate.baseline_number("soil_texture")?,
            rf_ns: modifiers.baseline_number("RF_NS")?,
            rf_till: modifiers.baseline_number("RF_Till")?,
            rf_cs: modifiers.baseline_number("RF_CS")?,
            rf_am: modifiers.baseline_number("RF_AM")?,
        })
    }

    /// Test if `name` is a sweepable input of this kernel
    pub fn is_input(name: &str) -> bool {
        SWEEPABLE_INPUTS.contains(&name)
    }

    /// Copy this record with a single input replaced by wire name
    pub fn with_value(
        &self,
        group: GroupId,
        name: &str,
        value: FloatValue,
    ) -> CressResult<Self> {
        let mut record = *self;
        match name {
            "P" => record.precipitation = value,
            "PE" => record.evapotranspiration = value,
            "FR_Topo" => record.fr_topo = value,
            "soil_texture" => record.soil_texture = value,
            "RF_NS" => record.rf_ns = value,
            "RF_Till" => record.rf_till = value,
            "RF_CS" => record.rf_cs = value,
            "RF_AM" => record.rf_am = value,
            _ => {
                return Err(CressError::UnknownParameter {
                    group: group.to_string(),
                    name: name.to_string(),
                })
            }
        }
        Ok(record)
    }
}

/// Outputs of a single emission factor kernel evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactorOutputs {
    /// Precipitation based emission factor
    pub ef_ct_p: FloatValue,
    /// Evapotranspiration based emission factor
    pub ef_ct_pe: FloatValue,
    /// Topography adjusted emission factor
    pub ef_topo: FloatValue,
    /// Final emission factor after all modifiers
    /// unit: kg N2O-N/kg N
    pub ef: FloatValue,
}

impl EmissionFactorOutputs {
    /// Project the outputs as (metric name, value) pairs in report order
    pub fn metrics(&self) -> [(&'static str, FloatValue); 4] {
        [
            (VAR_EF_CT_P, self.ef_ct_p),
            (VAR_EF_CT_PE, self.ef_ct_pe),
            (VAR_EF_TOPO, self.ef_topo),
            (VAR_EF, self.ef),
        ]
    }
}

/// Direct N2O emission factor kernel
#[derive(Debug, Clone, Copy, Default)]
pub struct EmissionFactorKernel;

impl EmissionFactorKernel {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate the kernel for one input record
    pub fn evaluate(&self, inputs: &EmissionFactorInputs) -> EmissionFactorOutputs {
        let ef_ct_p = (EF_SLOPE * inputs.precipitation + EF_INTERCEPT).exp();
        let ef_ct_pe = (EF_SLOPE * inputs.evapotranspiration + EF_INTERCEPT).exp();

        // Wetter-than-potential sites are precipitation driven. Otherwise the
        // low-lying fraction of the field behaves like the wet case and the
        // rest like the dry case.
        let ef_topo = if inputs.precipitation / inputs.evapotranspiration > 1.0 {
            ef_ct_p
        } else if inputs.precipitation == inputs.evapotranspiration {
            ef_ct_pe
        } else {
            ef_ct_pe * (inputs.fr_topo / 100.0) + ef_ct_p * (1.0 - inputs.fr_topo / 100.0)
        };

        let ef = (ef_topo * inputs.soil_texture) * (1.0 / REFERENCE_TEXTURE)
            * inputs.rf_ns
            * inputs.rf_till
            * inputs.rf_cs
            * inputs.rf_am;

        EmissionFactorOutputs {
            ef_ct_p,
            ef_ct_pe,
            ef_topo,
            ef,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    fn quebec_inputs() -> EmissionFactorInputs {
        EmissionFactorInputs {
            precipitation: 652.0,
            evapotranspiration: 556.0,
            fr_topo: 11.71,
            soil_texture: 0.49,
            rf_ns: 0.84,
            rf_till: 1.0,
            rf_cs: 1.0,
            rf_am: 1.0,
        }
    }

    // ===== Emission Factor Tests =====

    #[test]
    fn test_baseline_emission_factors() {
        let outputs = EmissionFactorKernel::new().evaluate(&quebec_inputs());

        assert!(
            is_close!(outputs.ef_ct_p, 0.01721731, rel_tol = 1e-6),
            "Expected EF_CT_P near 0.01721731, got {}",
            outputs.ef_ct_p
        );
        assert!(
            is_close!(outputs.ef_ct_pe, 0.0100768, rel_tol = 1e-5),
            "Expected EF_CT_PE near 0.0100768, got {}",
            outputs.ef_ct_pe
        );
        // P > PE, so the topography adjustment keeps the precipitation value
        assert_eq!(outputs.ef_topo, outputs.ef_ct_p);
        assert!(
            is_close!(outputs.ef, 0.01098705, rel_tol = 1e-6),
            "Expected EF near 0.01098705, got {}",
            outputs.ef
        );
    }

    #[test]
    fn test_moisture_limited_site_blends_by_topography() {
        let mut inputs = quebec_inputs();
        inputs.precipitation = 500.0;
        let outputs = EmissionFactorKernel::new().evaluate(&inputs);

        let expected = outputs.ef_ct_pe * 0.1171 + outputs.ef_ct_p * (1.0 - 0.1171);
        assert!(
            is_close!(outputs.ef_topo, expected),
            "Expected blended EF_Topo {}, got {}",
            expected,
            outputs.ef_topo
        );
        assert!(outputs.ef_topo > outputs.ef_ct_p);
        assert!(outputs.ef_topo < outputs.ef_ct_pe);
    }

    #[test]
    fn test_balanced_site_uses_evapotranspiration_factor() {
        let mut inputs = quebec_inputs();
        inputs.precipitation = 556.0;
        let outputs = EmissionFactorKernel::new().evaluate(&inputs);
        assert_eq!(outputs.ef_topo, outputs.ef_ct_pe);
    }

    #[test]
    fn test_modifiers_scale_linearly() {
        let baseline = EmissionFactorKernel::new().evaluate(&quebec_inputs());

        let mut inputs = quebec_inputs();
        inputs.rf_till = 2.0;
        let tilled = EmissionFactorKernel::new().evaluate(&inputs);

        assert!(is_close!(tilled.ef, baseline.ef * 2.0));
        assert_eq!(tilled.ef_topo, baseline.ef_topo);
    }

    // ===== Record Construction Tests =====

    fn quebec_set() -> ParameterSet {
        serde_json::from_str(
            r#"{
                "farm_data": {},
                "crop_group_params": {},
                "crop_parameters": {},
                "climate_data": {
                    "P": [652], "PE": [556], "FR_Topo": [11.71],
                    "locations": [[-71.5189528, 46.4761852]],
                    "soil_texture": [0.49]
                },
                "modifiers": {"RF_AM": [1], "RF_CS": [1], "RF_NS": [0.84], "RF_Till": [1]}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_from_set_reads_baselines() {
        let inputs = EmissionFactorInputs::from_set(&quebec_set()).unwrap();
        assert_eq!(inputs, quebec_inputs());
    }

    #[test]
    fn test_from_set_missing_climate_key() {
        let mut set = quebec_set();
        set.climate_data.shift_remove("PE");
        let err = EmissionFactorInputs::from_set(&set).unwrap_err();
        assert!(
            matches!(&err, CressError::MissingParameter { group, name }
                if group == "climate_data" && name == "PE"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_from_set_rejects_text_modifier() {
        let mut set = quebec_set();
        set.modifiers
            .insert("RF_NS".to_string(), vec!["high".into()]);
        let err = EmissionFactorInputs::from_set(&set).unwrap_err();
        assert!(matches!(err, CressError::WrongType { .. }));
    }

    #[test]
    fn test_with_value_unknown_name() {
        let inputs = quebec_inputs();
        let err = inputs
            .with_value(GroupId::ClimateData, "locations", 1.0)
            .unwrap_err();
        assert!(matches!(err, CressError::UnknownParameter { .. }));
        assert!(!EmissionFactorInputs::is_input("locations"));
        assert!(EmissionFactorInputs::is_input("FR_Topo"));
    }
}
