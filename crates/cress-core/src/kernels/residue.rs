//! Crop Residue Kernel
//!
//! Calculates the carbon and nitrogen returned to soil by crop residue for a
//! single field and season.
//!
//! # What This Kernel Does
//!
//! 1. Derives plant carbon from yield, moisture content and the crop's
//!    carbon concentration, then partitions it into product, straw, root and
//!    exudate pools using the crop's relative biomass allocation
//!    (following Janzen et al. 2003).
//!
//! 2. Converts the retained share of each carbon pool into above ground and
//!    below ground residue nitrogen using per-pool nitrogen contents, with
//!    pool membership decided by the crop class (annual, perennial, root,
//!    cover or silage).
//!
//! # Inputs
//!
//! - `farm_data`: `area` (ha), `yield` (kg/ha), `group` (crop class)
//! - `crop_group_params`: `carbon_concentration`, `S_p`, `S_s`, `S_r` (%)
//! - `crop_parameters`: `moisture` (%), `R_p`, `R_s`, `R_r`, `R_e`
//!   (relative biomass allocation), `N_p`, `N_s`, `N_r`, `N_e` (g N/kg)
//!
//! # Outputs
//!
//! - `C_p` (kg C/ha) - Carbon in agricultural product
//! - `above_ground_carbon_input`, `below_ground_carbon_input` (kg C/ha)
//! - `above_ground_residue_n`, `below_ground_residue_n` (kg N/ha)
//! - `n_crop_residue` (kg N) - Total residue nitrogen scaled by field area

use crate::errors::{CressError, CressResult};
use crate::parameters::{GroupId, ParameterSet};
use crate::values::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output metric names as they appear in results and reports
pub const VAR_C_P: &str = "C_p";
pub const VAR_ABOVE_GROUND_CARBON_INPUT: &str = "above_ground_carbon_input";
pub const VAR_BELOW_GROUND_CARBON_INPUT: &str = "below_ground_carbon_input";
pub const VAR_ABOVE_GROUND_RESIDUE_N: &str = "above_ground_residue_n";
pub const VAR_BELOW_GROUND_RESIDUE_N: &str = "below_ground_residue_n";
pub const VAR_N_CROP_RESIDUE: &str = "n_crop_residue";

/// Carbon fraction of crop dry matter, used to convert carbon pools back to
/// dry matter before applying nitrogen contents
const CARBON_FRACTION_DRY_MATTER: FloatValue = 0.45;

/// Nitrogen contents are given in g N per kg dry matter
const GRAMS_PER_KILOGRAM: FloatValue = 1000.0;

/// Below this S_p distance from 100% the yield boost term is skipped
const FULL_PRODUCT_RETENTION_EPS: FloatValue = 1e-5;

/// Below this magnitude R_p is treated as zero and the dependent pools vanish
const ZERO_ALLOCATION_EPS: FloatValue = 1e-6;

/// Crop classification controlling which residue pools stay in the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropClass {
    Annual,
    Perennial,
    Root,
    Cover,
    Silage,
}

impl CropClass {
    /// Parse a crop class name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "annual" => Some(CropClass::Annual),
            "perennial" => Some(CropClass::Perennial),
            "root" => Some(CropClass::Root),
            "cover" => Some(CropClass::Cover),
            "silage" => Some(CropClass::Silage),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CropClass::Annual => "annual",
            CropClass::Perennial => "perennial",
            CropClass::Root => "root",
            CropClass::Cover => "cover",
            CropClass::Silage => "silage",
        }
    }
}

impl fmt::Display for CropClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated input record for the residue kernel.
///
/// Built from the baseline (index 0) of a scenario's `farm_data`,
/// `crop_group_params` and `crop_parameters` groups. Sweeps derive perturbed
/// records from the baseline with [`ResidueInputs::with_value`], which
/// re-validates so out-of-domain sampled values are caught before any
/// evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidueInputs {
    /// Field area
    /// unit: ha
    pub area: FloatValue,
    /// Harvested yield
    /// unit: kg/ha
    pub crop_yield: FloatValue,
    /// Crop classification
    pub crop_class: CropClass,
    /// Carbon concentration of plant dry matter
    /// unit: kg C/kg
    pub carbon_concentration: FloatValue,
    /// Share of product biomass left in the field
    /// unit: %
    pub s_p: FloatValue,
    /// Share of straw biomass left in the field
    /// unit: %
    pub s_s: FloatValue,
    /// Share of root biomass left in the field
    /// unit: %
    pub s_r: FloatValue,
    /// Moisture content of the harvested product
    /// unit: %
    pub moisture: FloatValue,
    /// Relative biomass allocation to product
    pub r_p: FloatValue,
    /// Relative biomass allocation to straw
    pub r_s: FloatValue,
    /// Relative biomass allocation to roots
    pub r_r: FloatValue,
    /// Relative biomass allocation to root exudates
    pub r_e: FloatValue,
    /// Nitrogen content of product
    /// unit: g N/kg
    pub n_p: FloatValue,
    /// Nitrogen content of straw
    /// unit: g N/kg
    pub n_s: FloatValue,
    /// Nitrogen content of roots
    /// unit: g N/kg
    pub n_r: FloatValue,
    /// Nitrogen content of exudates
    /// unit: g N/kg
    pub n_e: FloatValue,
}

/// Wire names of the sweepable inputs, i.e. everything except the fixed
/// `farm_data` fields
const SWEEPABLE_INPUTS: [&str; 13] = [
    "carbon_concentration",
    "S_p",
    "S_s",
    "S_r",
    "moisture",
    "R_p",
    "R_s",
    "R_r",
    "R_e",
    "N_p",
    "N_s",
    "N_r",
    "N_e",
];

impl ResidueInputs {
    /// Build the baseline record from a scenario, validating presence, type
    /// and domain of every required parameter
    pub fn from_set(set: &ParameterSet) -> CressResult<Self> {
        let farm = set.group(GroupId::FarmData);
        let group_params = set.group(GroupId::CropGroupParams);
        let crop = set.group(GroupId::CropParameters);

        let class_name = farm.baseline_text("group")?;
        let crop_class =
            CropClass::from_name(class_name).ok_or_else(|| CressError::InvalidValue {
                group: GroupId::FarmData.to_string(),
                name: "group".to_string(),
                reason: format!(
                    "unknown crop class '{class_name}'. Expected one of annual, perennial, root, cover, silage"
                ),
            })?;

        let record = Self {
            area: farm.baseline_number("area")?,
            crop_yield: farm.baseline_number("yield")?,
            crop_class,
            carbon_concentration: group_params.baseline_number("carbon_concentration")?,
            s_p: group_params.baseline_number("S_p")?,
            s_s: group_params.baseline_number("S_s")?,
            s_r: group_params.baseline_number("S_r")?,
            moisture: crop.baseline_number("moisture")?,
            r_p: crop.baseline_number("R_p")?,
            r_s: crop.baseline_number("R_s")?,
            r_r: crop.baseline_number("R_r")?,
            r_e: crop.baseline_number("R_e")?,
            n_p: crop.baseline_number("N_p")?,
            n_s: crop.baseline_number("N_s")?,
            n_r: crop.baseline_number("N_r")?,
            n_e: crop.baseline_number("N_e")?,
        };
        record.validate()?;
        Ok(record)
    }

    /// Test if `name` is a sweepable input of this kernel
    pub fn is_input(name: &str) -> bool {
        SWEEPABLE_INPUTS.contains(&name)
    }

    /// Copy this record with a single input replaced by wire name,
    /// re-validating the result
    ///
    /// The group is only used to attribute errors to the right scenario
    /// entry.
    pub fn with_value(
        &self,
        group: GroupId,
        name: &str,
        value: FloatValue,
    ) -> CressResult<Self> {
        let mut record = *self;
        match name {
            "carbon_concentration" => record.carbon_concentration = value,
            "S_p" => record.s_p = value,
            "S_s" => record.s_s = value,
            "S_r" => record.s_r = value,
            "moisture" => record.moisture = value,
            "R_p" => record.r_p = value,
            "R_s" => record.r_s = value,
            "R_r" => record.r_r = value,
            "R_e" => record.r_e = value,
            "N_p" => record.n_p = value,
            "N_s" => record.n_s = value,
            "N_r" => record.n_r = value,
            "N_e" => record.n_e = value,
            _ => {
                return Err(CressError::UnknownParameter {
                    group: group.to_string(),
                    name: name.to_string(),
                })
            }
        }
        record.validate()?;
        Ok(record)
    }

    /// Check the domain constraints
    pub fn validate(&self) -> CressResult<()> {
        if self.area < 0.0 {
            return Err(self.domain_error(GroupId::FarmData, "area", "must be non-negative"));
        }
        if self.crop_yield < 0.0 {
            return Err(self.domain_error(GroupId::FarmData, "yield", "must be non-negative"));
        }
        if !(0.0..=100.0).contains(&self.moisture) {
            return Err(self.domain_error(
                GroupId::CropParameters,
                "moisture",
                "must be between 0 and 100",
            ));
        }
        Ok(())
    }

    fn domain_error(&self, group: GroupId, name: &str, reason: &str) -> CressError {
        CressError::InvalidValue {
            group: group.to_string(),
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Outputs of a single residue kernel evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidueOutputs {
    /// Carbon in agricultural product
    /// unit: kg C/ha
    pub c_p: FloatValue,
    /// Carbon input to soil from above ground pools
    /// unit: kg C/ha
    pub above_ground_carbon_input: FloatValue,
    /// Carbon input to soil from below ground pools
    /// unit: kg C/ha
    pub below_ground_carbon_input: FloatValue,
    /// Above ground residue nitrogen
    /// unit: kg N/ha
    pub above_ground_residue_n: FloatValue,
    /// Below ground residue nitrogen
    /// unit: kg N/ha
    pub below_ground_residue_n: FloatValue,
    /// Total residue nitrogen for the field
    /// unit: kg N
    pub n_crop_residue: FloatValue,
}

impl ResidueOutputs {
    /// Project the outputs as (metric name, value) pairs in report order
    pub fn metrics(&self) -> [(&'static str, FloatValue); 6] {
        [
            (VAR_C_P, self.c_p),
            (VAR_ABOVE_GROUND_CARBON_INPUT, self.above_ground_carbon_input),
            (VAR_BELOW_GROUND_CARBON_INPUT, self.below_ground_carbon_input),
            (VAR_ABOVE_GROUND_RESIDUE_N, self.above_ground_residue_n),
            (VAR_BELOW_GROUND_RESIDUE_N, self.below_ground_residue_n),
            (VAR_N_CROP_RESIDUE, self.n_crop_residue),
        ]
    }
}

/// Crop residue carbon and nitrogen kernel
#[derive(Debug, Clone, Copy, Default)]
pub struct ResidueKernel;

impl ResidueKernel {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate the kernel for one validated input record
    pub fn evaluate(&self, inputs: &ResidueInputs) -> ResidueOutputs {
        let dry_matter_fraction = 1.0 - inputs.moisture / 100.0;

        // Product carbon. When the whole product stays in the field the
        // yield already includes it, otherwise the retained share is added
        // on top of the harvested yield.
        let c_p = if (inputs.s_p - 100.0).abs() < FULL_PRODUCT_RETENTION_EPS {
            inputs.crop_yield * dry_matter_fraction * inputs.carbon_concentration
        } else {
            (inputs.crop_yield + inputs.crop_yield * inputs.s_p / 100.0)
                * dry_matter_fraction
                * inputs.carbon_concentration
        };
        let c_p_to_soil = c_p * inputs.s_p / 100.0;

        // Straw, root and exudate carbon relative to the product pool
        let (c_s, c_r, c_e) = if inputs.r_p.abs() < ZERO_ALLOCATION_EPS {
            (0.0, 0.0, 0.0)
        } else {
            (
                c_p * (inputs.r_s / inputs.r_p) * (inputs.s_s / 100.0),
                c_p * (inputs.r_r / inputs.r_p) * (inputs.s_r / 100.0),
                c_p * (inputs.r_e / inputs.r_p),
            )
        };

        // Per-pool nitrogen via dry matter
        let grain_n =
            (c_p_to_soil / CARBON_FRACTION_DRY_MATTER) * (inputs.n_p / GRAMS_PER_KILOGRAM);
        let straw_n = (c_s / CARBON_FRACTION_DRY_MATTER) * (inputs.n_s / GRAMS_PER_KILOGRAM);
        let root_n = (c_r / CARBON_FRACTION_DRY_MATTER) * (inputs.n_r / GRAMS_PER_KILOGRAM);
        let exudate_n = (c_e / CARBON_FRACTION_DRY_MATTER) * (inputs.n_e / GRAMS_PER_KILOGRAM);

        let above_ground_residue_n = match inputs.crop_class {
            CropClass::Annual | CropClass::Perennial => grain_n + straw_n,
            CropClass::Root => straw_n,
            CropClass::Cover | CropClass::Silage => grain_n,
        };
        let below_ground_residue_n = match inputs.crop_class {
            CropClass::Annual => root_n + exudate_n,
            CropClass::Perennial => root_n * (inputs.s_r / 100.0) + exudate_n,
            CropClass::Root => grain_n + exudate_n,
            CropClass::Cover | CropClass::Silage => root_n + exudate_n,
        };

        let above_ground_carbon_input = match inputs.crop_class {
            CropClass::Root => c_s,
            _ => c_p_to_soil + c_s,
        };
        let below_ground_carbon_input = match inputs.crop_class {
            CropClass::Root => c_p_to_soil + c_e,
            _ => c_r + c_e,
        };

        ResidueOutputs {
            c_p,
            above_ground_carbon_input,
            below_ground_carbon_input,
            above_ground_residue_n,
            below_ground_residue_n,
            n_crop_residue: (above_ground_residue_n + below_ground_residue_n) * inputs.area,
        }
    }
}
