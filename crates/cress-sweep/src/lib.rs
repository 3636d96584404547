//! One-factor-at-a-time sensitivity analysis for crop residue emissions.
//!
//! The analysis runs as a chain of three aggregators. The residue and
//! emission factor aggregators sweep their own parameter groups
//! independently; the emission aggregator combines their results across the
//! two namespaces without recomputing either side.
//!
//! # Module Organisation
//!
//! - [`sampling`]: expansion of baseline scalars into sample arrays
//! - [`result`]: the farmer and scientific result shapes
//! - [`residue`]: sweep of the crop residue kernel
//! - [`emission_factor`]: sweep of the emission factor kernel
//! - [`emission`]: cross-namespace combination into emission curves

pub mod emission;
pub mod emission_factor;
pub mod residue;
pub mod result;
pub mod sampling;
mod sweep;

pub use emission::EmissionAggregator;
pub use emission_factor::EmissionFactorAggregator;
pub use residue::ResidueAggregator;
pub use result::{MetricCurves, SensitivityResult};
pub use sampling::{Distribution, SamplingSettings};
