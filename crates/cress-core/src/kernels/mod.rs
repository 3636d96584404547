//! Agronomic computation kernels.
//!
//! Each kernel is a pure function from a flat, validated input record to a
//! fixed set of named output metrics. Validation happens when a record is
//! built from a scenario or perturbed for a sweep step; evaluation itself is
//! infallible, so a sweep can never fail halfway through a kernel call.

pub mod emission;
pub mod emission_factor;
pub mod residue;

pub use emission::{EmissionInputs, EmissionKernel, EmissionOutputs};
pub use emission_factor::{EmissionFactorInputs, EmissionFactorKernel, EmissionFactorOutputs};
pub use residue::{CropClass, ResidueInputs, ResidueKernel, ResidueOutputs};
