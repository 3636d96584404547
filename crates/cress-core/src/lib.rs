//! Core building blocks for crop residue emission estimation.
//!
//! # Module Organisation
//!
//! - [`values`]: scalar parameter values and the shared float alias
//! - [`parameters`]: the five scenario groups and typed group access
//! - [`mode`]: farmer and scientific execution modes
//! - [`kernels`]: the residue, emission factor and emission calculations
//! - [`errors`]: the shared error type

pub mod errors;
pub mod kernels;
pub mod mode;
pub mod parameters;
pub mod values;

pub use errors::{CressError, CressResult};
pub use mode::Mode;
pub use parameters::{GroupId, GroupView, ParameterMap, ParameterSet};
pub use values::{FloatValue, ParameterValue};
