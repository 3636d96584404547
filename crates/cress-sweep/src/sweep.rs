//! Shared one-factor-at-a-time sweep machinery.
//!
//! Every aggregator follows the same discipline: resolve the execution mode
//! from the lengths of its governed parameter arrays, derive a baseline
//! record from index 0, then sweep each multi-valued parameter on its own
//! while everything else stays pinned at baseline. This module holds the
//! pieces of that discipline that do not depend on a particular kernel.

use crate::result::MetricCurves;
use cress_core::errors::{CressError, CressResult};
use cress_core::mode::Mode;
use cress_core::parameters::{GroupId, ParameterSet};
use cress_core::values::FloatValue;

/// One parameter selected for sweeping.
///
/// `values` is the full sample array including the baseline at index 0, so
/// evaluating every entry reproduces the baseline output at curve index 0.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SweepVariable {
    pub group: GroupId,
    pub name: String,
    pub values: Vec<FloatValue>,
}

/// Resolve the execution mode from the governed groups' array lengths.
///
/// A scientific request with nothing to sweep downgrades to farmer with a
/// warning. Farmer mode then requires every governed array to hold exactly
/// one value. `context` names the calculation in the downgrade warning.
pub(crate) fn resolve_mode(
    requested: Mode,
    set: &ParameterSet,
    governed: &[GroupId],
    context: &str,
) -> CressResult<Mode> {
    let mut resolved = requested;

    if requested == Mode::Scientific {
        let mut any_multi = false;
        for &id in governed {
            for (name, values) in set.group(id).iter() {
                if values.is_empty() {
                    return Err(CressError::EmptyParameter {
                        group: id.to_string(),
                        name: name.clone(),
                    });
                }
                if values.len() > 1 {
                    any_multi = true;
                }
            }
        }
        if !any_multi {
            log::warn!(
                "All {context} parameters have only one value. Switching to farmer mode"
            );
            resolved = Mode::Farmer;
        }
    }

    if resolved == Mode::Farmer {
        for &id in governed {
            for (name, values) in set.group(id).iter() {
                if values.is_empty() {
                    return Err(CressError::EmptyParameter {
                        group: id.to_string(),
                        name: name.clone(),
                    });
                }
                if values.len() != 1 {
                    return Err(CressError::WrongLength {
                        group: id.to_string(),
                        name: name.clone(),
                        expected: 1,
                        actual: values.len(),
                        mode: Mode::Farmer,
                    });
                }
            }
        }
    }

    Ok(resolved)
}

/// Collect the sweep variables from the governed groups.
///
/// A parameter is swept when it has more than one value and a numeric
/// baseline. Geometry and text parameters are never swept. Mixed arrays
/// with a numeric baseline but non-numeric entries fail here, before any
/// kernel runs.
pub(crate) fn collect_sweeps(
    set: &ParameterSet,
    governed: &[GroupId],
) -> CressResult<Vec<SweepVariable>> {
    let mut sweeps = Vec::new();
    for &id in governed {
        let view = set.group(id);
        for (name, values) in view.iter() {
            if values.len() > 1 && values[0].is_number() {
                sweeps.push(SweepVariable {
                    group: id,
                    name: name.clone(),
                    values: view.numbers(name)?,
                });
            }
        }
    }
    Ok(sweeps)
}

/// Accumulate rows of (metric, value) pairs into per-metric curves.
///
/// Row order becomes curve index order, so feeding evaluations in sample
/// order keeps every curve aligned with the swept variable's array.
pub(crate) fn collect_curves<R>(rows: impl IntoIterator<Item = R>) -> MetricCurves
where
    R: IntoIterator<Item = (&'static str, FloatValue)>,
{
    let mut curves = MetricCurves::new();
    for row in rows {
        for (metric, value) in row {
            curves.entry(metric.to_string()).or_default().push(value);
        }
    }
    curves
}
