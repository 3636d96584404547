//! Parameter groups for an analysis scenario.
//!
//! A scenario is described by five named groups of parameters. Each
//! parameter maps to a non-empty array of values where index 0 always holds
//! the baseline and any further entries are sampled perturbations.
//!
//! [`GroupView`] is the read side used by the aggregators. Its extractors
//! return errors naming the offending group and parameter so a failure in a
//! deeply nested validation still points at the scenario entry that caused
//! it.

use crate::errors::{CressError, CressResult};
use crate::values::{FloatValue, ParameterValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered parameter name to sample array mapping.
pub type ParameterMap = IndexMap<String, Vec<ParameterValue>>;

/// Identifier of one of the five scenario groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupId {
    FarmData,
    CropGroupParams,
    CropParameters,
    ClimateData,
    Modifiers,
}

impl GroupId {
    /// The group name as it appears in scenario files and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupId::FarmData => "farm_data",
            GroupId::CropGroupParams => "crop_group_params",
            GroupId::CropParameters => "crop_parameters",
            GroupId::ClimateData => "climate_data",
            GroupId::Modifiers => "modifiers",
        }
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full input scenario: five ordered parameter groups.
///
/// Groups omitted from a scenario file deserialise as empty, so a missing
/// parameter is reported by the validation that needs it rather than at
/// parse time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    pub farm_data: ParameterMap,
    pub crop_group_params: ParameterMap,
    pub crop_parameters: ParameterMap,
    pub climate_data: ParameterMap,
    pub modifiers: ParameterMap,
}

impl ParameterSet {
    /// Borrow one group as a [`GroupView`]
    pub fn group(&self, id: GroupId) -> GroupView<'_> {
        let map = match id {
            GroupId::FarmData => &self.farm_data,
            GroupId::CropGroupParams => &self.crop_group_params,
            GroupId::CropParameters => &self.crop_parameters,
            GroupId::ClimateData => &self.climate_data,
            GroupId::Modifiers => &self.modifiers,
        };
        GroupView { id, map }
    }

    /// Mutably borrow one group's map, e.g. for sampling expansion
    pub fn group_mut(&mut self, id: GroupId) -> &mut ParameterMap {
        match id {
            GroupId::FarmData => &mut self.farm_data,
            GroupId::CropGroupParams => &mut self.crop_group_params,
            GroupId::CropParameters => &mut self.crop_parameters,
            GroupId::ClimateData => &mut self.climate_data,
            GroupId::Modifiers => &mut self.modifiers,
        }
    }
}

/// Read access to a single group with error messages that name the group.
#[derive(Debug, Clone, Copy)]
pub struct GroupView<'a> {
    id: GroupId,
    map: &'a ParameterMap,
}

impl<'a> GroupView<'a> {
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Test if the group contains a parameter with the given name
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Iterate over (name, sample array) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&'a String, &'a Vec<ParameterValue>)> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Get the full sample array for a parameter
    ///
    /// Fails if the parameter is missing or its array is empty.
    pub fn values(&self, name: &str) -> CressResult<&'a [ParameterValue]> {
        let values = self
            .map
            .get(name)
            .ok_or_else(|| CressError::MissingParameter {
                group: self.id.to_string(),
                name: name.to_string(),
            })?;
        if values.is_empty() {
            return Err(CressError::EmptyParameter {
                group: self.id.to_string(),
                name: name.to_string(),
            });
        }
        Ok(values)
    }

    /// Get the full sample array as numbers
    pub fn numbers(&self, name: &str) -> CressResult<Vec<FloatValue>> {
        self.values(name)?
            .iter()
            .map(|value| self.require_number(name, value))
            .collect()
    }

    /// Get the baseline (index 0) value for a parameter
    pub fn baseline(&self, name: &str) -> CressResult<&'a ParameterValue> {
        Ok(&self.values(name)?[0])
    }

    /// Get the baseline value as a number
    pub fn baseline_number(&self, name: &str) -> CressResult<FloatValue> {
        let value = self.baseline(name)?;
        self.require_number(name, value)
    }

    /// Get the baseline value as text
    pub fn baseline_text(&self, name: &str) -> CressResult<&'a str> {
        let value = self.baseline(name)?;
        value.as_text().ok_or_else(|| CressError::WrongType {
            group: self.id.to_string(),
            name: name.to_string(),
            expected: "text".to_string(),
            actual: value.kind().to_string(),
        })
    }

    fn require_number(&self, name: &str, value: &ParameterValue) -> CressResult<FloatValue> {
        value.as_number().ok_or_else(|| CressError::WrongType {
            group: self.id.to_string(),
            name: name.to_string(),
            expected: "number".to_string(),
            actual: value.kind().to_string(),
        })
    }
}
