//! Scalar parameter values.
//!
//! Every entry in a parameter group is a sequence of [`ParameterValue`]s.
//! Numeric values are sweep candidates; text values carry identity fields
//! such as the crop name or province; coordinate pairs carry geometry and
//! are never swept.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Floating point type used throughout the workspace.
pub type FloatValue = f64;

/// A single scalar payload within a parameter array.
///
/// Serialises untagged, so scenario files hold plain numbers, strings and
/// two-element arrays:
///
/// ```rust
/// use cress_core::values::ParameterValue;
///
/// let values: Vec<ParameterValue> = serde_json::from_str("[14.0, \"Soybean\", [-71.5, 46.5]]").unwrap();
/// assert_eq!(values[0].as_number(), Some(14.0));
/// assert_eq!(values[1].as_text(), Some("Soybean"));
/// assert!(values[2].is_coordinates());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// A numeric value (the only kind that can be sampled or swept)
    Number(FloatValue),
    /// A longitude/latitude pair
    Coordinates([FloatValue; 2]),
    /// A textual value such as a crop name or crop class
    Text(String),
}

impl ParameterValue {
    /// Name of the contained kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            ParameterValue::Number(_) => "number",
            ParameterValue::Coordinates(_) => "coordinates",
            ParameterValue::Text(_) => "text",
        }
    }

    /// Check if this is a numeric value
    pub fn is_number(&self) -> bool {
        matches!(self, ParameterValue::Number(_))
    }

    /// Check if this is a coordinate pair
    pub fn is_coordinates(&self) -> bool {
        matches!(self, ParameterValue::Coordinates(_))
    }

    /// Check if this is a textual value
    pub fn is_text(&self) -> bool {
        matches!(self, ParameterValue::Text(_))
    }

    /// Get the number if this is a Number variant
    pub fn as_number(&self) -> Option<FloatValue> {
        match self {
            ParameterValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the coordinate pair if this is a Coordinates variant
    pub fn as_coordinates(&self) -> Option<[FloatValue; 2]> {
        match self {
            ParameterValue::Coordinates(pair) => Some(*pair),
            _ => None,
        }
    }

    /// Get the text if this is a Text variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParameterValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<FloatValue> for ParameterValue {
    fn from(value: FloatValue) -> Self {
        ParameterValue::Number(value)
    }
}

impl From<[FloatValue; 2]> for ParameterValue {
    fn from(pair: [FloatValue; 2]) -> Self {
        ParameterValue::Coordinates(pair)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::Text(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::Text(value)
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Number(v) => write!(f, "{v}"),
            ParameterValue::Coordinates([lon, lat]) => write!(f, "[{lon}, {lat}]"),
            ParameterValue::Text(s) => write!(f, "{s}"),
        }
    }
}
