//! Parameter sampling for scientific mode.
//!
//! Expands single-valued numeric parameters into sample arrays before a
//! sweep: index 0 keeps the scenario's baseline and the following entries
//! are random draws. By default a parameter is drawn uniformly within 25%
//! of its baseline; individual parameters can override that with an
//! explicit uniform, normal or lognormal distribution.
//!
//! Only `crop_group_params`, `crop_parameters` and `modifiers` are sampled.
//! `farm_data` identifies the field and `climate_data` comes from upstream
//! sources with its own uncertainty treatment, so both pass through
//! unchanged. Parameters that already carry more than one value are left
//! alone as well, which lets a scenario file pin explicit sweep arrays next
//! to sampled ones.

use cress_core::errors::{CressError, CressResult};
use cress_core::parameters::{GroupId, ParameterSet};
use cress_core::values::{FloatValue, ParameterValue};
use indexmap::IndexMap;
use rand::Rng;
use rand_distr::Distribution as _;
use serde::{Deserialize, Serialize};

/// Groups whose parameters are expanded by sampling
pub const SAMPLED_GROUPS: [GroupId; 3] = [
    GroupId::CropGroupParams,
    GroupId::CropParameters,
    GroupId::Modifiers,
];

/// Half-width of the default uniform draw, relative to the baseline
const DEFAULT_SPREAD: FloatValue = 0.25;

const DEFAULT_NUM_SAMPLES: usize = 10;

fn default_num_samples() -> usize {
    DEFAULT_NUM_SAMPLES
}

/// A sampling distribution for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "distribution", rename_all = "lowercase")]
pub enum Distribution {
    Uniform { low: FloatValue, high: FloatValue },
    Normal { mean: FloatValue, sd: FloatValue },
    LogNormal { mean: FloatValue, sigma: FloatValue },
}

impl Distribution {
    /// Check the distribution parameters, naming the offending parameter
    pub fn validate(&self, name: &str) -> CressResult<()> {
        let reason = match self {
            Distribution::Uniform { low, high } if low >= high => {
                Some("low must be less than high".to_string())
            }
            Distribution::Normal { sd, .. } if *sd <= 0.0 => {
                Some("standard deviation must be positive".to_string())
            }
            Distribution::LogNormal { sigma, .. } if *sigma <= 0.0 => {
                Some("sigma must be positive".to_string())
            }
            _ => None,
        };
        match reason {
            Some(reason) => Err(CressError::Sampling {
                name: name.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Draw one value
    fn sample<R: Rng>(&self, name: &str, rng: &mut R) -> CressResult<FloatValue> {
        match self {
            Distribution::Uniform { low, high } => Ok(rng.gen_range(*low..*high)),
            Distribution::Normal { mean, sd } => {
                let normal =
                    rand_distr::Normal::new(*mean, *sd).map_err(|e| CressError::Sampling {
                        name: name.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(normal.sample(rng))
            }
            Distribution::LogNormal { mean, sigma } => {
                let lognormal = rand_distr::LogNormal::new(*mean, *sigma).map_err(|e| {
                    CressError::Sampling {
                        name: name.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(lognormal.sample(rng))
            }
        }
    }
}

/// Draw uniformly within the default spread around the baseline.
///
/// The bounds are ordered so negative baselines sample the mirrored range,
/// and a zero baseline stays at zero.
fn default_draw<R: Rng>(baseline: FloatValue, rng: &mut R) -> FloatValue {
    let a = baseline * (1.0 - DEFAULT_SPREAD);
    let b = baseline * (1.0 + DEFAULT_SPREAD);
    if a == b {
        return baseline;
    }
    rng.gen_range(a.min(b)..a.max(b))
}

/// How many samples to draw and which parameters override the default
/// distribution, per group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingSettings {
    /// Number of draws added after the baseline
    #[serde(default = "default_num_samples")]
    pub num_samples: usize,
    #[serde(default)]
    pub crop_group_params: IndexMap<String, Distribution>,
    #[serde(default)]
    pub crop_parameters: IndexMap<String, Distribution>,
    #[serde(default)]
    pub modifiers: IndexMap<String, Distribution>,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            num_samples: DEFAULT_NUM_SAMPLES,
            crop_group_params: IndexMap::new(),
            crop_parameters: IndexMap::new(),
            modifiers: IndexMap::new(),
        }
    }
}

impl SamplingSettings {
    fn overrides(&self, id: GroupId) -> Option<&IndexMap<String, Distribution>> {
        match id {
            GroupId::CropGroupParams => Some(&self.crop_group_params),
            GroupId::CropParameters => Some(&self.crop_parameters),
            GroupId::Modifiers => Some(&self.modifiers),
            GroupId::FarmData | GroupId::ClimateData => None,
        }
    }

    /// Check the settings against a scenario.
    ///
    /// Every override must name a numeric parameter of its group and carry
    /// valid distribution parameters, and at least one sample must be
    /// requested.
    pub fn validate(&self, set: &ParameterSet) -> CressResult<()> {
        if self.num_samples == 0 {
            return Err(CressError::Sampling {
                name: "num_samples".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        for id in SAMPLED_GROUPS {
            let Some(overrides) = self.overrides(id) else {
                continue;
            };
            let view = set.group(id);
            for (name, distribution) in overrides {
                distribution.validate(name)?;
                let known = view.contains(name)
                    && view.values(name)?.first().is_some_and(|v| v.is_number());
                if !known {
                    return Err(CressError::Sampling {
                        name: name.clone(),
                        reason: format!("'{name}' is not a numeric parameter of group '{id}'"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Expand every single-valued numeric parameter of the sampled groups
    /// into a sample array with the baseline at index 0.
    pub fn expand<R: Rng>(&self, set: &mut ParameterSet, rng: &mut R) -> CressResult<()> {
        self.validate(set)?;

        for id in SAMPLED_GROUPS {
            let names: Vec<String> = set.group(id).iter().map(|(name, _)| name.clone()).collect();
            for name in names {
                let baseline = {
                    let values = set.group(id).values(&name)?;
                    if values.len() == 1 {
                        values[0].as_number()
                    } else {
                        None
                    }
                };
                let Some(baseline) = baseline else {
                    continue;
                };

                let distribution = self.overrides(id).and_then(|map| map.get(&name)).copied();
                let mut samples = Vec::with_capacity(self.num_samples + 1);
                samples.push(ParameterValue::from(baseline));
                for _ in 0..self.num_samples {
                    let drawn = match &distribution {
                        Some(d) => d.sample(&name, rng)?,
                        None => default_draw(baseline, rng),
                    };
                    samples.push(ParameterValue::from(drawn));
                }
                set.group_mut(id).insert(name, samples);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn demo_set() -> ParameterSet {
        let mut set = ParameterSet::default();
        set.farm_data
            .insert("yield".to_string(), vec![2700.0.into()]);
        set.crop_group_params
            .insert("S_p".to_string(), vec![2.0.into()]);
        set.crop_parameters
            .insert("moisture".to_string(), vec![14.0.into()]);
        set.crop_parameters
            .insert("R_p".to_string(), vec![0.304.into()]);
        set.modifiers
            .insert("RF_Till".to_string(), vec![1.0.into()]);
        set.climate_data.insert("P".to_string(), vec![652.0.into()]);
        set
    }

    // ===== Expansion Tests =====

    #[test]
    fn test_expansion_keeps_baseline_at_index_zero() {
        let mut set = demo_set();
        let settings = SamplingSettings::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        settings.expand(&mut set, &mut rng).unwrap();

        for id in SAMPLED_GROUPS {
            for (name, values) in set.group(id).iter() {
                assert_eq!(
                    values.len(),
                    11,
                    "{name} should hold the baseline plus 10 samples"
                );
            }
        }
        assert_eq!(set.crop_parameters["moisture"][0].as_number(), Some(14.0));

        // Unsampled groups pass through unchanged
        assert_eq!(set.farm_data["yield"].len(), 1);
        assert_eq!(set.climate_data["P"].len(), 1);
    }

    #[test]
    fn test_default_draws_stay_within_spread() {
        let mut set = demo_set();
        let settings = SamplingSettings {
            num_samples: 200,
            ..SamplingSettings::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        settings.expand(&mut set, &mut rng).unwrap();

        for value in &set.crop_parameters["moisture"] {
            let v = value.as_number().unwrap();
            assert!(
                (10.5..=17.5).contains(&v),
                "draw {v} outside 25% of the baseline"
            );
        }
    }

    #[test]
    fn test_multi_valued_parameters_are_left_alone() {
        let mut set = demo_set();
        set.crop_parameters.insert(
            "moisture".to_string(),
            vec![14.0.into(), 15.0.into(), 16.0.into()],
        );
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        SamplingSettings::default()
            .expand(&mut set, &mut rng)
            .unwrap();
        assert_eq!(set.crop_parameters["moisture"].len(), 3);
    }

    #[test]
    fn test_text_parameters_are_left_alone() {
        let mut set = demo_set();
        set.modifiers
            .insert("label".to_string(), vec![ParameterValue::from("till")]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        SamplingSettings::default()
            .expand(&mut set, &mut rng)
            .unwrap();
        assert_eq!(set.modifiers["label"].len(), 1);
    }

    #[test]
    fn test_empty_array_is_fatal() {
        let mut set = demo_set();
        set.crop_group_params.insert("S_s".to_string(), vec![]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let err = SamplingSettings::default()
            .expand(&mut set, &mut rng)
            .unwrap_err();
        assert!(matches!(err, CressError::EmptyParameter { .. }));
    }

    #[test]
    fn test_seeded_expansion_is_reproducible() {
        let settings = SamplingSettings::default();

        let mut first = demo_set();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        settings.expand(&mut first, &mut rng).unwrap();

        let mut second = demo_set();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        settings.expand(&mut second, &mut rng).unwrap();

        assert_eq!(first, second);

        let mut third = demo_set();
        let mut rng = ChaCha8Rng::seed_from_u64(43);
        settings.expand(&mut third, &mut rng).unwrap();
        assert_ne!(first, third);
    }

    // ===== Override Tests =====

    #[test]
    fn test_override_distribution_is_used() {
        let mut settings = SamplingSettings::default();
        settings.crop_parameters.insert(
            "moisture".to_string(),
            Distribution::Normal {
                mean: 100.0,
                sd: 0.1,
            },
        );

        let mut set = demo_set();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        settings.expand(&mut set, &mut rng).unwrap();

        let values = &set.crop_parameters["moisture"];
        assert_eq!(values[0].as_number(), Some(14.0));
        for value in values.iter().skip(1) {
            let v = value.as_number().unwrap();
            assert!(v > 99.0 && v < 101.0, "draw {v} not from the override");
        }
        // Parameters without an override still use the default spread
        for value in set.crop_parameters["R_p"].iter().skip(1) {
            let v = value.as_number().unwrap();
            assert!((0.304 * 0.75..=0.304 * 1.25).contains(&v));
        }
    }

    #[test]
    fn test_lognormal_draws_are_positive() {
        let mut settings = SamplingSettings::default();
        settings.modifiers.insert(
            "RF_Till".to_string(),
            Distribution::LogNormal {
                mean: 0.0,
                sigma: 0.25,
            },
        );
        let mut set = demo_set();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        settings.expand(&mut set, &mut rng).unwrap();

        for value in set.modifiers["RF_Till"].iter().skip(1) {
            assert!(value.as_number().unwrap() > 0.0);
        }
    }

    // ===== Validation Tests =====

    #[test]
    fn test_zero_samples_is_fatal() {
        let settings = SamplingSettings {
            num_samples: 0,
            ..SamplingSettings::default()
        };
        let err = settings.validate(&demo_set()).unwrap_err();
        assert!(
            matches!(&err, CressError::Sampling { name, .. } if name == "num_samples"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_unknown_override_parameter_is_fatal() {
        let mut settings = SamplingSettings::default();
        settings.crop_parameters.insert(
            "humidity".to_string(),
            Distribution::Uniform {
                low: 0.0,
                high: 1.0,
            },
        );
        let err = settings.validate(&demo_set()).unwrap_err();
        assert!(
            matches!(&err, CressError::Sampling { name, .. } if name == "humidity"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_invalid_distribution_parameters_are_fatal() {
        let cases = [
            Distribution::Uniform {
                low: 1.0,
                high: 1.0,
            },
            Distribution::Normal {
                mean: 10.0,
                sd: 0.0,
            },
            Distribution::LogNormal {
                mean: 0.0,
                sigma: -0.1,
            },
        ];
        for case in cases {
            let mut settings = SamplingSettings::default();
            settings.crop_parameters.insert("moisture".to_string(), case);
            assert!(
                settings.validate(&demo_set()).is_err(),
                "{case:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_settings_deserialise_from_toml() {
        let settings: SamplingSettings = toml::from_str(
            r#"
            num_samples = 5

            [crop_parameters]
            moisture = { distribution = "normal", mean = 14.0, sd = 0.5 }
            R_p = { distribution = "uniform", low = 0.25, high = 0.35 }

            [modifiers]
            RF_Till = { distribution = "lognormal", mean = 0.0, sigma = 0.2 }
            "#,
        )
        .unwrap();

        assert_eq!(settings.num_samples, 5);
        assert_eq!(
            settings.crop_parameters["moisture"],
            Distribution::Normal {
                mean: 14.0,
                sd: 0.5
            }
        );
        assert_eq!(
            settings.modifiers["RF_Till"],
            Distribution::LogNormal {
                mean: 0.0,
                sigma: 0.2
            }
        );
    }
}
