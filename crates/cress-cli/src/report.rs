//! Analysis report assembly.

use cress_core::parameters::ParameterSet;
use cress_sweep::SensitivityResult;
use serde::Serialize;

/// The complete output of one analysis run.
///
/// Serialises to a JSON object with four sections. `input_parameters`
/// echoes the scenario exactly as it was analysed, including any sample
/// arrays produced by expansion, so the curves in the result sections can
/// be read against the inputs that produced them.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub input_parameters: ParameterSet,
    pub crop_nitrogen_residue: SensitivityResult,
    pub emission_factors: SensitivityResult,
    pub total_direct_nitrogen_emission: SensitivityResult,
}

impl Report {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Scenario;
    use cress_core::mode::Mode;
    use cress_sweep::{
        EmissionAggregator, EmissionFactorAggregator, MetricCurves, ResidueAggregator,
    };
    use is_close::is_close;

    fn flat(metric: &str, value: f64) -> SensitivityResult {
        let mut curves = MetricCurves::new();
        curves.insert(metric.to_string(), vec![value]);
        SensitivityResult::Farmer(curves)
    }

    const QUEBEC_SCENARIO: &str = r#"
        [farm_data]
        area = [0.1409]
        "yield" = [2700.0]
        group = ["annual"]
        crop = ["Soybean"]
        province = ["Quebec"]

        [crop_group_params]
        carbon_concentration = [0.45]
        S_s = [100]
        S_r = [100]
        S_p = [2]

        [crop_parameters]
        moisture = [14]
        R_p = [0.304]
        R_s = [0.455]
        R_r = [0.146]
        R_e = [0.095]
        N_p = [67]
        N_s = [6]
        N_r = [10]
        N_e = [10]

        [climate_data]
        P = [652]
        PE = [556]
        FR_Topo = [11.71]
        locations = [[-71.5189528, 46.4761852]]
        soil_texture = [0.49]

        [modifiers]
        RF_AM = [1]
        RF_CS = [1]
        RF_NS = [0.84]
        RF_Till = [1]
    "#;

    #[test]
    fn report_has_four_sections_in_order() {
        let mut parameters = ParameterSet::default();
        parameters
            .farm_data
            .insert("area".to_string(), vec![0.1409.into()]);

        let report = Report {
            input_parameters: parameters,
            crop_nitrogen_residue: flat("n_crop_residue", 6.09),
            emission_factors: flat("EF", 0.011),
            total_direct_nitrogen_emission: flat("n_crop_direct", 0.067),
        };

        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["input_parameters"]["farm_data"]["area"][0], 0.1409);
        assert_eq!(value["crop_nitrogen_residue"]["n_crop_residue"][0], 6.09);
        assert_eq!(value["emission_factors"]["EF"][0], 0.011);
        assert_eq!(value["total_direct_nitrogen_emission"]["n_crop_direct"][0], 0.067);

        // Sections appear in reading order
        let positions: Vec<usize> = [
            "input_parameters",
            "crop_nitrogen_residue",
            "emission_factors",
            "total_direct_nitrogen_emission",
        ]
        .iter()
        .map(|section| json.find(section).unwrap())
        .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn farmer_report_numbers_from_scenario_text() {
        let scenario: Scenario = toml::from_str(QUEBEC_SCENARIO).unwrap();
        let parameters = scenario.parameters;

        let residue = ResidueAggregator::new(&parameters, Mode::Farmer)
            .unwrap()
            .analyze()
            .unwrap();
        let factors = EmissionFactorAggregator::new(&parameters, Mode::Farmer)
            .unwrap()
            .analyze()
            .unwrap();
        let emissions = EmissionAggregator::new(&factors, &residue, Mode::Farmer)
            .unwrap()
            .analyze()
            .unwrap();

        let report = Report {
            input_parameters: parameters,
            crop_nitrogen_residue: residue,
            emission_factors: factors,
            total_direct_nitrogen_emission: emissions,
        };
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        let n = value["crop_nitrogen_residue"]["n_crop_residue"][0]
            .as_f64()
            .unwrap();
        let ef = value["emission_factors"]["EF"][0].as_f64().unwrap();
        let n_direct = value["total_direct_nitrogen_emission"]["n_crop_direct"][0]
            .as_f64()
            .unwrap();
        let co2 = value["total_direct_nitrogen_emission"]["co2_crop_direct"][0]
            .as_f64()
            .unwrap();

        assert!(
            is_close!(n, 6.0895633, rel_tol = 1e-6),
            "Expected about 6.0895633 kg N, got {n}"
        );
        assert!(
            is_close!(n_direct, n * ef),
            "n_crop_direct should be the product of the two baselines, got {n_direct}"
        );
        assert!(
            is_close!(co2, 28.7028, rel_tol = 1e-4),
            "Expected about 28.7 kg CO2e, got {co2}"
        );
    }
}
