//! Hypothesis tests over a synthetic or observed dataset
//!
//! Three independent checks:
//! - temporal precedence: does information fidelity cross its critical
//!   threshold before damage crosses its own?
//! - Granger causality: do lags of information fidelity improve an
//!   autoregression of damage?
//! - intervention response: how do the signals shift around a restoration
//!   event?

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dataset::{Dataset, Scenario, ScenarioSeries};
use crate::stats::{self, GrangerTest, StatsError};
use crate::InfoThermoError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Information fidelity is critical at or below this level
    pub info_threshold: f64,
    /// Damage is critical at or above this level
    pub damage_threshold: f64,
    pub max_lag: usize,
    pub significance_level: f64,
    /// Half-width of the age window compared around the intervention
    pub intervention_window: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            info_threshold: 0.65,
            damage_threshold: 0.45,
            max_lag: 3,
            significance_level: 0.05,
            intervention_window: 1.0,
        }
    }
}

impl ValidationConfig {
    pub fn validate(&self) -> Result<(), InfoThermoError> {
        if !(self.info_threshold.is_finite() && self.damage_threshold.is_finite()) {
            return Err(InfoThermoError::InvalidConfig(
                "thresholds must be finite".to_string(),
            ));
        }
        if self.max_lag == 0 {
            return Err(InfoThermoError::InvalidConfig(
                "max_lag must be greater than zero".to_string(),
            ));
        }
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(InfoThermoError::InvalidConfig(
                "significance_level must be in (0, 1)".to_string(),
            ));
        }
        if !(self.intervention_window.is_finite() && self.intervention_window > 0.0) {
            return Err(InfoThermoError::InvalidConfig(
                "intervention_window must be finite and > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossingDirection {
    /// First sample with `y >= threshold`
    Above,
    /// First sample with `y <= threshold`
    Below,
}

/// First `x` at which `y` reaches `threshold` in `direction`, linearly
/// interpolated against the previous sample. `None` if it never does.
pub fn find_crossing_point(
    x: &[f64],
    y: &[f64],
    threshold: f64,
    direction: CrossingDirection,
) -> Option<f64> {
    let n = x.len().min(y.len());
    let idx = y[..n].iter().position(|&value| match direction {
        CrossingDirection::Above => value >= threshold,
        CrossingDirection::Below => value <= threshold,
    })?;

    if idx == 0 {
        return Some(x[0]);
    }

    let (x1, x2) = (x[idx - 1], x[idx]);
    let (y1, y2) = (y[idx - 1], y[idx]);
    if y2 == y1 {
        return Some(x2);
    }

    let frac = (threshold - y1) / (y2 - y1);
    let crossing = x1 + frac * (x2 - x1);
    if crossing.is_finite() {
        Some(crossing)
    } else {
        Some(x2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalPrecedenceResult {
    pub precedes: bool,
    pub info_crossing_age: Option<f64>,
    pub damage_crossing_age: Option<f64>,
    /// damage crossing minus info crossing; negative when damage comes first
    pub time_difference: Option<f64>,
    pub info_threshold: f64,
    pub damage_threshold: f64,
}

/// Granger result for one direction, either computed or degraded to the
/// conservative "p = 1, not significant" default.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GrangerOutcome {
    Computed {
        p_value: f64,
        best_lag: usize,
        f_statistic: f64,
    },
    Degraded {
        reason: StatsError,
    },
}

impl GrangerOutcome {
    fn from_test(result: Result<GrangerTest, StatsError>, direction: &str) -> Self {
        match result {
            Ok(test) => {
                debug!(
                    direction,
                    p_value = test.p_value,
                    best_lag = test.best_lag,
                    "granger test computed"
                );
                GrangerOutcome::Computed {
                    p_value: test.p_value,
                    best_lag: test.best_lag,
                    f_statistic: test.f_statistic,
                }
            }
            Err(reason) => {
                warn!(direction, %reason, "granger test degraded to p = 1.0");
                GrangerOutcome::Degraded { reason }
            }
        }
    }

    pub fn p_value(&self) -> f64 {
        match self {
            GrangerOutcome::Computed { p_value, .. } => *p_value,
            GrangerOutcome::Degraded { .. } => 1.0,
        }
    }

    pub fn is_significant(&self, significance_level: f64) -> bool {
        self.p_value() < significance_level
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, GrangerOutcome::Degraded { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrangerCausalityResult {
    pub info_granger_causes_damage: bool,
    pub damage_autocorrelation_significant: bool,
    pub info_to_damage_p_value: f64,
    pub damage_to_damage_p_value: f64,
    pub r2_info_prediction: f64,
    pub r2_damage_prediction: f64,
    pub max_lag: usize,
    pub info_to_damage: GrangerOutcome,
    pub damage_to_damage: GrangerOutcome,
}

impl GrangerCausalityResult {
    /// Lagged information explains damage better than damage's own past.
    pub fn info_better_predictor(&self) -> bool {
        self.r2_info_prediction > self.r2_damage_prediction
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterventionResponseResult {
    pub performed: bool,
    pub intervention_age: Option<f64>,
    pub info_change_pct: Option<f64>,
    pub entropy_change_pct: Option<f64>,
    pub damage_change_pct: Option<f64>,
    pub successful: Option<bool>,
}

impl InterventionResponseResult {
    pub fn not_performed() -> Self {
        Self {
            performed: false,
            intervention_age: None,
            info_change_pct: None,
            entropy_change_pct: None,
            damage_change_pct: None,
            successful: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullValidationReport {
    pub temporal_precedence: TemporalPrecedenceResult,
    pub granger_causality: GrangerCausalityResult,
    pub intervention_response: InterventionResponseResult,
}

/// Validation tests bound to one immutable set of thresholds
#[derive(Debug, Clone, Default)]
pub struct ValidationSuite {
    config: ValidationConfig,
}

impl ValidationSuite {
    pub fn new(config: ValidationConfig) -> Result<Self, InfoThermoError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn with_thresholds(
        info_threshold: f64,
        damage_threshold: f64,
    ) -> Result<Self, InfoThermoError> {
        Self::new(ValidationConfig {
            info_threshold,
            damage_threshold,
            ..ValidationConfig::default()
        })
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn temporal_precedence_test(
        &self,
        dataset: &Dataset,
        scenario: &Scenario,
    ) -> Result<TemporalPrecedenceResult, InfoThermoError> {
        let series = scenario_series(dataset, scenario)?;

        let info_crossing = find_crossing_point(
            &series.age,
            &series.information_fidelity,
            self.config.info_threshold,
            CrossingDirection::Below,
        );
        let damage_crossing = find_crossing_point(
            &series.age,
            &series.molecular_damage,
            self.config.damage_threshold,
            CrossingDirection::Above,
        );

        let (precedes, info_crossing_age, damage_crossing_age, time_difference) =
            match (info_crossing, damage_crossing) {
                (Some(info_age), Some(damage_age)) => (
                    info_age < damage_age,
                    Some(info_age),
                    Some(damage_age),
                    Some(damage_age - info_age),
                ),
                _ => (false, None, None, None),
            };

        Ok(TemporalPrecedenceResult {
            precedes,
            info_crossing_age,
            damage_crossing_age,
            time_difference,
            info_threshold: self.config.info_threshold,
            damage_threshold: self.config.damage_threshold,
        })
    }

    /// Granger tests for information -> damage and damage -> damage, plus the
    /// lagged R² diagnostics. Statistical failures degrade, they never error.
    pub fn granger_causality_test(
        &self,
        dataset: &Dataset,
        scenario: &Scenario,
        max_lag: usize,
    ) -> Result<GrangerCausalityResult, InfoThermoError> {
        let series = scenario_series(dataset, scenario)?;
        let info = &series.information_fidelity;
        let damage = &series.molecular_damage;

        let info_to_damage = GrangerOutcome::from_test(
            stats::granger_test(info, damage, max_lag),
            "information->damage",
        );
        let damage_to_damage = GrangerOutcome::from_test(
            stats::granger_test(damage, damage, max_lag),
            "damage->damage",
        );

        let alpha = self.config.significance_level;
        Ok(GrangerCausalityResult {
            info_granger_causes_damage: info_to_damage.is_significant(alpha),
            damage_autocorrelation_significant: damage_to_damage.is_significant(alpha),
            info_to_damage_p_value: info_to_damage.p_value(),
            damage_to_damage_p_value: damage_to_damage.p_value(),
            r2_info_prediction: stats::lagged_r2(info, damage, max_lag),
            r2_damage_prediction: stats::lagged_r2(damage, damage, 1),
            max_lag,
            info_to_damage,
            damage_to_damage,
        })
    }

    /// Compare scenario means inside the window around the first intervention
    /// sample.
    pub fn intervention_response_analysis(
        &self,
        dataset: &Dataset,
    ) -> Result<InterventionResponseResult, InfoThermoError> {
        if dataset.is_empty() {
            return Err(InfoThermoError::InvalidArgument(
                "dataset is empty".to_string(),
            ));
        }

        let intervention_age = dataset
            .iter_scenario(&Scenario::Intervention)
            .map(|record| record.age)
            .fold(None, |min: Option<f64>, age| {
                Some(min.map_or(age, |current| current.min(age)))
            });
        let Some(intervention_age) = intervention_age else {
            return Ok(InterventionResponseResult::not_performed());
        };

        let window = self.config.intervention_window;
        let near = |age: f64| (age - intervention_age).abs() < window;

        let baseline = window_means(dataset, &Scenario::Baseline, near);
        let treated = window_means(dataset, &Scenario::Intervention, near);
        let (Some(baseline), Some(treated)) = (baseline, treated) else {
            return Ok(InterventionResponseResult::not_performed());
        };

        let info_change_pct = percent_change(baseline.info, treated.info);
        let entropy_change_pct = percent_change(baseline.entropy, treated.entropy);
        let damage_change_pct = percent_change(baseline.damage, treated.damage);

        let successful = matches!(
            (info_change_pct, entropy_change_pct),
            (Some(info), Some(entropy)) if info > 0.0 && entropy < 0.0
        );

        Ok(InterventionResponseResult {
            performed: true,
            intervention_age: Some(intervention_age),
            info_change_pct,
            entropy_change_pct,
            damage_change_pct,
            successful: Some(successful),
        })
    }

    /// Temporal precedence and Granger tests on the baseline scenario, plus
    /// the intervention analysis when intervention records exist.
    pub fn run_full_validation(
        &self,
        dataset: &Dataset,
    ) -> Result<FullValidationReport, InfoThermoError> {
        let temporal_precedence = self.temporal_precedence_test(dataset, &Scenario::Baseline)?;
        let granger_causality =
            self.granger_causality_test(dataset, &Scenario::Baseline, self.config.max_lag)?;

        let intervention_response = if dataset.has_scenario(&Scenario::Intervention) {
            self.intervention_response_analysis(dataset)?
        } else {
            InterventionResponseResult::not_performed()
        };

        Ok(FullValidationReport {
            temporal_precedence,
            granger_causality,
            intervention_response,
        })
    }
}

/// Only an empty dataset is an error; a scenario without records yields an
/// empty series and the tests report their absent/degraded defaults.
fn scenario_series(
    dataset: &Dataset,
    scenario: &Scenario,
) -> Result<ScenarioSeries, InfoThermoError> {
    if dataset.is_empty() {
        return Err(InfoThermoError::InvalidArgument(
            "dataset is empty".to_string(),
        ));
    }

    let series = dataset.scenario_series(scenario);
    if series.is_empty() {
        debug!(%scenario, "no records for scenario");
    }
    Ok(series)
}

struct WindowMeans {
    info: f64,
    entropy: f64,
    damage: f64,
}

fn window_means(
    dataset: &Dataset,
    scenario: &Scenario,
    in_window: impl Fn(f64) -> bool,
) -> Option<WindowMeans> {
    let mut count = 0_usize;
    let mut info = 0.0;
    let mut entropy = 0.0;
    let mut damage = 0.0;

    for record in dataset
        .iter_scenario(scenario)
        .filter(|record| in_window(record.age))
    {
        count += 1;
        info += record.information_fidelity;
        entropy += record.entropy_production;
        damage += record.molecular_damage;
    }

    if count == 0 {
        return None;
    }
    let n = count as f64;
    Some(WindowMeans {
        info: info / n,
        entropy: entropy / n,
        damage: damage / n,
    })
}

/// `None` when the baseline mean is zero.
fn percent_change(baseline: f64, treated: f64) -> Option<f64> {
    let pct = (treated - baseline) / baseline * 100.0;
    pct.is_finite().then_some(pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ObservationRecord;
    use approx::assert_relative_eq;

    fn record(age: f64, info: f64, damage: f64, scenario: Scenario) -> ObservationRecord {
        ObservationRecord {
            age,
            information_fidelity: info,
            error_correction: 0.9,
            molecular_damage: damage,
            entropy_production: 0.1 * (1.0 - info) + 0.025 * info,
            scenario,
        }
    }

    /// Information falls linearly through 0.65 at age 30, damage rises
    /// linearly through 0.45 at age 50.
    fn linear_dataset() -> Dataset {
        (0..=100)
            .map(|age| {
                let age = age as f64;
                record(
                    age,
                    0.95 - 0.01 * age,
                    0.2 + 0.005 * age,
                    Scenario::Baseline,
                )
            })
            .collect()
    }

    #[test]
    fn crossing_on_a_sample_boundary_is_exact() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.1, 0.3, 0.5, 0.7];
        assert_eq!(
            find_crossing_point(&x, &y, 0.5, CrossingDirection::Above),
            Some(2.0)
        );
    }

    #[test]
    fn crossing_between_samples_is_interpolated() {
        let x = [10.0, 20.0, 30.0];
        let y = [0.9, 0.7, 0.5];
        let age = find_crossing_point(&x, &y, 0.65, CrossingDirection::Below).unwrap();
        assert!(age > 20.0 && age < 30.0);
        assert_relative_eq!(age, 22.5, epsilon = 1e-12);
    }

    #[test]
    fn crossing_at_first_sample_is_not_interpolated() {
        let x = [5.0, 6.0];
        let y = [0.2, 0.1];
        assert_eq!(
            find_crossing_point(&x, &y, 0.5, CrossingDirection::Below),
            Some(5.0)
        );
    }

    #[test]
    fn crossing_absent_when_never_reached() {
        let x = [0.0, 1.0, 2.0];
        let y = [0.1, 0.2, 0.3];
        assert_eq!(
            find_crossing_point(&x, &y, 0.5, CrossingDirection::Above),
            None
        );
        assert_eq!(find_crossing_point(&[], &[], 0.5, CrossingDirection::Above), None);
    }

    #[test]
    fn threshold_equal_to_later_plateau() {
        let x = [0.0, 1.0, 2.0];
        let y = [0.4, 0.6, 0.6];
        assert_eq!(
            find_crossing_point(&x, &y, 0.6, CrossingDirection::Above),
            Some(1.0)
        );
    }

    #[test]
    fn information_precedes_damage_by_twenty_years() {
        let suite = ValidationSuite::default();
        let result = suite
            .temporal_precedence_test(&linear_dataset(), &Scenario::Baseline)
            .unwrap();

        assert!(result.precedes);
        assert_relative_eq!(result.info_crossing_age.unwrap(), 30.0, epsilon = 1e-9);
        assert_relative_eq!(result.damage_crossing_age.unwrap(), 50.0, epsilon = 1e-9);
        assert_relative_eq!(result.time_difference.unwrap(), 20.0, epsilon = 1e-9);
        assert_eq!(result.info_threshold, 0.65);
        assert_eq!(result.damage_threshold, 0.45);
    }

    #[test]
    fn damage_first_reports_negative_difference() {
        let suite = ValidationSuite::with_thresholds(0.65, 0.25).unwrap();
        let result = suite
            .temporal_precedence_test(&linear_dataset(), &Scenario::Baseline)
            .unwrap();

        assert!(!result.precedes);
        assert_relative_eq!(result.time_difference.unwrap(), -20.0, epsilon = 1e-9);
    }

    #[test]
    fn missing_crossing_clears_both_ages() {
        let suite = ValidationSuite::with_thresholds(0.65, 5.0).unwrap();
        let result = suite
            .temporal_precedence_test(&linear_dataset(), &Scenario::Baseline)
            .unwrap();

        assert!(!result.precedes);
        assert!(result.info_crossing_age.is_none());
        assert!(result.damage_crossing_age.is_none());
        assert!(result.time_difference.is_none());
    }

    #[test]
    fn records_are_sorted_before_crossing_search() {
        let mut records = linear_dataset().into_records();
        records.reverse();
        let result = ValidationSuite::default()
            .temporal_precedence_test(&Dataset::from_records(records), &Scenario::Baseline)
            .unwrap();
        assert_relative_eq!(result.info_crossing_age.unwrap(), 30.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_dataset_is_invalid() {
        let suite = ValidationSuite::default();
        let empty = Dataset::new();
        assert!(matches!(
            suite.temporal_precedence_test(&empty, &Scenario::Baseline),
            Err(InfoThermoError::InvalidArgument(_))
        ));
        assert!(matches!(
            suite.granger_causality_test(&empty, &Scenario::Baseline, 3),
            Err(InfoThermoError::InvalidArgument(_))
        ));
        assert!(matches!(
            suite.intervention_response_analysis(&empty),
            Err(InfoThermoError::InvalidArgument(_))
        ));
    }

    #[test]
    fn missing_scenario_reports_absent_crossings() {
        let result = ValidationSuite::default()
            .temporal_precedence_test(&linear_dataset(), &Scenario::Intervention)
            .unwrap();
        assert!(!result.precedes);
        assert!(result.info_crossing_age.is_none());
        assert!(result.damage_crossing_age.is_none());
        assert!(result.time_difference.is_none());
    }

    #[test]
    fn intervention_only_dataset_still_gives_full_report() {
        let dataset: Dataset = (0..100)
            .map(|i| {
                let age = i as f64;
                record(age, 0.95 - 0.01 * age, 0.2 + 0.005 * age, Scenario::Intervention)
            })
            .collect();

        let report = ValidationSuite::default()
            .run_full_validation(&dataset)
            .unwrap();

        assert!(!report.temporal_precedence.precedes);
        assert!(report.temporal_precedence.info_crossing_age.is_none());

        let gc = &report.granger_causality;
        assert!(!gc.info_granger_causes_damage);
        assert_eq!(gc.info_to_damage_p_value, 1.0);
        assert_eq!(gc.damage_to_damage_p_value, 1.0);
        assert_eq!(
            gc.info_to_damage,
            GrangerOutcome::Degraded {
                reason: StatsError::InsufficientSamples {
                    needed: 6,
                    available: 0
                }
            }
        );
        assert_eq!(gc.r2_info_prediction, 0.0);
        assert_eq!(gc.r2_damage_prediction, 0.0);

        // No baseline records inside the window around the intervention.
        assert!(!report.intervention_response.performed);
    }

    #[test]
    fn nan_in_loaded_csv_degrades_instead_of_failing() {
        let mut raw = String::from(
            "age,information_fidelity,error_correction,molecular_damage,entropy_production,scenario\n",
        );
        for i in 0..200 {
            let age = i as f64 * 0.5;
            let info = if i == 50 {
                "NaN".to_string()
            } else {
                format!("{}", 0.98 - 0.003 * age + 0.001 * (i as f64).sin())
            };
            let damage = 0.01 + 0.004 * age + 0.001 * (i as f64 * 1.7).cos();
            raw.push_str(&format!("{age},{info},0.9,{damage},0.05,baseline\n"));
        }
        let dataset = Dataset::read_csv(raw.as_bytes()).unwrap();
        assert!(dataset.records()[50].information_fidelity.is_nan());

        let result = ValidationSuite::default()
            .granger_causality_test(&dataset, &Scenario::Baseline, 3)
            .unwrap();
        assert!((0.0..=1.0).contains(&result.info_to_damage_p_value));
        assert!((0.0..=1.0).contains(&result.r2_info_prediction));
        assert!((0.0..=1.0).contains(&result.r2_damage_prediction));

        let report = ValidationSuite::default()
            .run_full_validation(&dataset)
            .unwrap();
        assert!(report
            .temporal_precedence
            .info_crossing_age
            .map_or(true, f64::is_finite));
    }

    #[test]
    fn granger_with_too_few_samples_degrades() {
        let dataset: Dataset = (0..5)
            .map(|i| record(i as f64, 1.0 - 0.1 * i as f64, 0.1 * i as f64, Scenario::Baseline))
            .collect();

        let result = ValidationSuite::default()
            .granger_causality_test(&dataset, &Scenario::Baseline, 3)
            .unwrap();

        assert!(!result.info_granger_causes_damage);
        assert!(!result.damage_autocorrelation_significant);
        assert_eq!(result.info_to_damage_p_value, 1.0);
        assert_eq!(result.damage_to_damage_p_value, 1.0);
        assert_eq!(
            result.info_to_damage,
            GrangerOutcome::Degraded {
                reason: StatsError::InsufficientSamples {
                    needed: 6,
                    available: 5
                }
            }
        );
        assert_eq!(result.max_lag, 3);
    }

    #[test]
    fn damage_on_itself_degrades_as_singular() {
        let result = ValidationSuite::default()
            .granger_causality_test(&linear_dataset(), &Scenario::Baseline, 2)
            .unwrap();
        assert!(result.damage_to_damage.is_degraded());
        assert_eq!(result.damage_to_damage_p_value, 1.0);
    }

    #[test]
    fn r2_diagnostics_on_linear_signals() {
        let result = ValidationSuite::default()
            .granger_causality_test(&linear_dataset(), &Scenario::Baseline, 3)
            .unwrap();
        // Both series are exact lines of age, so any lagged pairing is perfect.
        assert_relative_eq!(result.r2_info_prediction, 1.0, epsilon = 1e-9);
        assert_relative_eq!(result.r2_damage_prediction, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn r2_is_zero_when_lag_consumes_the_series() {
        let dataset: Dataset = (0..3)
            .map(|i| record(i as f64, 0.9, 0.1 * i as f64, Scenario::Baseline))
            .collect();
        let result = ValidationSuite::default()
            .granger_causality_test(&dataset, &Scenario::Baseline, 3)
            .unwrap();
        assert_eq!(result.r2_info_prediction, 0.0);
    }

    fn intervention_dataset(baseline_info: f64, treated_info: f64) -> Dataset {
        let mut dataset = Dataset::new();
        for step in 0..=40 {
            let age = 58.0 + 0.1 * step as f64;
            dataset.push(record(age, baseline_info, 0.4, Scenario::Baseline));
        }
        for step in 0..=20 {
            let age = 60.0 + 0.1 * step as f64;
            dataset.push(record(age, treated_info, 0.38, Scenario::Intervention));
        }
        dataset
    }

    #[test]
    fn intervention_raising_information_is_successful() {
        let result = ValidationSuite::default()
            .intervention_response_analysis(&intervention_dataset(0.5, 0.7))
            .unwrap();

        assert!(result.performed);
        assert_eq!(result.intervention_age, Some(60.0));
        assert_relative_eq!(result.info_change_pct.unwrap(), 40.0, epsilon = 1e-9);
        assert!(result.entropy_change_pct.unwrap() < 0.0);
        assert_relative_eq!(result.damage_change_pct.unwrap(), -5.0, epsilon = 1e-9);
        assert_eq!(result.successful, Some(true));
    }

    #[test]
    fn intervention_lowering_information_is_unsuccessful() {
        let result = ValidationSuite::default()
            .intervention_response_analysis(&intervention_dataset(0.7, 0.5))
            .unwrap();
        assert!(result.performed);
        assert_eq!(result.successful, Some(false));
    }

    #[test]
    fn no_intervention_records_means_not_performed() {
        let result = ValidationSuite::default()
            .intervention_response_analysis(&linear_dataset())
            .unwrap();
        assert_eq!(result, InterventionResponseResult::not_performed());
    }

    #[test]
    fn no_overlapping_baseline_means_not_performed() {
        let mut dataset = Dataset::new();
        dataset.push(record(10.0, 0.8, 0.1, Scenario::Baseline));
        dataset.push(record(60.0, 0.9, 0.1, Scenario::Intervention));
        let result = ValidationSuite::default()
            .intervention_response_analysis(&dataset)
            .unwrap();
        assert!(!result.performed);
    }

    #[test]
    fn full_validation_without_intervention() {
        let report = ValidationSuite::default()
            .run_full_validation(&linear_dataset())
            .unwrap();
        assert!(report.temporal_precedence.precedes);
        assert_eq!(report.granger_causality.max_lag, 3);
        assert!(!report.intervention_response.performed);
    }

    #[test]
    fn invalid_config_is_rejected() {
        for config in [
            ValidationConfig {
                max_lag: 0,
                ..ValidationConfig::default()
            },
            ValidationConfig {
                significance_level: 1.5,
                ..ValidationConfig::default()
            },
            ValidationConfig {
                info_threshold: f64::NAN,
                ..ValidationConfig::default()
            },
        ] {
            assert!(matches!(
                ValidationSuite::new(config),
                Err(InfoThermoError::InvalidConfig(_))
            ));
        }
    }
}
