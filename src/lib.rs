//! Information-thermodynamics model of aging
//!
//! A three-variable ODE system tracking information fidelity (I),
//! error-correction capacity (E) and molecular damage (D), integrated with an
//! adaptive Dormand-Prince scheme. Noisy synthetic observations are drawn from
//! baseline and intervention trajectories and fed to a validation suite that
//! tests temporal precedence, Granger causality and intervention response.

pub mod config;
pub mod dataset;
pub mod model;
pub mod output;
pub mod params;
pub mod solver;
pub mod state;
pub mod stats;
pub mod synth;
pub mod validation;

use thiserror::Error;

pub use config::ExperimentConfig;
pub use dataset::{Dataset, ObservationRecord, Scenario, ScenarioSeries};
pub use model::{AgingModel, TimeSpan, Trajectory};
pub use params::ModelParameters;
pub use solver::SolverOptions;
pub use state::SystemState;
pub use stats::{GrangerTest, StatsError};
pub use synth::{DataSynthesizer, SynthesisConfig};
pub use validation::{
    find_crossing_point, CrossingDirection, FullValidationReport, GrangerCausalityResult,
    GrangerOutcome, InterventionResponseResult, TemporalPrecedenceResult, ValidationConfig,
    ValidationSuite,
};

#[derive(Debug, Error)]
pub enum InfoThermoError {
    #[error("integration failed at t = {t}: {reason}")]
    Integration { t: f64, reason: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Generate a dataset from `config` and run the full validation suite on it.
pub fn run_experiment(
    config: &ExperimentConfig,
) -> Result<(Dataset, FullValidationReport), InfoThermoError> {
    config.validate()?;

    let mut synthesizer = config.build_synthesizer()?;
    let dataset = synthesizer.generate_dataset(config.synthesis.include_intervention)?;
    let report = config.build_suite()?.run_full_validation(&dataset)?;

    Ok((dataset, report))
}
