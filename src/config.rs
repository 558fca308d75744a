//! JSON experiment configuration covering model, synthesis, validation and solver

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::AgingModel;
use crate::params::ModelParameters;
use crate::solver::SolverOptions;
use crate::synth::{DataSynthesizer, SynthesisConfig};
use crate::validation::{ValidationConfig, ValidationSuite};
use crate::InfoThermoError;

/// Everything a validation run needs, loadable from one JSON document.
/// Missing sections and fields fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub model: ModelParameters,
    pub synthesis: SynthesisConfig,
    pub validation: ValidationConfig,
    pub solver: SolverOptions,
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<(), InfoThermoError> {
        self.model.validate().map_err(|err| match err {
            InfoThermoError::InvalidArgument(reason) => {
                InfoThermoError::InvalidConfig(format!("model: {reason}"))
            }
            other => other,
        })?;
        self.solver.validate()?;
        self.synthesis.validate()?;
        self.validation.validate()?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, InfoThermoError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, InfoThermoError> {
        let config: ExperimentConfig = serde_json::from_str(raw)?;
        Ok(config)
    }

    pub fn build_model(&self) -> Result<AgingModel, InfoThermoError> {
        AgingModel::with_solver(self.model, self.solver)
    }

    pub fn build_synthesizer(&self) -> Result<DataSynthesizer, InfoThermoError> {
        DataSynthesizer::new(self.build_model()?, self.synthesis)
    }

    pub fn build_suite(&self) -> Result<ValidationSuite, InfoThermoError> {
        ValidationSuite::new(self.validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = ExperimentConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ExperimentConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let raw = r#"{
            "model": { "alpha": 0.03 },
            "synthesis": { "seed": 7, "time_span": { "start": 0.0, "end": 50.0 },
                           "intervention_time": 25.0 },
            "validation": { "max_lag": 5 }
        }"#;
        let config = ExperimentConfig::from_json_str(raw).unwrap();

        assert_eq!(config.model.alpha, 0.03);
        assert_eq!(config.model.beta, ModelParameters::default().beta);
        assert_eq!(config.synthesis.seed, 7);
        assert_eq!(config.synthesis.noise_level, 0.05);
        assert_eq!(config.synthesis.time_span.end, 50.0);
        assert_eq!(config.validation.max_lag, 5);
        assert_eq!(config.validation.info_threshold, 0.65);
        assert_eq!(config.solver, SolverOptions::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_model_is_a_config_error() {
        let config = ExperimentConfig {
            model: ModelParameters {
                eta: 0.0,
                ..ModelParameters::default()
            },
            ..ExperimentConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(InfoThermoError::InvalidConfig(_))
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            ExperimentConfig::from_json_str("{ \"synthesis\": 3 }"),
            Err(InfoThermoError::Json(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "synthesis": { "noise_level": 0.1 } }"#).unwrap();

        let config = ExperimentConfig::load(&path).unwrap();
        assert_eq!(config.synthesis.noise_level, 0.1);
    }

    #[test]
    fn builders_carry_the_sections() {
        let config = ExperimentConfig::default();
        let synthesizer = config.build_synthesizer().unwrap();
        assert_eq!(synthesizer.config(), &config.synthesis);
        assert_eq!(synthesizer.model().params(), &config.model);
        assert_eq!(config.build_suite().unwrap().config(), &config.validation);
    }
}
