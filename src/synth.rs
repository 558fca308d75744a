//! Synthetic observation generator
//!
//! Drives [`AgingModel`] for the baseline and (optionally) intervention
//! scenarios and perturbs every signal with Gaussian noise scaled to the
//! signal's own spread.

use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dataset::{Dataset, ObservationRecord, Scenario};
use crate::model::{AgingModel, TimeSpan, Trajectory};
use crate::stats::population_std;
use crate::InfoThermoError;

/// Entropy production is perturbed at this fraction of the configured level.
pub const ENTROPY_NOISE_SCALE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Noise standard deviation as a fraction of each signal's std
    pub noise_level: f64,
    /// Seed of the synthesizer's random stream
    pub seed: u64,
    pub time_span: TimeSpan,
    pub intervention_time: f64,
    pub restoration_efficiency: f64,
    /// Used by [`crate::run_experiment`]; `generate_dataset` takes it as an argument
    pub include_intervention: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            noise_level: 0.05,
            seed: 42,
            time_span: TimeSpan::default(),
            intervention_time: 60.0,
            restoration_efficiency: 0.6,
            include_intervention: true,
        }
    }
}

impl SynthesisConfig {
    pub fn validate(&self) -> Result<(), InfoThermoError> {
        if !(self.noise_level.is_finite() && self.noise_level >= 0.0) {
            return Err(InfoThermoError::InvalidConfig(
                "noise_level must be finite and >= 0".to_string(),
            ));
        }

        self.time_span
            .validate()
            .map_err(|err| InfoThermoError::InvalidConfig(err.to_string()))?;

        if !self.time_span.contains_strictly(self.intervention_time) {
            return Err(InfoThermoError::InvalidConfig(format!(
                "intervention_time {} must lie strictly inside the time span",
                self.intervention_time
            )));
        }

        if !(0.0..=1.0).contains(&self.restoration_efficiency) {
            return Err(InfoThermoError::InvalidConfig(
                "restoration_efficiency must be in [0, 1]".to_string(),
            ));
        }

        Ok(())
    }
}

/// Owns a model and a seeded random stream. Two synthesizers built with the
/// same model and config emit bit-identical datasets; successive calls on one
/// synthesizer continue its stream.
#[derive(Debug, Clone)]
pub struct DataSynthesizer {
    model: AgingModel,
    config: SynthesisConfig,
    rng: ChaCha8Rng,
}

impl DataSynthesizer {
    pub fn new(model: AgingModel, config: SynthesisConfig) -> Result<Self, InfoThermoError> {
        config.validate()?;
        Ok(Self {
            model,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
        })
    }

    pub fn model(&self) -> &AgingModel {
        &self.model
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Restart the random stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = seed;
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Baseline records followed, when requested, by intervention records.
    pub fn generate_dataset(
        &mut self,
        include_intervention: bool,
    ) -> Result<Dataset, InfoThermoError> {
        let baseline = self.model.simulate(self.config.time_span, None, None)?;
        let mut dataset = Dataset::from_records(self.noisy_records(&baseline, Scenario::Baseline)?);

        if include_intervention {
            let intervention = self.model.simulate_with_intervention(
                self.config.intervention_time,
                self.config.restoration_efficiency,
                self.config.time_span,
            )?;
            dataset.extend(self.noisy_records(&intervention, Scenario::Intervention)?);
        }

        info!(
            records = dataset.len(),
            include_intervention,
            noise_level = self.config.noise_level,
            "synthetic dataset generated"
        );
        Ok(dataset)
    }

    pub fn save_dataset(
        &mut self,
        path: &Path,
        include_intervention: bool,
    ) -> Result<Dataset, InfoThermoError> {
        let dataset = self.generate_dataset(include_intervention)?;
        dataset.save(path)?;
        info!(path = %path.display(), "synthetic dataset saved");
        Ok(dataset)
    }

    pub fn load_dataset(path: &Path) -> Result<Dataset, InfoThermoError> {
        Dataset::load(path)
    }

    fn noisy_records(
        &mut self,
        trajectory: &Trajectory,
        scenario: Scenario,
    ) -> Result<Vec<ObservationRecord>, InfoThermoError> {
        let level = self.config.noise_level;
        let info = self.add_noise(&trajectory.information_fidelity, level)?;
        let capacity = self.add_noise(&trajectory.error_correction, level)?;
        let damage = self.add_noise(&trajectory.damage, level)?;
        let entropy = self.add_noise(&trajectory.entropy_production, level * ENTROPY_NOISE_SCALE)?;

        debug!(%scenario, samples = trajectory.len(), "noise applied");

        Ok((0..trajectory.len())
            .map(|idx| ObservationRecord {
                age: trajectory.time[idx],
                information_fidelity: info[idx],
                error_correction: capacity[idx],
                molecular_damage: damage[idx],
                entropy_production: entropy[idx],
                scenario: scenario.clone(),
            })
            .collect())
    }

    /// Add N(0, (level * std(signal))^2) noise per sample, clamped at zero.
    fn add_noise(&mut self, signal: &[f64], level: f64) -> Result<Vec<f64>, InfoThermoError> {
        let sigma = level * population_std(signal);
        let normal = Normal::new(0.0, sigma).map_err(|err| {
            InfoThermoError::InvalidArgument(format!("noise sigma {sigma} rejected: {err}"))
        })?;

        Ok(signal
            .iter()
            .map(|&value| (value + normal.sample(&mut self.rng)).max(0.0))
            .collect())
    }
}
