//! Model coefficients
//!
//! The eight rate constants of the coupled information / error-correction /
//! damage system.

use serde::{Deserialize, Serialize};

use crate::InfoThermoError;

/// Coefficients of the aging ODE system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    /// Information degradation rate
    pub alpha: f64,
    /// Environmental stress factor (coupling of E into dI/dt)
    pub beta: f64,
    /// Initial error-correction capacity
    pub e0: f64,
    /// Entropy sensitivity of error correction
    pub delta: f64,
    /// Metabolic entropy coefficient
    pub gamma: f64,
    /// Thermodynamic efficiency
    pub eta: f64,
    /// Damage accumulation rate
    pub mu: f64,
    /// Autocatalytic damage rate
    pub nu: f64,
}

impl ModelParameters {
    /// Create a parameter set from explicit coefficients
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        alpha: f64,
        beta: f64,
        e0: f64,
        delta: f64,
        gamma: f64,
        eta: f64,
        mu: f64,
        nu: f64,
    ) -> Self {
        Self {
            alpha,
            beta,
            e0,
            delta,
            gamma,
            eta,
            mu,
            nu,
        }
    }

    /// Calibrated defaults (years as the time unit)
    pub fn default_params() -> Self {
        Self {
            alpha: 0.02,
            beta: 0.015,
            e0: 1.0,
            delta: 0.018,
            gamma: 0.1,
            eta: 0.8,
            mu: 0.03,
            nu: 0.02,
        }
    }

    /// Rejects non-finite coefficients and a zero efficiency, which would
    /// make the entropy term undefined. Signs are not constrained.
    pub fn validate(&self) -> Result<(), InfoThermoError> {
        let named = [
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("e0", self.e0),
            ("delta", self.delta),
            ("gamma", self.gamma),
            ("eta", self.eta),
            ("mu", self.mu),
            ("nu", self.nu),
        ];

        if let Some((name, value)) = named.iter().find(|(_, value)| !value.is_finite()) {
            return Err(InfoThermoError::InvalidArgument(format!(
                "model parameter {name} must be finite, got {value}"
            )));
        }

        if self.eta == 0.0 {
            return Err(InfoThermoError::InvalidArgument(
                "model parameter eta must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self::default_params()
    }
}
