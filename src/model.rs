//! Coupled aging dynamics
//!
//! ```text
//! dI/dt = -alpha * I + beta * I * E
//! S     = gamma * (1 - I) + alpha * I / eta
//! dE/dt = -delta * S * E
//! dD/dt = mu * (1 - I) + nu * D
//! ```
//!
//! `S` (entropy production) is never integrated; it is recomputed from the
//! returned `I` samples.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::params::ModelParameters;
use crate::solver::{self, SolverOptions};
use crate::state::SystemState;
use crate::InfoThermoError;

/// Output samples per unit of simulated time (weekly for years).
pub const SAMPLES_PER_UNIT: f64 = 52.0;

/// Closed simulation interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

impl TimeSpan {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn validate(&self) -> Result<(), InfoThermoError> {
        if !(self.start.is_finite() && self.end.is_finite()) || self.end <= self.start {
            return Err(InfoThermoError::InvalidArgument(format!(
                "time span must be finite with end > start, got [{}, {}]",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// True when `t` lies in the open interval `(start, end)`.
    pub fn contains_strictly(&self, t: f64) -> bool {
        t > self.start && t < self.end
    }

    /// `floor(duration * 52)` points (at least two) spaced linearly over the
    /// span, both ends included.
    pub fn weekly_grid(&self) -> Vec<f64> {
        let count = ((self.duration() * SAMPLES_PER_UNIT).floor() as usize).max(2);
        let step = self.duration() / (count - 1) as f64;

        let mut grid: Vec<f64> = (0..count)
            .map(|idx| self.start + step * idx as f64)
            .collect();
        if let Some(last) = grid.last_mut() {
            *last = self.end;
        }
        grid
    }
}

impl Default for TimeSpan {
    fn default() -> Self {
        Self::new(0.0, 100.0)
    }
}

/// Sampled output of one simulation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub time: Vec<f64>,
    pub information_fidelity: Vec<f64>,
    pub error_correction: Vec<f64>,
    pub damage: Vec<f64>,
    pub entropy_production: Vec<f64>,
    /// Set when the run contains a restoration event
    pub intervention_time: Option<f64>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn state_at(&self, idx: usize) -> Option<SystemState> {
        Some(SystemState::new(
            *self.information_fidelity.get(idx)?,
            *self.error_correction.get(idx)?,
            *self.damage.get(idx)?,
        ))
    }

    pub fn final_state(&self) -> Option<SystemState> {
        self.len().checked_sub(1).and_then(|idx| self.state_at(idx))
    }
}

/// The aging ODE system bound to one immutable parameter set
#[derive(Debug, Clone)]
pub struct AgingModel {
    params: ModelParameters,
    solver: SolverOptions,
}

impl AgingModel {
    pub fn new(params: ModelParameters) -> Result<Self, InfoThermoError> {
        Self::with_solver(params, SolverOptions::default())
    }

    pub fn with_solver(
        params: ModelParameters,
        solver: SolverOptions,
    ) -> Result<Self, InfoThermoError> {
        params.validate()?;
        solver.validate()?;
        Ok(Self { params, solver })
    }

    pub fn params(&self) -> &ModelParameters {
        &self.params
    }

    pub fn solver_options(&self) -> &SolverOptions {
        &self.solver
    }

    /// (1.0, e0, 0.01)
    pub fn default_initial_state(&self) -> SystemState {
        SystemState::initial(self.params.e0)
    }

    /// Entropy production for a given information fidelity.
    pub fn entropy_production(&self, information_fidelity: f64) -> f64 {
        let p = &self.params;
        p.gamma * (1.0 - information_fidelity) + p.alpha * information_fidelity / p.eta
    }

    /// Right-hand side of the ODE system. Time does not enter explicitly, so
    /// any `t` is accepted.
    pub fn derivative(&self, _t: f64, state: &SystemState) -> SystemState {
        let p = &self.params;
        let info = state.information_fidelity;
        let capacity = state.error_correction;
        let damage = state.damage;

        let entropy = self.entropy_production(info);

        SystemState::new(
            -p.alpha * info + p.beta * info * capacity,
            -p.delta * entropy * capacity,
            p.mu * (1.0 - info) + p.nu * damage,
        )
    }

    /// Integrate over `span`.
    ///
    /// `initial` defaults to [`Self::default_initial_state`]; `sample_times`
    /// defaults to [`TimeSpan::weekly_grid`] and must otherwise be strictly
    /// increasing inside the span.
    pub fn simulate(
        &self,
        span: TimeSpan,
        initial: Option<SystemState>,
        sample_times: Option<&[f64]>,
    ) -> Result<Trajectory, InfoThermoError> {
        span.validate()?;

        let initial = initial.unwrap_or_else(|| self.default_initial_state());
        if !initial.is_finite() {
            return Err(InfoThermoError::InvalidArgument(
                "initial state must be finite".to_string(),
            ));
        }

        let default_grid;
        let grid = match sample_times {
            Some(times) => times,
            None => {
                default_grid = span.weekly_grid();
                &default_grid
            }
        };

        let solution = solver::integrate(
            |t, y: &[f64; 3]| self.derivative(t, &SystemState::from(*y)).to_array(),
            span.start,
            span.end,
            initial.to_array(),
            grid,
            &self.solver,
        )?;

        let mut trajectory = Trajectory {
            time: solution.times,
            information_fidelity: Vec::with_capacity(solution.states.len()),
            error_correction: Vec::with_capacity(solution.states.len()),
            damage: Vec::with_capacity(solution.states.len()),
            entropy_production: Vec::new(),
            intervention_time: None,
        };
        for [info, capacity, damage] in solution.states {
            trajectory.information_fidelity.push(info);
            trajectory.error_correction.push(capacity);
            trajectory.damage.push(damage);
        }
        trajectory.entropy_production = self.entropy_series(&trajectory.information_fidelity);

        Ok(trajectory)
    }

    /// Simulate with a single restoration event at `intervention_time`.
    ///
    /// At the event `I` jumps to `I + restoration_efficiency * (1 - I)`; `E`
    /// and `D` carry over unchanged. The sample duplicated at the event time
    /// is taken from the pre-intervention segment only.
    pub fn simulate_with_intervention(
        &self,
        intervention_time: f64,
        restoration_efficiency: f64,
        span: TimeSpan,
    ) -> Result<Trajectory, InfoThermoError> {
        span.validate()?;

        if !span.contains_strictly(intervention_time) {
            return Err(InfoThermoError::InvalidArgument(format!(
                "intervention time {intervention_time} must lie strictly inside [{}, {}]",
                span.start, span.end
            )));
        }
        if !(0.0..=1.0).contains(&restoration_efficiency) {
            return Err(InfoThermoError::InvalidArgument(format!(
                "restoration efficiency must be in [0, 1], got {restoration_efficiency}"
            )));
        }

        let before = self.simulate(TimeSpan::new(span.start, intervention_time), None, None)?;
        let at_event = before
            .final_state()
            .ok_or_else(|| InfoThermoError::Integration {
                t: intervention_time,
                reason: "pre-intervention segment produced no samples".to_string(),
            })?;

        let info_before = at_event.information_fidelity;
        let info_after = info_before + restoration_efficiency * (1.0 - info_before);
        debug!(
            intervention_time,
            info_before, info_after, "applying information restoration"
        );

        let restored = SystemState::new(info_after, at_event.error_correction, at_event.damage);
        let after = self.simulate(
            TimeSpan::new(intervention_time, span.end),
            Some(restored),
            None,
        )?;

        let mut combined = before;
        combined.time.extend_from_slice(&after.time[1..]);
        combined
            .information_fidelity
            .extend_from_slice(&after.information_fidelity[1..]);
        combined
            .error_correction
            .extend_from_slice(&after.error_correction[1..]);
        combined.damage.extend_from_slice(&after.damage[1..]);
        combined.entropy_production = self.entropy_series(&combined.information_fidelity);
        combined.intervention_time = Some(intervention_time);

        Ok(combined)
    }

    fn entropy_series(&self, information_fidelity: &[f64]) -> Vec<f64> {
        information_fidelity
            .iter()
            .map(|&info| self.entropy_production(info))
            .collect()
    }
}

impl Default for AgingModel {
    fn default() -> Self {
        Self {
            params: ModelParameters::default(),
            solver: SolverOptions::default(),
        }
    }
}
