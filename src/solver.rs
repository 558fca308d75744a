//! Adaptive explicit Runge-Kutta integration
//!
//! Dormand-Prince 5(4) with first-same-as-last stages, embedded error
//! control and a 4th-order continuous extension. Requested sample times are
//! filled from the continuous extension of whichever accepted step covers
//! them, so the step sequence is never bent towards the output grid.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::InfoThermoError;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
/// -1 / (error estimator order + 1)
const ERROR_EXPONENT: f64 = -0.2;

const C: [f64; 6] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0];

const A: [[f64; 5]; 6] = [
    [0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
    ],
];

const B: [f64; 7] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
    0.0,
];

/// Difference between the 5th- and 4th-order weights.
const E: [f64; 7] = [
    -71.0 / 57600.0,
    0.0,
    71.0 / 16695.0,
    -71.0 / 1920.0,
    17253.0 / 339200.0,
    -22.0 / 525.0,
    1.0 / 40.0,
];

/// Continuous extension: y(t + x h) = y + h * sum_i k_i * (P_i . [x, x^2, x^3, x^4])
const P: [[f64; 4]; 7] = [
    [
        1.0,
        -8048581381.0 / 2820520608.0,
        8663915743.0 / 2820520608.0,
        -12715105075.0 / 11282082432.0,
    ],
    [0.0, 0.0, 0.0, 0.0],
    [
        0.0,
        131558114200.0 / 32700410799.0,
        -68118460800.0 / 10900136933.0,
        87487479700.0 / 32700410799.0,
    ],
    [
        0.0,
        -1754552775.0 / 470086768.0,
        14199869525.0 / 1410260304.0,
        -10690763975.0 / 1880347072.0,
    ],
    [
        0.0,
        127303824393.0 / 49829197408.0,
        -318862633887.0 / 49829197408.0,
        701980252875.0 / 199316789632.0,
    ],
    [
        0.0,
        -282668133.0 / 205662961.0,
        2019193451.0 / 616988883.0,
        -1453857185.0 / 822651844.0,
    ],
    [
        0.0,
        40617522.0 / 29380423.0,
        -110615467.0 / 29380423.0,
        69997945.0 / 29380423.0,
    ],
];

/// Tolerances and step budget for one integration run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
    /// Maximum number of step attempts (accepted plus rejected)
    pub max_steps: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-8,
            atol: 1e-10,
            max_steps: 100_000,
        }
    }
}

impl SolverOptions {
    pub fn validate(&self) -> Result<(), InfoThermoError> {
        if !(self.rtol.is_finite() && self.rtol > 0.0) {
            return Err(InfoThermoError::InvalidConfig(
                "solver rtol must be finite and > 0".to_string(),
            ));
        }
        if !(self.atol.is_finite() && self.atol >= 0.0) {
            return Err(InfoThermoError::InvalidConfig(
                "solver atol must be finite and >= 0".to_string(),
            ));
        }
        if self.max_steps == 0 {
            return Err(InfoThermoError::InvalidConfig(
                "solver max_steps must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SolverStats {
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub rhs_evaluations: usize,
}

/// States sampled at the requested times
#[derive(Debug, Clone)]
pub struct DenseSolution<const N: usize> {
    pub times: Vec<f64>,
    pub states: Vec<[f64; N]>,
    pub stats: SolverStats,
}

/// Integrate `rhs` from `t0` to `t1` starting at `y0`, reporting the state at
/// each entry of `t_eval`.
///
/// `t_eval` must be strictly increasing and lie inside `[t0, t1]`. Fails with
/// [`InfoThermoError::Integration`] when the step budget runs out, the step
/// size underflows, or the state stops being finite.
pub fn integrate<const N: usize, F>(
    rhs: F,
    t0: f64,
    t1: f64,
    y0: [f64; N],
    t_eval: &[f64],
    options: &SolverOptions,
) -> Result<DenseSolution<N>, InfoThermoError>
where
    F: Fn(f64, &[f64; N]) -> [f64; N],
{
    options.validate()?;

    if !(t0.is_finite() && t1.is_finite()) || t1 <= t0 {
        return Err(InfoThermoError::InvalidArgument(format!(
            "integration span must be finite and increasing, got [{t0}, {t1}]"
        )));
    }
    if y0.iter().any(|value| !value.is_finite()) {
        return Err(InfoThermoError::InvalidArgument(
            "initial state must be finite".to_string(),
        ));
    }
    check_sample_times(t0, t1, t_eval)?;

    let mut stats = SolverStats::default();
    let mut times = Vec::with_capacity(t_eval.len());
    let mut states = Vec::with_capacity(t_eval.len());
    let mut next = 0;

    if t_eval.first() == Some(&t0) {
        times.push(t0);
        states.push(y0);
        next = 1;
    }

    let mut t = t0;
    let mut y = y0;
    let mut f = rhs(t, &y);
    stats.rhs_evaluations += 1;

    let mut h = initial_step(&rhs, t0, t1, &y, &f, options);
    stats.rhs_evaluations += 1;
    let mut attempts = 0_usize;

    while t < t1 {
        let min_step = 10.0 * f64::EPSILON * t.abs().max(1.0);
        let mut step_rejected = false;

        loop {
            if attempts >= options.max_steps {
                return Err(InfoThermoError::Integration {
                    t,
                    reason: format!(
                        "step budget of {} attempts exhausted before reaching t = {t1}",
                        options.max_steps
                    ),
                });
            }
            attempts += 1;

            if h.is_nan() || h < min_step {
                return Err(InfoThermoError::Integration {
                    t,
                    reason: format!("step size {h:e} fell below the minimum {min_step:e}"),
                });
            }

            let (h_try, t_new) = if h >= t1 - t { (t1 - t, t1) } else { (h, t + h) };

            let (k, y_new) = dormand_prince_step(&rhs, t, &y, &f, h_try);
            stats.rhs_evaluations += 6;

            let error_norm = if y_new.iter().all(|value| value.is_finite()) {
                scaled_error_norm(&y, &y_new, &k, h_try, options)
            } else {
                f64::INFINITY
            };

            if error_norm < 1.0 {
                let mut factor = if error_norm == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * error_norm.powf(ERROR_EXPONENT)).min(MAX_FACTOR)
                };
                if step_rejected {
                    factor = factor.min(1.0);
                }

                while next < t_eval.len() && t_eval[next] <= t_new {
                    let sample = t_eval[next];
                    let value = if sample == t_new {
                        y_new
                    } else {
                        dense_output(&y, &k, h_try, (sample - t) / h_try)
                    };
                    times.push(sample);
                    states.push(value);
                    next += 1;
                }

                h = h_try * factor;
                t = t_new;
                y = y_new;
                f = k[6];
                stats.accepted_steps += 1;
                break;
            }

            let factor = if error_norm.is_finite() {
                (SAFETY * error_norm.powf(ERROR_EXPONENT)).max(MIN_FACTOR)
            } else {
                MIN_FACTOR
            };
            h = h_try * factor;
            step_rejected = true;
            stats.rejected_steps += 1;
        }
    }

    debug!(
        accepted = stats.accepted_steps,
        rejected = stats.rejected_steps,
        rhs_evaluations = stats.rhs_evaluations,
        samples = times.len(),
        "integration finished"
    );

    Ok(DenseSolution {
        times,
        states,
        stats,
    })
}

fn check_sample_times(t0: f64, t1: f64, t_eval: &[f64]) -> Result<(), InfoThermoError> {
    if let Some(bad) = t_eval.iter().find(|&&t| !(t >= t0 && t <= t1)) {
        return Err(InfoThermoError::InvalidArgument(format!(
            "sample time {bad} lies outside [{t0}, {t1}]"
        )));
    }
    if t_eval.windows(2).any(|pair| pair[1] <= pair[0]) {
        return Err(InfoThermoError::InvalidArgument(
            "sample times must be strictly increasing".to_string(),
        ));
    }
    Ok(())
}

fn dormand_prince_step<const N: usize, F>(
    rhs: &F,
    t: f64,
    y: &[f64; N],
    f: &[f64; N],
    h: f64,
) -> ([[f64; N]; 7], [f64; N])
where
    F: Fn(f64, &[f64; N]) -> [f64; N],
{
    let mut k = [[0.0; N]; 7];
    k[0] = *f;

    for stage in 1..6 {
        let mut y_stage = *y;
        for (j, value) in y_stage.iter_mut().enumerate() {
            let increment: f64 = A[stage][..stage]
                .iter()
                .zip(k.iter())
                .map(|(a, k_m)| a * k_m[j])
                .sum();
            *value += h * increment;
        }
        k[stage] = rhs(t + C[stage] * h, &y_stage);
    }

    let mut y_new = *y;
    for (j, value) in y_new.iter_mut().enumerate() {
        let increment: f64 = B.iter().zip(k.iter()).map(|(b, k_m)| b * k_m[j]).sum();
        *value += h * increment;
    }
    k[6] = rhs(t + h, &y_new);

    (k, y_new)
}

fn scaled_error_norm<const N: usize>(
    y: &[f64; N],
    y_new: &[f64; N],
    k: &[[f64; N]; 7],
    h: f64,
    options: &SolverOptions,
) -> f64 {
    let sum_sq: f64 = (0..N)
        .map(|j| {
            let err: f64 = h * E.iter().zip(k.iter()).map(|(e, k_m)| e * k_m[j]).sum::<f64>();
            let scale = options.atol + options.rtol * y[j].abs().max(y_new[j].abs());
            let ratio = err / scale;
            ratio * ratio
        })
        .sum();
    (sum_sq / N as f64).sqrt()
}

fn dense_output<const N: usize>(y: &[f64; N], k: &[[f64; N]; 7], h: f64, x: f64) -> [f64; N] {
    let powers = [x, x * x, x * x * x, x * x * x * x];
    let weights: [f64; 7] = std::array::from_fn(|i| {
        P[i].iter()
            .zip(powers.iter())
            .map(|(p, power)| p * power)
            .sum()
    });

    let mut out = *y;
    for (j, value) in out.iter_mut().enumerate() {
        let increment: f64 = weights.iter().zip(k.iter()).map(|(w, k_m)| w * k_m[j]).sum();
        *value += h * increment;
    }
    out
}

fn rms(values: impl Iterator<Item = f64>, len: usize) -> f64 {
    let sum_sq: f64 = values.map(|v| v * v).sum();
    (sum_sq / len as f64).sqrt()
}

/// Hairer-Wanner starting step estimate.
fn initial_step<const N: usize, F>(
    rhs: &F,
    t0: f64,
    t1: f64,
    y0: &[f64; N],
    f0: &[f64; N],
    options: &SolverOptions,
) -> f64
where
    F: Fn(f64, &[f64; N]) -> [f64; N],
{
    let span = t1 - t0;
    let scale: [f64; N] = std::array::from_fn(|j| options.atol + y0[j].abs() * options.rtol);

    let d0 = rms((0..N).map(|j| y0[j] / scale[j]), N);
    let d1 = rms((0..N).map(|j| f0[j] / scale[j]), N);

    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    }
    .min(span);

    let y1: [f64; N] = std::array::from_fn(|j| y0[j] + h0 * f0[j]);
    let f1 = rhs(t0 + h0, &y1);
    let d2 = rms((0..N).map(|j| (f1[j] - f0[j]) / scale[j]), N) / h0;

    let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / d1.max(d2)).powf(-ERROR_EXPONENT)
    };

    (100.0 * h0).min(h1).min(span)
}
