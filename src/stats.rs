//! Regression and significance testing for the validation suite

use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use thiserror::Error;

const BETA_CF_MAX_ITER: usize = 300;
const BETA_CF_EPS: f64 = 1e-14;
const BETA_CF_FPMIN: f64 = 1e-300;
const SVD_MAX_ITER: usize = 10_000;

/// Lanczos approximation, g = 7, n = 9
const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Failure of a statistical routine. Always recoverable by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatsError {
    #[error("maximum lag must be at least 1")]
    InvalidLag,
    #[error("insufficient samples: need at least {needed}, got {available}")]
    InsufficientSamples { needed: usize, available: usize },
    #[error("design matrix is rank deficient (rank {rank} of {columns} columns)")]
    Singular { rank: usize, columns: usize },
    #[error("test statistic is not finite")]
    NonFinite,
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n).
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mu = mean(values);
    let variance = values
        .iter()
        .map(|value| {
            let delta = value - mu;
            delta * delta
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

#[derive(Debug, Clone)]
pub struct OlsFit {
    pub coefficients: DVector<f64>,
    /// Sum of squared residuals
    pub ssr: f64,
    pub df_resid: usize,
}

/// Ordinary least squares through an SVD of the design matrix.
///
/// Rank is judged with the usual `sigma_max * max(rows, cols) * eps`
/// cut-off; a rank-deficient design is an error rather than a
/// minimum-norm solution.
pub fn ols(design: &DMatrix<f64>, target: &DVector<f64>) -> Result<OlsFit, StatsError> {
    let rows = design.nrows();
    let columns = design.ncols();
    if rows <= columns {
        return Err(StatsError::InsufficientSamples {
            needed: columns + 1,
            available: rows,
        });
    }

    if design.iter().chain(target.iter()).any(|value| !value.is_finite()) {
        return Err(StatsError::NonFinite);
    }

    let svd = design
        .clone()
        .try_svd(true, true, f64::EPSILON, SVD_MAX_ITER)
        .ok_or(StatsError::Singular { rank: 0, columns })?;
    let sigma_max = svd.singular_values.max();
    let cutoff = sigma_max * rows.max(columns) as f64 * f64::EPSILON;
    let rank = svd.rank(cutoff);
    if rank < columns {
        return Err(StatsError::Singular { rank, columns });
    }

    let coefficients = svd
        .solve(target, cutoff)
        .map_err(|_| StatsError::Singular { rank, columns })?;
    let residuals = target - design * &coefficients;

    Ok(OlsFit {
        coefficients,
        ssr: residuals.norm_squared(),
        df_resid: rows - columns,
    })
}

/// Pairs of `(a[i], b[i])` where both values are finite, truncated to the
/// shorter slice.
pub fn finite_pairs(a: &[f64], b: &[f64]) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .zip(b.iter())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .unzip()
}

/// In-sample R² of `y ~ a + b x`, floored at zero. Pairs with a non-finite
/// value are skipped. Degenerate inputs (fewer than two points, constant
/// `x` or `y`) give 0.
pub fn simple_regression_r2(x: &[f64], y: &[f64]) -> f64 {
    let (x, y) = finite_pairs(x, y);
    if x.len() < 2 {
        return 0.0;
    }
    let (x, y) = (x.as_slice(), y.as_slice());

    let mean_x = mean(x);
    let mean_y = mean(y);
    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return 0.0;
    }

    let r2 = (sxy * sxy) / (sxx * syy);
    if r2.is_finite() {
        r2.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// R² of predicting `target[t]` from `predictor[t - lag]`.
///
/// The shifted slices are trimmed to a common length; empty slices (including
/// `lag == 0`) give 0.
pub fn lagged_r2(predictor: &[f64], target: &[f64], lag: usize) -> f64 {
    if lag == 0 || predictor.len() <= lag || target.len() <= lag {
        return 0.0;
    }

    let features = &predictor[..predictor.len() - lag];
    let response = &target[lag..];
    let n = features.len().min(response.len());
    if n == 0 {
        return 0.0;
    }

    simple_regression_r2(&features[..n], &response[..n])
}

pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin().abs()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut acc = LANCZOS_COEFFS[0];
    for (i, coeff) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
        acc += coeff / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}

/// Regularized incomplete beta function I_x(a, b).
pub fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();

    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// Modified Lentz evaluation of the incomplete beta continued fraction.
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < BETA_CF_FPMIN {
        d = BETA_CF_FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=BETA_CF_MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < BETA_CF_FPMIN {
            d = BETA_CF_FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < BETA_CF_FPMIN {
            c = BETA_CF_FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < BETA_CF_FPMIN {
            d = BETA_CF_FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < BETA_CF_FPMIN {
            c = BETA_CF_FPMIN;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < BETA_CF_EPS {
            break;
        }
    }

    h
}

/// Upper tail P(F > f) of the F distribution with (d1, d2) degrees of freedom.
pub fn f_survival(f: f64, d1: f64, d2: f64) -> f64 {
    if f.is_nan() {
        return f64::NAN;
    }
    if f <= 0.0 {
        return 1.0;
    }
    if f.is_infinite() {
        return 0.0;
    }
    regularized_incomplete_beta(d2 / 2.0, d1 / 2.0, d2 / (d2 + d1 * f)).clamp(0.0, 1.0)
}

/// Outcome of a Granger F-test over lags `1..=max_lag`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrangerTest {
    /// Smallest p-value across lags
    pub p_value: f64,
    /// Lag achieving `p_value`
    pub best_lag: usize,
    pub f_statistic: f64,
    /// p-value per lag, index 0 is lag 1
    pub lag_p_values: Vec<f64>,
}

/// Sum-of-squared-residuals F-test of whether lags of `cause` improve an
/// autoregression of `effect`.
///
/// For each lag `p` the restricted model regresses `effect[t]` on a constant
/// and `effect[t-1..=t-p]`; the unrestricted model adds `cause[t-1..=t-p]`.
/// Both are fitted on the `n - p` rows that have a full lag window.
///
/// Rows where either series is non-finite are dropped before lagging.
pub fn granger_test(
    cause: &[f64],
    effect: &[f64],
    max_lag: usize,
) -> Result<GrangerTest, StatsError> {
    if max_lag == 0 {
        return Err(StatsError::InvalidLag);
    }

    let (cause, effect) = finite_pairs(cause, effect);
    let n = cause.len();
    if n < 2 * max_lag {
        return Err(StatsError::InsufficientSamples {
            needed: 2 * max_lag,
            available: n,
        });
    }

    let mut lag_p_values = Vec::with_capacity(max_lag);
    let mut f_statistics = Vec::with_capacity(max_lag);

    for lag in 1..=max_lag {
        let rows = n - lag;
        let unrestricted_columns = 2 * lag + 1;
        if rows <= unrestricted_columns {
            return Err(StatsError::InsufficientSamples {
                needed: lag + unrestricted_columns + 1,
                available: n,
            });
        }

        let target = DVector::from_fn(rows, |row, _| effect[row + lag]);
        let restricted = DMatrix::from_fn(rows, lag + 1, |row, col| {
            if col == 0 {
                1.0
            } else {
                effect[row + lag - col]
            }
        });
        let unrestricted = DMatrix::from_fn(rows, unrestricted_columns, |row, col| {
            if col == 0 {
                1.0
            } else if col <= lag {
                effect[row + lag - col]
            } else {
                cause[row + lag - (col - lag)]
            }
        });

        let restricted_fit = ols(&restricted, &target)?;
        let unrestricted_fit = ols(&unrestricted, &target)?;

        let df_resid = unrestricted_fit.df_resid as f64;
        let f_statistic = (restricted_fit.ssr - unrestricted_fit.ssr) / unrestricted_fit.ssr
            / lag as f64
            * df_resid;
        if !f_statistic.is_finite() {
            return Err(StatsError::NonFinite);
        }

        lag_p_values.push(f_survival(f_statistic, lag as f64, df_resid));
        f_statistics.push(f_statistic);
    }

    let (best_idx, p_value) = lag_p_values
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::INFINITY), |best, (idx, p)| {
            if p < best.1 {
                (idx, p)
            } else {
                best
            }
        });

    Ok(GrangerTest {
        p_value,
        best_lag: best_idx + 1,
        f_statistic: f_statistics[best_idx],
        lag_p_values,
    })
}
