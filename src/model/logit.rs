//! Binary logistic regression by maximum likelihood.
//!
//! We maximize
//!
//! ```text
//! ℓ(β) = Σ y_i η_i - ln(1 + exp(η_i)),    η = Xβ
//! ```
//!
//! with Newton–Raphson starting from β = 0:
//!
//! - gradient `g = Xᵀ(y - p)`
//! - information `H = Xᵀ diag(p(1-p)) X`
//! - step `Δ = H⁻¹ g`
//!
//! Iteration stops once `max |Δ| < tol`. Failing to get there within
//! `max_iter` steps is an error; so is a Hessian that is not positive definite.

use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use serde::Serialize;

use crate::domain::LogitOptions;
use crate::error::AppError;
use crate::math::{Z_975, chi2_sf, two_sided_p};

const PIVOT_TOL: f64 = 1e-12;

/// Fitted model with Wald inference and likelihood statistics.
#[derive(Debug, Clone, Serialize)]
pub struct LogitFit {
    pub names: Vec<String>,
    pub params: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub z_values: Vec<f64>,
    pub p_values: Vec<f64>,
    pub conf_int: Vec<(f64, f64)>,
    #[serde(skip)]
    pub cov: DMatrix<f64>,
    /// Index of the intercept column, if the design has one.
    pub const_index: Option<usize>,

    pub nobs: usize,
    pub df_model: usize,
    pub df_resid: usize,
    pub log_likelihood: f64,
    pub ll_null: f64,
    pub llr: f64,
    pub llr_p_value: f64,
    pub pseudo_r2: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Logistic function.
pub fn sigmoid(eta: f64) -> f64 {
    if eta >= 0.0 {
        1.0 / (1.0 + (-eta).exp())
    } else {
        let e = eta.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + exp(eta))` without overflow.
fn log1p_exp(eta: f64) -> f64 {
    if eta > 0.0 {
        eta + (-eta).exp().ln_1p()
    } else {
        eta.exp().ln_1p()
    }
}

/// Log-likelihood at `beta`.
pub fn log_likelihood(x: &DMatrix<f64>, y: &DVector<f64>, beta: &DVector<f64>) -> f64 {
    let eta = x * beta;
    eta.iter()
        .zip(y.iter())
        .map(|(&e, &yi)| yi * e - log1p_exp(e))
        .sum()
}

/// Log-likelihood of the intercept-only model.
pub fn null_log_likelihood(y: &DVector<f64>) -> f64 {
    let n = y.len() as f64;
    let p = y.sum() / n;
    if p <= 0.0 || p >= 1.0 {
        return 0.0;
    }
    y.iter().map(|&yi| yi * p.ln() + (1.0 - yi) * (1.0 - p).ln()).sum()
}

/// Fit a logistic regression of `y` on `x`.
pub fn fit_logit(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    names: &[String],
    opts: &LogitOptions,
) -> Result<LogitFit, AppError> {
    let (n, k) = x.shape();
    if names.len() != k {
        return Err(AppError::model("Column names do not match the design matrix."));
    }
    if y.len() != n {
        return Err(AppError::model("Outcome length does not match the design matrix."));
    }
    if k == 0 {
        return Err(AppError::model("Design matrix has no columns."));
    }
    if n <= k {
        return Err(AppError::model(format!(
            "Not enough observations to fit {k} parameters (n={n})."
        )));
    }
    if y.iter().any(|&v| v != 0.0 && v != 1.0) {
        return Err(AppError::model("Outcome must be binary (0/1)."));
    }
    let events = y.sum();
    if events == 0.0 || events == n as f64 {
        return Err(AppError::model(format!(
            "Outcome has no variation: every row has lr_event = {}.",
            if events == 0.0 { 0 } else { 1 }
        )));
    }

    let mut beta = DVector::<f64>::zeros(k);
    let mut converged = false;
    let mut iterations = 0;

    while iterations < opts.max_iter {
        iterations += 1;
        let (grad, info) = score_and_information(x, y, &beta);
        let chol = factor_information(info).ok_or_else(|| {
            AppError::model("Singular information matrix: the design is collinear or perfectly separates the outcome.")
        })?;
        let step = chol.solve(&grad);
        if !step.iter().all(|v| v.is_finite()) {
            return Err(AppError::model("Non-finite Newton step while fitting the logistic model."));
        }
        beta += &step;

        let max_step = step.amax();
        log::debug!(
            "newton iter {iterations}: max|step|={max_step:.3e} llf={:.6}",
            log_likelihood(x, y, &beta)
        );
        if max_step < opts.tol {
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(AppError::model(format!(
            "Logistic regression did not converge within {} iterations.",
            opts.max_iter
        )));
    }

    let (_, info) = score_and_information(x, y, &beta);
    let cov = factor_information(info)
        .map(|c| c.inverse())
        .ok_or_else(|| AppError::model("Singular information matrix at the optimum; cannot compute standard errors."))?;

    let params: Vec<f64> = beta.iter().copied().collect();
    let std_errors: Vec<f64> = (0..k).map(|j| cov[(j, j)].sqrt()).collect();
    let z_values: Vec<f64> = params.iter().zip(&std_errors).map(|(b, se)| b / se).collect();
    let p_values = z_values.iter().map(|&z| two_sided_p(z)).collect();
    let conf_int = params
        .iter()
        .zip(&std_errors)
        .map(|(b, se)| (b - Z_975 * se, b + Z_975 * se))
        .collect();

    let const_index = constant_column(x);
    let df_model = k - usize::from(const_index.is_some());
    let log_likelihood = log_likelihood(x, y, &beta);
    let ll_null = null_log_likelihood(y);
    let llr = 2.0 * (log_likelihood - ll_null);

    Ok(LogitFit {
        names: names.to_vec(),
        params,
        std_errors,
        z_values,
        p_values,
        conf_int,
        cov,
        const_index,
        nobs: n,
        df_model,
        df_resid: n - k,
        log_likelihood,
        ll_null,
        llr,
        llr_p_value: chi2_sf(llr, df_model as f64),
        pseudo_r2: 1.0 - log_likelihood / ll_null,
        iterations,
        converged,
    })
}

/// Fitted probabilities at `beta`.
pub fn predict_proba(x: &DMatrix<f64>, beta: &[f64]) -> Vec<f64> {
    let beta = DVector::from_column_slice(beta);
    (x * beta).iter().map(|&e| sigmoid(e)).collect()
}

fn score_and_information(x: &DMatrix<f64>, y: &DVector<f64>, beta: &DVector<f64>) -> (DVector<f64>, DMatrix<f64>) {
    let eta = x * beta;
    let p = eta.map(sigmoid);
    let resid = y - &p;
    let grad = x.transpose() * resid;

    let mut weighted = x.clone();
    for (i, mut row) in weighted.row_iter_mut().enumerate() {
        row *= p[i] * (1.0 - p[i]);
    }
    let info = x.transpose() * weighted;
    (grad, info)
}

/// Cholesky factor of the information matrix, or `None` when a pivot is
/// negligible relative to its diagonal entry.
fn factor_information(info: DMatrix<f64>) -> Option<Cholesky<f64, Dyn>> {
    let diag: Vec<f64> = info.diagonal().iter().copied().collect();
    let chol = info.cholesky()?;
    let l = chol.l_dirty();
    let degenerate = diag
        .iter()
        .enumerate()
        .any(|(j, &h)| !(h > 0.0) || l[(j, j)].powi(2) < PIVOT_TOL * h);
    if degenerate { None } else { Some(chol) }
}

/// First column whose entries are all the same non-zero value.
pub fn constant_column(x: &DMatrix<f64>) -> Option<usize> {
    if x.nrows() == 0 {
        return None;
    }
    x.column_iter().position(|col| {
        let first = col[0];
        first != 0.0 && col.iter().all(|v| *v == first)
    })
}
