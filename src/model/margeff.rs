//! Average marginal effects with delta-method standard errors.
//!
//! For a logit model with density `f_i = p_i(1 - p_i)`:
//!
//! ```text
//! AME_j = β_j · mean(f_i)
//! ∂AME_j/∂β_k = δ_jk · mean(f_i) + β_j · mean(f_i (1 - 2 p_i) x_ik)
//! Var(AME) = J V Jᵀ
//! ```
//!
//! Every regressor is treated as continuous, dummies included. The intercept
//! has no marginal effect and is left out of the result.

use nalgebra::DMatrix;
use serde::Serialize;

use crate::error::AppError;
use crate::math::{Z_975, two_sided_p};
use crate::model::logit::{LogitFit, predict_proba};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginalEffect {
    pub name: String,
    pub dydx: f64,
    pub std_err: f64,
    pub z: f64,
    pub p_value: f64,
    pub conf_int: (f64, f64),
}

/// Average marginal effects over the estimation sample `x`.
pub fn average_marginal_effects(x: &DMatrix<f64>, fit: &LogitFit) -> Result<Vec<MarginalEffect>, AppError> {
    let (n, k) = x.shape();
    if k != fit.params.len() {
        return Err(AppError::model("Marginal effects: design does not match the fitted model."));
    }
    if n == 0 {
        return Err(AppError::model("Marginal effects: empty estimation sample."));
    }
    let nf = n as f64;

    let p = predict_proba(x, &fit.params);
    let density: Vec<f64> = p.iter().map(|p| p * (1.0 - p)).collect();
    let mean_density = density.iter().sum::<f64>() / nf;

    // mean(f_i (1 - 2 p_i) x_ik) for every column k.
    let slope: Vec<f64> = (0..k)
        .map(|c| {
            (0..n)
                .map(|i| density[i] * (1.0 - 2.0 * p[i]) * x[(i, c)])
                .sum::<f64>()
                / nf
        })
        .collect();

    let jacobian = DMatrix::from_fn(k, k, |j, c| {
        let own = if j == c { mean_density } else { 0.0 };
        own + fit.params[j] * slope[c]
    });
    let cov = &jacobian * &fit.cov * jacobian.transpose();

    let effects = (0..k)
        .filter(|&j| Some(j) != fit.const_index)
        .map(|j| {
            let dydx = fit.params[j] * mean_density;
            let std_err = cov[(j, j)].max(0.0).sqrt();
            let z = dydx / std_err;
            MarginalEffect {
                name: fit.names[j].clone(),
                dydx,
                std_err,
                z,
                p_value: two_sided_p(z),
                conf_int: (dydx - Z_975 * std_err, dydx + Z_975 * std_err),
            }
        })
        .collect();
    Ok(effects)
}
