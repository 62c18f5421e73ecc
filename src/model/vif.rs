//! Variance inflation factors.
//!
//! For column `i`, regress it on all other columns and take
//! `VIF_i = 1 / (1 - R²_i)`. R² is centered when the other columns contain a
//! constant column, uncentered otherwise. The diagnostic never gates fitting.

use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::error::AppError;
use crate::math::{residual_sum_of_squares, solve_least_squares};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VifEntry {
    pub feature: String,
    pub vif: f64,
}

/// VIF for every column, in column order.
pub fn variance_inflation_factors(x: &DMatrix<f64>, names: &[String]) -> Result<Vec<VifEntry>, AppError> {
    if names.len() != x.ncols() {
        return Err(AppError::model("VIF: column names do not match the design matrix."));
    }

    let mut out = Vec::with_capacity(x.ncols());
    for (i, name) in names.iter().enumerate() {
        let vif = column_vif(x, i)
            .ok_or_else(|| AppError::model(format!("VIF: auxiliary regression for `{name}` is singular.")))?;
        out.push(VifEntry {
            feature: name.clone(),
            vif,
        });
    }
    Ok(out)
}

/// Sort entries by VIF, largest first (infinite values lead).
pub fn sort_descending(entries: &mut [VifEntry]) {
    entries.sort_by(|a, b| b.vif.total_cmp(&a.vif));
}

fn column_vif(x: &DMatrix<f64>, i: usize) -> Option<f64> {
    if x.ncols() < 2 {
        return Some(1.0);
    }

    let target: DVector<f64> = x.column(i).into_owned();
    let others = x.clone().remove_column(i);

    let beta = solve_least_squares(&others, &target)?;
    let ssr = residual_sum_of_squares(&others, &target, &beta);

    let tss = if has_constant_column(&others) {
        let mean = target.mean();
        target.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
    } else {
        target.norm_squared()
    };

    if ssr <= 0.0 {
        return Some(f64::INFINITY);
    }
    Some(tss / ssr)
}

fn has_constant_column(x: &DMatrix<f64>) -> bool {
    x.column_iter().any(|col| {
        let first = col[0];
        first != 0.0 && col.iter().all(|v| *v == first)
    })
}
