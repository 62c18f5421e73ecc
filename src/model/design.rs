//! Design-matrix assembly.
//!
//! Column order: intercept, numeric covariates (`ClassPrice`, `mil`), then the
//! dummy blocks for coverage level, protection factor, physical year, length,
//! sell month and state. Cleaning happens in this order:
//!
//! 1. drop columns with no values at all
//! 2. drop rows with a missing value in any column or in the outcome
//! 3. drop zero-variance columns (the intercept is always kept)

use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::domain::ReferencePolicies;
use crate::error::AppError;
use crate::model::dataset::ModelFrame;
use crate::model::dummies::make_dummies;

/// Name of the intercept column.
pub const INTERCEPT: &str = "const";

/// Name of the dependent variable in reports.
pub const OUTCOME: &str = "lr_event";

/// What the cleaning steps removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DesignDiagnostics {
    pub rows_available: usize,
    pub rows_dropped_listwise: usize,
    pub all_null_columns: Vec<String>,
    pub constant_columns: Vec<String>,
}

/// Row and column accounting for one model run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelDiagnostics {
    pub rows_loaded: usize,
    /// Rows with a missing, current or future `pyear`.
    pub rows_excluded_period: usize,
    #[serde(flatten)]
    pub design: DesignDiagnostics,
}

/// Cleaned design matrix ready for fitting.
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    pub names: Vec<String>,
    pub x: DMatrix<f64>,
    pub y: DVector<f64>,
    pub diagnostics: DesignDiagnostics,
}

impl DesignMatrix {
    pub fn nobs(&self) -> usize {
        self.x.nrows()
    }
}

/// A named column that may contain missing values.
pub type RawColumn = (String, Vec<Option<f64>>);

/// Build the full model design from a prepared frame.
pub fn build_design(frame: &ModelFrame, refs: &ReferencePolicies) -> Result<DesignMatrix, AppError> {
    let n = frame.len();
    let mut columns: Vec<RawColumn> = vec![
        (INTERCEPT.to_string(), vec![Some(1.0); n]),
        ("ClassPrice".to_string(), frame.class_price.clone()),
        ("mil".to_string(), frame.mil.clone()),
    ];

    let blocks: [(&[Option<f64>], &str, _); 6] = [
        (frame.coverage_level.as_slice(), "CL", refs.coverage_level),
        (frame.protection_factor.as_slice(), "PF", refs.protection_factor),
        (frame.pyear.as_slice(), "pyear", refs.pyear),
        (frame.length_code.as_slice(), "length", refs.length),
        (frame.sellmonth.as_slice(), "month", refs.sellmonth),
        (frame.statecode_code.as_slice(), "state", refs.state),
    ];
    for (values, prefix, policy) in blocks {
        for dummy in make_dummies(values, prefix, policy) {
            columns.push((dummy.name, dummy.values.into_iter().map(Some).collect()));
        }
    }

    assemble_design(columns, &frame.outcome)
}

/// Clean raw columns into a dense design matrix.
pub fn assemble_design(columns: Vec<RawColumn>, outcome: &[Option<f64>]) -> Result<DesignMatrix, AppError> {
    let n = outcome.len();
    if let Some((name, _)) = columns.iter().find(|(_, v)| v.len() != n) {
        return Err(AppError::data(format!("Column `{name}` length does not match the outcome.")));
    }

    let mut diagnostics = DesignDiagnostics {
        rows_available: n,
        ..DesignDiagnostics::default()
    };

    // 1) Columns with nothing in them.
    let mut kept: Vec<RawColumn> = Vec::with_capacity(columns.len());
    for (name, values) in columns {
        if values.iter().all(Option::is_none) {
            diagnostics.all_null_columns.push(name);
        } else {
            kept.push((name, values));
        }
    }
    if !diagnostics.all_null_columns.is_empty() {
        log::warn!("Dropping all-null columns: {:?}", diagnostics.all_null_columns);
    }

    // 2) Listwise deletion.
    let valid_rows: Vec<usize> = (0..n)
        .filter(|&i| outcome[i].is_some() && kept.iter().all(|(_, v)| v[i].is_some()))
        .collect();
    diagnostics.rows_dropped_listwise = n - valid_rows.len();
    if diagnostics.rows_dropped_listwise > 0 {
        log::warn!(
            "Dropped {} of {} rows with missing values (listwise deletion).",
            diagnostics.rows_dropped_listwise,
            n
        );
    }
    if valid_rows.is_empty() {
        return Err(AppError::data("No complete rows remain for modeling."));
    }

    let dense: Vec<(String, Vec<f64>)> = kept
        .into_iter()
        .map(|(name, values)| {
            let column = valid_rows.iter().filter_map(|&i| values[i]).collect();
            (name, column)
        })
        .collect();

    // 3) Zero-variance columns.
    let mut names = Vec::with_capacity(dense.len());
    let mut data = Vec::with_capacity(dense.len());
    for (name, values) in dense {
        if name != INTERCEPT && is_constant(&values) {
            diagnostics.constant_columns.push(name);
        } else {
            names.push(name);
            data.push(values);
        }
    }
    if !diagnostics.constant_columns.is_empty() {
        log::warn!("Dropping constant columns: {:?}", diagnostics.constant_columns);
    }

    let rows = valid_rows.len();
    let x = DMatrix::from_fn(rows, names.len(), |r, c| data[c][r]);
    let y = DVector::from_iterator(rows, valid_rows.iter().filter_map(|&i| outcome[i]));

    Ok(DesignMatrix { names, x, y, diagnostics })
}

fn is_constant(values: &[f64]) -> bool {
    match values.first() {
        Some(first) => values.iter().all(|v| v == first),
        None => true,
    }
}
