//! Report and fit exports.
//!
//! Text reports are written verbatim; the JSON export bundles everything a
//! downstream script needs to rebuild the tables without re-fitting.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::ReferencePolicies;
use crate::error::AppError;
use crate::model::{LogitFit, MarginalEffect, ModelDiagnostics, VifEntry};

/// Everything produced by one model run, in a serializable shape.
#[derive(Debug, Serialize)]
pub struct FitExport<'a> {
    pub generated_at: String,
    pub dependent_variable: &'a str,
    pub references: &'a ReferencePolicies,
    pub diagnostics: &'a ModelDiagnostics,
    pub fit: &'a LogitFit,
    pub vif: &'a [VifEntry],
    pub marginal_effects: &'a [MarginalEffect],
}

/// Write a text report to `path`, replacing any existing file.
pub fn write_text_report(path: &Path, text: &str) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create report '{}': {e}", path.display())))?;
    file.write_all(text.as_bytes())
        .map_err(|e| AppError::io(format!("Failed to write report '{}': {e}", path.display())))?;
    Ok(())
}

/// Write the JSON fit export to `path`.
pub fn write_fit_json(path: &Path, export: &FitExport<'_>) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create JSON export '{}': {e}", path.display())))?;
    write_fit_json_to(BufWriter::new(file), export)
}

/// Write the JSON fit export to any writer.
pub fn write_fit_json_to<W: Write>(mut writer: W, export: &FitExport<'_>) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut writer, export)
        .map_err(|e| AppError::io(format!("Failed to serialize fit export: {e}")))?;
    writeln!(writer).map_err(|e| AppError::io(format!("Failed to write fit export: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush fit export: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    #[test]
    fn json_export_shape() {
        let fit = LogitFit {
            names: vec!["const".to_string(), "mil".to_string()],
            params: vec![-0.5, 1.1],
            std_errors: vec![0.2, 0.3],
            z_values: vec![-2.5, 3.67],
            p_values: vec![0.012, 0.0002],
            conf_int: vec![(-0.89, -0.11), (0.51, 1.69)],
            cov: DMatrix::identity(2, 2),
            const_index: Some(0),
            nobs: 40,
            df_model: 1,
            df_resid: 38,
            log_likelihood: -20.0,
            ll_null: -27.0,
            llr: 14.0,
            llr_p_value: 0.0002,
            pseudo_r2: 0.26,
            iterations: 6,
            converged: true,
        };
        let vif = vec![VifEntry { feature: "mil".to_string(), vif: f64::INFINITY }];
        let export = FitExport {
            generated_at: "2025-01-01T00:00:00".to_string(),
            dependent_variable: "lr_event",
            references: &ReferencePolicies::default(),
            diagnostics: &ModelDiagnostics::default(),
            fit: &fit,
            vif: &vif,
            marginal_effects: &[],
        };

        let mut buf = Vec::new();
        write_fit_json_to(&mut buf, &export).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["dependent_variable"], "lr_event");
        assert_eq!(value["fit"]["names"][1], "mil");
        assert_eq!(value["fit"]["nobs"], 40);
        assert!(value["fit"].get("cov").is_none());
        assert_eq!(value["fit"]["conf_int"][1][0], 0.51);
        // Non-finite floats have no JSON representation.
        assert!(value["vif"][0]["vif"].is_null());
        assert_eq!(value["diagnostics"]["rows_loaded"], 0);
        assert_eq!(value["references"]["length"], "lowest");
    }
}
