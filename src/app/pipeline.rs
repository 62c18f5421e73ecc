//! Stage pipelines shared by the CLI commands.
//!
//! Both stages are plain functions over injected inputs:
//!
//! - ingestion: years + `ArchiveSource` -> combined rows
//! - modeling: model rows + config -> fit, diagnostics and report text
//!
//! `run_pull` and `run_model` add the file-system and network edges.

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::data::{ArchiveSource, HttpArchiveSource, extract_first_entry};
use crate::domain::{BuildOptions, CombinedRecord, FactorCodes, FactorizeScope, ModelConfig, PullConfig};
use crate::error::AppError;
use crate::features::{assign_codes, derive_fields};
use crate::io::ingest::{ModelInput, load_model_input};
use crate::io::source::parse_source;
use crate::model::{
    DesignMatrix, LogitFit, MarginalEffect, ModelDiagnostics, OUTCOME, VifEntry, average_marginal_effects,
    build_design, fit_logit, prepare_frame, sort_descending, variance_inflation_factors,
};
use crate::report::{format_logit_summary, format_margeff_summary};

/// Result of `drp pull`.
#[derive(Debug, Clone)]
pub struct PullOutput {
    pub output: PathBuf,
    pub rows: usize,
}

/// All computed outputs of one model run.
#[derive(Debug, Clone)]
pub struct ModelRun {
    pub columns: Vec<String>,
    pub diagnostics: ModelDiagnostics,
    pub design: DesignMatrix,
    /// Sorted by VIF, largest first.
    pub vif: Vec<VifEntry>,
    pub fit: LogitFit,
    pub marginal_effects: Vec<MarginalEffect>,
    pub summary_text: String,
    pub margeff_text: String,
}

/// Fetch, parse and derive every requested year, then concatenate.
///
/// Any failing year aborts the whole build; nothing partial is returned.
pub fn build_combined(
    years: &[i32],
    source: &dyn ArchiveSource,
    options: &BuildOptions,
) -> Result<Vec<CombinedRecord>, AppError> {
    let mut combined = Vec::new();
    for &year in years {
        let batch = build_year(year, source, options)?;
        log::info!("{year}: {} rows", batch.len());
        combined.extend(batch);
    }

    if options.factorize_scope == FactorizeScope::Global {
        assign_codes(&mut combined);
    }
    log::info!("Combined dataset: {} rows from {} years", combined.len(), years.len());
    Ok(combined)
}

fn build_year(year: i32, source: &dyn ArchiveSource, options: &BuildOptions) -> Result<Vec<CombinedRecord>, AppError> {
    let archive = source.fetch(year)?;
    let (entry, content) = extract_first_entry(&archive)?;
    log::debug!("{year}: extracted '{entry}' ({} bytes)", content.len());

    let raw = parse_source(&content, options.source_has_header)
        .map_err(|e| AppError::new(e.exit_code(), format!("{year} ({entry}): {e}")))?;
    let parsed = raw.len();

    let mut batch: Vec<CombinedRecord> = raw
        .into_iter()
        .filter(|r| !r.is_sentinel())
        .map(|r| {
            let derived = derive_fields(&r, options.cl_binning);
            CombinedRecord::from_parts(r, derived, FactorCodes::default())
        })
        .collect();
    if batch.len() < parsed {
        log::info!("{year}: dropped {} sentinel rows", parsed - batch.len());
    }

    if options.factorize_scope == FactorizeScope::PerYear {
        assign_codes(&mut batch);
    }
    Ok(batch)
}

/// Ingestion stage: download every year and write the combined CSV.
pub fn run_pull(config: &PullConfig) -> Result<PullOutput, AppError> {
    if config.years.is_empty() {
        return Err(AppError::io("No years requested."));
    }
    let source = HttpArchiveSource::new(config.url_template.as_str())?;
    let rows = build_combined(&config.years, &source, &config.build)?;

    crate::io::combined::write_combined_csv(&config.output, &rows)?;
    log::info!("Wrote {} rows to {}", rows.len(), config.output.display());

    Ok(PullOutput {
        output: config.output.clone(),
        rows: rows.len(),
    })
}

/// Model stage over already-loaded input.
pub fn fit_model(input: &ModelInput, config: &ModelConfig, timestamp: NaiveDateTime) -> Result<ModelRun, AppError> {
    let frame = prepare_frame(&input.rows, config.current_year);
    log::info!(
        "Model input: {} rows loaded, {} excluded (pyear missing or >= {})",
        frame.rows_loaded,
        frame.rows_excluded_period,
        config.current_year
    );
    if frame.is_empty() {
        return Err(AppError::data(format!(
            "No rows with pyear before {} to model.",
            config.current_year
        )));
    }

    let design = build_design(&frame, &config.references)?;
    let diagnostics = ModelDiagnostics {
        rows_loaded: frame.rows_loaded,
        rows_excluded_period: frame.rows_excluded_period,
        design: design.diagnostics.clone(),
    };
    log::info!("Design matrix: {} rows x {} columns", design.nobs(), design.names.len());

    let mut vif = variance_inflation_factors(&design.x, &design.names)?;
    sort_descending(&mut vif);

    let fit = fit_logit(&design.x, &design.y, &design.names, &config.logit)?;
    log::info!(
        "Logit converged in {} iterations (llf={:.4}, pseudo R2={:.4})",
        fit.iterations,
        fit.log_likelihood,
        fit.pseudo_r2
    );
    let marginal_effects = average_marginal_effects(&design.x, &fit)?;

    let summary_text = format_logit_summary(&fit, OUTCOME, timestamp);
    let margeff_text = format_margeff_summary(&marginal_effects, OUTCOME);

    Ok(ModelRun {
        columns: input.columns.clone(),
        diagnostics,
        design,
        vif,
        fit,
        marginal_effects,
        summary_text,
        margeff_text,
    })
}

/// Model stage: load the combined CSV and fit.
pub fn run_model(config: &ModelConfig) -> Result<ModelRun, AppError> {
    let input = load_model_input(&config.input)?;
    fit_model(&input, config, chrono::Local::now().naive_local())
}
