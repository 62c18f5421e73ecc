//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - loads `.env` and initializes logging
//! - parses CLI arguments into stage configs
//! - runs the requested stage
//! - prints reports and writes the output files

use chrono::Datelike;
use clap::Parser;

use crate::cli::{Command, ModelArgs, PullArgs};
use crate::domain::{BuildOptions, LogitOptions, ModelConfig, PullConfig, ReferencePolicies};
use crate::error::AppError;
use crate::io::export::{FitExport, write_fit_json, write_text_report};
use crate::model::OUTCOME;
use crate::report::{format_columns, format_diagnostics, format_vif_table};

pub mod pipeline;

/// Entry point for the `drp` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Pull(args) => handle_pull(&args),
        Command::Model(args) => handle_model(&args),
    }
}

fn handle_pull(args: &PullArgs) -> Result<(), AppError> {
    let config = pull_config_from_args(args);
    let out = pipeline::run_pull(&config)?;
    println!("Wrote {} rows to {}", out.rows, out.output.display());
    Ok(())
}

fn handle_model(args: &ModelArgs) -> Result<(), AppError> {
    let config = model_config_from_args(args);
    let run = pipeline::run_model(&config)?;

    println!("{}", format_columns(&run.columns));
    println!("{}", format_diagnostics(&run.diagnostics));
    println!("{}", format_vif_table(&run.vif));
    println!("{}", run.summary_text);
    println!("{}", run.margeff_text);

    write_text_report(&config.summary_path, &run.summary_text)?;
    write_text_report(&config.margeff_path, &run.margeff_text)?;
    log::info!(
        "Reports written to {} and {}",
        config.summary_path.display(),
        config.margeff_path.display()
    );

    if let Some(path) = &config.export_json {
        let export = FitExport {
            generated_at: chrono::Local::now().to_rfc3339(),
            dependent_variable: OUTCOME,
            references: &config.references,
            diagnostics: &run.diagnostics,
            fit: &run.fit,
            vif: &run.vif,
            marginal_effects: &run.marginal_effects,
        };
        write_fit_json(path, &export)?;
        log::info!("Fit exported to {}", path.display());
    }

    Ok(())
}

pub fn pull_config_from_args(args: &PullArgs) -> PullConfig {
    PullConfig {
        years: args.years.clone(),
        url_template: args.url_template.clone(),
        output: args.output.clone(),
        build: BuildOptions {
            source_has_header: args.source_header,
            cl_binning: args.cl_binning,
            factorize_scope: args.factorize,
        },
    }
}

pub fn model_config_from_args(args: &ModelArgs) -> ModelConfig {
    ModelConfig {
        input: args.input.clone(),
        summary_path: args.summary.clone(),
        margeff_path: args.margeff.clone(),
        export_json: args.export_json.clone(),
        current_year: args.current_year.unwrap_or_else(|| chrono::Local::now().year()),
        references: ReferencePolicies {
            coverage_level: args.cl_reference,
            protection_factor: args.pf_reference,
            pyear: args.pyear_reference,
            length: args.length_reference,
            sellmonth: args.month_reference,
            state: args.state_reference,
        },
        logit: LogitOptions {
            max_iter: args.max_iter,
            tol: args.tol,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::{ClBinning, ReferencePolicy};

    #[test]
    fn pull_args_map_to_config() {
        let cli = Cli::try_parse_from(["drp", "pull", "--source-header", "--cl-binning", "raw"]).unwrap();
        let Command::Pull(args) = cli.command else {
            panic!("expected pull");
        };
        let config = pull_config_from_args(&args);
        assert!(config.build.source_has_header);
        assert_eq!(config.build.cl_binning, ClBinning::Raw);
        assert_eq!(config.years.len(), 7);
    }

    #[test]
    fn model_args_map_to_config() {
        let cli = Cli::try_parse_from(["drp", "model", "--current-year", "2023", "--tol", "1e-6"]).unwrap();
        let Command::Model(args) = cli.command else {
            panic!("expected model");
        };
        let config = model_config_from_args(&args);
        assert_eq!(config.current_year, 2023);
        assert_eq!(config.logit.tol, 1e-6);
        assert_eq!(config.references, ReferencePolicies::default());
        assert_eq!(config.references.length, ReferencePolicy::Lowest);
    }
}
