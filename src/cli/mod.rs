//! Command-line parsing for the DRP participation pipeline.
//!
//! Argument parsing and command dispatch stay separate from the data and
//! modeling code; `app` turns these structs into stage configs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{ClBinning, DEFAULT_URL_TEMPLATE, FactorizeScope, ReferencePolicy};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "drp", version, about = "DRP participation dataset builder and loss-event logit model")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download yearly participation archives and write the combined CSV.
    Pull(PullArgs),
    /// Fit the loss-event logistic regression on a combined CSV.
    ///
    /// The input must carry `LR` (loss ratio) and `ClassPrice` columns in
    /// addition to the fields written by `drp pull`.
    Model(ModelArgs),
}

/// Options for `drp pull`.
#[derive(Debug, Args, Clone)]
pub struct PullArgs {
    /// Years to download (comma separated).
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [2019, 2020, 2021, 2022, 2023, 2024, 2025]
    )]
    pub years: Vec<i32>,

    /// Archive URL template; `{year}` is replaced per year.
    #[arg(long, env = "DRP_URL_TEMPLATE", default_value = DEFAULT_URL_TEMPLATE)]
    pub url_template: String,

    /// Combined CSV to write.
    #[arg(short, long, default_value = "drp_combined.csv")]
    pub output: PathBuf,

    /// Treat the first line of each source file as a header and skip it.
    #[arg(long)]
    pub source_header: bool,

    /// Coverage-level binning.
    #[arg(long, value_enum, default_value_t = ClBinning::Legacy)]
    pub cl_binning: ClBinning,

    /// Scope of the categorical codes.
    #[arg(long, value_enum, default_value_t = FactorizeScope::PerYear)]
    pub factorize: FactorizeScope,
}

/// Options for `drp model`.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Combined CSV with `LR` and `ClassPrice`.
    #[arg(short, long, default_value = "drp_combined.csv")]
    pub input: PathBuf,

    /// Regression summary output.
    #[arg(long, default_value = "logit_summary.txt")]
    pub summary: PathBuf,

    /// Marginal effects output.
    #[arg(long, default_value = "logit_marginal_effects.txt")]
    pub margeff: PathBuf,

    /// Also write the fit, VIF and marginal effects as JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Rows with pyear at or after this year are excluded (default: this year).
    #[arg(long)]
    pub current_year: Option<i32>,

    /// Newton-Raphson iteration limit.
    #[arg(long, default_value_t = 35)]
    pub max_iter: usize,

    /// Convergence tolerance on the largest parameter step.
    #[arg(long, default_value_t = 1e-8)]
    pub tol: f64,

    #[arg(long, value_enum, default_value_t = ReferencePolicy::Highest)]
    pub cl_reference: ReferencePolicy,

    #[arg(long, value_enum, default_value_t = ReferencePolicy::Highest)]
    pub pf_reference: ReferencePolicy,

    #[arg(long, value_enum, default_value_t = ReferencePolicy::Highest)]
    pub pyear_reference: ReferencePolicy,

    #[arg(long, value_enum, default_value_t = ReferencePolicy::Lowest)]
    pub length_reference: ReferencePolicy,

    #[arg(long, value_enum, default_value_t = ReferencePolicy::Lowest)]
    pub month_reference: ReferencePolicy,

    #[arg(long, value_enum, default_value_t = ReferencePolicy::Highest)]
    pub state_reference: ReferencePolicy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn pull_defaults() {
        let cli = Cli::try_parse_from(["drp", "pull"]).unwrap();
        let Command::Pull(args) = cli.command else {
            panic!("expected pull");
        };
        assert_eq!(args.years, (2019..=2025).collect::<Vec<_>>());
        assert!(!args.source_header);
        assert_eq!(args.cl_binning, ClBinning::Legacy);
        assert_eq!(args.factorize, FactorizeScope::PerYear);
        assert_eq!(args.output, PathBuf::from("drp_combined.csv"));
    }

    #[test]
    fn pull_flags() {
        let cli = Cli::try_parse_from([
            "drp",
            "pull",
            "--years",
            "2021,2022",
            "--source-header",
            "--cl-binning",
            "raw",
            "--factorize",
            "global",
            "--url-template",
            "http://localhost/{year}.zip",
        ])
        .unwrap();
        let Command::Pull(args) = cli.command else {
            panic!("expected pull");
        };
        assert_eq!(args.years, vec![2021, 2022]);
        assert!(args.source_header);
        assert_eq!(args.cl_binning, ClBinning::Raw);
        assert_eq!(args.factorize, FactorizeScope::Global);
        assert_eq!(args.url_template, "http://localhost/{year}.zip");
    }

    #[test]
    fn model_flags() {
        let cli = Cli::try_parse_from([
            "drp",
            "model",
            "--current-year",
            "2024",
            "--length-reference",
            "highest",
            "--export-json",
            "fit.json",
        ])
        .unwrap();
        let Command::Model(args) = cli.command else {
            panic!("expected model");
        };
        assert_eq!(args.current_year, Some(2024));
        assert_eq!(args.length_reference, ReferencePolicy::Highest);
        assert_eq!(args.pf_reference, ReferencePolicy::Highest);
        assert_eq!(args.month_reference, ReferencePolicy::Lowest);
        assert_eq!(args.max_iter, 35);
        assert_eq!(args.export_json, Some(PathBuf::from("fit.json")));
    }
}
