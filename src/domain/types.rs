//! Stage configuration and option enums.
//!
//! These are derived from CLI flags (plus defaults) and passed explicitly into
//! each stage's entry point.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default yearly archive location; `{year}` is substituted per year.
pub const DEFAULT_URL_TEMPLATE: &str = "https://pubfs-rma.fpac.usda.gov/pub/Web_Data_Files/Summary_of_Business/livestock_and_dairy_participation/drp_{year}_0002.zip";

/// How the coverage-level bin (`cl`) is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClBinning {
    /// Zero the level before thresholding, so every row lands in bin 3.
    ///
    /// This reproduces the historical combined files exactly.
    Legacy,
    /// Threshold the published coverage level:
    /// `< 0.90 → 3`, `[0.90, 0.94) → 2`, `>= 0.95 → 1`, otherwise `0`.
    Raw,
}

/// Scope over which categorical codes are factorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FactorizeScope {
    /// Codes restart for every year batch (historical behavior).
    PerYear,
    /// Codes are assigned once over the concatenated dataset.
    Global,
}

/// Which category of a dummy-coded feature is the omitted reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReferencePolicy {
    Highest,
    Lowest,
}

/// Options that shape how source rows become combined rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Skip the first line of each source file as a header row.
    ///
    /// Published files are headerless, so this is off by default.
    pub source_has_header: bool,
    pub cl_binning: ClBinning,
    pub factorize_scope: FactorizeScope,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            source_has_header: false,
            cl_binning: ClBinning::Legacy,
            factorize_scope: FactorizeScope::PerYear,
        }
    }
}

/// Configuration of the ingestion stage.
#[derive(Debug, Clone)]
pub struct PullConfig {
    pub years: Vec<i32>,
    pub url_template: String,
    pub output: PathBuf,
    pub build: BuildOptions,
}

/// Reference-category policy per dummy-coded feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReferencePolicies {
    pub coverage_level: ReferencePolicy,
    pub protection_factor: ReferencePolicy,
    pub pyear: ReferencePolicy,
    pub length: ReferencePolicy,
    pub sellmonth: ReferencePolicy,
    pub state: ReferencePolicy,
}

impl Default for ReferencePolicies {
    fn default() -> Self {
        Self {
            coverage_level: ReferencePolicy::Highest,
            protection_factor: ReferencePolicy::Highest,
            pyear: ReferencePolicy::Highest,
            length: ReferencePolicy::Lowest,
            sellmonth: ReferencePolicy::Lowest,
            state: ReferencePolicy::Highest,
        }
    }
}

/// Newton–Raphson settings for the logistic fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogitOptions {
    pub max_iter: usize,
    /// Convergence threshold on the largest absolute parameter step.
    pub tol: f64,
}

impl Default for LogitOptions {
    fn default() -> Self {
        Self {
            max_iter: 35,
            tol: 1e-8,
        }
    }
}

/// Configuration of the model stage.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub input: PathBuf,
    pub summary_path: PathBuf,
    pub margeff_path: PathBuf,
    pub export_json: Option<PathBuf>,
    /// Rows with `pyear >= current_year` are excluded as incomplete.
    pub current_year: i32,
    pub references: ReferencePolicies,
    pub logit: LogitOptions,
}
