//! Fixed-width text reports.
//!
//! Formatting stays here so the model code only produces numbers and the
//! layout can change in one place. The regression tables follow the familiar
//! 78-column econometrics layout: a two-column header block, a coefficient
//! table, and `=` rules between sections.

use chrono::NaiveDateTime;

use crate::model::{LogitFit, MarginalEffect, ModelDiagnostics, VifEntry};

/// Minimum report width.
pub const REPORT_WIDTH: usize = 78;

const MIN_NAME_WIDTH: usize = 11;

/// One line of a coefficient-style table.
struct TableRow<'a> {
    name: &'a str,
    estimate: f64,
    std_err: f64,
    z: f64,
    p_value: f64,
    conf_int: (f64, f64),
}

/// Regression summary: header statistics plus the coefficient table.
pub fn format_logit_summary(fit: &LogitFit, dep_var: &str, timestamp: NaiveDateTime) -> String {
    let rows: Vec<TableRow<'_>> = (0..fit.names.len())
        .map(|j| TableRow {
            name: &fit.names[j],
            estimate: fit.params[j],
            std_err: fit.std_errors[j],
            z: fit.z_values[j],
            p_value: fit.p_values[j],
            conf_int: fit.conf_int[j],
        })
        .collect();
    let width = table_width(&rows);

    let mut out = String::new();
    out.push_str(&centered("Logit Regression Results", width));
    out.push_str(&rule('=', width));
    out.push_str(&header_row("Dep. Variable:", dep_var, "No. Observations:", &fit.nobs.to_string()));
    out.push_str(&header_row("Model:", "Logit", "Df Residuals:", &fit.df_resid.to_string()));
    out.push_str(&header_row("Method:", "MLE", "Df Model:", &fit.df_model.to_string()));
    out.push_str(&header_row(
        "Date:",
        &timestamp.format("%a, %d %b %Y").to_string(),
        "Pseudo R-squ.:",
        &format!("{:.4}", fit.pseudo_r2),
    ));
    out.push_str(&header_row(
        "Time:",
        &timestamp.format("%H:%M:%S").to_string(),
        "Log-Likelihood:",
        &format!("{:.2}", fit.log_likelihood),
    ));
    out.push_str(&header_row(
        "converged:",
        if fit.converged { "True" } else { "False" },
        "LL-Null:",
        &format!("{:.2}", fit.ll_null),
    ));
    out.push_str(&header_row(
        "Covariance Type:",
        "nonrobust",
        "LLR p-value:",
        &fmt_p_value(fit.llr_p_value),
    ));
    out.push_str(&header_row("Iterations:", &fit.iterations.to_string(), "", ""));
    out.push_str(&rule('=', width));
    out.push_str(&format_table("coef", &rows, width));
    out.push_str(&rule('=', width));
    out
}

/// Average marginal effects report.
pub fn format_margeff_summary(effects: &[MarginalEffect], dep_var: &str) -> String {
    let rows: Vec<TableRow<'_>> = effects
        .iter()
        .map(|e| TableRow {
            name: &e.name,
            estimate: e.dydx,
            std_err: e.std_err,
            z: e.z,
            p_value: e.p_value,
            conf_int: e.conf_int,
        })
        .collect();
    let width = table_width(&rows);

    let mut out = String::new();
    out.push_str(&centered("Logit Marginal Effects", width));
    out.push_str(&rule('=', width));
    out.push_str(&header_row("Dep. Variable:", dep_var, "", ""));
    out.push_str(&header_row("Method:", "dydx", "", ""));
    out.push_str(&header_row("At:", "overall", "", ""));
    out.push_str(&rule('=', width));
    out.push_str(&format_table("dy/dx", &rows, width));
    out.push_str(&rule('=', width));
    out
}

/// VIF table, in the order given.
pub fn format_vif_table(entries: &[VifEntry]) -> String {
    let name_width = entries
        .iter()
        .map(|e| e.feature.chars().count())
        .max()
        .unwrap_or(0)
        .max("feature".len());

    let mut out = String::new();
    out.push_str("Variance inflation factors:\n");
    out.push_str(&format!("{:<name_width$} {:>12}\n", "feature", "VIF"));
    out.push_str(&format!("{:-<name_width$} {:-<12}\n", "", ""));
    for e in entries {
        let vif = if e.vif.is_finite() { format!("{:.4}", e.vif) } else { "inf".to_string() };
        out.push_str(&format!("{:<name_width$} {:>12}\n", e.feature, vif));
    }
    out
}

/// Row accounting and dropped columns.
pub fn format_diagnostics(diag: &ModelDiagnostics) -> String {
    let mut out = String::new();
    out.push_str("Model data:\n");
    out.push_str(&format!("- rows loaded: {}\n", diag.rows_loaded));
    out.push_str(&format!("- rows excluded (current/future pyear): {}\n", diag.rows_excluded_period));
    out.push_str(&format!(
        "- rows dropped (missing values): {} of {}\n",
        diag.design.rows_dropped_listwise, diag.design.rows_available
    ));
    out.push_str(&format!("- all-null columns dropped: {}\n", fmt_list(&diag.design.all_null_columns)));
    out.push_str(&format!("- constant columns dropped: {}\n", fmt_list(&diag.design.constant_columns)));
    out
}

/// Input column list, one comma-separated line.
pub fn format_columns(columns: &[String]) -> String {
    format!("Input columns ({}): {}\n", columns.len(), columns.join(", "))
}

fn format_table(estimate_label: &str, rows: &[TableRow<'_>], width: usize) -> String {
    let name_width = width - 67;
    let mut out = String::new();
    out.push_str(&format!(
        "{:<name_width$}{:>10}{:>11}{:>11}{:>11}{:>12}{:>12}\n",
        "", estimate_label, "std err", "z", "P>|z|", "[0.025", "0.975]"
    ));
    out.push_str(&rule('-', width));
    for r in rows {
        out.push_str(&format!(
            "{:<name_width$}{:>10.4}{:>11.3}{:>11.3}{:>11.3}{:>12.3}{:>12.3}\n",
            r.name, r.estimate, r.std_err, r.z, r.p_value, r.conf_int.0, r.conf_int.1
        ));
    }
    out
}

fn table_width(rows: &[TableRow<'_>]) -> usize {
    let longest = rows.iter().map(|r| r.name.chars().count() + 1).max().unwrap_or(0);
    (longest.max(MIN_NAME_WIDTH) + 67).max(REPORT_WIDTH)
}

fn header_row(left_label: &str, left_value: &str, right_label: &str, right_value: &str) -> String {
    let line = format!("{left_label:<21}{left_value:>17}   {right_label:<21}{right_value:>16}");
    format!("{}\n", line.trim_end())
}

fn centered(title: &str, width: usize) -> String {
    format!("{:^width$}\n", title)
}

fn rule(ch: char, width: usize) -> String {
    let mut line: String = std::iter::repeat_n(ch, width).collect();
    line.push('\n');
    line
}

fn fmt_p_value(p: f64) -> String {
    if p.is_nan() {
        "nan".to_string()
    } else {
        format!("{p:.4e}")
    }
}

fn fmt_list(items: &[String]) -> String {
    if items.is_empty() { "none".to_string() } else { items.join(", ") }
}
