//! Combined-file ingest for the model stage, plus shared value parsers.
//!
//! The model stage only needs a handful of columns from the combined file.
//! Two of them are not produced by `drp pull` and must be supplied upstream:
//!
//! - `LR`: loss ratio per record (numeric)
//! - `ClassPrice`: class price per record (numeric)
//!
//! Header matching is case-sensitive because the combined file carries both
//! `pf` (raw protection factor) and `PF` (its bin).

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::error::AppError;

pub const COL_LOSS_RATIO: &str = "LR";
pub const COL_CLASS_PRICE: &str = "ClassPrice";

/// The subset of a combined row the model stage consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelRow {
    pub loss_ratio: Option<f64>,
    pub pyear: Option<f64>,
    pub purchasedate: Option<NaiveDate>,
    pub class_price: Option<f64>,
    pub mil: Option<f64>,
    pub coverage_level: Option<f64>,
    pub protection_factor: Option<f64>,
    pub length_code: Option<f64>,
    pub statecode_code: Option<f64>,
}

/// Ingest output: header names + parsed rows.
#[derive(Debug, Clone)]
pub struct ModelInput {
    pub columns: Vec<String>,
    pub rows: Vec<ModelRow>,
}

/// Resolved column positions for the fields in `ModelRow`.
struct ColumnMap {
    loss_ratio: usize,
    pyear: usize,
    purchasedate: usize,
    class_price: usize,
    mil: usize,
    coverage_level: usize,
    protection_factor: usize,
    length_code: usize,
    statecode_code: usize,
}

/// Load the combined CSV for modeling.
pub fn load_model_input(path: &Path) -> Result<ModelInput, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open combined CSV '{}': {e}", path.display())))?;
    read_model_input(file)
}

/// Read combined CSV content for modeling from any reader.
pub fn read_model_input<R: Read>(reader: R) -> Result<ModelInput, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::data(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let columns: Vec<String> = headers.iter().map(normalize_header_name).collect();
    let header_map = build_header_map(&columns);
    let map = resolve_columns(&header_map)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| AppError::data(format!("CSV parse error on line {line}: {e}")))?;
        rows.push(parse_row(&record, &map));
    }

    Ok(ModelInput { columns, rows })
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn build_header_map(columns: &[String]) -> HashMap<&str, usize> {
    columns
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect()
}

fn resolve_columns(header_map: &HashMap<&str, usize>) -> Result<ColumnMap, AppError> {
    let require = |names: &[&str]| -> Result<usize, AppError> {
        names
            .iter()
            .find_map(|name| header_map.get(name).copied())
            .ok_or_else(|| AppError::data(format!("Missing required column: `{}`", names.join("` or `"))))
    };

    Ok(ColumnMap {
        loss_ratio: require(&[COL_LOSS_RATIO])?,
        pyear: require(&["pyear"])?,
        purchasedate: require(&["purchasedate"])?,
        class_price: require(&[COL_CLASS_PRICE])?,
        mil: require(&["mil"])?,
        coverage_level: require(&["CL", "cl"])?,
        protection_factor: require(&["PF"])?,
        length_code: require(&["length_code"])?,
        statecode_code: require(&["statecode_code"])?,
    })
}

fn parse_row(record: &StringRecord, map: &ColumnMap) -> ModelRow {
    let num = |idx: usize| parse_opt_f64(get(record, idx));
    ModelRow {
        loss_ratio: num(map.loss_ratio),
        pyear: num(map.pyear),
        purchasedate: get(record, map.purchasedate).and_then(parse_date),
        class_price: num(map.class_price),
        mil: num(map.mil),
        coverage_level: num(map.coverage_level),
        protection_factor: num(map.protection_factor),
        length_code: num(map.length_code),
        statecode_code: num(map.statecode_code),
    }
}

fn get(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a purchase date; anything unrecognized is `None`.
///
/// Dates are ISO (`YYYY-MM-DD`) in files we write, but the published source
/// files have used US month-first forms and timestamps.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    const FMTS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%m-%d-%Y", "%Y%m%d"];
    let s = s.trim();
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    // Timestamps such as `2023-02-15 00:00:00` or `2023-02-15T00:00:00`.
    let head = s.split([' ', 'T']).next()?;
    if head.len() < s.len() {
        return NaiveDate::parse_from_str(head, "%Y-%m-%d").ok();
    }
    None
}

pub fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let s = s?;
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Parse an integer code, accepting `19`, `019` and `19.0`.
pub fn parse_opt_i64(s: Option<&str>) -> Option<i64> {
    let s = s?;
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let v = parse_opt_f64(Some(s))?;
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "cyear,pf,PF,cl,pyear,purchasedate,mil,length_code,statecode_code,LR,ClassPrice";

    #[test]
    fn parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 2, 15);
        assert_eq!(parse_date("2023-02-15"), expected);
        assert_eq!(parse_date("02/15/2023"), expected);
        assert_eq!(parse_date("2023-02-15 00:00:00"), expected);
        assert_eq!(parse_date("15.02.2023"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn parse_integer_codes() {
        assert_eq!(parse_opt_i64(Some("019")), Some(19));
        assert_eq!(parse_opt_i64(Some("2023.0")), Some(2023));
        assert_eq!(parse_opt_i64(Some("1.5")), None);
        assert_eq!(parse_opt_i64(Some("abc")), None);
        assert_eq!(parse_opt_i64(None), None);
    }

    #[test]
    fn reads_case_sensitive_columns() {
        let csv = format!("{HEADER}\n2023,1.25,2,3,2022,2022-08-14,1,2,5,1.3,17.5\n");
        let input = read_model_input(csv.as_bytes()).unwrap();
        assert_eq!(input.rows.len(), 1);
        let row = &input.rows[0];
        assert_eq!(row.protection_factor, Some(2.0));
        assert_eq!(row.coverage_level, Some(3.0));
        assert_eq!(row.pyear, Some(2022.0));
        assert_eq!(row.loss_ratio, Some(1.3));
        assert_eq!(row.class_price, Some(17.5));
        assert_eq!(row.purchasedate, NaiveDate::from_ymd_opt(2022, 8, 14));
    }

    #[test]
    fn upper_case_coverage_column_wins() {
        let csv = "cl,CL,PF,pyear,purchasedate,mil,length_code,statecode_code,LR,ClassPrice\n3,1,1,2022,,0,1,1,,\n";
        let input = read_model_input(csv.as_bytes()).unwrap();
        assert_eq!(input.rows[0].coverage_level, Some(1.0));
        assert_eq!(input.rows[0].loss_ratio, None);
        assert_eq!(input.rows[0].purchasedate, None);
    }

    #[test]
    fn missing_loss_ratio_column_is_reported() {
        let csv = "cl,PF,pyear,purchasedate,mil,length_code,statecode_code,ClassPrice\n";
        let err = read_model_input(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("`LR`"), "{err}");
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
    }
}
