//! Read/write the combined dataset CSV.
//!
//! Column order is fixed: the 24 retained source columns (with `cl` holding
//! the coverage-level bin) followed by the derived columns in the order they
//! are computed.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::domain::CombinedRecord;
use crate::error::AppError;

/// Header of the combined CSV.
pub const COMBINED_COLUMNS: [&str; 35] = [
    "cyear",
    "statecode",
    "stateabbreviation",
    "countycode",
    "countyname",
    "typecode",
    "typecodename",
    "praticecode",
    "praticecodename",
    "purchasedate",
    "cl",
    "pf",
    "CLWF",
    "CMWF",
    "bf",
    "p",
    "EEP",
    "EI",
    "declared",
    "sub",
    "tp",
    "pp",
    "liability",
    "indemnity",
    "pyear",
    "qtr",
    "coverage_start_date",
    "length",
    "mil",
    "PF",
    "cyear_code",
    "qtr_code",
    "length_code",
    "statecode_code",
    "wt",
];

/// Write the combined dataset to `path`.
pub fn write_combined_csv(path: &Path, rows: &[CombinedRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create combined CSV '{}': {e}", path.display())))?;
    write_combined(file, rows)
}

/// Write the combined dataset to any writer.
///
/// The header is always written, even for an empty dataset.
pub fn write_combined<W: Write>(writer: W, rows: &[CombinedRecord]) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);

    writer
        .write_record(COMBINED_COLUMNS)
        .map_err(|e| AppError::io(format!("Failed to write combined CSV header: {e}")))?;

    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::io(format!("Failed to write combined CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush combined CSV: {e}")))?;
    Ok(())
}

/// Read a combined dataset written by `write_combined`.
pub fn read_combined<R: Read>(reader: R) -> Result<Vec<CombinedRecord>, AppError> {
    let mut reader = csv::ReaderBuilder::new().from_reader(reader);
    let mut out = Vec::new();
    for (idx, result) in reader.deserialize::<CombinedRecord>().enumerate() {
        let row = result.map_err(|e| AppError::data(format!("Invalid combined CSV row {}: {e}", idx + 2)))?;
        out.push(row);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::{DerivedFields, FactorCodes, RawRecord};

    fn sample_row() -> CombinedRecord {
        let raw = RawRecord {
            cyear: Some(2023),
            statecode: Some(19),
            stateabbreviation: "IA".to_string(),
            countycode: Some(153),
            countyname: "Polk, County".to_string(),
            praticecode: Some(801),
            purchasedate: NaiveDate::from_ymd_opt(2022, 8, 14),
            cl: Some(0.95),
            pf: Some(1.25),
            declared: Some(1_000_000.0),
            ..RawRecord::default()
        };
        let derived = DerivedFields {
            pyear: Some(2022),
            qtr: Some(10),
            coverage_start_date: NaiveDate::from_ymd_opt(2022, 10, 1),
            length: Some(2),
            mil: 1,
            cl: 3,
            pf: 2,
            wt: Some(1.0),
        };
        let codes = FactorCodes { cyear: 1, qtr: 1, length: 1, statecode: 1 };
        CombinedRecord::from_parts(raw, derived, codes)
    }

    #[test]
    fn header_matches_record_layout() {
        let mut buf = Vec::new();
        write_combined(&mut buf, &[sample_row()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), COMBINED_COLUMNS.join(","));
        let fields = lines.next().unwrap();
        // Quoted county name contains a comma; count through the csv reader instead.
        let mut reader = csv::ReaderBuilder::new().has_headers(false).from_reader(fields.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(record.len(), COMBINED_COLUMNS.len());
    }

    #[test]
    fn write_then_read_preserves_rows() {
        let mut second = sample_row();
        second.pyear = None;
        second.qtr = None;
        second.coverage_start_date = None;
        second.length = None;
        second.length_code = 0;
        second.purchasedate = None;

        let rows = vec![sample_row(), second];
        let mut buf = Vec::new();
        write_combined(&mut buf, &rows).unwrap();
        let back = read_combined(buf.as_slice()).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn empty_dataset_still_has_header() {
        let mut buf = Vec::new();
        write_combined(&mut buf, &[]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.trim_end(), COMBINED_COLUMNS.join(","));
    }
}
