//! Parse one yearly pipe-delimited source file into `RawRecord`s.
//!
//! The files carry 31 unnamed columns in a fixed order (`SOURCE_COLUMNS`).
//! Column count is strict; individual values are lenient (a value that does
//! not parse becomes `None`).

use std::collections::HashMap;

use csv::StringRecord;

use crate::domain::{DROPPED_COLUMNS, RawRecord, SOURCE_COLUMNS};
use crate::error::AppError;
use crate::io::ingest::{parse_date, parse_opt_f64, parse_opt_i64};

/// Parse a whole source file.
///
/// When `has_header` is set the first line is consumed as a header row and
/// discarded; the fixed column names are used either way.
pub fn parse_source(bytes: &[u8], has_header: bool) -> Result<Vec<RawRecord>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let columns = column_index();
    let first_line = if has_header { 2 } else { 1 };

    let mut out = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + first_line;
        let record = result.map_err(|e| AppError::data(format!("Source parse error on line {line}: {e}")))?;
        if record.len() != SOURCE_COLUMNS.len() {
            return Err(AppError::data(format!(
                "Source line {line} has {} columns, expected {}.",
                record.len(),
                SOURCE_COLUMNS.len()
            )));
        }
        out.push(parse_record(&record, &columns));
    }

    Ok(out)
}

fn column_index() -> HashMap<&'static str, usize> {
    SOURCE_COLUMNS
        .iter()
        .enumerate()
        .map(|(idx, name)| (*name, idx))
        .collect()
}

fn parse_record(record: &StringRecord, columns: &HashMap<&'static str, usize>) -> RawRecord {
    let text = |name: &str| get(record, columns, name).unwrap_or_default().to_string();
    let num = |name: &str| parse_opt_f64(get(record, columns, name));
    let int = |name: &str| parse_opt_i64(get(record, columns, name));

    RawRecord {
        cyear: int("cyear").and_then(|v| i32::try_from(v).ok()),
        statecode: int("statecode"),
        stateabbreviation: text("stateabbreviation"),
        countycode: int("countycode"),
        countyname: text("countyname"),
        typecode: int("typecode"),
        typecodename: text("typecodename"),
        praticecode: int("praticecode"),
        praticecodename: text("praticecodename"),
        purchasedate: get(record, columns, "purchasedate").and_then(parse_date),
        cl: num("cl"),
        pf: num("pf"),
        clwf: num("CLWF"),
        cmwf: num("CMWF"),
        bf: num("bf"),
        p: num("p"),
        eep: num("EEP"),
        ei: num("EI"),
        declared: num("declared"),
        sub: num("sub"),
        tp: num("tp"),
        pp: num("pp"),
        liability: num("liability"),
        indemnity: num("indemnity"),
    }
}

fn get<'a>(record: &'a StringRecord, columns: &HashMap<&'static str, usize>, name: &str) -> Option<&'a str> {
    let idx = columns.get(name)?;
    record.get(*idx).filter(|s| !s.is_empty())
}
