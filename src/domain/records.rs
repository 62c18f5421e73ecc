//! Participation records.
//!
//! `RawRecord` is one parsed row of a yearly source file after the
//! administrative columns are dropped. `CombinedRecord` is the same row plus
//! every derived field; it is the row type of the combined CSV and its serde
//! names are the file's column header.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column names of the yearly source files, in file order.
pub const SOURCE_COLUMNS: [&str; 31] = [
    "ryear",
    "cyear",
    "statecode",
    "stateabbreviation",
    "countycode",
    "countyname",
    "comcode",
    "comname",
    "insurancecode",
    "insurancename",
    "covtypecode",
    "coveragetypedesrip",
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
];

/// Administrative columns that are not carried into the combined dataset.
pub const DROPPED_COLUMNS: [&str; 7] = [
    "ryear",
    "comcode",
    "comname",
    "insurancecode",
    "insurancename",
    "covtypecode",
    "coveragetypedesrip",
];

/// Sentinel "not applicable" state code.
pub const SENTINEL_STATE: i64 = 99;
/// Sentinel "not applicable" county code.
pub const SENTINEL_COUNTY: i64 = 999;

/// One row of a yearly source file (retained columns only).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    pub cyear: Option<i32>,
    pub statecode: Option<i64>,
    pub stateabbreviation: String,
    pub countycode: Option<i64>,
    pub countyname: String,
    pub typecode: Option<i64>,
    pub typecodename: String,
    pub praticecode: Option<i64>,
    pub praticecodename: String,
    pub purchasedate: Option<NaiveDate>,
    /// Coverage level as published (fraction of value insured).
    pub cl: Option<f64>,
    /// Protection factor as published.
    pub pf: Option<f64>,
    pub clwf: Option<f64>,
    pub cmwf: Option<f64>,
    pub bf: Option<f64>,
    pub p: Option<f64>,
    pub eep: Option<f64>,
    pub ei: Option<f64>,
    /// Declared liability.
    pub declared: Option<f64>,
    pub sub: Option<f64>,
    pub tp: Option<f64>,
    pub pp: Option<f64>,
    pub liability: Option<f64>,
    pub indemnity: Option<f64>,
}

impl RawRecord {
    /// True when either administrative code carries its sentinel value.
    pub fn is_sentinel(&self) -> bool {
        self.statecode == Some(SENTINEL_STATE) || self.countycode == Some(SENTINEL_COUNTY)
    }
}

/// Per-record derived fields (everything but the factorized codes).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DerivedFields {
    pub pyear: Option<i32>,
    /// Starting month of the coverage quarter (1, 4, 7 or 10).
    pub qtr: Option<u32>,
    pub coverage_start_date: Option<NaiveDate>,
    /// Whole months from purchase date to coverage start.
    pub length: Option<i32>,
    pub mil: u8,
    pub cl: u8,
    pub pf: u8,
    pub wt: Option<f64>,
}

/// Dense 1-based codes; 0 marks a missing source value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FactorCodes {
    pub cyear: u32,
    pub qtr: u32,
    pub length: u32,
    pub statecode: u32,
}

/// One row of the combined dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecord {
    pub cyear: Option<i32>,
    pub statecode: Option<i64>,
    pub stateabbreviation: String,
    pub countycode: Option<i64>,
    pub countyname: String,
    pub typecode: Option<i64>,
    pub typecodename: String,
    pub praticecode: Option<i64>,
    pub praticecodename: String,
    pub purchasedate: Option<NaiveDate>,
    /// Coverage-level bin (the raw level is replaced by its bin).
    pub cl: u8,
    pub pf: Option<f64>,
    #[serde(rename = "CLWF")]
    pub clwf: Option<f64>,
    #[serde(rename = "CMWF")]
    pub cmwf: Option<f64>,
    pub bf: Option<f64>,
    pub p: Option<f64>,
    #[serde(rename = "EEP")]
    pub eep: Option<f64>,
    #[serde(rename = "EI")]
    pub ei: Option<f64>,
    pub declared: Option<f64>,
    pub sub: Option<f64>,
    pub tp: Option<f64>,
    pub pp: Option<f64>,
    pub liability: Option<f64>,
    pub indemnity: Option<f64>,

    pub pyear: Option<i32>,
    pub qtr: Option<u32>,
    pub coverage_start_date: Option<NaiveDate>,
    pub length: Option<i32>,
    pub mil: u8,
    #[serde(rename = "PF")]
    pub pf_bin: u8,
    pub cyear_code: u32,
    pub qtr_code: u32,
    pub length_code: u32,
    pub statecode_code: u32,
    pub wt: Option<f64>,
}

impl CombinedRecord {
    pub fn from_parts(raw: RawRecord, derived: DerivedFields, codes: FactorCodes) -> Self {
        Self {
            cyear: raw.cyear,
            statecode: raw.statecode,
            stateabbreviation: raw.stateabbreviation,
            countycode: raw.countycode,
            countyname: raw.countyname,
            typecode: raw.typecode,
            typecodename: raw.typecodename,
            praticecode: raw.praticecode,
            praticecodename: raw.praticecodename,
            purchasedate: raw.purchasedate,
            cl: derived.cl,
            pf: raw.pf,
            clwf: raw.clwf,
            cmwf: raw.cmwf,
            bf: raw.bf,
            p: raw.p,
            eep: raw.eep,
            ei: raw.ei,
            declared: raw.declared,
            sub: raw.sub,
            tp: raw.tp,
            pp: raw.pp,
            liability: raw.liability,
            indemnity: raw.indemnity,
            pyear: derived.pyear,
            qtr: derived.qtr,
            coverage_start_date: derived.coverage_start_date,
            length: derived.length,
            mil: derived.mil,
            pf_bin: derived.pf,
            cyear_code: codes.cyear,
            qtr_code: codes.qtr,
            length_code: codes.length,
            statecode_code: codes.statecode,
            wt: derived.wt,
        }
    }
}
