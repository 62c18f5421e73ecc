//! Per-record derived fields.
//!
//! Every field is a pure function of one `RawRecord`. Missing inputs (an
//! unmapped practice code, an unparseable purchase date) degrade the dependent
//! fields to `None`; they never drop the row.

use chrono::{Datelike, NaiveDate};

use crate::domain::{ClBinning, DerivedFields, RawRecord, practice_window};

/// Declared liability at or above which a record counts as a million-dollar policy.
pub const MILLION: f64 = 1_000_000.0;

/// Compute all derived fields for one record.
pub fn derive_fields(raw: &RawRecord, cl_binning: ClBinning) -> DerivedFields {
    let window = raw.praticecode.and_then(practice_window);

    let pyear = match (window, raw.cyear) {
        (Some(w), Some(cyear)) => Some(w.physical_year(cyear)),
        _ => None,
    };
    let qtr = window.map(|w| w.start_month);

    let coverage_start_date = match (window, raw.cyear, raw.purchasedate) {
        (Some(w), Some(cyear), Some(_)) => w.start_date(cyear),
        _ => None,
    };

    // Positive when the purchase precedes coverage, negative after it.
    let length = match (raw.purchasedate, coverage_start_date) {
        (Some(purchase), Some(start)) => Some(whole_months_between(purchase, start)),
        _ => None,
    };

    DerivedFields {
        pyear,
        qtr,
        coverage_start_date,
        length,
        mil: million_flag(raw.declared),
        cl: coverage_level_bin(raw.cl, cl_binning),
        pf: protection_factor_bin(raw.pf),
        wt: raw.declared.map(|d| d / MILLION),
    }
}

/// Whole months from `start` to `end`, ignoring the day of month.
pub fn whole_months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32)
}

/// `1` when declared liability is at least one million, else `0` (missing included).
pub fn million_flag(declared: Option<f64>) -> u8 {
    match declared {
        Some(d) if d >= MILLION => 1,
        _ => 0,
    }
}

/// Collapse a coverage level into ordinal bins (1 = highest coverage).
pub fn coverage_level_bin(level: Option<f64>, binning: ClBinning) -> u8 {
    let level = match binning {
        ClBinning::Legacy => Some(0.0),
        ClBinning::Raw => level,
    };
    match level {
        Some(v) if v < 0.90 => 3,
        Some(v) if v < 0.94 => 2,
        Some(v) if v >= 0.95 => 1,
        _ => 0,
    }
}

/// Collapse a protection factor into ordinal bins; anything unmapped stays `0`.
pub fn protection_factor_bin(pf: Option<f64>) -> u8 {
    match pf {
        Some(v) if v == 1.5 => 1,
        Some(v) if v > 1.0 && v < 1.5 => 2,
        Some(v) if v == 1.0 => 3,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(cyear: i32, code: i64, purchase: Option<NaiveDate>) -> RawRecord {
        RawRecord {
            cyear: Some(cyear),
            statecode: Some(19),
            countycode: Some(1),
            praticecode: Some(code),
            purchasedate: purchase,
            declared: Some(500_000.0),
            pf: Some(1.2),
            cl: Some(0.95),
            ..RawRecord::default()
        }
    }

    #[test]
    fn whole_months_are_truncated() {
        assert_eq!(whole_months_between(date(2022, 10, 1), date(2023, 2, 15)), 4);
        assert_eq!(whole_months_between(date(2023, 2, 15), date(2022, 10, 1)), -4);
        assert_eq!(whole_months_between(date(2022, 8, 31), date(2022, 10, 1)), 2);
    }

    #[test]
    fn length_runs_from_purchase_to_coverage_start() {
        // Purchased 2023-02-15 for the window opening 2022-10-01: four whole
        // months after coverage began, stored as -4.
        let raw = record(2023, 801, Some(date(2023, 2, 15)));
        let d = derive_fields(&raw, ClBinning::Legacy);
        assert_eq!(d.coverage_start_date, Some(date(2022, 10, 1)));
        assert_eq!(d.length, Some(-4));
        assert_eq!(d.length.map(i32::abs), Some(4));
    }

    #[test]
    fn coverage_timing_follows_practice_code() {
        let raw = record(2023, 801, Some(date(2022, 6, 15)));
        let d = derive_fields(&raw, ClBinning::Legacy);
        assert_eq!(d.pyear, Some(2022));
        assert_eq!(d.qtr, Some(10));
        assert_eq!(d.coverage_start_date, Some(date(2022, 10, 1)));
        assert_eq!(d.length, Some(4));

        let raw = record(2023, 806, Some(date(2023, 11, 2)));
        let d = derive_fields(&raw, ClBinning::Legacy);
        assert_eq!(d.pyear, Some(2024));
        assert_eq!(d.qtr, Some(1));
        assert_eq!(d.length, Some(2));
    }

    #[test]
    fn unmapped_code_or_missing_date_degrades_to_none() {
        let d = derive_fields(&record(2023, 900, Some(date(2022, 6, 15))), ClBinning::Legacy);
        assert_eq!(d.pyear, None);
        assert_eq!(d.qtr, None);
        assert_eq!(d.coverage_start_date, None);
        assert_eq!(d.length, None);

        let d = derive_fields(&record(2023, 802, None), ClBinning::Legacy);
        assert_eq!(d.pyear, Some(2023));
        assert_eq!(d.qtr, Some(1));
        assert_eq!(d.coverage_start_date, None);
        assert_eq!(d.length, None);
    }

    #[test]
    fn million_flag_boundary() {
        assert_eq!(million_flag(Some(1_000_000.0)), 1);
        assert_eq!(million_flag(Some(2_500_000.0)), 1);
        assert_eq!(million_flag(Some(999_999.99)), 0);
        assert_eq!(million_flag(None), 0);
    }

    #[test]
    fn legacy_coverage_binning_puts_every_row_in_bin_three() {
        for level in [None, Some(0.7), Some(0.92), Some(0.95), Some(1.0)] {
            assert_eq!(coverage_level_bin(level, ClBinning::Legacy), 3);
        }
    }

    #[test]
    fn raw_coverage_binning_uses_thresholds() {
        assert_eq!(coverage_level_bin(Some(0.85), ClBinning::Raw), 3);
        assert_eq!(coverage_level_bin(Some(0.90), ClBinning::Raw), 2);
        assert_eq!(coverage_level_bin(Some(0.945), ClBinning::Raw), 0);
        assert_eq!(coverage_level_bin(Some(0.95), ClBinning::Raw), 1);
        assert_eq!(coverage_level_bin(None, ClBinning::Raw), 0);
    }

    #[test]
    fn protection_factor_bins() {
        assert_eq!(protection_factor_bin(Some(1.5)), 1);
        assert_eq!(protection_factor_bin(Some(1.25)), 2);
        assert_eq!(protection_factor_bin(Some(1.0)), 3);
        assert_eq!(protection_factor_bin(Some(0.8)), 0);
        assert_eq!(protection_factor_bin(None), 0);
    }

    #[test]
    fn weight_scales_declared_liability() {
        let d = derive_fields(&record(2023, 801, None), ClBinning::Legacy);
        assert_eq!(d.wt, Some(0.5));
        assert_eq!(d.mil, 0);
        assert_eq!(d.pf, 2);
    }
}
