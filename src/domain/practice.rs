//! Practice-code lookup.
//!
//! Each practice code names one quarterly coverage window inside the 3-year
//! span that starts the year before a record's crop year (`cyear`):
//!
//! | code | offset | start month | window            |
//! |------|--------|-------------|-------------------|
//! | 801  | 0      | 10          | Oct–Dec, year 1   |
//! | 802  | 1      | 1           | Jan–Mar, year 2   |
//! | 803  | 1      | 4           | Apr–Jun, year 2   |
//! | 804  | 1      | 7           | Jul–Sep, year 2   |
//! | 805  | 1      | 10          | Oct–Dec, year 2   |
//! | 806  | 2      | 1           | Jan–Mar, year 3   |
//! | 807  | 2      | 4           | Apr–Jun, year 3   |
//! | 808  | 2      | 7           | Jul–Sep, year 3   |

use chrono::NaiveDate;

/// Year offset and starting month of a practice code's coverage window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageWindow {
    pub year_offset: i32,
    pub start_month: u32,
}

const PRACTICE_WINDOWS: [(i64, CoverageWindow); 8] = [
    (801, CoverageWindow { year_offset: 0, start_month: 10 }),
    (802, CoverageWindow { year_offset: 1, start_month: 1 }),
    (803, CoverageWindow { year_offset: 1, start_month: 4 }),
    (804, CoverageWindow { year_offset: 1, start_month: 7 }),
    (805, CoverageWindow { year_offset: 1, start_month: 10 }),
    (806, CoverageWindow { year_offset: 2, start_month: 1 }),
    (807, CoverageWindow { year_offset: 2, start_month: 4 }),
    (808, CoverageWindow { year_offset: 2, start_month: 7 }),
];

/// Look up the coverage window for a practice code.
pub fn practice_window(code: i64) -> Option<CoverageWindow> {
    PRACTICE_WINDOWS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, window)| *window)
}

impl CoverageWindow {
    /// Physical year in which this window starts, for a record of crop year `cyear`.
    pub fn physical_year(self, cyear: i32) -> i32 {
        cyear - 1 + self.year_offset
    }

    /// First calendar day of the window.
    pub fn start_date(self, cyear: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.physical_year(cyear), self.start_month, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mapped_code_yields_offset_year_and_start_month() {
        let expected = [
            (801, 2022, 10),
            (802, 2023, 1),
            (803, 2023, 4),
            (804, 2023, 7),
            (805, 2023, 10),
            (806, 2024, 1),
            (807, 2024, 4),
            (808, 2024, 7),
        ];
        for (code, pyear, month) in expected {
            let window = practice_window(code).unwrap();
            assert_eq!(window.physical_year(2023), pyear, "code {code}");
            assert_eq!(window.start_month, month, "code {code}");
        }
    }

    #[test]
    fn unmapped_codes_have_no_window() {
        assert!(practice_window(800).is_none());
        assert!(practice_window(809).is_none());
        assert!(practice_window(0).is_none());
    }

    #[test]
    fn start_date_is_first_of_month() {
        let window = practice_window(801).unwrap();
        assert_eq!(window.start_date(2023), NaiveDate::from_ymd_opt(2022, 10, 1));
    }
}
