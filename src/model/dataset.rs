//! Column-oriented view of the rows the model is fitted on.

use chrono::Datelike;

use crate::io::ingest::ModelRow;

/// Loss ratio at or above which a record counts as a loss event.
pub const LOSS_EVENT_THRESHOLD: f64 = 1.0;

/// Model inputs after outcome derivation and period filtering.
#[derive(Debug, Clone, Default)]
pub struct ModelFrame {
    /// `lr_event`: 1 when `LR >= 1`, 0 otherwise (a missing `LR` included).
    pub outcome: Vec<Option<f64>>,
    pub class_price: Vec<Option<f64>>,
    pub mil: Vec<Option<f64>>,
    pub coverage_level: Vec<Option<f64>>,
    pub protection_factor: Vec<Option<f64>>,
    pub pyear: Vec<Option<f64>>,
    pub length_code: Vec<Option<f64>>,
    /// Calendar month of the purchase date.
    pub sellmonth: Vec<Option<f64>>,
    pub statecode_code: Vec<Option<f64>>,

    pub rows_loaded: usize,
    /// Rows dropped because `pyear` is missing or not before `current_year`.
    pub rows_excluded_period: usize,
}

impl ModelFrame {
    pub fn len(&self) -> usize {
        self.outcome.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcome.is_empty()
    }
}

/// Binary loss-event outcome for a loss ratio.
///
/// A missing loss ratio is not an event, so the row stays in the sample.
pub fn loss_event(loss_ratio: Option<f64>) -> Option<f64> {
    match loss_ratio {
        Some(lr) if lr >= LOSS_EVENT_THRESHOLD => Some(1.0),
        _ => Some(0.0),
    }
}

/// Keep rows whose physical year is strictly before `current_year` and split
/// them into model columns.
pub fn prepare_frame(rows: &[ModelRow], current_year: i32) -> ModelFrame {
    let mut frame = ModelFrame {
        rows_loaded: rows.len(),
        ..ModelFrame::default()
    };

    for row in rows {
        let in_period = matches!(row.pyear, Some(y) if y < f64::from(current_year));
        if !in_period {
            frame.rows_excluded_period += 1;
            continue;
        }

        frame.outcome.push(loss_event(row.loss_ratio));
        frame.class_price.push(row.class_price);
        frame.mil.push(row.mil);
        frame.coverage_level.push(row.coverage_level);
        frame.protection_factor.push(row.protection_factor);
        frame.pyear.push(row.pyear);
        frame.length_code.push(row.length_code);
        frame.sellmonth.push(row.purchasedate.map(|d| f64::from(d.month())));
        frame.statecode_code.push(row.statecode_code);
    }

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(pyear: Option<f64>, lr: Option<f64>) -> ModelRow {
        ModelRow {
            loss_ratio: lr,
            pyear,
            purchasedate: NaiveDate::from_ymd_opt(2022, 8, 14),
            ..ModelRow::default()
        }
    }

    #[test]
    fn loss_event_threshold() {
        assert_eq!(loss_event(Some(1.0)), Some(1.0));
        assert_eq!(loss_event(Some(2.4)), Some(1.0));
        assert_eq!(loss_event(Some(0.999)), Some(0.0));
        assert_eq!(loss_event(None), Some(0.0));
    }

    #[test]
    fn current_and_future_years_are_excluded() {
        let rows = vec![
            row(Some(2024.0), Some(1.2)),
            row(Some(2025.0), Some(0.2)),
            row(Some(2026.0), Some(0.2)),
            row(None, Some(0.2)),
        ];
        let frame = prepare_frame(&rows, 2025);
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.rows_loaded, 4);
        assert_eq!(frame.rows_excluded_period, 3);
        assert_eq!(frame.outcome, vec![Some(1.0)]);
        assert_eq!(frame.sellmonth, vec![Some(8.0)]);
    }

    #[test]
    fn missing_loss_ratio_counts_as_no_event() {
        let rows = vec![row(Some(2021.0), None), row(Some(2021.0), Some(1.5))];
        let frame = prepare_frame(&rows, 2025);
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.outcome, vec![Some(0.0), Some(1.0)]);
    }

    #[test]
    fn missing_purchase_date_gives_missing_month() {
        let mut r = row(Some(2020.0), Some(0.5));
        r.purchasedate = None;
        let frame = prepare_frame(&[r], 2025);
        assert_eq!(frame.sellmonth, vec![None]);
    }
}
