//! Dense integer codes for categorical columns.
//!
//! Codes are 1-based and assigned in order of first appearance; a missing
//! value gets code `0`. Codes are only comparable within the batch they were
//! assigned over.

use std::collections::HashMap;
use std::hash::Hash;

use crate::domain::CombinedRecord;

/// Factorize a column into dense 1-based codes (`0` for `None`).
pub fn factorize<T, I>(values: I) -> Vec<u32>
where
    T: Eq + Hash,
    I: IntoIterator<Item = Option<T>>,
{
    let mut seen: HashMap<T, u32> = HashMap::new();
    values
        .into_iter()
        .map(|value| match value {
            None => 0,
            Some(v) => {
                let next = seen.len() as u32 + 1;
                *seen.entry(v).or_insert(next)
            }
        })
        .collect()
}

/// Assign `cyear_code`, `qtr_code`, `length_code` and `statecode_code` over `batch`.
pub fn assign_codes(batch: &mut [CombinedRecord]) {
    let cyear = factorize(batch.iter().map(|r| r.cyear));
    let qtr = factorize(batch.iter().map(|r| r.qtr));
    let length = factorize(batch.iter().map(|r| r.length));
    let statecode = factorize(batch.iter().map(|r| r.statecode));

    for (i, row) in batch.iter_mut().enumerate() {
        row.cyear_code = cyear[i];
        row.qtr_code = qtr[i];
        row.length_code = length[i];
        row.statecode_code = statecode[i];
    }
}
