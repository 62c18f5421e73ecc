//! Dummy (one-hot) coding of categorical features.
//!
//! Categories are the distinct non-missing values sorted ascending. One
//! indicator column is produced per category, then the reference category's
//! column is omitted. A missing value is zero in every indicator.

use crate::domain::ReferencePolicy;

/// One indicator column.
#[derive(Debug, Clone, PartialEq)]
pub struct DummyColumn {
    pub name: String,
    pub category: f64,
    pub values: Vec<f64>,
}

/// Distinct non-missing values, ascending.
pub fn categories(values: &[Option<f64>]) -> Vec<f64> {
    let mut cats: Vec<f64> = values.iter().flatten().copied().collect();
    cats.sort_by(f64::total_cmp);
    cats.dedup();
    cats
}

/// Column name for a category: integral values print without a fraction.
pub fn category_label(prefix: &str, category: f64) -> String {
    if category.fract() == 0.0 && category.abs() < 1e15 {
        format!("{prefix}_{}", category as i64)
    } else {
        format!("{prefix}_{category}")
    }
}

/// The category omitted under `policy`, if there are any categories.
pub fn reference_category(cats: &[f64], policy: ReferencePolicy) -> Option<f64> {
    match policy {
        ReferencePolicy::Highest => cats.last().copied(),
        ReferencePolicy::Lowest => cats.first().copied(),
    }
}

/// One-hot encode `values`, dropping the reference category.
pub fn make_dummies(values: &[Option<f64>], prefix: &str, policy: ReferencePolicy) -> Vec<DummyColumn> {
    let cats = categories(values);
    let reference = reference_category(&cats, policy);

    cats.into_iter()
        .filter(|c| Some(*c) != reference)
        .map(|category| DummyColumn {
            name: category_label(prefix, category),
            category,
            values: values
                .iter()
                .map(|v| if *v == Some(category) { 1.0 } else { 0.0 })
                .collect(),
        })
        .collect()
}
