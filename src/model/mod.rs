//! Model stage: from combined rows to a fitted logistic regression.
//!
//! Responsibilities:
//!
//! - derive the outcome and drop incomplete periods (`dataset`)
//! - dummy-code categorical features (`dummies`)
//! - assemble a clean design matrix (`design`)
//! - multicollinearity diagnostics (`vif`)
//! - maximum-likelihood fit and inference (`logit`)
//! - average marginal effects (`margeff`)

pub mod dataset;
pub mod design;
pub mod dummies;
pub mod logit;
pub mod margeff;
pub mod vif;

pub use dataset::*;
pub use design::*;
pub use dummies::*;
pub use logit::*;
pub use margeff::*;
pub use vif::*;
