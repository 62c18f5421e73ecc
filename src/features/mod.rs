//! Feature engineering for the combined dataset.
//!
//! - per-record derived fields: coverage timing, size flag, bins (`derive`)
//! - dense integer codes for categorical columns (`factorize`)

pub mod derive;
pub mod factorize;

pub use derive::*;
pub use factorize::*;
