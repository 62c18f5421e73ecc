//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the practice-code lookup that places a record in its coverage quarter
//! - raw and combined participation records (`RawRecord`, `CombinedRecord`)
//! - stage configuration (`PullConfig`, `ModelConfig`) and its option enums

pub mod practice;
pub mod records;
pub mod types;

pub use practice::*;
pub use records::*;
pub use types::*;
