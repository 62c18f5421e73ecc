//! Input/output helpers.
//!
//! - pipe-delimited source parsing (`source`)
//! - combined CSV read/write (`combined`)
//! - model-stage CSV ingest + validation (`ingest`)
//! - text report and JSON exports (`export`)

pub mod combined;
pub mod export;
pub mod ingest;
pub mod source;

pub use combined::*;
pub use export::*;
pub use ingest::*;
pub use source::*;
