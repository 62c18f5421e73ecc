//! Remote data acquisition: yearly archive fetch and extraction.

pub mod archive;
pub mod rma;

pub use archive::*;
pub use rma::*;
