//! `drp-logit` library crate.
//!
//! The binary (`drp`) is a thin wrapper around this library so that:
//!
//! - both stages are testable without spawning processes
//! - remote fetch and file storage stay injectable at the edges

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod io;
pub mod math;
pub mod model;
pub mod report;
