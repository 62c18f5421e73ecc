//! Reporting: fixed-width text for the console and the report files.

pub mod format;

pub use format::*;
