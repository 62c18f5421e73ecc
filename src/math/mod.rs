//! Mathematical utilities: least squares and distribution functions.

pub mod dist;
pub mod ols;

pub use dist::*;
pub use ols::*;
