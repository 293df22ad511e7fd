//! CLI command implementations.

pub mod check;
pub mod connectors;
pub mod get;
pub mod set;
