//! CLI command implementations

pub mod csp;
pub mod json_output;
pub mod validate;

mod reporting;
