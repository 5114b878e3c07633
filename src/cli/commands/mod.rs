//! CLI command implementations.

pub mod progress;
pub mod run;
pub mod status;
