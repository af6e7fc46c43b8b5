//! Command-line front end for the flowplan simulation engine
//!
//! Loads a YAML or JSON configuration, runs `flowplan_core::simulate` and
//! prints either a table for people or the JSON result document.

pub mod data;
pub mod logging;
pub mod report;
pub mod util;

pub use data::{ConfigFormat, LoadError, load_config, parse_config};
pub use logging::init_logging;
pub use report::{OutputFormat, ReportOptions, render};
