//! # cft-io: Scenario File I/O
//!
//! Parser for the line-oriented `key = value` scenario format describing
//! providers, machines, prices and workload. See [`scenario_file`] for the
//! format and [`scenario_file::load_scenario`] for the entry point.

pub mod scenario_file;

pub use scenario_file::{load_scenario, parse_scenario};
