//! Configuration loading and management for the compensation engine.
//!
//! This module provides functionality to load school configuration from
//! YAML files, including school metadata, package rates, salary
//! calculation parameters and controller earnings parameters.
//!
//! # Example
//!
//! ```no_run
//! use salary_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/school").unwrap();
//! println!("Loaded config for: {}", config.school().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    ControllerConfigFile, ControllerEarningsConfig, LatenessTier, PackagesConfig,
    SalaryCalculationConfig, SchoolConfig, SchoolMetadata,
};
