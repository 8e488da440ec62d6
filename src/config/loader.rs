//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading school
//! configuration from YAML files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{
    ControllerConfigFile, ControllerEarningsConfig, PackagesConfig, SalaryCalculationConfig,
    SchoolConfig, SchoolMetadata,
};

/// Loads and provides access to school configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and provides methods to query package rates, salary parameters, and
/// controller earnings parameters.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/school/
/// ├── school.yaml      # School metadata
/// ├── packages.yaml    # Package label to monthly rate table
/// ├── salary.yaml      # Proration, lateness tiers, absence deductions
/// └── controller.yaml  # Effective-dated controller earnings parameters
/// ```
///
/// # Example
///
/// ```no_run
/// use salary_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/school").unwrap();
///
/// let date = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
/// let params = loader.controller_config(date).unwrap();
/// println!("Base rate per active student: {}", params.main_base_rate);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: SchoolConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/school")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - Any required field is missing from the configuration
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        // Load school.yaml
        let school_path = path.join("school.yaml");
        let metadata = Self::load_yaml::<SchoolMetadata>(&school_path)?;

        // Load packages.yaml
        let packages_path = path.join("packages.yaml");
        let packages_config = Self::load_yaml::<PackagesConfig>(&packages_path)?;

        // Load salary.yaml
        let salary_path = path.join("salary.yaml");
        let salary = Self::load_yaml::<SalaryCalculationConfig>(&salary_path)?;

        // Load controller.yaml
        let controller_path = path.join("controller.yaml");
        let controller_file = Self::load_yaml::<ControllerConfigFile>(&controller_path)?;

        let config = SchoolConfig::new(
            metadata,
            packages_config.packages,
            salary,
            controller_file.versions,
        );

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying school configuration.
    pub fn config(&self) -> &SchoolConfig {
        &self.config
    }

    /// Returns the school metadata.
    pub fn school(&self) -> &SchoolMetadata {
        self.config.school()
    }

    /// Returns the package rate table.
    pub fn packages(&self) -> &HashMap<String, Decimal> {
        self.config.packages()
    }

    /// Returns the salary calculation parameters.
    pub fn salary(&self) -> &SalaryCalculationConfig {
        self.config.salary()
    }

    /// Gets the controller earnings parameters effective on a given date.
    ///
    /// The method finds the most recent version whose effective date is
    /// on or before the given date.
    pub fn controller_config(&self, date: NaiveDate) -> EngineResult<&ControllerEarningsConfig> {
        self.config.controller_config_for(date)
    }
}
