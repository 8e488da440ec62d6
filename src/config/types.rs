//! Configuration types for compensation calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// Metadata about the school.
#[derive(Debug, Clone, Deserialize)]
pub struct SchoolMetadata {
    /// The school's display name.
    pub name: String,
    /// Currency code amounts are denominated in (e.g., "ETB").
    pub currency: String,
    /// The version or effective date of this configuration set.
    pub version: String,
}

/// Packages configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct PackagesConfig {
    /// Map of package label to monthly salary rate.
    pub packages: HashMap<String, Decimal>,
}

/// One lateness tier: a minute range mapped to a percentage of the
/// student's daily rate.
///
/// Ranges are half-open `[from_minutes, to_minutes)`; a missing
/// `to_minutes` makes the last tier open-ended. Tiers must be listed in
/// ascending order and non-overlapping by configuration contract; this
/// is not runtime-checked.
#[derive(Debug, Clone, Deserialize)]
pub struct LatenessTier {
    /// Inclusive lower bound in minutes.
    pub from_minutes: u32,
    /// Exclusive upper bound in minutes; open-ended when absent.
    pub to_minutes: Option<u32>,
    /// Percentage of the daily rate deducted (e.g., 25 for 25%).
    pub percent: Decimal,
}

impl LatenessTier {
    /// Whether a lateness of `minutes` falls in this tier.
    pub fn contains(&self, minutes: u32) -> bool {
        minutes >= self.from_minutes && self.to_minutes.map_or(true, |to| minutes < to)
    }
}

/// Salary calculation configuration from salary.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct SalaryCalculationConfig {
    /// Whether Sundays count as working/teaching days.
    pub include_sundays: bool,
    /// Lateness below this many minutes is excused (zero deduction).
    pub excused_threshold_minutes: u32,
    /// Ordered lateness tiers, scanned first match wins.
    pub lateness_tiers: Vec<LatenessTier>,
    /// Map of package label to the flat absence deduction priced into
    /// new absence records.
    pub package_deductions: HashMap<String, Decimal>,
    /// Monthly rate used when no package matches, surfaced together
    /// with an unconfigured-package anomaly.
    pub default_monthly_rate: Decimal,
}

/// Controller earnings parameters for a specific effective date.
#[derive(Debug, Clone, Deserialize)]
pub struct ControllerEarningsConfig {
    /// The date these parameters take effect.
    pub effective_date: NaiveDate,
    /// Base pay per active student.
    pub main_base_rate: Decimal,
    /// Base used when pricing referral bonuses.
    pub referral_base_rate: Decimal,
    /// Multiplier applied per leave beyond the threshold.
    pub leave_penalty_multiplier: Decimal,
    /// Leaves tolerated per period before the penalty starts.
    pub leave_threshold: u32,
    /// Multiplier applied per unpaid active student.
    pub unpaid_penalty_multiplier: Decimal,
    /// Multiplier applied per qualifying referral.
    pub referral_bonus_multiplier: Decimal,
    /// Monthly earnings target used for the achievement percentage.
    pub target_earnings: Decimal,
    /// Days the payment window is padded on each side to absorb
    /// billing-cycle skew.
    pub payment_grace_days: u32,
}

/// Controller configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct ControllerConfigFile {
    /// Effective-dated parameter versions.
    pub versions: Vec<ControllerEarningsConfig>,
}

/// The complete school configuration loaded from YAML files.
///
/// This struct aggregates all configuration loaded from the various
/// YAML files in a school configuration directory.
#[derive(Debug, Clone)]
pub struct SchoolConfig {
    /// School metadata.
    metadata: SchoolMetadata,
    /// Package label to monthly rate table.
    packages: HashMap<String, Decimal>,
    /// Salary calculation parameters.
    salary: SalaryCalculationConfig,
    /// Controller parameter versions by effective date (sorted oldest first).
    controller_versions: Vec<ControllerEarningsConfig>,
}

impl SchoolConfig {
    /// Creates a new SchoolConfig from its component parts.
    pub fn new(
        metadata: SchoolMetadata,
        packages: HashMap<String, Decimal>,
        salary: SalaryCalculationConfig,
        controller_versions: Vec<ControllerEarningsConfig>,
    ) -> Self {
        let mut sorted_versions = controller_versions;
        sorted_versions.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        Self {
            metadata,
            packages,
            salary,
            controller_versions: sorted_versions,
        }
    }

    /// Returns the school metadata.
    pub fn school(&self) -> &SchoolMetadata {
        &self.metadata
    }

    /// Returns the package rate table.
    pub fn packages(&self) -> &HashMap<String, Decimal> {
        &self.packages
    }

    /// Returns the salary calculation parameters.
    pub fn salary(&self) -> &SalaryCalculationConfig {
        &self.salary
    }

    /// Returns all controller parameter versions.
    pub fn controller_versions(&self) -> &[ControllerEarningsConfig] {
        &self.controller_versions
    }

    /// Returns the controller parameters effective on a given date, the
    /// most recent version on or before it.
    pub fn controller_config_for(
        &self,
        date: NaiveDate,
    ) -> crate::error::EngineResult<&ControllerEarningsConfig> {
        self.controller_versions
            .iter()
            .rev()
            .find(|v| v.effective_date <= date)
            .ok_or(crate::error::EngineError::ControllerConfigNotFound { date })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_contains_half_open_range() {
        let tier = LatenessTier {
            from_minutes: 10,
            to_minutes: Some(20),
            percent: "25".parse().unwrap(),
        };
        assert!(!tier.contains(9));
        assert!(tier.contains(10));
        assert!(tier.contains(19));
        assert!(!tier.contains(20));
    }

    #[test]
    fn test_open_ended_tier_has_no_upper_bound() {
        let tier = LatenessTier {
            from_minutes: 30,
            to_minutes: None,
            percent: "100".parse().unwrap(),
        };
        assert!(tier.contains(30));
        assert!(tier.contains(10_000));
        assert!(!tier.contains(29));
    }

    #[test]
    fn test_config_sorts_controller_versions() {
        let metadata = SchoolMetadata {
            name: "Test School".to_string(),
            currency: "ETB".to_string(),
            version: "2025-01-01".to_string(),
        };
        let salary_yaml = r#"
            include_sundays: false
            excused_threshold_minutes: 5
            lateness_tiers:
              - from_minutes: 5
                to_minutes: 10
                percent: "10"
            package_deductions: {}
            default_monthly_rate: "2000"
        "#;
        let salary: SalaryCalculationConfig = serde_yaml::from_str(salary_yaml).unwrap();

        let newer = ControllerEarningsConfig {
            effective_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            main_base_rate: "45".parse().unwrap(),
            referral_base_rate: "45".parse().unwrap(),
            leave_penalty_multiplier: "3".parse().unwrap(),
            leave_threshold: 5,
            unpaid_penalty_multiplier: "1".parse().unwrap(),
            referral_bonus_multiplier: "2".parse().unwrap(),
            target_earnings: "2000".parse().unwrap(),
            payment_grace_days: 7,
        };
        let older = ControllerEarningsConfig {
            effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            main_base_rate: "40".parse().unwrap(),
            ..newer.clone()
        };

        let config = SchoolConfig::new(metadata, HashMap::new(), salary, vec![newer, older]);
        let versions = config.controller_versions();
        assert_eq!(
            versions[0].effective_date,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(
            versions[1].effective_date,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
    }
}
