//! Package-rate resolution functionality.
//!
//! This module maps an enrollment's package label to its configured
//! monthly rate, tolerant of the naming noise real enrollment data
//! carries (casing, stray whitespace, verbose label variants).
//!
//! ## Lookup order
//!
//! First hit wins:
//! 1. Exact match against the configured table.
//! 2. Normalized match (lowercased, trimmed) against an index built
//!    once at construction.
//! 3. Substring match: the normalized label contains a configured key
//!    or vice versa, scanned in key order for determinism.
//! 4. The configured default monthly rate, together with an
//!    unconfigured-package anomaly so callers can surface the gap
//!    without failing the whole computation.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;

use crate::models::{Anomaly, AnomalyCode};

/// The outcome of resolving one package label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRate {
    /// The monthly rate to use.
    pub monthly_rate: Decimal,
    /// The canonical configured label that matched, when one did.
    pub matched_label: Option<String>,
    /// Set when the default rate had to be used.
    pub anomaly: Option<Anomaly>,
}

/// Resolves package labels to monthly rates.
///
/// Built once from the package table; every lookup is then pure over
/// the precomputed indexes.
///
/// # Example
///
/// ```
/// use salary_engine::calculation::RateResolver;
/// use rust_decimal::Decimal;
/// use std::collections::HashMap;
///
/// let mut table = HashMap::new();
/// table.insert("Grade 5".to_string(), Decimal::from(3000));
/// let resolver = RateResolver::new(&table, Decimal::from(2000));
///
/// // A trailing space still resolves to the configured rate.
/// let hit = resolver.resolve("Grade 5 ");
/// assert_eq!(hit.monthly_rate, Decimal::from(3000));
/// assert!(hit.anomaly.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RateResolver {
    exact: HashMap<String, Decimal>,
    /// Normalized label to (canonical label, rate). BTreeMap so the
    /// substring fallback scans keys in a fixed order.
    normalized: BTreeMap<String, (String, Decimal)>,
    default_monthly_rate: Decimal,
}

fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

impl RateResolver {
    /// Builds the resolver's indexes from the configured package table
    /// and the default rate for unconfigured packages.
    pub fn new(packages: &HashMap<String, Decimal>, default_monthly_rate: Decimal) -> Self {
        let exact = packages.clone();
        let mut normalized = BTreeMap::new();
        for (label, rate) in packages {
            normalized.insert(normalize(label), (label.clone(), *rate));
        }
        Self {
            exact,
            normalized,
            default_monthly_rate,
        }
    }

    /// The rate used when no package matches.
    pub fn default_monthly_rate(&self) -> Decimal {
        self.default_monthly_rate
    }

    /// Resolves a package label to its monthly rate.
    ///
    /// Never fails: an unknown or blank label resolves to the default
    /// rate with an [`AnomalyCode::UnconfiguredPackage`] anomaly
    /// attached.
    pub fn resolve(&self, label: &str) -> ResolvedRate {
        if let Some(rate) = self.exact.get(label) {
            return ResolvedRate {
                monthly_rate: *rate,
                matched_label: Some(label.to_string()),
                anomaly: None,
            };
        }

        let needle = normalize(label);
        if needle.is_empty() {
            return self.unconfigured("blank package label");
        }

        if let Some((canonical, rate)) = self.normalized.get(&needle) {
            return ResolvedRate {
                monthly_rate: *rate,
                matched_label: Some(canonical.clone()),
                anomaly: None,
            };
        }

        for (key, (canonical, rate)) in &self.normalized {
            if needle.contains(key.as_str()) || key.contains(needle.as_str()) {
                return ResolvedRate {
                    monthly_rate: *rate,
                    matched_label: Some(canonical.clone()),
                    anomaly: None,
                };
            }
        }

        self.unconfigured(format!("no rate configured for package '{}'", label.trim()))
    }

    fn unconfigured(&self, message: impl Into<String>) -> ResolvedRate {
        ResolvedRate {
            monthly_rate: self.default_monthly_rate,
            matched_label: None,
            anomaly: Some(Anomaly::new(AnomalyCode::UnconfiguredPackage, message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn resolver() -> RateResolver {
        let mut table = HashMap::new();
        table.insert("Grade 5".to_string(), dec("3000"));
        table.insert("Grade 8".to_string(), dec("4000"));
        table.insert("Adults English".to_string(), dec("3500"));
        RateResolver::new(&table, dec("2000"))
    }

    // ==========================================================================
    // RR-001: exact label match
    // ==========================================================================
    #[test]
    fn test_rr_001_exact_match() {
        let hit = resolver().resolve("Grade 5");
        assert_eq!(hit.monthly_rate, dec("3000"));
        assert_eq!(hit.matched_label.as_deref(), Some("Grade 5"));
        assert!(hit.anomaly.is_none());
    }

    // ==========================================================================
    // RR-002: case-insensitive match
    // ==========================================================================
    #[test]
    fn test_rr_002_case_insensitive_match() {
        let hit = resolver().resolve("grade 5");
        assert_eq!(hit.monthly_rate, dec("3000"));
        assert_eq!(hit.matched_label.as_deref(), Some("Grade 5"));
        assert!(hit.anomaly.is_none());
    }

    // ==========================================================================
    // RR-003: trailing whitespace resolves via trimmed match
    // ==========================================================================
    #[test]
    fn test_rr_003_trailing_whitespace_match() {
        let hit = resolver().resolve("Grade 5 ");
        assert_eq!(hit.monthly_rate, dec("3000"));
        assert!(hit.anomaly.is_none());

        let canonical = resolver().resolve("Grade 5");
        assert_eq!(hit.monthly_rate, canonical.monthly_rate);
    }

    // ==========================================================================
    // RR-004: substring fallback in both directions
    // ==========================================================================
    #[test]
    fn test_rr_004_substring_match() {
        // Label contains a configured key.
        let hit = resolver().resolve("Grade 5 Mathematics");
        assert_eq!(hit.monthly_rate, dec("3000"));
        assert_eq!(hit.matched_label.as_deref(), Some("Grade 5"));

        // Configured key contains the label.
        let hit = resolver().resolve("Adults");
        assert_eq!(hit.monthly_rate, dec("3500"));
        assert_eq!(hit.matched_label.as_deref(), Some("Adults English"));
    }

    // ==========================================================================
    // RR-005: unknown label falls back to the default with an anomaly
    // ==========================================================================
    #[test]
    fn test_rr_005_unknown_label_uses_default() {
        let hit = resolver().resolve("Grade 13");
        assert_eq!(hit.monthly_rate, dec("2000"));
        assert_eq!(hit.matched_label, None);

        let anomaly = hit.anomaly.unwrap();
        assert_eq!(anomaly.code, AnomalyCode::UnconfiguredPackage);
        assert!(anomaly.message.contains("Grade 13"));
    }

    // ==========================================================================
    // RR-006: blank label never matches everything via substring
    // ==========================================================================
    #[test]
    fn test_rr_006_blank_label_uses_default() {
        let hit = resolver().resolve("   ");
        assert_eq!(hit.monthly_rate, dec("2000"));
        assert_eq!(
            hit.anomaly.unwrap().code,
            AnomalyCode::UnconfiguredPackage
        );
    }

    // ==========================================================================
    // RR-007: ambiguous substring picks the first key in order
    // ==========================================================================
    #[test]
    fn test_rr_007_ambiguous_substring_is_deterministic() {
        let hit = resolver().resolve("Grade 5 and Grade 8 combo");
        // "grade 5" sorts before "grade 8" in the index.
        assert_eq!(hit.matched_label.as_deref(), Some("Grade 5"));
    }

    // ==========================================================================
    // RR-008: empty table always resolves to the default
    // ==========================================================================
    #[test]
    fn test_rr_008_empty_table_uses_default() {
        let resolver = RateResolver::new(&HashMap::new(), dec("2000"));
        let hit = resolver.resolve("Grade 5");
        assert_eq!(hit.monthly_rate, dec("2000"));
        assert!(hit.anomaly.is_some());
    }
}
