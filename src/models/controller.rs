//! Controller earnings result shape.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Anomaly, EnrollmentStatus, Period};

/// The earnings computation result for one controller and one period.
///
/// Like the teacher breakdown, this carries no volatile fields; the same
/// inputs always serialize to the same bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerEarnings {
    /// The controller the result is for.
    pub controller_id: String,
    /// The period computed.
    pub period: Period,
    /// Cohort size per enrollment status.
    pub status_counts: BTreeMap<EnrollmentStatus, u32>,
    /// Active students earning base pay.
    pub active_students: u32,
    /// Leaves that started inside the period (seasonal leave excluded).
    pub leave_count: u32,
    /// Active students with no settled payment in the padded window.
    pub unpaid_count: u32,
    /// Referred students that qualified for the bonus this period.
    pub referral_count: u32,
    /// `active_students x main_base_rate`.
    pub base_earnings: Decimal,
    /// Penalty for leaves beyond the configured threshold.
    pub leave_penalty: Decimal,
    /// Penalty for active students who have not paid.
    pub unpaid_penalty: Decimal,
    /// Bonus for qualifying referrals.
    pub referral_bonus: Decimal,
    /// `base - leave_penalty - unpaid_penalty + referral_bonus`.
    pub total_earnings: Decimal,
    /// `total / target x 100`; absent when the target is zero.
    pub achievement_percent: Option<Decimal>,
    /// Change versus the prior period's total; absent without a baseline.
    pub growth_percent: Option<Decimal>,
    /// Non-fatal anomalies encountered along the way.
    pub anomalies: Vec<Anomaly>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_serde_round_trip_with_status_counts() {
        let mut status_counts = BTreeMap::new();
        status_counts.insert(EnrollmentStatus::Active, 50);
        status_counts.insert(EnrollmentStatus::Leave, 7);

        let earnings = ControllerEarnings {
            controller_id: "c-001".to_string(),
            period: Period {
                year: 2025,
                month: 11,
            },
            status_counts,
            active_students: 50,
            leave_count: 7,
            unpaid_count: 0,
            referral_count: 0,
            base_earnings: dec("2000.00"),
            leave_penalty: dec("240.00"),
            unpaid_penalty: Decimal::ZERO,
            referral_bonus: Decimal::ZERO,
            total_earnings: dec("1760.00"),
            achievement_percent: Some(dec("88.00")),
            growth_percent: None,
            anomalies: vec![],
        };

        let json = serde_json::to_string(&earnings).unwrap();
        assert!(json.contains("\"active\":50"));
        let back: ControllerEarnings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, earnings);
    }
}
