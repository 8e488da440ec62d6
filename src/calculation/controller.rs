//! Controller earnings functionality.
//!
//! Controllers are paid per managed cohort rather than per taught day.
//! The calculation partitions the controller's students by enrollment
//! status, prices the active head count, penalizes excess leaves and
//! unpaid actives, credits qualifying referrals and grades the total
//! against the configured target and the prior period.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::config::SchoolConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Anomaly, AnomalyCode, ControllerEarnings, EnrollmentStatus, PaymentKind, Period,
};
use crate::store::SchoolStore;

fn period_window(period: Period) -> EngineResult<(NaiveDate, NaiveDate)> {
    match (period.first_day(), period.last_day()) {
        (Some(first), Some(last)) => Ok((first, last)),
        _ => Err(EngineError::ValidationError {
            field: "period".to_string(),
            message: format!("'{}' is not a valid year-month", period),
        }),
    }
}

/// One period's earnings with no growth comparison attached.
///
/// The leave penalty counts only plain `Leave` enrollments whose leave
/// began inside the period; Ramadan leave is a scheduled pause, not a
/// retention failure, and never penalizes. The unpaid check pads the
/// period by the configured grace days on both sides so a payment made
/// a few days into the next billing cycle still counts.
fn compute_for_period(
    store: &dyn SchoolStore,
    config: &SchoolConfig,
    controller_id: &str,
    period: Period,
) -> EngineResult<ControllerEarnings> {
    let (first, last) = period_window(period)?;
    let params = config.controller_config_for(first)?;
    let enrollments = store.enrollments_for_controller(controller_id)?;

    let mut status_counts: BTreeMap<EnrollmentStatus, u32> = BTreeMap::new();
    for enrollment in &enrollments {
        *status_counts.entry(enrollment.status).or_insert(0) += 1;
    }

    let active: Vec<_> = enrollments
        .iter()
        .filter(|e| e.status == EnrollmentStatus::Active)
        .collect();
    let active_students = active.len() as u32;

    let leave_count = enrollments
        .iter()
        .filter(|e| e.status == EnrollmentStatus::Leave)
        .filter(|e| e.leave_started_on.is_some_and(|d| period.contains(d)))
        .count() as u32;
    let excess_leaves = leave_count.saturating_sub(params.leave_threshold);

    let grace = Duration::days(i64::from(params.payment_grace_days));
    let padded_from = first - grace;
    let padded_to = last + grace;
    let mut unpaid_count = 0u32;
    for enrollment in &active {
        if store
            .student_payments(&enrollment.student_id, padded_from, padded_to)?
            .is_empty()
        {
            unpaid_count += 1;
        }
    }

    // A referral pays out once: the student must be active, have both
    // registered and started inside this period, have actually paid
    // (free months do not qualify) and not be claimed already by the
    // registration workflow.
    let mut referral_count = 0u32;
    for enrollment in store.enrollments_referred_by(controller_id)? {
        if enrollment.status != EnrollmentStatus::Active || enrollment.referral_claimed {
            continue;
        }
        if !period.contains(enrollment.registration_date) || !period.contains(enrollment.start_date)
        {
            continue;
        }
        let paid_this_period = store
            .student_payments(&enrollment.student_id, first, last)?
            .iter()
            .any(|payment| payment.kind == PaymentKind::Paid);
        if paid_this_period {
            referral_count += 1;
        }
    }

    let base_earnings = Decimal::from(active_students) * params.main_base_rate;
    let leave_penalty =
        Decimal::from(excess_leaves) * params.leave_penalty_multiplier * params.main_base_rate;
    let unpaid_penalty =
        Decimal::from(unpaid_count) * params.unpaid_penalty_multiplier * params.main_base_rate;
    let referral_bonus =
        Decimal::from(referral_count) * params.referral_bonus_multiplier * params.referral_base_rate;
    let total_earnings = base_earnings - leave_penalty - unpaid_penalty + referral_bonus;

    let mut anomalies = Vec::new();
    let achievement_percent = if params.target_earnings.is_zero() {
        anomalies.push(Anomaly::new(
            AnomalyCode::ZeroTarget,
            format!("target earnings are zero for period {}", period),
        ));
        None
    } else {
        Some((total_earnings / params.target_earnings * Decimal::from(100)).round_dp(2))
    };

    Ok(ControllerEarnings {
        controller_id: controller_id.to_string(),
        period,
        status_counts,
        active_students,
        leave_count,
        unpaid_count,
        referral_count,
        base_earnings,
        leave_penalty,
        unpaid_penalty,
        referral_bonus,
        total_earnings,
        achievement_percent,
        growth_percent: None,
        anomalies,
    })
}

/// Computes one controller's earnings for a period.
///
/// `total = base − leave penalty − unpaid penalty + referral bonus`,
/// with an achievement percentage against the configured target and a
/// growth percentage against the same calculation re-run for the prior
/// period under the parameters effective back then. A prior period
/// with zero earnings, or one predating all configured parameter
/// versions, leaves growth unset with an anomaly instead of failing.
pub fn compute_controller_earnings(
    store: &dyn SchoolStore,
    config: &SchoolConfig,
    controller_id: &str,
    period: Period,
) -> EngineResult<ControllerEarnings> {
    if !store.controller_exists(controller_id)? {
        return Err(EngineError::ControllerNotFound {
            controller_id: controller_id.to_string(),
        });
    }

    let mut earnings = compute_for_period(store, config, controller_id, period)?;

    let prior = period.prev();
    let baseline = match compute_for_period(store, config, controller_id, prior) {
        Ok(prior_earnings) => Some(prior_earnings.total_earnings),
        Err(EngineError::ControllerConfigNotFound { .. }) => None,
        Err(err) => return Err(err),
    };

    match baseline {
        Some(prior_total) if !prior_total.is_zero() => {
            earnings.growth_percent = Some(
                ((earnings.total_earnings - prior_total) / prior_total * Decimal::from(100))
                    .round_dp(2),
            );
        }
        Some(_) => earnings.anomalies.push(Anomaly::new(
            AnomalyCode::NoPriorBaseline,
            format!("prior period {} produced zero earnings", prior),
        )),
        None => earnings.anomalies.push(Anomaly::new(
            AnomalyCode::NoPriorBaseline,
            format!("no controller parameters effective for prior period {}", prior),
        )),
    }

    Ok(earnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ControllerEarningsConfig, SalaryCalculationConfig, SchoolMetadata};
    use crate::models::{Controller, Enrollment, StudentPayment};
    use crate::store::InMemoryStore;
    use std::collections::HashMap;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn params(effective: NaiveDate) -> ControllerEarningsConfig {
        ControllerEarningsConfig {
            effective_date: effective,
            main_base_rate: dec("40"),
            referral_base_rate: dec("40"),
            leave_penalty_multiplier: dec("3"),
            leave_threshold: 5,
            unpaid_penalty_multiplier: dec("0"),
            referral_bonus_multiplier: dec("2"),
            target_earnings: dec("2000"),
            payment_grace_days: 7,
        }
    }

    fn config_with(versions: Vec<ControllerEarningsConfig>) -> SchoolConfig {
        SchoolConfig::new(
            SchoolMetadata {
                name: "Test School".to_string(),
                currency: "ETB".to_string(),
                version: "2025-09".to_string(),
            },
            HashMap::new(),
            SalaryCalculationConfig {
                include_sundays: false,
                excused_threshold_minutes: 5,
                lateness_tiers: vec![],
                package_deductions: HashMap::new(),
                default_monthly_rate: dec("2000"),
            },
            versions,
        )
    }

    fn enrollment(student: &str, status: EnrollmentStatus) -> Enrollment {
        Enrollment {
            student_id: student.to_string(),
            teacher_id: "t-001".to_string(),
            controller_id: "c-001".to_string(),
            package_label: "Grade 5".to_string(),
            day_pattern: "MWF".to_string(),
            status,
            start_date: date(2025, 6, 1),
            registration_date: date(2025, 5, 28),
            leave_started_on: None,
            referrer_controller_id: None,
            referral_claimed: false,
        }
    }

    fn payment(student: &str, on: NaiveDate, kind: PaymentKind) -> StudentPayment {
        StudentPayment {
            id: Uuid::new_v4(),
            student_id: student.to_string(),
            date: on,
            amount: dec("3000"),
            kind,
        }
    }

    fn seeded_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.add_controller(Controller {
            id: "c-001".to_string(),
            full_name: "Marta Haile".to_string(),
        });
        store
    }

    fn seed_actives_with_payments(store: &InMemoryStore, count: u32, paid_on: NaiveDate) {
        for i in 0..count {
            let student = format!("s-{:03}", i);
            store.add_enrollment(enrollment(&student, EnrollmentStatus::Active));
            store.add_student_payment(payment(&student, paid_on, PaymentKind::Paid));
        }
    }

    fn november() -> Period {
        Period {
            year: 2025,
            month: 11,
        }
    }

    // ==========================================================================
    // CE-001: 7 leaves over a threshold of 5 at multiplier 3 and rate 40
    //         penalize 240
    // ==========================================================================
    #[test]
    fn test_ce_001_leave_penalty_scenario() {
        let store = seeded_store();
        seed_actives_with_payments(&store, 50, date(2025, 11, 10));
        for i in 0..7 {
            let mut leave = enrollment(&format!("s-leave-{}", i), EnrollmentStatus::Leave);
            leave.leave_started_on = Some(date(2025, 11, 5));
            store.add_enrollment(leave);
        }

        let config = config_with(vec![params(date(2025, 1, 1))]);
        let earnings =
            compute_controller_earnings(&store, &config, "c-001", november()).unwrap();

        assert_eq!(earnings.active_students, 50);
        assert_eq!(earnings.leave_count, 7);
        assert_eq!(earnings.base_earnings, dec("2000"));
        assert_eq!(earnings.leave_penalty, dec("240"));
        assert_eq!(earnings.unpaid_count, 0);
        assert_eq!(earnings.total_earnings, dec("1760"));
        // 1760 / 2000 target.
        assert_eq!(earnings.achievement_percent, Some(dec("88.00")));
        // Prior period has the same actives, no leaves started then, and
        // every student unpaid at multiplier zero: baseline 2000.
        assert_eq!(earnings.growth_percent, Some(dec("-12.00")));
    }

    // ==========================================================================
    // CE-002: Ramadan leave and out-of-period leaves never penalize
    // ==========================================================================
    #[test]
    fn test_ce_002_exempt_leaves_not_counted() {
        let store = seeded_store();
        seed_actives_with_payments(&store, 10, date(2025, 11, 10));

        let mut ramadan = enrollment("s-r", EnrollmentStatus::RamadanLeave);
        ramadan.leave_started_on = Some(date(2025, 11, 5));
        store.add_enrollment(ramadan);

        let mut old_leave = enrollment("s-old", EnrollmentStatus::Leave);
        old_leave.leave_started_on = Some(date(2025, 9, 5));
        store.add_enrollment(old_leave);

        let mut undated = enrollment("s-undated", EnrollmentStatus::Leave);
        undated.leave_started_on = None;
        store.add_enrollment(undated);

        let config = config_with(vec![params(date(2025, 1, 1))]);
        let earnings =
            compute_controller_earnings(&store, &config, "c-001", november()).unwrap();

        assert_eq!(earnings.leave_count, 0);
        assert_eq!(earnings.leave_penalty, Decimal::ZERO);
        assert_eq!(earnings.status_counts[&EnrollmentStatus::RamadanLeave], 1);
        assert_eq!(earnings.status_counts[&EnrollmentStatus::Leave], 2);
    }

    // ==========================================================================
    // CE-003: leaves at or below the threshold cost nothing, and the
    //         penalty grows linearly above it
    // ==========================================================================
    #[test]
    fn test_ce_003_leave_penalty_linearity() {
        let config = config_with(vec![params(date(2025, 1, 1))]);

        for (leaves, expected) in [(5u32, "0"), (6, "120"), (8, "360")] {
            let store = seeded_store();
            for i in 0..leaves {
                let mut leave = enrollment(&format!("s-l{}", i), EnrollmentStatus::Leave);
                leave.leave_started_on = Some(date(2025, 11, 3));
                store.add_enrollment(leave);
            }
            let earnings =
                compute_controller_earnings(&store, &config, "c-001", november()).unwrap();
            assert_eq!(earnings.leave_penalty, dec(expected), "{} leaves", leaves);
        }
    }

    // ==========================================================================
    // CE-004: the unpaid check pads the period by the grace days
    // ==========================================================================
    #[test]
    fn test_ce_004_unpaid_grace_window() {
        let mut p = params(date(2025, 1, 1));
        p.unpaid_penalty_multiplier = dec("1");
        let config = config_with(vec![p]);

        let store = seeded_store();
        // Paid 5 days after the period ends: inside the 7-day grace.
        store.add_enrollment(enrollment("s-grace", EnrollmentStatus::Active));
        store.add_student_payment(payment("s-grace", date(2025, 12, 5), PaymentKind::Paid));
        // Paid 10 days after: outside the grace, counts as unpaid.
        store.add_enrollment(enrollment("s-late", EnrollmentStatus::Active));
        store.add_student_payment(payment("s-late", date(2025, 12, 10), PaymentKind::Paid));
        // A free month still counts as settled.
        store.add_enrollment(enrollment("s-free", EnrollmentStatus::Active));
        store.add_student_payment(payment("s-free", date(2025, 11, 10), PaymentKind::Free));

        let earnings =
            compute_controller_earnings(&store, &config, "c-001", november()).unwrap();

        assert_eq!(earnings.unpaid_count, 1);
        assert_eq!(earnings.unpaid_penalty, dec("40"));
    }

    // ==========================================================================
    // CE-005: referral bonus requires registered, started, paid and unclaimed
    // ==========================================================================
    #[test]
    fn test_ce_005_referral_qualification() {
        let config = config_with(vec![params(date(2025, 1, 1))]);
        let store = seeded_store();
        store.add_controller(Controller {
            id: "c-002".to_string(),
            full_name: "Dawit Bekele".to_string(),
        });

        let mut qualifying = enrollment("s-ref", EnrollmentStatus::Active);
        qualifying.controller_id = "c-002".to_string();
        qualifying.referrer_controller_id = Some("c-001".to_string());
        qualifying.registration_date = date(2025, 11, 3);
        qualifying.start_date = date(2025, 11, 5);
        store.add_enrollment(qualifying);
        store.add_student_payment(payment("s-ref", date(2025, 11, 6), PaymentKind::Paid));

        let mut claimed = enrollment("s-claimed", EnrollmentStatus::Active);
        claimed.controller_id = "c-002".to_string();
        claimed.referrer_controller_id = Some("c-001".to_string());
        claimed.registration_date = date(2025, 11, 3);
        claimed.start_date = date(2025, 11, 5);
        claimed.referral_claimed = true;
        store.add_enrollment(claimed);
        store.add_student_payment(payment("s-claimed", date(2025, 11, 6), PaymentKind::Paid));

        let mut stale = enrollment("s-stale", EnrollmentStatus::Active);
        stale.controller_id = "c-002".to_string();
        stale.referrer_controller_id = Some("c-001".to_string());
        stale.registration_date = date(2025, 10, 20);
        stale.start_date = date(2025, 11, 5);
        store.add_enrollment(stale);
        store.add_student_payment(payment("s-stale", date(2025, 11, 6), PaymentKind::Paid));

        let mut free_rider = enrollment("s-freeride", EnrollmentStatus::Active);
        free_rider.controller_id = "c-002".to_string();
        free_rider.referrer_controller_id = Some("c-001".to_string());
        free_rider.registration_date = date(2025, 11, 3);
        free_rider.start_date = date(2025, 11, 5);
        store.add_enrollment(free_rider);
        store.add_student_payment(payment("s-freeride", date(2025, 11, 6), PaymentKind::Free));

        let earnings =
            compute_controller_earnings(&store, &config, "c-001", november()).unwrap();

        assert_eq!(earnings.referral_count, 1);
        // 1 × multiplier 2 × referral base 40.
        assert_eq!(earnings.referral_bonus, dec("80"));
    }

    // ==========================================================================
    // CE-006: unknown controller is an error
    // ==========================================================================
    #[test]
    fn test_ce_006_unknown_controller() {
        let store = seeded_store();
        let config = config_with(vec![params(date(2025, 1, 1))]);
        let err = compute_controller_earnings(&store, &config, "c-999", november()).unwrap_err();
        assert!(matches!(err, EngineError::ControllerNotFound { .. }));
    }

    // ==========================================================================
    // CE-007: zero target leaves achievement unset with an anomaly
    // ==========================================================================
    #[test]
    fn test_ce_007_zero_target() {
        let mut p = params(date(2025, 1, 1));
        p.target_earnings = Decimal::ZERO;
        let config = config_with(vec![p]);
        let store = seeded_store();

        let earnings =
            compute_controller_earnings(&store, &config, "c-001", november()).unwrap();
        assert_eq!(earnings.achievement_percent, None);
        assert!(earnings
            .anomalies
            .iter()
            .any(|a| a.code == AnomalyCode::ZeroTarget));
    }

    // ==========================================================================
    // CE-008: a prior period before all config versions has no baseline
    // ==========================================================================
    #[test]
    fn test_ce_008_no_prior_baseline() {
        // Parameters only effective from the period's own first day.
        let config = config_with(vec![params(date(2025, 11, 1))]);
        let store = seeded_store();
        seed_actives_with_payments(&store, 3, date(2025, 11, 10));

        let earnings =
            compute_controller_earnings(&store, &config, "c-001", november()).unwrap();
        assert_eq!(earnings.growth_percent, None);
        assert!(earnings
            .anomalies
            .iter()
            .any(|a| a.code == AnomalyCode::NoPriorBaseline));
    }

    // ==========================================================================
    // CE-009: zero prior earnings also leave growth unset
    // ==========================================================================
    #[test]
    fn test_ce_009_zero_prior_baseline() {
        let config = config_with(vec![params(date(2025, 1, 1))]);
        let store = seeded_store();
        // No enrollments at all: both periods total zero, so the prior
        // baseline is zero and growth is undefined.
        let earnings =
            compute_controller_earnings(&store, &config, "c-001", november()).unwrap();
        assert_eq!(earnings.total_earnings, Decimal::ZERO);
        assert_eq!(earnings.growth_percent, None);
        assert!(earnings
            .anomalies
            .iter()
            .any(|a| a.code == AnomalyCode::NoPriorBaseline));
    }
}
