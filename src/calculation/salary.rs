//! Salary aggregation functionality.
//!
//! This module runs the whole per-teacher pipeline: reconcile activity,
//! prorate earnings, price deductions, credit bonuses and fold the lot
//! into a [`TeacherSalaryBreakdown`]. The breakdown is a pure function
//! of the store contents and configuration, so recomputing it with
//! unchanged inputs yields byte-identical serialized output.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::calculation::absence::apply_absence_deductions;
use crate::calculation::activity::reconcile_teaching_days;
use crate::calculation::bonus::sum_bonuses;
use crate::calculation::lateness::apply_lateness_deductions;
use crate::calculation::proration::prorate_earnings;
use crate::calculation::rate_resolver::RateResolver;
use crate::config::SchoolConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Anomaly, PaymentStatus, Period, SalarySummary, TeacherSalaryBreakdown,
};
use crate::store::SchoolStore;

fn push_unique(anomalies: &mut Vec<Anomaly>, candidate: Anomaly) {
    if !anomalies.contains(&candidate) {
        anomalies.push(candidate);
    }
}

/// Computes the full salary breakdown for one teacher and window.
///
/// Fails only when the teacher is unknown or the store is unreachable.
/// Bad data inside the window degrades to anomalies on the result:
/// unconfigured packages price at the default rate, a window without
/// working days produces a zeroed breakdown, and lateness records whose
/// daily rate cannot be derived keep their stored amount.
///
/// Lateness deductions are repriced against each student's current
/// daily rate. Students who appear in lateness records but taught no
/// reconciled day still get a rate derived from their enrollment, so a
/// deduction never silently drops just because the teaching days moved.
///
/// The attached payment status is looked up for the calendar period
/// containing `from`; a missing row reads as [`PaymentStatus::Unpaid`].
pub fn compute_salary_breakdown(
    store: &dyn SchoolStore,
    config: &SchoolConfig,
    resolver: &RateResolver,
    teacher_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> EngineResult<TeacherSalaryBreakdown> {
    if !store.teacher_exists(teacher_id)? {
        return Err(EngineError::TeacherNotFound {
            teacher_id: teacher_id.to_string(),
        });
    }

    let salary_cfg = config.salary();
    let events = store.activity_events(teacher_id, from, to)?;
    let activity = reconcile_teaching_days(&events, salary_cfg.include_sundays);

    let mut package_labels = BTreeMap::new();
    for student_id in activity.teaching_days.keys() {
        let label = store
            .enrollment_for_student(student_id)?
            .map(|enrollment| enrollment.package_label);
        package_labels.insert(student_id.clone(), label);
    }

    let proration = prorate_earnings(
        &activity,
        &package_labels,
        resolver,
        from,
        to,
        salary_cfg.include_sundays,
    );

    let mut anomalies = Vec::new();
    for anomaly in &proration.anomalies {
        push_unique(&mut anomalies, anomaly.clone());
    }

    // Lateness can reference students with no teaching day in the
    // window. Derive their rate from the enrollment so the deduction
    // still reprices.
    let lateness_records = store.lateness_records(teacher_id, from, to)?;
    let mut daily_rates = proration.daily_rates.clone();
    if proration.working_days > 0 {
        let unrated: BTreeSet<String> = lateness_records
            .iter()
            .filter(|record| !record.waived)
            .filter(|record| !daily_rates.contains_key(&record.student_id))
            .map(|record| record.student_id.clone())
            .collect();
        for student_id in unrated {
            let Some(enrollment) = store.enrollment_for_student(&student_id)? else {
                continue;
            };
            let resolved = resolver.resolve(&enrollment.package_label);
            if let Some(anomaly) = resolved.anomaly {
                push_unique(&mut anomalies, anomaly);
            }
            let rate =
                (resolved.monthly_rate / Decimal::from(proration.working_days)).round_dp(2);
            daily_rates.insert(student_id, rate);
        }
    }

    let lateness = apply_lateness_deductions(&lateness_records, salary_cfg, &daily_rates);
    for anomaly in lateness.anomalies {
        push_unique(&mut anomalies, anomaly);
    }

    let absence = apply_absence_deductions(&store.absence_records(teacher_id, from, to)?);
    let bonus = sum_bonuses(&store.bonus_records(teacher_id, from, to)?);

    let days_taught = activity.distinct_dates().len() as u32;
    let average_daily_earning = if days_taught > 0 {
        (proration.base_salary / Decimal::from(days_taught)).round_dp(2)
    } else {
        Decimal::ZERO
    };
    let total_deductions = lateness.total + absence.total;
    let net_salary = proration.base_salary - total_deductions + bonus.total;

    let period = Period {
        year: from.year(),
        month: from.month(),
    };
    let payment_status = store
        .salary_payment(teacher_id, period)?
        .map(|payment| payment.status)
        .unwrap_or(PaymentStatus::Unpaid);

    Ok(TeacherSalaryBreakdown {
        teacher_id: teacher_id.to_string(),
        from,
        to,
        daily_earnings: proration.daily_earnings,
        students: proration.students,
        lateness_deductions: lateness.lines,
        absence_deductions: absence.lines,
        bonuses: bonus.lines,
        summary: SalarySummary {
            working_days: proration.working_days,
            days_taught,
            students_taught: activity.students_taught(),
            base_salary: proration.base_salary,
            average_daily_earning,
            lateness_total: lateness.total,
            absence_total: absence.total,
            total_deductions,
            bonus_total: bonus.total,
            net_salary,
        },
        payment_status,
        anomalies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SalaryCalculationConfig, SchoolConfig, SchoolMetadata};
    use crate::models::{
        AbsenceRecord, AnomalyCode, BonusRecord, Enrollment, EnrollmentStatus, LatenessRecord,
        Teacher, TeachingActivityEvent,
    };
    use crate::store::InMemoryStore;
    use chrono::NaiveTime;
    use std::collections::HashMap;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_config() -> SchoolConfig {
        SchoolConfig::new(
            SchoolMetadata {
                name: "Test School".to_string(),
                currency: "ETB".to_string(),
                version: "2025-09".to_string(),
            },
            HashMap::from([
                ("Grade 5".to_string(), dec("3000")),
                ("Grade 8".to_string(), dec("3600")),
            ]),
            SalaryCalculationConfig {
                include_sundays: true,
                excused_threshold_minutes: 5,
                lateness_tiers: vec![
                    crate::config::LatenessTier {
                        from_minutes: 5,
                        to_minutes: Some(10),
                        percent: dec("10"),
                    },
                    crate::config::LatenessTier {
                        from_minutes: 10,
                        to_minutes: Some(20),
                        percent: dec("25"),
                    },
                    crate::config::LatenessTier {
                        from_minutes: 20,
                        to_minutes: None,
                        percent: dec("50"),
                    },
                ],
                package_deductions: HashMap::new(),
                default_monthly_rate: dec("2000"),
            },
            vec![],
        )
    }

    fn resolver_for(config: &SchoolConfig) -> RateResolver {
        RateResolver::new(config.packages(), config.salary().default_monthly_rate)
    }

    fn enrollment(student: &str, package: &str) -> Enrollment {
        Enrollment {
            student_id: student.to_string(),
            teacher_id: "t-001".to_string(),
            controller_id: "c-001".to_string(),
            package_label: package.to_string(),
            day_pattern: "MWF".to_string(),
            status: EnrollmentStatus::Active,
            start_date: date(2025, 9, 1),
            registration_date: date(2025, 8, 28),
            leave_started_on: None,
            referrer_controller_id: None,
            referral_claimed: false,
        }
    }

    fn seed_teaching(store: &InMemoryStore, student: &str, days: &[u32]) {
        for &day in days {
            store.add_event(TeachingActivityEvent {
                id: Uuid::new_v4(),
                teacher_id: "t-001".to_string(),
                student_id: student.to_string(),
                occurred_at: date(2025, 9, day).and_hms_opt(9, 0, 0).unwrap(),
            });
        }
    }

    fn seeded_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.add_teacher(Teacher {
            id: "t-001".to_string(),
            full_name: "Abebe Kebede".to_string(),
        });
        store
    }

    // ==========================================================================
    // SA-001: 3000 ETB package, 30 working days, 20 taught days nets 2000.00
    // ==========================================================================
    #[test]
    fn test_sa_001_base_salary_scenario() {
        let store = seeded_store();
        store.add_enrollment(enrollment("s-001", "Grade 5"));
        let days: Vec<u32> = (1..=20).collect();
        seed_teaching(&store, "s-001", &days);

        let config = test_config();
        let resolver = resolver_for(&config);
        let breakdown = compute_salary_breakdown(
            &store,
            &config,
            &resolver,
            "t-001",
            date(2025, 9, 1),
            date(2025, 9, 30),
        )
        .unwrap();

        assert_eq!(breakdown.summary.working_days, 30);
        assert_eq!(breakdown.summary.days_taught, 20);
        assert_eq!(breakdown.summary.students_taught, 1);
        assert_eq!(breakdown.students[0].daily_rate, dec("100.00"));
        assert_eq!(breakdown.summary.base_salary, dec("2000.00"));
        assert_eq!(breakdown.summary.net_salary, dec("2000.00"));
        assert_eq!(breakdown.payment_status, PaymentStatus::Unpaid);
        assert!(breakdown.anomalies.is_empty());
    }

    // ==========================================================================
    // SA-002: net salary folds deductions and bonuses together
    // ==========================================================================
    #[test]
    fn test_sa_002_net_salary_folds_components() {
        let store = seeded_store();
        store.add_enrollment(enrollment("s-001", "Grade 5"));
        seed_teaching(&store, "s-001", &[1, 2, 3, 4, 5]);

        // 12 minutes late on a taught day: 25% of 100.00.
        let scheduled = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        store.add_lateness(LatenessRecord {
            id: Uuid::new_v4(),
            teacher_id: "t-001".to_string(),
            student_id: "s-001".to_string(),
            date: date(2025, 9, 2),
            scheduled_time: scheduled,
            actual_time: NaiveTime::from_hms_opt(9, 12, 0).unwrap(),
            minutes_late: 12,
            deduction: dec("999.00"),
            waived: false,
        });
        store.add_absence(AbsenceRecord {
            id: Uuid::new_v4(),
            teacher_id: "t-001".to_string(),
            student_id: "s-001".to_string(),
            date: date(2025, 9, 10),
            permitted: false,
            deduction_applied: dec("50.00"),
            waived: false,
            reason_category: "unreported".to_string(),
        });
        store.add_bonus(BonusRecord {
            id: Uuid::new_v4(),
            teacher_id: "t-001".to_string(),
            date: date(2025, 9, 15),
            amount: dec("150.00"),
            reason: "exam week".to_string(),
        });

        let config = test_config();
        let resolver = resolver_for(&config);
        let breakdown = compute_salary_breakdown(
            &store,
            &config,
            &resolver,
            "t-001",
            date(2025, 9, 1),
            date(2025, 9, 30),
        )
        .unwrap();

        // base 5 * 100 = 500; lateness 25; absence 50; bonus 150.
        assert_eq!(breakdown.summary.base_salary, dec("500.00"));
        assert_eq!(breakdown.summary.lateness_total, dec("25.00"));
        assert_eq!(breakdown.summary.absence_total, dec("50.00"));
        assert_eq!(breakdown.summary.total_deductions, dec("75.00"));
        assert_eq!(breakdown.summary.bonus_total, dec("150.00"));
        assert_eq!(breakdown.summary.net_salary, dec("575.00"));
        assert_eq!(breakdown.summary.average_daily_earning, dec("100.00"));
    }

    // ==========================================================================
    // SA-003: unknown teacher is an error, empty activity is not
    // ==========================================================================
    #[test]
    fn test_sa_003_unknown_teacher_vs_empty_window() {
        let store = seeded_store();
        let config = test_config();
        let resolver = resolver_for(&config);

        let err = compute_salary_breakdown(
            &store,
            &config,
            &resolver,
            "t-999",
            date(2025, 9, 1),
            date(2025, 9, 30),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::TeacherNotFound { .. }));

        // Known teacher with nothing taught yields a zeroed breakdown.
        let breakdown = compute_salary_breakdown(
            &store,
            &config,
            &resolver,
            "t-001",
            date(2025, 9, 1),
            date(2025, 9, 30),
        )
        .unwrap();
        assert_eq!(breakdown.summary.base_salary, Decimal::ZERO);
        assert_eq!(breakdown.summary.days_taught, 0);
        assert_eq!(breakdown.summary.average_daily_earning, Decimal::ZERO);
    }

    // ==========================================================================
    // SA-004: lateness for an untaught student still reprices via enrollment
    // ==========================================================================
    #[test]
    fn test_sa_004_untaught_student_lateness_repriced() {
        let store = seeded_store();
        store.add_enrollment(enrollment("s-001", "Grade 5"));
        store.add_enrollment(enrollment("s-002", "Grade 8"));
        seed_teaching(&store, "s-001", &[1, 2]);

        // s-002 was never taught this window but has a lateness record.
        store.add_lateness(LatenessRecord {
            id: Uuid::new_v4(),
            teacher_id: "t-001".to_string(),
            student_id: "s-002".to_string(),
            date: date(2025, 9, 3),
            scheduled_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            actual_time: NaiveTime::from_hms_opt(14, 12, 0).unwrap(),
            minutes_late: 12,
            deduction: dec("999.00"),
            waived: false,
        });

        let config = test_config();
        let resolver = resolver_for(&config);
        let breakdown = compute_salary_breakdown(
            &store,
            &config,
            &resolver,
            "t-001",
            date(2025, 9, 1),
            date(2025, 9, 30),
        )
        .unwrap();

        // Grade 8: 3600 / 30 = 120.00 daily; 25% = 30.00.
        assert_eq!(breakdown.summary.lateness_total, dec("30.00"));
        assert!(breakdown.anomalies.is_empty());
    }

    // ==========================================================================
    // SA-005: lateness with no resolvable rate keeps the stored amount
    // ==========================================================================
    #[test]
    fn test_sa_005_unresolvable_rate_falls_back() {
        let store = seeded_store();
        store.add_enrollment(enrollment("s-001", "Grade 5"));
        seed_teaching(&store, "s-001", &[1]);

        // No enrollment at all for s-404.
        store.add_lateness(LatenessRecord {
            id: Uuid::new_v4(),
            teacher_id: "t-001".to_string(),
            student_id: "s-404".to_string(),
            date: date(2025, 9, 3),
            scheduled_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            actual_time: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
            minutes_late: 30,
            deduction: dec("42.00"),
            waived: false,
        });

        let config = test_config();
        let resolver = resolver_for(&config);
        let breakdown = compute_salary_breakdown(
            &store,
            &config,
            &resolver,
            "t-001",
            date(2025, 9, 1),
            date(2025, 9, 30),
        )
        .unwrap();

        assert_eq!(breakdown.summary.lateness_total, dec("42.00"));
        assert!(breakdown
            .anomalies
            .iter()
            .any(|a| a.code == AnomalyCode::UnresolvedDailyRate));
    }

    // ==========================================================================
    // SA-006: payment status reflects the stored row for the window's period
    // ==========================================================================
    #[test]
    fn test_sa_006_payment_status_from_store() {
        let store = seeded_store();
        let config = test_config();
        let resolver = resolver_for(&config);
        let period = Period { year: 2025, month: 9 };

        store
            .upsert_salary_payment("t-001", period, PaymentStatus::Paid)
            .unwrap();

        let breakdown = compute_salary_breakdown(
            &store,
            &config,
            &resolver,
            "t-001",
            date(2025, 9, 1),
            date(2025, 9, 30),
        )
        .unwrap();
        assert_eq!(breakdown.payment_status, PaymentStatus::Paid);
    }

    // ==========================================================================
    // SA-007: recomputation with unchanged inputs is byte-identical
    // ==========================================================================
    #[test]
    fn test_sa_007_recompute_is_byte_identical() {
        let store = seeded_store();
        store.add_enrollment(enrollment("s-001", "Grade 5"));
        store.add_enrollment(enrollment("s-002", "Grade 8"));
        seed_teaching(&store, "s-001", &[1, 2, 3]);
        seed_teaching(&store, "s-002", &[2, 3, 4]);

        let config = test_config();
        let resolver = resolver_for(&config);
        let run = || {
            let breakdown = compute_salary_breakdown(
                &store,
                &config,
                &resolver,
                "t-001",
                date(2025, 9, 1),
                date(2025, 9, 30),
            )
            .unwrap();
            serde_json::to_string(&breakdown).unwrap()
        };

        assert_eq!(run(), run());
    }

    // ==========================================================================
    // SA-008: duplicate anomalies collapse to one entry
    // ==========================================================================
    #[test]
    fn test_sa_008_duplicate_anomalies_deduped() {
        let store = seeded_store();
        // Two students on the same unknown package label.
        store.add_enrollment(enrollment("s-010", "Diploma"));
        store.add_enrollment(enrollment("s-011", "Diploma"));
        seed_teaching(&store, "s-010", &[1]);
        seed_teaching(&store, "s-011", &[1]);

        let config = test_config();
        let resolver = resolver_for(&config);
        let breakdown = compute_salary_breakdown(
            &store,
            &config,
            &resolver,
            "t-001",
            date(2025, 9, 1),
            date(2025, 9, 30),
        )
        .unwrap();

        let unconfigured: Vec<&Anomaly> = breakdown
            .anomalies
            .iter()
            .filter(|a| a.code == AnomalyCode::UnconfiguredPackage)
            .collect();
        assert_eq!(unconfigured.len(), 1);
    }
}
