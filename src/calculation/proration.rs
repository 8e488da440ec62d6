//! Monthly-rate proration functionality.
//!
//! Package prices are monthly, but teachers earn per day actually
//! taught. This module derives the daily rate for a calculation window
//! and prices each reconciled teaching day with it.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::calculation::activity::{is_working_day, ReconciledActivity};
use crate::calculation::rate_resolver::RateResolver;
use crate::models::{Anomaly, AnomalyCode, EarningLine, StudentEarningsDetail};

/// Counts working days in the inclusive window `[from, to]` under the
/// Sunday rule.
///
/// An inverted window counts zero days.
pub fn working_days_in_window(from: NaiveDate, to: NaiveDate, include_sundays: bool) -> u32 {
    if from > to {
        return 0;
    }
    from.iter_days()
        .take_while(|date| *date <= to)
        .filter(|date| is_working_day(*date, include_sundays))
        .count() as u32
}

/// The priced outcome of prorating one teacher's reconciled activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProrationResult {
    /// Working days in the window, the proration denominator.
    pub working_days: u32,
    /// One line per (date, student) teaching day, ordered by date then
    /// student id.
    pub daily_earnings: Vec<EarningLine>,
    /// Per-student totals, ordered by student id.
    pub students: Vec<StudentEarningsDetail>,
    /// Per-student daily rates keyed by student id. Kept so downstream
    /// deduction pricing reuses the exact same figures.
    pub daily_rates: BTreeMap<String, Decimal>,
    /// Sum of all earning lines.
    pub base_salary: Decimal,
    /// Anomalies raised while pricing, such as unconfigured packages.
    pub anomalies: Vec<Anomaly>,
}

impl ProrationResult {
    fn empty(working_days: u32, anomalies: Vec<Anomaly>) -> Self {
        ProrationResult {
            working_days,
            daily_earnings: Vec::new(),
            students: Vec::new(),
            daily_rates: BTreeMap::new(),
            base_salary: Decimal::ZERO,
            anomalies,
        }
    }
}

/// Prices a teacher's reconciled teaching days against package rates.
///
/// The daily rate for each student is the monthly rate of the
/// student's package divided by the window's working days, rounded to
/// 2 decimal places before any multiplication. Every retained teaching
/// day then earns exactly that rounded rate, so a day's pay never
/// depends on how many other days were taught.
///
/// `package_labels` carries the enrollment package per student; a
/// missing or empty label resolves to the default rate and raises an
/// anomaly, it never fails the calculation.
///
/// A window with zero working days cannot be prorated. The result is
/// zeroed and carries an anomaly instead of an error, matching how the
/// rest of the pipeline degrades.
///
/// # Example
///
/// ```
/// use salary_engine::calculation::{prorate_earnings, reconcile_teaching_days, RateResolver};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::collections::BTreeMap;
///
/// let packages = [("Grade 5".to_string(), Decimal::from(3000))].into_iter().collect();
/// let resolver = RateResolver::new(&packages, Decimal::from(2000));
/// let activity = reconcile_teaching_days(&[], false);
/// let labels: BTreeMap<String, Option<String>> = BTreeMap::new();
///
/// let from = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
/// let to = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
/// let result = prorate_earnings(&activity, &labels, &resolver, from, to, false);
/// assert_eq!(result.working_days, 25); // November 2025 has 5 Sundays
/// assert_eq!(result.base_salary, Decimal::ZERO);
/// ```
pub fn prorate_earnings(
    activity: &ReconciledActivity,
    package_labels: &BTreeMap<String, Option<String>>,
    resolver: &RateResolver,
    from: NaiveDate,
    to: NaiveDate,
    include_sundays: bool,
) -> ProrationResult {
    if from > to {
        return ProrationResult::empty(
            0,
            vec![Anomaly::new(
                AnomalyCode::InvalidWindow,
                format!("window start {} is after window end {}", from, to),
            )],
        );
    }

    let working_days = working_days_in_window(from, to, include_sundays);
    if working_days == 0 {
        return ProrationResult::empty(
            0,
            vec![Anomaly::new(
                AnomalyCode::InvalidWindow,
                format!("window {} to {} contains no working days", from, to),
            )],
        );
    }

    let mut daily_earnings = Vec::new();
    let mut students = Vec::new();
    let mut daily_rates = BTreeMap::new();
    let mut base_salary = Decimal::ZERO;
    let mut anomalies = Vec::new();

    for (student_id, dates) in &activity.teaching_days {
        let label = package_labels
            .get(student_id)
            .and_then(|label| label.as_deref())
            .unwrap_or("");
        let resolved = resolver.resolve(label);
        if let Some(anomaly) = resolved.anomaly {
            anomalies.push(anomaly);
        }

        let package_label = resolved.matched_label.unwrap_or_else(|| {
            if label.is_empty() {
                "unknown".to_string()
            } else {
                label.to_string()
            }
        });

        let daily_rate = (resolved.monthly_rate / Decimal::from(working_days)).round_dp(2);
        let days_taught = dates.len() as u32;
        let earned = daily_rate * Decimal::from(days_taught);

        for date in dates {
            daily_earnings.push(EarningLine {
                date: *date,
                student_id: student_id.clone(),
                amount: daily_rate,
            });
        }
        students.push(StudentEarningsDetail {
            student_id: student_id.clone(),
            package_label,
            monthly_rate: resolved.monthly_rate,
            daily_rate,
            days_taught,
            earned,
        });
        daily_rates.insert(student_id.clone(), daily_rate);
        base_salary += earned;
    }

    daily_earnings.sort_by(|a, b| (a.date, &a.student_id).cmp(&(b.date, &b.student_id)));

    ProrationResult {
        working_days,
        daily_earnings,
        students,
        daily_rates,
        base_salary,
        anomalies,
    }
}
