//! Tiered lateness deduction functionality.
//!
//! Lateness incidents are recorded against a scheduled session start.
//! At calculation time each unwaived incident is priced as a
//! percentage of that student's current daily rate, so deductions
//! follow rate changes instead of freezing the amount recorded on the
//! day of the incident.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::config::SalaryCalculationConfig;
use crate::models::{Anomaly, AnomalyCode, DeductionLine, LatenessRecord};

/// The priced outcome of one teacher's lateness records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatenessResult {
    /// One line per deducted incident, ordered by date then record id.
    pub lines: Vec<DeductionLine>,
    /// Sum of all lines.
    pub total: Decimal,
    /// Records that had to fall back to their stored amount.
    pub anomalies: Vec<Anomaly>,
}

/// Prices lateness records against the tier table.
///
/// Waived records are skipped entirely. Lateness below the excused
/// threshold deducts nothing. Otherwise the first tier containing
/// `minutes_late` wins; tiers are half-open, so a 20-minute lateness
/// with a `[10, 20)` tier falls through to the next one. The deduction
/// is the tier percentage of the student's daily rate from
/// `daily_rates`, rounded to 2 decimal places.
///
/// When a student's daily rate is absent from `daily_rates` the record
/// cannot be repriced; its stored amount is used as-is and an anomaly
/// is raised.
pub fn apply_lateness_deductions(
    records: &[LatenessRecord],
    config: &SalaryCalculationConfig,
    daily_rates: &BTreeMap<String, Decimal>,
) -> LatenessResult {
    let mut lines = Vec::new();
    let mut anomalies = Vec::new();

    for record in records {
        if record.waived {
            continue;
        }
        if record.minutes_late < config.excused_threshold_minutes {
            continue;
        }
        let Some(tier) = config
            .lateness_tiers
            .iter()
            .find(|tier| tier.contains(record.minutes_late))
        else {
            continue;
        };
        if tier.percent.is_zero() {
            continue;
        }

        let (amount, note) = match daily_rates.get(&record.student_id) {
            Some(daily_rate) => {
                let amount = (*daily_rate * tier.percent / Decimal::from(100)).round_dp(2);
                let note = format!(
                    "{} min late: {}% of daily rate {}",
                    record.minutes_late, tier.percent, daily_rate
                );
                (amount, note)
            }
            None => {
                anomalies.push(Anomaly::new(
                    AnomalyCode::UnresolvedDailyRate,
                    format!(
                        "no daily rate for student '{}'; lateness record {} kept its stored amount",
                        record.student_id, record.id
                    ),
                ));
                let note = format!(
                    "{} min late: stored amount, daily rate unresolved",
                    record.minutes_late
                );
                (record.deduction, note)
            }
        };

        lines.push(DeductionLine {
            record_id: record.id,
            student_id: record.student_id.clone(),
            date: record.date,
            amount,
            note,
        });
    }

    lines.sort_by(|a, b| (a.date, a.record_id).cmp(&(b.date, b.record_id)));
    let total = lines.iter().map(|line| line.amount).sum();

    LatenessResult {
        lines,
        total,
        anomalies,
    }
}
