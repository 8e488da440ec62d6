//! Teacher salary breakdown, the engine's primary result shape.
//!
//! The breakdown is a pure function of the store and configuration at
//! call time. It deliberately carries no generated ids and no
//! computed-at timestamp, so recomputing with unchanged inputs yields
//! byte-identical serialized output.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PaymentStatus;

/// Machine-readable classification of a non-fatal anomaly.
///
/// Anomalies mark inputs the pipeline resolved by policy instead of
/// failing, so payroll screens can still render a figure while flagging
/// what needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyCode {
    /// No rate matched the package label; the configured default was used.
    UnconfiguredPackage,
    /// The requested window contains no working days; earnings are zero.
    InvalidWindow,
    /// A student's daily rate could not be resolved; the stored record
    /// amount was used instead of repricing.
    UnresolvedDailyRate,
    /// Target earnings are configured as zero; achievement is undefined.
    ZeroTarget,
    /// The prior period produced zero earnings; growth is undefined.
    NoPriorBaseline,
}

/// A non-fatal marker attached to a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    /// What kind of anomaly this is.
    pub code: AnomalyCode,
    /// Human-readable detail naming the offending input.
    pub message: String,
}

impl Anomaly {
    /// Builds an anomaly from a code and message.
    pub fn new(code: AnomalyCode, message: impl Into<String>) -> Self {
        Anomaly {
            code,
            message: message.into(),
        }
    }
}

/// One date's earnings from one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningLine {
    /// The teaching date.
    pub date: NaiveDate,
    /// The student taught that date.
    pub student_id: String,
    /// The daily-rate amount earned.
    pub amount: Decimal,
}

/// Per-student rate and earnings detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentEarningsDetail {
    /// The student.
    pub student_id: String,
    /// The package label the rate was resolved from.
    pub package_label: String,
    /// The resolved monthly rate.
    pub monthly_rate: Decimal,
    /// The prorated daily rate for the window.
    pub daily_rate: Decimal,
    /// Distinct dates this student was taught in the window.
    pub days_taught: u32,
    /// `daily_rate` times `days_taught`, rounded.
    pub earned: Decimal,
}

/// One deduction applied against the salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLine {
    /// The underlying lateness or absence record.
    pub record_id: Uuid,
    /// The student the incident relates to.
    pub student_id: String,
    /// The incident date.
    pub date: NaiveDate,
    /// The deducted amount.
    pub amount: Decimal,
    /// Short explanation (tier applied, permission outcome, etc.).
    pub note: String,
}

/// One bonus credited to the salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusLine {
    /// The underlying bonus record.
    pub record_id: Uuid,
    /// The grant date.
    pub date: NaiveDate,
    /// The bonus amount.
    pub amount: Decimal,
    /// Why the bonus was granted.
    pub reason: String,
}

/// Summary statistics over the whole window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalarySummary {
    /// Working days in the window under the Sunday rule.
    pub working_days: u32,
    /// Distinct dates the teacher taught at least one student.
    pub days_taught: u32,
    /// Students taught at least once in the window.
    pub students_taught: u32,
    /// Prorated base salary across all students.
    pub base_salary: Decimal,
    /// `base_salary / days_taught`, rounded; zero when nothing was taught.
    pub average_daily_earning: Decimal,
    /// Summed lateness deductions.
    pub lateness_total: Decimal,
    /// Summed absence deductions.
    pub absence_total: Decimal,
    /// `lateness_total + absence_total`.
    pub total_deductions: Decimal,
    /// Summed bonuses.
    pub bonus_total: Decimal,
    /// `base_salary - total_deductions + bonus_total`.
    pub net_salary: Decimal,
}

/// The full per-teacher salary computation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherSalaryBreakdown {
    /// The teacher the breakdown is for.
    pub teacher_id: String,
    /// First date of the window (inclusive).
    pub from: NaiveDate,
    /// Last date of the window (inclusive).
    pub to: NaiveDate,
    /// Per-date earnings ledger, ordered by date then student.
    pub daily_earnings: Vec<EarningLine>,
    /// Per-student rate and earnings detail, ordered by student.
    pub students: Vec<StudentEarningsDetail>,
    /// Lateness deduction lines, ordered by date then record id.
    pub lateness_deductions: Vec<DeductionLine>,
    /// Absence deduction lines, ordered by date then record id.
    pub absence_deductions: Vec<DeductionLine>,
    /// Bonus lines, ordered by date then record id.
    pub bonuses: Vec<BonusLine>,
    /// Window-level summary statistics.
    pub summary: SalarySummary,
    /// Settlement status; `Unpaid` when no payment row exists.
    pub payment_status: PaymentStatus,
    /// Non-fatal anomalies encountered along the way.
    pub anomalies: Vec<Anomaly>,
}
