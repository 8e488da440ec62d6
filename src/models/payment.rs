//! Salary payment status rows and student payment records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Period;

/// Whether a teacher's salary for a period has been paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Salary has been disbursed.
    Paid,
    /// Salary is outstanding. The default when no row exists.
    Unpaid,
}

/// Settlement state of one teacher's salary for one period.
///
/// Exactly one row exists per (teacher_id, period); the store's upsert
/// enforces the uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryPayment {
    /// The teacher being paid.
    pub teacher_id: String,
    /// The settlement period.
    pub period: Period,
    /// Current settlement state.
    pub status: PaymentStatus,
}

/// How a student settled a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    /// Money changed hands.
    Paid,
    /// A granted free-of-charge month. Counts as settled for the
    /// controller unpaid-penalty check.
    Free,
}

/// A student-side deposit or fee payment, used to decide "paid this
/// period" in the controller earnings pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPayment {
    /// Unique identifier for the payment.
    pub id: Uuid,
    /// The paying student.
    pub student_id: String,
    /// The date the payment was recorded.
    pub date: NaiveDate,
    /// Amount paid; zero for free-of-charge months.
    pub amount: Decimal,
    /// How the month was settled.
    pub kind: PaymentKind,
}
