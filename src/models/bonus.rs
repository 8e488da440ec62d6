//! Discretionary bonus records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A one-off bonus granted to a teacher. No tiering; aggregation is a
/// straight sum over the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusRecord {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The teacher receiving the bonus.
    pub teacher_id: String,
    /// The date the bonus was granted.
    pub date: NaiveDate,
    /// Bonus amount.
    pub amount: Decimal,
    /// Why the bonus was granted.
    pub reason: String,
}
