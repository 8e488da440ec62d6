//! Lateness and absence deduction records.
//!
//! Both record kinds are created by external workflows (attendance
//! submission, permission review). The engine reads them, and the only
//! field it ever flips is `waived`, through the waiver engine's atomic
//! apply.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recorded late arrival to a scheduled session.
///
/// `deduction` holds the amount priced at record-creation time.
/// Aggregation reprices from the current tier table where it can, so a
/// config correction is reflected on recompute without touching rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatenessRecord {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The teacher who arrived late.
    pub teacher_id: String,
    /// The student whose session was affected.
    pub student_id: String,
    /// The date of the session.
    pub date: NaiveDate,
    /// When the session was scheduled to start.
    pub scheduled_time: NaiveTime,
    /// When the teacher actually arrived.
    pub actual_time: NaiveTime,
    /// Minutes between scheduled and actual start.
    pub minutes_late: u32,
    /// Deduction amount stored when the record was created.
    pub deduction: Decimal,
    /// True once a waiver has nullified this deduction.
    pub waived: bool,
}

/// A recorded unexplained or excused absence.
///
/// `permitted` is set by the permission-review workflow and overrides
/// any stored amount; `deduction_applied` is computed once at creation
/// from the package-specific flat rate, then frozen unless waived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceRecord {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The absent teacher.
    pub teacher_id: String,
    /// The student whose session was missed.
    pub student_id: String,
    /// The date of the missed session.
    pub date: NaiveDate,
    /// True if the absence was excused by permission review.
    pub permitted: bool,
    /// Deduction amount frozen at record-creation time.
    pub deduction_applied: Decimal,
    /// True once a waiver has nullified this deduction.
    pub waived: bool,
    /// Coarse reason bucket (e.g. "sick", "network", "unexplained").
    pub reason_category: String,
}
