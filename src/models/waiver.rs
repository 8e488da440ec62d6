//! Waiver filter, preview/receipt shapes and the durable audit row.
//!
//! A waiver retroactively nullifies deduction records for a filtered
//! set. The filter's match predicate is defined here, in one place,
//! because preview and apply must agree on it exactly.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AbsenceRecord, LatenessRecord};

/// Which kind of deduction a waiver targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaiverKind {
    /// Lateness deductions.
    Lateness,
    /// Absence deductions.
    Absence,
}

/// The match criteria of a waiver action.
///
/// The same filter drives the read-only preview and the atomic apply;
/// apply re-runs the match so the two can never act on different rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaiverFilter {
    /// Which deduction kind to match.
    pub kind: WaiverKind,
    /// Teachers whose records are in scope.
    pub teacher_ids: Vec<String>,
    /// First date in scope (inclusive).
    pub from: NaiveDate,
    /// Last date in scope (inclusive).
    pub to: NaiveDate,
    /// Optional scheduled-time filter. Narrows lateness matches; absence
    /// records carry no slot, so it is ignored for them.
    #[serde(default)]
    pub time_slots: Option<Vec<NaiveTime>>,
}

impl WaiverFilter {
    /// Whether a lateness record is matched by this filter.
    ///
    /// Already-waived records never match, which is what makes repeated
    /// applications of the same filter waive nothing further.
    pub fn matches_lateness(&self, record: &LatenessRecord) -> bool {
        self.kind == WaiverKind::Lateness
            && !record.waived
            && self.teacher_ids.iter().any(|t| *t == record.teacher_id)
            && record.date >= self.from
            && record.date <= self.to
            && self
                .time_slots
                .as_ref()
                .map_or(true, |slots| slots.contains(&record.scheduled_time))
    }

    /// Whether an absence record is matched by this filter.
    ///
    /// Permitted absences already contribute zero deduction and are
    /// excluded, so waiving them would change nothing and only inflate
    /// the audit row.
    pub fn matches_absence(&self, record: &AbsenceRecord) -> bool {
        self.kind == WaiverKind::Absence
            && !record.waived
            && !record.permitted
            && self.teacher_ids.iter().any(|t| *t == record.teacher_id)
            && record.date >= self.from
            && record.date <= self.to
    }
}

/// One deduction record matched by a waiver filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedDeduction {
    /// The matched record's id.
    pub record_id: Uuid,
    /// The teacher the deduction belongs to.
    pub teacher_id: String,
    /// The student the deduction relates to.
    pub student_id: String,
    /// The date of the underlying incident.
    pub date: NaiveDate,
    /// The stored deduction amount that would be waived.
    pub amount: Decimal,
}

impl MatchedDeduction {
    /// Builds a matched row from a lateness record.
    pub fn from_lateness(record: &LatenessRecord) -> Self {
        MatchedDeduction {
            record_id: record.id,
            teacher_id: record.teacher_id.clone(),
            student_id: record.student_id.clone(),
            date: record.date,
            amount: record.deduction,
        }
    }

    /// Builds a matched row from an absence record.
    pub fn from_absence(record: &AbsenceRecord) -> Self {
        MatchedDeduction {
            record_id: record.id,
            teacher_id: record.teacher_id.clone(),
            student_id: record.student_id.clone(),
            date: record.date,
            amount: record.deduction_applied,
        }
    }
}

/// Per-teacher subtotal within a waiver preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherWaiverSubtotal {
    /// The teacher.
    pub teacher_id: String,
    /// Matched record count for this teacher.
    pub records: u32,
    /// Summed waivable amount for this teacher.
    pub amount: Decimal,
}

/// The dry-run result shown before a waiver may be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaiverPreview {
    /// Which deduction kind was matched.
    pub kind: WaiverKind,
    /// First date in scope (inclusive).
    pub from: NaiveDate,
    /// Last date in scope (inclusive).
    pub to: NaiveDate,
    /// Every matched record, ordered by teacher, date, then id.
    pub matched: Vec<MatchedDeduction>,
    /// Per-teacher subtotals, ordered by teacher id.
    pub per_teacher: Vec<TeacherWaiverSubtotal>,
    /// Total matched record count.
    pub records_matched: u32,
    /// Grand total that applying would waive.
    pub amount_waivable: Decimal,
}

impl WaiverPreview {
    /// Assembles a preview from matched rows, computing subtotals and
    /// totals and fixing a deterministic order.
    pub fn from_matches(
        filter: &WaiverFilter,
        mut matched: Vec<MatchedDeduction>,
    ) -> Self {
        matched.sort_by(|a, b| {
            (&a.teacher_id, a.date, a.record_id).cmp(&(&b.teacher_id, b.date, b.record_id))
        });

        let mut per_teacher: Vec<TeacherWaiverSubtotal> = Vec::new();
        for row in &matched {
            match per_teacher.last_mut() {
                Some(subtotal) if subtotal.teacher_id == row.teacher_id => {
                    subtotal.records += 1;
                    subtotal.amount += row.amount;
                }
                _ => per_teacher.push(TeacherWaiverSubtotal {
                    teacher_id: row.teacher_id.clone(),
                    records: 1,
                    amount: row.amount,
                }),
            }
        }

        let records_matched = matched.len() as u32;
        let amount_waivable = matched.iter().map(|r| r.amount).sum();

        WaiverPreview {
            kind: filter.kind,
            from: filter.from,
            to: filter.to,
            matched,
            per_teacher,
            records_matched,
            amount_waivable,
        }
    }
}

/// The outcome of a confirmed waiver application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaiverReceipt {
    /// The audit row written for this action.
    pub audit_id: Uuid,
    /// How many records were flipped to waived.
    pub records_affected: u32,
    /// The summed amount those records carried.
    pub amount_waived: Decimal,
    /// When the apply committed.
    pub applied_at: DateTime<Utc>,
}

/// Append-only audit row, written exactly once per confirmed waiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionWaiverAudit {
    /// Unique identifier for the audit row.
    pub id: Uuid,
    /// Which deduction kind was waived.
    pub adjustment_type: WaiverKind,
    /// First date of the waived range (inclusive).
    pub from: NaiveDate,
    /// Last date of the waived range (inclusive).
    pub to: NaiveDate,
    /// Teachers in scope.
    pub teacher_ids: Vec<String>,
    /// Scheduled-time filter, if one was used.
    pub time_slots: Option<Vec<NaiveTime>>,
    /// The operator-supplied justification.
    pub reason: String,
    /// When the apply committed.
    pub applied_at: DateTime<Utc>,
    /// How many records were flipped.
    pub records_affected: u32,
    /// The summed amount those records carried.
    pub amount_waived: Decimal,
}
