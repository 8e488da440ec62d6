//! The data-store seam the engine computes against.
//!
//! Every calculator reads through the [`SchoolStore`] trait, so the
//! engine works the same against the bundled in-memory store and any
//! database-backed implementation the surrounding application provides.
//! Store errors are infrastructure errors; an empty query result is
//! `Ok(vec![])`, never an error.

mod memory;

pub use memory::InMemoryStore;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::StoreResult;
use crate::models::{
    AbsenceRecord, BonusRecord, DeductionWaiverAudit, Enrollment, LatenessRecord, MatchedDeduction,
    PaymentStatus, Period, SalaryPayment, StudentPayment, TeachingActivityEvent, WaiverFilter,
};

/// Synchronous access to the school's records.
///
/// All date ranges are inclusive on both ends. Implementations must
/// return query results in a stable order (by date, then record id) so
/// that recomputing a result with unchanged data yields byte-identical
/// output.
///
/// The three write operations each execute as a single atomic unit:
/// `upsert_salary_payment` may never produce two rows for one
/// (teacher, period) key, and `apply_waiver` must re-match, flip and
/// audit in one transaction so no concurrent apply can double-waive or
/// drop records. When an implementation detects that a concurrent
/// writer interfered it returns [`StoreError::Conflict`] and the caller
/// retries with a fresh match.
///
/// [`StoreError::Conflict`]: crate::error::StoreError::Conflict
pub trait SchoolStore: Send + Sync {
    /// Whether a teacher with this id exists.
    fn teacher_exists(&self, teacher_id: &str) -> StoreResult<bool>;

    /// Whether a controller with this id exists.
    fn controller_exists(&self, controller_id: &str) -> StoreResult<bool>;

    /// Ids of every known controller, sorted.
    fn controller_ids(&self) -> StoreResult<Vec<String>>;

    /// Teaching activity events for a teacher within the window.
    fn activity_events(
        &self,
        teacher_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<TeachingActivityEvent>>;

    /// The enrollment for a student, if one exists.
    fn enrollment_for_student(&self, student_id: &str) -> StoreResult<Option<Enrollment>>;

    /// Every enrollment owned by a controller's cohort.
    fn enrollments_for_controller(&self, controller_id: &str) -> StoreResult<Vec<Enrollment>>;

    /// Every enrollment that names this controller as its referrer.
    fn enrollments_referred_by(&self, controller_id: &str) -> StoreResult<Vec<Enrollment>>;

    /// Lateness records for a teacher within the window, waived or not.
    fn lateness_records(
        &self,
        teacher_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<LatenessRecord>>;

    /// Absence records for a teacher within the window, waived or not.
    fn absence_records(
        &self,
        teacher_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<AbsenceRecord>>;

    /// Bonus records for a teacher within the window.
    fn bonus_records(
        &self,
        teacher_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<BonusRecord>>;

    /// The salary payment row for a (teacher, period) key, if recorded.
    fn salary_payment(&self, teacher_id: &str, period: Period) -> StoreResult<Option<SalaryPayment>>;

    /// Creates or updates the single salary payment row for the key.
    fn upsert_salary_payment(
        &self,
        teacher_id: &str,
        period: Period,
        status: PaymentStatus,
    ) -> StoreResult<SalaryPayment>;

    /// A student's payment records within the window.
    fn student_payments(
        &self,
        student_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<StudentPayment>>;

    /// Read-only waiver match: every non-waived deduction record the
    /// filter selects, as matched rows.
    fn match_waiver_candidates(&self, filter: &WaiverFilter) -> StoreResult<Vec<MatchedDeduction>>;

    /// Atomically re-matches the filter, flips `waived` on every
    /// matched record and appends one audit row. Returns the audit row.
    fn apply_waiver(
        &self,
        filter: &WaiverFilter,
        reason: &str,
        applied_at: DateTime<Utc>,
    ) -> StoreResult<DeductionWaiverAudit>;

    /// Every waiver audit row, oldest first.
    fn waiver_audits(&self) -> StoreResult<Vec<DeductionWaiverAudit>>;
}
