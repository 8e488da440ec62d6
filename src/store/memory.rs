//! Mutex-guarded in-memory implementation of [`SchoolStore`].
//!
//! Used by the tests, the benches and the demo API. The single mutex
//! makes every write trivially atomic; the offline toggle and conflict
//! injection exist so callers can exercise the infrastructure-error and
//! retry paths without a real database.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{
    AbsenceRecord, BonusRecord, Controller, DeductionWaiverAudit, Enrollment, LatenessRecord,
    MatchedDeduction, PaymentStatus, Period, SalaryPayment, StudentPayment, Teacher,
    TeachingActivityEvent, WaiverFilter, WaiverKind,
};

use super::SchoolStore;

#[derive(Debug, Default)]
struct StoreData {
    teachers: Vec<Teacher>,
    controllers: Vec<Controller>,
    events: Vec<TeachingActivityEvent>,
    enrollments: Vec<Enrollment>,
    lateness: Vec<LatenessRecord>,
    absences: Vec<AbsenceRecord>,
    bonuses: Vec<BonusRecord>,
    salary_payments: Vec<SalaryPayment>,
    student_payments: Vec<StudentPayment>,
    audits: Vec<DeductionWaiverAudit>,
}

/// In-memory [`SchoolStore`] backed by a single mutex.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: Mutex<StoreData>,
    offline: AtomicBool,
    conflicts_to_inject: AtomicU32,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the backing store being unreachable. While offline,
    /// every operation fails with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Makes the next `n` calls to `apply_waiver` fail with
    /// [`StoreError::Conflict`] before touching any data.
    pub fn fail_next_applies(&self, n: u32) {
        self.conflicts_to_inject.store(n, Ordering::SeqCst);
    }

    /// Seeds a teacher.
    pub fn add_teacher(&self, teacher: Teacher) {
        if let Ok(mut data) = self.data.lock() {
            data.teachers.push(teacher);
        }
    }

    /// Seeds a controller.
    pub fn add_controller(&self, controller: Controller) {
        if let Ok(mut data) = self.data.lock() {
            data.controllers.push(controller);
        }
    }

    /// Seeds a teaching activity event.
    pub fn add_event(&self, event: TeachingActivityEvent) {
        if let Ok(mut data) = self.data.lock() {
            data.events.push(event);
        }
    }

    /// Seeds an enrollment.
    pub fn add_enrollment(&self, enrollment: Enrollment) {
        if let Ok(mut data) = self.data.lock() {
            data.enrollments.push(enrollment);
        }
    }

    /// Seeds a lateness record.
    pub fn add_lateness(&self, record: LatenessRecord) {
        if let Ok(mut data) = self.data.lock() {
            data.lateness.push(record);
        }
    }

    /// Seeds an absence record.
    pub fn add_absence(&self, record: AbsenceRecord) {
        if let Ok(mut data) = self.data.lock() {
            data.absences.push(record);
        }
    }

    /// Seeds a bonus record.
    pub fn add_bonus(&self, record: BonusRecord) {
        if let Ok(mut data) = self.data.lock() {
            data.bonuses.push(record);
        }
    }

    /// Seeds a student payment.
    pub fn add_student_payment(&self, payment: StudentPayment) {
        if let Ok(mut data) = self.data.lock() {
            data.student_payments.push(payment);
        }
    }

    fn guard(&self) -> StoreResult<std::sync::MutexGuard<'_, StoreData>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                message: "in-memory store is offline".to_string(),
            });
        }
        self.data.lock().map_err(|_| StoreError::Unavailable {
            message: "store lock poisoned".to_string(),
        })
    }

    fn take_injected_conflict(&self) -> bool {
        self.conflicts_to_inject
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn match_in_data(data: &StoreData, filter: &WaiverFilter) -> Vec<MatchedDeduction> {
        let mut matched: Vec<MatchedDeduction> = match filter.kind {
            WaiverKind::Lateness => data
                .lateness
                .iter()
                .filter(|r| filter.matches_lateness(r))
                .map(MatchedDeduction::from_lateness)
                .collect(),
            WaiverKind::Absence => data
                .absences
                .iter()
                .filter(|r| filter.matches_absence(r))
                .map(MatchedDeduction::from_absence)
                .collect(),
        };
        matched.sort_by(|a, b| (a.date, a.record_id).cmp(&(b.date, b.record_id)));
        matched
    }
}

impl SchoolStore for InMemoryStore {
    fn teacher_exists(&self, teacher_id: &str) -> StoreResult<bool> {
        let data = self.guard()?;
        Ok(data.teachers.iter().any(|t| t.id == teacher_id))
    }

    fn controller_exists(&self, controller_id: &str) -> StoreResult<bool> {
        let data = self.guard()?;
        Ok(data.controllers.iter().any(|c| c.id == controller_id))
    }

    fn controller_ids(&self) -> StoreResult<Vec<String>> {
        let data = self.guard()?;
        let mut ids: Vec<String> = data.controllers.iter().map(|c| c.id.clone()).collect();
        ids.sort();
        Ok(ids)
    }

    fn activity_events(
        &self,
        teacher_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<TeachingActivityEvent>> {
        let data = self.guard()?;
        let mut events: Vec<TeachingActivityEvent> = data
            .events
            .iter()
            .filter(|e| {
                e.teacher_id == teacher_id && e.occurred_on() >= from && e.occurred_on() <= to
            })
            .cloned()
            .collect();
        events.sort_by(|a, b| (a.occurred_at, a.id).cmp(&(b.occurred_at, b.id)));
        Ok(events)
    }

    fn enrollment_for_student(&self, student_id: &str) -> StoreResult<Option<Enrollment>> {
        let data = self.guard()?;
        Ok(data
            .enrollments
            .iter()
            .find(|e| e.student_id == student_id)
            .cloned())
    }

    fn enrollments_for_controller(&self, controller_id: &str) -> StoreResult<Vec<Enrollment>> {
        let data = self.guard()?;
        let mut enrollments: Vec<Enrollment> = data
            .enrollments
            .iter()
            .filter(|e| e.controller_id == controller_id)
            .cloned()
            .collect();
        enrollments.sort_by(|a, b| a.student_id.cmp(&b.student_id));
        Ok(enrollments)
    }

    fn enrollments_referred_by(&self, controller_id: &str) -> StoreResult<Vec<Enrollment>> {
        let data = self.guard()?;
        let mut enrollments: Vec<Enrollment> = data
            .enrollments
            .iter()
            .filter(|e| e.referrer_controller_id.as_deref() == Some(controller_id))
            .cloned()
            .collect();
        enrollments.sort_by(|a, b| a.student_id.cmp(&b.student_id));
        Ok(enrollments)
    }

    fn lateness_records(
        &self,
        teacher_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<LatenessRecord>> {
        let data = self.guard()?;
        let mut records: Vec<LatenessRecord> = data
            .lateness
            .iter()
            .filter(|r| r.teacher_id == teacher_id && r.date >= from && r.date <= to)
            .cloned()
            .collect();
        records.sort_by(|a, b| (a.date, a.id).cmp(&(b.date, b.id)));
        Ok(records)
    }

    fn absence_records(
        &self,
        teacher_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<AbsenceRecord>> {
        let data = self.guard()?;
        let mut records: Vec<AbsenceRecord> = data
            .absences
            .iter()
            .filter(|r| r.teacher_id == teacher_id && r.date >= from && r.date <= to)
            .cloned()
            .collect();
        records.sort_by(|a, b| (a.date, a.id).cmp(&(b.date, b.id)));
        Ok(records)
    }

    fn bonus_records(
        &self,
        teacher_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<BonusRecord>> {
        let data = self.guard()?;
        let mut records: Vec<BonusRecord> = data
            .bonuses
            .iter()
            .filter(|r| r.teacher_id == teacher_id && r.date >= from && r.date <= to)
            .cloned()
            .collect();
        records.sort_by(|a, b| (a.date, a.id).cmp(&(b.date, b.id)));
        Ok(records)
    }

    fn salary_payment(
        &self,
        teacher_id: &str,
        period: Period,
    ) -> StoreResult<Option<SalaryPayment>> {
        let data = self.guard()?;
        Ok(data
            .salary_payments
            .iter()
            .find(|p| p.teacher_id == teacher_id && p.period == period)
            .cloned())
    }

    fn upsert_salary_payment(
        &self,
        teacher_id: &str,
        period: Period,
        status: PaymentStatus,
    ) -> StoreResult<SalaryPayment> {
        let mut data = self.guard()?;
        if let Some(existing) = data
            .salary_payments
            .iter_mut()
            .find(|p| p.teacher_id == teacher_id && p.period == period)
        {
            existing.status = status;
            return Ok(existing.clone());
        }
        let row = SalaryPayment {
            teacher_id: teacher_id.to_string(),
            period,
            status,
        };
        data.salary_payments.push(row.clone());
        Ok(row)
    }

    fn student_payments(
        &self,
        student_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<StudentPayment>> {
        let data = self.guard()?;
        let mut payments: Vec<StudentPayment> = data
            .student_payments
            .iter()
            .filter(|p| p.student_id == student_id && p.date >= from && p.date <= to)
            .cloned()
            .collect();
        payments.sort_by(|a, b| (a.date, a.id).cmp(&(b.date, b.id)));
        Ok(payments)
    }

    fn match_waiver_candidates(&self, filter: &WaiverFilter) -> StoreResult<Vec<MatchedDeduction>> {
        let data = self.guard()?;
        Ok(Self::match_in_data(&data, filter))
    }

    fn apply_waiver(
        &self,
        filter: &WaiverFilter,
        reason: &str,
        applied_at: DateTime<Utc>,
    ) -> StoreResult<DeductionWaiverAudit> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                message: "in-memory store is offline".to_string(),
            });
        }
        if self.take_injected_conflict() {
            return Err(StoreError::Conflict {
                message: "concurrent waiver apply on overlapping filter".to_string(),
            });
        }

        // Single lock section: re-match, flip, audit.
        let mut data = self.guard()?;
        let matched = Self::match_in_data(&data, filter);

        match filter.kind {
            WaiverKind::Lateness => {
                for record in data.lateness.iter_mut() {
                    if filter.matches_lateness(record) {
                        record.waived = true;
                    }
                }
            }
            WaiverKind::Absence => {
                for record in data.absences.iter_mut() {
                    if filter.matches_absence(record) {
                        record.waived = true;
                    }
                }
            }
        }

        let audit = DeductionWaiverAudit {
            id: Uuid::new_v4(),
            adjustment_type: filter.kind,
            from: filter.from,
            to: filter.to,
            teacher_ids: filter.teacher_ids.clone(),
            time_slots: filter.time_slots.clone(),
            reason: reason.to_string(),
            applied_at,
            records_affected: matched.len() as u32,
            amount_waived: matched.iter().map(|m| m.amount).sum(),
        };
        data.audits.push(audit.clone());
        Ok(audit)
    }

    fn waiver_audits(&self) -> StoreResult<Vec<DeductionWaiverAudit>> {
        let data = self.guard()?;
        Ok(data.audits.clone())
    }
}
