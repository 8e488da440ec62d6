//! Enrollment records linking students to teachers, controllers and
//! packages.
//!
//! Enrollments are owned by the registration workflow and read-only to
//! the engine; every status transition happens elsewhere.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an enrollment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Currently enrolled and taught.
    Active,
    /// Registered but lessons have not started yet.
    NotYet,
    /// Temporarily away; counts toward the controller leave penalty.
    Leave,
    /// Seasonal leave; exempt from the leave penalty.
    RamadanLeave,
    /// Finished the program.
    Completed,
    /// Dropped out without completing.
    NotSucceed,
}

impl EnrollmentStatus {
    /// Returns true for statuses that earn controller base pay.
    pub fn is_active(&self) -> bool {
        matches!(self, EnrollmentStatus::Active)
    }
}

/// A student's enrollment with a teacher under a controller's cohort.
///
/// `package_label` drives rate resolution for the teacher's salary;
/// `status`, `leave_started_on` and the referral fields drive the
/// controller earnings pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// The enrolled student.
    pub student_id: String,
    /// The teacher assigned to the student.
    pub teacher_id: String,
    /// The controller who owns the student's cohort.
    pub controller_id: String,
    /// Package label, the key into the rate table (e.g. "3 days/week").
    pub package_label: String,
    /// Declared weekly schedule (e.g. "mon_wed_fri"). Informational;
    /// teaching pay follows activity events, not this pattern.
    pub day_pattern: String,
    /// Current lifecycle status.
    pub status: EnrollmentStatus,
    /// The date lessons started.
    pub start_date: NaiveDate,
    /// The date the student registered.
    pub registration_date: NaiveDate,
    /// When the current leave began, for `Leave`/`RamadanLeave` statuses.
    pub leave_started_on: Option<NaiveDate>,
    /// The controller whose referral code registered this student.
    pub referrer_controller_id: Option<String>,
    /// Set once the registration workflow has paid out the referral,
    /// so the earnings pipeline never double-counts it.
    #[serde(default)]
    pub referral_claimed: bool,
}

impl Enrollment {
    /// Returns true if the enrollment was registered via a referral.
    pub fn is_referral(&self) -> bool {
        self.referrer_controller_id.is_some()
    }
}
