//! Teaching-day reconciliation functionality.
//!
//! This module collapses raw per-event activity records into one
//! teaching-day set per student. The sets are derived, never persisted,
//! and recomputable byte-for-byte from the events plus configuration.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::TeachingActivityEvent;

/// Whether a date counts as a working/teaching day under the school's
/// Sunday rule.
pub fn is_working_day(date: NaiveDate, include_sundays: bool) -> bool {
    include_sundays || date.weekday() != Weekday::Sun
}

/// The reconciled teaching-day sets for one teacher's window.
///
/// Keys and dates are both ordered, so iterating the result is
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconciledActivity {
    /// Teaching dates per student. Students with no retained dates do
    /// not appear.
    pub teaching_days: BTreeMap<String, BTreeSet<NaiveDate>>,
}

impl ReconciledActivity {
    /// The union of all students' teaching dates.
    pub fn distinct_dates(&self) -> BTreeSet<NaiveDate> {
        self.teaching_days
            .values()
            .flat_map(|dates| dates.iter().copied())
            .collect()
    }

    /// How many students were taught at least once.
    pub fn students_taught(&self) -> u32 {
        self.teaching_days.len() as u32
    }
}

/// Collapses activity events into per-student teaching-day sets.
///
/// For each student the events are grouped by calendar date; Sundays
/// are dropped unless `include_sundays` is set; within each retained
/// date multiple events collapse to a single teaching day (only the
/// earliest conceptually counts, and a day is a day). Teaching pay
/// follows these events rather than formal assignment, so a teacher
/// substituting for a colleague earns for days they personally taught.
///
/// # Example
///
/// ```
/// use salary_engine::calculation::reconcile_teaching_days;
/// use salary_engine::models::TeachingActivityEvent;
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// let date = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(); // Monday
/// let events = vec![
///     TeachingActivityEvent {
///         id: Uuid::new_v4(),
///         teacher_id: "t-001".to_string(),
///         student_id: "s-001".to_string(),
///         occurred_at: date.and_hms_opt(9, 0, 0).unwrap(),
///     },
///     TeachingActivityEvent {
///         id: Uuid::new_v4(),
///         teacher_id: "t-001".to_string(),
///         student_id: "s-001".to_string(),
///         occurred_at: date.and_hms_opt(16, 0, 0).unwrap(),
///     },
/// ];
///
/// let reconciled = reconcile_teaching_days(&events, false);
/// assert_eq!(reconciled.teaching_days["s-001"].len(), 1);
/// ```
pub fn reconcile_teaching_days(
    events: &[TeachingActivityEvent],
    include_sundays: bool,
) -> ReconciledActivity {
    let mut teaching_days: BTreeMap<String, BTreeSet<NaiveDate>> = BTreeMap::new();

    for event in events {
        let date = event.occurred_on();
        if !is_working_day(date, include_sundays) {
            continue;
        }
        teaching_days
            .entry(event.student_id.clone())
            .or_default()
            .insert(date);
    }

    ReconciledActivity { teaching_days }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn event(student: &str, y: i32, m: u32, d: u32, hour: u32) -> TeachingActivityEvent {
        TeachingActivityEvent {
            id: Uuid::new_v4(),
            teacher_id: "t-001".to_string(),
            student_id: student.to_string(),
            occurred_at: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ==========================================================================
    // AR-001: multiple events on one day collapse to a single teaching day
    // ==========================================================================
    #[test]
    fn test_ar_001_multiple_events_one_day_collapse() {
        let events = vec![
            event("s-001", 2025, 11, 3, 9),
            event("s-001", 2025, 11, 3, 14),
            event("s-001", 2025, 11, 3, 18),
        ];
        let reconciled = reconcile_teaching_days(&events, false);
        assert_eq!(reconciled.teaching_days["s-001"].len(), 1);
        assert!(reconciled.teaching_days["s-001"].contains(&date(2025, 11, 3)));
    }

    // ==========================================================================
    // AR-002: Sundays are dropped unless configured in
    // ==========================================================================
    #[test]
    fn test_ar_002_sunday_dropped_by_default() {
        // 2025-11-02 is a Sunday.
        let events = vec![event("s-001", 2025, 11, 2, 10), event("s-001", 2025, 11, 3, 10)];

        let excluded = reconcile_teaching_days(&events, false);
        assert_eq!(excluded.teaching_days["s-001"].len(), 1);
        assert!(!excluded.teaching_days["s-001"].contains(&date(2025, 11, 2)));

        let included = reconcile_teaching_days(&events, true);
        assert_eq!(included.teaching_days["s-001"].len(), 2);
    }

    // ==========================================================================
    // AR-003: events are grouped per student
    // ==========================================================================
    #[test]
    fn test_ar_003_grouped_per_student() {
        let events = vec![
            event("s-002", 2025, 11, 3, 10),
            event("s-001", 2025, 11, 3, 11),
            event("s-001", 2025, 11, 4, 11),
        ];
        let reconciled = reconcile_teaching_days(&events, false);

        assert_eq!(reconciled.students_taught(), 2);
        assert_eq!(reconciled.teaching_days["s-001"].len(), 2);
        assert_eq!(reconciled.teaching_days["s-002"].len(), 1);

        // BTreeMap iteration is ordered by student id.
        let students: Vec<&String> = reconciled.teaching_days.keys().collect();
        assert_eq!(students, vec!["s-001", "s-002"]);
    }

    // ==========================================================================
    // AR-004: distinct dates union across students
    // ==========================================================================
    #[test]
    fn test_ar_004_distinct_dates_union() {
        let events = vec![
            event("s-001", 2025, 11, 3, 10),
            event("s-002", 2025, 11, 3, 14),
            event("s-002", 2025, 11, 5, 14),
        ];
        let reconciled = reconcile_teaching_days(&events, false);
        let dates = reconciled.distinct_dates();
        assert_eq!(dates.len(), 2);
        assert!(dates.contains(&date(2025, 11, 3)));
        assert!(dates.contains(&date(2025, 11, 5)));
    }

    // ==========================================================================
    // AR-005: a Sunday-only student disappears from the result
    // ==========================================================================
    #[test]
    fn test_ar_005_sunday_only_student_not_listed() {
        let events = vec![event("s-001", 2025, 11, 2, 10)]; // Sunday
        let reconciled = reconcile_teaching_days(&events, false);
        assert!(reconciled.teaching_days.is_empty());
        assert_eq!(reconciled.students_taught(), 0);
    }

    #[test]
    fn test_empty_events_give_empty_result() {
        let reconciled = reconcile_teaching_days(&[], false);
        assert!(reconciled.teaching_days.is_empty());
        assert!(reconciled.distinct_dates().is_empty());
    }

    #[test]
    fn test_is_working_day_sunday_rule() {
        let sunday = date(2025, 11, 2);
        let monday = date(2025, 11, 3);
        assert!(!is_working_day(sunday, false));
        assert!(is_working_day(sunday, true));
        assert!(is_working_day(monday, false));
    }
}
