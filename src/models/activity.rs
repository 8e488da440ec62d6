//! Teaching activity events, the source of truth for teaching pay.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A timestamped record evidencing that a teacher actually taught a
/// student. Produced externally (for example by per-session link
/// dispatch), immutable and append-only.
///
/// Multiple events per student per day are possible; reconciliation
/// keeps only the earliest per calendar date. Pay follows these events
/// rather than formal assignment, so a teacher substituting for a
/// colleague earns for the days they personally taught.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeachingActivityEvent {
    /// Unique identifier for the event.
    pub id: Uuid,
    /// The teacher who delivered the session.
    pub teacher_id: String,
    /// The student who received the session.
    pub student_id: String,
    /// When the session took place.
    pub occurred_at: NaiveDateTime,
}

impl TeachingActivityEvent {
    /// The calendar date the event falls on.
    pub fn occurred_on(&self) -> NaiveDate {
        self.occurred_at.date()
    }
}
