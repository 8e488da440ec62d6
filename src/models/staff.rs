//! Teacher and controller identity records.

use serde::{Deserialize, Serialize};

/// A teacher known to the school. The engine only needs identity; all
/// pay-relevant facts live in activity events, enrollments and
/// deduction records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique identifier for the teacher.
    pub id: String,
    /// Display name.
    pub full_name: String,
}

/// A controller (team lead) responsible for a cohort of students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controller {
    /// Unique identifier for the controller.
    pub id: String,
    /// Display name.
    pub full_name: String,
}
