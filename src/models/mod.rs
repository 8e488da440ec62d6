//! Core data models for the compensation engine.
//!
//! This module contains all the domain models used throughout the engine.

mod activity;
mod bonus;
mod breakdown;
mod controller;
mod deduction;
mod enrollment;
mod payment;
mod period;
mod staff;
mod waiver;

pub use activity::TeachingActivityEvent;
pub use bonus::BonusRecord;
pub use breakdown::{
    Anomaly, AnomalyCode, BonusLine, DeductionLine, EarningLine, SalarySummary,
    StudentEarningsDetail, TeacherSalaryBreakdown,
};
pub use controller::ControllerEarnings;
pub use deduction::{AbsenceRecord, LatenessRecord};
pub use enrollment::{Enrollment, EnrollmentStatus};
pub use payment::{PaymentKind, PaymentStatus, SalaryPayment, StudentPayment};
pub use period::Period;
pub use staff::{Controller, Teacher};
pub use waiver::{
    DeductionWaiverAudit, MatchedDeduction, TeacherWaiverSubtotal, WaiverFilter, WaiverKind,
    WaiverPreview, WaiverReceipt,
};
