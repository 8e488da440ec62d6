//! Calculation logic for the compensation engine.
//!
//! This module contains all the calculation functions for determining pay,
//! including package-rate resolution, teaching-day reconciliation from raw
//! activity events, monthly-rate proration over working days, tiered
//! lateness deductions, absence deductions with the permission override,
//! bonus summation, the per-teacher salary aggregator and the per-period
//! controller earnings calculation.

mod absence;
mod activity;
mod bonus;
mod controller;
mod lateness;
mod proration;
mod rate_resolver;
mod salary;

pub use absence::{AbsenceResult, apply_absence_deductions, flat_absence_deduction};
pub use activity::{ReconciledActivity, is_working_day, reconcile_teaching_days};
pub use bonus::{BonusResult, sum_bonuses};
pub use controller::compute_controller_earnings;
pub use lateness::{LatenessResult, apply_lateness_deductions};
pub use proration::{ProrationResult, prorate_earnings, working_days_in_window};
pub use rate_resolver::{RateResolver, ResolvedRate};
pub use salary::compute_salary_breakdown;
