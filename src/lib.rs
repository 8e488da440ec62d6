//! Compensation calculation engine for a tutoring school
//!
//! This crate derives teacher salaries and controller earnings from
//! activity, enrollment and payment records: package-rate resolution,
//! teaching-day reconciliation, proration, tiered lateness and absence
//! deductions, bonuses, audited deduction waivers and payment-status
//! tracking.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
pub mod waiver;
