//! Request types for the compensation engine API.
//!
//! This module defines the JSON request structures for the salary,
//! controller-earnings, waiver and payment-status endpoints.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::{PaymentStatus, WaiverFilter, WaiverKind};

/// Request body for the `/salary` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryRequest {
    /// The teacher to compute.
    pub teacher_id: String,
    /// First day of the window, inclusive.
    pub from: NaiveDate,
    /// Last day of the window, inclusive.
    pub to: NaiveDate,
}

/// Request body for the `/salary/batch` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSalaryRequest {
    /// The teachers to compute; duplicates are computed once.
    pub teacher_ids: Vec<String>,
    /// First day of the window, inclusive.
    pub from: NaiveDate,
    /// Last day of the window, inclusive.
    pub to: NaiveDate,
}

/// Request body for the `/controller-earnings` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerEarningsRequest {
    /// The period to compute, in `YYYY-MM` form.
    pub period: String,
    /// A single controller, or every known controller when omitted.
    #[serde(default)]
    pub controller_id: Option<String>,
}

/// Request body for the `/waivers/preview` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaiverPreviewRequest {
    /// Which deduction kind to match.
    pub kind: WaiverKind,
    /// The teachers whose records are in scope.
    pub teacher_ids: Vec<String>,
    /// First day of the match range, inclusive.
    pub from: NaiveDate,
    /// Last day of the match range, inclusive.
    pub to: NaiveDate,
    /// Optional scheduled-time slots narrowing a lateness match.
    #[serde(default)]
    pub time_slots: Option<Vec<NaiveTime>>,
}

/// Request body for the `/waivers/apply` endpoint.
///
/// Same filter shape as the preview, plus the mandatory audit reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaiverApplyRequest {
    /// Which deduction kind to match.
    pub kind: WaiverKind,
    /// The teachers whose records are in scope.
    pub teacher_ids: Vec<String>,
    /// First day of the match range, inclusive.
    pub from: NaiveDate,
    /// Last day of the match range, inclusive.
    pub to: NaiveDate,
    /// Optional scheduled-time slots narrowing a lateness match.
    #[serde(default)]
    pub time_slots: Option<Vec<NaiveTime>>,
    /// Why the deductions are being waived; recorded on the audit row.
    pub reason: String,
}

/// Request body for the `/payment-status` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusRequest {
    /// The teacher whose payment row to upsert.
    pub teacher_id: String,
    /// The settlement period, in `YYYY-MM` form.
    pub period: String,
    /// The status to record.
    pub status: PaymentStatus,
}

impl From<WaiverPreviewRequest> for WaiverFilter {
    fn from(req: WaiverPreviewRequest) -> Self {
        WaiverFilter {
            kind: req.kind,
            teacher_ids: req.teacher_ids,
            from: req.from,
            to: req.to,
            time_slots: req.time_slots,
        }
    }
}

impl WaiverApplyRequest {
    /// Splits the request into the match filter and the audit reason.
    pub fn into_parts(self) -> (WaiverFilter, String) {
        (
            WaiverFilter {
                kind: self.kind,
                teacher_ids: self.teacher_ids,
                from: self.from,
                to: self.to,
                time_slots: self.time_slots,
            },
            self.reason,
        )
    }
}
