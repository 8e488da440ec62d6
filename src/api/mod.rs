//! HTTP API module for the compensation engine.
//!
//! This module provides the REST API endpoints for salary and
//! controller-earnings computation, waivers and payment status.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    BatchSalaryRequest, ControllerEarningsRequest, PaymentStatusRequest, SalaryRequest,
    WaiverApplyRequest, WaiverPreviewRequest,
};
pub use response::{ApiError, BatchEntryResponse};
pub use state::AppState;
