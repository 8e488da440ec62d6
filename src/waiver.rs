//! Deduction waiver workflow.
//!
//! Waiving is the only mutation this engine performs on deduction
//! records, so it is deliberately ceremonial: a request must be
//! validated, then previewed, and only a previewed waiver can be
//! applied. The progression is enforced by types rather than runtime
//! flags. The preview is advisory; apply re-runs the match inside one
//! atomic store transaction, so records that changed between the two
//! steps are handled by the re-match, never double-waived.

use chrono::Utc;
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult, StoreError};
use crate::models::{WaiverFilter, WaiverPreview, WaiverReceipt};
use crate::store::SchoolStore;

/// How many times an apply re-runs its atomic transaction after a
/// store conflict before giving up.
pub const MAX_APPLY_ATTEMPTS: u32 = 3;

/// Rejects blank waiver reasons, returning the trimmed reason.
///
/// Shared by the facade (which fails fast before the preview read) and
/// the apply step itself.
pub(crate) fn validate_reason(reason: &str) -> EngineResult<&str> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(EngineError::ValidationError {
            field: "reason".to_string(),
            message: "a waiver reason is required".to_string(),
        });
    }
    Ok(trimmed)
}

/// A validated waiver request that has not yet touched the store.
#[derive(Debug, Clone)]
pub struct WaiverRequest {
    filter: WaiverFilter,
}

impl WaiverRequest {
    /// Validates the filter before any store read.
    ///
    /// An empty teacher set or an inverted date range is rejected
    /// here, so a malformed request never produces a plausible-looking
    /// empty preview.
    pub fn new(filter: WaiverFilter) -> EngineResult<Self> {
        if filter.teacher_ids.is_empty() {
            return Err(EngineError::ValidationError {
                field: "teacher_ids".to_string(),
                message: "at least one teacher id is required".to_string(),
            });
        }
        if filter.teacher_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(EngineError::ValidationError {
                field: "teacher_ids".to_string(),
                message: "teacher ids must not be blank".to_string(),
            });
        }
        if filter.from > filter.to {
            return Err(EngineError::ValidationError {
                field: "date_range".to_string(),
                message: format!("from {} is after to {}", filter.from, filter.to),
            });
        }
        Ok(WaiverRequest { filter })
    }

    /// The validated filter.
    pub fn filter(&self) -> &WaiverFilter {
        &self.filter
    }

    /// Runs the read-only match and moves to the previewed state.
    ///
    /// Matching zero records is a success; the preview simply shows
    /// zero counts.
    pub fn preview(self, store: &dyn SchoolStore) -> EngineResult<PreviewedWaiver> {
        let matched = store.match_waiver_candidates(&self.filter)?;
        let preview = WaiverPreview::from_matches(&self.filter, matched);
        Ok(PreviewedWaiver {
            filter: self.filter,
            preview,
        })
    }
}

/// A previewed waiver, the only state from which apply is reachable.
#[derive(Debug, Clone)]
pub struct PreviewedWaiver {
    filter: WaiverFilter,
    preview: WaiverPreview,
}

impl PreviewedWaiver {
    /// The dry-run result of the match.
    pub fn preview(&self) -> &WaiverPreview {
        &self.preview
    }

    /// Consumes the state and yields the preview data.
    pub fn into_preview(self) -> WaiverPreview {
        self.preview
    }

    /// Commits the waiver.
    ///
    /// Requires a non-empty reason. The store re-matches the filter,
    /// flips every matched record and writes the audit row in a single
    /// atomic transaction; a [`StoreError::Conflict`] from a racing
    /// overlapping waiver is retried with a fresh match up to
    /// [`MAX_APPLY_ATTEMPTS`] times, then surfaced as
    /// [`EngineError::WaiverConflict`].
    pub fn apply(self, store: &dyn SchoolStore, reason: &str) -> EngineResult<WaiverReceipt> {
        let reason = validate_reason(reason)?;

        let mut attempts = 0;
        loop {
            attempts += 1;
            match store.apply_waiver(&self.filter, reason, Utc::now()) {
                Ok(audit) => {
                    info!(
                        adjustment_type = ?audit.adjustment_type,
                        records_affected = audit.records_affected,
                        %audit.amount_waived,
                        reason,
                        "waiver applied"
                    );
                    return Ok(WaiverReceipt {
                        audit_id: audit.id,
                        records_affected: audit.records_affected,
                        amount_waived: audit.amount_waived,
                        applied_at: audit.applied_at,
                    });
                }
                Err(StoreError::Conflict { message }) if attempts < MAX_APPLY_ATTEMPTS => {
                    warn!(attempts, %message, "waiver apply conflicted, retrying");
                }
                Err(StoreError::Conflict { .. }) => {
                    return Err(EngineError::WaiverConflict { attempts });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
