//! High-level facade tying configuration, rate resolution and the
//! school data store together.
//!
//! [`SalaryEngine`] is the entry point the API layer talks to. It is
//! cheap to clone (everything inside is reference counted) and safe to
//! share across request handlers and spawned tasks.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Semaphore;
use tracing::info;

use crate::calculation::{self, RateResolver};
use crate::config::SchoolConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ControllerEarnings, PaymentStatus, Period, SalaryPayment, TeacherSalaryBreakdown,
    WaiverFilter, WaiverPreview, WaiverReceipt,
};
use crate::store::SchoolStore;
use crate::waiver::{validate_reason, WaiverRequest};

/// Default cap on concurrently computed teachers or controllers in a
/// batch run.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 8;

/// One teacher's outcome within a batch salary run.
///
/// A failed entry never aborts its siblings; callers decide how to
/// surface partial failure.
#[derive(Debug)]
pub struct BatchEntry {
    /// The teacher this entry belongs to.
    pub teacher_id: String,
    /// The breakdown, or the error that stopped this teacher alone.
    pub outcome: EngineResult<TeacherSalaryBreakdown>,
}

/// Facade over the whole compensation engine.
///
/// Construction derives a [`RateResolver`] from the configured package
/// table once; every computation afterwards reuses it.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::Arc;
///
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use salary_engine::config::{SalaryCalculationConfig, SchoolConfig, SchoolMetadata};
/// use salary_engine::engine::SalaryEngine;
/// use salary_engine::models::{Enrollment, EnrollmentStatus, Teacher, TeachingActivityEvent};
/// use salary_engine::store::InMemoryStore;
/// use uuid::Uuid;
///
/// let store = Arc::new(InMemoryStore::new());
/// store.add_teacher(Teacher {
///     id: "t-001".to_string(),
///     full_name: "Abebe Kebede".to_string(),
/// });
/// store.add_enrollment(Enrollment {
///     student_id: "s-001".to_string(),
///     teacher_id: "t-001".to_string(),
///     controller_id: "c-001".to_string(),
///     package_label: "Grade 5".to_string(),
///     day_pattern: "MWF".to_string(),
///     status: EnrollmentStatus::Active,
///     start_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
///     registration_date: NaiveDate::from_ymd_opt(2025, 8, 28).unwrap(),
///     leave_started_on: None,
///     referrer_controller_id: None,
///     referral_claimed: false,
/// });
/// for day in 1..=10 {
///     store.add_event(TeachingActivityEvent {
///         id: Uuid::new_v4(),
///         teacher_id: "t-001".to_string(),
///         student_id: "s-001".to_string(),
///         occurred_at: NaiveDate::from_ymd_opt(2025, 9, day)
///             .unwrap()
///             .and_hms_opt(9, 0, 0)
///             .unwrap(),
///     });
/// }
///
/// let config = SchoolConfig::new(
///     SchoolMetadata {
///         name: "Example School".to_string(),
///         currency: "ETB".to_string(),
///         version: "2025-09".to_string(),
///     },
///     HashMap::from([("Grade 5".to_string(), Decimal::from(3000))]),
///     SalaryCalculationConfig {
///         include_sundays: true,
///         excused_threshold_minutes: 5,
///         lateness_tiers: vec![],
///         package_deductions: HashMap::new(),
///         default_monthly_rate: Decimal::from(2000),
///     },
///     vec![],
/// );
///
/// let engine = SalaryEngine::new(config, store);
/// let breakdown = engine
///     .compute_teacher_salary(
///         "t-001",
///         NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
///     )
///     .unwrap();
///
/// // 3000 / 30 working days = 100 per day, 10 days taught.
/// assert_eq!(breakdown.summary.base_salary, Decimal::from(1000));
/// ```
#[derive(Clone)]
pub struct SalaryEngine {
    config: Arc<SchoolConfig>,
    resolver: Arc<RateResolver>,
    store: Arc<dyn SchoolStore>,
    batch_concurrency: usize,
}

impl SalaryEngine {
    /// Builds an engine from loaded configuration and a store handle.
    pub fn new(config: SchoolConfig, store: Arc<dyn SchoolStore>) -> Self {
        let resolver = RateResolver::new(
            config.packages(),
            config.salary().default_monthly_rate,
        );
        SalaryEngine {
            config: Arc::new(config),
            resolver: Arc::new(resolver),
            store,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }

    /// Overrides the batch concurrency cap. Values below one clamp to
    /// one.
    pub fn with_batch_concurrency(mut self, limit: usize) -> Self {
        self.batch_concurrency = limit.max(1);
        self
    }

    /// The configuration this engine was built from.
    pub fn config(&self) -> &SchoolConfig {
        &self.config
    }

    /// Computes the salary breakdown for one teacher over a date
    /// window.
    ///
    /// # Arguments
    ///
    /// * `teacher_id` - The teacher to compute
    /// * `from` - First day of the window, inclusive
    /// * `to` - Last day of the window, inclusive
    ///
    /// # Returns
    ///
    /// The full [`TeacherSalaryBreakdown`], or an error if the teacher
    /// is unknown or the store is unreachable.
    pub fn compute_teacher_salary(
        &self,
        teacher_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<TeacherSalaryBreakdown> {
        calculation::compute_salary_breakdown(
            self.store.as_ref(),
            &self.config,
            &self.resolver,
            teacher_id,
            from,
            to,
        )
    }

    /// Computes salary breakdowns for many teachers concurrently.
    ///
    /// Duplicate ids are computed once; the result carries one entry
    /// per distinct teacher in first-appearance order. Concurrency is
    /// bounded by the engine's batch limit, and each computation runs
    /// on the blocking pool so the async runtime stays responsive.
    ///
    /// A failure (unknown teacher, store outage mid-batch) lands in
    /// that teacher's [`BatchEntry`] without aborting the rest.
    pub async fn compute_teacher_salaries(
        &self,
        teacher_ids: &[String],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<BatchEntry> {
        let mut seen = BTreeSet::new();
        let unique: Vec<String> = teacher_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        let semaphore = Arc::new(Semaphore::new(self.batch_concurrency));
        let mut tasks = Vec::with_capacity(unique.len());
        for teacher_id in unique {
            let engine = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let task_id = teacher_id.clone();
            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return Err(EngineError::CalculationError {
                            message: "batch semaphore closed unexpectedly".to_string(),
                        })
                    }
                };
                match tokio::task::spawn_blocking(move || {
                    engine.compute_teacher_salary(&task_id, from, to)
                })
                .await
                {
                    Ok(result) => result,
                    Err(err) => Err(EngineError::CalculationError {
                        message: format!("salary computation task failed: {err}"),
                    }),
                }
            });
            tasks.push((teacher_id, handle));
        }

        let mut entries = Vec::with_capacity(tasks.len());
        for (teacher_id, handle) in tasks {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(err) => Err(EngineError::CalculationError {
                    message: format!("salary computation task failed: {err}"),
                }),
            };
            entries.push(BatchEntry {
                teacher_id,
                outcome,
            });
        }

        let failed = entries
            .iter()
            .filter(|entry| entry.outcome.is_err())
            .count();
        info!(
            teachers = entries.len(),
            failed, "batch salary computation complete"
        );
        entries
    }

    /// Computes controller earnings for one controller, or for every
    /// known controller when `controller_id` is `None`.
    ///
    /// The all-controllers variant walks ids in sorted order and fails
    /// on the first error; per-controller data problems surface as
    /// anomalies on the result rather than errors.
    pub fn compute_controller_earnings(
        &self,
        period: Period,
        controller_id: Option<&str>,
    ) -> EngineResult<Vec<ControllerEarnings>> {
        match controller_id {
            Some(id) => Ok(vec![calculation::compute_controller_earnings(
                self.store.as_ref(),
                &self.config,
                id,
                period,
            )?]),
            None => {
                let mut all = Vec::new();
                for id in self.store.controller_ids()? {
                    all.push(calculation::compute_controller_earnings(
                        self.store.as_ref(),
                        &self.config,
                        &id,
                        period,
                    )?);
                }
                Ok(all)
            }
        }
    }

    /// Computes earnings for every controller concurrently.
    ///
    /// Results come back in sorted controller-id order regardless of
    /// completion order, so repeated runs over unchanged data are
    /// identical. Fails on the first controller that errors.
    pub async fn compute_all_controller_earnings(
        &self,
        period: Period,
    ) -> EngineResult<Vec<ControllerEarnings>> {
        let ids = self.store.controller_ids()?;
        let semaphore = Arc::new(Semaphore::new(self.batch_concurrency));
        let mut tasks = Vec::with_capacity(ids.len());
        for controller_id in ids {
            let engine = self.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return Err(EngineError::CalculationError {
                            message: "batch semaphore closed unexpectedly".to_string(),
                        })
                    }
                };
                match tokio::task::spawn_blocking(move || {
                    calculation::compute_controller_earnings(
                        engine.store.as_ref(),
                        &engine.config,
                        &controller_id,
                        period,
                    )
                })
                .await
                {
                    Ok(result) => result,
                    Err(err) => Err(EngineError::CalculationError {
                        message: format!("controller earnings task failed: {err}"),
                    }),
                }
            }));
        }

        let mut all = Vec::with_capacity(tasks.len());
        for task in tasks {
            let earnings = match task.await {
                Ok(result) => result?,
                Err(err) => {
                    return Err(EngineError::CalculationError {
                        message: format!("controller earnings task failed: {err}"),
                    })
                }
            };
            all.push(earnings);
        }
        Ok(all)
    }

    /// Dry-runs a deduction waiver, returning every record the filter
    /// would flip without mutating anything.
    pub fn preview_waiver(&self, filter: WaiverFilter) -> EngineResult<WaiverPreview> {
        Ok(WaiverRequest::new(filter)?
            .preview(self.store.as_ref())?
            .into_preview())
    }

    /// Applies a deduction waiver.
    ///
    /// The reason is validated before any store read, then the filter
    /// is re-matched and committed atomically. Matching zero records is
    /// a success with an empty receipt, which makes a repeated apply
    /// harmless.
    pub fn apply_waiver(
        &self,
        filter: WaiverFilter,
        reason: &str,
    ) -> EngineResult<WaiverReceipt> {
        let reason = validate_reason(reason)?;
        WaiverRequest::new(filter)?
            .preview(self.store.as_ref())?
            .apply(self.store.as_ref(), reason)
    }

    /// Marks a teacher's salary for a period as paid or unpaid.
    ///
    /// Upserts against the store's one-row-per-teacher-per-period
    /// constraint, so repeated calls overwrite rather than duplicate.
    pub fn set_payment_status(
        &self,
        teacher_id: &str,
        period: Period,
        status: PaymentStatus,
    ) -> EngineResult<SalaryPayment> {
        if !self.store.teacher_exists(teacher_id)? {
            return Err(EngineError::TeacherNotFound {
                teacher_id: teacher_id.to_string(),
            });
        }
        let payment = self
            .store
            .upsert_salary_payment(teacher_id, period, status)?;
        info!(
            teacher_id,
            period = %period,
            status = ?payment.status,
            "payment status recorded"
        );
        Ok(payment)
    }
}
