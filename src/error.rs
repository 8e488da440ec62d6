//! Error types for the compensation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Domain errors (`EngineError`) are kept separate from data-store errors
//! (`StoreError`) so callers can tell "the answer is empty" apart from
//! "the store could not answer".

use thiserror::Error;

/// Errors raised by the data store.
///
/// These describe infrastructure failures, never business outcomes. An
/// empty query result is `Ok(vec![])`, not an error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("Data store unavailable: {message}")]
    Unavailable {
        /// A description of the connectivity failure.
        message: String,
    },

    /// A concurrent writer modified the rows targeted by an atomic
    /// operation. The caller may re-read and retry.
    #[error("Concurrent modification detected: {message}")]
    Conflict {
        /// A description of the conflicting write.
        message: String,
    },
}

/// A type alias for Results that return StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

/// The main error type for the compensation engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use salary_engine::error::EngineError;
///
/// let error = EngineError::TeacherNotFound {
///     teacher_id: "t-missing".to_string(),
/// };
/// assert_eq!(error.to_string(), "Teacher not found: t-missing");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No controller earnings configuration is effective for the date.
    #[error("No controller earnings configuration effective on {date}")]
    ControllerConfigNotFound {
        /// The date for which configuration was requested.
        date: chrono::NaiveDate,
    },

    /// The referenced teacher does not exist in the store.
    #[error("Teacher not found: {teacher_id}")]
    TeacherNotFound {
        /// The teacher identifier that was not found.
        teacher_id: String,
    },

    /// The referenced controller does not exist in the store.
    #[error("Controller not found: {controller_id}")]
    ControllerNotFound {
        /// The controller identifier that was not found.
        controller_id: String,
    },

    /// A request carried invalid or inconsistent input.
    #[error("Invalid field '{field}': {message}")]
    ValidationError {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// An atomic store operation kept conflicting after retries.
    #[error("Waiver apply abandoned after {attempts} conflicting attempts")]
    WaiverConflict {
        /// How many attempts were made before giving up.
        attempts: u32,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },

    /// The data store failed; carries the underlying error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
