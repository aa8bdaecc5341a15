//! Error types for the query crate.

use thiserror::Error;

use crate::op::LogicOp;

/// Boxed error produced by a caller-supplied fallible predicate.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Construction-time contract violations.
///
/// These are raised while building constraints or a pipeline, before any
/// item has been looked at.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Range lower bound is greater than the upper bound (or not comparable).
    #[error("invalid range: min {min} is not <= max {max}")]
    InvalidRange { min: String, max: String },

    /// Date range starts after it ends.
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: String, end: String },

    /// Compound constraint built with the wrong number of children.
    #[error("'{op}' expects {expected} child constraint(s), got {actual}")]
    ChildCount {
        op: LogicOp,
        expected: &'static str,
        actual: usize,
    },

    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Yield interval must be at least one item.
    #[error("yield interval must be greater than zero")]
    ZeroYieldInterval,
}

/// Errors that can occur when building or running a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Invalid constraint or pipeline configuration.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A caller-supplied predicate failed while evaluating an item.
    #[error("extractor failed: {0}")]
    Extractor(#[source] BoxError),

    /// Values that had to be ordered against each other were not comparable.
    #[error("contract violation: {reason}")]
    ContractViolation { reason: String },
}

impl QueryError {
    /// Returns `true` for construction-time errors.
    pub fn is_configuration(&self) -> bool {
        matches!(self, QueryError::Configuration(_))
    }
}

impl From<regex::Error> for QueryError {
    fn from(err: regex::Error) -> Self {
        QueryError::Configuration(ConfigurationError::InvalidPattern(err))
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
