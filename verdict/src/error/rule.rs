//! Rule fault types

/// Faults raised while running an asynchronous rule.
///
/// These never reach callers of the query surface: the driver folds them into
/// a failed outcome under the configured fault rule name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// A fallible predicate returned an error.
    #[error("Predicate error: {0}")]
    Predicate(String),

    /// The predicate panicked while running.
    #[error("Predicate panicked: {0}")]
    Panicked(String),

    /// The job was aborted before it settled.
    #[error("Job cancelled")]
    Cancelled,
}

impl RuleError {
    /// Creates a predicate error from any displayable error.
    pub fn predicate(err: impl std::fmt::Display) -> Self {
        Self::Predicate(err.to_string())
    }

    /// Creates a panic error from a `catch_unwind` payload.
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Self::Panicked(message)
    }

    /// Returns `true` if the job was cancelled rather than faulted.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
