//! Driver error types

/// Errors that can occur while setting up the job driver.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// No tokio runtime is active on the calling thread.
    #[error("No tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}
