// src/utils/errors.rs
//! Engine error types
//!
//! Configuration errors (`MissingTarget`, `AlreadyActive`, `NothingToStop`) are
//! returned synchronously by the session manager. Recording errors are contained
//! inside the hooks and only reach callers through `drain()`/`stop()` when the
//! session is strict.

use crate::interception::host::TargetId;
use std::sync::Arc;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by the mock engine
///
/// Cloneable so that every concurrent drain waiter observes the same rejection.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("no page/target supplied to start()")]
    MissingTarget,

    #[error("second start() on target {0} without a matching stop()")]
    AlreadyActive(TargetId),

    #[error("nothing to stop")]
    NothingToStop,

    /// Strict-mode sentinel: a request had no stored mock
    #[error("mock not found for {method} {url}")]
    MockNotFound { method: String, url: String },

    #[error("store write failed: {0}")]
    StoreWriteFailure(String),

    /// Cache miss; callers treat this as the trigger for a live forward
    #[error("store read failed: {0}")]
    StoreReadFailure(String),

    #[error("host operation failed: {0}")]
    HostFailure(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Shared so the error stays `Clone`
    #[error("I/O error: {0}")]
    Io(#[source] Arc<std::io::Error>),
}

impl EngineError {
    /// Whether this is the strict-mode missing-mock sentinel
    pub fn is_mock_not_found(&self) -> bool {
        matches!(self, EngineError::MockNotFound { .. })
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io(Arc::new(err))
    }
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::ConfigError(err.to_string())
    }
}
