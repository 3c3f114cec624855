//! Error types for remote store operations.
//!
//! Errors are classified by what the user can do about them:
//! - Network: connectivity problems, check the connection and retry
//! - PermissionDenied: the store rejected the credentials
//! - Validation: local pre-flight check failed, nothing was sent
//! - Other: everything else

use thiserror::Error;

/// Failure of a remote store operation or a local pre-flight check.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("network error: {0}")]
    Network(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("store error: {0}")]
    Other(String),
}

impl StoreError {
    pub fn is_network(&self) -> bool {
        matches!(self, StoreError::Network(_))
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, StoreError::PermissionDenied(_))
    }

    /// User-facing failure toast for a given action label, e.g.
    /// `新增客戶` → `新增客戶失敗，請檢查網路連線`.
    pub fn user_message(&self, action: &str) -> String {
        match self {
            StoreError::Network(_) => format!("{action}失敗，請檢查網路連線"),
            StoreError::PermissionDenied(_) => format!("{action}失敗，沒有存取權限"),
            StoreError::Validation(reason) => reason.clone(),
            StoreError::Other(_) => format!("{action}失敗，請稍後再試"),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            StoreError::Network(err.to_string())
        } else {
            StoreError::Other(err.to_string())
        }
    }
}
