//! Query and mutation error types.
//!
//! Both error types are `Clone` because one fetch result can be observed by
//! several concurrent readers.

use thiserror::Error;

use grid_model::RecordId;

/// A list read failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Connectivity lost or host unreachable.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The data source answered with an error.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Whether the failure indicates lost connectivity.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Whether repeating the same request may succeed.
    ///
    /// Connectivity loss, timeouts, throttling and 5xx answers are transient;
    /// any other server answer will repeat.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Server { status, .. } => matches!(status, 408 | 429 | 500..),
        }
    }

    /// Message for the error state of the view.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { .. } => {
                "Unable to reach the server. Check your connection and try again.".to_string()
            }
            Self::Server { message, .. } if self.is_retryable() => {
                format!("Failed to load records: {message}. Try again.")
            }
            Self::Server { message, .. } => format!("Failed to load records: {message}"),
        }
    }
}

/// A write was rejected or could not be delivered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MutationError {
    /// The data source refused the change.
    #[error("Update rejected: {message}")]
    Rejected { message: String },

    /// The record no longer exists.
    #[error("Record not found: {id}")]
    NotFound { id: RecordId },

    /// The write never reached the data source.
    #[error("Network error: {message}")]
    Network { message: String },
}

impl MutationError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Message for the failure notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message } => format!("Could not update status: {message}"),
            Self::NotFound { id } => format!("Record {id} no longer exists."),
            Self::Network { .. } => {
                "Could not update status: the server is unreachable.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_classification() {
        assert!(FetchError::network("offline").is_network());
        assert!(!FetchError::server(500, "boom").is_network());
    }

    #[test]
    fn test_retry_classification() {
        assert!(FetchError::network("offline").is_retryable());
        assert!(FetchError::server(503, "maintenance").is_retryable());
        assert!(FetchError::server(429, "slow down").is_retryable());
        assert!(!FetchError::server(400, "bad sort column").is_retryable());
        assert!(!FetchError::server(403, "forbidden").is_retryable());
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            FetchError::server(503, "maintenance").user_message(),
            "Failed to load records: maintenance. Try again."
        );
        assert_eq!(
            FetchError::server(400, "bad sort column").user_message(),
            "Failed to load records: bad sort column"
        );
        assert_eq!(
            MutationError::NotFound { id: "u9".into() }.user_message(),
            "Record u9 no longer exists."
        );
    }
}
