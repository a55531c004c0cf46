//! Error types for the batch transfer library.

use thiserror::Error;

/// Which way a bulk copy was moving when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    Fetch,
    Push,
}

impl std::fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferDirection::Fetch => write!(f, "fetch"),
            TransferDirection::Push => write!(f, "push"),
        }
    }
}

/// Main error type for batch operations.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Wildcard pattern expansion failed in the listing primitive.
    #[error("Listing failed for pattern {pattern}: {message}")]
    Listing { pattern: String, message: String },

    /// Channels in one run disagree on total batch count.
    #[error("Channels are not aligned: {0}")]
    Alignment(String),

    /// The run as configured cannot do any useful work.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A bulk copy failed or produced an incomplete file set.
    #[error("Batch {direction} failed: {message}")]
    Transfer {
        direction: TransferDirection,
        message: String,
    },

    /// The external storage tool could not be invoked or exited non-zero.
    #[error("Storage tool failed ({command}): {message}")]
    Tool { command: String, message: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BatchError {
    /// Create a Listing error for a failed pattern expansion.
    pub fn listing(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        BatchError::Listing {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a Transfer error for a failed download.
    pub fn fetch(message: impl Into<String>) -> Self {
        BatchError::Transfer {
            direction: TransferDirection::Fetch,
            message: message.into(),
        }
    }

    /// Create a Transfer error for a failed upload.
    pub fn push(message: impl Into<String>) -> Self {
        BatchError::Transfer {
            direction: TransferDirection::Push,
            message: message.into(),
        }
    }

    /// Create a Tool error for a failed external invocation.
    pub fn tool(command: impl Into<String>, message: impl Into<String>) -> Self {
        BatchError::Tool {
            command: command.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for batch operations.
pub type Result<T> = std::result::Result<T, BatchError>;
