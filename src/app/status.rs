//! Loader status model
//!
//! The loader moves through a fixed sequence of stages; each stage carries a
//! best-effort progress percentage that is meaningful only within that stage.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle stage of the loader
///
/// Valid orderings observed by subscribers are exactly:
///
/// - `Initializing → LoadingRuntime → LoadingCached → Ready`
/// - `Initializing → LoadingRuntime → Downloading → Decompressing → Ready`
///
/// with `Error(_)` replacing the tail of either sequence on failure. An error
/// is terminal for that invocation but does not prevent running the lifecycle
/// again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum Status {
    /// Initial state, before the lifecycle has been started
    Initializing,
    /// Initializing the engine's runtime
    LoadingRuntime,
    /// A cached blob was found and is being handed to the engine
    LoadingCached,
    /// Streaming the remote dataset
    Downloading,
    /// Decompressing the downloaded payload
    Decompressing,
    /// The engine accepted the dataset; lookups are available
    Ready,
    /// A stage failed; carries the failure description
    Error(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Initializing => write!(f, "initializing"),
            Status::LoadingRuntime => write!(f, "loading runtime"),
            Status::LoadingCached => write!(f, "loading cached data"),
            Status::Downloading => write!(f, "downloading"),
            Status::Decompressing => write!(f, "decompressing"),
            Status::Ready => write!(f, "ready"),
            Status::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

/// A single `(status, progress)` observation delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Current lifecycle stage
    pub status: Status,
    /// Completion estimate in 0..=100, relative to the current stage
    pub progress: u8,
}

impl StatusUpdate {
    /// Initial state of a freshly constructed loader
    pub fn initial() -> Self {
        Self {
            status: Status::Initializing,
            progress: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_update() {
        let update = StatusUpdate::initial();
        assert_eq!(update.status, Status::Initializing);
        assert_eq!(update.progress, 0);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Downloading.to_string(), "downloading");
        assert_eq!(
            Status::Error("Download failed".to_string()).to_string(),
            "error: Download failed"
        );
    }

    #[test]
    fn test_status_serializes_as_tagged_value() {
        let json = serde_json::to_string(&Status::Error("boom".to_string())).unwrap();
        assert!(json.contains("\"error\""));
        assert!(json.contains("boom"));

        let json = serde_json::to_string(&Status::LoadingCached).unwrap();
        assert!(json.contains("loading_cached"));
    }
}
