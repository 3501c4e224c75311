//! Error types for osenv
//!
//! The taxonomy separates per-item, recoverable conditions (a resource that
//! already exists, a provisioning timeout, an unknown resource type) from
//! run-terminating faults (auth/network failures, unreadable key files,
//! malformed remote responses). The dispatcher is the only place that makes
//! that call; managers just return the typed value.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::resource::ResourceKind;

/// Errors surfaced by the OpenStack HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Remote reports the requested object already exists (HTTP 409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Remote reports no such object (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Credentials rejected or insufficient (HTTP 401/403).
    #[error("authentication rejected ({status}): {detail}")]
    Auth { status: u16, detail: String },

    /// Any other non-success response.
    #[error("API request failed ({status}): {detail}")]
    Status { status: u16, detail: String },

    /// Connection-level failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body was not the JSON we expected.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Token response or service catalog missing a required entry.
    #[error("identity error: {0}")]
    Identity(String),
}

/// Errors from a single resource upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// No registered manager supports the definition's variant.
    #[error("no manager registered for resource type \"{kind}\"")]
    UnsupportedType { kind: ResourceKind },

    /// Remote state already satisfies the definition.
    #[error("resource \"{resource}\" already exists")]
    AlreadyExists { resource: String },

    /// An asynchronously provisioned resource never reached its terminal
    /// status. The remote side may still be provisioning it.
    #[error("resource \"{resource}\" did not become \"{target}\" within {waited:?}")]
    Timeout {
        resource: String,
        target: String,
        waited: Duration,
    },

    /// Key material could not be read from disk.
    #[error("failed to read key file {}", path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Remote call failed for a reason other than a conflict.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl UploadError {
    /// Whether the dispatcher may log this error and move on to the next
    /// definition. Everything else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            UploadError::UnsupportedType { .. }
                | UploadError::AlreadyExists { .. }
                | UploadError::Timeout { .. }
        )
    }
}

/// Errors from the resource definition loader. All fatal: if the manifest
/// cannot be read, there is nothing to apply.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File extension does not match any supported manifest format.
    #[error("unsupported resource definition source \"{}\"", path.display())]
    UnsupportedSource { path: PathBuf },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_classification() {
        assert!(UploadError::UnsupportedType {
            kind: ResourceKind::Flavor
        }
        .is_recoverable());
        assert!(UploadError::AlreadyExists {
            resource: "f1".into()
        }
        .is_recoverable());
        assert!(UploadError::Timeout {
            resource: "img1".into(),
            target: "active".into(),
            waited: Duration::from_secs(3600),
        }
        .is_recoverable());

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(!UploadError::KeyFile {
            path: PathBuf::from("/tmp/k1.pub"),
            source: io,
        }
        .is_recoverable());
        assert!(!UploadError::Api(ApiError::Status {
            status: 500,
            detail: "boom".into(),
        })
        .is_recoverable());
    }
}
