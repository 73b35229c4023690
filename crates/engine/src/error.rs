//! Typed error taxonomy for the sync engine.
//!
//! Item-level errors (`SourceNotFound`, `Filesystem`) are recoverable: the
//! run counts them and continues with the remaining items. `Config` errors
//! are fatal and abort before any filesystem mutation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by engine components.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The item's source path disappeared between discovery and execution.
    #[error("source not found: {path}")]
    SourceNotFound {
        /// The missing source path.
        path: PathBuf,
    },

    /// A filesystem operation failed (permissions, disk full, long paths).
    #[error("{op} failed for {path}: {source}")]
    Filesystem {
        /// Short description of the operation that failed.
        op: &'static str,
        /// The offending path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A manifest line could not be interpreted during uninstall.
    #[error("corrupt manifest line {line}: {reason}")]
    ManifestCorrupt {
        /// 1-based line number in the manifest file.
        line: usize,
        /// Why the line was rejected.
        reason: String,
    },

    /// Conflicting or invalid invocation options. Fatal, pre-mutation.
    #[error("invalid configuration: {message}")]
    Config {
        /// Human-readable description naming the conflicting options.
        message: String,
    },
}

impl EngineError {
    /// Convenience constructor wrapping an I/O error with its path.
    pub fn fs(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Filesystem {
            op,
            path: path.into(),
            source,
        }
    }
}
