// Centralized error handling module
// Every fatal condition of a run, with the path or line that caused it

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the digest tool
///
/// All variants are fatal: they propagate up to the run function and the
/// binary turns them into a message and a non-zero exit status.
#[derive(Debug, Error)]
pub enum DigestToolError {
    /// Requested hash algorithm is not available
    #[error("Unsupported hash algorithm: {algorithm}\nSuggestion: Use --list to see available algorithms")]
    UnsupportedAlgorithm { algorithm: String },

    /// A batch file or the ledger could not be found
    #[error("File not found: {}\nSuggestion: Check that the file path is correct and the file exists", .path.display())]
    FileNotFound { path: PathBuf },

    /// A batch file or the ledger could not be opened for lack of permission
    #[error("Permission denied while {operation} file: {}\nSuggestion: Check file permissions or run with appropriate privileges", .path.display())]
    PermissionDenied { path: PathBuf, operation: String },

    /// A batch file or the ledger could not be read
    #[error("Failed to read {}: {source}\nSuggestion: Check that the file is readable and not locked by another process", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The ledger is not UTF-8 text
    #[error("Ledger {} is not valid UTF-8 text\nSuggestion: Check that the path points at a digest ledger", .path.display())]
    LedgerEncoding { path: PathBuf },

    /// A ledger line does not parse into `<name> <algorithm> <hex> ...`
    #[error("Malformed ledger record at line {line}: {reason}\n  {content}\nSuggestion: Check that the ledger format is correct (name algorithm HEX [algorithm HEX ...])")]
    MalformedLedgerRecord {
        line: usize,
        reason: String,
        content: String,
    },

    /// The ledger could not be rewritten; the previous content is left intact
    #[error("Failed to write ledger {}: {source}\nSuggestion: Check disk space and write permissions; the previous ledger was left unchanged", .path.display())]
    LedgerWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid command-line input
    #[error("Invalid arguments: {message}\nSuggestion: Run with --help to see usage information")]
    InvalidArguments { message: String },

    /// Configuration file could not be read or parsed
    #[error("Invalid configuration {}: {reason}\nSuggestion: Check the TOML syntax and the option names", .path.display())]
    Config { path: PathBuf, reason: String },
}

impl DigestToolError {
    /// Create a read error with context about the operation and the path
    ///
    /// `NotFound` and `PermissionDenied` get their own variants so the
    /// message names the actual problem.
    pub fn from_io_error(err: io::Error, operation: &str, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => DigestToolError::FileNotFound { path },
            io::ErrorKind::PermissionDenied => DigestToolError::PermissionDenied {
                path,
                operation: operation.to_string(),
            },
            _ => DigestToolError::FileRead { path, source: err },
        }
    }

    /// Whether this error was caused by bad user input rather than the environment
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            DigestToolError::UnsupportedAlgorithm { .. } | DigestToolError::InvalidArguments { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DigestToolError>;
