//! Error types for toolchain operations.
//!
//! This module provides error types and categories for all toolchain operations.
//! Errors are categorized so callers can decide on retries and give appropriate
//! user feedback. Nothing in this crate retries on its own.

use crate::version::Version;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for toolchain operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of toolchain errors.
///
/// Error categories help determine whether an operation is worth retrying
/// and what kind of user feedback is appropriate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network-related errors (transient, retryable).
    Network,
    /// Platform or architecture not supported.
    Platform,
    /// An external process could not be started or exited non-zero.
    Process,
    /// Permission denied on the filesystem.
    Permission,
    /// Malformed archive or unexpected tool output.
    Format,
    /// The caller passed something unusable.
    InvalidInput,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Platform => "Unsupported platform",
            Self::Process => "External command failed",
            Self::Permission => "Permission denied",
            Self::Format => "Invalid file format",
            Self::InvalidInput => "Invalid input",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your internet connection and try again",
            Self::Platform => "Node.js does not publish a build for this platform",
            Self::Process => "Check the command output above for details",
            Self::Permission => "Check directory permissions or run with appropriate access",
            Self::Format => {
                "The download may be corrupted, remove the cached installation and try again"
            }
            Self::InvalidInput => "Check the arguments passed to the command",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur during toolchain operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The current OS or architecture has no matching Node.js distribution.
    #[error("unsupported platform: {os}/{arch}")]
    UnsupportedPlatform {
        /// Operating system.
        os: String,
        /// CPU architecture as reported by the host.
        arch: String,
    },

    /// HTTP request failed.
    #[error("HTTP request failed: {message}")]
    HttpError {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// The response body could not be read.
    #[error("download failed for {url}: {message}")]
    DownloadFailed {
        /// URL being downloaded.
        url: String,
        /// Error message.
        message: String,
    },

    /// The archive is malformed or contains an entry we refuse to write.
    #[error("extraction failed: {message}")]
    ExtractionFailed {
        /// Error message.
        message: String,
    },

    /// IO error during file operations.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Downloading or unpacking a version failed.
    ///
    /// The installation directory may be left partially populated.
    #[error("failed to install Node.js {version}: {source}")]
    InstallFailed {
        /// Version being installed.
        version: Version,
        /// What went wrong.
        #[source]
        source: Box<Error>,
    },

    /// An empty command was passed to a process runner.
    #[error("invalid command: a command needs at least a program to run")]
    InvalidCommand,

    /// The process could not be started at all.
    #[error("failed to launch '{command}': {source}")]
    ProcessLaunch {
        /// The attempted command line.
        command: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The process ran and exited unsuccessfully.
    #[error("command '{command}' failed with {}", describe_exit(.exit_code))]
    ProcessFailed {
        /// The attempted command line.
        command: String,
        /// Exit code, `None` when terminated by a signal.
        exit_code: Option<i32>,
    },

    /// `node --version` printed something that is not a version.
    #[error("unexpected version output: {0:?}")]
    InvalidVersionOutput(String),
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl Error {
    /// Create an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::HttpError {
            message: message.into(),
            status,
        }
    }

    /// Create an extraction error.
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            message: message.into(),
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::UnsupportedPlatform { .. } => ErrorCategory::Platform,
            Error::HttpError { .. } => ErrorCategory::Network,
            Error::DownloadFailed { .. } => ErrorCategory::Network,
            Error::ExtractionFailed { .. } => ErrorCategory::Format,
            Error::Io { source, .. } => {
                if source.kind() == io::ErrorKind::PermissionDenied {
                    ErrorCategory::Permission
                } else {
                    ErrorCategory::Other
                }
            }
            Error::InstallFailed { source, .. } => source.category(),
            Error::InvalidCommand => ErrorCategory::InvalidInput,
            Error::ProcessLaunch { .. } => ErrorCategory::Process,
            Error::ProcessFailed { .. } => ErrorCategory::Process,
            Error::InvalidVersionOutput(_) => ErrorCategory::Format,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Whether the input ended before it was complete.
    ///
    /// Set for IO errors of kind `UnexpectedEof`, such as a gzip stream cut
    /// off mid-way.
    #[must_use]
    pub fn is_truncated_input(&self) -> bool {
        match self {
            Error::Io { source, .. } => source.kind() == io::ErrorKind::UnexpectedEof,
            Error::InstallFailed { source, .. } => source.is_truncated_input(),
            _ => false,
        }
    }

    /// The exit code carried by a failed process, if any.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::ProcessFailed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::HttpError {
                message: format!("HTTP {}", code),
                status: Some(code),
            },
            other => Self::HttpError {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(source) => source.into(),
            other => Self::extraction(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_retryable() {
        assert!(ErrorCategory::Network.is_retryable());
        assert!(!ErrorCategory::Platform.is_retryable());
        assert!(!ErrorCategory::Process.is_retryable());
        assert!(!ErrorCategory::Permission.is_retryable());
        assert!(!ErrorCategory::Format.is_retryable());
        assert!(!ErrorCategory::InvalidInput.is_retryable());
        assert!(!ErrorCategory::Other.is_retryable());
    }

    #[test]
    fn test_error_category_description_and_advice() {
        for category in [
            ErrorCategory::Network,
            ErrorCategory::Platform,
            ErrorCategory::Process,
            ErrorCategory::Permission,
            ErrorCategory::Format,
            ErrorCategory::InvalidInput,
            ErrorCategory::Other,
        ] {
            assert!(!category.description().is_empty());
            assert!(!category.advice().is_empty());
        }
    }

    #[test]
    fn test_error_category_display() {
        let display = format!("{}", ErrorCategory::Network);
        assert!(display.contains("Network"));
    }

    #[test]
    fn test_error_http_category() {
        let err = Error::http("connection failed", Some(503));
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_error_unsupported_platform_display() {
        let err = Error::UnsupportedPlatform {
            os: "linux".to_string(),
            arch: "mips".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Platform);
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("mips"));
    }

    #[test]
    fn test_error_install_failed_uses_source_category() {
        let err = Error::InstallFailed {
            version: Version::new(14, 2, 0),
            source: Box::new(Error::http("HTTP 404", Some(404))),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        let display = err.to_string();
        assert!(display.contains("v14.2.0"));
        assert!(display.contains("HTTP 404"));
    }

    #[test]
    fn test_error_io_permission_denied_category() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
        let err = Error::io("/usr/local/lib", io_err);
        assert_eq!(err.category(), ErrorCategory::Permission);
    }

    #[test]
    fn test_error_io_other_category() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "not found");
        let err = Error::io("/some/path", io_err);
        assert_eq!(err.category(), ErrorCategory::Other);
    }

    #[test]
    fn test_error_process_failed_carries_exit_code() {
        let err = Error::ProcessFailed {
            command: "node -e process.exit(2)".to_string(),
            exit_code: Some(2),
        };
        assert_eq!(err.exit_code(), Some(2));
        assert_eq!(err.category(), ErrorCategory::Process);
        assert!(err.to_string().contains("exit code 2"));
    }

    #[test]
    fn test_error_process_failed_by_signal() {
        let err = Error::ProcessFailed {
            command: "sleep 100".to_string(),
            exit_code: None,
        };
        assert_eq!(err.exit_code(), None);
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn test_error_invalid_command_category() {
        assert_eq!(Error::InvalidCommand.category(), ErrorCategory::InvalidInput);
        assert_eq!(Error::InvalidCommand.exit_code(), None);
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "not found");
        let err: Error = io_err.into();
        match err {
            Error::Io { path, .. } => {
                assert_eq!(path, PathBuf::new());
            }
            _ => panic!("Expected Error::Io"),
        }
    }

    #[test]
    fn test_error_truncated_input() {
        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "incomplete deflate stream");
        assert!(Error::io("<archive stream>", eof).is_truncated_input());

        let other = io::Error::new(io::ErrorKind::NotFound, "not found");
        assert!(!Error::io("/some/path", other).is_truncated_input());
        assert!(!Error::extraction("bad header").is_truncated_input());
    }

    #[test]
    fn test_error_from_zip_error() {
        let err: Error = zip::result::ZipError::InvalidArchive("bad header".into()).into();
        assert_eq!(err.category(), ErrorCategory::Format);
    }
}
