use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI commands.
///
/// These codes allow CI systems and cron jobs to distinguish a clean scan
/// from a scan that found vulnerabilities or could not run at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - scan completed and nothing was found
    Success = 0,
    /// At least one vulnerability was reported
    VulnerabilitiesDetected = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (configuration, network, file I/O, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::VulnerabilitiesDetected => write!(f, "Vulnerabilities Detected (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Application-specific errors.
///
/// Use cases return `anyhow::Error`; the variants here are the ones the HTTP
/// layer recognizes (via downcasting) and maps to a status code.
#[derive(Debug, Error)]
pub enum VulnTrackError {
    /// Payload or query failed validation (HTTP 422)
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Request is well-formed but cannot be honored (HTTP 400)
    #[error("{message}")]
    InvalidRequest { message: String },

    /// A uniqueness constraint would be violated (HTTP 400)
    #[error("{message}")]
    Conflict { message: String },

    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Too many pending scans (limit: {limit}). Try again later.")]
    TooManyPendingScans { limit: usize },

    #[error("{service} request failed: {details}")]
    ExternalService {
        service: &'static str,
        details: String,
    },

    #[error("Invalid configuration: {message}\n\n💡 Hint: {hint}")]
    Config { message: String, hint: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Failed to write file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Security violation: {path}\nReason: {reason}\n\n💡 Hint: {hint}")]
    SecurityError {
        path: PathBuf,
        reason: String,
        hint: String,
    },
}

impl VulnTrackError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn external(service: &'static str, details: impl Into<String>) -> Self {
        Self::ExternalService {
            service,
            details: details.into(),
        }
    }
}
