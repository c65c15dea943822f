//! # CLI Error Type
//!
//! Unified error type for every `farsh` subcommand.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Error Flow in farsh                                │
//! │                                                                         │
//! │  Command Function                                                       │
//! │  Result<(), CliError>                                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Bad input? ──────── ValidationError / CoreError ───────┐              │
//! │         │                                               │              │
//! │         ▼                                               ▼              │
//! │  Backend failed? ─── ClientError::user_message(..) ── CliError ──►     │
//! │         │                                               ▲              │
//! │         ▼                                               │              │
//! │  Export failed? ──── ExportError / io::Error ───────────┘              │
//! │                                                                         │
//! │  main.rs prints `message` to stderr and exits with `code.exit_code()`  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use farsh_client::error::fallback;
use farsh_client::ClientError;
use farsh_core::{CoreError, ValidationError};
use farsh_export::ExportError;
use serde::Serialize;

/// Error returned from commands.
///
/// With `--json` this is what lands on stderr:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Invoice not found"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Operator-facing message
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad arguments or a draft that cannot be submitted
    ValidationError,

    /// Not logged in, or the token was rejected
    Unauthorized,

    /// The backend has no such record (404)
    NotFound,

    /// Any other non-success response
    BackendError,

    /// The backend could not be reached
    NetworkError,

    /// Config file or environment is unusable
    ConfigError,

    /// PDF or spreadsheet generation failed
    ExportError,

    /// Local file I/O failed
    IoError,

    /// The invoice finished with some checks not registered
    PartialFailure,
}

impl ErrorCode {
    /// Process exit status for this code.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::ValidationError => 2,
            ErrorCode::Unauthorized => 3,
            ErrorCode::NotFound => 4,
            ErrorCode::BackendError | ErrorCode::NetworkError => 5,
            ErrorCode::ConfigError => 6,
            ErrorCode::ExportError | ErrorCode::IoError => 7,
            ErrorCode::PartialFailure => 8,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::ValidationError, message)
    }

    /// Maps a client error, showing `fallback` when the backend said nothing
    /// useful.
    pub fn client(err: ClientError, fallback: &str) -> Self {
        let message = err.user_message(fallback);
        let code = match &err {
            ClientError::NotAuthenticated | ClientError::Unauthorized(_) => ErrorCode::Unauthorized,
            ClientError::Backend { status: 404, .. } => ErrorCode::NotFound,
            ClientError::Backend { status: 400 | 422, .. } => ErrorCode::ValidationError,
            ClientError::Backend { .. } | ClientError::Deserialization(_) => {
                ErrorCode::BackendError
            }
            ClientError::Http(_) => ErrorCode::NetworkError,
            ClientError::Core(_) => ErrorCode::ValidationError,
            ClientError::SessionStorage(_) => ErrorCode::IoError,
            ClientError::InvalidConfig(_)
            | ClientError::InvalidUrl(_)
            | ClientError::ConfigLoadFailed(_)
            | ClientError::ConfigSaveFailed(_) => ErrorCode::ConfigError,
        };
        CliError::new(code, message)
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        CliError::client(err, fallback::GENERIC)
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::validation(err.to_string())
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::validation(err.to_string())
    }
}

impl From<ExportError> for CliError {
    fn from(err: ExportError) -> Self {
        tracing::error!(error = %err, "Export failed");
        CliError::new(ErrorCode::ExportError, err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::new(ErrorCode::IoError, err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::new(ErrorCode::IoError, err.to_string())
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for CliError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_codes() {
        let not_found = CliError::client(
            ClientError::Backend {
                status: 404,
                message: "Invoice not found".into(),
            },
            fallback::GENERIC,
        );
        assert_eq!(not_found.code, ErrorCode::NotFound);
        assert_eq!(not_found.message, "Invoice not found");

        let auth: CliError = ClientError::NotAuthenticated.into();
        assert_eq!(auth.code, ErrorCode::Unauthorized);
        assert_eq!(auth.code.exit_code(), 3);

        let offline = CliError::client(ClientError::Http("refused".into()), fallback::LOAD_CHECKS);
        assert_eq!(offline.code, ErrorCode::NetworkError);
        assert_eq!(offline.message, fallback::LOAD_CHECKS);
    }

    #[test]
    fn test_local_errors_are_validation() {
        let err: CliError = CoreError::DraftFinalized.into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.code.exit_code(), 2);
    }
}
