//! # Client Error Types
//!
//! Error types for everything that talks to the backend.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Backend             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Http           │  │  Backend {status, msg}  │ │
//! │  │  InvalidUrl     │  │  (connect,      │  │  Unauthorized (401)     │ │
//! │  │  ConfigLoad/Save│  │   timeout, ...) │  │  Deserialization        │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │    Session      │  │     Local       │                              │
//! │  │                 │  │                 │                              │
//! │  │  NotAuthenticated│ │  Core           │  ← validation, finalized     │
//! │  │  SessionStorage │  │  (no request    │                              │
//! │  │                 │  │   was sent)     │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is retried automatically; every error reaches the operator.

use farsh_core::{CoreError, ValidationError};
use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error type covering all possible backend-facing failures.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid backend URL.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// No valid token; the operator must log in. No request was sent.
    #[error("Not logged in. Run `farsh login` first.")]
    NotAuthenticated,

    /// The backend rejected the token (HTTP 401).
    #[error("Session expired or invalid: {0}")]
    Unauthorized(String),

    /// Reading or writing the session file failed.
    #[error("Session storage error: {0}")]
    SessionStorage(String),

    // =========================================================================
    // Transport & Backend Errors
    // =========================================================================
    /// The request never produced a response (connect, DNS, timeout).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The backend answered with a non-success status.
    ///
    /// `message` is the backend's `detail` when it sent one.
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("Unexpected response: {0}")]
    Deserialization(String),

    // =========================================================================
    // Local Errors
    // =========================================================================
    /// Domain rule or validation failure; raised before any request.
    #[error(transparent)]
    Core(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Core(CoreError::Validation(err))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Deserialization(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Deserialization(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Builds the error for a non-success response.
    pub(crate) fn from_status(status: StatusCode, message: String) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            ClientError::Unauthorized(message)
        } else {
            ClientError::Backend {
                status: status.as_u16(),
                message,
            }
        }
    }

    /// Returns true if the failure happened locally, before any request.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Core(e) if e.is_validation())
    }

    /// Returns true if the operator has to log in (again).
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ClientError::NotAuthenticated | ClientError::Unauthorized(_)
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }

    /// The text to show the operator.
    ///
    /// The backend's own `detail` wins; transport failures get the
    /// operation's localized `fallback`; local errors describe themselves.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Backend { message, .. } | ClientError::Unauthorized(message)
                if !message.trim().is_empty() =>
            {
                message.clone()
            }
            ClientError::Backend { .. }
            | ClientError::Unauthorized(_)
            | ClientError::Http(_)
            | ClientError::Deserialization(_) => fallback.to_string(),
            other => other.to_string(),
        }
    }
}

/// Localized fallbacks for operations whose failure has no backend detail.
pub mod fallback {
    pub const SAVE_DRAFT: &str = "خطا در ذخیره پیش‌فاکتور";
    pub const FINALIZE: &str = "خطا در نهایی‌سازی";
    pub const CHECK_CREATE: &str = "خطا در ثبت چک";
    pub const LOAD_CARPETS: &str = "خطا در دریافت لیست فرش‌ها";
    pub const LOAD_INVOICES: &str = "خطا در دریافت فاکتورها";
    pub const LOAD_CHECKS: &str = "خطا در دریافت چک‌ها";
    pub const LOAD_REPORT: &str = "خطا در دریافت گزارش";
    pub const LOGIN: &str = "نام کاربری یا رمز عبور اشتباه است";
    pub const GENERIC: &str = "خطا در ارتباط با سرور";
}
