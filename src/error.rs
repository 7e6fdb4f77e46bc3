//! Domain error types for build test-result ingestion.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.
//! Every variant maps to a closed [`ErrorCode`]; user-facing messages are looked
//! up from the code by an [`i18n::MessageCatalog`](crate::i18n::MessageCatalog).

use std::fmt;
use std::path::PathBuf;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::i18n::{self, Language, MessageCatalog};

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Required step input missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Report path glob could not be compiled
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// A located report file could not be read
    #[error("cannot read file {} ({source})", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A report or stored record could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Tracking service rejected or never received the results
    #[error("Reporting error: {0}")]
    Reporting(String),

    /// Pipeline build could not be resolved
    #[error("Pipeline build not found: {0}")]
    NoPipelineBuild(String),

    /// Identifier in a request path is not an integer
    #[error("Invalid ID: {0}")]
    InvalidId(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// Closed error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Configuration(_) => ErrorCode::InvalidConfiguration,
            AppError::InvalidPattern(_) => ErrorCode::InvalidPattern,
            AppError::Io { .. } => ErrorCode::FileUnreadable,
            AppError::Decode(_) => ErrorCode::InvalidReport,
            AppError::Database(_) => ErrorCode::Database,
            AppError::Reporting(_) => ErrorCode::ReportingFailed,
            AppError::NoPipelineBuild(_) => ErrorCode::NoPipelineBuild,
            AppError::InvalidId(_) => ErrorCode::InvalidId,
            AppError::InvalidInput(_) => ErrorCode::InvalidInput,
        }
    }

    /// Underlying cause safe to show to a caller.
    ///
    /// Database details stay server-side.
    pub fn cause(&self) -> Option<String> {
        match self {
            AppError::Database(_) => None,
            AppError::Io { path, source } => Some(format!("{}: {}", path.display(), source)),
            AppError::Configuration(detail)
            | AppError::InvalidPattern(detail)
            | AppError::Decode(detail)
            | AppError::Reporting(detail)
            | AppError::NoPipelineBuild(detail)
            | AppError::InvalidId(detail)
            | AppError::InvalidInput(detail) => Some(detail.clone()),
        }
    }
}

/// Closed set of error kinds surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UnknownError,
    InvalidId,
    NoPipelineBuild,
    InvalidInput,
    Database,
    InvalidConfiguration,
    InvalidPattern,
    FileUnreadable,
    InvalidReport,
    ReportingFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::InvalidId => "INVALID_ID",
            Self::NoPipelineBuild => "NO_PIPELINE_BUILD",
            Self::InvalidInput => "INVALID_INPUT",
            Self::Database => "DATABASE_ERROR",
            Self::InvalidConfiguration => "INVALID_CONFIGURATION",
            Self::InvalidPattern => "INVALID_PATTERN",
            Self::FileUnreadable => "FILE_UNREADABLE",
            Self::InvalidReport => "INVALID_REPORT",
            Self::ReportingFailed => "REPORTING_FAILED",
        }
    }

    /// HTTP status used when the code is returned by the API.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId | Self::InvalidInput | Self::InvalidPattern | Self::InvalidReport => {
                StatusCode::BAD_REQUEST
            }
            Self::NoPipelineBuild => StatusCode::NOT_FOUND,
            Self::ReportingFailed => StatusCode::BAD_GATEWAY,
            Self::UnknownError
            | Self::Database
            | Self::InvalidConfiguration
            | Self::FileUnreadable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error rendered to an HTTP client in its negotiated language.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    /// Localize an application error with the given catalog.
    pub fn localized(error: AppError, catalog: &dyn MessageCatalog, language: Language) -> Self {
        if let AppError::Database(ref detail) = error {
            tracing::error!("Database error: {}", detail);
        }

        ApiError {
            code: error.code(),
            message: i18n::render(catalog, &error, language),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.code.status()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.code.as_str().to_string(),
            message: self.message.clone(),
        })
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(format!("JSON parsing error: {}", err))
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Database(err.to_string())
    }
}
