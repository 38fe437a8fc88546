use actix_web::{HttpResponse, http::StatusCode};
use sea_orm::DbErr;
use thiserror::Error;

/// Error taxonomy for the whole backend.
///
/// Request handlers return `Result<HttpResponse, ApiError>`; the
/// `ResponseError` impl below turns every variant into the structured
/// error envelope. Upstream and integrity failures are only produced
/// by the ingestion pipeline, which logs them instead of answering a
/// caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or malformed parameter: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    // Absent and expired tokens map to the same message on purpose:
    // callers must not learn whether a given token ever existed.
    #[error("invalid authentication")]
    InvalidAuthentication,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email not verified")]
    NotVerified,

    #[error("EMAIL_NOT_UNIQUE: email is already taken")]
    EmailNotUnique,

    #[error("NAME_NOT_UNIQUE: name is already taken")]
    NameNotUnique,

    #[error("no canteen accepts this email address")]
    NoMatchingCanteen,

    #[error("email is already verified")]
    AlreadyVerified,

    #[error("verification code is invalid")]
    CodeInvalid,

    #[error("verification code has expired")]
    CodeExpired,

    #[error("RATING_OUT_OF_RANGE: rating {0} is outside 1..=10")]
    RatingOutOfRange(i32),

    #[error("INVALID_DATE_RANGE: from-date is after to-date")]
    InvalidDateRange,

    #[error("upstream menu provider error: {0}")]
    Upstream(String),

    #[error("unknown meal type code {code:?} for canteen {canteen}")]
    UnknownMealType { canteen: &'static str, code: String },

    #[error("more than one canteen accepts email {0}")]
    AmbiguousCanteen(String),

    #[error("unknown canteen {0}")]
    UnknownCanteen(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Stable error kind exposed in the response envelope (coarser than
    /// the variant list; clients switch on this, not on messages).
    pub fn error_type(&self) -> &'static str {
        match self {
            // An email no canteen accepts is a malformed input from the
            // caller's point of view, not a uniqueness conflict.
            ApiError::Validation(_) | ApiError::NoMatchingCanteen => "VALIDATION_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InvalidAuthentication
            | ApiError::InvalidCredentials
            | ApiError::NotVerified => "AUTHENTICATION_ERROR",
            ApiError::EmailNotUnique
            | ApiError::NameNotUnique
            | ApiError::AlreadyVerified
            | ApiError::CodeInvalid
            | ApiError::CodeExpired
            | ApiError::RatingOutOfRange(_)
            | ApiError::InvalidDateRange => "CONFLICT",
            ApiError::Upstream(_) => "UPSTREAM_ERROR",
            ApiError::UnknownMealType { .. }
            | ApiError::AmbiguousCanteen(_)
            | ApiError::UnknownCanteen(_) => "INTEGRITY_ERROR",
            ApiError::Database(_) | ApiError::Io(_) | ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to an API caller. Internal failures are
    /// logged with full detail but never leak their cause outward.
    fn public_message(&self) -> String {
        match self {
            ApiError::Database(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                "internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::NoMatchingCanteen => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidAuthentication
            | ApiError::InvalidCredentials
            | ApiError::NotVerified => StatusCode::UNAUTHORIZED,
            ApiError::EmailNotUnique
            | ApiError::NameNotUnique
            | ApiError::AlreadyVerified
            | ApiError::CodeInvalid
            | ApiError::CodeExpired
            | ApiError::RatingOutOfRange(_)
            | ApiError::InvalidDateRange => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "timestamp": chrono::Utc::now().timestamp_millis(),
            "error": {
                "type": self.error_type(),
                "message": self.public_message(),
            }
        }))
    }
}

/// Convenience `Result` type used across services and routes.
pub type Result<T> = std::result::Result<T, ApiError>;
