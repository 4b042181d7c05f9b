use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use holdbook_auth::{AuthError, AuthzError};
use holdbook_infra::ledger::{LedgerReadError, LedgerWriteError};

/// Every failure a handler can surface. Each maps to a JSON body
/// `{error, message}`; none takes the process down.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or malformed session token")]
    NoSession,

    #[error("session expired or unknown; start a new session")]
    SessionExpired,

    #[error("not logged in")]
    NotAuthenticated,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Write(#[from] LedgerWriteError),

    #[error(transparent)]
    Read(#[from] LedgerReadError),

    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ApiError::NoSession => json_error(StatusCode::UNAUTHORIZED, "no_session", message),
            ApiError::SessionExpired => {
                json_error(StatusCode::UNAUTHORIZED, "session_expired", message)
            }
            ApiError::NotAuthenticated => {
                json_error(StatusCode::UNAUTHORIZED, "not_authenticated", message)
            }
            ApiError::Auth(AuthError::Rejected { attempts_remaining }) => (
                StatusCode::UNAUTHORIZED,
                axum::Json(json!({
                    "error": "auth_rejected",
                    "message": message,
                    "attempts_remaining": attempts_remaining,
                })),
            )
                .into_response(),
            ApiError::Auth(AuthError::Locked) => {
                json_error(StatusCode::LOCKED, "auth_locked", message)
            }
            ApiError::Forbidden(_) => json_error(StatusCode::FORBIDDEN, "forbidden", message),
            ApiError::BadRequest(_) => {
                json_error(StatusCode::BAD_REQUEST, "validation_error", message)
            }
            ApiError::Write(LedgerWriteError::Validation(err)) => json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                err.message(),
            ),
            ApiError::Write(LedgerWriteError::StoreUnavailable(_)) | ApiError::Read(_) => {
                json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", message)
            }
            ApiError::Internal(_) => {
                error!(error = %message, "internal api error");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
            }
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
