use crate::http::dto::ErrorBody;
use crate::utils::error::ModCalcError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: message.to_string(),
                detail: None,
            },
        }
    }
}

impl From<ModCalcError> for ApiError {
    fn from(err: ModCalcError) -> Self {
        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                err,
                err.category(),
                err.severity()
            );
        } else {
            tracing::debug!("Request rejected with {}: {}", status, err);
        }

        // 400 額外附上原因，方便前端除錯
        let detail = match &err {
            ModCalcError::InvalidRequest { message } => Some(message.clone()),
            _ => None,
        };

        Self {
            status,
            body: ErrorBody {
                error: err.public_message(),
                detail,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
