//! HTTP 错误映射

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::ApiError;

/// 错误响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// HTTP 处理器错误
#[derive(Debug)]
pub enum AppError {
    /// 请求体无法解析
    BadRequest(String),
    /// 业务层错误
    Api(ApiError),
}

impl AppError {
    /// 状态码与错误码
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Api(err) => match err {
                ApiError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                ApiError::UnknownScenario(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_SCENARIO"),
                ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                ApiError::ValidationError(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
                }
                ApiError::InvalidReplacement(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REPLACEMENT")
                }
                ApiError::EmptyFleet => (StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_FLEET"),
                ApiError::BusinessRuleViolation(_) => (StatusCode::CONFLICT, "BUSINESS_RULE"),
                ApiError::RegistryTimeout { .. } => {
                    (StatusCode::GATEWAY_TIMEOUT, "REGISTRY_TIMEOUT")
                }
                ApiError::RegistryUnavailable(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "REGISTRY_UNAVAILABLE")
                }
                ApiError::DatabaseConnectionError(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "DATABASE_UNAVAILABLE")
                }
                ApiError::ConfigError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
                ApiError::DatabaseError(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")
                }
                ApiError::InternalError(_) | ApiError::Other(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Api(err) => err.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(status = %status, code, error = %message, "请求处理失败");
        } else {
            tracing::debug!(status = %status, code, error = %message, "请求被拒绝");
        }

        let mut body = ErrorBody::new(code, message);
        if let AppError::Api(ApiError::RegistryTimeout { timeout_ms }) = &self {
            body = body.with_details(format!("timeout_ms={}", timeout_ms));
        }

        (status, Json(body)).into_response()
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        AppError::Api(err)
    }
}
