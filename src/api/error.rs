//! HTTP 错误映射
//!
//! `ApiError` 是错误类型到 HTTP 状态码的唯一转换点，handler 返回
//! `Result<HttpResponse, ApiError>`。

use std::fmt;

use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use tracing::{error, info};

use crate::errors::AnalyticsError;
use crate::services::validation::ValidationIssue;

/// 统一错误响应体
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationIssue>>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    /// 400，附带逐字段问题
    Validation(Vec<ValidationIssue>),
    /// 400，请求体不是合法 JSON 或超出大小限制
    InvalidBody(String),
    /// 401
    MissingAuthorization,
    /// 403
    InvalidApiKey,
    /// 404
    NotFound,
    /// 500，存储层错误信息原样返回
    Storage(String),
}

impl ApiError {
    fn body(&self) -> ErrorBody {
        let (error, message, details) = match self {
            ApiError::Validation(issues) => ("Validation failed", None, Some(issues.clone())),
            ApiError::InvalidBody(msg) => ("Invalid JSON body", Some(msg.clone()), None),
            ApiError::MissingAuthorization => ("Missing Authorization header", None, None),
            ApiError::InvalidApiKey => ("Invalid API key", None, None),
            ApiError::NotFound => ("Not found", None, None),
            ApiError::Storage(msg) => ("Internal server error", Some(msg.clone()), None),
        };
        ErrorBody {
            error: error.to_string(),
            message,
            details,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self.body();
        match body.message {
            Some(msg) => write!(f, "{}: {}", body.error, msg),
            None => write!(f, "{}", body.error),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingAuthorization => StatusCode::UNAUTHORIZED,
            ApiError::InvalidApiKey => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Storage(msg) => error!("Request failed with storage error: {}", msg),
            ApiError::Validation(issues) => info!("Rejected payload with {} issue(s)", issues.len()),
            _ => {}
        }

        HttpResponse::build(self.status_code())
            .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
            .json(self.body())
    }
}

/// 请求路径上的内部错误都来自存储层
impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        ApiError::Storage(err.message().to_string())
    }
}

impl From<Vec<ValidationIssue>> for ApiError {
    fn from(issues: Vec<ValidationIssue>) -> Self {
        ApiError::Validation(issues)
    }
}
