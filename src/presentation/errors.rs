// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::utils::errors::AnalysisError;

/// HTTP层错误包装
///
/// 把管道错误映射为状态码与统一的JSON错误体
pub struct ApiError(pub AnalysisError);

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            AnalysisError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            AnalysisError::PolicyDenied(_) => StatusCode::FORBIDDEN,
            AnalysisError::FetchError(_) | AnalysisError::ExtractionEmpty(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AnalysisError::PipelineTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AnalysisError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({
            "error": self.0.kind(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
