// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Json},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::info;

use crate::application::AnalysisOrchestrator;
use crate::domain::models::profile::AnalysisRequest;
use crate::presentation::errors::ApiError;

/// 接收URL并返回完整的公司分析结果
pub async fn analyze(
    Extension(orchestrator): Extension<Arc<AnalysisOrchestrator>>,
    Json(payload): Json<AnalysisRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!(url = %payload.url, "Received analysis request");
    let outcome = orchestrator.analyze(payload).await?;
    Ok(Json(outcome.as_ref().clone()))
}
