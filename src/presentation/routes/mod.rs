// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::application::AnalysisOrchestrator;
use crate::presentation::handlers::{analyze_handler, health_handler};

/// 创建应用路由
pub fn routes(orchestrator: Arc<AnalysisOrchestrator>) -> Router {
    Router::new()
        .route("/health", get(health_handler::health_check))
        .route("/analyze", post(analyze_handler::analyze))
        .layer(Extension(orchestrator))
        .layer(TraceLayer::new_for_http())
}
