// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 分析管道错误类型
///
/// 管道内所有终止性失败的统一表示，宿主服务负责将其映射为响应格式
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("URL is invalid: {0}")]
    InvalidUrl(String),

    #[error("Blocked by robots.txt: {0}")]
    PolicyDenied(String),

    #[error("Failed to fetch page: {0}")]
    FetchError(String),

    #[error("No content could be extracted: {0}")]
    ExtractionEmpty(String),

    #[error("Analysis timed out after {0}ms")]
    PipelineTimeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// 错误种类的稳定标识，用于日志与响应体
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InvalidUrl(_) => "invalid_url",
            AnalysisError::PolicyDenied(_) => "policy_denied",
            AnalysisError::FetchError(_) => "fetch_error",
            AnalysisError::ExtractionEmpty(_) => "extraction_empty",
            AnalysisError::PipelineTimeout(_) => "pipeline_timeout",
            AnalysisError::Internal(_) => "internal",
        }
    }
}
