// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::models::candidate::Provenance;
use crate::domain::models::profile::CompanyProfile;

/// 单个补全提供方的失败记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichmentError {
    pub provider: String,
    pub message: String,
}

/// 一次分析的最终产物
///
/// 由编排器在管道完成时创建，之后不可变；
/// 连同规范化URL一起作为缓存键的载体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub profile_id: Uuid,
    pub source_url: String,
    pub company_profile: CompanyProfile,

    /// 加权字段覆盖率，[0,1]
    pub completeness_score: f64,
    /// 按溯源置信度加权的平均值，[0,1]
    pub confidence_score: f64,

    pub analysis_timestamp: DateTime<Utc>,
    pub processing_time_ms: u64,

    pub enrichment_sources: Vec<String>,
    pub enrichment_errors: Vec<EnrichmentError>,

    /// 字段级溯源，供评分与调试使用
    pub provenance: HashMap<String, Provenance>,

    pub markdown_report: String,
}
