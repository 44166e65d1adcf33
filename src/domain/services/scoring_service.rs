// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::models::candidate::Provenance;
use crate::domain::models::profile::{fields, CompanyProfile};

/// 默认字段权重表
const DEFAULT_WEIGHTS: [(&str, f64); 11] = [
    (fields::NAME, 0.20),
    (fields::DESCRIPTION, 0.15),
    (fields::INDUSTRY, 0.10),
    (fields::WEBSITE, 0.10),
    (fields::EMPLOYEE_COUNT, 0.10),
    (fields::HEADQUARTERS, 0.10),
    (fields::EMPLOYEE_COUNT_RANGE, 0.05),
    (fields::FUNDING_STAGE, 0.05),
    (fields::LINKEDIN_URL, 0.05),
    (fields::FOUNDED_YEAR, 0.05),
    (fields::TECH_STACK, 0.05),
];

/// 评分服务
///
/// 完整度：已填充字段的权重占比。
/// 置信度：对已填充字段，按字段权重对来源置信度做加权平均。
/// 两者都是纯函数，只看画像与溯源，不访问外部状态。
#[derive(Debug, Clone)]
pub struct ScoringService {
    weights: Vec<(String, f64)>,
}

impl Default for ScoringService {
    fn default() -> Self {
        Self {
            weights: DEFAULT_WEIGHTS
                .iter()
                .map(|(f, w)| (f.to_string(), *w))
                .collect(),
        }
    }
}

impl ScoringService {
    /// 用配置覆盖默认权重，未覆盖的字段保留默认值
    pub fn with_overrides(overrides: &HashMap<String, f64>) -> Self {
        let mut service = Self::default();
        for (field, weight) in &mut service.weights {
            if let Some(value) = overrides.get(field.as_str()) {
                *weight = *value;
            }
        }
        service
    }

    /// 完整度评分，范围[0.0, 1.0]
    pub fn completeness(&self, profile: &CompanyProfile) -> f64 {
        let total: f64 = self.weights.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return 0.0;
        }
        let populated: f64 = self
            .weights
            .iter()
            .filter(|(field, _)| profile.is_populated(field))
            .map(|(_, w)| w)
            .sum();
        let score = populated / total;
        debug!(completeness = score, "Computed completeness score");
        score
    }

    /// 置信度评分，范围[0.0, 1.0]；无已填充字段时为0.0
    pub fn confidence(
        &self,
        profile: &CompanyProfile,
        provenance: &HashMap<String, Provenance>,
    ) -> f64 {
        let mut weighted = 0.0;
        let mut weight_sum = 0.0;
        for (field, weight) in &self.weights {
            if !profile.is_populated(field) {
                continue;
            }
            let source_confidence = provenance.get(field).map_or(0.0, |p| p.confidence);
            weighted += weight * source_confidence;
            weight_sum += weight;
        }
        if weight_sum <= 0.0 {
            return 0.0;
        }
        let score = weighted / weight_sum;
        debug!(confidence = score, "Computed confidence score");
        score
    }
}
