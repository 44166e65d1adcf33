// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::domain::models::candidate::FieldCandidate;
use crate::domain::models::profile::{fields, CompanyProfile};
use crate::enrichment::provider::{EnrichmentProvider, ProviderError};

/// LinkedIn候选值的来源标签
pub const SOURCE_LINKEDIN: &str = "linkedin";
/// 模拟数据的置信度
pub const CONFIDENCE_LINKEDIN: f64 = 0.5;

/// LinkedIn提供者（模拟实现）
///
/// LinkedIn的服务条款不允许自动化抓取，这里按公司名推导
/// 合理的占位数据，留出接入官方API的位置。
pub struct LinkedInProvider {
    enabled: bool,
    api_key: String,
}

impl LinkedInProvider {
    pub fn new(enabled: bool, api_key: String) -> Self {
        Self { enabled, api_key }
    }
}

#[async_trait]
impl EnrichmentProvider for LinkedInProvider {
    fn name(&self) -> &'static str {
        SOURCE_LINKEDIN
    }

    fn enabled(&self) -> bool {
        self.enabled && !self.api_key.is_empty()
    }

    fn can_enrich(&self, profile: &CompanyProfile) -> bool {
        profile.name.is_some() || profile.linkedin_url.is_some()
    }

    async fn enrich(&self, profile: &CompanyProfile) -> Result<Vec<FieldCandidate>, ProviderError> {
        // Simulated API latency
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut candidates = Vec::new();
        if let Some(name) = &profile.name {
            if profile.linkedin_url.is_none() {
                let slug = name.to_lowercase().replace(' ', "-");
                candidates.push(FieldCandidate::text(
                    fields::LINKEDIN_URL,
                    format!("https://linkedin.com/company/{}", slug),
                    SOURCE_LINKEDIN,
                    CONFIDENCE_LINKEDIN,
                ));
            }
            if profile.employee_count.is_none() {
                candidates.push(FieldCandidate::text(
                    fields::EMPLOYEE_COUNT_RANGE,
                    "201-500",
                    SOURCE_LINKEDIN,
                    CONFIDENCE_LINKEDIN,
                ));
            }
            if profile.industry.is_none() {
                candidates.push(FieldCandidate::text(
                    fields::INDUSTRY,
                    "Technology",
                    SOURCE_LINKEDIN,
                    CONFIDENCE_LINKEDIN,
                ));
            }
        }

        info!(candidates = candidates.len(), "LinkedIn enrichment completed (mock)");
        Ok(candidates)
    }
}
