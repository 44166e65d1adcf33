// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::domain::models::candidate::FieldCandidate;
use crate::domain::models::outcome::EnrichmentError;
use crate::domain::models::profile::CompanyProfile;
use crate::enrichment::provider::EnrichmentProvider;

/// 一轮扩充的汇总结果
#[derive(Debug, Default)]
pub struct EnrichmentReport {
    pub candidates: Vec<FieldCandidate>,
    pub sources: Vec<String>,
    pub errors: Vec<EnrichmentError>,
}

/// 扩充管理器
///
/// 并发调度所有合格的提供者，每个提供者带独立超时。
/// 单个提供者失败或超时只记入错误列表，从不拖垮整轮分析。
pub struct EnrichmentManager {
    providers: Vec<Arc<dyn EnrichmentProvider>>,
    provider_timeout: Duration,
}

impl EnrichmentManager {
    pub fn new(providers: Vec<Arc<dyn EnrichmentProvider>>, provider_timeout: Duration) -> Self {
        Self {
            providers,
            provider_timeout,
        }
    }

    /// 对基础画像并发运行所有启用且可用的提供者
    pub async fn run_all(&self, profile: &CompanyProfile) -> EnrichmentReport {
        let eligible: Vec<&Arc<dyn EnrichmentProvider>> = self
            .providers
            .iter()
            .filter(|p| p.enabled() && p.can_enrich(profile))
            .collect();

        if eligible.is_empty() {
            debug!("No eligible enrichment providers");
            return EnrichmentReport::default();
        }

        let tasks = eligible.iter().map(|provider| {
            let provider = Arc::clone(provider);
            async move {
                let name = provider.name();
                let result = timeout(self.provider_timeout, provider.enrich(profile)).await;
                (name, result)
            }
        });

        let mut report = EnrichmentReport::default();
        for (name, result) in join_all(tasks).await {
            match result {
                Ok(Ok(candidates)) => {
                    info!(
                        provider = name,
                        candidates = candidates.len(),
                        "Enrichment provider succeeded"
                    );
                    report.candidates.extend(candidates);
                    report.sources.push(name.to_string());
                }
                Ok(Err(err)) => {
                    warn!(provider = name, error = %err, "Enrichment provider failed");
                    report.errors.push(EnrichmentError {
                        provider: name.to_string(),
                        message: err.to_string(),
                    });
                }
                Err(_) => {
                    warn!(
                        provider = name,
                        timeout_secs = self.provider_timeout.as_secs(),
                        "Enrichment provider timed out"
                    );
                    report.errors.push(EnrichmentError {
                        provider: name.to_string(),
                        message: format!(
                            "timed out after {}s",
                            self.provider_timeout.as_secs()
                        ),
                    });
                }
            }
        }
        report
    }
}
