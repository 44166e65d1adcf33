// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::crawler::{CrawlError, CrawlResult, Crawler};
use crate::domain::models::candidate::CandidateSet;
use crate::domain::models::outcome::AnalysisOutcome;
use crate::domain::models::profile::AnalysisRequest;
use crate::domain::services::{ExtractionService, ReportService, ScoringService};
use crate::enrichment::EnrichmentManager;
use crate::infrastructure::cache::OutcomeCache;
use crate::utils::errors::AnalysisError;
use crate::utils::url_utils::normalize_url;

type SharedAnalysis = Shared<BoxFuture<'static, Result<Arc<AnalysisOutcome>, AnalysisError>>>;

/// 分析编排器
///
/// 串起爬取、提取、扩充、评分与报告五个阶段。
/// 同一规范化URL同时只有一条在途管道，后到的请求挂在同一个
/// 共享future上；完成的结果按TTL缓存。
pub struct AnalysisOrchestrator {
    crawler: Arc<Crawler>,
    enrichment: Arc<EnrichmentManager>,
    scoring: ScoringService,
    cache: Arc<OutcomeCache>,
    in_flight: DashMap<String, SharedAnalysis>,
    pipeline_timeout: Duration,
    max_pages: usize,
    respect_robots: bool,
}

impl AnalysisOrchestrator {
    pub fn new(
        crawler: Arc<Crawler>,
        enrichment: Arc<EnrichmentManager>,
        scoring: ScoringService,
        cache: Arc<OutcomeCache>,
        pipeline_timeout: Duration,
        max_pages: usize,
        respect_robots: bool,
    ) -> Self {
        Self {
            crawler,
            enrichment,
            scoring,
            cache,
            in_flight: DashMap::new(),
            pipeline_timeout,
            max_pages,
            respect_robots,
        }
    }

    /// 分析入口：缓存命中直接返回，否则挂到在途管道或新建一条
    pub async fn analyze(
        self: &Arc<Self>,
        request: AnalysisRequest,
    ) -> Result<Arc<AnalysisOutcome>, AnalysisError> {
        let url = normalize_url(&request.url)
            .map_err(|e| AnalysisError::InvalidUrl(format!("{}: {}", request.url, e)))?;
        let key = url.to_string();

        if !request.force_refresh {
            if let Some(cached) = self.cache.get(&key) {
                info!(url = %key, "Returning cached analysis");
                return Ok(cached);
            }
        }

        let shared = match self.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => {
                debug!(url = %key, "Joining in-flight analysis");
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                let shared = self.spawn_pipeline(key.clone(), request);
                entry.insert(shared.clone());
                shared
            }
        };
        shared.await
    }

    /// 把管道挂到独立任务上，返回可克隆的共享句柄
    fn spawn_pipeline(self: &Arc<Self>, key: String, request: AnalysisRequest) -> SharedAnalysis {
        let this = Arc::clone(self);
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let limit = this.pipeline_timeout;
            let result = match timeout(limit, this.run_pipeline(&key, request)).await {
                Ok(outcome) => outcome.map(Arc::new),
                Err(_) => {
                    warn!(url = %key, "Analysis pipeline timed out");
                    Err(AnalysisError::PipelineTimeout(limit.as_millis() as u64))
                }
            };

            // Cache before dropping the in-flight entry so a request landing
            // between the two always hits one of them; removal still precedes
            // delivery so late joiners never attach to a finished future
            if let Ok(outcome) = &result {
                this.cache.put(key.clone(), Arc::clone(outcome));
            }
            this.in_flight.remove(&key);
            let _ = tx.send(result);
        });

        rx.map(|received| match received {
            Ok(result) => result,
            Err(_) => Err(AnalysisError::Internal(
                "analysis task dropped before completing".to_string(),
            )),
        })
        .boxed()
        .shared()
    }

    async fn run_pipeline(
        &self,
        key: &str,
        request: AnalysisRequest,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let started = std::time::Instant::now();
        info!(url = %key, "Starting analysis pipeline");

        let pages = self
            .crawler
            .crawl_site(key, self.respect_robots, self.max_pages)
            .await
            .map_err(|e| match e {
                CrawlError::InvalidUrl(msg) => AnalysisError::InvalidUrl(msg),
                CrawlError::PolicyDenied(msg) => AnalysisError::PolicyDenied(msg),
            })?;

        let primary = pages
            .first()
            .ok_or_else(|| AnalysisError::Internal("crawl returned no pages".to_string()))?;
        if let Some(error) = &primary.error {
            return Err(AnalysisError::FetchError(format!("{}: {}", key, error)));
        }
        if primary.html_body.is_none() {
            return Err(AnalysisError::ExtractionEmpty(key.to_string()));
        }

        let mut candidates = CandidateSet::new();
        for page in &pages {
            Self::extract_page(page, &mut candidates);
        }
        debug!(url = %key, pages = pages.len(), "Extraction phase finished");

        let (base_profile, _) = candidates.resolve();

        let mut enrichment_sources = Vec::new();
        let mut enrichment_errors = Vec::new();
        if request.include_enrichment {
            let report = self.enrichment.run_all(&base_profile).await;
            candidates.extend(report.candidates);
            enrichment_sources = report.sources;
            enrichment_errors = report.errors;
        }

        let (profile, provenance) = candidates.resolve();
        let completeness_score = self.scoring.completeness(&profile);
        let confidence_score = self.scoring.confidence(&profile, &provenance);
        let markdown_report = ReportService::render(
            &profile,
            completeness_score,
            confidence_score,
            &enrichment_sources,
            &enrichment_errors,
        );

        let processing_time_ms = started.elapsed().as_millis() as u64;
        info!(
            url = %key,
            completeness = completeness_score,
            confidence = confidence_score,
            elapsed_ms = processing_time_ms,
            "Analysis pipeline finished"
        );

        Ok(AnalysisOutcome {
            profile_id: Uuid::new_v4(),
            source_url: key.to_string(),
            company_profile: profile,
            completeness_score,
            confidence_score,
            analysis_timestamp: Utc::now(),
            processing_time_ms,
            enrichment_sources,
            enrichment_errors,
            provenance,
            markdown_report,
        })
    }

    fn extract_page(page: &CrawlResult, candidates: &mut CandidateSet) {
        let Some(body) = &page.html_body else {
            return;
        };
        let Ok(base) = Url::parse(&page.final_url) else {
            return;
        };
        candidates.extend(ExtractionService::extract(body, &base));
    }
}
