// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use profilrs::application::AnalysisOrchestrator;
use profilrs::crawler::{Crawler, RobotsPolicyCache};
use profilrs::domain::models::candidate::FieldCandidate;
use profilrs::domain::models::profile::{AnalysisRequest, CompanyProfile};
use profilrs::domain::services::ScoringService;
use profilrs::enrichment::{EnrichmentManager, EnrichmentProvider, ProviderError};
use profilrs::infrastructure::cache::OutcomeCache;

pub const TEST_USER_AGENT: &str = "profilrs-test/1.0";

/// 测试编排器：指向wiremock，礼貌间隔归零以免拖慢测试
pub fn build_orchestrator(
    providers: Vec<Arc<dyn EnrichmentProvider>>,
) -> Arc<AnalysisOrchestrator> {
    build_orchestrator_with_options(providers, true, 3)
}

pub fn build_orchestrator_with_options(
    providers: Vec<Arc<dyn EnrichmentProvider>>,
    respect_robots: bool,
    max_pages: usize,
) -> Arc<AnalysisOrchestrator> {
    build_orchestrator_full(providers, respect_robots, max_pages, Duration::from_secs(30))
}

pub fn build_orchestrator_with_pipeline_timeout(
    pipeline_timeout: Duration,
) -> Arc<AnalysisOrchestrator> {
    build_orchestrator_full(Vec::new(), true, 1, pipeline_timeout)
}

fn build_orchestrator_full(
    providers: Vec<Arc<dyn EnrichmentProvider>>,
    respect_robots: bool,
    max_pages: usize,
    pipeline_timeout: Duration,
) -> Arc<AnalysisOrchestrator> {
    let robots = Arc::new(RobotsPolicyCache::new(
        Duration::from_secs(86400),
        Duration::from_secs(300),
        TEST_USER_AGENT.to_string(),
    ));
    let crawler = Arc::new(
        Crawler::new(
            robots,
            Duration::ZERO,
            10,
            5,
            Duration::from_secs(5),
            TEST_USER_AGENT.to_string(),
        )
        .expect("build crawler"),
    );
    let enrichment = Arc::new(EnrichmentManager::new(providers, Duration::from_secs(5)));
    let cache = Arc::new(OutcomeCache::new(Duration::from_secs(3600)));
    Arc::new(AnalysisOrchestrator::new(
        crawler,
        enrichment,
        ScoringService::default(),
        cache,
        pipeline_timeout,
        max_pages,
        respect_robots,
    ))
}

pub fn analysis_request(url: &str) -> AnalysisRequest {
    AnalysisRequest {
        url: url.to_string(),
        include_enrichment: false,
        force_refresh: false,
    }
}

pub fn enriched_request(url: &str) -> AnalysisRequest {
    AnalysisRequest {
        url: url.to_string(),
        include_enrichment: true,
        force_refresh: false,
    }
}

/// 返回固定候选集的测试提供者
pub struct StubProvider {
    pub provider_name: &'static str,
    pub candidates: Vec<FieldCandidate>,
}

#[async_trait]
impl EnrichmentProvider for StubProvider {
    fn name(&self) -> &'static str {
        self.provider_name
    }

    fn enabled(&self) -> bool {
        true
    }

    fn can_enrich(&self, _profile: &CompanyProfile) -> bool {
        true
    }

    async fn enrich(
        &self,
        _profile: &CompanyProfile,
    ) -> Result<Vec<FieldCandidate>, ProviderError> {
        Ok(self.candidates.clone())
    }
}

/// 总是失败的测试提供者
pub struct BrokenProvider;

#[async_trait]
impl EnrichmentProvider for BrokenProvider {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn enabled(&self) -> bool {
        true
    }

    fn can_enrich(&self, _profile: &CompanyProfile) -> bool {
        true
    }

    async fn enrich(
        &self,
        _profile: &CompanyProfile,
    ) -> Result<Vec<FieldCandidate>, ProviderError> {
        Err(ProviderError::Request("connection refused".to_string()))
    }
}

pub const COMPANY_PAGE: &str = r#"
<html>
<head>
<title>Acme Corporation - Careers</title>
<meta name="description" content="Acme Corporation builds rocket-powered developer tooling for modern engineering teams.">
<script type="application/ld+json">
{
    "@context": "https://schema.org",
    "@type": "Organization",
    "name": "Acme Corporation",
    "url": "https://acme.example.com",
    "description": "Acme builds rocket-powered developer tooling.",
    "foundingDate": "2012-03-01",
    "address": {"addressLocality": "Austin", "addressRegion": "TX"},
    "sameAs": ["https://linkedin.com/company/acme"],
    "numberOfEmployees": {"value": 350, "minValue": 201, "maxValue": 500}
}
</script>
</head>
<body>
<h1>Careers at Acme</h1>
<p>We are an innovative software company using Rust and Kubernetes.</p>
<p>Benefits include remote work, equity and unlimited pto.</p>
</body>
</html>
"#;
