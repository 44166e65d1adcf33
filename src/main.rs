// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::info;

use profilrs::application::AnalysisOrchestrator;
use profilrs::config::settings::Settings;
use profilrs::crawler::{Crawler, RobotsPolicyCache};
use profilrs::domain::services::ScoringService;
use profilrs::enrichment::{
    CrunchbaseProvider, EnrichmentManager, EnrichmentProvider, LinkedInProvider,
};
use profilrs::infrastructure::cache::OutcomeCache;
use profilrs::presentation::routes;
use profilrs::utils::telemetry;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting profilrs...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // 3. Build the crawl stack
    let robots = Arc::new(RobotsPolicyCache::new(
        Duration::from_secs(settings.crawler.robots_ttl_secs),
        Duration::from_secs(settings.crawler.robots_failure_ttl_secs),
        settings.crawler.user_agent.clone(),
    ));
    let crawler = Arc::new(Crawler::new(
        robots,
        Duration::from_secs_f64(settings.crawler.crawl_delay_secs),
        settings.crawler.max_concurrent_requests,
        settings.crawler.max_redirects,
        Duration::from_secs(settings.crawler.request_timeout_secs),
        settings.crawler.user_agent.clone(),
    )?);

    // 4. Enrichment providers
    let provider_timeout = Duration::from_secs(settings.enrichment.provider_timeout_secs);
    let providers: Vec<Arc<dyn EnrichmentProvider>> = vec![
        Arc::new(CrunchbaseProvider::new(
            settings.enrichment.enable_crunchbase,
            settings.enrichment.crunchbase_api_key.clone(),
            settings.enrichment.crunchbase_base_url.clone(),
            provider_timeout,
        )?),
        Arc::new(LinkedInProvider::new(
            settings.enrichment.enable_linkedin,
            settings.enrichment.linkedin_api_key.clone(),
        )),
    ];
    let enrichment = Arc::new(EnrichmentManager::new(providers, provider_timeout));

    // 5. Orchestrator with result cache
    let cache = Arc::new(OutcomeCache::new(Duration::from_secs(
        settings.pipeline.cache_ttl_secs,
    )));
    let orchestrator = Arc::new(AnalysisOrchestrator::new(
        crawler,
        enrichment,
        ScoringService::with_overrides(&settings.scoring.weights),
        cache,
        Duration::from_secs(settings.pipeline.timeout_secs),
        settings.crawler.max_pages,
        settings.crawler.respect_robots_txt,
    ));

    // 6. Start HTTP server
    let app = routes::routes(orchestrator);
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
