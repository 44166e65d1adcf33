// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::{Duration, Instant};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use profilrs::domain::models::candidate::{FieldCandidate, SOURCE_EXTRACTION};
use profilrs::domain::models::profile::fields;
use profilrs::utils::errors::AnalysisError;

use crate::helpers::{
    analysis_request, build_orchestrator, build_orchestrator_with_pipeline_timeout,
    enriched_request, BrokenProvider, StubProvider, COMPANY_PAGE,
};

#[tokio::test]
async fn test_structured_page_yields_high_confidence_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COMPANY_PAGE))
        .mount(&server)
        .await;

    let orchestrator = build_orchestrator(Vec::new());
    let outcome = orchestrator
        .analyze(analysis_request(&server.uri()))
        .await
        .expect("analysis should succeed");

    let profile = &outcome.company_profile;
    assert_eq!(profile.name.as_deref(), Some("Acme Corporation"));
    assert_eq!(profile.founded_year, Some(2012));
    assert_eq!(profile.employee_count, Some(350));
    assert_eq!(profile.headquarters.as_deref(), Some("Austin, TX"));
    assert_eq!(profile.tech_stack, vec!["Rust", "Kubernetes"]);

    assert!(outcome.completeness_score > 0.5);
    assert!(outcome.confidence_score > 0.7);
    assert!(outcome.enrichment_sources.is_empty());
    assert!(outcome
        .markdown_report
        .contains("# Acme Corporation - Company Analysis Report"));

    let name_provenance = outcome.provenance.get(fields::NAME).expect("name provenance");
    assert_eq!(name_provenance.source, SOURCE_EXTRACTION);
    assert_eq!(name_provenance.confidence, 0.95);
}

#[tokio::test]
async fn test_repeated_analysis_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COMPANY_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = build_orchestrator(Vec::new());
    let first = orchestrator
        .analyze(analysis_request(&server.uri()))
        .await
        .expect("first analysis");
    let second = orchestrator
        .analyze(analysis_request(&server.uri()))
        .await
        .expect("second analysis");

    assert_eq!(first.profile_id, second.profile_id);
}

#[tokio::test]
async fn test_force_refresh_bypasses_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COMPANY_PAGE))
        .expect(2)
        .mount(&server)
        .await;

    let orchestrator = build_orchestrator(Vec::new());
    let first = orchestrator
        .analyze(analysis_request(&server.uri()))
        .await
        .expect("first analysis");

    let mut refresh = analysis_request(&server.uri());
    refresh.force_refresh = true;
    let second = orchestrator.analyze(refresh).await.expect("forced refresh");

    assert_ne!(first.profile_id, second.profile_id);
}

#[tokio::test]
async fn test_concurrent_requests_share_one_crawl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COMPANY_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = build_orchestrator(Vec::new());
    let (first, second) = tokio::join!(
        orchestrator.analyze(analysis_request(&server.uri())),
        orchestrator.analyze(analysis_request(&server.uri())),
    );

    let first = first.expect("first concurrent analysis");
    let second = second.expect("second concurrent analysis");
    assert_eq!(first.profile_id, second.profile_id);
}

#[tokio::test]
async fn test_robots_disallow_blocks_analysis() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /\n"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COMPANY_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = build_orchestrator(Vec::new());
    let result = orchestrator.analyze(analysis_request(&server.uri())).await;

    assert!(matches!(result, Err(AnalysisError::PolicyDenied(_))));
}

#[tokio::test]
async fn test_upstream_error_maps_to_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let orchestrator = build_orchestrator(Vec::new());
    let result = orchestrator.analyze(analysis_request(&server.uri())).await;

    assert!(matches!(result, Err(AnalysisError::FetchError(_))));
}

#[tokio::test]
async fn test_empty_body_maps_to_extraction_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("   "))
        .mount(&server)
        .await;

    let orchestrator = build_orchestrator(Vec::new());
    let result = orchestrator.analyze(analysis_request(&server.uri())).await;

    assert!(matches!(result, Err(AnalysisError::ExtractionEmpty(_))));
}

#[tokio::test]
async fn test_unparseable_url_is_rejected() {
    let orchestrator = build_orchestrator(Vec::new());
    let result = orchestrator.analyze(analysis_request("not a url at all")).await;
    assert!(matches!(result, Err(AnalysisError::InvalidUrl(_))));
}

#[tokio::test]
async fn test_pipeline_deadline_expiry_fails_the_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(COMPANY_PAGE)
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let orchestrator = build_orchestrator_with_pipeline_timeout(Duration::from_millis(500));
    let started = Instant::now();
    let result = orchestrator.analyze(analysis_request(&server.uri())).await;

    assert!(matches!(result, Err(AnalysisError::PipelineTimeout(500))));
    // The deadline cuts the slow fetch short rather than waiting it out
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_enrichment_fills_gaps_without_overwriting_extraction() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COMPANY_PAGE))
        .mount(&server)
        .await;

    let provider = StubProvider {
        provider_name: "stub",
        candidates: vec![
            // Lower confidence than the JSON-LD name, must not win
            FieldCandidate::text(fields::NAME, "Acme Inc", "stub", 0.7),
            // Extraction leaves this empty, the provider fills it
            FieldCandidate::text(fields::FUNDING_STAGE, "Series B", "stub", 0.7),
        ],
    };

    let orchestrator = build_orchestrator(vec![Arc::new(provider)]);
    let outcome = orchestrator
        .analyze(enriched_request(&server.uri()))
        .await
        .expect("enriched analysis");

    assert_eq!(
        outcome.company_profile.name.as_deref(),
        Some("Acme Corporation")
    );
    assert_eq!(
        outcome.company_profile.funding_stage.as_deref(),
        Some("Series B")
    );
    assert_eq!(outcome.enrichment_sources, vec!["stub".to_string()]);
    assert_eq!(
        outcome.provenance.get(fields::FUNDING_STAGE).map(|p| p.source.as_str()),
        Some("stub")
    );
}

#[tokio::test]
async fn test_provider_failure_degrades_gracefully() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COMPANY_PAGE))
        .mount(&server)
        .await;

    let orchestrator = build_orchestrator(vec![Arc::new(BrokenProvider)]);
    let outcome = orchestrator
        .analyze(enriched_request(&server.uri()))
        .await
        .expect("analysis should survive provider failure");

    assert_eq!(outcome.company_profile.name.as_deref(), Some("Acme Corporation"));
    assert!(outcome.enrichment_sources.is_empty());
    assert_eq!(outcome.enrichment_errors.len(), 1);
    assert_eq!(outcome.enrichment_errors[0].provider, "broken");
    assert!(outcome.markdown_report.contains("**Enrichment Issues:**"));
}
