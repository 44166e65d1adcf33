// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use profilrs::domain::models::candidate::CandidateValue;
use profilrs::domain::models::profile::{fields, CompanyProfile};
use profilrs::enrichment::{CrunchbaseProvider, EnrichmentProvider, ProviderError};

fn provider_for(server: &MockServer) -> CrunchbaseProvider {
    CrunchbaseProvider::new(
        true,
        "test-key".to_string(),
        server.uri(),
        Duration::from_secs(5),
    )
    .expect("build provider")
}

fn profile_named(name: &str) -> CompanyProfile {
    CompanyProfile {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_search_then_details_flow() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/searches/organizations"))
        .and(header("X-cb-user-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entities": [
                {"properties": {"uuid": "abc-123", "name": "Acme Corporation"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/entities/organizations/abc-123"))
        .and(header("X-cb-user-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "properties": {
                "name": "Acme Corporation",
                "short_description": "Rocket-powered developer tooling.",
                "funding_stage": "Series B",
                "funding_total": {"value_usd": 45500000.0},
                "founded_on": {"value": "2012-03-01"},
                "headquarters_location": {"value": "Austin, Texas"}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let candidates = provider
        .enrich(&profile_named("Acme Corporation"))
        .await
        .expect("enrichment succeeds");

    let funding = candidates
        .iter()
        .find(|c| c.field_name == fields::TOTAL_FUNDING)
        .expect("funding candidate");
    assert_eq!(funding.value, CandidateValue::Float(45.5));
    assert_eq!(funding.source, "crunchbase");
    assert!(candidates
        .iter()
        .any(|c| c.field_name == fields::FUNDING_STAGE));
}

#[tokio::test]
async fn test_company_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/searches/organizations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"entities": []})))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let result = provider.enrich(&profile_named("Nonexistent Co")).await;
    assert!(matches!(result, Err(ProviderError::NotFound)));
}

#[tokio::test]
async fn test_upstream_error_surfaces_as_request_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/searches/organizations"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let result = provider.enrich(&profile_named("Acme")).await;
    assert!(matches!(result, Err(ProviderError::Request(_))));
}
