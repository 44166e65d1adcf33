// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use url::Url;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use profilrs::crawler::RobotsPolicyCache;

use crate::helpers::{
    analysis_request, build_orchestrator, build_orchestrator_with_options, TEST_USER_AGENT,
};

const LANDING_PAGE: &str = r#"
<html>
<head><title>Globex - Careers</title></head>
<body>
<h1>Globex</h1>
<a href="/about">About Us</a>
<a href="/api/internal">Internal API</a>
<a href="https://elsewhere.example.net/about">External About</a>
</body>
</html>
"#;

const ABOUT_PAGE: &str = r#"
<html>
<head><title>About Globex</title></head>
<body>
<p>Founded in 2008, Globex is headquartered in Springfield.</p>
</body>
</html>
"#;

#[tokio::test]
async fn test_secondary_pages_contribute_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LANDING_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ABOUT_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/.*"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = build_orchestrator(Vec::new());
    let outcome = orchestrator
        .analyze(analysis_request(&server.uri()))
        .await
        .expect("site crawl");

    assert_eq!(outcome.company_profile.name.as_deref(), Some("Globex"));
    // The founding year only appears on the secondary page
    assert_eq!(outcome.company_profile.founded_year, Some(2008));
}

#[tokio::test]
async fn test_single_page_mode_skips_link_discovery() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LANDING_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ABOUT_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = build_orchestrator_with_options(Vec::new(), true, 1);
    let outcome = orchestrator
        .analyze(analysis_request(&server.uri()))
        .await
        .expect("single page crawl");

    assert_eq!(outcome.company_profile.founded_year, None);
}

#[tokio::test]
async fn test_robots_policy_fetched_once_per_host() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /\n"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LANDING_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ABOUT_PAGE))
        .mount(&server)
        .await;

    let orchestrator = build_orchestrator(Vec::new());
    orchestrator
        .analyze(analysis_request(&server.uri()))
        .await
        .expect("crawl with cached robots policy");
}

#[tokio::test]
async fn test_robots_checks_skipped_when_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /\n"),
        )
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LANDING_PAGE))
        .mount(&server)
        .await;

    let orchestrator = build_orchestrator_with_options(Vec::new(), false, 1);
    let outcome = orchestrator
        .analyze(analysis_request(&server.uri()))
        .await
        .expect("crawl with robots disabled");

    assert_eq!(outcome.company_profile.name.as_deref(), Some("Globex"));
}

#[tokio::test]
async fn test_robots_server_error_fails_open() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LANDING_PAGE))
        .mount(&server)
        .await;

    let orchestrator = build_orchestrator_with_options(Vec::new(), true, 1);
    let outcome = orchestrator
        .analyze(analysis_request(&server.uri()))
        .await
        .expect("crawl despite robots.txt server error");

    assert_eq!(outcome.company_profile.name.as_deref(), Some("Globex"));
}

#[tokio::test]
async fn test_robots_failure_entry_expires_after_short_ttl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let cache = RobotsPolicyCache::new(
        Duration::from_secs(86400),
        Duration::from_millis(50),
        TEST_USER_AGENT.to_string(),
    );
    let url = Url::parse(&format!("{}/jobs", server.uri())).expect("mock url");

    let policy = cache.get_policy(&url).await;
    assert!(policy.is_allowed(&url, TEST_USER_AGENT));

    // The permissive failure entry lives only for the short failure TTL,
    // so the next lookup after it passes re-fetches robots.txt
    tokio::time::sleep(Duration::from_millis(80)).await;
    cache.get_policy(&url).await;
}
