// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use url::Url;

use crate::crawler::politeness::PolitenessGate;
use crate::crawler::robots::RobotsPolicyCache;
use crate::utils::url_utils::{host_key, normalize_url, resolve_url};

/// 一次抓取的结果与元数据
///
/// 由爬虫独占直至交给提取器，之后不再修改
#[derive(Debug, Clone)]
pub struct CrawlResult {
    pub requested_url: String,
    /// 跟随重定向后的最终URL
    pub final_url: String,
    pub status_code: Option<u16>,
    pub html_body: Option<String>,
    pub fetched_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    /// 非2xx、超时或网络错误时填充；抓取失败不会越过此边界抛出
    pub error: Option<String>,
}

impl CrawlResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.html_body.is_some()
    }
}

/// 抓取前即失败的错误（不产生HTTP请求，robots.txt本身除外）
#[derive(Error, Debug, Clone)]
pub enum CrawlError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("disallowed by robots.txt: {0}")]
    PolicyDenied(String),
}

/// 单URL爬虫
///
/// 全局并发由固定大小的信号量约束；同主机的礼貌间隔独立于全局
/// 槽位执行，一个主机内部串行不会挡住其他主机
pub struct Crawler {
    client: reqwest::Client,
    robots: Arc<RobotsPolicyCache>,
    politeness: PolitenessGate,
    fetch_slots: Arc<Semaphore>,
    user_agent: String,
    request_timeout: Duration,
}

/// 追加抓取的站内链接关键词（about/团队/招聘类页面）
const RELATED_KEYWORDS: [&str; 9] = [
    "about", "company", "team", "culture", "careers", "jobs", "mission", "values", "story",
];

/// 跳过的非内容路径
const AVOID_PATTERNS: [&str; 13] = [
    "/api/", "/ajax/", "/static/", "/assets/", "/css/", "/js/", "/images/", "/img/", "/admin/",
    ".json", ".xml", ".pdf", ".doc",
];

impl Crawler {
    pub fn new(
        robots: Arc<RobotsPolicyCache>,
        default_delay: Duration,
        max_concurrent: usize,
        max_redirects: usize,
        request_timeout: Duration,
        user_agent: String,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(max_redirects))
            .build()?;

        Ok(Self {
            client,
            robots,
            politeness: PolitenessGate::new(default_delay),
            fetch_slots: Arc::new(Semaphore::new(max_concurrent)),
            user_agent,
            request_timeout,
        })
    }

    /// 抓取单个页面
    ///
    /// 步骤：规范化URL → robots闸（可选）→ 主机礼貌间隔 → 全局槽位 →
    /// 带超时的GET。传输层失败以 `CrawlResult.error` 返回
    pub async fn fetch(&self, raw_url: &str, respect_robots: bool) -> Result<CrawlResult, CrawlError> {
        let url = normalize_url(raw_url).map_err(|e| CrawlError::InvalidUrl(e.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(CrawlError::InvalidUrl(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }

        let host = host_key(&url);
        let mut crawl_delay = None;

        if respect_robots {
            let policy = self.robots.get_policy(&url).await;
            if !policy.is_allowed(&url, &self.user_agent) {
                info!("URL blocked by robots.txt: {}", url);
                return Err(CrawlError::PolicyDenied(url.to_string()));
            }
            crawl_delay = policy.crawl_delay;
        }

        self.politeness.wait(&host, crawl_delay).await;

        let _permit = match self.fetch_slots.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return Ok(Self::failed_result(&url, None, 0, "fetch pool closed"));
            }
        };

        debug!("Fetching page {}", url);
        let fetched_at = Utc::now();
        let started = Instant::now();

        let response = self
            .client
            .get(url.clone())
            .timeout(self.request_timeout)
            .send()
            .await;

        let elapsed_ms = started.elapsed().as_millis() as u64;

        match response {
            Ok(resp) => {
                let status = resp.status();
                let final_url = resp.url().clone();

                if !status.is_success() {
                    warn!("Fetch of {} returned status {}", url, status);
                    return Ok(CrawlResult {
                        requested_url: url.to_string(),
                        final_url: final_url.to_string(),
                        status_code: Some(status.as_u16()),
                        html_body: None,
                        fetched_at,
                        elapsed_ms,
                        error: Some(format!("HTTP status {}", status)),
                    });
                }

                match resp.text().await {
                    Ok(body) if !body.trim().is_empty() => {
                        info!(
                            "Fetched {} ({} bytes in {}ms)",
                            final_url,
                            body.len(),
                            elapsed_ms
                        );
                        Ok(CrawlResult {
                            requested_url: url.to_string(),
                            final_url: final_url.to_string(),
                            status_code: Some(status.as_u16()),
                            html_body: Some(body),
                            fetched_at,
                            elapsed_ms,
                            error: None,
                        })
                    }
                    // 2xx with an empty body: fetch succeeded, extraction will
                    // have nothing to work with
                    Ok(_) => {
                        warn!("Fetch of {} returned an empty body", url);
                        Ok(CrawlResult {
                            requested_url: url.to_string(),
                            final_url: final_url.to_string(),
                            status_code: Some(status.as_u16()),
                            html_body: None,
                            fetched_at,
                            elapsed_ms,
                            error: None,
                        })
                    }
                    Err(e) => Ok(Self::failed_result(
                        &url,
                        Some(status.as_u16()),
                        elapsed_ms,
                        &format!("failed to read body: {}", e),
                    )),
                }
            }
            Err(e) => {
                let message = if e.is_timeout() {
                    format!("request timed out after {:?}", self.request_timeout)
                } else {
                    format!("request failed: {}", e)
                };
                warn!("Fetch of {} failed: {}", url, message);
                Ok(Self::failed_result(&url, None, elapsed_ms, &message))
            }
        }
    }

    /// 抓取主页面及其站内about/招聘类次级页面
    ///
    /// 次级页面的失败（含robots拒绝）只影响该页面，不影响整次爬取
    pub async fn crawl_site(
        &self,
        raw_url: &str,
        respect_robots: bool,
        max_pages: usize,
    ) -> Result<Vec<CrawlResult>, CrawlError> {
        let primary = self.fetch(raw_url, respect_robots).await?;

        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(primary.requested_url.clone());
        seen.insert(primary.final_url.clone());

        let links = match (&primary.html_body, Url::parse(&primary.final_url)) {
            (Some(body), Ok(base)) if max_pages > 1 => discover_related_links(body, &base),
            _ => Vec::new(),
        };

        let mut results = vec![primary];

        for link in links {
            if results.len() >= max_pages {
                break;
            }
            if !seen.insert(link.to_string()) {
                continue;
            }
            match self.fetch(link.as_str(), respect_robots).await {
                Ok(result) if result.is_success() => results.push(result),
                Ok(result) => {
                    debug!(
                        "Skipping secondary page {}: {}",
                        link,
                        result.error.as_deref().unwrap_or("no body")
                    );
                }
                Err(e) => {
                    debug!("Skipping secondary page {}: {}", link, e);
                }
            }
        }

        info!(
            "Site crawl of {} finished with {} page(s)",
            raw_url,
            results.len()
        );
        Ok(results)
    }

    fn failed_result(
        url: &Url,
        status_code: Option<u16>,
        elapsed_ms: u64,
        message: &str,
    ) -> CrawlResult {
        CrawlResult {
            requested_url: url.to_string(),
            final_url: url.to_string(),
            status_code,
            html_body: None,
            fetched_at: Utc::now(),
            elapsed_ms,
            error: Some(message.to_string()),
        }
    }
}

/// 从页面中发现值得追加抓取的同主机链接
pub fn discover_related_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = resolve_url(base_url, href) else {
            continue;
        };

        if resolved.host_str() != base_url.host_str() {
            continue;
        }
        let path = resolved.path().to_lowercase();
        if AVOID_PATTERNS.iter().any(|p| path.contains(p)) {
            continue;
        }

        let link_text = element.text().collect::<String>().to_lowercase();
        let href_lower = href.to_lowercase();
        if RELATED_KEYWORDS
            .iter()
            .any(|k| link_text.contains(k) || href_lower.contains(k))
        {
            links.push(resolved);
        }

        // Limit to avoid too many requests
        if links.len() >= 3 {
            break;
        }
    }

    links
}
