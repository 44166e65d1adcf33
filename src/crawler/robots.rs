// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use dashmap::DashMap;
use reqwest::Client;
use robotstxt::DefaultMatcher;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::utils::url_utils::host_key;

/// 单个主机的robots策略
///
/// 刷新时整体替换，并发抓取只读共享
#[derive(Debug)]
pub struct RobotsPolicy {
    /// robots.txt原文，匹配时按最长规则语义求值
    content: String,
    /// Crawl-delay指令值
    pub crawl_delay: Option<Duration>,
    fetched_at: Instant,
    ttl: Duration,
}

impl RobotsPolicy {
    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < self.ttl
    }

    /// URL是否允许抓取
    ///
    /// 委托robotstxt的匹配器：最具体（最长）的allow/disallow规则胜出，
    /// 平局偏向allow
    pub fn is_allowed(&self, url: &Url, user_agent: &str) -> bool {
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url.as_str())
    }
}

/// 进程级robots策略缓存，按主机分组
///
/// 条目在TTL过期后读取时惰性淘汰；获取失败时合成宽松空策略并用
/// 较短的TTL缓存，使重试更快发生
pub struct RobotsPolicyCache {
    client: Client,
    policies: DashMap<String, Arc<RobotsPolicy>>,
    policy_ttl: Duration,
    failure_ttl: Duration,
    user_agent: String,
}

impl RobotsPolicyCache {
    pub fn new(policy_ttl: Duration, failure_ttl: Duration, user_agent: String) -> Self {
        Self {
            client: Client::new(),
            policies: DashMap::new(),
            policy_ttl,
            failure_ttl,
            user_agent,
        }
    }

    /// 获取某主机的策略，必要时抓取robots.txt
    pub async fn get_policy(&self, url: &Url) -> Arc<RobotsPolicy> {
        let host = host_key(url);

        if let Some(cached) = self.policies.get(&host) {
            if cached.is_fresh() {
                return cached.clone();
            }
        }
        // Expired entries are evicted lazily, never proactively
        self.policies.remove(&host);

        let policy = Arc::new(self.fetch_policy(url, &host).await);
        self.policies.insert(host, policy.clone());
        policy
    }

    async fn fetch_policy(&self, url: &Url, host: &str) -> RobotsPolicy {
        let robots_url = format!("{}://{}/robots.txt", url.scheme(), host);
        debug!("Fetching robots.txt from {}", robots_url);

        let response = self
            .client
            .get(&robots_url)
            .header("User-Agent", &self.user_agent)
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        let (content, ttl) = match response {
            Ok(resp) if resp.status().is_success() => {
                (resp.text().await.unwrap_or_default(), self.policy_ttl)
            }
            // 404 is a valid answer: the host has no robots.txt
            Ok(resp) if resp.status() == reqwest::StatusCode::NOT_FOUND => {
                (String::new(), self.policy_ttl)
            }
            Ok(resp) => {
                warn!(
                    "Unexpected status {} for {}, treating as allow-all",
                    resp.status(),
                    robots_url
                );
                (String::new(), self.failure_ttl)
            }
            Err(e) => {
                warn!("Failed to fetch robots.txt from {}: {}", robots_url, e);
                (String::new(), self.failure_ttl)
            }
        };

        let crawl_delay = parse_crawl_delay(&content, &self.user_agent);

        RobotsPolicy {
            content,
            crawl_delay,
            fetched_at: Instant::now(),
            ttl,
        }
    }
}

/// 解析适用于该User-Agent的Crawl-delay指令
///
/// 简化实现：定位匹配的User-agent块，块内取Crawl-delay；
/// 具体agent块优先于通配块
fn parse_crawl_delay(content: &str, user_agent: &str) -> Option<Duration> {
    let mut current_agent_matched = false;
    let mut specific_agent_found = false;
    let mut delay: Option<f64> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let lower_line = line.to_lowercase();
        if let Some(agent) = lower_line.strip_prefix("user-agent:") {
            let agent = agent.trim();
            if agent == "*" {
                current_agent_matched = !specific_agent_found;
            } else if user_agent.to_lowercase().contains(agent) {
                current_agent_matched = true;
                specific_agent_found = true;
                // Reset delay if we found a more specific agent
                delay = None;
            } else {
                current_agent_matched = false;
            }
        } else if current_agent_matched {
            if let Some(value) = lower_line.strip_prefix("crawl-delay:") {
                if let Ok(d) = value.trim().parse::<f64>() {
                    delay = Some(d);
                }
            }
        }
    }

    delay.map(Duration::from_secs_f64)
}
