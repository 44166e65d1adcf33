// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

/// 应用程序配置设置
///
/// 包含服务器、爬虫、管道、补全与评分等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 爬虫配置
    pub crawler: CrawlerSettings,
    /// 管道配置
    pub pipeline: PipelineSettings,
    /// 补全提供方配置
    pub enrichment: EnrichmentSettings,
    /// 评分权重覆盖（可选，缺省使用内置权重表）
    #[serde(default)]
    pub scoring: ScoringSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 爬虫配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerSettings {
    /// 单次HTTP请求超时（秒）
    pub request_timeout_secs: u64,
    /// 同一主机两次请求间的最小间隔（秒，robots crawl-delay 更大时取后者）
    pub crawl_delay_secs: f64,
    /// 全局并发抓取槽位数
    pub max_concurrent_requests: usize,
    /// 重定向跳数上限
    pub max_redirects: usize,
    /// 单次分析抓取的页面数上限（含主页面）
    pub max_pages: usize,
    /// 是否遵循robots.txt
    pub respect_robots_txt: bool,
    /// robots.txt缓存TTL（秒）
    pub robots_ttl_secs: u64,
    /// robots.txt获取失败后的宽松策略TTL（秒），较短以便尽快重试
    pub robots_failure_ttl_secs: u64,
    /// 请求使用的User-Agent
    pub user_agent: String,
}

/// 管道配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    /// 整条管道的超时（秒），超时后取消未完成的抓取与补全调用
    pub timeout_secs: u64,
    /// 分析结果缓存TTL（秒）
    pub cache_ttl_secs: u64,
}

/// 补全提供方配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentSettings {
    /// 每个提供方的独立超时（秒）
    pub provider_timeout_secs: u64,
    /// 是否启用Crunchbase提供方
    pub enable_crunchbase: bool,
    /// Crunchbase API密钥
    pub crunchbase_api_key: String,
    /// Crunchbase API基址（测试时可指向本地桩服务）
    pub crunchbase_base_url: String,
    /// 是否启用LinkedIn提供方
    pub enable_linkedin: bool,
    /// LinkedIn API密钥
    pub linkedin_api_key: String,
}

/// 评分配置设置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    /// 字段权重覆盖表，键为画像字段名
    #[serde(default)]
    pub weights: HashMap<String, f64>,
}

impl Settings {
    /// 从配置文件与环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Default crawler settings
            .set_default("crawler.request_timeout_secs", 30)?
            .set_default("crawler.crawl_delay_secs", 1.0)?
            .set_default("crawler.max_concurrent_requests", 10)?
            .set_default("crawler.max_redirects", 5)?
            .set_default("crawler.max_pages", 3)?
            .set_default("crawler.respect_robots_txt", true)?
            .set_default("crawler.robots_ttl_secs", 86400)?
            .set_default("crawler.robots_failure_ttl_secs", 300)?
            .set_default(
                "crawler.user_agent",
                "Mozilla/5.0 (compatible; profilrs/1.0; +http://profilrs.dev)",
            )?
            // Default pipeline settings
            .set_default("pipeline.timeout_secs", 120)?
            .set_default("pipeline.cache_ttl_secs", 3600)?
            // Default enrichment settings
            .set_default("enrichment.provider_timeout_secs", 30)?
            .set_default("enrichment.enable_crunchbase", false)?
            .set_default("enrichment.crunchbase_api_key", "")?
            .set_default(
                "enrichment.crunchbase_base_url",
                "https://api.crunchbase.com/api/v4",
            )?
            .set_default("enrichment.enable_linkedin", false)?
            .set_default("enrichment.linkedin_api_key", "")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("PROFILRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
