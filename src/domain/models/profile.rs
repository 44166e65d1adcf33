// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 分析请求
///
/// 接收后不可变
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// 待分析的职位或公司页面URL
    pub url: String,
    /// 是否调用外部数据源进行补全
    #[serde(default = "default_true")]
    pub include_enrichment: bool,
    /// 忽略缓存强制重新分析
    #[serde(default)]
    pub force_refresh: bool,
}

fn default_true() -> bool {
    true
}

/// 公司画像
///
/// 每个已填充字段都恰好对应一个胜出的候选值，其来源与置信度
/// 记录在 outcome 的 provenance 中
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyProfile {
    // Basic information
    pub name: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,

    // Size and funding
    pub employee_count: Option<i64>,
    pub employee_count_range: Option<String>,
    pub funding_stage: Option<String>,
    /// 融资总额，单位：百万美元
    pub total_funding: Option<f64>,

    // Location
    pub headquarters: Option<String>,
    #[serde(default)]
    pub locations: Vec<String>,

    // Technology and culture
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub culture_keywords: Vec<String>,

    // Social and metadata
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub logo_url: Option<String>,
    pub founded_year: Option<i32>,
}

/// 画像字段名常量，候选值与评分服务共用
pub mod fields {
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const INDUSTRY: &str = "industry";
    pub const WEBSITE: &str = "website";
    pub const EMPLOYEE_COUNT: &str = "employee_count";
    pub const EMPLOYEE_COUNT_RANGE: &str = "employee_count_range";
    pub const FUNDING_STAGE: &str = "funding_stage";
    pub const TOTAL_FUNDING: &str = "total_funding";
    pub const HEADQUARTERS: &str = "headquarters";
    pub const LOCATIONS: &str = "locations";
    pub const TECH_STACK: &str = "tech_stack";
    pub const BENEFITS: &str = "benefits";
    pub const CULTURE_KEYWORDS: &str = "culture_keywords";
    pub const LINKEDIN_URL: &str = "linkedin_url";
    pub const TWITTER_URL: &str = "twitter_url";
    pub const LOGO_URL: &str = "logo_url";
    pub const FOUNDED_YEAR: &str = "founded_year";

    /// 取并集而非择优的列表型字段
    pub const LIST_FIELDS: [&str; 4] = [LOCATIONS, TECH_STACK, BENEFITS, CULTURE_KEYWORDS];

    pub fn is_list_field(name: &str) -> bool {
        LIST_FIELDS.contains(&name)
    }
}

impl CompanyProfile {
    /// 字段是否已填充（非空、非空串、非空列表）
    pub fn is_populated(&self, field: &str) -> bool {
        match field {
            fields::NAME => matches_text(&self.name),
            fields::DESCRIPTION => matches_text(&self.description),
            fields::INDUSTRY => matches_text(&self.industry),
            fields::WEBSITE => matches_text(&self.website),
            fields::EMPLOYEE_COUNT => self.employee_count.is_some_and(|n| n > 0),
            fields::EMPLOYEE_COUNT_RANGE => matches_text(&self.employee_count_range),
            fields::FUNDING_STAGE => matches_text(&self.funding_stage),
            fields::TOTAL_FUNDING => self.total_funding.is_some_and(|f| f > 0.0),
            fields::HEADQUARTERS => matches_text(&self.headquarters),
            fields::LOCATIONS => !self.locations.is_empty(),
            fields::TECH_STACK => !self.tech_stack.is_empty(),
            fields::BENEFITS => !self.benefits.is_empty(),
            fields::CULTURE_KEYWORDS => !self.culture_keywords.is_empty(),
            fields::LINKEDIN_URL => matches_text(&self.linkedin_url),
            fields::TWITTER_URL => matches_text(&self.twitter_url),
            fields::LOGO_URL => matches_text(&self.logo_url),
            fields::FOUNDED_YEAR => self.founded_year.is_some(),
            _ => false,
        }
    }
}

fn matches_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}
