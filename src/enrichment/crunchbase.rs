// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::domain::models::candidate::FieldCandidate;
use crate::domain::models::profile::{fields, CompanyProfile};
use crate::enrichment::provider::{EnrichmentProvider, ProviderError};

/// Crunchbase候选值的来源标签
pub const SOURCE_CRUNCHBASE: &str = "crunchbase";
/// Crunchbase数据的置信度
pub const CONFIDENCE_CRUNCHBASE: f64 = 0.7;

const DETAIL_FIELD_IDS: &str = "name,short_description,long_description,website,\
num_employees_enum,funding_stage,funding_total,founded_on,headquarters_location,\
categories,linkedin,twitter,logo_url";

/// Crunchbase组织库提供者
///
/// 两段式查询：先按公司名搜索组织拿uuid，再拉取组织详情。
/// base_url可配置，测试时指向本地mock服务。
pub struct CrunchbaseProvider {
    client: reqwest::Client,
    enabled: bool,
    api_key: String,
    base_url: String,
}

impl CrunchbaseProvider {
    pub fn new(
        enabled: bool,
        api_key: String,
        base_url: String,
        request_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            enabled,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn search_company(&self, name: &str) -> Result<String, ProviderError> {
        let body = json!({
            "field_ids": ["identifier", "name", "short_description", "website", "uuid"],
            "query": name,
        });
        let response = self
            .client
            .post(format!("{}/searches/organizations", self.base_url))
            .header("X-cb-user-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Request(format!(
                "search returned status {}",
                response.status()
            )));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        data.get("entities")
            .and_then(Value::as_array)
            .and_then(|entities| entities.first())
            .and_then(|entity| entity.get("properties"))
            .and_then(|props| props.get("uuid"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ProviderError::NotFound)
    }

    async fn fetch_details(&self, uuid: &str) -> Result<Value, ProviderError> {
        let response = self
            .client
            .get(format!("{}/entities/organizations/{}", self.base_url, uuid))
            .header("X-cb-user-key", &self.api_key)
            .query(&[("field_ids", DETAIL_FIELD_IDS)])
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Request(format!(
                "details returned status {}",
                response.status()
            )));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        Ok(data.get("properties").cloned().unwrap_or(Value::Null))
    }

    fn map_properties(properties: &Value) -> Vec<FieldCandidate> {
        fn text(field: &str, value: Option<&str>, out: &mut Vec<FieldCandidate>) {
            if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
                out.push(FieldCandidate::text(
                    field,
                    v,
                    SOURCE_CRUNCHBASE,
                    CONFIDENCE_CRUNCHBASE,
                ));
            }
        }

        let mut out = Vec::new();
        let str_prop = |key: &str| properties.get(key).and_then(Value::as_str);

        text(fields::NAME, str_prop("name"), &mut out);
        text(
            fields::DESCRIPTION,
            str_prop("short_description").or_else(|| str_prop("long_description")),
            &mut out,
        );
        text(fields::WEBSITE, str_prop("website"), &mut out);
        text(
            fields::EMPLOYEE_COUNT_RANGE,
            str_prop("num_employees_enum"),
            &mut out,
        );
        text(fields::FUNDING_STAGE, str_prop("funding_stage"), &mut out);
        text(fields::LOGO_URL, str_prop("logo_url"), &mut out);

        if let Some(usd) = properties
            .get("funding_total")
            .and_then(|t| t.get("value_usd"))
            .and_then(Value::as_f64)
        {
            out.push(FieldCandidate::float(
                fields::TOTAL_FUNDING,
                usd / 1_000_000.0,
                SOURCE_CRUNCHBASE,
                CONFIDENCE_CRUNCHBASE,
            ));
        }

        if let Some(date) = properties
            .get("founded_on")
            .and_then(|f| f.get("value"))
            .and_then(Value::as_str)
        {
            if let Ok(year) = date.chars().take(4).collect::<String>().parse::<i64>() {
                out.push(FieldCandidate::integer(
                    fields::FOUNDED_YEAR,
                    year,
                    SOURCE_CRUNCHBASE,
                    CONFIDENCE_CRUNCHBASE,
                ));
            }
        }

        text(
            fields::HEADQUARTERS,
            properties
                .get("headquarters_location")
                .and_then(|h| h.get("value"))
                .and_then(Value::as_str),
            &mut out,
        );

        text(
            fields::INDUSTRY,
            properties
                .get("categories")
                .and_then(Value::as_array)
                .and_then(|c| c.first())
                .and_then(|c| c.get("value"))
                .and_then(Value::as_str),
            &mut out,
        );

        text(
            fields::LINKEDIN_URL,
            properties
                .get("linkedin")
                .and_then(|l| l.get("value"))
                .and_then(Value::as_str),
            &mut out,
        );

        if let Some(handle) = properties
            .get("twitter")
            .and_then(|t| t.get("value"))
            .and_then(Value::as_str)
        {
            text(
                fields::TWITTER_URL,
                Some(&format!("https://twitter.com/{}", handle)),
                &mut out,
            );
        }

        out
    }
}

#[async_trait]
impl EnrichmentProvider for CrunchbaseProvider {
    fn name(&self) -> &'static str {
        SOURCE_CRUNCHBASE
    }

    fn enabled(&self) -> bool {
        self.enabled && !self.api_key.is_empty()
    }

    fn can_enrich(&self, profile: &CompanyProfile) -> bool {
        profile.name.is_some() || profile.website.is_some()
    }

    async fn enrich(&self, profile: &CompanyProfile) -> Result<Vec<FieldCandidate>, ProviderError> {
        let query = profile
            .name
            .as_deref()
            .or(profile.website.as_deref())
            .unwrap_or_default();

        let uuid = self.search_company(query).await.map_err(|e| {
            warn!(error = %e, "Crunchbase search failed");
            e
        })?;
        debug!(uuid = %uuid, "Crunchbase organization matched");

        let properties = self.fetch_details(&uuid).await?;
        Ok(Self::map_properties(&properties))
    }
}
