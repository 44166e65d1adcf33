// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::domain::models::profile::{fields, CompanyProfile};

/// 由内容提取规则产生的候选值来源标识
pub const SOURCE_EXTRACTION: &str = "extraction";

/// 候选字段值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CandidateValue {
    Text(String),
    Integer(i64),
    Float(f64),
    List(Vec<String>),
}

impl CandidateValue {
    fn is_empty(&self) -> bool {
        match self {
            CandidateValue::Text(s) => s.trim().is_empty(),
            CandidateValue::Integer(_) | CandidateValue::Float(_) => false,
            CandidateValue::List(items) => items.iter().all(|i| i.trim().is_empty()),
        }
    }
}

/// 一个字段的一个候选值，带来源与置信度
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldCandidate {
    pub field_name: String,
    pub value: CandidateValue,
    /// `"extraction"` 或补全提供方名称
    pub source: String,
    /// [0,1] 区间，反映规则或提供方的可靠性
    pub confidence: f64,
}

impl FieldCandidate {
    pub fn text(field: &str, value: impl Into<String>, source: &str, confidence: f64) -> Self {
        Self {
            field_name: field.to_string(),
            value: CandidateValue::Text(value.into()),
            source: source.to_string(),
            confidence,
        }
    }

    pub fn integer(field: &str, value: i64, source: &str, confidence: f64) -> Self {
        Self {
            field_name: field.to_string(),
            value: CandidateValue::Integer(value),
            source: source.to_string(),
            confidence,
        }
    }

    pub fn float(field: &str, value: f64, source: &str, confidence: f64) -> Self {
        Self {
            field_name: field.to_string(),
            value: CandidateValue::Float(value),
            source: source.to_string(),
            confidence,
        }
    }

    pub fn list(field: &str, values: Vec<String>, source: &str, confidence: f64) -> Self {
        Self {
            field_name: field.to_string(),
            value: CandidateValue::List(values),
            source: source.to_string(),
            confidence,
        }
    }
}

/// 已填充字段的溯源记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    pub source: String,
    pub confidence: f64,
}

/// 列表字段的累积状态：保持插入顺序，大小写不敏感去重
#[derive(Debug, Clone, Default)]
struct ListAccumulator {
    items: Vec<String>,
    seen: HashSet<String>,
    winner: Option<Provenance>,
}

/// 候选值集合，实现字段级冲突裁决
///
/// 标量字段按“先到的最高置信度胜出”：仅当新候选置信度严格更高时才
/// 替换已有胜者，平局保留先到者。该规则同时覆盖补全阶段的约束——
/// 补全候选永远不会覆盖置信度不低于它的提取候选。
/// 列表字段取所有候选的并集。
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    scalars: HashMap<String, FieldCandidate>,
    lists: HashMap<String, ListAccumulator>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按裁决规则并入一个候选值，空值直接丢弃
    pub fn insert(&mut self, candidate: FieldCandidate) {
        if candidate.value.is_empty() {
            return;
        }

        if fields::is_list_field(&candidate.field_name) {
            self.insert_list(candidate);
            return;
        }

        match self.scalars.get(&candidate.field_name) {
            Some(existing) if existing.confidence >= candidate.confidence => {}
            _ => {
                self.scalars.insert(candidate.field_name.clone(), candidate);
            }
        }
    }

    pub fn extend(&mut self, candidates: impl IntoIterator<Item = FieldCandidate>) {
        for candidate in candidates {
            self.insert(candidate);
        }
    }

    fn insert_list(&mut self, candidate: FieldCandidate) {
        let items = match candidate.value {
            CandidateValue::List(items) => items,
            CandidateValue::Text(item) => vec![item],
            _ => return,
        };

        let acc = self.lists.entry(candidate.field_name).or_default();
        for item in items {
            let trimmed = item.trim();
            if trimmed.is_empty() {
                continue;
            }
            if acc.seen.insert(trimmed.to_lowercase()) {
                acc.items.push(trimmed.to_string());
            }
        }

        // 列表字段的溯源取置信度最高的贡献者，平局保留先到者
        let replace = acc
            .winner
            .as_ref()
            .map_or(true, |w| candidate.confidence > w.confidence);
        if replace {
            acc.winner = Some(Provenance {
                source: candidate.source,
                confidence: candidate.confidence,
            });
        }
    }

    /// 当前某字段的胜出候选
    pub fn winner(&self, field: &str) -> Option<&FieldCandidate> {
        self.scalars.get(field)
    }

    /// 裁决为公司画像与溯源映射
    pub fn resolve(&self) -> (CompanyProfile, HashMap<String, Provenance>) {
        let mut profile = CompanyProfile::default();
        let mut provenance = HashMap::new();

        for (field, candidate) in &self.scalars {
            if !apply_scalar(&mut profile, field, &candidate.value) {
                continue;
            }
            provenance.insert(
                field.clone(),
                Provenance {
                    source: candidate.source.clone(),
                    confidence: candidate.confidence,
                },
            );
        }

        for (field, acc) in &self.lists {
            if acc.items.is_empty() {
                continue;
            }
            match field.as_str() {
                fields::LOCATIONS => profile.locations = acc.items.clone(),
                fields::TECH_STACK => profile.tech_stack = acc.items.clone(),
                fields::BENEFITS => profile.benefits = acc.items.clone(),
                fields::CULTURE_KEYWORDS => profile.culture_keywords = acc.items.clone(),
                _ => continue,
            }
            if let Some(winner) = &acc.winner {
                provenance.insert(field.clone(), winner.clone());
            }
        }

        (profile, provenance)
    }
}

fn apply_scalar(profile: &mut CompanyProfile, field: &str, value: &CandidateValue) -> bool {
    let text = |v: &CandidateValue| match v {
        CandidateValue::Text(s) => Some(s.clone()),
        _ => None,
    };

    match field {
        fields::NAME => profile.name = text(value),
        fields::DESCRIPTION => profile.description = text(value),
        fields::INDUSTRY => profile.industry = text(value),
        fields::WEBSITE => profile.website = text(value),
        fields::EMPLOYEE_COUNT => {
            profile.employee_count = match value {
                CandidateValue::Integer(n) => Some(*n),
                _ => None,
            }
        }
        fields::EMPLOYEE_COUNT_RANGE => profile.employee_count_range = text(value),
        fields::FUNDING_STAGE => profile.funding_stage = text(value),
        fields::TOTAL_FUNDING => {
            profile.total_funding = match value {
                CandidateValue::Float(f) => Some(*f),
                CandidateValue::Integer(n) => Some(*n as f64),
                _ => None,
            }
        }
        fields::HEADQUARTERS => profile.headquarters = text(value),
        fields::LINKEDIN_URL => profile.linkedin_url = text(value),
        fields::TWITTER_URL => profile.twitter_url = text(value),
        fields::LOGO_URL => profile.logo_url = text(value),
        fields::FOUNDED_YEAR => {
            profile.founded_year = match value {
                CandidateValue::Integer(n) => i32::try_from(*n).ok(),
                _ => None,
            }
        }
        _ => return false,
    }
    profile.is_populated(field)
}
