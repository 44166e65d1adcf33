// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::candidate::FieldCandidate;
use crate::domain::models::profile::CompanyProfile;

/// 扩充提供者错误
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("Provider request failed: {0}")]
    Request(String),

    #[error("Company not found")]
    NotFound,
}

/// 扩充数据提供者
///
/// 提供者只产出带来源与置信度的候选值，从不直接改写画像；
/// 合并交给候选集，与提取遵循同一套规则。
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    /// 提供者标识，也是候选值的来源标签
    fn name(&self) -> &'static str;

    /// 配置层开关
    fn enabled(&self) -> bool;

    /// 基础画像是否携带足以发起查询的锚点字段
    fn can_enrich(&self, profile: &CompanyProfile) -> bool;

    /// 查询外部数据源并返回候选字段
    async fn enrich(&self, profile: &CompanyProfile) -> Result<Vec<FieldCandidate>, ProviderError>;
}
