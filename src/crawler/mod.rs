// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 爬虫模块
///
/// 在全局并发与按主机礼貌间隔的约束下抓取页面
pub mod fetcher;
pub mod politeness;
pub mod robots;

pub use fetcher::{CrawlError, CrawlResult, Crawler};
pub use robots::{RobotsPolicy, RobotsPolicyCache};
