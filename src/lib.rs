// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含分析编排器与管道调度逻辑
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 爬虫模块
///
/// 实现带robots策略与礼貌间隔的页面抓取
pub mod crawler;

/// 领域模块
///
/// 包含公司画像模型、候选值合并与提取/评分/报告服务
pub mod domain;

/// 扩充模块
///
/// 外部数据源提供者及其并发调度
pub mod enrichment;

/// 基础设施模块
///
/// 提供结果缓存等进程内基础设施
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由、处理器和错误映射
pub mod presentation;

/// 工具模块
///
/// 提供错误类型、URL处理与遥测等通用功能
pub mod utils;
