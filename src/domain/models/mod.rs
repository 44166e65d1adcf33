// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 候选值与冲突裁决
pub mod candidate;
/// 分析产物
pub mod outcome;
/// 请求与公司画像
pub mod profile;
