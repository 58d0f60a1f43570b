// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 提取规则（extraction_profile）：选择器、黑白名单和阈值
/// - 抓取目标（extraction_target）：剧集地址或番剧名加集数
/// - 抓取结果（streaming_result）：成功结果、未找到报告和诊断信息
pub mod extraction_profile;
pub mod extraction_target;
pub mod streaming_result;
