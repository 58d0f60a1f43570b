// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 提取服务（extraction_service）：海报图片和嵌入链接的提取规则
/// - 链接查找（link_search）：带交互重试的有限次数查找状态机
/// - 元数据服务（metadata_service）：番剧名和集数推导
pub mod extraction_service;
pub mod link_search;
pub mod metadata_service;
