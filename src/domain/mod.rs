// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：抓取目标、抓取结果、诊断信息和提取规则
/// - 服务（services）：图片与链接提取、元数据推导、链接查找状态机
///
/// 领域层不依赖任何网络或浏览器实现，只通过 `Document` 接口读取页面。
pub mod models;
pub mod services;
