// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 请求/响应数据传输对象和剧集抓取用例
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 抓取目标、结果模型以及图片和链接的提取规则
pub mod domain;

/// 引擎模块
///
/// 文档抽象、静态抓取引擎和无头浏览器引擎
pub mod engines;

/// 基础设施模块
///
/// 指标记录器
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由、处理器和中间件
pub mod presentation;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;
