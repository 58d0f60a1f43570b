// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用层模块
///
/// - 数据传输对象（dto）：请求解析和响应格式
/// - 用例（usecases）：解析目标、获取页面、提取、组装结果
pub mod dto;
pub mod usecases;
