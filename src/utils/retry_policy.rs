// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

/// 重试策略配置
///
/// 线性退避：第 `attempt` 次尝试失败后等待 `base_delay + attempt * step`
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数（包含第一次）
    pub max_attempts: u32,
    /// 基础退避时间
    pub base_delay: Duration,
    /// 每次尝试增加的退避时间
    pub step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(3000),
            step: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, step: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            step,
        }
    }

    /// 计算第 `attempt` 次尝试之后的退避时间
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        self.base_delay + self.step * attempt
    }
}
