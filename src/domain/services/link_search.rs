// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::streaming_result::StreamingServer;

/// 查找嵌入链接的状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    /// 第 `attempt` 次查询页面
    Searching { attempt: u32 },
    /// 第 `attempt` 次查询未找到，需要点击播放按钮后再试
    Interact { attempt: u32 },
    /// 找到链接
    Done {
        attempt: u32,
        servers: Vec<StreamingServer>,
    },
    /// 尝试次数用尽，正常的失败结果
    Exhausted { attempts: u32 },
}

/// 有限次数的链接查找
///
/// `Searching → Done`（找到）
/// `Searching → Interact → Searching`（未找到且还有次数）
/// `Searching → Exhausted`（次数用尽）
#[derive(Debug, Clone)]
pub struct LinkSearch {
    max_attempts: u32,
    state: SearchState,
}

impl LinkSearch {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            state: SearchState::Searching { attempt: 1 },
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 记录一次查询的结果
    pub fn record(&mut self, servers: Vec<StreamingServer>) {
        let SearchState::Searching { attempt } = self.state else {
            return;
        };
        self.state = if !servers.is_empty() {
            SearchState::Done { attempt, servers }
        } else if attempt < self.max_attempts {
            SearchState::Interact { attempt }
        } else {
            SearchState::Exhausted { attempts: attempt }
        };
    }

    /// 交互完成，进入下一次查询
    pub fn interacted(&mut self) {
        if let SearchState::Interact { attempt } = self.state {
            self.state = SearchState::Searching {
                attempt: attempt + 1,
            };
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            SearchState::Done { .. } | SearchState::Exhausted { .. }
        )
    }

    /// 结束后取出找到的链接
    pub fn into_servers(self) -> Option<Vec<StreamingServer>> {
        match self.state {
            SearchState::Done { servers, .. } => Some(servers),
            _ => None,
        }
    }
}
