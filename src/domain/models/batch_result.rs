// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;

/// 成功的响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessResponse {
    /// 对应请求在输入列表中的下标
    pub index: usize,
    /// HTTP状态码
    pub status: u16,
    /// 响应正文
    pub body: String,
}

/// 失败的响应
///
/// 只保留状态和错误信息，不读取响应正文
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedResponse {
    /// 对应请求在输入列表中的下标
    pub index: usize,
    /// 相对请求URI
    pub uri: String,
    /// HTTP状态码，连接错误时为空
    pub status: Option<u16>,
    /// 错误描述
    pub error: String,
}

/// 单个请求的最终结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeRecord {
    /// 成功
    Success(SuccessResponse),
    /// 失败
    Failure(FailedResponse),
}

impl OutcomeRecord {
    /// 对应请求在输入列表中的下标
    pub fn index(&self) -> usize {
        match self {
            OutcomeRecord::Success(s) => s.index,
            OutcomeRecord::Failure(f) => f.index,
        }
    }

    /// 是否成功
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeRecord::Success(_))
    }
}

/// 批量请求结果
///
/// 所有请求结束后一次性构造，之后不再修改。成功列表按完成顺序排列，
/// 与输入顺序无关；需要关联时使用 `index`。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    successes: Vec<SuccessResponse>,
    failures: Vec<FailedResponse>,
}

impl BatchResult {
    /// 创建批量请求结果
    pub fn new(successes: Vec<SuccessResponse>, failures: Vec<FailedResponse>) -> Self {
        Self {
            successes,
            failures,
        }
    }

    /// 由单个请求结果构造
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = OutcomeRecord>) -> Self {
        let mut successes = Vec::new();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                OutcomeRecord::Success(s) => successes.push(s),
                OutcomeRecord::Failure(f) => failures.push(f),
            }
        }
        Self::new(successes, failures)
    }

    pub fn successes(&self) -> &[SuccessResponse] {
        &self.successes
    }

    pub fn failures(&self) -> &[FailedResponse] {
        &self.failures
    }

    /// 成功响应的正文
    pub fn success_messages(&self) -> impl Iterator<Item = &str> {
        self.successes.iter().map(|s| s.body.as_str())
    }

    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// 请求总数，等于成功数与失败数之和
    pub fn total_count(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_count() == 0
    }

    /// 拆分为成功和失败列表
    pub fn into_parts(self) -> (Vec<SuccessResponse>, Vec<FailedResponse>) {
        (self.successes, self.failures)
    }
}
