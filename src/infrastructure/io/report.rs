// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::batch_result::{BatchResult, FailedResponse};
use crate::infrastructure::io::json_file::write_json;
use crate::infrastructure::io::{ensure_writable, FileType};
use crate::utils::errors::BatchError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// 批量请求报告
///
/// 成功响应的正文按原样保存为字符串，不做解析
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// 服务地址
    pub base_url: String,
    /// 发起请求的时间
    pub requested_at: DateTime<Utc>,
    /// 请求总数
    pub total_count: usize,
    /// 失败的请求数
    pub failed_count: usize,
    /// 成功响应的正文，按完成顺序排列
    pub responses: Vec<String>,
    /// 失败的请求
    pub failures: Vec<FailedResponse>,
}

impl BatchReport {
    /// 由批量请求结果生成报告
    pub fn new(base_url: impl Into<String>, requested_at: DateTime<Utc>, result: BatchResult) -> Self {
        let total_count = result.total_count();
        let (successes, failures) = result.into_parts();
        Self {
            base_url: base_url.into(),
            requested_at,
            total_count,
            failed_count: failures.len(),
            responses: successes.into_iter().map(|s| s.body).collect(),
            failures,
        }
    }

    /// 写入报告文件
    ///
    /// # 参数
    ///
    /// * `path` - 输出文件，类型由扩展名决定
    /// * `pretty` - 是否缩进
    /// * `force_overwrite` - 是否允许覆盖已存在的文件
    pub async fn write(
        &self,
        path: &Path,
        pretty: bool,
        force_overwrite: bool,
    ) -> Result<(), BatchError> {
        ensure_writable(path, force_overwrite)?;
        match FileType::from_path(path)? {
            FileType::Json => write_json(path, self, pretty).await,
        }
    }
}
