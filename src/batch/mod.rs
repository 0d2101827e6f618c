// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 批量请求客户端
pub mod client;
/// 结果划分
pub mod partition;
/// 进度报告
pub mod progress;

use crate::config::settings::ClientSettings;
use crate::domain::models::standard::DEFAULT_BASE_URL;
use std::time::Duration;

pub use client::BatchClient;
pub use progress::{NoProgress, ProgressBar, ProgressCallbacks, ProgressObserver};

/// 每个主机同时打开的最大连接数
///
/// 远程服务在超过该并发数时会开始拒绝请求，这是经验上限
pub const MAX_CONNECTIONS_PER_HOST: usize = 5;

/// 每个请求分摊的超时时间
pub const DEFAULT_TIMEOUT_PER_REQUEST: Duration = Duration::from_secs(5);

/// 进度采样间隔
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// 批次设置
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSettings {
    /// 调用方未指定时使用的服务地址
    pub default_base_url: String,
    /// 同时打开的最大请求数
    pub max_connections_per_host: usize,
    /// 每个请求分摊的超时时间
    pub timeout_per_request: Duration,
    /// 进度采样间隔
    pub progress_interval: Duration,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            default_base_url: DEFAULT_BASE_URL.to_string(),
            max_connections_per_host: MAX_CONNECTIONS_PER_HOST,
            timeout_per_request: DEFAULT_TIMEOUT_PER_REQUEST,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl From<&ClientSettings> for BatchSettings {
    fn from(settings: &ClientSettings) -> Self {
        Self {
            default_base_url: settings.base_url.clone(),
            max_connections_per_host: MAX_CONNECTIONS_PER_HOST,
            timeout_per_request: Duration::from_secs(settings.timeout_per_request_secs),
            progress_interval: Duration::from_millis(settings.progress_interval_ms),
        }
    }
}
