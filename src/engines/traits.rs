// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// 客户端标识，`<名称>/<版本>`
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// 请求的内容类型
pub const ACCEPT_CONTENT_TYPE: &str = "application/json";

/// Keep-Alive 提示值
pub const KEEP_ALIVE_HINT: &str = "1000";

/// 传输层错误类型
#[derive(Error, Debug)]
pub enum TransportError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 主机无法解析
    #[error("Failed to resolve host {host}: {reason}")]
    Resolve {
        /// 主机名
        host: String,
        /// 原因
        reason: String,
    },
    /// 无效的URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl TransportError {
    /// 判断错误是否发生在连接阶段
    pub fn is_connect(&self) -> bool {
        match self {
            TransportError::RequestFailed(e) => e.is_connect(),
            TransportError::Resolve { .. } => true,
            _ => false,
        }
    }

    /// 判断错误是否为超时
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::RequestFailed(e) => e.is_timeout(),
            TransportError::Timeout => true,
            _ => false,
        }
    }
}

/// 传输层配置
///
/// 每次批量请求创建一个传输实例，配置在实例生命周期内不变
#[derive(Debug, Clone, PartialEq)]
pub struct TransportConfig {
    /// 服务地址，以 `/` 结尾
    pub base_url: Url,
    /// 整个批次的超时时间（不是单个请求）
    pub timeout: Duration,
    /// 每个主机同时打开的最大连接数
    pub max_connections_per_host: usize,
    /// 客户端标识
    pub user_agent: String,
    /// Accept 请求头
    pub accept: String,
    /// Keep-Alive 请求头
    pub keep_alive: String,
}

impl TransportConfig {
    /// 使用默认请求头创建配置
    ///
    /// # 参数
    ///
    /// * `base_url` - 服务地址
    /// * `timeout` - 整个批次的超时时间
    /// * `max_connections_per_host` - 每个主机的最大连接数
    pub fn new(base_url: Url, timeout: Duration, max_connections_per_host: usize) -> Self {
        Self {
            base_url,
            timeout,
            max_connections_per_host,
            user_agent: USER_AGENT.to_string(),
            accept: ACCEPT_CONTENT_TYPE.to_string(),
            keep_alive: KEEP_ALIVE_HINT.to_string(),
        }
    }
}

/// 已返回状态的响应
#[async_trait]
pub trait TransportResponse: Send + 'static {
    /// HTTP状态码
    fn status(&self) -> u16;

    /// 状态码是否在 2xx 范围内
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status())
    }

    /// 读取完整的响应正文
    async fn text(self) -> Result<String, TransportError>;
}

/// 传输层特质
///
/// 一个实例在一次批量请求内被所有并发请求共享
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// 响应类型
    type Response: TransportResponse;

    /// 发送GET请求
    ///
    /// # 参数
    ///
    /// * `relative_uri` - 相对于服务地址的URI
    ///
    /// # 返回值
    ///
    /// * `Ok(Self::Response)` - 任意状态码的响应
    /// * `Err(TransportError)` - 连接或协议错误
    async fn get(&self, relative_uri: &str) -> Result<Self::Response, TransportError>;
}

/// 传输层工厂
///
/// 由调用方注入，每次批量请求调用一次 `create`
#[async_trait]
pub trait TransportFactory: Send + Sync {
    /// 传输层类型
    type Transport: Transport;

    /// 创建新的传输实例
    ///
    /// 这里返回的错误属于基础设施错误，会中止整个批次
    async fn create(&self, config: &TransportConfig) -> Result<Self::Transport, TransportError>;
}
