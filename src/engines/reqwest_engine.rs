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

use crate::engines::traits::{
    Transport, TransportConfig, TransportError, TransportFactory, TransportResponse,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONNECTION};
use tracing::{debug, warn};
use url::Url;

/// 基于reqwest的传输层工厂
///
/// 每次调用 `create` 都会构建一个新的客户端及其连接池
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransportFactory;

impl ReqwestTransportFactory {
    pub fn new() -> Self {
        Self
    }
}

/// 解析服务地址中的主机名
///
/// 在发出任何请求之前检查主机是否可以解析
///
/// # 参数
///
/// * `base_url` - 服务地址
///
/// # 返回值
///
/// * `Ok(())` - 至少解析到一个地址
/// * `Err(TransportError)` - 主机缺失或无法解析
async fn resolve_host(base_url: &Url) -> Result<(), TransportError> {
    let host = base_url
        .host_str()
        .ok_or_else(|| TransportError::InvalidUrl(format!("{} has no host", base_url)))?;
    let port = base_url
        .port_or_known_default()
        .ok_or_else(|| TransportError::InvalidUrl(format!("{} has no port", base_url)))?;

    let mut addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| TransportError::Resolve {
            host: host.to_string(),
            reason: e.to_string(),
        })?;

    if addrs.next().is_none() {
        return Err(TransportError::Resolve {
            host: host.to_string(),
            reason: "no addresses found".to_string(),
        });
    }

    Ok(())
}

fn header_value(value: &str) -> Result<HeaderValue, TransportError> {
    HeaderValue::from_str(value)
        .map_err(|e| TransportError::Other(format!("Invalid header value '{}': {}", value, e)))
}

#[async_trait]
impl TransportFactory for ReqwestTransportFactory {
    type Transport = ReqwestTransport;

    async fn create(&self, config: &TransportConfig) -> Result<ReqwestTransport, TransportError> {
        resolve_host(&config.base_url).await?;

        // Build headers
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value(&config.accept)?);
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(
            HeaderName::from_static("keep-alive"),
            header_value(&config.keep_alive)?,
        );

        // The timeout covers the whole batch, not a single request
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.max_connections_per_host)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        debug!(
            base_url = %config.base_url,
            timeout_secs = config.timeout.as_secs(),
            max_connections = config.max_connections_per_host,
            "Created reqwest transport"
        );

        Ok(ReqwestTransport {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

/// 基于reqwest的传输层
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
}

#[async_trait]
impl Transport for ReqwestTransport {
    type Response = ReqwestResponse;

    async fn get(&self, relative_uri: &str) -> Result<ReqwestResponse, TransportError> {
        let url = self
            .base_url
            .join(relative_uri)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", relative_uri, e)))?;

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "HTTP request failed");
            e
        })?;

        debug!(url = %url, status = response.status().as_u16(), "HTTP request settled");
        Ok(ReqwestResponse(response))
    }
}

/// reqwest响应的包装
pub struct ReqwestResponse(reqwest::Response);

#[async_trait]
impl TransportResponse for ReqwestResponse {
    fn status(&self) -> u16 {
        self.0.status().as_u16()
    }

    fn is_success(&self) -> bool {
        self.0.status().is_success()
    }

    async fn text(self) -> Result<String, TransportError> {
        Ok(self.0.text().await?)
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
