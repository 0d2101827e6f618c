// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{
    Transport, TransportConfig, TransportError, TransportFactory, TransportResponse,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 预设的模拟响应
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// 返回指定状态码和正文
    Status {
        /// HTTP状态码
        status: u16,
        /// 响应正文
        body: String,
    },
    /// 模拟连接错误
    ConnectionError(String),
}

impl MockResponse {
    /// 200 响应
    pub fn ok(body: impl Into<String>) -> Self {
        MockResponse::Status {
            status: 200,
            body: body.into(),
        }
    }

    /// 指定状态码的响应
    pub fn status(status: u16) -> Self {
        MockResponse::Status {
            status,
            body: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct MockRoute {
    response: MockResponse,
    latency: Duration,
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<String, MockRoute>>,
    fallback: Mutex<Option<MockRoute>>,
    calls: Mutex<Vec<String>>,
    configs: Mutex<Vec<TransportConfig>>,
    create_error: Mutex<Option<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    completed: AtomicUsize,
    bodies_read: AtomicUsize,
}

/// 模拟传输层工厂
///
/// 不发出真实的HTTP请求。响应按请求路径（`?` 之前的部分）配置，
/// 同时记录所有调用以及同时进行中的请求数峰值，用于测试并发上限。
///
/// # Example
/// ```ignore
/// let factory = MockTransportFactory::new();
/// factory.add_response("asce7-16.json", MockResponse::ok("{}"));
/// factory.add_delayed_response("ibc-2012.json", MockResponse::status(500), Duration::from_millis(50));
/// ```
#[derive(Clone, Default)]
pub struct MockTransportFactory {
    state: Arc<MockState>,
}

impl MockTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为指定路径设置立即返回的响应
    pub fn add_response(&self, path: &str, response: MockResponse) {
        self.add_delayed_response(path, response, Duration::ZERO);
    }

    /// 为指定路径设置延迟返回的响应
    pub fn add_delayed_response(&self, path: &str, response: MockResponse, latency: Duration) {
        self.state
            .routes
            .lock()
            .insert(path.to_string(), MockRoute { response, latency });
    }

    /// 设置未匹配路径时使用的响应
    pub fn set_fallback(&self, response: MockResponse, latency: Duration) {
        *self.state.fallback.lock() = Some(MockRoute { response, latency });
    }

    /// 让 `create` 返回错误
    pub fn fail_create(&self, message: &str) {
        *self.state.create_error.lock() = Some(message.to_string());
    }

    /// 所有已发出请求的相对URI
    pub fn calls(&self) -> Vec<String> {
        self.state.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.calls.lock().len()
    }

    /// 每次 `create` 收到的配置
    pub fn configs(&self) -> Vec<TransportConfig> {
        self.state.configs.lock().clone()
    }

    /// 当前进行中的请求数，包括尚未读取或丢弃的响应
    pub fn in_flight_count(&self) -> usize {
        self.state.in_flight.load(Ordering::SeqCst)
    }

    /// 同时进行中的请求数峰值
    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }

    /// 已返回（成功或失败）的请求数
    pub fn completed_count(&self) -> usize {
        self.state.completed.load(Ordering::SeqCst)
    }

    /// 被读取过正文的响应数
    pub fn bodies_read(&self) -> usize {
        self.state.bodies_read.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportFactory for MockTransportFactory {
    type Transport = MockTransport;

    async fn create(&self, config: &TransportConfig) -> Result<MockTransport, TransportError> {
        if let Some(message) = self.state.create_error.lock().clone() {
            return Err(TransportError::Other(message));
        }
        self.state.configs.lock().push(config.clone());
        Ok(MockTransport {
            state: self.state.clone(),
        })
    }
}

/// 模拟传输层
pub struct MockTransport {
    state: Arc<MockState>,
}

/// 析构时减少进行中的请求计数，请求被取消时同样生效
///
/// 成功返回时随响应一起转移，响应被读取或丢弃之前连接仍算作占用
struct InFlightGuard {
    state: Arc<MockState>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for MockTransport {
    type Response = MockTransportResponse;

    async fn get(&self, relative_uri: &str) -> Result<MockTransportResponse, TransportError> {
        let current = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let guard = InFlightGuard {
            state: self.state.clone(),
        };

        self.state.calls.lock().push(relative_uri.to_string());

        let path = relative_uri.split('?').next().unwrap_or_default();
        let route = self
            .state
            .routes
            .lock()
            .get(path)
            .cloned()
            .or_else(|| self.state.fallback.lock().clone());

        let Some(route) = route else {
            self.state.completed.fetch_add(1, Ordering::SeqCst);
            return Err(TransportError::Other(format!(
                "No mock response configured for {}",
                path
            )));
        };

        if !route.latency.is_zero() {
            tokio::time::sleep(route.latency).await;
        }
        self.state.completed.fetch_add(1, Ordering::SeqCst);

        match route.response {
            MockResponse::Status { status, body } => Ok(MockTransportResponse {
                status,
                body,
                state: self.state.clone(),
                _guard: guard,
            }),
            MockResponse::ConnectionError(message) => Err(TransportError::Other(message)),
        }
    }
}

/// 模拟响应
pub struct MockTransportResponse {
    status: u16,
    body: String,
    state: Arc<MockState>,
    _guard: InFlightGuard,
}

#[async_trait]
impl TransportResponse for MockTransportResponse {
    fn status(&self) -> u16 {
        self.status
    }

    async fn text(self) -> Result<String, TransportError> {
        self.state.bodies_read.fetch_add(1, Ordering::SeqCst);
        Ok(self.body)
    }
}
