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

use crate::batch::partition::{partition, settle};
use crate::batch::progress::{CompletionCounter, MonitorExit, ProgressMonitor, ProgressObserver};
use crate::batch::BatchSettings;
use crate::domain::models::batch_result::{BatchResult, OutcomeRecord};
use crate::domain::models::request_parameters::RequestParameters;
use crate::engines::traits::{Transport, TransportConfig, TransportError, TransportFactory};
use crate::infrastructure::observability::metrics::{
    BATCH_CANCELLED_TOTAL, BATCH_DURATION_SECONDS, BATCH_REQUESTS_FAILED_TOTAL,
    BATCH_REQUESTS_TOTAL,
};
use crate::utils::errors::BatchError;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};
use url::Url;
use uuid::Uuid;

/// 批量请求客户端
///
/// 把一组请求参数并发发送到同一个服务地址，同时打开的请求数不超过
/// `BatchSettings::max_connections_per_host`。单个请求的失败记录在结果中，
/// 只有基础设施错误和取消会让整个批次失败。
pub struct BatchClient<F> {
    factory: F,
    settings: BatchSettings,
}

impl<F: TransportFactory> BatchClient<F> {
    /// 使用默认设置创建客户端
    pub fn new(factory: F) -> Self {
        Self::with_settings(factory, BatchSettings::default())
    }

    /// 使用指定设置创建客户端
    ///
    /// # 参数
    ///
    /// * `factory` - 传输层工厂，每个批次调用一次
    /// * `settings` - 批次设置
    pub fn with_settings(factory: F, settings: BatchSettings) -> Self {
        Self { factory, settings }
    }

    /// 解析服务地址
    ///
    /// 为空时使用默认地址；必须是绝对的 http/https 地址；结果以 `/` 结尾
    pub fn resolve_base_url(&self, base_url: &str) -> Result<Url, BatchError> {
        let raw = base_url.trim();
        let raw = if raw.is_empty() {
            self.settings.default_base_url.trim()
        } else {
            raw
        };

        let invalid = |reason: String| BatchError::InvalidBaseUrl {
            url: raw.to_string(),
            reason,
        };

        let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// 批次总超时时间，按请求数线性增长
    pub fn batch_timeout(&self, request_count: usize) -> Duration {
        let count = u32::try_from(request_count).unwrap_or(u32::MAX);
        self.settings.timeout_per_request.saturating_mul(count)
    }

    /// 执行一次批量请求
    ///
    /// 请求开始前报告 0.0，之后按采样间隔报告完成比例；批次结束时
    /// 调用一次 `on_finish`。返回前所有请求任务都已结束或被中止。
    ///
    /// # 参数
    ///
    /// * `params` - 请求参数
    /// * `base_url` - 服务地址，为空时使用默认地址
    /// * `cancel` - 取消令牌
    /// * `observer` - 进度观察者
    ///
    /// # 返回值
    ///
    /// * `Ok(BatchResult)` - 所有请求都已结束（可能部分失败）
    /// * `Err(BatchError::Cancelled)` - 批次被取消
    /// * `Err(BatchError)` - 服务地址无效或无法创建传输层
    pub async fn run_batch(
        &self,
        params: &[RequestParameters],
        base_url: &str,
        cancel: &CancellationToken,
        observer: &dyn ProgressObserver,
    ) -> Result<BatchResult, BatchError> {
        let span = tracing::info_span!(
            "batch",
            batch_id = %Uuid::new_v4(),
            requests = params.len()
        );
        self.run_batch_inner(params, base_url, cancel, observer)
            .instrument(span)
            .await
    }

    /// 执行一次不可取消的批量请求
    pub async fn run_batch_uncancellable(
        &self,
        params: &[RequestParameters],
        base_url: &str,
        observer: &dyn ProgressObserver,
    ) -> Result<BatchResult, BatchError> {
        self.run_batch(params, base_url, &CancellationToken::new(), observer)
            .await
    }

    async fn run_batch_inner(
        &self,
        params: &[RequestParameters],
        base_url: &str,
        cancel: &CancellationToken,
        observer: &dyn ProgressObserver,
    ) -> Result<BatchResult, BatchError> {
        let base_url = self.resolve_base_url(base_url)?;
        let total = params.len();
        let counter = CompletionCounter::new();
        let mut monitor = ProgressMonitor::new(
            counter.view(),
            total,
            self.settings.progress_interval,
            observer,
        );

        if total == 0 {
            debug!("Empty batch, nothing to send");
            monitor.begin();
            monitor.finish();
            return Ok(BatchResult::default());
        }

        if cancel.is_cancelled() {
            counter!(BATCH_CANCELLED_TOTAL).increment(1);
            return Err(BatchError::Cancelled);
        }

        let timeout = self.batch_timeout(total);
        let config = TransportConfig::new(
            base_url.clone(),
            timeout,
            self.settings.max_connections_per_host,
        );

        let transport = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                counter!(BATCH_CANCELLED_TOTAL).increment(1);
                return Err(BatchError::Cancelled);
            }
            created = self.factory.create(&config) => created.map_err(|source| {
                warn!(base_url = %base_url, error = %source, "Failed to create transport");
                BatchError::ServerRequest {
                    base_url: base_url.to_string(),
                    source,
                }
            })?,
        };

        info!(
            base_url = %base_url,
            requests = total,
            timeout_secs = timeout.as_secs(),
            "Starting batch"
        );
        let started = Instant::now();
        let deadline = started + timeout;
        counter!(BATCH_REQUESTS_TOTAL).increment(total as u64);

        monitor.begin();
        let (exit_tx, exit_rx) = oneshot::channel();
        let dispatch = async {
            let outcomes = self
                .dispatch(Arc::new(transport), params, deadline, &counter, cancel)
                .await;
            let exit = if outcomes.is_ok() {
                MonitorExit::Completed
            } else {
                MonitorExit::Aborted
            };
            let _ = exit_tx.send(exit);
            outcomes
        };
        let (outcomes, ()) = tokio::join!(dispatch, monitor.run(exit_rx));

        let result = outcomes.map(|outcomes| partition(outcomes, total));

        match &result {
            Ok(result) => {
                counter!(BATCH_REQUESTS_FAILED_TOTAL).increment(result.failed_count() as u64);
                histogram!(BATCH_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
                info!(
                    succeeded = result.success_count(),
                    failed = result.failed_count(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Batch completed"
                );
            }
            Err(BatchError::Cancelled) => {
                counter!(BATCH_CANCELLED_TOTAL).increment(1);
                warn!("Batch cancelled");
            }
            Err(e) => warn!(error = %e, "Batch failed"),
        }

        result
    }

    /// 并发发送所有请求，返回按完成顺序排列的结果
    ///
    /// 许可从发送请求一直持有到响应被归类：成功响应的正文读完之后、
    /// 失败响应被丢弃之后才释放，因此同时占用的连接数不超过上限。
    async fn dispatch<T: Transport>(
        &self,
        transport: Arc<T>,
        params: &[RequestParameters],
        deadline: Instant,
        counter: &CompletionCounter,
        cancel: &CancellationToken,
    ) -> Result<Vec<OutcomeRecord>, BatchError> {
        let permits = Arc::new(Semaphore::new(
            self.settings.max_connections_per_host.max(1),
        ));
        let mut tasks = JoinSet::new();

        for (index, request) in params.iter().enumerate() {
            let uri = request.encode_relative_uri();
            let transport = transport.clone();
            let permits = permits.clone();
            let counter = counter.clone();

            tasks.spawn(async move {
                let outcome = match timeout_at(deadline, permits.acquire_owned()).await {
                    Ok(Ok(permit)) => {
                        let result = timeout_at(deadline, transport.get(&uri))
                            .await
                            .unwrap_or(Err(TransportError::Timeout));
                        let outcome = settle(index, uri, result, deadline).await;
                        drop(permit);
                        outcome
                    }
                    Ok(Err(e)) => {
                        let error = TransportError::Other(e.to_string());
                        settle::<T::Response>(index, uri, Err(error), deadline).await
                    }
                    Err(_) => {
                        settle::<T::Response>(index, uri, Err(TransportError::Timeout), deadline)
                            .await
                    }
                };

                counter.increment();
                outcome
            });
        }

        let mut outcomes = Vec::with_capacity(params.len());
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tasks.abort_all();
                    while tasks.join_next().await.is_some() {}
                    return Err(BatchError::Cancelled);
                }
                next = tasks.join_next() => match next {
                    Some(Ok(outcome)) => {
                        debug!(
                            index = outcome.index(),
                            success = outcome.is_success(),
                            "Request settled"
                        );
                        outcomes.push(outcome);
                    }
                    Some(Err(e)) => {
                        tasks.abort_all();
                        while tasks.join_next().await.is_some() {}
                        return Err(BatchError::Internal(format!("request task failed: {}", e)));
                    }
                    None => break,
                },
            }
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
