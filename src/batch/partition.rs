// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::batch_result::{
    BatchResult, FailedResponse, OutcomeRecord, SuccessResponse,
};
use crate::engines::traits::{TransportError, TransportResponse};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

/// 描述非 2xx 状态码
fn describe_status(status: u16) -> String {
    match reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
    {
        Some(reason) => format!("HTTP {} {}", status, reason),
        None => format!("HTTP {}", status),
    }
}

fn error_kind(error: &TransportError) -> &'static str {
    if error.is_timeout() {
        "timeout"
    } else if error.is_connect() {
        "connect"
    } else {
        "other"
    }
}

/// 把一个已返回的请求归类为成功或失败
///
/// 2xx 响应在这里读取完整正文，受批次截止时间约束；其余响应只保留
/// 状态码，正文不读取并随响应一起释放。调用方在整个过程中持有连接许可，
/// 返回时该请求占用的连接已经可以复用或已关闭。
///
/// # 参数
///
/// * `index` - 请求在输入列表中的下标
/// * `uri` - 相对请求URI
/// * `result` - 响应或传输错误
/// * `deadline` - 批次截止时间
pub async fn settle<R: TransportResponse>(
    index: usize,
    uri: String,
    result: Result<R, TransportError>,
    deadline: Instant,
) -> OutcomeRecord {
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            let kind = error_kind(&e);
            if e.is_timeout() {
                warn!(index, uri = %uri, kind, "Request timed out");
            } else {
                debug!(index, uri = %uri, kind, error = %e, "Request failed");
            }
            return OutcomeRecord::Failure(FailedResponse {
                index,
                uri,
                status: None,
                error: e.to_string(),
            });
        }
    };

    let status = response.status();
    if !response.is_success() {
        debug!(index, uri = %uri, status, "Request returned error status");
        return OutcomeRecord::Failure(FailedResponse {
            index,
            uri,
            status: Some(status),
            error: describe_status(status),
        });
    }

    match timeout_at(deadline, response.text()).await {
        Ok(Ok(body)) => OutcomeRecord::Success(SuccessResponse {
            index,
            status,
            body,
        }),
        Ok(Err(e)) => {
            warn!(index, uri = %uri, error = %e, "Failed to read response body");
            OutcomeRecord::Failure(FailedResponse {
                index,
                uri,
                status: Some(status),
                error: format!("Failed to read response body: {}", e),
            })
        }
        Err(_) => {
            warn!(index, uri = %uri, "Timed out reading response body");
            OutcomeRecord::Failure(FailedResponse {
                index,
                uri,
                status: Some(status),
                error: TransportError::Timeout.to_string(),
            })
        }
    }
}

/// 将所有请求的结果汇总为批量结果
///
/// 两组内部保持传入顺序（即完成顺序）。结果总数必须等于请求数，
/// 不相等说明调度有缺陷，在调试构建中直接断言失败。
pub fn partition(outcomes: Vec<OutcomeRecord>, expected_total: usize) -> BatchResult {
    let result = BatchResult::from_outcomes(outcomes);
    debug_assert_eq!(
        result.total_count(),
        expected_total,
        "every dispatched request must produce exactly one outcome"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    enum Body {
        Text(&'static str),
        Broken,
        Slow,
    }

    struct FakeResponse {
        status: u16,
        body: Body,
        reads: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TransportResponse for FakeResponse {
        fn status(&self) -> u16 {
            self.status
        }

        async fn text(self) -> Result<String, TransportError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            match self.body {
                Body::Text(text) => Ok(text.to_string()),
                Body::Broken => Err(TransportError::Other("connection reset".to_string())),
                Body::Slow => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(String::new())
                }
            }
        }
    }

    fn response(status: u16, body: Body, reads: &Arc<AtomicUsize>) -> Result<FakeResponse, TransportError> {
        Ok(FakeResponse {
            status,
            body,
            reads: reads.clone(),
        })
    }

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    #[tokio::test]
    async fn test_settle_success_reads_body() {
        let reads = Arc::new(AtomicUsize::new(0));
        let outcome = settle(
            3,
            "asce7-16.json?title=a".to_string(),
            response(200, Body::Text("three"), &reads),
            far_deadline(),
        )
        .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.index(), 3);
        assert_eq!(
            outcome,
            OutcomeRecord::Success(SuccessResponse {
                index: 3,
                status: 200,
                body: "three".to_string(),
            })
        );
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_settle_error_status_skips_body() {
        let reads = Arc::new(AtomicUsize::new(0));
        let outcome = settle(
            0,
            "asce7-05.json".to_string(),
            response(500, Body::Text("ignored"), &reads),
            far_deadline(),
        )
        .await;

        let OutcomeRecord::Failure(failure) = outcome else {
            panic!("expected a failure");
        };
        assert_eq!(failure.status, Some(500));
        assert_eq!(failure.error, "HTTP 500 Internal Server Error");
        assert_eq!(reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_settle_transport_error() {
        let outcome = settle::<FakeResponse>(
            2,
            "ibc-2015.json".to_string(),
            Err(TransportError::Other("refused".to_string())),
            far_deadline(),
        )
        .await;

        assert!(!outcome.is_success());
        let OutcomeRecord::Failure(failure) = outcome else {
            panic!("expected a failure");
        };
        assert_eq!(failure.index, 2);
        assert_eq!(failure.status, None);
        assert!(failure.error.contains("refused"));
    }

    #[tokio::test]
    async fn test_settle_body_read_failure() {
        let reads = Arc::new(AtomicUsize::new(0));
        let outcome = settle(0, "x".to_string(), response(200, Body::Broken, &reads), far_deadline()).await;

        let OutcomeRecord::Failure(failure) = outcome else {
            panic!("expected a failure");
        };
        assert_eq!(failure.status, Some(200));
        assert!(failure.error.starts_with("Failed to read response body"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_body_read_respects_deadline() {
        let reads = Arc::new(AtomicUsize::new(0));
        let deadline = Instant::now() + Duration::from_secs(5);
        let outcome = settle(0, "x".to_string(), response(200, Body::Slow, &reads), deadline).await;

        let OutcomeRecord::Failure(failure) = outcome else {
            panic!("expected a failure");
        };
        assert_eq!(failure.error, "Timeout");
    }

    #[test]
    fn test_partition_keeps_completion_order() {
        let outcomes = vec![
            OutcomeRecord::Success(SuccessResponse {
                index: 3,
                status: 200,
                body: "three".to_string(),
            }),
            OutcomeRecord::Failure(FailedResponse {
                index: 0,
                uri: "asce7-05.json".to_string(),
                status: Some(500),
                error: "HTTP 500 Internal Server Error".to_string(),
            }),
            OutcomeRecord::Success(SuccessResponse {
                index: 1,
                status: 204,
                body: "one".to_string(),
            }),
        ];

        let result = partition(outcomes, 3);

        assert_eq!(result.total_count(), 3);
        assert_eq!(
            result.success_messages().collect::<Vec<_>>(),
            vec!["three", "one"]
        );
        assert_eq!(result.failures()[0].index, 0);
    }

    #[test]
    fn test_partition_empty() {
        assert!(partition(Vec::new(), 0).is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "exactly one outcome")]
    fn test_partition_detects_missing_outcomes() {
        partition(Vec::new(), 2);
    }
}
