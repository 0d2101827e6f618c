// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_histogram, Unit};
use std::sync::Once;

/// 发出的请求总数
pub const BATCH_REQUESTS_TOTAL: &str = "batch_requests_total";
/// 失败的请求总数
pub const BATCH_REQUESTS_FAILED_TOTAL: &str = "batch_requests_failed_total";
/// 被取消的批次数
pub const BATCH_CANCELLED_TOTAL: &str = "batch_cancelled_total";
/// 批次耗时
pub const BATCH_DURATION_SECONDS: &str = "batch_duration_seconds";

static DESCRIBE: Once = Once::new();

/// 注册批量请求相关指标的描述
///
/// 不安装导出器；未安装记录器时所有指标调用都是空操作
pub fn describe_metrics() {
    DESCRIBE.call_once(|| {
        describe_counter!(
            BATCH_REQUESTS_TOTAL,
            Unit::Count,
            "Total number of requests dispatched in batches"
        );
        describe_counter!(
            BATCH_REQUESTS_FAILED_TOTAL,
            Unit::Count,
            "Total number of batch requests that failed"
        );
        describe_counter!(
            BATCH_CANCELLED_TOTAL,
            Unit::Count,
            "Total number of batches cancelled by the caller"
        );
        describe_histogram!(
            BATCH_DURATION_SECONDS,
            Unit::Seconds,
            "Duration of completed batches in seconds"
        );
    });
}
