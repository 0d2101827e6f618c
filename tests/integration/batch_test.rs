// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    start_counting_service, start_service, RecordingObserver, LARGE_BODY_SIZE, SERVICE_PATH,
};
use seisbatch::batch::{BatchClient, NoProgress, MAX_CONNECTIONS_PER_HOST};
use seisbatch::domain::models::request_parameters::{sample_parameters, RequestParameters};
use seisbatch::domain::models::standard::{RiskCategory, SiteClass, Standard};
use seisbatch::engines::reqwest_engine::ReqwestTransportFactory;
use seisbatch::utils::errors::BatchError;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_batch_against_service_all_succeed() {
    let (server, base_url) = start_service().await;
    Mock::given(method("GET"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"response\":{}}"))
        .expect(5)
        .mount(&server)
        .await;

    let client = BatchClient::new(ReqwestTransportFactory::new());
    let observer = RecordingObserver::default();

    let result = client
        .run_batch_uncancellable(&sample_parameters(), &base_url, &observer)
        .await
        .unwrap();

    assert_eq!(result.success_count(), 5);
    assert_eq!(result.failed_count(), 0);
    assert!(result.success_messages().all(|m| m == "{\"response\":{}}"));
    observer.assert_completed();
}

#[tokio::test]
async fn test_batch_against_service_partial_failure() {
    let (server, base_url) = start_service().await;
    Mock::given(method("GET"))
        .and(path(format!("{}asce7-05.json", SERVICE_PATH)))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("title", "Example IBC-2012"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let client = BatchClient::new(ReqwestTransportFactory::new());
    let result = client
        .run_batch_uncancellable(&sample_parameters(), &base_url, &NoProgress)
        .await
        .unwrap();

    assert_eq!(result.success_count(), 3);
    assert_eq!(result.failed_count(), 2);

    let mut failures = result.failures().to_vec();
    failures.sort_by_key(|f| f.index);
    assert_eq!(failures[0].index, 0);
    assert_eq!(failures[0].status, Some(500));
    assert_eq!(failures[1].index, 3);
    assert_eq!(failures[1].status, Some(503));
    assert!(failures[1].uri.contains("title=Example%20IBC-2012"));
}

#[tokio::test]
async fn test_batch_against_service_cancelled() {
    let (server, base_url) = start_service().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let client = BatchClient::new(ReqwestTransportFactory::new());
    let observer = RecordingObserver::default();
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            cancel.cancel();
        });
    }

    let started = Instant::now();
    let err = client
        .run_batch(&sample_parameters(), &base_url, &cancel, &observer)
        .await
        .err()
        .unwrap();

    assert!(matches!(err, BatchError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(observer.finished(), 1);
    assert!(observer.values().iter().all(|v| *v < 1.0));
}

#[tokio::test]
async fn test_batch_connection_refused_is_per_request_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = BatchClient::new(ReqwestTransportFactory::new());
    let result = client
        .run_batch_uncancellable(
            &sample_parameters()[..2],
            &format!("http://{}/designmaps/", addr),
            &NoProgress,
        )
        .await
        .unwrap();

    assert_eq!(result.success_count(), 0);
    assert_eq!(result.failed_count(), 2);
    assert!(result.failures().iter().all(|f| f.status.is_none()));
}

#[tokio::test]
async fn test_batch_unresolvable_host_fails_batch() {
    let client = BatchClient::new(ReqwestTransportFactory::new());
    let err = client
        .run_batch_uncancellable(
            &sample_parameters(),
            "http://seisbatch-test.invalid/designmaps/",
            &NoProgress,
        )
        .await
        .err()
        .unwrap();

    assert!(matches!(err, BatchError::ServerRequest { .. }));
}

#[tokio::test]
async fn test_batch_open_connections_stay_within_ceiling() {
    let (stats, base_url) = start_counting_service().await;
    let params: Vec<RequestParameters> = (0..20)
        .map(|i| {
            RequestParameters::new(
                Standard::Asce7_16,
                34.0 + i as f64 / 100.0,
                -118.0,
                RiskCategory::II,
                SiteClass::C,
                format!("Site {}", i),
            )
        })
        .collect();

    let client = BatchClient::new(ReqwestTransportFactory::new());
    let result = client
        .run_batch_uncancellable(&params, &base_url, &NoProgress)
        .await
        .unwrap();

    assert_eq!(result.success_count(), 20);
    assert!(result.success_messages().all(|m| m.len() == LARGE_BODY_SIZE));
    assert_eq!(stats.accepted(), 20);
    assert!(
        stats.peak() <= MAX_CONNECTIONS_PER_HOST,
        "peak open connections {} exceeded {}",
        stats.peak(),
        MAX_CONNECTIONS_PER_HOST
    );
}
