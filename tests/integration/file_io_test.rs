// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::start_service;
use chrono::Utc;
use seisbatch::batch::{BatchClient, NoProgress};
use seisbatch::engines::reqwest_engine::ReqwestTransportFactory;
use seisbatch::infrastructure::io::check_request_files;
use seisbatch::infrastructure::io::json_file::read_request_parameters;
use seisbatch::infrastructure::io::report::BatchReport;
use seisbatch::infrastructure::io::samples::write_sample_file;
use serde_json::Value;
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_sample_file_to_report() {
    let (server, base_url) = start_service().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"data\":1}"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.json");
    let output = dir.path().join("output.json");

    write_sample_file(&input, false).await.unwrap();
    check_request_files(&input, &output, false).unwrap();

    let parameters = read_request_parameters(&input).await.unwrap();
    let client = BatchClient::new(ReqwestTransportFactory::new());
    let result = client
        .run_batch_uncancellable(&parameters, &base_url, &NoProgress)
        .await
        .unwrap();

    BatchReport::new(base_url.as_str(), Utc::now(), result)
        .write(&output, true, false)
        .await
        .unwrap();

    let report: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(report["total_count"], 5);
    assert_eq!(report["failed_count"], 0);
    assert_eq!(report["responses"].as_array().unwrap().len(), 5);
    assert_eq!(report["base_url"], base_url.as_str());
}
