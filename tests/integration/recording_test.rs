// tests/integration/recording_test.rs

//! Many workers record requests while the report is being read.

use super::test_helpers::{
    PROXIED_BYTES_SENT, PROXIED_UPSTREAM_BYTES, PROXIED_UPSTREAM_MS, TestServer,
};
use reqwest::StatusCode;
use stubstatus::config::Config;
use stubstatus::core::recorder::{CompletedRequest, UpstreamAttempt};
use stubstatus::core::state::StatField;
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_workers_and_readers() {
    const WORKERS: u64 = 8;
    const PER_WORKER: u64 = 500;

    let server = TestServer::start().await;
    let mut workers = JoinSet::new();

    for w in 0..WORKERS {
        let state = server.state.clone();
        workers.spawn(async move {
            for i in 0..PER_WORKER {
                let status = if (w + i) % 2 == 0 { 200 } else { 502 };
                state.record_request(&CompletedRequest {
                    status,
                    err_status: None,
                    bytes_sent: 10,
                    upstream: vec![
                        UpstreamAttempt::new(502, 5, 1),
                        UpstreamAttempt::new(status, 15, 2),
                    ],
                });
                if i % 50 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        });
    }

    let mut readers = JoinSet::new();
    for _ in 0..4 {
        let client = server.client.clone();
        let url = server.url("/stubs_status");
        readers.spawn(async move {
            for _ in 0..10 {
                let body = client.get(&url).send().await.unwrap().text().await.unwrap();
                assert_eq!(body.lines().count(), 11);
            }
        });
    }

    while let Some(res) = workers.join_next().await {
        res.unwrap();
    }
    while let Some(res) = readers.join_next().await {
        res.unwrap();
    }

    let total = WORKERS * PER_WORKER;
    let stats = &server.state.stats;
    assert_eq!(stats.read(StatField::RequestsTotal), total);
    assert_eq!(stats.read(StatField::BytesSentTotal), total * 10);
    assert_eq!(stats.read(StatField::UpstreamBytesRecvTotal), total * 3);
    assert_eq!(stats.read(StatField::WindowRequests), total);
    assert_eq!(stats.read(StatField::WindowResponseTimeMs), total * 20);
    assert_eq!(
        stats.read(StatField::Status20x) + stats.read(StatField::Status50x),
        total
    );

    let summary = server.state.force_rollover();
    assert_eq!(summary.requests_per_second, total / 60);
    assert_eq!(summary.avg_response_time_ms, 20);

    server.shutdown().await;
}

#[tokio::test]
async fn test_requests_without_upstream_are_invisible() {
    let server = TestServer::start().await;
    for status in [200, 404, 500] {
        server.state.record_request(&CompletedRequest {
            status,
            err_status: None,
            bytes_sent: 1_000,
            upstream: vec![],
        });
    }

    let body = server
        .client
        .get(server.url("/stubs_status"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("upstream requests: 0\n"));
    assert!(body.contains("upstream sent: 0\n"));
    assert!(body.contains("reqs_20x: 0\n"));

    server.shutdown().await;
}

#[tokio::test]
async fn test_served_requests_are_recorded() {
    let server = TestServer::start().await;
    for path in ["/proxy/200", "/proxy/200", "/proxy/404", "/api", "/nowhere"] {
        server
            .client
            .get(server.url(path))
            .send()
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
    }
    server.clock.advance(10);

    let body = server
        .client
        .get(server.url("/stubs_status"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    // Only the three proxied responses carried a CompletedRequest.
    assert!(body.contains("upstream requests: 3\n"));
    assert!(body.contains(&format!("upstream sent: {}\n", 3 * PROXIED_BYTES_SENT)));
    assert!(body.contains(&format!("upstream recv: {}\n", 3 * PROXIED_UPSTREAM_BYTES)));
    assert!(body.contains("reqs_20x: 2\n"));
    assert!(body.contains("reqs_40x: 1\n"));
    assert_eq!(
        server.state.stats.read(StatField::WindowResponseTimeMs),
        3 * PROXIED_UPSTREAM_MS as u64
    );

    server.shutdown().await;
}

#[tokio::test]
async fn test_recording_continues_with_endpoint_disabled() {
    let mut config = Config::default();
    config.status.enabled = false;
    let server = TestServer::with_config(config).await;

    let resp = server
        .client
        .get(server.url("/proxy/502"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    assert_eq!(server.state.stats.read(StatField::RequestsTotal), 1);
    assert_eq!(server.state.stats.read(StatField::Status50x), 1);

    server.shutdown().await;
}
