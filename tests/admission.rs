//! Admission control integration tests.

use std::time::Duration;

use edge_gate::config::GateConfig;
use reqwest::StatusCode;

mod common;

#[tokio::test]
async fn test_burst_admits_capacity_then_rejects_with_empty_429() {
    // Capacity 20; a slow refill keeps wall-clock time from re-admitting
    // the 21st request on a loaded machine.
    let mut config = GateConfig::default();
    config.rate_limit.refill_rate_per_sec = 0.5;

    let (addr, _sink) = common::start_gate(config, common::test_app()).await;
    let client = reqwest::Client::new();

    for _ in 0..20 {
        let res = client
            .get(format!("http://{addr}/echo"))
            .header("x-forwarded-for", "1.2.3.4")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = client
        .get(format!("http://{addr}/echo"))
        .header("x-forwarded-for", "1.2.3.4")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(res.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_tokens_refill_over_time() {
    let mut config = GateConfig::default();
    config.rate_limit.burst_capacity = 2;
    config.rate_limit.refill_rate_per_sec = 20.0;

    let (addr, _sink) = common::start_gate(config, common::test_app()).await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let res = client
            .get(format!("http://{addr}/echo"))
            .header("x-forwarded-for", "1.2.3.4")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = client
        .get(format!("http://{addr}/echo"))
        .header("x-forwarded-for", "1.2.3.4")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    // 200ms at 20 tokens/s refills well past one token.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let res = client
        .get(format!("http://{addr}/echo"))
        .header("x-forwarded-for", "1.2.3.4")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_clients_limited_independently() {
    let mut config = GateConfig::default();
    config.rate_limit.burst_capacity = 5;
    config.rate_limit.refill_rate_per_sec = 0.5;

    let (addr, _sink) = common::start_gate(config, common::test_app()).await;
    let client = reqwest::Client::new();

    for key in ["1.2.3.4", "5.6.7.8"] {
        for _ in 0..5 {
            let res = client
                .get(format!("http://{addr}/echo"))
                .header("x-forwarded-for", key)
                .send()
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::OK, "client {key} exhausted early");
        }

        let res = client
            .get(format!("http://{addr}/echo"))
            .header("x-forwarded-for", key)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}

#[tokio::test]
async fn test_rejected_requests_emit_no_record() {
    let mut config = GateConfig::default();
    config.rate_limit.burst_capacity = 1;
    config.rate_limit.refill_rate_per_sec = 0.0;

    let (addr, sink) = common::start_gate(config, common::test_app()).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("http://{addr}/echo"))
        .header("x-forwarded-for", "1.2.3.4")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("http://{addr}/echo"))
        .header("x-forwarded-for", "1.2.3.4")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(sink.records().len(), 1);
}

#[tokio::test]
async fn test_zero_capacity_rejects_everything() {
    let mut config = GateConfig::default();
    config.rate_limit.burst_capacity = 0;

    let (addr, sink) = common::start_gate(config, common::test_app()).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("http://{addr}/echo"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(sink.records().is_empty());
}
