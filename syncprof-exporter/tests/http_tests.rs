// Syncprof Exporter - HTTP integration tests
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! End-to-end tests: events pushed over HTTP come back out of `/values`,
//! `/metrics` and `/status`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use syncprof::{Aggregator, EngineConfig, SourceRegistry};
use syncprof_exporter::{router, AppState, Worker};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

struct Server {
    addr: SocketAddr,
    shutdown: watch::Sender<bool>,
}

async fn start(names: &[&str]) -> Server {
    let registry = SourceRegistry::from_names(names.iter().copied()).unwrap();
    let aggregator = Aggregator::new(registry.clone(), EngineConfig::default()).unwrap();
    let (worker, ingest, view) = Worker::new(aggregator, 64);
    let (shutdown, shutdown_rx) = watch::channel(false);
    tokio::spawn(worker.run(shutdown_rx));

    let app = router(Arc::new(AppState::new(&registry, ingest, view)));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Server { addr, shutdown }
}

/// Minimal HTTP/1.1 exchange. Returns (status code, body).
async fn request(addr: SocketAddr, method: &str, path: &str, body: Option<&str>) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let body = body.unwrap_or("");
    let head = format!(
        "{} {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n",
        method,
        path,
        body.len()
    );
    stream.write_all(head.as_bytes()).await.unwrap();
    stream.write_all(body.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    let status = response
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap();
    let body = response
        .split_once("\r\n\r\n")
        .map(|(_, b)| b.to_string())
        .unwrap_or_default();
    (status, body)
}

/// Wait until the worker has applied `count` events.
async fn wait_for_events(addr: SocketAddr, count: u64) -> serde_json::Value {
    for _ in 0..200 {
        let (_, body) = request(addr, "GET", "/status", None).await;
        let status: serde_json::Value = serde_json::from_str(&body).unwrap();
        let seen = status["events_recorded"].as_u64().unwrap()
            + status["events_rejected"].as_u64().unwrap();
        if seen >= count {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("worker did not apply {} events", count);
}

#[tokio::test]
async fn test_push_and_read_values() {
    let server = start(&["A", "B"]).await;

    let (status, body) = request(
        server.addr,
        "POST",
        "/events",
        Some(
            r#"[{"source": "A", "timestamp": 1.0}, {"source": "B", "timestamp": 1.1},
                {"source": "A", "timestamp": 2.0}, {"source": "B", "timestamp": 2.3}]"#,
        ),
    )
    .await;
    assert_eq!(status, 202);
    assert!(body.contains("\"accepted\":4"));

    wait_for_events(server.addr, 4).await;

    let (status, body) = request(server.addr, "GET", "/values", None).await;
    assert_eq!(status, 200);
    let values: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(values["A:AvgFreq"].as_f64(), Some(1.0));
    assert_eq!(values["A:Timestamp"].as_f64(), Some(2.0));
    approx::assert_relative_eq!(
        values["A_vs_B:AvgDiff"].as_f64().unwrap(),
        -0.2,
        epsilon = 1e-9
    );
    approx::assert_relative_eq!(
        values["A_vs_B:CurrentDiff"].as_f64().unwrap(),
        -0.3,
        epsilon = 1e-9
    );

    let (status, body) = request(server.addr, "GET", "/values/B:Timestamp", None).await;
    assert_eq!(status, 200);
    assert!(body.contains("2.3"));

    server.shutdown.send(true).unwrap();
}

#[tokio::test]
async fn test_unknown_source_is_counted() {
    let server = start(&["C", "D"]).await;

    let (status, _) = request(
        server.addr,
        "POST",
        "/events",
        Some(r#"{"source": "nope", "timestamp": 1.0}"#),
    )
    .await;
    assert_eq!(status, 202);

    let status = wait_for_events(server.addr, 1).await;
    assert_eq!(status["events_rejected"].as_u64(), Some(1));
    assert_eq!(status["events_recorded"].as_u64(), Some(0));
    assert_eq!(status["engine_state"].as_str(), Some("running"));
    assert_eq!(status["pairs"][0].as_str(), Some("C_vs_D"));

    let (status, _) = request(server.addr, "GET", "/values/C:AvgFreq", None).await;
    assert_eq!(status, 404);

    server.shutdown.send(true).unwrap();
}

#[tokio::test]
async fn test_metrics_health_and_ready() {
    let server = start(&["E", "F"]).await;

    request(
        server.addr,
        "POST",
        "/events",
        Some(r#"[{"source": "E", "timestamp": 10.0}, {"source": "E", "timestamp": 10.5}]"#),
    )
    .await;
    wait_for_events(server.addr, 2).await;

    let (status, body) = request(server.addr, "GET", "/metrics", None).await;
    assert_eq!(status, 200);
    assert!(body.contains("syncprof_source_frequency_hz"));
    assert!(body.contains("source=\"E\""));

    let (status, _) = request(server.addr, "GET", "/health", None).await;
    assert_eq!(status, 200);
    let (status, _) = request(server.addr, "GET", "/ready", None).await;
    assert_eq!(status, 200);

    server.shutdown.send(true).unwrap();
    for _ in 0..200 {
        let (status, _) = request(server.addr, "GET", "/ready", None).await;
        if status == 503 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("/ready still OK after shutdown");
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let server = start(&["G", "H"]).await;
    let (status, _) = request(server.addr, "POST", "/events", Some("not json")).await;
    assert!((400..500).contains(&status));
    server.shutdown.send(true).unwrap();
}
