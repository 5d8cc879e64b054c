//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{body::Bytes, routing::any, Router};
use tokio::net::TcpListener;

use edge_gate::capture::MemorySink;
use edge_gate::config::GateConfig;
use edge_gate::GateServer;

/// Echo handler used by most tests.
async fn echo(body: Bytes) -> Bytes {
    body
}

/// Handler that panics, for finalize-on-panic tests.
async fn boom() -> &'static str {
    panic!("handler exploded");
}

/// Handler that outlives any test timeout.
async fn slow() -> &'static str {
    tokio::time::sleep(std::time::Duration::from_secs(60)).await;
    "done"
}

/// Default test application: echo at /echo, panic at /boom, stall at /slow.
pub fn test_app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/boom", any(boom))
        .route("/slow", any(slow))
}

/// Start a gate server on an ephemeral port.
///
/// Returns the bound address and the memory sink receiving exchange
/// records.
pub async fn start_gate(config: GateConfig, app: Router) -> (SocketAddr, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let server = GateServer::with_sink(config, app, sink.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    (addr, sink)
}
