//! HTTP server setup and middleware wiring.
//!
//! # Responsibilities
//! - Wrap a caller-supplied application router with the gate pipeline
//! - Wire up middleware (tracing, timeout, admission, capture)
//! - Bind the server to a listener with graceful shutdown
//! - Spawn the idle limiter sweep when enabled

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::capture::sink::{CaptureSink, TracingSink};
use crate::config::GateConfig;
use crate::limiter::LimiterRegistry;
use crate::middleware::{
    admission_middleware, capture_middleware, AdmissionState, CaptureState,
};
use crate::observability::metrics;

/// HTTP server wrapping an application router with the gate pipeline.
///
/// The limiter registry is owned here and injected into the admission
/// stage; its lifecycle is the server's own.
pub struct GateServer {
    router: Router,
    config: GateConfig,
    registry: Arc<LimiterRegistry>,
}

impl GateServer {
    /// Wrap `app` with the admission and capture stages, logging captured
    /// exchanges through the default tracing sink.
    pub fn new(config: GateConfig, app: Router) -> Self {
        Self::with_sink(config, app, Arc::new(TracingSink))
    }

    /// Wrap `app` with the admission and capture stages, sending captured
    /// exchanges to `sink`.
    pub fn with_sink(config: GateConfig, app: Router, sink: Arc<dyn CaptureSink>) -> Self {
        let registry = Arc::new(LimiterRegistry::new(
            config.rate_limit.refill_rate_per_sec,
            config.rate_limit.burst_capacity as f64,
        ));

        let router = Self::build_router(&config, app, Arc::clone(&registry), sink);
        Self {
            router,
            config,
            registry,
        }
    }

    /// Build the wrapped router.
    ///
    /// Layers added later run earlier, so the request passes trace →
    /// admission → capture → timeout → catch-panic → handler. Timeout and
    /// panic sit inside the capture stage: both become responses that flow
    /// through the tee, so the exchange record is still emitted.
    fn build_router(
        config: &GateConfig,
        app: Router,
        registry: Arc<LimiterRegistry>,
        sink: Arc<dyn CaptureSink>,
    ) -> Router {
        let admission = Arc::new(AdmissionState { registry });
        let capture = Arc::new(CaptureState {
            sink,
            max_body_bytes: config.capture.max_body_bytes,
        });

        let app = app.layer(CatchPanicLayer::new()).layer(TimeoutLayer::new(
            Duration::from_secs(config.timeouts.request_secs),
        ));

        let app = if config.capture.enabled {
            app.layer(middleware::from_fn_with_state(capture, capture_middleware))
        } else {
            app
        };

        app.layer(middleware::from_fn_with_state(
            admission,
            admission_middleware,
        ))
        .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "gate server starting");

        if self.config.rate_limit.sweep.enabled {
            spawn_idle_sweeper(Arc::clone(&self.registry), &self.config.rate_limit.sweep);
        }

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("gate server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Get the limiter registry backing the admission stage.
    pub fn registry(&self) -> &Arc<LimiterRegistry> {
        &self.registry
    }
}

/// Periodically evict buckets idle past the configured threshold.
fn spawn_idle_sweeper(registry: Arc<LimiterRegistry>, sweep: &crate::config::schema::SweepConfig) {
    let interval = Duration::from_secs(sweep.interval_secs);
    let max_idle = Duration::from_secs(sweep.idle_secs);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = registry.sweep_idle(Instant::now(), max_idle);
            if removed > 0 {
                tracing::debug!(
                    removed,
                    remaining = registry.len(),
                    "idle limiter sweep"
                );
            }
            metrics::record_tracked_clients(registry.len());
        }
    });
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
