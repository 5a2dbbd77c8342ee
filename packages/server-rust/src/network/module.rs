//! Network module with deferred startup lifecycle.
//!
//! `new()` assembles the operation pipeline and shared state, `start()` binds
//! the TCP listener, and `serve()` accepts connections until shutdown. The
//! binary installs the metrics recorder between `new()` and `serve()`.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::config::{NetworkConfig, TlsConfig};
use super::handlers::{
    divisao_handler, health_handler, liveness_handler, metrics_handler, multiplicacao_handler,
    readiness_handler, soma_handler, subtracao_handler, AppState,
};
use super::middleware::apply_http_layers;
use super::openapi::openapi_handler;
use super::shutdown::ShutdownController;
use crate::service::{build_operation_pipeline, CallIdGenerator, OperationPipeline, ServerConfig};

/// How long `serve()` waits for in-flight operations after the listener closes.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Owns the HTTP server lifecycle.
///
/// 1. `new()` -- builds the pipeline, call ID source and shutdown controller
/// 2. `start()` -- binds the TCP listener to the configured address
/// 3. `serve()` -- accepts connections until the shutdown signal fires
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    pipeline: OperationPipeline,
    call_ids: Arc<CallIdGenerator>,
    shutdown: Arc<ShutdownController>,
    metrics: Option<PrometheusHandle>,
}

impl NetworkModule {
    /// Creates a new network module without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig, server_config: &ServerConfig) -> Self {
        Self {
            config,
            listener: None,
            pipeline: build_operation_pipeline(server_config),
            call_ids: Arc::new(CallIdGenerator::new()),
            shutdown: Arc::new(ShutdownController::new()),
            metrics: None,
        }
    }

    /// Exposes `handle` at `GET /metrics`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Returns a shared reference to the shutdown controller.
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// Assembles the axum router with all routes and middleware.
    ///
    /// Routes:
    /// - `POST /operation/{soma,subtracao,multiplicacao,divisao}`
    /// - `GET /health`, `/health/live`, `/health/ready`
    /// - `GET /metrics` -- Prometheus text format
    /// - `GET /api-docs/openapi.json`
    pub fn build_router(&self) -> Router {
        let state = AppState {
            pipeline: self.pipeline.clone(),
            call_ids: Arc::clone(&self.call_ids),
            shutdown: Arc::clone(&self.shutdown),
            metrics: self.metrics.clone(),
            start_time: Instant::now(),
        };

        let router = Router::new()
            .route("/operation/soma", post(soma_handler))
            .route("/operation/subtracao", post(subtracao_handler))
            .route("/operation/multiplicacao", post(multiplicacao_handler))
            .route("/operation/divisao", post(divisao_handler))
            .route("/health", get(health_handler))
            .route("/health/live", get(liveness_handler))
            .route("/health/ready", get(readiness_handler))
            .route("/metrics", get(metrics_handler))
            .route("/api-docs/openapi.json", get(openapi_handler));

        apply_http_layers(router, &self.config).with_state(state)
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the bound port, which differs from the configured one when
    /// port 0 asks for an OS-assigned port.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!(host = %self.config.host, port, "TCP listener bound");

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves connections until `shutdown` completes, then drains.
    ///
    /// On the shutdown signal the health state moves to `Draining`, the
    /// listener stops accepting, and in-flight operations get up to 30 s to
    /// finish before the state moves to `Stopped`.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called first, if the TLS
    /// certificates cannot be loaded, or on a fatal I/O error.
    pub async fn serve(
        mut self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = self
            .listener
            .take()
            .ok_or_else(|| anyhow::anyhow!("start() must be called before serve()"))?;
        let router = self.build_router();
        let shutdown_ctrl = Arc::clone(&self.shutdown);

        let signal_ctrl = Arc::clone(&shutdown_ctrl);
        let shutdown = async move {
            shutdown.await;
            info!("shutdown signal received, draining");
            signal_ctrl.trigger_shutdown();
        };

        shutdown_ctrl.set_ready();

        if let Some(tls_config) = &self.config.tls {
            serve_tls(listener, router, tls_config, shutdown).await?;
        } else {
            serve_plain(listener, router, shutdown).await?;
        }

        drain(&shutdown_ctrl).await;
        Ok(())
    }
}

async fn serve_plain(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    info!("serving plain HTTP");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Serves HTTPS through `axum-server` with rustls, reusing the bound listener.
async fn serve_tls(
    listener: TcpListener,
    router: Router,
    tls_config: &TlsConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let rustls_config = RustlsConfig::from_pem_file(&tls_config.cert_path, &tls_config.key_path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load TLS certificates: {e}"))?;

    let addr = listener.local_addr()?;
    let std_listener = listener.into_std()?;
    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();

    tokio::spawn(async move {
        shutdown.await;
        shutdown_handle.graceful_shutdown(None);
    });

    info!(%addr, "serving HTTPS");

    axum_server::from_tcp_rustls(std_listener, rustls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;
    Ok(())
}

async fn drain(shutdown_ctrl: &ShutdownController) {
    shutdown_ctrl.trigger_shutdown();

    if shutdown_ctrl.wait_for_drain(DRAIN_TIMEOUT).await {
        info!("all in-flight operations drained");
    } else {
        warn!(
            in_flight = shutdown_ctrl.in_flight_count(),
            "drain timeout expired with operations still running"
        );
    }
}
