//! `calculadora-server`: serves the `/operation/*` endpoints.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use calculadora_server::network::TlsConfig;
use calculadora_server::telemetry::{init_tracing, LogFormat};
use calculadora_server::{NetworkConfig, NetworkModule, ServerConfig};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "calculadora-server", version, about = "Arithmetic over HTTP")]
struct Cli {
    /// Bind address.
    #[arg(long, env = "CALCULADORA_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Listen port; 0 picks a free port.
    #[arg(long, env = "CALCULADORA_PORT", default_value_t = 8080)]
    port: u16,

    /// Allowed CORS origins, comma separated. `*` allows any.
    #[arg(long, env = "CALCULADORA_CORS_ORIGINS", value_delimiter = ',', default_value = "*")]
    cors_origins: Vec<String>,

    /// Transport-level request timeout in milliseconds.
    #[arg(long, env = "CALCULADORA_REQUEST_TIMEOUT_MS", default_value_t = 30_000)]
    request_timeout_ms: u64,

    /// PEM certificate chain; enables HTTPS together with `--tls-key`.
    #[arg(long, env = "CALCULADORA_TLS_CERT", requires = "tls_key")]
    tls_cert: Option<PathBuf>,

    /// PEM private key.
    #[arg(long, env = "CALCULADORA_TLS_KEY", requires = "tls_cert")]
    tls_key: Option<PathBuf>,

    /// Attempts per operation, including the first.
    #[arg(long, env = "CALCULADORA_RETRY_MAX_ATTEMPTS", default_value_t = 3)]
    retry_max_attempts: u32,

    /// Fixed delay between attempts in milliseconds.
    #[arg(long, env = "CALCULADORA_RETRY_DELAY_MS", default_value_t = 1000)]
    retry_delay_ms: u64,

    /// Operations allowed to run at once before requests get 503.
    #[arg(long, env = "CALCULADORA_MAX_CONCURRENT_OPERATIONS", default_value_t = 1000)]
    max_concurrent_operations: u32,

    /// Log output format.
    #[arg(long, env = "CALCULADORA_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

impl Cli {
    fn network_config(&self) -> NetworkConfig {
        let tls = match (&self.tls_cert, &self.tls_key) {
            (Some(cert_path), Some(key_path)) => Some(TlsConfig {
                cert_path: cert_path.clone(),
                key_path: key_path.clone(),
            }),
            _ => None,
        };

        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            tls,
            cors_origins: self.cors_origins.clone(),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            ..NetworkConfig::default()
        }
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            max_concurrent_operations: self.max_concurrent_operations,
            retry_max_attempts: self.retry_max_attempts,
            retry_delay_ms: self.retry_delay_ms,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    let server_config = cli.server_config();
    let network_config = cli.network_config();
    info!(
        retry_max_attempts = server_config.retry_max_attempts,
        retry_delay_ms = server_config.retry_delay_ms,
        max_concurrent_operations = server_config.max_concurrent_operations,
        tls = network_config.tls.is_some(),
        "starting calculadora server"
    );

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;

    let mut module = NetworkModule::new(network_config, &server_config).with_metrics(metrics);
    let port = module.start().await?;
    info!(host = %cli.host, port, "listening");

    module.serve(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(%e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(%e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C"),
        () = terminate => info!("received SIGTERM"),
    }
}
