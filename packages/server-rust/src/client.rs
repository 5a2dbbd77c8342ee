//! HTTP client for the `/operation/*` endpoints.
//!
//! Requests are retried client-side with exponential backoff. Arguments the
//! server would reject anyway (division by zero, unknown operation names) are
//! rejected locally without a request.

use std::time::Duration;

use calculadora_core::{ArithmeticOp, InvalidArgument, OperationRequest, OperationResponse};
use reqwest::StatusCode;
use tracing::debug;

use crate::network::ErrorBody;
use crate::service::RetryPolicy;

/// Timeout applied to every individual request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Failure of a client call.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Rejected locally; nothing was sent.
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
    /// Transport failure, timeout, or an undecodable success body.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Api { status: StatusCode, message: String },
}

/// Client for a Calculadora server.
#[derive(Debug, Clone)]
pub struct CalculadoraClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl CalculadoraClient {
    /// Default client policy: 3 attempts, exponential backoff from 1 s.
    #[must_use]
    pub fn default_retry_policy() -> RetryPolicy {
        RetryPolicy::exponential(3, Duration::from_secs(1))
    }

    /// Creates a client for `base_url`, e.g. `http://localhost:8080/operation`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: Self::default_retry_policy(),
        })
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// # Errors
    ///
    /// See [`CalculadoraClient::call`].
    pub async fn soma(&self, a: f64, b: f64) -> Result<f64, ClientError> {
        self.call(ArithmeticOp::Add, a, b).await
    }

    /// # Errors
    ///
    /// See [`CalculadoraClient::call`].
    pub async fn subtracao(&self, a: f64, b: f64) -> Result<f64, ClientError> {
        self.call(ArithmeticOp::Subtract, a, b).await
    }

    /// # Errors
    ///
    /// See [`CalculadoraClient::call`].
    pub async fn multiplicacao(&self, a: f64, b: f64) -> Result<f64, ClientError> {
        self.call(ArithmeticOp::Multiply, a, b).await
    }

    /// # Errors
    ///
    /// See [`CalculadoraClient::call`].
    pub async fn divisao(&self, a: f64, b: f64) -> Result<f64, ClientError> {
        self.call(ArithmeticOp::Divide, a, b).await
    }

    /// Runs the operation named `name` (`soma`, `subtracao`, ...).
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument::UnknownOperation` for an unknown name, and
    /// otherwise whatever [`CalculadoraClient::call`] returns.
    pub async fn execute(&self, name: &str, a: f64, b: f64) -> Result<f64, ClientError> {
        let op: ArithmeticOp = name.parse()?;
        self.call(op, a, b).await
    }

    /// Sends `op` to the server, retrying per the client policy.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument::DivisionByZero` for a zero divisor, without a request
    /// - `Api` with the last non-success status and its message
    /// - `Http` for the last transport failure
    #[allow(clippy::float_cmp)]
    pub async fn call(&self, op: ArithmeticOp, a: f64, b: f64) -> Result<f64, ClientError> {
        if op == ArithmeticOp::Divide && b == 0.0 {
            return Err(InvalidArgument::DivisionByZero.into());
        }

        let url = format!("{}/{}", self.base_url, op.name());
        let request = OperationRequest::new(a, b);
        self.retry
            .run(|attempt| {
                debug!(%url, attempt, "sending operation request");
                self.send_once(&url, request)
            })
            .await
    }

    async fn send_once(&self, url: &str, request: OperationRequest) -> Result<f64, ClientError> {
        let response = self.http.post(url).json(&request).send().await?;
        let status = response.status();

        if status.is_success() {
            let body: OperationResponse = response.json().await?;
            return Ok(body.result);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };
        Err(ClientError::Api { status, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on the discard port; any request would fail as `Http`.
    const UNREACHABLE: &str = "http://127.0.0.1:9/operation";

    fn client() -> CalculadoraClient {
        CalculadoraClient::new(UNREACHABLE)
            .unwrap()
            .with_retry_policy(RetryPolicy::fixed(1, Duration::ZERO))
    }

    #[test]
    fn trims_trailing_slash() {
        let client = CalculadoraClient::new("http://localhost:8080/operation/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/operation");
    }

    #[test]
    fn default_policy_is_exponential() {
        let policy = CalculadoraClient::default_retry_policy();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(
            policy.backoff().delay_after(2),
            Duration::from_secs(2),
        );
    }

    #[tokio::test]
    async fn divisao_by_zero_fails_locally() {
        let err = client().divisao(20.0, 0.0).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::InvalidArgument(InvalidArgument::DivisionByZero)
        ));
        assert_eq!(err.to_string(), "Divisão por zero não permitida");
    }

    #[tokio::test]
    async fn negative_zero_divisor_fails_locally() {
        let err = client().execute("divisao", 1.0, -0.0).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn unknown_operation_fails_locally() {
        let err = client().execute("potencia", 2.0, 3.0).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::InvalidArgument(InvalidArgument::UnknownOperation { .. })
        ));
        assert_eq!(err.to_string(), "Operação inválida");
    }

    mod live {
        use tokio::sync::oneshot;

        use super::*;
        use crate::network::{NetworkConfig, NetworkModule};
        use crate::service::ServerConfig;

        /// Starts a server on an ephemeral port with a short retry delay.
        async fn spawn_server() -> (String, oneshot::Sender<()>) {
            let network = NetworkConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                ..NetworkConfig::default()
            };
            let server = ServerConfig {
                retry_delay_ms: 10,
                ..ServerConfig::default()
            };
            let mut module = NetworkModule::new(network, &server);
            let port = module.start().await.unwrap();

            let (tx, rx) = oneshot::channel::<()>();
            tokio::spawn(module.serve(async move {
                let _ = rx.await;
            }));
            (format!("http://127.0.0.1:{port}"), tx)
        }

        fn fast(client: CalculadoraClient) -> CalculadoraClient {
            client.with_retry_policy(RetryPolicy::exponential(3, Duration::from_millis(5)))
        }

        #[tokio::test]
        async fn computes_each_operation() {
            let (base, _stop) = spawn_server().await;
            let client = fast(CalculadoraClient::new(format!("{base}/operation")).unwrap());

            assert_eq!(client.soma(5.0, 3.0).await.unwrap(), 8.0);
            assert_eq!(client.subtracao(10.0, 4.0).await.unwrap(), 6.0);
            assert_eq!(client.multiplicacao(6.0, 7.0).await.unwrap(), 42.0);
            assert_eq!(client.divisao(20.0, 4.0).await.unwrap(), 5.0);
            assert_eq!(client.execute("soma", -1.5, 0.5).await.unwrap(), -1.0);
        }

        #[tokio::test]
        async fn server_rejects_zero_divisor_sent_directly() {
            let (base, _stop) = spawn_server().await;

            let response = reqwest::Client::new()
                .post(format!("{base}/operation/divisao"))
                .json(&OperationRequest::new(20.0, 0.0))
                .send()
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body: ErrorBody = response.json().await.unwrap();
            assert_eq!(body.message, "Divisão por zero não permitida");
        }

        #[tokio::test]
        async fn wrong_base_path_is_api_error() {
            let (base, _stop) = spawn_server().await;
            let client = fast(CalculadoraClient::new(format!("{base}/calc")).unwrap());

            let err = client.soma(1.0, 1.0).await.unwrap_err();
            match err {
                ClientError::Api { status, message } => {
                    assert_eq!(status, StatusCode::NOT_FOUND);
                    assert_eq!(message, "Not Found");
                }
                other => panic!("expected Api error, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn connection_failure_is_http_error() {
        let err = client().soma(1.0, 2.0).await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }
}
