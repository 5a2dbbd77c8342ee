//! Calculadora server: arithmetic over HTTP with a retrying operation pipeline,
//! plus a matching HTTP client.

pub mod client;
pub mod network;
pub mod service;
pub mod telemetry;

pub use client::{CalculadoraClient, ClientError};
pub use network::{NetworkConfig, NetworkModule};
pub use service::ServerConfig;
