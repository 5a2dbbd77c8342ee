//! HTTP surface: configuration, routing, middleware, error mapping and shutdown.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod module;
pub mod openapi;
pub mod shutdown;

pub use config::*;
pub use error::{ApiError, ErrorBody};
pub use handlers::AppState;
pub use module::NetworkModule;
pub use shutdown::*;
