//! HTTP request timeout middleware.
//!
//! Bounds the processing time of a downstream handler: each request gets a deadline
//! context, handlers observe it cooperatively, and a request whose deadline passed is
//! answered with `504 gateway-timeout`. Every response carries `X-Timeout`.

pub mod config;
pub mod context;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod timeout;

pub use config::AppConfig;
pub use context::{CancelHandle, Context, ContextError, ContextLayer};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use timeout::{RequestTimeout, RequestTimeoutExt, RequestTimeoutLayer, TimeoutConfig};
