//! Request timeout middleware.
//!
//! # Data Flow
//! ```text
//! RequestTimeoutLayer::new().options(..)      (config, defaults to 30s)
//!     → handler(next) / Layer::layer(next)    (zero timeout coerced to 30s)
//!     → RequestTimeout::call
//!         → attach TimeoutConfig + deadline Context to the request
//!         → next.call(request)                (same task, never preempted)
//!         → cancel the deadline context
//!         → deadline exceeded? 504 gateway-timeout : downstream response
//!         → X-Timeout header on either response
//! ```
//!
//! # Design Decisions
//! - Cooperative: downstream handlers stop by observing `Context::done()`
//! - The deadline check happens after the downstream returns, so a late downstream
//!   response is replaced by the 504
//! - Typed request extensions instead of string-keyed values

use axum::http::HeaderName;

pub mod config;
pub mod ext;
pub mod layer;

pub use config::{format_duration, TimeoutConfig, DEFAULT_TIMEOUT};
pub use ext::RequestTimeoutExt;
pub use layer::{RequestTimeout, RequestTimeoutLayer};

/// Response header carrying the effective timeout.
pub const X_TIMEOUT: HeaderName = HeaderName::from_static("x-timeout");

/// Field name under which the timeout config is logged.
pub const TIMEOUT_KEY: &str = "timeout";

/// Body of the response written when the deadline is exceeded, newline-terminated
/// like any plain-text HTTP error body.
pub const GATEWAY_TIMEOUT_BODY: &str = "gateway-timeout\n";
