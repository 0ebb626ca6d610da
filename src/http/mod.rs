//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, middleware stack)
//!     → TraceLayer → ContextLayer → RequestTimeoutLayer
//!     → handlers.rs (simulated work observing the request context)
//!     → Send to client
//! ```

pub mod handlers;
pub mod server;

pub use server::HttpServer;
