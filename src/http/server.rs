//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router with the demo handlers
//! - Wire up middleware (tracing, request context, request timeout)
//! - Serve on a listener until shutdown

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::context::ContextLayer;
use crate::http::handlers;
use crate::lifecycle::Shutdown;
use crate::timeout::RequestTimeoutLayer;

/// HTTP server exposing the timeout-bounded demo routes.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    pub fn new(config: AppConfig) -> Self {
        let router = Self::build_router(&config);
        Self { router, config }
    }

    /// Build the axum router with all middleware layers.
    fn build_router(config: &AppConfig) -> Router {
        Router::new()
            .route("/", get(handlers::work))
            .route("/work/{millis}", get(handlers::work_for))
            .with_state(config.demo.clone())
            .layer(RequestTimeoutLayer::from_config(config.timeout))
            .layer(ContextLayer::new())
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            timeout = %self.config.timeout.effective().duration_text(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
