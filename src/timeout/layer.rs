//! Timeout layer and service.

use std::task::{Context as TaskContext, Poll};

use axum::http::header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use axum::http::{HeaderValue, Request, Response, StatusCode};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use super::{TimeoutConfig, GATEWAY_TIMEOUT_BODY, TIMEOUT_KEY, X_TIMEOUT};
use crate::context::{Context, ContextError};

/// Builds [`RequestTimeout`] services.
///
/// ```ignore
/// let layer = RequestTimeoutLayer::new().with(|c| c.duration = Duration::from_secs(5));
/// let app = Router::new().route("/", get(handler)).layer(layer);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestTimeoutLayer {
    config: TimeoutConfig,
}

impl RequestTimeoutLayer {
    /// Layer with the default 30 second timeout.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: TimeoutConfig) -> Self {
        Self { config }
    }

    /// Apply option mutators in order. Values are not checked here; a zero timeout is
    /// replaced by the default when a service is built.
    pub fn options<I>(mut self, options: I) -> Self
    where
        I: IntoIterator,
        I::Item: FnOnce(&mut TimeoutConfig),
    {
        for option in options {
            option(&mut self.config);
        }
        self
    }

    /// Apply a single option mutator.
    pub fn with<F>(self, option: F) -> Self
    where
        F: FnOnce(&mut TimeoutConfig),
    {
        self.options([option])
    }

    /// The config as set by the options, before defaulting.
    pub fn config(&self) -> &TimeoutConfig {
        &self.config
    }

    /// Wrap `next` so its processing is bounded by the configured timeout.
    pub fn handler<S>(&self, next: S) -> RequestTimeout<S> {
        let config = self.config.effective();
        // `µs` needs from_bytes; from_str only takes visible ASCII.
        let header = HeaderValue::from_bytes(config.duration_text().as_bytes())
            .unwrap_or_else(|_| HeaderValue::from_static("30s"));

        RequestTimeout {
            inner: next,
            config,
            header,
        }
    }
}

impl<S> Layer<S> for RequestTimeoutLayer {
    type Service = RequestTimeout<S>;

    fn layer(&self, inner: S) -> Self::Service {
        self.handler(inner)
    }
}

/// Service bounding the processing time of `S`.
#[derive(Debug, Clone)]
pub struct RequestTimeout<S> {
    inner: S,
    config: TimeoutConfig,
    header: HeaderValue,
}

impl<S> RequestTimeout<S> {
    /// The enforced config.
    pub fn config(&self) -> &TimeoutConfig {
        &self.config
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestTimeout<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    ResBody: From<&'static str>,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        let config = self.config;
        let header = self.header.clone();

        request.extensions_mut().insert(config);
        tracing::debug!(key = TIMEOUT_KEY, value = ?config, "Middleware");

        let parent = request
            .extensions()
            .get::<Context>()
            .cloned()
            .unwrap_or_else(Context::background);
        let (context, cancel) = parent.with_timeout(config.duration);
        request.extensions_mut().insert(context.clone());

        let future = self.inner.call(request);

        Box::pin(async move {
            let result = future.await;
            cancel.cancel();
            let response = result?;

            let mut response = match context.err() {
                Some(ContextError::DeadlineExceeded) => {
                    // Replaces whatever the downstream produced.
                    tracing::warn!(timeout = %config.duration_text(), "Request deadline exceeded");
                    gateway_timeout()
                }
                _ => {
                    if let Some(cause) = parent.err() {
                        tracing::debug!(%cause, "Request context ended before its deadline");
                    }
                    response
                }
            };

            response.headers_mut().insert(X_TIMEOUT, header);
            Ok(response)
        })
    }
}

fn gateway_timeout<B>() -> Response<B>
where
    B: From<&'static str>,
{
    let mut response = Response::new(B::from(GATEWAY_TIMEOUT_BODY));
    *response.status_mut() = StatusCode::GATEWAY_TIMEOUT;
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}
