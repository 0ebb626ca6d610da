//! Per-request root context.
//!
//! Attaches a cancellable [`Context`] to every request. The context is cancelled once
//! the response is produced, or earlier when the response future is dropped, which is
//! what hyper does when the client goes away.

use std::task::{Context as TaskContext, Poll};

use axum::http::Request;
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use super::Context;

#[derive(Debug, Clone, Copy, Default)]
pub struct ContextLayer;

impl ContextLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for ContextLayer {
    type Service = ContextService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ContextService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct ContextService<S> {
    inner: S,
}

impl<S, ReqBody> Service<Request<ReqBody>> for ContextService<S>
where
    S: Service<Request<ReqBody>>,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<S::Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        let parent = request
            .extensions()
            .get::<Context>()
            .cloned()
            .unwrap_or_else(Context::background);
        let (context, cancel) = parent.with_cancel();
        request.extensions_mut().insert(context);

        let future = self.inner.call(request);
        Box::pin(async move {
            let _cancel = cancel;
            future.await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextError;
    use std::convert::Infallible;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tower::{service_fn, ServiceExt};

    #[tokio::test]
    async fn test_context_cancelled_after_response() {
        let seen = Arc::new(Mutex::new(None));
        let captured = seen.clone();
        let service = ContextLayer::new().layer(service_fn(move |req: Request<()>| {
            let captured = captured.clone();
            async move {
                let ctx = req.extensions().get::<Context>().cloned();
                assert!(ctx.as_ref().is_some_and(|c| c.err().is_none()));
                *captured.lock().unwrap() = ctx;
                Ok::<_, Infallible>("ok")
            }
        }));

        let response = service.oneshot(Request::new(())).await.unwrap();
        assert_eq!(response, "ok");

        let ctx = seen.lock().unwrap().take().unwrap();
        assert_eq!(ctx.err(), Some(ContextError::Canceled));
    }

    #[tokio::test]
    async fn test_dropped_request_cancels_context() {
        let (tx, rx) = oneshot::channel();
        let tx = Arc::new(Mutex::new(Some(tx)));
        let service = ContextLayer::new().layer(service_fn(move |req: Request<()>| {
            let tx = tx.clone();
            async move {
                let ctx = req.extensions().get::<Context>().cloned().unwrap();
                if let Some(tx) = tx.lock().unwrap().take() {
                    let _ = tx.send(ctx);
                }
                std::future::pending::<()>().await;
                Ok::<_, Infallible>("unreachable")
            }
        }));

        let task = tokio::spawn(service.oneshot(Request::new(())));
        let ctx = rx.await.unwrap();
        assert!(ctx.err().is_none());

        task.abort();
        tokio::time::timeout(Duration::from_secs(1), ctx.done())
            .await
            .unwrap();
        assert_eq!(ctx.err(), Some(ContextError::Canceled));
    }

    #[tokio::test]
    async fn test_upstream_cancellation_reaches_handler() {
        let (upstream, cancel_upstream) = Context::background().with_cancel();
        let service = ContextLayer::new().layer(service_fn(|req: Request<()>| async move {
            let ctx = req.extensions().get::<Context>().cloned().unwrap();
            ctx.done().await;
            Ok::<_, Infallible>(ctx.err())
        }));

        let mut request = Request::new(());
        request.extensions_mut().insert(upstream.clone());

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cancel_upstream.cancel();
        });

        let cause = service.oneshot(request).await.unwrap();
        assert_eq!(cause, Some(ContextError::Canceled));
        assert_eq!(upstream.err(), Some(ContextError::Canceled));
    }
}
