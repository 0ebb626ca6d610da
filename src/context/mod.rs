//! Request-scoped cancellation contexts.
//!
//! # Data Flow
//! ```text
//! ContextLayer (per request, cancelled when the request ends or is dropped)
//!     → RequestTimeout (child with deadline = now + timeout)
//!     → handler (awaits ctx.done() alongside its work)
//!     → RequestTimeout inspects ctx.err() after the handler returns
//! ```
//!
//! # Design Decisions
//! - Built on `tokio_util::sync::CancellationToken`; a child token observes its parent
//! - Deadlines are observed lazily (timer in `done()`, clock check in `err()`),
//!   so deriving a context never spawns a task
//! - A `CancelHandle` cancels its context when dropped

use std::convert::Infallible;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub mod layer;

pub use layer::{ContextLayer, ContextService};

/// Why a context ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// A cancellation signal with an optional deadline, shared by everything that works on
/// behalf of one request.
#[derive(Clone, Debug)]
pub struct Context {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    token: CancellationToken,
    deadline: Option<Instant>,
    /// Why and when this context was cancelled through its own handle.
    cause: OnceLock<(ContextError, Instant)>,
    parent: Option<Context>,
}

impl Context {
    /// Root context. Never cancelled, no deadline.
    pub fn background() -> Self {
        Self {
            inner: Arc::new(Inner {
                token: CancellationToken::new(),
                deadline: None,
                cause: OnceLock::new(),
                parent: None,
            }),
        }
    }

    /// Derive a child that ends when the handle is cancelled or the parent ends.
    pub fn with_cancel(&self) -> (Context, CancelHandle) {
        self.derive(self.inner.deadline)
    }

    /// Derive a child that additionally ends at `deadline`.
    ///
    /// The child never outlives its parent's deadline.
    pub fn with_deadline(&self, deadline: Instant) -> (Context, CancelHandle) {
        let deadline = match self.inner.deadline {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };
        self.derive(Some(deadline))
    }

    /// Derive a child that ends `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> (Context, CancelHandle) {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.with_cancel(),
        }
    }

    fn derive(&self, deadline: Option<Instant>) -> (Context, CancelHandle) {
        let child = Context {
            inner: Arc::new(Inner {
                token: self.inner.token.child_token(),
                deadline,
                cause: OnceLock::new(),
                parent: Some(self.clone()),
            }),
        };
        let handle = CancelHandle {
            context: child.clone(),
        };
        (child, handle)
    }

    /// The instant after which this context reports `DeadlineExceeded`.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// `None` while the context is live, otherwise the reason it ended.
    ///
    /// Once a context reports an error it keeps reporting the same one.
    pub fn err(&self) -> Option<ContextError> {
        if let Some((cause, _)) = self.inner.cause.get() {
            return Some(*cause);
        }

        if self.inner.token.is_cancelled() {
            // Cancelled through an ancestor. A deadline that passed first still wins.
            let at = self.ancestor_cancelled_at().unwrap_or_else(Instant::now);
            if self.deadline_passed(at) {
                return Some(ContextError::DeadlineExceeded);
            }
            let inherited = self.inner.parent.as_ref().and_then(Context::err);
            return Some(inherited.unwrap_or(ContextError::Canceled));
        }

        if self.deadline_passed(Instant::now()) {
            return Some(ContextError::DeadlineExceeded);
        }
        None
    }

    fn deadline_passed(&self, at: Instant) -> bool {
        self.inner.deadline.is_some_and(|deadline| deadline <= at)
    }

    /// When the nearest cancelled ancestor was cancelled.
    fn ancestor_cancelled_at(&self) -> Option<Instant> {
        self.inner.parent.as_ref().and_then(Context::cancelled_at)
    }

    fn cancelled_at(&self) -> Option<Instant> {
        match self.inner.cause.get() {
            Some((_, at)) => Some(*at),
            None => self.ancestor_cancelled_at(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) {
        match self.inner.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.inner.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.inner.token.cancelled().await,
        }
    }

    fn cancel(&self) {
        let at = if self.inner.token.is_cancelled() {
            self.ancestor_cancelled_at().unwrap_or_else(Instant::now)
        } else {
            Instant::now()
        };
        let cause = self.err().unwrap_or(ContextError::Canceled);
        let _ = self.inner.cause.set((cause, at));
        self.inner.token.cancel();
    }
}

impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Context>()
            .cloned()
            .unwrap_or_else(Context::background))
    }
}

/// Ends a derived context. Cancelling is idempotent and also happens on drop, so the
/// context is released on every exit path of whoever holds the handle.
#[derive(Debug)]
#[must_use = "dropping a CancelHandle cancels its context immediately"]
pub struct CancelHandle {
    context: Context,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.context.cancel();
    }
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        self.context.cancel();
    }
}
