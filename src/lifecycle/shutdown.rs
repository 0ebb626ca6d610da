//! Server stop signal.

use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Stops running servers. Clones share one signal; any clone can fire it.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the signal. Servers stop accepting and drain in-flight requests.
    pub fn trigger(&self) {
        if !self.token.is_cancelled() {
            tracing::info!("Shutdown triggered");
        }
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Future resolving once the signal fires, usable as a graceful-shutdown trigger.
    pub fn signal(&self) -> impl Future<Output = ()> + Send + 'static {
        let token = self.token.clone();
        async move { token.cancelled().await }
    }
}
