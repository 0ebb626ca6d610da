//! Accessors for the values the middleware attaches to a request.

use axum::http::request::Parts;
use axum::http::Request;

use super::TimeoutConfig;
use crate::context::Context;

/// Read the timeout config and deadline context from a request.
pub trait RequestTimeoutExt {
    fn timeout_config(&self) -> Option<&TimeoutConfig>;
    fn context(&self) -> Option<&Context>;
}

impl<B> RequestTimeoutExt for Request<B> {
    fn timeout_config(&self) -> Option<&TimeoutConfig> {
        self.extensions().get::<TimeoutConfig>()
    }

    fn context(&self) -> Option<&Context> {
        self.extensions().get::<Context>()
    }
}

impl RequestTimeoutExt for Parts {
    fn timeout_config(&self) -> Option<&TimeoutConfig> {
        self.extensions.get::<TimeoutConfig>()
    }

    fn context(&self) -> Option<&Context> {
        self.extensions.get::<Context>()
    }
}
