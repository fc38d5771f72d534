//! Structured trace of request/response pairs.
//!
//! Each [`Remote`](crate::Remote) holds one [`RequestObserver`]. The verb
//! layer reports every exchange through it instead of printing. The default,
//! [`TracingObserver`], turns events into `tracing` records.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::RemoteError;
use crate::transport::Method;

/// Emitted just before a request leaves.
#[derive(Debug, Clone, Copy)]
pub struct RequestEvent<'a> {
    pub method: Method,
    pub path: &'a str,
    pub url: &'a str,
    pub payload: Option<&'a Value>,
}

/// Emitted after a 2xx answer has been decoded.
#[derive(Debug, Clone, Copy)]
pub struct ResponseEvent<'a> {
    pub method: Method,
    pub path: &'a str,
    pub url: &'a str,
    /// `None` for an empty body.
    pub body: Option<&'a Value>,
}

/// Emitted when the exchange failed for any reason.
#[derive(Debug, Clone, Copy)]
pub struct FailureEvent<'a> {
    pub method: Method,
    pub path: &'a str,
    pub url: &'a str,
    pub error: &'a RemoteError,
}

/// Receives the events of every verb call made by a node.
///
/// Implementations must be cheap and must not block; they run inline on the
/// caller's task.
pub trait RequestObserver: Send + Sync {
    fn on_request(&self, _event: &RequestEvent<'_>) {}
    fn on_response(&self, _event: &ResponseEvent<'_>) {}
    fn on_failure(&self, _event: &FailureEvent<'_>) {}
}

/// Logs requests and responses at `debug`, failures at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn on_request(&self, e: &RequestEvent<'_>) {
        debug!(
            method = %e.method,
            path = e.path,
            url = e.url,
            payload = ?e.payload,
            "remote: request"
        );
    }

    fn on_response(&self, e: &ResponseEvent<'_>) {
        debug!(
            method = %e.method,
            path = e.path,
            body = ?e.body,
            "remote: response"
        );
    }

    fn on_failure(&self, e: &FailureEvent<'_>) {
        warn!(
            method = %e.method,
            url = e.url,
            status = ?e.error.status(),
            "remote: {} {} failed: {}",
            e.method,
            e.path,
            e.error
        );
    }
}
