//! [`Remote`] — the in-memory representative of one remote authority — and
//! its verb layer.
//!
//! Every verb builds `scheme://host + path`, sends it with
//! `Accept: application/json`, checks for a 2xx status and decodes the body
//! as JSON. Nothing is retried, cached or de-duplicated; concurrent calls on
//! the same node share only its immutable configuration.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::causal::CausalState;
use crate::config::RemoteConfig;
use crate::error::{Fetched, RemoteError};
use crate::observer::{FailureEvent, RequestEvent, RequestObserver, ResponseEvent, TracingObserver};
use crate::transport::{Method, ReqwestTransport, Transport, TransportRequest};

pub struct Remote {
    config: RemoteConfig,
    /// Fixed at construction; decides the scheme of every request.
    secure: bool,
    pub causal: CausalState,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn RequestObserver>,
}

impl fmt::Debug for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Remote")
            .field("config", &self.config)
            .field("secure", &self.secure)
            .field("causal", &self.causal)
            .finish_non_exhaustive()
    }
}

impl Remote {
    /// Create a node that talks through a fresh [`ReqwestTransport`].
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        Ok(Self::with_transport(config, Arc::new(ReqwestTransport::new()?)))
    }

    /// Create a node on top of an existing transport.
    pub fn with_transport(config: RemoteConfig, transport: Arc<dyn Transport>) -> Self {
        let secure = config.secure;
        Self {
            config,
            secure,
            causal: CausalState::new(),
            transport,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the default [`TracingObserver`].
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    pub fn host(&self) -> Option<&str> {
        self.config.host.as_deref().filter(|h| !h.is_empty())
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }

    /// `scheme://host` followed by `path` exactly as given; callers encode.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}://{}{}", self.scheme(), self.host().unwrap_or_default(), path)
    }

    // -----------------------------------------------------------------------
    // Verbs
    // -----------------------------------------------------------------------

    /// `GET path`.
    pub async fn get(&self, path: &str) -> Fetched {
        self.dispatch(Method::Get, path, None).await
    }

    /// `OPTIONS path`. On `/` this is the discovery request; see
    /// [`Remote::enumerate`] for the normalized form.
    pub async fn options(&self, path: &str) -> Fetched {
        self.dispatch(Method::Options, path, None).await
    }

    /// `PUT path` with `body` as JSON.
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Fetched {
        self.dispatch_with_body(Method::Put, path, body).await
    }

    /// `POST path` with `body` as JSON.
    ///
    /// A `303 See Other` answer is followed with `GET`; the caller sees only
    /// the final resource's body.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Fetched {
        self.dispatch_with_body(Method::Post, path, body).await
    }

    /// `PATCH path` with the partial representation `body` as JSON.
    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Fetched {
        self.dispatch_with_body(Method::Patch, path, body).await
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    async fn dispatch_with_body<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Fetched {
        match serde_json::to_value(body) {
            Ok(payload) => self.dispatch(method, path, Some(payload)).await,
            Err(e) => {
                let error = RemoteError::Encode(e);
                self.report_failure(method, path, &self.url_for(path), &error);
                Err(error)
            }
        }
    }

    async fn dispatch(&self, method: Method, path: &str, payload: Option<Value>) -> Fetched {
        let url = self.url_for(path);
        self.observer.on_request(&RequestEvent {
            method,
            path,
            url: &url,
            payload: payload.as_ref(),
        });

        let request = TransportRequest {
            method,
            url: url.clone(),
            payload,
            follow_303: method == Method::Post,
        };

        match self.exchange(request).await {
            Ok(body) => {
                self.observer.on_response(&ResponseEvent {
                    method,
                    path,
                    url: &url,
                    body: body.as_ref(),
                });
                Ok(body)
            }
            Err(error) => {
                self.report_failure(method, path, &url, &error);
                Err(error)
            }
        }
    }

    async fn exchange(&self, request: TransportRequest) -> Fetched {
        if self.host().is_none() {
            return Err(RemoteError::Config("remote has no host configured".into()));
        }

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(RemoteError::Status {
                status: response.status,
                url: response.url,
            });
        }
        decode_body(&response.body)
    }

    fn report_failure(&self, method: Method, path: &str, url: &str, error: &RemoteError) {
        self.observer.on_failure(&FailureEvent {
            method,
            path,
            url,
            error,
        });
    }
}

/// Empty or whitespace-only bodies decode to `None`.
pub(crate) fn decode_body(body: &[u8]) -> Fetched {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(RemoteError::Decode)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
