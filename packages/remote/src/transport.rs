//! The HTTP seam between a [`Remote`](crate::Remote) and the network.
//!
//! [`Transport`] is the only place bytes cross the wire. [`ReqwestTransport`]
//! is the production implementation; tests substitute their own to observe
//! exactly what would have been sent.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{
    header::{ACCEPT, LOCATION},
    redirect::Policy,
    Client, StatusCode, Url,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::RemoteError;

/// Media type sent in `Accept` on every request.
pub const CONTENT_TYPE: &str = "application/json";

/// Upper bound on consecutive `303 See Other` hops followed for one `POST`.
pub const MAX_REDIRECTS: usize = 10;

// ---------------------------------------------------------------------------
// Method
// ---------------------------------------------------------------------------

/// The verbs a remote node understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Put,
    Post,
    Patch,
    Options,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Options => reqwest::Method::OPTIONS,
        }
    }
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// One outbound request, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,

    /// Absolute URL, `scheme://host/path`.
    pub url: String,

    /// JSON body; `None` sends no body at all.
    pub payload: Option<Value>,

    /// Re-issue as `GET` when the remote answers `303 See Other`.
    pub follow_303: bool,
}

/// The raw answer, before status checking and JSON decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,

    /// URL that produced this response (differs from the request URL after
    /// a followed redirect).
    pub url: String,

    pub body: Bytes,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a [`TransportRequest`] and returns whatever came back.
///
/// Implementations report connection-level failures as `Err`; any HTTP
/// status, including errors, is a successful exchange at this layer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, RemoteError>;
}

// ---------------------------------------------------------------------------
// ReqwestTransport
// ---------------------------------------------------------------------------

/// [`Transport`] backed by a pooled [`reqwest::Client`].
///
/// Automatic redirects are disabled on the client; `303 See Other` is
/// followed by hand, and only for requests that ask for it.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a client with redirects disabled and no request timeout.
    pub fn new() -> Result<Self, RemoteError> {
        let client = Client::builder().redirect(Policy::none()).build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client. It should be built with
    /// `redirect(Policy::none())`, or verbs other than `POST` will follow
    /// redirects too.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, RemoteError> {
        let TransportRequest {
            mut method,
            mut url,
            mut payload,
            follow_303,
        } = request;
        let mut hops = 0;

        loop {
            let mut builder = self
                .client
                .request(method.into(), &url)
                .header(ACCEPT, CONTENT_TYPE);
            if let Some(ref body) = payload {
                builder = builder.json(body);
            }

            let response = builder.send().await?;
            let status = response.status();

            if follow_303 && status == StatusCode::SEE_OTHER {
                if hops == MAX_REDIRECTS {
                    return Err(RemoteError::TooManyRedirects(MAX_REDIRECTS));
                }
                let next = redirect_target(&url, response.headers().get(LOCATION))?;
                debug!("remote: {method} {url} answered 303, fetching {next}");
                url = next;
                method = Method::Get;
                payload = None;
                hops += 1;
                continue;
            }

            let body = response.bytes().await?;
            return Ok(TransportResponse {
                status: status.as_u16(),
                url,
                body,
            });
        }
    }
}

/// Resolve a `Location` header against the URL that produced it.
fn redirect_target(
    base: &str,
    location: Option<&reqwest::header::HeaderValue>,
) -> Result<String, RemoteError> {
    let location = location
        .ok_or_else(|| RemoteError::InvalidRedirect(format!("303 from {base} has no Location")))?
        .to_str()
        .map_err(|e| RemoteError::InvalidRedirect(e.to_string()))?;

    let base = Url::parse(base).map_err(|e| RemoteError::InvalidRedirect(e.to_string()))?;
    base.join(location)
        .map(String::from)
        .map_err(|e| RemoteError::InvalidRedirect(format!("{location}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn method_names() {
        assert_eq!(Method::Options.to_string(), "OPTIONS");
        assert_eq!(reqwest::Method::from(Method::Patch), reqwest::Method::PATCH);
        assert_eq!(serde_json::to_string(&Method::Get).unwrap(), r#""GET""#);
    }

    #[test]
    fn relative_location_resolves_against_request_url() {
        let loc = HeaderValue::from_static("/people/7");
        assert_eq!(
            redirect_target("http://node.local:3000/people", Some(&loc)).unwrap(),
            "http://node.local:3000/people/7"
        );
    }

    #[test]
    fn absolute_location_is_kept() {
        let loc = HeaderValue::from_static("https://other.local/x");
        assert_eq!(
            redirect_target("http://node.local/people", Some(&loc)).unwrap(),
            "https://other.local/x"
        );
    }

    #[test]
    fn missing_location_is_an_invalid_redirect() {
        assert!(matches!(
            redirect_target("http://node.local/people", None),
            Err(RemoteError::InvalidRedirect(_))
        ));
    }

    #[test]
    fn success_range() {
        let ok = TransportResponse {
            status: 204,
            url: "http://h/".into(),
            body: Bytes::new(),
        };
        assert!(ok.is_success());
        assert!(!TransportResponse { status: 303, ..ok }.is_success());
    }
}
