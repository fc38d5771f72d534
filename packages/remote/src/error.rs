//! Error type shared by the verb layer and discovery.

use maki_remote_api::DiscoveryError;
use serde_json::Value;

/// Outcome of one verb call.
///
/// - `Ok(Some(v))` — the remote answered with JSON `v`.
/// - `Ok(None)` — the remote answered 2xx with an empty body.
/// - `Err(e)` — the exchange failed; `e` says why.
///
/// Failures are also reported to the node's observer before being returned.
pub type Fetched = Result<Option<Value>, RemoteError>;

/// Errors a [`Remote`](crate::Remote) can report.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Connection, DNS, TLS, or malformed-URL failure inside the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with a non-2xx status.
    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },

    /// The response body was not valid JSON.
    #[error("invalid JSON in response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request body could not be turned into JSON.
    #[error("request body is not serialisable: {0}")]
    Encode(#[source] serde_json::Error),

    /// A `303 See Other` without a usable `Location` header.
    #[error("invalid redirect: {0}")]
    InvalidRedirect(String),

    #[error("gave up after {0} redirects")]
    TooManyRedirects(usize),

    /// The discovery body did not carry a `resources` array.
    #[error("malformed discovery response: {0}")]
    MalformedDiscovery(#[from] DiscoveryError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RemoteError {
    /// HTTP status code, when the failure was a non-2xx answer.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Status { status, .. } => Some(*status),
            RemoteError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
