//! Public surface for the `maki-remote` crate.
//!
//! A [`Remote`] stands in for one remote authority reachable over HTTP. It
//! discovers what the remote offers ([`Remote::enumerate`]) and exchanges
//! JSON with it through the five verbs (`get`, `put`, `post`, `patch`,
//! `options`).
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | [`RemoteConfig`]: host, scheme flag, pass-through extras |
//! | [`remote`] | [`Remote`] and the verb layer |
//! | [`enumerate`] | Resource discovery on `OPTIONS /` |
//! | [`causal`] | [`CausalState`]: identity, logical clock, operation stack, known peers |
//! | [`transport`] | The [`Transport`] seam and its `reqwest` implementation |
//! | [`observer`] | Structured request/response events |
//! | [`error`] | [`RemoteError`] and the [`Fetched`] result type |

pub mod causal;
pub mod config;
pub mod enumerate;
pub mod error;
pub mod observer;
pub mod remote;
pub mod transport;

pub use causal::{CausalState, Operation};
pub use config::RemoteConfig;
pub use error::{Fetched, RemoteError};
pub use maki_remote_api::{DiscoveryError, ResourceDescriptor};
pub use observer::{RequestObserver, TracingObserver};
pub use remote::Remote;
pub use transport::{Method, ReqwestTransport, Transport, TransportRequest, TransportResponse};
