//! Wire types for talking to a remote Maki node.
//!
//! This crate has **no I/O**. It encodes the shape of what a remote node
//! advertises during discovery and the normalization every client applies
//! before handing descriptors to application code.
//!
//! # Endpoints covered
//!
//! | Method | Path | Type |
//! |--------|------|------|
//! | OPTIONS | `/` | → [`DiscoveryResponse`], normalized via [`normalize_discovery`] |
//! | GET / PUT / POST / PATCH | any resource path | arbitrary JSON |

pub mod discovery;
pub mod resource;

pub use discovery::{normalize_discovery, DiscoveryError, DiscoveryResponse};
pub use resource::{
    merge_components, Components, ResourceDescriptor, DEFAULT_GET_COMPONENT,
    DEFAULT_QUERY_COMPONENT, GET_ROLE, QUERY_ROLE,
};
