//! Discovery — the body a remote node answers to `OPTIONS /`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::resource::{merge_components, ResourceDescriptor};

/// Response body for `OPTIONS /`.
///
/// Remote nodes serialise this; clients should not deserialise it directly
/// but run the raw JSON through [`normalize_discovery`], which tolerates
/// partial descriptors and fills in default component bindings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoveryResponse {
    pub resources: Vec<ResourceDescriptor>,
}

/// Why a discovery body could not be normalized.
#[derive(Debug, Error, PartialEq)]
pub enum DiscoveryError {
    #[error("discovery response has no 'resources' array")]
    MissingResources,

    #[error("resource #{index} is invalid: {reason}")]
    InvalidResource { index: usize, reason: String },
}

/// Normalize a raw discovery body into descriptors, preserving order.
///
/// Each element keeps `name`, `description`, `routes`, `attributes` and
/// `names` as sent; `components` is merged over the defaults (see
/// [`merge_components`]). Any other field the remote includes is dropped.
/// Only an entry that is not an object, or has no string `name`, is
/// rejected.
pub fn normalize_discovery(body: &Value) -> Result<Vec<ResourceDescriptor>, DiscoveryError> {
    let resources = body
        .get("resources")
        .and_then(Value::as_array)
        .ok_or(DiscoveryError::MissingResources)?;

    resources
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            normalize_resource(raw)
                .map_err(|reason| DiscoveryError::InvalidResource { index, reason })
        })
        .collect()
}

fn normalize_resource(raw: &Value) -> Result<ResourceDescriptor, String> {
    let obj = raw.as_object().ok_or("not an object")?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or("missing string 'name'")?
        .to_string();

    // A `components` that is not an object contributes no bindings.
    let components = merge_components(obj.get("components").and_then(Value::as_object));

    Ok(ResourceDescriptor {
        name,
        description: obj.get("description").cloned(),
        components,
        routes: obj.get("routes").cloned(),
        attributes: obj.get("attributes").cloned(),
        names: obj.get("names").cloned(),
    })
}
