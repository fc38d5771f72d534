//! Resource descriptors — one entry of a discovery response.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role name of the component that answers collection queries.
pub const QUERY_ROLE: &str = "query";

/// Role name of the component that answers single-entity reads.
pub const GET_ROLE: &str = "get";

/// Bound to [`QUERY_ROLE`] when the remote does not name one.
pub const DEFAULT_QUERY_COMPONENT: &str = "maki-resource-query";

/// Bound to [`GET_ROLE`] when the remote does not name one.
pub const DEFAULT_GET_COMPONENT: &str = "maki-resource-get";

/// Mapping from role name to implementation identifier.
///
/// Defaults are strings; whatever the remote binds is kept as sent.
pub type Components = BTreeMap<String, Value>;

/// One capability a remote node exposes.
///
/// `description`, `routes`, `attributes` and `names` are carried verbatim,
/// an explicit `null` included; nothing here looks inside them.
///
/// # Example
///
/// ```json
/// {
///   "name": "Person",
///   "description": "Somebody we know.",
///   "components": { "query": "maki-resource-query", "get": "person-view" },
///   "routes": { "query": "/people", "get": "/people/:id" },
///   "attributes": { "name": { "type": "String" } },
///   "names": { "plural": "People" }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceDescriptor {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,

    /// Always contains [`QUERY_ROLE`] and [`GET_ROLE`] once normalized.
    #[serde(default)]
    pub components: Components,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<Value>,
}

impl ResourceDescriptor {
    /// A descriptor carrying only `name` and the default component bindings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            components: merge_components(None),
            routes: None,
            attributes: None,
            names: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Value::String(description.into()));
        self
    }

    /// Bind `role` to `component`, replacing any existing binding.
    pub fn with_component(mut self, role: impl Into<String>, component: impl Into<Value>) -> Self {
        self.components.insert(role.into(), component.into());
        self
    }

    /// The component bound to `role`, when that binding is a plain identifier.
    pub fn component(&self, role: &str) -> Option<&str> {
        self.components.get(role).and_then(Value::as_str)
    }

    /// `description` when the remote sent a string.
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_ref().and_then(Value::as_str)
    }
}

/// Shallow-merge the remote's component bindings over the defaults.
///
/// Keys the remote supplies win, whatever their value; [`QUERY_ROLE`] and
/// [`GET_ROLE`] survive when the remote leaves them out; any other role
/// passes through unchanged.
pub fn merge_components(remote: Option<&Map<String, Value>>) -> Components {
    let mut merged = Components::new();
    merged.insert(QUERY_ROLE.into(), DEFAULT_QUERY_COMPONENT.into());
    merged.insert(GET_ROLE.into(), DEFAULT_GET_COMPONENT.into());

    for (role, component) in remote.into_iter().flatten() {
        merged.insert(role.clone(), component.clone());
    }
    merged
}
