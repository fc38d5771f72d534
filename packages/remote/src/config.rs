//! Remote node configuration.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::RemoteError;

/// Connection parameters for one remote authority.
///
/// Built from a JSON configuration object (`{ "host": "...", "secure": true }`)
/// or from environment variables:
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `MAKI_REMOTE_HOST` | (absent) | `hostname[:port]` of the remote node |
/// | `MAKI_REMOTE_SECURE` | `false` | `1`, `true` or `yes` selects `https` |
///
/// A missing `host` is not rejected here; every request against such a node
/// fails at the transport instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// `hostname[:port]`, no scheme and no path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Any JSON truthy value selects `https`.
    #[serde(default, deserialize_with = "truthy")]
    pub secure: bool,

    /// Every other key of the configuration object, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RemoteConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Self::default()
        }
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Parse a configuration object. `None` and `null` mean "empty".
    pub fn from_value(value: Option<Value>) -> Result<Self, RemoteError> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(v @ Value::Object(_)) => {
                serde_json::from_value(v).map_err(|e| RemoteError::Config(e.to_string()))
            }
            Some(other) => Err(RemoteError::Config(format!(
                "expected a configuration object, got {other}"
            ))),
        }
    }

    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> Self {
        let secure = std::env::var("MAKI_REMOTE_SECURE")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            host: std::env::var("MAKI_REMOTE_HOST").ok().filter(|h| !h.is_empty()),
            secure,
            extra: Map::new(),
        }
    }
}

/// JSON truthiness: `null`, `false`, `0` and `""` are false, all else true.
pub(crate) fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(is_truthy(&Value::deserialize(d)?))
}
