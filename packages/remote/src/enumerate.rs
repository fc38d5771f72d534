//! Resource discovery: `OPTIONS /` normalized into [`ResourceDescriptor`]s.

use maki_remote_api::{normalize_discovery, ResourceDescriptor};
use tracing::{info, warn};

use crate::config::is_truthy;
use crate::error::RemoteError;
use crate::remote::Remote;

impl Remote {
    /// Ask the remote what it offers.
    ///
    /// 1. Issues `OPTIONS /`.
    /// 2. A failed request, an empty body, or a falsy JSON body means
    ///    nothing was discovered: returns an empty list.
    /// 3. A body without a `resources` array, or with an entry that is not
    ///    an object or lacks a string `name`, is
    ///    [`RemoteError::MalformedDiscovery`]. Other fields are not checked.
    /// 4. Otherwise every entry is normalized (default `query`/`get`
    ///    components filled in) and returned in the remote's order.
    ///
    /// Nothing is cached; each call hits the network.
    pub async fn enumerate(&self) -> Result<Vec<ResourceDescriptor>, RemoteError> {
        let host = self.host().unwrap_or_default();

        let body = match self.options("/").await {
            Ok(Some(body)) if is_truthy(&body) => body,
            Ok(other) => {
                info!("remote: discovery on {host} returned nothing ({other:?})");
                return Ok(Vec::new());
            }
            Err(e) => {
                warn!("remote: discovery on {host} failed, treating as empty: {e}");
                return Ok(Vec::new());
            }
        };

        let resources = normalize_discovery(&body)?;
        info!(
            "remote: discovered {} resources on {host}",
            resources.len()
        );
        Ok(resources)
    }
}
