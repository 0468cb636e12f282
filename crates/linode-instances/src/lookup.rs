//! Instance lookup helpers built on [`InstanceOperations`].

use crate::client::InstanceOperations;
use crate::models::Instance;
use crate::Result;
use linode_core::pagination::ListOptions;
use linode_core::RequestContext;
use serde_json::json;
use tracing::debug;

/// Find the instance whose label is exactly `label`.
///
/// The label is sent as a server-side filter, but the result is matched again
/// locally since filters are advisory. Returns `Ok(None)` when nothing
/// matches.
///
/// # Errors
///
/// Returns any error raised while listing.
pub async fn find_instance_by_label<O>(
    ops: &O,
    ctx: &RequestContext,
    label: &str,
) -> Result<Option<Instance>>
where
    O: InstanceOperations + ?Sized,
{
    let opts = ListOptions::new().with_filter(json!({ "label": label }).to_string());
    let instances = ops.list(ctx, &opts).await?;

    let found = instances.into_iter().find(|i| i.label == label);
    debug!(label, found = found.is_some(), "Looked up instance by label");
    Ok(found)
}
