//! Asynchronous instance lifecycle client.
//!
//! Action calls (boot, reboot, shutdown, resize, mutate) return `true` once
//! the provider has accepted the request. They do not wait for the status
//! transition; poll [`InstancesClient::get_instance`] for that.

use crate::models::{
    CloneInstanceOptions, ConfigSelection, CreateInstanceOptions, Instance, InstancesPage,
    RebuildInstanceOptions, ResizeRequest, UpdateInstanceOptions,
};
use crate::Result;
use async_trait::async_trait;
use linode_core::pagination::{fetch_all, ListOptions};
use linode_core::{ApiRequest, Error, LinodeClient, LinodeClientConfig, RequestContext, ResourceKind};
use tracing::info;
use url::Url;
use validator::Validate;

/// Client for the compute instances collection.
///
/// Holds no state beyond the shared transport handle, so clones are cheap and
/// can be used concurrently against different instances.
#[derive(Debug, Clone)]
pub struct InstancesClient {
    inner: LinodeClient,
}

impl InstancesClient {
    /// Wrap an existing transport handle.
    #[must_use]
    pub fn new(inner: LinodeClient) -> Self {
        Self { inner }
    }

    /// Build a transport from configuration and wrap it.
    pub fn from_config(config: LinodeClientConfig) -> Result<Self> {
        Ok(Self::new(LinodeClient::new(config)?))
    }

    /// List instances, walking every page unless `opts.page` is set.
    pub async fn list_instances(
        &self,
        ctx: &RequestContext,
        opts: &ListOptions,
    ) -> Result<Vec<Instance>> {
        fetch_all::<InstancesPage>(&self.inner, ctx, opts).await
    }

    /// Fetch a single instance.
    pub async fn get_instance(&self, ctx: &RequestContext, id: u64) -> Result<Instance> {
        let url = self.item_url(id)?;
        self.inner.fetch(ctx, ApiRequest::get(url)).await
    }

    /// Create an instance. Never retried: creation is not idempotent.
    pub async fn create_instance(
        &self,
        ctx: &RequestContext,
        opts: &CreateInstanceOptions,
    ) -> Result<Instance> {
        opts.validate()?;
        let url = self.inner.endpoints().resolve(ResourceKind::Instances)?;
        let instance: Instance = self
            .inner
            .fetch(ctx, ApiRequest::post(url).with_json(opts)?)
            .await?;

        info!(id = instance.id, region = %instance.region, "Created instance");
        Ok(instance)
    }

    /// Update the fields present in `opts`.
    pub async fn update_instance(
        &self,
        ctx: &RequestContext,
        id: u64,
        opts: &UpdateInstanceOptions,
    ) -> Result<Instance> {
        let url = self.item_url(id)?;
        self.inner
            .fetch(ctx, ApiRequest::put(url).with_json(opts)?)
            .await
    }

    /// Change only the label.
    pub async fn rename_instance(
        &self,
        ctx: &RequestContext,
        id: u64,
        label: &str,
    ) -> Result<Instance> {
        self.update_instance(ctx, id, &UpdateInstanceOptions::label(label))
            .await
    }

    /// Delete an instance. The id must not be used again afterwards.
    pub async fn delete_instance(&self, ctx: &RequestContext, id: u64) -> Result<()> {
        let url = self.item_url(id)?;
        self.inner.fetch_empty(ctx, ApiRequest::delete(url)).await?;
        info!(id, "Deleted instance");
        Ok(())
    }

    /// Boot an instance.
    ///
    /// `None` (or `Some(0)`) lets the provider pick the most recent config and
    /// sends no body at all.
    pub async fn boot_instance(
        &self,
        ctx: &RequestContext,
        id: u64,
        config_id: Option<u64>,
    ) -> Result<bool> {
        let mut request = ApiRequest::post(self.action_url(id, "boot")?);
        if let Some(config_id) = config_id.filter(|c| *c != 0) {
            request = request.with_json(&ConfigSelection { config_id })?;
        }
        self.accept(ctx, id, "boot", request).await
    }

    /// Reboot an instance.
    ///
    /// Unlike boot, a `{}` body is sent when no config is chosen. Kept for
    /// wire compatibility; the difference looks accidental upstream.
    pub async fn reboot_instance(
        &self,
        ctx: &RequestContext,
        id: u64,
        config_id: Option<u64>,
    ) -> Result<bool> {
        let request = ApiRequest::post(self.action_url(id, "reboot")?);
        let request = match config_id.filter(|c| *c != 0) {
            Some(config_id) => request.with_json(&ConfigSelection { config_id })?,
            None => request.with_json(&serde_json::Map::new())?,
        };
        self.accept(ctx, id, "reboot", request).await
    }

    /// Shut an instance down.
    pub async fn shutdown_instance(&self, ctx: &RequestContext, id: u64) -> Result<bool> {
        let request = ApiRequest::post(self.action_url(id, "shutdown")?);
        self.accept(ctx, id, "shutdown", request).await
    }

    /// Move an instance to a different type.
    pub async fn resize_instance(
        &self,
        ctx: &RequestContext,
        id: u64,
        instance_type: &str,
    ) -> Result<bool> {
        if instance_type.trim().is_empty() {
            return Err(Error::Validation("type is required".to_string()));
        }
        let request = ApiRequest::post(self.action_url(id, "resize")?)
            .with_json(&ResizeRequest { instance_type })?;
        self.accept(ctx, id, "resize", request).await
    }

    /// Clone an instance; returns the new instance.
    pub async fn clone_instance(
        &self,
        ctx: &RequestContext,
        id: u64,
        opts: &CloneInstanceOptions,
    ) -> Result<Instance> {
        opts.validate()?;
        let url = self.action_url(id, "clone")?;
        let clone: Instance = self
            .inner
            .fetch(ctx, ApiRequest::post(url).with_json(opts)?)
            .await?;

        info!(source = id, id = clone.id, "Cloned instance");
        Ok(clone)
    }

    /// Delete all disks and configs and redeploy from an image.
    pub async fn rebuild_instance(
        &self,
        ctx: &RequestContext,
        id: u64,
        opts: &RebuildInstanceOptions,
    ) -> Result<Instance> {
        opts.validate()?;
        let url = self.action_url(id, "rebuild")?;
        let instance: Instance = self
            .inner
            .fetch(ctx, ApiRequest::post(url).with_json(opts)?)
            .await?;

        info!(id, image = %opts.image, "Rebuilding instance");
        Ok(instance)
    }

    /// Upgrade an instance to its next hardware generation.
    pub async fn mutate_instance(&self, ctx: &RequestContext, id: u64) -> Result<bool> {
        let request = ApiRequest::post(self.action_url(id, "mutate")?);
        self.accept(ctx, id, "mutate", request).await
    }

    async fn accept(
        &self,
        ctx: &RequestContext,
        id: u64,
        action: &'static str,
        request: ApiRequest,
    ) -> Result<bool> {
        self.inner.fetch_empty(ctx, request).await?;
        info!(id, action, "Instance action accepted");
        Ok(true)
    }

    fn item_url(&self, id: u64) -> Result<Url> {
        self.inner.endpoints().item(ResourceKind::Instances, id)
    }

    fn action_url(&self, id: u64, action: &str) -> Result<Url> {
        self.inner
            .endpoints()
            .action(ResourceKind::Instances, id, action)
    }
}

/// Instance operations consumed by higher layers such as volume
/// orchestration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InstanceOperations: Send + Sync {
    /// See [`InstancesClient::list_instances`].
    async fn list(&self, ctx: &RequestContext, opts: &ListOptions) -> Result<Vec<Instance>>;

    /// See [`InstancesClient::get_instance`].
    async fn get(&self, ctx: &RequestContext, id: u64) -> Result<Instance>;

    /// See [`InstancesClient::create_instance`].
    async fn create(&self, ctx: &RequestContext, opts: &CreateInstanceOptions) -> Result<Instance>;

    /// See [`InstancesClient::delete_instance`].
    async fn delete(&self, ctx: &RequestContext, id: u64) -> Result<()>;
}

#[async_trait]
impl InstanceOperations for InstancesClient {
    async fn list(&self, ctx: &RequestContext, opts: &ListOptions) -> Result<Vec<Instance>> {
        self.list_instances(ctx, opts).await
    }

    async fn get(&self, ctx: &RequestContext, id: u64) -> Result<Instance> {
        self.get_instance(ctx, id).await
    }

    async fn create(&self, ctx: &RequestContext, opts: &CreateInstanceOptions) -> Result<Instance> {
        self.create_instance(ctx, opts).await
    }

    async fn delete(&self, ctx: &RequestContext, id: u64) -> Result<()> {
        self.delete_instance(ctx, id).await
    }
}
