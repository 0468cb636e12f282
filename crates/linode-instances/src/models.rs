//! Instance models and request payloads.

use linode_core::dates::Timestamp;
use linode_core::pagination::{decode_json, Page, PageMeta, PageShape};
use linode_core::{Endpoints, ResourceKind, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;
use url::Url;
use validator::Validate;

/// Lifecycle status reported by the provider.
///
/// The provider owns this value; the client never computes it. Statuses this
/// crate does not know are kept verbatim in [`InstanceStatus::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceStatus {
    /// Being created
    Provisioning,
    /// Powering on
    Booting,
    /// Powered on
    Running,
    /// Powering off
    ShuttingDown,
    /// Powered off
    Offline,
    /// Restarting
    Rebooting,
    /// Moving between hosts or data centers
    Migrating,
    /// Being copied to another instance
    Cloning,
    /// Restoring from a backup
    Restoring,
    /// Redeploying from an image
    Rebuilding,
    /// Upgrading to the next hardware generation
    Mutating,
    /// Being removed
    Deleting,
    /// A status this client does not recognise
    Unknown(String),
}

impl InstanceStatus {
    /// Wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Provisioning => "provisioning",
            Self::Booting => "booting",
            Self::Running => "running",
            Self::ShuttingDown => "shutting_down",
            Self::Offline => "offline",
            Self::Rebooting => "rebooting",
            Self::Migrating => "migrating",
            Self::Cloning => "cloning",
            Self::Restoring => "restoring",
            Self::Rebuilding => "rebuilding",
            Self::Mutating => "mutating",
            Self::Deleting => "deleting",
            Self::Unknown(other) => other,
        }
    }

    /// `running` and `offline` are the only states the provider does not
    /// leave on its own.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Running | Self::Offline)
    }

    /// Any state the provider is expected to exit without further calls.
    /// Unknown statuses count as transient.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        !self.is_settled()
    }
}

impl From<String> for InstanceStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "provisioning" => Self::Provisioning,
            "booting" => Self::Booting,
            "running" => Self::Running,
            "shutting_down" => Self::ShuttingDown,
            "offline" => Self::Offline,
            "rebooting" => Self::Rebooting,
            "migrating" => Self::Migrating,
            "cloning" => Self::Cloning,
            "restoring" => Self::Restoring,
            "rebuilding" => Self::Rebuilding,
            "mutating" => Self::Mutating,
            "deleting" => Self::Deleting,
            _ => Self::Unknown(value),
        }
    }
}

impl From<InstanceStatus> for String {
    fn from(status: InstanceStatus) -> Self {
        match status {
            InstanceStatus::Unknown(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hardware allocation of an instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpec {
    /// Disk in MB.
    #[serde(default)]
    pub disk: u32,
    /// Memory in MB.
    #[serde(default)]
    pub memory: u32,
    /// vCPU count.
    #[serde(default)]
    pub vcpus: u32,
    /// Monthly network transfer quota in GB.
    #[serde(default)]
    pub transfer: u32,
}

/// Alert thresholds, as integer percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceAlert {
    /// CPU usage.
    #[serde(default)]
    pub cpu: u32,
    /// Disk IO.
    #[serde(default)]
    pub io: u32,
    /// Inbound network traffic.
    #[serde(default)]
    pub network_in: u32,
    /// Outbound network traffic.
    #[serde(default)]
    pub network_out: u32,
    /// Transfer quota usage.
    #[serde(default, alias = "transfer_queue")]
    pub transfer_quota: u32,
}

/// Backup schedule window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSchedule {
    /// Day of week.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    /// Two-hour window, e.g. `W10`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,
}

/// Backup policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceBackup {
    /// Whether backups are enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Schedule window.
    #[serde(default)]
    pub schedule: BackupSchedule,
}

/// A compute instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Provider-assigned identifier.
    pub id: u64,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Region identifier.
    #[serde(default)]
    pub region: String,
    /// Instance type (plan).
    #[serde(default, rename = "type")]
    pub instance_type: String,
    /// Lifecycle status.
    pub status: InstanceStatus,
    /// Image the instance was deployed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Display group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Hypervisor name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hypervisor: Option<String>,
    /// Hardware allocation.
    #[serde(default)]
    pub specs: InstanceSpec,
    /// Alert thresholds.
    #[serde(default)]
    pub alerts: InstanceAlert,
    /// Backup policy.
    #[serde(default)]
    pub backups: InstanceBackup,
    /// IPv4 addresses.
    #[serde(default)]
    pub ipv4: Vec<Ipv4Addr>,
    /// IPv6 SLAAC address with prefix length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<String>,
    /// Creation time.
    #[serde(default)]
    pub created: Timestamp,
    /// Last update time.
    #[serde(default)]
    pub updated: Timestamp,
}

/// One page of the instances collection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct InstancesPage(pub Page<Instance>);

impl PageShape for InstancesPage {
    type Item = Instance;

    fn endpoint(endpoints: &Endpoints) -> Result<Url> {
        endpoints.resolve(ResourceKind::Instances)
    }

    fn decode(body: &[u8]) -> Result<Self> {
        decode_json(body)
    }

    fn meta(&self) -> PageMeta {
        self.0.meta
    }

    fn len(&self) -> usize {
        self.0.data.len()
    }

    fn append(&mut self, next: Self) {
        self.0.data.extend(next.0.data);
    }

    fn into_items(self) -> Vec<Instance> {
        self.0.data
    }
}

/// Payload for creating an instance. Only region and type are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreateInstanceOptions {
    /// Region to create in.
    #[validate(length(min = 1, message = "region is required"))]
    pub region: String,
    /// Instance type (plan).
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "type is required"))]
    pub instance_type: String,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Display group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Root password for the deployed image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_pass: Option<String>,
    /// SSH public keys for root.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorized_keys: Vec<String>,
    /// StackScript to run on first boot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stackscript_id: Option<u64>,
    /// StackScript user-defined fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stackscript_data: Option<HashMap<String, String>>,
    /// Backup to restore from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_id: Option<u64>,
    /// Image to deploy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Enroll in the backup service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backups_enabled: Option<bool>,
    /// Swap size in MB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap_size: Option<u32>,
    /// Boot after creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booted: Option<bool>,
}

impl CreateInstanceOptions {
    /// Options with the two required fields.
    #[must_use]
    pub fn new(region: impl Into<String>, instance_type: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            instance_type: instance_type.into(),
            ..Self::default()
        }
    }

    /// Set the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Deploy an image with a root password.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>, root_pass: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self.root_pass = Some(root_pass.into());
        self
    }

    /// Add an authorized SSH key.
    #[must_use]
    pub fn with_authorized_key(mut self, key: impl Into<String>) -> Self {
        self.authorized_keys.push(key.into());
        self
    }

    /// Boot after creation.
    #[must_use]
    pub fn booted(mut self, booted: bool) -> Self {
        self.booted = Some(booted);
        self
    }
}

/// Partial update; absent fields are left unchanged remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateInstanceOptions {
    /// New label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// New group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// New backup policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backups: Option<InstanceBackup>,
    /// New alert thresholds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerts: Option<InstanceAlert>,
}

impl UpdateInstanceOptions {
    /// Update only the label.
    #[must_use]
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }
}

/// Payload for cloning an instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct CloneInstanceOptions {
    /// Target region.
    #[validate(length(min = 1, message = "region is required"))]
    pub region: String,
    /// Target type.
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "type is required"))]
    pub instance_type: String,
    /// Existing instance to clone onto instead of creating a new one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linode_id: Option<u64>,
    /// Label of the clone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Group of the clone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Enroll the clone in backups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backups_enabled: Option<bool>,
    /// Disk IDs to copy; all when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disks: Vec<u64>,
    /// Config IDs to copy; all when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configs: Vec<u64>,
}

impl CloneInstanceOptions {
    /// Options with the target region and type.
    #[must_use]
    pub fn new(region: impl Into<String>, instance_type: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            instance_type: instance_type.into(),
            ..Self::default()
        }
    }
}

/// Payload for rebuilding an instance from an image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct RebuildInstanceOptions {
    /// Image to deploy.
    #[validate(length(min = 1, message = "image is required"))]
    pub image: String,
    /// New root password.
    #[validate(length(min = 1, message = "root_pass is required"))]
    pub root_pass: String,
    /// SSH public keys for root.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorized_keys: Vec<String>,
    /// StackScript to run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stackscript_id: Option<u64>,
    /// StackScript user-defined fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stackscript_data: Option<HashMap<String, String>>,
    /// Boot after rebuilding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booted: Option<bool>,
}

impl RebuildInstanceOptions {
    /// Options with the two required fields.
    #[must_use]
    pub fn new(image: impl Into<String>, root_pass: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            root_pass: root_pass.into(),
            ..Self::default()
        }
    }
}

/// Body of boot and reboot requests that name a config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct ConfigSelection {
    pub(crate) config_id: u64,
}

/// Body of resize requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct ResizeRequest<'a> {
    #[serde(rename = "type")]
    pub(crate) instance_type: &'a str,
}
