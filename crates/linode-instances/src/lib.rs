//! Linode compute instance lifecycle client.
//!
//! Provides typed models and an asynchronous client for listing, creating,
//! mutating and deleting compute instances. Transport, error mapping,
//! pagination and timestamp handling come from `linode-core`.

#![deny(missing_docs)]

pub mod client;
pub mod lookup;
pub mod models;

pub use client::{InstanceOperations, InstancesClient};
pub use lookup::find_instance_by_label;
pub use models::{
    BackupSchedule, CloneInstanceOptions, CreateInstanceOptions, Instance, InstanceAlert,
    InstanceBackup, InstanceSpec, InstanceStatus, InstancesPage, RebuildInstanceOptions,
    UpdateInstanceOptions,
};

/// Convenient result alias that reuses the shared Linode error type.
pub type Result<T> = linode_core::Result<T>;
