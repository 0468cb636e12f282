//! # linode-core
//!
//! Core plumbing shared by Linode API clients.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy
//! - [`coupler`] - Mapping of HTTP outcomes onto the error taxonomy
//! - [`config`] - Client configuration
//! - [`endpoint`] - Resource collection URL resolution
//! - [`client`] - Shared HTTP transport
//! - [`context`] - Cancellation and deadlines
//! - [`dates`] - Provider timestamp normalization
//! - [`pagination`] - Generic list pagination

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod context;
pub mod coupler;
pub mod dates;
pub mod endpoint;
pub mod error;
pub mod pagination;

// Re-export commonly used types
pub use client::{ApiRequest, LinodeClient, LinodeClientBuilder};
pub use config::LinodeClientConfig;
pub use context::RequestContext;
pub use dates::Timestamp;
pub use endpoint::{Endpoints, ResourceKind};
pub use error::{ApiError, Error, ErrorReason, Result, TransportKind};
pub use pagination::{ListOptions, Page, PageMeta, PageShape};
