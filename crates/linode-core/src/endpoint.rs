//! Resource collection endpoints.
//!
//! All collection, single-resource and action URLs are derived here from the
//! configured API root and versioned prefix.

use crate::config::LinodeClientConfig;
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Logical resource collections known to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Compute instances
    Instances,
    /// Instance types (plans)
    Types,
    /// Regions
    Regions,
    /// Deployable images
    Images,
    /// Block storage volumes
    Volumes,
}

impl ResourceKind {
    /// Logical name of the collection.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Instances => "instances",
            Self::Types => "types",
            Self::Regions => "regions",
            Self::Images => "images",
            Self::Volumes => "volumes",
        }
    }

    /// Path of the collection below the versioned prefix.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Instances => "linode/instances",
            Self::Types => "linode/types",
            Self::Regions => "regions",
            Self::Images => "images",
            Self::Volumes => "volumes",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "instances" => Ok(Self::Instances),
            "types" => Ok(Self::Types),
            "regions" => Ok(Self::Regions),
            "images" => Ok(Self::Images),
            "volumes" => Ok(Self::Volumes),
            _ => Err(Error::Config(format!("Unknown resource kind: {s}"))),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolves resource kinds to absolute, versioned URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// API root including the version prefix, always ending in `/`
    root: Url,
}

impl Endpoints {
    /// Build a resolver from an API root and version prefix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the version is blank or the root cannot
    /// carry a path.
    pub fn new(api_url: &Url, api_version: &str) -> Result<Self> {
        let version = api_version.trim_matches('/');
        if version.is_empty() {
            return Err(Error::Config("API version prefix is not set".to_string()));
        }

        let mut root = api_url.clone();
        root.set_query(None);
        root.set_fragment(None);
        root.path_segments_mut()
            .map_err(|()| Error::Config(format!("API root `{api_url}` cannot carry a path")))?
            .pop_if_empty()
            .push(version)
            .push("");

        Ok(Self { root })
    }

    /// Build a resolver from client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the API root is unset or invalid.
    pub fn from_config(config: &LinodeClientConfig) -> Result<Self> {
        let api_url = config.parse_api_url()?;
        Self::new(&api_url, &config.api_version)
    }

    /// Collection URL for a resource kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL cannot be joined.
    pub fn resolve(&self, kind: ResourceKind) -> Result<Url> {
        self.join(kind, &[])
    }

    /// Collection URL for a resource kind given by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for unknown resource kinds.
    pub fn resolve_name(&self, name: &str) -> Result<Url> {
        self.resolve(name.parse()?)
    }

    /// URL of a single resource within a collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL cannot be joined.
    pub fn item(&self, kind: ResourceKind, id: u64) -> Result<Url> {
        self.join(kind, &[id.to_string().as_str()])
    }

    /// URL of an action sub-resource, e.g. `/linode/instances/{id}/boot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL cannot be joined.
    pub fn action(&self, kind: ResourceKind, id: u64, action: &str) -> Result<Url> {
        self.join(kind, &[id.to_string().as_str(), action])
    }

    fn join(&self, kind: ResourceKind, segments: &[&str]) -> Result<Url> {
        let mut url = self
            .root
            .join(kind.path())
            .map_err(|e| Error::Config(format!("Invalid path for `{kind}`: {e}")))?;

        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|()| Error::Config(format!("Invalid path for `{kind}`")))?
                .extend(segments);
        }

        Ok(url)
    }
}
