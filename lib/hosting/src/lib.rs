//! Publishing site directories to a hosting provider.
//!
//! [`SiteRegistry`] finds or provisions the remote site for a name, [`IncrementalDeployer`]
//! synchronizes a [`cas::Snapshot`] with it by sending only content the provider has never seen,
//! and [`PublicationManager`] takes a previewed site to production.

use std::path::PathBuf;

use thiserror::Error;

pub mod api;
pub mod client;
pub mod deployer;
pub mod memory;
pub mod publication;
pub mod registry;
pub mod validation;

pub use api::{ApiError, HostingApi};
pub use client::{Credentials, NetlifyClient};
pub use deployer::{
    DeployOptions, DeployOutcome, DuplicateContent, IncrementalDeployer, UploadFailurePolicy,
};
pub use publication::{Publication, PublicationManager, PublicationState};
pub use registry::SiteRegistry;
pub use validation::{Domain, SiteName, ValidationError};

#[remain::sorted]
#[derive(Debug, Error)]
pub enum HostingError {
    /// The provider rejected the manifest, nothing was uploaded.
    #[error("failed to start deploy for site {site_id}. Code: {status}, message: {body}")]
    DeployInit {
        site_id: String,
        status: u16,
        body: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("site name {0} is already taken by another account")]
    NameTaken(String),

    #[error("nothing to deploy, {0} has no files")]
    NothingToDeploy(PathBuf),

    #[error("{} file(s) failed to upload for deploy {deploy_id}", .failed.len())]
    PartialUploadFailure {
        deploy_id: String,
        failed: Vec<String>,
    },

    /// The domain was attached but making it primary failed. Only the primary step needs a retry.
    #[error("domain {domain} was added but could not be made primary: {source}")]
    PrimaryDomainNotSet {
        domain: String,
        #[source]
        source: ApiError,
    },

    #[error("failed to create site {name}. Code: {status}, message: {body}")]
    Provisioning {
        name: String,
        status: u16,
        body: String,
    },

    #[error("hosting provider error: {0}")]
    Remote(ApiError),

    #[error("site {0} not found")]
    TargetNotFound(String),

    #[error("request to hosting provider timed out")]
    Timeout,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl HostingError {
    /// Converts a failure of a call about `site_id`, turning "not found" into
    /// [`HostingError::TargetNotFound`].
    pub(crate) fn for_site(site_id: &str, error: ApiError) -> Self {
        match error {
            ApiError::NotFound => HostingError::TargetNotFound(site_id.to_string()),
            other => other.into(),
        }
    }
}

impl From<ApiError> for HostingError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Timeout => HostingError::Timeout,
            ApiError::NameTaken(name) => HostingError::NameTaken(name),
            other => HostingError::Remote(other),
        }
    }
}

pub type HostingResult<T> = Result<T, HostingError>;
