//! The operations sitesmith needs from a hosting provider.
//!
//! The shapes follow the Netlify sites/deploys API: a deploy is created from a manifest of
//! `path -> sha1` and the provider answers with the digests it does not have yet.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Relative file path to hex content digest.
pub type Manifest = BTreeMap<String, String>;

#[remain::sorted]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApiError {
    /// Response body could not be understood.
    #[error("unable to decode response: {0}")]
    Decode(String),

    /// The provider reports the site name belongs to someone else.
    #[error("site name {0} is already in use")]
    NameTaken(String),

    #[error("resource not found")]
    NotFound,

    /// Any other non-success response.
    #[error("unexpected response. Code: {status}, message: {body}")]
    Status { status: u16, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// A site as reported by the provider.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct RemoteSite {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub ssl_url: Option<String>,
    #[serde(default)]
    pub custom_domain: Option<String>,
    /// The deploy currently published at the site's primary URL.
    #[serde(default)]
    pub deploy_id: Option<String>,
    #[serde(default)]
    pub ssl: Option<bool>,
    #[serde(default)]
    pub force_ssl: Option<bool>,
}

/// Answer to a deploy request.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct DeployHandle {
    pub id: String,
    /// Digests whose bytes the provider still needs.
    #[serde(default)]
    pub required: Vec<String>,
}

/// Partial update of a site's settings. Unset fields are left untouched by the provider.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SitePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_ssl: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_settings: Option<ProcessingSettings>,
}

impl SitePatch {
    pub fn transport_security() -> Self {
        Self {
            ssl: Some(true),
            force_ssl: Some(true),
            processing_settings: None,
        }
    }

    pub fn processing(settings: ProcessingSettings) -> Self {
        Self {
            processing_settings: Some(settings),
            ..Default::default()
        }
    }
}

/// Post processing the provider applies to deployed assets.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ProcessingSettings {
    pub html: HtmlProcessing,
    pub css: AssetProcessing,
    pub js: AssetProcessing,
    pub images: ImageProcessing,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            html: HtmlProcessing { pretty_urls: true },
            css: AssetProcessing {
                bundle: true,
                minify: true,
            },
            js: AssetProcessing {
                bundle: true,
                minify: true,
            },
            images: ImageProcessing { optimize: true },
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct HtmlProcessing {
    /// Serve `/about.html` as `/about`.
    pub pretty_urls: bool,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AssetProcessing {
    pub bundle: bool,
    pub minify: bool,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ImageProcessing {
    pub optimize: bool,
}

#[async_trait]
pub trait HostingApi: Send + Sync {
    async fn list_sites(&self) -> ApiResult<Vec<RemoteSite>>;

    async fn create_site(&self, name: &str) -> ApiResult<RemoteSite>;

    async fn get_site(&self, site_id: &str) -> ApiResult<RemoteSite>;

    async fn update_site(&self, site_id: &str, patch: &SitePatch) -> ApiResult<()>;

    async fn create_deploy(&self, site_id: &str, manifest: &Manifest) -> ApiResult<DeployHandle>;

    async fn upload_file(&self, deploy_id: &str, path: &str, content: Vec<u8>) -> ApiResult<()>;

    async fn add_domain(&self, site_id: &str, hostname: &str) -> ApiResult<()>;

    async fn set_primary_domain(&self, site_id: &str, hostname: &str) -> ApiResult<()>;

    /// Publishes an earlier deploy at the site's primary URL.
    async fn restore_deploy(&self, site_id: &str, deploy_id: &str) -> ApiResult<()>;
}
