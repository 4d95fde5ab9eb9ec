use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use generator::GeneratorSettings;
use hosting::client::{DEFAULT_API_URL, DEFAULT_TIMEOUT};
use hosting::{Credentials, DeployOptions, NetlifyClient};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::service::SiteService;
use crate::store::SiteStore;
use crate::{SiteError, SiteResult};

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Settings {
    pub hosting: HostingSettings,
    pub deploy: DeployOptions,
    pub generator: GeneratorSettings,
    pub storage: StorageSettings,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct HostingSettings {
    pub api_url: String,
    /// Personal access token. Usually supplied through the environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for HostingSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Each site's content lives in `<workspace_dir>/<name>/`.
    pub workspace_dir: PathBuf,
    pub registry_path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            workspace_dir: PathBuf::from("sites"),
            registry_path: PathBuf::from("data/site_database.json"),
        }
    }
}

impl Settings {
    pub fn build_service(&self) -> SiteResult<SiteService> {
        if self.hosting.token.is_none() {
            warn!("no hosting token configured, requests to the hosting provider will be rejected");
        }

        let credentials = self.hosting.token.clone().map(Credentials::Token);
        let client = NetlifyClient::new(
            self.hosting.api_url.as_str(),
            credentials,
            Duration::from_secs(self.hosting.timeout_secs),
        )
        .map_err(|e| SiteError::Hosting(e.into()))?;

        Ok(SiteService::new(
            Arc::new(client),
            self.generator.build()?,
            SiteStore::open(&self.storage.registry_path),
            self.storage.workspace_dir.clone(),
            self.deploy.clone(),
        ))
    }
}
