use std::sync::Arc;

use tracing::{error, info};

use crate::api::{ApiError, HostingApi};
use crate::validation::SiteName;
use crate::{HostingError, HostingResult};

/// Finds or provisions the remote site backing a name.
#[derive(Clone)]
pub struct SiteRegistry {
    api: Arc<dyn HostingApi>,
}

impl SiteRegistry {
    pub fn new(api: Arc<dyn HostingApi>) -> Self {
        Self { api }
    }

    /// Returns the id of the remote site named exactly `name`, if there is one.
    pub async fn locate(&self, name: &SiteName) -> HostingResult<Option<String>> {
        let sites = self.api.list_sites().await?;
        Ok(sites
            .into_iter()
            .find(|site| site.name == name.as_str())
            .map(|site| site.id))
    }

    /// Provisions a new remote site. Never retried.
    pub async fn create(&self, name: &SiteName) -> HostingResult<String> {
        match self.api.create_site(name.as_str()).await {
            Ok(site) => {
                info!(name = %name, site_id = site.id, "created site");
                Ok(site.id)
            }
            Err(ApiError::Status { status, body }) => {
                error!(name = %name, status, body, "failed to create site");
                Err(HostingError::Provisioning {
                    name: name.to_string(),
                    status,
                    body,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_or_create(&self, name: &SiteName) -> HostingResult<String> {
        if let Some(site_id) = self.locate(name).await? {
            return Ok(site_id);
        }

        self.create(name).await
    }
}
