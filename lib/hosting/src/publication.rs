use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::{HostingApi, ProcessingSettings, SitePatch};
use crate::validation::Domain;
use crate::{HostingError, HostingResult};

/// How far a site has been taken towards production. States only move forward.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublicationState {
    Draft,
    TlsConfigured,
    Optimized,
    Production,
}

impl fmt::Display for PublicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            PublicationState::Draft => "draft",
            PublicationState::TlsConfigured => "tls-configured",
            PublicationState::Optimized => "optimized",
            PublicationState::Production => "production",
        };
        f.write_str(value)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Publication {
    pub url: String,
    pub state: PublicationState,
    pub deploy_id: Option<String>,
}

/// Takes a previewed site to production and manages its custom domain.
pub struct PublicationManager {
    api: Arc<dyn HostingApi>,
    policy: ProcessingSettings,
}

impl PublicationManager {
    pub fn new(api: Arc<dyn HostingApi>) -> Self {
        Self::with_policy(api, ProcessingSettings::default())
    }

    pub fn with_policy(api: Arc<dyn HostingApi>, policy: ProcessingSettings) -> Self {
        Self { api, policy }
    }

    pub async fn enable_transport_security(&self, site_id: &str) -> HostingResult<()> {
        self.api
            .get_site(site_id)
            .await
            .map_err(|e| HostingError::for_site(site_id, e))?;

        self.api
            .update_site(site_id, &SitePatch::transport_security())
            .await
            .map_err(|e| HostingError::for_site(site_id, e))?;

        info!(site_id, "enabled https");
        Ok(())
    }

    pub async fn apply_optimization_policy(&self, site_id: &str) -> HostingResult<()> {
        self.api
            .update_site(site_id, &SitePatch::processing(self.policy.clone()))
            .await
            .map_err(|e| HostingError::for_site(site_id, e))?;

        info!(site_id, "applied asset optimization policy");
        Ok(())
    }

    pub async fn promote_to_production(&self, site_id: &str, deploy_id: &str) -> HostingResult<()> {
        self.api
            .restore_deploy(site_id, deploy_id)
            .await
            .map_err(|e| HostingError::for_site(site_id, e))?;

        info!(site_id, deploy_id, "promoted deploy to production");
        Ok(())
    }

    /// Adds `domain` to the site and makes it the primary domain.
    ///
    /// The domain is validated before anything is sent. When the domain was added but could not
    /// be made primary [`HostingError::PrimaryDomainNotSet`] is returned and only
    /// [`PublicationManager::set_primary_domain`] needs to be retried.
    pub async fn attach_domain(&self, site_id: &str, domain: &str) -> HostingResult<()> {
        let domain = Domain::parse(domain)?;

        self.api
            .add_domain(site_id, domain.as_str())
            .await
            .map_err(|e| HostingError::for_site(site_id, e))?;
        info!(site_id, domain = %domain, "added custom domain");

        self.set_primary_domain(site_id, &domain).await
    }

    pub async fn set_primary_domain(&self, site_id: &str, domain: &Domain) -> HostingResult<()> {
        self.api
            .set_primary_domain(site_id, domain.as_str())
            .await
            .map_err(|source| {
                warn!(site_id, domain = %domain, error = %source, "unable to set primary domain");
                HostingError::PrimaryDomainNotSet {
                    domain: domain.to_string(),
                    source,
                }
            })?;

        info!(site_id, domain = %domain, "set primary domain");
        Ok(())
    }

    /// Enables https, applies the optimization policy and promotes the current deploy.
    ///
    /// A failure to promote does not fail the publication, the site is still served with the
    /// earlier steps applied and is reported as [`PublicationState::Optimized`].
    pub async fn finalize(&self, site_id: &str) -> HostingResult<Publication> {
        self.enable_transport_security(site_id).await?;
        self.apply_optimization_policy(site_id).await?;

        let site = self
            .api
            .get_site(site_id)
            .await
            .map_err(|e| HostingError::for_site(site_id, e))?;

        let state = match &site.deploy_id {
            Some(deploy_id) => match self.promote_to_production(site_id, deploy_id).await {
                Ok(()) => PublicationState::Production,
                Err(e) => {
                    warn!(site_id, deploy_id, error = %e, "unable to promote deploy");
                    PublicationState::Optimized
                }
            },
            None => {
                warn!(site_id, "site has no published deploy to promote");
                PublicationState::Optimized
            }
        };

        Ok(Publication {
            url: site.url,
            state,
            deploy_id: site.deploy_id,
        })
    }
}
