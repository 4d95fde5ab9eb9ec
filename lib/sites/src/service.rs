use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use cas::Snapshot;
use generator::ContentGenerator;
use hosting::{
    DeployOptions, DeployOutcome, Domain, HostingApi, IncrementalDeployer, PublicationManager,
    PublicationState, SiteName, SiteRegistry,
};
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;
use tracing::{info, warn};

use crate::store::{SiteRecord, SiteStore};
use crate::{SiteError, SiteResult};

const INDEX_FILE: &str = "index.html";

const PLACEHOLDER_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Site Reset</title>
    <style>
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background-color: #f5f5f5;
            display: flex;
            justify-content: center;
            align-items: center;
            height: 100vh;
            margin: 0;
            padding: 20px;
            text-align: center;
            color: #333;
        }
        .container {
            background-color: white;
            padding: 40px;
            border-radius: 10px;
            box-shadow: 0 4px 10px rgba(0, 0, 0, 0.1);
            max-width: 600px;
        }
        h1 {
            color: #2c3e50;
            margin-bottom: 20px;
        }
        p {
            font-size: 18px;
            line-height: 1.6;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>This site has been reset</h1>
        <p>The content was cleared. Send a new instruction to build the site again.</p>
    </div>
</body>
</html>
"#;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NameCheck {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts: Option<Vec<String>>,
    pub message: String,
}

impl NameCheck {
    fn unavailable(message: String) -> Self {
        Self {
            exists: false,
            site_id: None,
            deploy_url: None,
            prompts: None,
            message,
        }
    }
}

/// A site whose content was just deployed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PublishedSite {
    pub name: String,
    pub site_id: String,
    pub deploy_url: String,
    pub deploy: DeployOutcome,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Approval {
    Approved {
        deploy_url: String,
        state: PublicationState,
    },
    Continue,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SiteStatus {
    pub site_name: String,
    pub deploy_url: String,
    pub prompts_count: usize,
}

type LockMap = Mutex<HashMap<SiteName, Arc<tokio::sync::Mutex<()>>>>;

/// Exclusive access to one site. The entry in the lock map is removed when the last holder or
/// waiter for the name lets go.
struct SiteLock<'a> {
    name: SiteName,
    locks: &'a LockMap,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SiteLock<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(&self.name)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.name);
        }
    }
}

// file hashing and registry IO stay off the async workers
async fn blocking<T, F>(task: F) -> SiteResult<T>
where
    F: FnOnce() -> SiteResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| SiteError::Task(e.to_string()))?
}

pub struct SiteService {
    registry: SiteRegistry,
    deployer: IncrementalDeployer,
    publisher: PublicationManager,
    generator: Arc<dyn ContentGenerator>,
    store: Arc<SiteStore>,
    workspace: PathBuf,
    locks: LockMap,
}

impl SiteService {
    pub fn new(
        hosting: Arc<dyn HostingApi>,
        generator: Arc<dyn ContentGenerator>,
        store: SiteStore,
        workspace: PathBuf,
        deploy_options: DeployOptions,
    ) -> Self {
        Self {
            registry: SiteRegistry::new(hosting.clone()),
            deployer: IncrementalDeployer::new(hosting.clone(), deploy_options),
            publisher: PublicationManager::new(hosting),
            generator,
            store: Arc::new(store),
            workspace,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Directory holding the content of `name`.
    pub fn site_dir(&self, name: &SiteName) -> PathBuf {
        self.workspace.join(name.as_str())
    }

    // requests for the same site run one at a time, different sites run in parallel
    async fn lock(&self, name: &SiteName) -> SiteLock<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(name.clone()).or_default().clone()
        };
        let mut site_lock = SiteLock {
            name: name.clone(),
            locks: &self.locks,
            guard: None,
        };
        site_lock.guard = Some(lock.lock_owned().await);
        site_lock
    }

    async fn find(&self, name: &SiteName) -> SiteResult<Option<SiteRecord>> {
        let store = self.store.clone();
        let key = name.to_string();
        blocking(move || Ok(store.get(&key)?)).await
    }

    async fn record(&self, name: &SiteName) -> SiteResult<SiteRecord> {
        self.find(name)
            .await?
            .ok_or_else(|| SiteError::UnknownSite(name.to_string()))
    }

    async fn save(
        &self,
        name: &SiteName,
        site_id: &str,
        deploy_url: &str,
        prompts: Vec<String>,
    ) -> SiteResult<SiteRecord> {
        let store = self.store.clone();
        let key = name.to_string();
        let site_id = site_id.to_string();
        let deploy_url = deploy_url.to_string();
        blocking(move || Ok(store.save(&key, &site_id, &deploy_url, &prompts)?)).await
    }

    async fn deploy_dir(&self, site_id: &str, dir: PathBuf) -> SiteResult<DeployOutcome> {
        let snapshot = blocking(move || Ok(Snapshot::scan(dir)?)).await?;
        Ok(self.deployer.deploy(site_id, &snapshot).await?)
    }

    /// Reports whether `name` is already in use, locally or at the hosting provider. An invalid
    /// name is reported in the message rather than as an error.
    pub async fn check_name(&self, name: &str) -> SiteResult<NameCheck> {
        let name = match SiteName::parse(name) {
            Ok(name) => name,
            Err(e) => return Ok(NameCheck::unavailable(e.to_string())),
        };

        if let Some(record) = self.find(&name).await? {
            return Ok(NameCheck {
                exists: true,
                site_id: Some(record.site_id),
                deploy_url: Some(record.deploy_url),
                prompts: Some(record.prompts),
                message: "This site was created before. Its details were loaded.".to_string(),
            });
        }

        if let Some(site_id) = self.registry.locate(&name).await? {
            return Ok(NameCheck {
                exists: true,
                site_id: Some(site_id),
                deploy_url: None,
                prompts: None,
                message: "This site exists at the hosting provider but not locally. Continuing will update it.".to_string(),
            });
        }

        Ok(NameCheck::unavailable(
            "This site name is available.".to_string(),
        ))
    }

    /// Appends `instruction` to the site's history, regenerates the page and deploys it.
    pub async fn submit_instruction(
        &self,
        name: &str,
        instruction: &str,
    ) -> SiteResult<PublishedSite> {
        let name = SiteName::parse(name)?;
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(SiteError::EmptyInstruction);
        }

        let _guard = self.lock(&name).await;
        let (site_id, mut prompts) = match self.find(&name).await? {
            Some(record) => (record.site_id, record.prompts),
            None => (self.registry.find_or_create(&name).await?, vec![]),
        };
        prompts.push(instruction.to_string());

        let html = self.generator.generate(&prompts).await?;
        let deploy = self.publish_page(&name, &site_id, &html).await?;
        let revisions = prompts.len();
        self.save(&name, &site_id, &deploy.url, prompts).await?;

        info!(name = %name, revisions, url = deploy.url, "site updated");
        Ok(PublishedSite {
            name: name.to_string(),
            site_id,
            deploy_url: deploy.url.clone(),
            deploy,
        })
    }

    /// On approval takes the site to production and records its public URL.
    pub async fn approve(&self, name: &str, approve: bool) -> SiteResult<Approval> {
        let name = SiteName::parse(name)?;
        let _guard = self.lock(&name).await;
        let record = self.record(&name).await?;
        if !approve {
            return Ok(Approval::Continue);
        }

        let publication = self.publisher.finalize(&record.site_id).await?;
        if publication.state != PublicationState::Production {
            warn!(name = %name, state = %publication.state, "site published without promotion");
        }
        self.save(&name, &record.site_id, &publication.url, record.prompts)
            .await?;

        Ok(Approval::Approved {
            deploy_url: publication.url,
            state: publication.state,
        })
    }

    pub async fn list_sites(&self) -> SiteResult<BTreeMap<String, SiteRecord>> {
        let store = self.store.clone();
        blocking(move || Ok(store.get_all()?)).await
    }

    pub async fn status(&self, name: &str) -> SiteResult<SiteStatus> {
        let name = SiteName::parse(name)?;
        let record = self.record(&name).await?;
        Ok(SiteStatus {
            site_name: name.to_string(),
            deploy_url: record.deploy_url,
            prompts_count: record.prompts.len(),
        })
    }

    /// Attaches `domain` to the site and makes it primary. Hostnames are case-insensitive so the
    /// domain is lowercased, then validated before the hosting provider is contacted.
    pub async fn add_domain(&self, name: &str, domain: &str) -> SiteResult<Domain> {
        let name = SiteName::parse(name)?;
        let domain = Domain::parse(&domain.trim().to_lowercase())?;

        let _guard = self.lock(&name).await;
        let record = self.record(&name).await?;
        self.publisher
            .attach_domain(&record.site_id, domain.as_str())
            .await?;

        Ok(domain)
    }

    /// Replaces the site's content with a placeholder page and clears its instruction history.
    pub async fn reset_content(&self, name: &str) -> SiteResult<PublishedSite> {
        let name = SiteName::parse(name)?;
        let _guard = self.lock(&name).await;
        let record = self.record(&name).await?;

        let deploy = self
            .publish_page(&name, &record.site_id, PLACEHOLDER_PAGE)
            .await?;
        self.save(&name, &record.site_id, &deploy.url, vec![]).await?;

        info!(name = %name, cleared = record.prompts.len(), "site content reset");
        Ok(PublishedSite {
            name: name.to_string(),
            site_id: record.site_id,
            deploy_url: deploy.url.clone(),
            deploy,
        })
    }

    /// Deploys an existing directory as the content of `name`, creating the site if needed.
    pub async fn deploy_directory(&self, name: &str, dir: &Path) -> SiteResult<PublishedSite> {
        let name = SiteName::parse(name)?;
        let _guard = self.lock(&name).await;

        let (site_id, prompts) = match self.find(&name).await? {
            Some(record) => (record.site_id, record.prompts),
            None => (self.registry.find_or_create(&name).await?, vec![]),
        };

        let deploy = self.deploy_dir(&site_id, dir.to_path_buf()).await?;
        self.save(&name, &site_id, &deploy.url, prompts).await?;

        Ok(PublishedSite {
            name: name.to_string(),
            site_id,
            deploy_url: deploy.url.clone(),
            deploy,
        })
    }

    async fn publish_page(
        &self,
        name: &SiteName,
        site_id: &str,
        html: &str,
    ) -> SiteResult<DeployOutcome> {
        let dir = self.site_dir(name);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(INDEX_FILE), html).await?;

        self.deploy_dir(site_id, dir).await
    }
}
