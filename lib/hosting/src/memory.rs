//! An in-process [`HostingApi`] that behaves like the real provider: it remembers every digest it
//! has received for a site and only asks for the ones it is missing.
//!
//! Calls are recorded so tests can assert on exactly what went over the wire, and individual
//! operations can be made to fail.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use cas::Hash;

use crate::api::{
    ApiError, ApiResult, DeployHandle, HostingApi, Manifest, RemoteSite, SitePatch,
};

/// Every call made against an [`InMemoryHosting`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallLog {
    pub list_sites: usize,
    pub create_site: Vec<String>,
    pub get_site: usize,
    pub patches: Vec<SitePatch>,
    pub create_deploy: Vec<Manifest>,
    /// Paths of uploaded files, in the order they arrived.
    pub uploads: Vec<String>,
    pub add_domain: Vec<String>,
    pub set_primary_domain: Vec<String>,
    pub restore_deploy: Vec<String>,
}

impl CallLog {
    /// Total number of calls that reached the provider.
    pub fn total(&self) -> usize {
        self.list_sites
            + self.create_site.len()
            + self.get_site
            + self.patches.len()
            + self.create_deploy.len()
            + self.uploads.len()
            + self.add_domain.len()
            + self.set_primary_domain.len()
            + self.restore_deploy.len()
    }
}

#[derive(Debug, Default)]
struct StoredSite {
    site: RemoteSite,
    digests: HashSet<String>,
    domains: Vec<String>,
}

#[derive(Debug)]
struct StoredDeploy {
    site_id: String,
    manifest: Manifest,
    missing: HashSet<String>,
}

#[derive(Debug, Default)]
struct State {
    sites: BTreeMap<String, StoredSite>,
    deploys: HashMap<String, StoredDeploy>,
    claimed_elsewhere: HashSet<String>,
    failing_uploads: HashMap<String, usize>,
    fail_deploys: bool,
    fail_primary_domain: bool,
    fail_restore: bool,
    next_id: u64,
    calls: CallLog,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{:04}", self.next_id)
    }

    fn site_mut(&mut self, site_id: &str) -> ApiResult<&mut StoredSite> {
        self.sites.get_mut(site_id).ok_or(ApiError::NotFound)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryHosting {
    state: Mutex<State>,
}

impl InMemoryHosting {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks `name` as owned by another account so creating it fails.
    pub fn claim_name_elsewhere(&self, name: &str) {
        self.state().claimed_elsewhere.insert(name.to_string());
    }

    /// Makes the next `times` uploads of `path` fail with a server error.
    pub fn fail_uploads_of(&self, path: &str, times: usize) {
        self.state()
            .failing_uploads
            .insert(path.to_string(), times);
    }

    pub fn fail_deploys(&self, fail: bool) {
        self.state().fail_deploys = fail;
    }

    pub fn fail_primary_domain(&self, fail: bool) {
        self.state().fail_primary_domain = fail;
    }

    pub fn fail_restore(&self, fail: bool) {
        self.state().fail_restore = fail;
    }

    pub fn calls(&self) -> CallLog {
        self.state().calls.clone()
    }

    pub fn site(&self, site_id: &str) -> Option<RemoteSite> {
        self.state().sites.get(site_id).map(|s| s.site.clone())
    }

    pub fn domains(&self, site_id: &str) -> Vec<String> {
        self.state()
            .sites
            .get(site_id)
            .map(|s| s.domains.clone())
            .unwrap_or_default()
    }

    /// Paths of `deploy_id` whose content never arrived.
    pub fn missing_paths(&self, deploy_id: &str) -> Vec<String> {
        let state = self.state();
        let Some(deploy) = state.deploys.get(deploy_id) else {
            return vec![];
        };
        let stored = state
            .sites
            .get(&deploy.site_id)
            .map(|s| &s.digests);

        deploy
            .manifest
            .iter()
            .filter(|(_, digest)| !stored.is_some_and(|d| d.contains(*digest)))
            .map(|(path, _)| path.clone())
            .collect()
    }
}

#[async_trait]
impl HostingApi for InMemoryHosting {
    async fn list_sites(&self) -> ApiResult<Vec<RemoteSite>> {
        let mut state = self.state();
        state.calls.list_sites += 1;
        Ok(state.sites.values().map(|s| s.site.clone()).collect())
    }

    async fn create_site(&self, name: &str) -> ApiResult<RemoteSite> {
        let mut state = self.state();
        state.calls.create_site.push(name.to_string());

        if state.claimed_elsewhere.contains(name) || state.sites.values().any(|s| s.site.name == name)
        {
            return Err(ApiError::NameTaken(name.to_string()));
        }

        let id = state.next_id("site");
        let site = RemoteSite {
            id: id.clone(),
            name: name.to_string(),
            url: format!("http://{name}.netlify.app"),
            ssl_url: Some(format!("https://{name}.netlify.app")),
            ..Default::default()
        };
        state.sites.insert(
            id,
            StoredSite {
                site: site.clone(),
                ..Default::default()
            },
        );

        Ok(site)
    }

    async fn get_site(&self, site_id: &str) -> ApiResult<RemoteSite> {
        let mut state = self.state();
        state.calls.get_site += 1;
        state.site_mut(site_id).map(|s| s.site.clone())
    }

    async fn update_site(&self, site_id: &str, patch: &SitePatch) -> ApiResult<()> {
        let mut state = self.state();
        state.calls.patches.push(patch.clone());
        let stored = state.site_mut(site_id)?;

        if let Some(ssl) = patch.ssl {
            stored.site.ssl = Some(ssl);
        }
        if let Some(force_ssl) = patch.force_ssl {
            stored.site.force_ssl = Some(force_ssl);
            if force_ssl {
                let host = stored
                    .site
                    .custom_domain
                    .clone()
                    .unwrap_or_else(|| format!("{}.netlify.app", stored.site.name));
                stored.site.url = format!("https://{host}");
            }
        }

        Ok(())
    }

    async fn create_deploy(&self, site_id: &str, manifest: &Manifest) -> ApiResult<DeployHandle> {
        let mut state = self.state();
        state.calls.create_deploy.push(manifest.clone());

        if state.fail_deploys {
            return Err(ApiError::Status {
                status: 500,
                body: "deploy rejected".to_string(),
            });
        }

        let stored = state.site_mut(site_id)?;
        let mut required = vec![];
        let mut missing = HashSet::new();
        for digest in manifest.values() {
            if !stored.digests.contains(digest) && missing.insert(digest.clone()) {
                required.push(digest.clone());
            }
        }

        let id = state.next_id("deploy");
        if missing.is_empty() {
            state.site_mut(site_id)?.site.deploy_id = Some(id.clone());
        }
        state.deploys.insert(
            id.clone(),
            StoredDeploy {
                site_id: site_id.to_string(),
                manifest: manifest.clone(),
                missing,
            },
        );

        Ok(DeployHandle { id, required })
    }

    async fn upload_file(&self, deploy_id: &str, path: &str, content: Vec<u8>) -> ApiResult<()> {
        let mut state = self.state();
        state.calls.uploads.push(path.to_string());

        if let Some(remaining) = state.failing_uploads.get_mut(path) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ApiError::Status {
                    status: 500,
                    body: format!("failed to store {path}"),
                });
            }
        }

        let deploy = state.deploys.get_mut(deploy_id).ok_or(ApiError::NotFound)?;
        let digest = Hash::new(&content).to_string();
        if deploy.manifest.get(path) != Some(&digest) {
            return Err(ApiError::Status {
                status: 422,
                body: format!("content of {path} does not match the manifest"),
            });
        }

        deploy.missing.remove(&digest);
        let ready = deploy.missing.is_empty();
        let site_id = deploy.site_id.clone();

        let stored = state.site_mut(&site_id)?;
        stored.digests.insert(digest);
        if ready {
            stored.site.deploy_id = Some(deploy_id.to_string());
        }

        Ok(())
    }

    async fn add_domain(&self, site_id: &str, hostname: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.calls.add_domain.push(hostname.to_string());
        let stored = state.site_mut(site_id)?;
        if !stored.domains.iter().any(|d| d == hostname) {
            stored.domains.push(hostname.to_string());
        }
        Ok(())
    }

    async fn set_primary_domain(&self, site_id: &str, hostname: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.calls.set_primary_domain.push(hostname.to_string());

        if state.fail_primary_domain {
            return Err(ApiError::Status {
                status: 500,
                body: "unable to update primary domain".to_string(),
            });
        }

        let stored = state.site_mut(site_id)?;
        if !stored.domains.iter().any(|d| d == hostname) {
            return Err(ApiError::NotFound);
        }

        stored.site.custom_domain = Some(hostname.to_string());
        let scheme = if stored.site.force_ssl == Some(true) {
            "https"
        } else {
            "http"
        };
        stored.site.url = format!("{scheme}://{hostname}");
        Ok(())
    }

    async fn restore_deploy(&self, site_id: &str, deploy_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.calls.restore_deploy.push(deploy_id.to_string());

        if state.fail_restore {
            return Err(ApiError::Status {
                status: 500,
                body: "restore failed".to_string(),
            });
        }

        match state.deploys.get(deploy_id) {
            Some(deploy) if deploy.site_id == site_id => {}
            _ => return Err(ApiError::NotFound),
        }

        state.site_mut(site_id)?.site.deploy_id = Some(deploy_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(entries: &[(&str, &str)]) -> Manifest {
        entries
            .iter()
            .map(|(path, content)| (path.to_string(), Hash::new(content.as_bytes()).to_string()))
            .collect()
    }

    #[tokio::test]
    async fn only_unknown_digests_are_required() {
        let hosting = InMemoryHosting::new();
        let site = hosting.create_site("demo").await.unwrap();

        let first = manifest(&[("a.html", "a"), ("b.html", "b")]);
        let deploy = hosting.create_deploy(&site.id, &first).await.unwrap();
        assert_eq!(2, deploy.required.len());
        hosting
            .upload_file(&deploy.id, "a.html", b"a".to_vec())
            .await
            .unwrap();
        assert_eq!(vec!["b.html".to_string()], hosting.missing_paths(&deploy.id));

        let second = manifest(&[("a.html", "a"), ("b.html", "b2")]);
        let deploy = hosting.create_deploy(&site.id, &second).await.unwrap();
        assert_eq!(vec![Hash::new(b"b2").to_string()], deploy.required);
    }

    #[tokio::test]
    async fn upload_must_match_manifest() {
        let hosting = InMemoryHosting::new();
        let site = hosting.create_site("demo").await.unwrap();
        let deploy = hosting
            .create_deploy(&site.id, &manifest(&[("a.html", "a")]))
            .await
            .unwrap();

        let result = hosting
            .upload_file(&deploy.id, "a.html", b"other".to_vec())
            .await;
        assert!(matches!(result, Err(ApiError::Status { status: 422, .. })));
    }

    #[tokio::test]
    async fn deploy_is_published_once_complete() {
        let hosting = InMemoryHosting::new();
        let site = hosting.create_site("demo").await.unwrap();
        let deploy = hosting
            .create_deploy(&site.id, &manifest(&[("a.html", "a")]))
            .await
            .unwrap();
        assert_eq!(None, hosting.site(&site.id).unwrap().deploy_id);

        hosting
            .upload_file(&deploy.id, "a.html", b"a".to_vec())
            .await
            .unwrap();
        assert_eq!(Some(deploy.id), hosting.site(&site.id).unwrap().deploy_id);
    }

    #[tokio::test]
    async fn claimed_names_cannot_be_created() {
        let hosting = InMemoryHosting::new();
        hosting.claim_name_elsewhere("taken");
        assert_eq!(
            Err(ApiError::NameTaken("taken".to_string())),
            hosting.create_site("taken").await
        );
    }
}
