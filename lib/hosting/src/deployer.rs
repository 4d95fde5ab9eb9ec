//! Synchronizes a local [`Snapshot`] with a remote site.
//!
//! A deploy is a three step exchange:
//!
//! 1. the full `path -> digest` manifest is submitted in one request and the provider answers with
//!    the digests it does not have yet,
//! 2. for each of those digests the bytes of a local file with that digest are uploaded,
//! 3. the site is read back to report where the content is served.
//!
//! Content the provider already holds, under any path of the site, is never sent again so the
//! cost of a redeploy is proportional to what changed.

use std::sync::Arc;

use cas::{FileRecord, Hash, Snapshot};
use futures::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::api::{ApiError, HostingApi};
use crate::{HostingError, HostingResult};

/// What to do when some files could not be uploaded.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadFailurePolicy {
    /// Log the failures and finish the deploy. Failed paths are reported in the outcome.
    #[default]
    BestEffort,

    /// Fail the deploy with [`HostingError::PartialUploadFailure`].
    Abort,
}

/// How to upload a required digest that several local paths share.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateContent {
    /// Upload the bytes once, under the first path in path order. The provider stores content by
    /// digest and serves it at every path of the manifest that maps to it.
    #[default]
    OncePerDigest,

    /// Upload the bytes under every local path that carries the digest.
    EveryPath,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct DeployOptions {
    pub on_upload_failure: UploadFailurePolicy,
    pub duplicate_content: DuplicateContent,
    /// Attempts per file before it counts as failed. 1 means no retry.
    pub max_upload_attempts: u32,
    pub upload_concurrency: usize,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            on_upload_failure: UploadFailurePolicy::default(),
            duplicate_content: DuplicateContent::default(),
            max_upload_attempts: 1,
            upload_concurrency: 4,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployStatus {
    Pending,
    Uploading,
    Complete,
    Failed,
}

/// Result of a deploy that reached the provider.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DeployOutcome {
    pub deploy_id: String,
    pub url: String,
    pub status: DeployStatus,
    /// Digests the provider asked for.
    pub required: Vec<String>,
    /// Paths whose bytes were sent.
    pub uploaded: Vec<String>,
    /// Paths that could not be sent, or the digest itself when no local file carries it.
    pub failed: Vec<String>,
}

// lives for a single deploy call and is never persisted
struct DeploySession<'a> {
    site_id: &'a str,
    deploy_id: String,
    required: usize,
    status: DeployStatus,
}

impl DeploySession<'_> {
    fn advance(&mut self, status: DeployStatus) {
        debug!(
            site_id = self.site_id,
            deploy_id = self.deploy_id,
            required = self.required,
            from = ?self.status,
            to = ?status,
            "deploy status changed"
        );
        self.status = status;
    }
}

pub struct IncrementalDeployer {
    api: Arc<dyn HostingApi>,
    options: DeployOptions,
}

impl IncrementalDeployer {
    pub fn new(api: Arc<dyn HostingApi>, options: DeployOptions) -> Self {
        Self { api, options }
    }

    pub async fn deploy(&self, site_id: &str, snapshot: &Snapshot) -> HostingResult<DeployOutcome> {
        if snapshot.is_empty() {
            return Err(HostingError::NothingToDeploy(snapshot.root().to_path_buf()));
        }

        let manifest = snapshot.manifest();
        let handle = match self.api.create_deploy(site_id, &manifest).await {
            Ok(handle) => handle,
            Err(ApiError::Status { status, body }) => {
                error!(site_id, status, body, "provider rejected deploy manifest");
                return Err(HostingError::DeployInit {
                    site_id: site_id.to_string(),
                    status,
                    body,
                });
            }
            Err(e) => return Err(HostingError::for_site(site_id, e)),
        };

        let mut session = DeploySession {
            site_id,
            deploy_id: handle.id,
            required: handle.required.len(),
            status: DeployStatus::Pending,
        };
        info!(
            site_id,
            deploy_id = session.deploy_id,
            files = manifest.len(),
            required = handle.required.len(),
            "deploy created"
        );

        let mut failed = vec![];
        let mut planned: Vec<Vec<&FileRecord>> = vec![];
        for required in &handle.required {
            let candidates = self.candidates_for(snapshot, required);
            if candidates.is_empty() {
                warn!(
                    deploy_id = session.deploy_id,
                    digest = required,
                    "provider requested content that is not in the snapshot"
                );
                failed.push(required.clone());
            }
            planned.extend(candidates);
        }

        session.advance(DeployStatus::Uploading);
        let attempts = self.options.max_upload_attempts.max(1);
        let deploy_id = session.deploy_id.as_str();
        let uploads: Vec<_> = planned
            .into_iter()
            .map(|candidates| self.upload_any(deploy_id, candidates, attempts))
            .collect();
        let results: Vec<Result<String, Vec<String>>> = stream::iter(uploads)
            .buffer_unordered(self.options.upload_concurrency.max(1))
            .collect()
            .await;

        let mut uploaded = vec![];
        for result in results {
            match result {
                Ok(path) => uploaded.push(path),
                Err(paths) => failed.extend(paths),
            }
        }
        uploaded.sort();
        failed.sort();

        if !failed.is_empty() {
            session.advance(DeployStatus::Failed);
            if self.options.on_upload_failure == UploadFailurePolicy::Abort {
                return Err(HostingError::PartialUploadFailure {
                    deploy_id: session.deploy_id,
                    failed,
                });
            }
            warn!(
                deploy_id = session.deploy_id,
                failed = failed.len(),
                "deploy finished with missing files"
            );
        }

        let site = self
            .api
            .get_site(site_id)
            .await
            .map_err(|e| HostingError::for_site(site_id, e))?;

        if failed.is_empty() {
            session.advance(DeployStatus::Complete);
        }
        info!(
            site_id,
            deploy_id = session.deploy_id,
            uploaded = uploaded.len(),
            url = site.url,
            "deploy finished"
        );

        Ok(DeployOutcome {
            deploy_id: session.deploy_id,
            url: site.url,
            status: session.status,
            required: handle.required,
            uploaded,
            failed,
        })
    }

    /// Groups the local files carrying `digest` into uploads. Each group is a list of
    /// interchangeable candidates in path order, and the upload stops at the first that succeeds.
    fn candidates_for<'a>(
        &self,
        snapshot: &'a Snapshot,
        digest: &str,
    ) -> Vec<Vec<&'a FileRecord>> {
        let Ok(digest) = digest.parse::<Hash>() else {
            return vec![];
        };

        let records: Vec<&FileRecord> = snapshot.files_with_digest(digest).collect();
        if records.is_empty() {
            return vec![];
        }

        match self.options.duplicate_content {
            DuplicateContent::OncePerDigest => vec![records],
            DuplicateContent::EveryPath => records.into_iter().map(|r| vec![r]).collect(),
        }
    }

    /// Uploads the first candidate that can be sent. On failure returns every path tried.
    async fn upload_any(
        &self,
        deploy_id: &str,
        candidates: Vec<&FileRecord>,
        attempts: u32,
    ) -> Result<String, Vec<String>> {
        let mut tried = vec![];
        for record in candidates {
            match self.upload(deploy_id, record, attempts).await {
                Ok(()) => {
                    if !tried.is_empty() {
                        info!(
                            deploy_id,
                            path = record.relative_path,
                            failed = tried.len(),
                            "uploaded content through another path"
                        );
                    }
                    return Ok(record.relative_path.clone());
                }
                Err(e) => {
                    error!(deploy_id, path = record.relative_path, error = %e, "failed to upload file");
                    tried.push(record.relative_path.clone());
                }
            }
        }

        Err(tried)
    }

    async fn upload(&self, deploy_id: &str, record: &FileRecord, attempts: u32) -> HostingResult<()> {
        let content = tokio::fs::read(&record.absolute_path).await?;

        let mut attempt = 1;
        loop {
            match self
                .api
                .upload_file(deploy_id, &record.relative_path, content.clone())
                .await
            {
                Ok(()) => {
                    debug!(deploy_id, path = record.relative_path, "uploaded file");
                    return Ok(());
                }
                Err(e) if attempt < attempts => {
                    warn!(
                        deploy_id,
                        path = record.relative_path,
                        attempt,
                        error = %e,
                        "upload failed, retrying"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
