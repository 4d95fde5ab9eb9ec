//! The local record of every site this installation has published.
//!
//! Stored as a single JSON document `{"sites": {"<name>": {...}}}`. A missing file is an empty
//! registry.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[remain::sorted]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("site registry {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to serialize site registry: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SiteRecord {
    pub site_id: String,
    pub deploy_url: String,
    /// Instruction history, oldest first.
    #[serde(default)]
    pub prompts: Vec<String>,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct RegistryDocument {
    #[serde(default)]
    sites: BTreeMap<String, SiteRecord>,
}

pub struct SiteStore {
    path: PathBuf,
    // serializes read-modify-write cycles within the process
    lock: Mutex<()>,
}

impl SiteStore {
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, name: &str) -> StoreResult<Option<SiteRecord>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read()?.sites.remove(&key(name)))
    }

    pub fn get_all(&self) -> StoreResult<BTreeMap<String, SiteRecord>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read()?.sites)
    }

    /// Inserts or replaces the record for `name`. `created_at` of an existing record is kept.
    pub fn save(
        &self,
        name: &str,
        site_id: &str,
        deploy_url: &str,
        prompts: &[String],
    ) -> StoreResult<SiteRecord> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut document = self.read()?;

        let name = key(name);
        let now = Utc::now();
        let created_at = document
            .sites
            .get(&name)
            .map(|existing| existing.created_at)
            .unwrap_or(now);
        let record = SiteRecord {
            site_id: site_id.to_string(),
            deploy_url: deploy_url.to_string(),
            prompts: prompts.to_vec(),
            last_updated: now,
            created_at,
        };
        document.sites.insert(name.clone(), record.clone());

        self.write(&document)?;
        debug!(name, site_id, path = %self.path.display(), "saved site record");
        Ok(record)
    }

    fn read(&self) -> StoreResult<RegistryDocument> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(RegistryDocument::default()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    // write to a sibling temp file then rename so readers never see a partial document
    fn write(&self, document: &RegistryDocument) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_vec_pretty(document)?;
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sites.json".to_string());
        let temp_path = self
            .path
            .with_file_name(format!("{file_name}.tmp.{}", Uuid::new_v4()));
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(&contents)?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}
