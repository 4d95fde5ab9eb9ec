use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use crate::hash::Hash;
use crate::{CasError, CasResult};

/// A single file of a [`Snapshot`]. Two records are the same file when both the relative path and
/// the digest match.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FileRecord {
    /// Path relative to the snapshot root, always `/` separated.
    pub relative_path: String,
    pub digest: Hash,
    pub absolute_path: PathBuf,
}

/// The files found under a directory at the time it was scanned.
///
/// Records are keyed by relative path so lookups and manifests come out in a stable order, but
/// callers should treat the snapshot as a set.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Snapshot {
    root: PathBuf,
    files: BTreeMap<String, FileRecord>,
}

impl Snapshot {
    /// Recursively digests every regular file under `root`.
    ///
    /// A missing root yields an empty snapshot. Symlinks are not followed.
    pub fn scan<P: AsRef<Path>>(root: P) -> CasResult<Self> {
        let root = root.as_ref();
        let mut files = BTreeMap::new();

        if !root.try_exists()? {
            debug!(root = %root.display(), "snapshot root does not exist");
            return Ok(Self {
                root: root.to_path_buf(),
                files,
            });
        }

        if !root.is_dir() {
            return Err(CasError::InvalidSnapshotRoot(root.to_path_buf()));
        }

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let absolute_path = entry.path().to_path_buf();
            let relative_path = normalize(
                absolute_path
                    .strip_prefix(root)
                    .unwrap_or(absolute_path.as_path()),
            );
            let digest = Hash::from_file(&absolute_path)?;

            files.insert(
                relative_path.clone(),
                FileRecord {
                    relative_path,
                    digest,
                    absolute_path,
                },
            );
        }

        debug!(root = %root.display(), files = files.len(), "scanned snapshot");
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values()
    }

    pub fn get(&self, relative_path: &str) -> Option<&FileRecord> {
        self.files.get(relative_path)
    }

    /// Maps each relative path to the hex digest of its content.
    pub fn manifest(&self) -> BTreeMap<String, String> {
        self.files
            .iter()
            .map(|(path, record)| (path.clone(), record.digest.to_string()))
            .collect()
    }

    /// The first file, in path order, whose content has `digest`.
    pub fn find_by_digest(&self, digest: &Hash) -> Option<&FileRecord> {
        self.files().find(|record| &record.digest == digest)
    }

    /// Every file whose content has `digest`.
    pub fn files_with_digest(&self, digest: Hash) -> impl Iterator<Item = &FileRecord> + '_ {
        self.files().filter(move |record| record.digest == digest)
    }
}

// fs::canonicalize results in an absolute path which we dont want. Join the normal components
// with `/` so manifests look the same regardless of platform
fn normalize(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
