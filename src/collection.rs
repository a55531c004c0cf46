//! Ordered file collections and wildcard pattern expansion.
//!
//! A [`FileCollection`] is the immutable, ordered list of paths a cursor
//! batches over. Order is significant: it defines batch membership and must
//! stay stable once batching begins, which is why the list is built once and
//! never mutated afterwards.
//!
//! Pattern expansion resolves any `*` pattern through the listing primitive
//! matching the source kind: the remote store's `ls` for remote collections,
//! a filesystem glob for local ones. Listing failures propagate as
//! [`BatchError::Listing`] rather than being treated as "no matches" —
//! mistaking a failed listing for a missing file corrupts batch membership.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BatchError, Result};
use crate::transfer::ObjectStore;

/// Where a collection's files live before the run moves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Remote,
    Local,
}

/// An ordered, immutable-once-built sequence of paths plus their source kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCollection {
    paths: Vec<String>,
    kind: SourceKind,
}

impl FileCollection {
    /// Build a collection from literal paths, no expansion.
    pub fn new(paths: Vec<String>, kind: SourceKind) -> Self {
        Self { paths, kind }
    }

    /// Expand patterns into a concrete collection.
    ///
    /// Literal paths pass through unchanged; each wildcard pattern is spliced
    /// out into its matches, in the order the listing primitive returns them.
    /// `file_dir`, when given, is joined onto the front of every pattern
    /// before expansion.
    pub async fn expand(
        patterns: &[String],
        file_dir: Option<&Path>,
        kind: SourceKind,
        store: &dyn ObjectStore,
    ) -> Result<Self> {
        let mut paths = Vec::new();
        for pattern in patterns {
            let pattern = match file_dir {
                Some(dir) => dir.join(pattern).to_string_lossy().into_owned(),
                None => pattern.clone(),
            };
            if !pattern.contains('*') {
                paths.push(pattern);
                continue;
            }
            let matches = match kind {
                SourceKind::Remote => store
                    .list(&pattern)
                    .await
                    .map_err(|e| BatchError::listing(pattern.clone(), e.to_string()))?,
                SourceKind::Local => local_glob(&pattern)?,
            };
            debug!(pattern = %pattern, matches = matches.len(), "expanded wildcard pattern");
            paths.extend(matches);
        }
        Ok(Self { paths, kind })
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Per-path existence check: remote `stat` or a local filesystem probe.
    ///
    /// Returns one flag per path, in collection order.
    pub async fn verify(&self, store: &dyn ObjectStore) -> Result<Vec<bool>> {
        let mut checked = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            let exists = match self.kind {
                SourceKind::Remote => store.stat(path).await?,
                SourceKind::Local => Path::new(path).exists(),
            };
            checked.push(exists);
        }
        Ok(checked)
    }
}

fn local_glob(pattern: &str) -> Result<Vec<String>> {
    let entries =
        glob::glob(pattern).map_err(|e| BatchError::listing(pattern, e.to_string()))?;
    let mut matches = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| BatchError::listing(pattern, e.to_string()))?;
        // Directories cannot be batched or copied as files.
        if path.is_file() {
            matches.push(path.to_string_lossy().into_owned());
        }
    }
    Ok(matches)
}
