//! Transfer seams: the external storage tool and the per-collection channels.
//!
//! All external-tool invocations and filesystem mutations live here. The rest
//! of the crate only sees the [`ObjectStore`] and [`TransferChannel`] traits,
//! so tests and alternative backends plug in through mocks or their own
//! implementations.
//!
//! Two channel variants exist:
//! - [`RemoteSource`]: bulk-copies each batch into a local staging directory,
//!   verifies the copy, and owns the temporary files it creates.
//! - [`LocalSource`]: files are already local, so fetch is the identity;
//!   push bulk-copies the batch to a configured destination.

use std::path::{Path, PathBuf};
use std::process::Command;

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, info};

use crate::collection::SourceKind;
use crate::error::{BatchError, Result};

/// Abstract bulk-copy/listing/stat capability of the storage backend.
///
/// The contract only requires atomicity of the whole-call success/failure
/// signal; a backend may parallelise individual file transfers internally.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Copy all `sources` to `dest` in one operation.
    async fn copy(&self, sources: &[String], dest: &Path) -> Result<()>;

    /// Expand a wildcard pattern into matching remote paths, in listing order.
    async fn list(&self, pattern: &str) -> Result<Vec<String>>;

    /// Whether `path` exists on the backend.
    async fn stat(&self, path: &str) -> Result<bool>;
}

/// [`ObjectStore`] backed by an external command-line storage utility.
///
/// Invokes `<program> -m cp <sources..> <dest>`, `<program> ls <pattern>` and
/// `<program> stat <path>`. Defaults to `gsutil`.
#[derive(Debug, Clone)]
pub struct StorageCli {
    program: String,
}

impl StorageCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for StorageCli {
    fn default() -> Self {
        Self::new("gsutil")
    }
}

#[async_trait]
impl ObjectStore for StorageCli {
    async fn copy(&self, sources: &[String], dest: &Path) -> Result<()> {
        let status = Command::new(&self.program)
            .arg("-m")
            .arg("cp")
            .args(sources)
            .arg(dest)
            .status()
            .map_err(|e| BatchError::tool(format!("{} -m cp", self.program), e.to_string()))?;
        if !status.success() {
            return Err(BatchError::tool(
                format!("{} -m cp", self.program),
                format!("exited with {status}"),
            ));
        }
        debug!(
            files = sources.len(),
            dest = %dest.display(),
            "bulk copy complete"
        );
        Ok(())
    }

    async fn list(&self, pattern: &str) -> Result<Vec<String>> {
        let output = Command::new(&self.program)
            .arg("ls")
            .arg(pattern)
            .output()
            .map_err(|e| BatchError::tool(format!("{} ls", self.program), e.to_string()))?;
        if !output.status.success() {
            return Err(BatchError::tool(
                format!("{} ls", self.program),
                format!("exited with {}", output.status),
            ));
        }
        let listed = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        Ok(listed)
    }

    async fn stat(&self, path: &str) -> Result<bool> {
        // A non-zero exit here means "not found", not a tool failure.
        let status = Command::new(&self.program)
            .arg("stat")
            .arg(path)
            .status()
            .map_err(|e| BatchError::tool(format!("{} stat", self.program), e.to_string()))?;
        Ok(status.success())
    }
}

/// A local copy of one batched file, with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// The path as it appears in the owning file collection.
    pub source_path: String,
    /// Where the file sits on local disk for the duration of the batch.
    pub local_path: PathBuf,
    /// Temporary staged copies are deleted before the batch advances.
    pub is_temporary: bool,
}

/// Per-collection transfer binding driven by the orchestrator.
///
/// Implementors own any temporary files their `fetch` creates; `delete` is
/// best-effort and idempotent (missing files are not an error).
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait TransferChannel: Send {
    /// Whether this channel's collection lives remotely or locally.
    fn kind(&self) -> SourceKind;

    /// Whether a push destination is configured.
    fn pushes(&self) -> bool;

    /// Make the batch available on local disk.
    async fn fetch(&mut self, batch: &[String]) -> Result<Vec<StagedFile>>;

    /// Bulk-copy the batch to the configured push destination.
    async fn push(&mut self, batch: &[String]) -> Result<()>;

    /// Remove local files, swallowing individual failures.
    async fn delete(&mut self, paths: &[PathBuf]);
}

fn remove_quietly(paths: &[PathBuf]) {
    for path in paths {
        match std::fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "removed staged file"),
            // Already-missing files are expected during cleanup.
            Err(e) => debug!(error = ?e, path = %path.display(), "skipping staged file removal"),
        }
    }
}

/// Channel over a remote collection: fetches batches into a staging directory.
pub struct RemoteSource<S> {
    store: S,
    staging_dir: PathBuf,
    put_dir: Option<PathBuf>,
}

impl<S: ObjectStore> RemoteSource<S> {
    pub fn new(store: S, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            staging_dir: staging_dir.into(),
            put_dir: None,
        }
    }

    /// Configure a destination for pushing batches back out.
    pub fn with_put_dir(mut self, put_dir: impl Into<PathBuf>) -> Self {
        self.put_dir = Some(put_dir.into());
        self
    }

    fn staged_path(&self, source: &str) -> PathBuf {
        let name = Path::new(source)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| source.into());
        self.staging_dir.join(name)
    }
}

#[async_trait]
impl<S: ObjectStore> TransferChannel for RemoteSource<S> {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    fn pushes(&self) -> bool {
        self.put_dir.is_some()
    }

    async fn fetch(&mut self, batch: &[String]) -> Result<Vec<StagedFile>> {
        let staged: Vec<StagedFile> = batch
            .iter()
            .map(|source| StagedFile {
                source_path: source.clone(),
                local_path: self.staged_path(source),
                is_temporary: true,
            })
            .collect();

        self.store
            .copy(batch, &self.staging_dir)
            .await
            .map_err(|e| BatchError::fetch(e.to_string()))?;

        let missing: Vec<&StagedFile> = staged
            .iter()
            .filter(|f| !f.local_path.is_file())
            .collect();
        if !missing.is_empty() {
            // Discard whatever partial set was produced before failing.
            let produced: Vec<PathBuf> = staged.iter().map(|f| f.local_path.clone()).collect();
            remove_quietly(&produced);
            return Err(BatchError::fetch(format!(
                "{} of {} files missing after copy, first: {}",
                missing.len(),
                staged.len(),
                missing[0].source_path
            )));
        }

        info!(
            files = staged.len(),
            staging = %self.staging_dir.display(),
            "fetched batch into staging"
        );
        Ok(staged)
    }

    async fn push(&mut self, batch: &[String]) -> Result<()> {
        let put_dir = self.put_dir.as_ref().ok_or_else(|| {
            BatchError::Configuration("no push destination configured for remote channel".into())
        })?;
        self.store
            .copy(batch, put_dir)
            .await
            .map_err(|e| BatchError::push(e.to_string()))
    }

    async fn delete(&mut self, paths: &[PathBuf]) {
        remove_quietly(paths);
    }
}

/// Channel over a local collection: fetch is the identity, push is optional.
pub struct LocalSource<S> {
    store: S,
    put_dir: Option<PathBuf>,
}

impl<S: ObjectStore> LocalSource<S> {
    pub fn new(store: S, put_dir: Option<PathBuf>) -> Self {
        Self { store, put_dir }
    }
}

#[async_trait]
impl<S: ObjectStore> TransferChannel for LocalSource<S> {
    fn kind(&self) -> SourceKind {
        SourceKind::Local
    }

    fn pushes(&self) -> bool {
        self.put_dir.is_some()
    }

    async fn fetch(&mut self, batch: &[String]) -> Result<Vec<StagedFile>> {
        // Files are already on local disk; nothing to move, nothing temporary.
        Ok(batch
            .iter()
            .map(|source| StagedFile {
                source_path: source.clone(),
                local_path: PathBuf::from(source),
                is_temporary: false,
            })
            .collect())
    }

    async fn push(&mut self, batch: &[String]) -> Result<()> {
        match &self.put_dir {
            Some(put_dir) => {
                self.store
                    .copy(batch, put_dir)
                    .await
                    .map_err(|e| BatchError::push(e.to_string()))?;
                info!(files = batch.len(), dest = %put_dir.display(), "pushed batch");
                Ok(())
            }
            None => {
                debug!("local channel has no push destination, skipping push");
                Ok(())
            }
        }
    }

    async fn delete(&mut self, paths: &[PathBuf]) {
        remove_quietly(paths);
    }
}
