//! YAML run configuration and its adapter into live cursor/channel pairs.
//!
//! This module is the only place where untrusted YAML is parsed and mapped to
//! the crate's typed structs. Errors here use `anyhow` for context-rich
//! diagnostics at the caller boundary; everything past assembly speaks the
//! crate's own error type.
//!
//! Accepted schema:
//!
//! ```yaml
//! batch_size: 10
//! staging_dir: /tmp/batch-staging
//! retain_pushed_files: false
//! apply: per_file
//! storage_cli: gsutil
//! channels:
//!   - source: remote
//!     patterns: ["gs://bucket/data/*.nc"]
//!   - source: local
//!     file_dir: /data/out
//!     patterns: ["result_a.nc", "result_b.nc"]
//!     put_dir: gs://bucket/results
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{error, info};

use crate::collection::{FileCollection, SourceKind};
use crate::cursor::BatchCursor;
use crate::orchestrate::{ApplyMode, ChannelPair, RunOptions};
use crate::transfer::{LocalSource, ObjectStore, RemoteSource, TransferChannel};

fn default_storage_cli() -> String {
    "gsutil".to_string()
}

fn default_apply() -> ApplyMode {
    ApplyMode::PerFile
}

#[derive(Debug, Deserialize)]
pub struct RunConfig {
    pub batch_size: usize,
    pub staging_dir: PathBuf,
    #[serde(default)]
    pub retain_pushed_files: bool,
    #[serde(default = "default_apply")]
    pub apply: ApplyMode,
    #[serde(default = "default_storage_cli")]
    pub storage_cli: String,
    pub channels: Vec<ChannelSection>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelSection {
    pub source: SourceKind,
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Directory joined onto the front of every pattern before expansion.
    pub file_dir: Option<PathBuf>,
    /// Destination for pushing batches back out.
    pub put_dir: Option<PathBuf>,
}

impl RunConfig {
    pub fn options(&self) -> RunOptions {
        RunOptions {
            apply: self.apply,
            retain_pushed_files: self.retain_pushed_files,
        }
    }

    /// A staging directory exclusive to one run.
    ///
    /// Concurrent runs sharing a staging directory may corrupt each other's
    /// temporary files, so each run gets a unique subdirectory.
    pub fn run_staging_dir(&self) -> PathBuf {
        self.staging_dir
            .join(format!("run-{}", uuid::Uuid::new_v4()))
    }

    /// Expand every channel's patterns and bind cursors to channels.
    pub async fn build_pairs<S>(&self, store: &S, staging_dir: &Path) -> Result<Vec<ChannelPair>>
    where
        S: ObjectStore + Clone + 'static,
    {
        fs::create_dir_all(staging_dir)
            .with_context(|| format!("failed to create staging dir {}", staging_dir.display()))?;

        let mut pairs = Vec::with_capacity(self.channels.len());
        for section in &self.channels {
            let collection = FileCollection::expand(
                &section.patterns,
                section.file_dir.as_deref(),
                section.source,
                store,
            )
            .await
            .context("pattern expansion failed")?;
            let cursor = BatchCursor::new(collection, self.batch_size)
                .context("invalid batch size for channel")?;
            let channel: Box<dyn TransferChannel> = match section.source {
                SourceKind::Remote => {
                    let mut remote = RemoteSource::new(store.clone(), staging_dir);
                    if let Some(put_dir) = &section.put_dir {
                        remote = remote.with_put_dir(put_dir);
                    }
                    Box::new(remote)
                }
                SourceKind::Local => {
                    Box::new(LocalSource::new(store.clone(), section.put_dir.clone()))
                }
            };
            pairs.push(ChannelPair::new(cursor, channel));
        }
        Ok(pairs)
    }
}

/// Load a YAML run config from `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RunConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = fs::read_to_string(path_ref).with_context(|| {
        error!(config_path = ?path_ref, "Failed to read config file");
        format!("failed to read config file {:?}", path_ref)
    })?;

    let config: RunConfig = serde_yaml::from_str(&content).with_context(|| {
        error!(config_path = ?path_ref, "Failed to parse config YAML");
        format!("failed to parse config YAML {:?}", path_ref)
    })?;

    if config.batch_size == 0 {
        anyhow::bail!("batch_size must be at least 1");
    }
    if config.channels.is_empty() {
        anyhow::bail!("at least one channel must be configured");
    }

    info!(
        channels = config.channels.len(),
        batch_size = config.batch_size,
        "Parsed config YAML successfully"
    );
    Ok(config)
}
