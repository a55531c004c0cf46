//! The per-batch run loop: fetch → transform → push → cleanup → advance.
//!
//! [`run`] drives one or more cursor/channel pairs in lockstep across aligned
//! batch indices. Each cycle fetches the current batch for remote channels,
//! applies the caller's transform to the staged local paths, pushes local
//! channels that have a destination, deletes the batch's temporary files, and
//! advances every cursor together.
//!
//! Failure model: structural problems (empty pair list, mismatched batch
//! counts, a run that moves no data) fail before any batch work starts.
//! A transfer failure mid-run aborts immediately with no partial result —
//! outputs always reflect every batch from 0 to the abort point, or none.
//! Retry and backoff are deliberately a caller concern. Cleanup failures are
//! swallowed; a missing file during deletion is expected, not an error.

use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::collection::SourceKind;
use crate::cursor::BatchCursor;
use crate::error::{BatchError, Result};
use crate::transfer::{StagedFile, TransferChannel};

/// How the transform receives the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMode {
    /// One call per file index, with one path per channel.
    PerFile,
    /// One call per batch with the full per-channel path lists.
    ///
    /// Extension point: selecting this mode currently fails fast with a
    /// configuration error.
    PerBatch,
}

/// Run-wide switches.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub apply: ApplyMode,
    /// Keep local files on disk after they have been pushed.
    pub retain_pushed_files: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            apply: ApplyMode::PerFile,
            retain_pushed_files: false,
        }
    }
}

/// One file collection's cursor bound to its transfer channel.
pub struct ChannelPair {
    pub cursor: BatchCursor,
    pub channel: Box<dyn TransferChannel>,
}

impl ChannelPair {
    pub fn new(cursor: BatchCursor, channel: Box<dyn TransferChannel>) -> Self {
        Self { cursor, channel }
    }
}

/// Accumulated transform outputs plus run accounting.
#[derive(Debug)]
pub struct RunReport<T> {
    /// One output per file, in batch order then file order within a batch.
    pub outputs: Vec<T>,
    pub batches_completed: usize,
}

/// Drive all pairs through every batch, applying `transform` per file.
///
/// In [`ApplyMode::PerFile`] the transform receives one staged local path per
/// channel, aligned by in-batch index, and its return values come back
/// flattened in the report: one output per file across the whole run.
pub async fn run<T, F>(
    pairs: &mut [ChannelPair],
    mut transform: F,
    options: &RunOptions,
) -> Result<RunReport<T>>
where
    F: FnMut(&[&Path]) -> T,
{
    if pairs.is_empty() {
        return Err(BatchError::Configuration(
            "no channels given: nothing to batch over".into(),
        ));
    }
    if options.apply == ApplyMode::PerBatch {
        return Err(BatchError::Configuration(
            "per-batch apply mode is a reserved extension point and not yet supported".into(),
        ));
    }

    for pair in pairs.iter_mut() {
        pair.cursor.reset();
    }

    let n_batches = pairs[0].cursor.n_batches();
    for pair in pairs.iter().skip(1) {
        if pair.cursor.n_batches() != n_batches {
            return Err(BatchError::Alignment(format!(
                "batch counts differ across channels: {} vs {}",
                n_batches,
                pair.cursor.n_batches()
            )));
        }
    }

    let n_fetchers = pairs
        .iter()
        .filter(|p| p.channel.kind() == SourceKind::Remote)
        .count();
    let n_pushers = pairs
        .iter()
        .filter(|p| p.channel.kind() == SourceKind::Local)
        .count();
    if n_fetchers == 0 && n_pushers == 0 {
        return Err(BatchError::Configuration(
            "run moves no data: no remote source to fetch and no local source to push".into(),
        ));
    }

    info!(
        channels = pairs.len(),
        n_batches, n_fetchers, n_pushers, "starting batched run"
    );

    let mut outputs = Vec::new();
    for batch_index in 0..n_batches {
        info!(
            batch = batch_index + 1,
            total = n_batches,
            percent = (batch_index as f64 / n_batches as f64) * 100.0,
            "processing batch"
        );

        // Step 1: stage the current batch locally, all channels at once.
        // Local channels return their paths unchanged; remote channels
        // bulk-copy into staging.
        let fetches = pairs.iter_mut().map(|pair| {
            let batch = pair.cursor.current_batch_files().to_vec();
            let channel = &mut pair.channel;
            async move { channel.fetch(&batch).await }
        });
        let staged_per_channel: Vec<Vec<StagedFile>> = match try_join_all(fetches).await {
            Ok(staged) => staged,
            Err(e) => {
                error!(batch = batch_index, error = %e, "fetch failed, aborting run");
                return Err(e);
            }
        };

        // Equal batch counts do not guarantee equal widths at one index when
        // file counts differ; indexing across channels requires the latter.
        let batch_width = staged_per_channel[0].len();
        if let Some(odd) = staged_per_channel.iter().find(|s| s.len() != batch_width) {
            return Err(BatchError::Alignment(format!(
                "batch {} widths differ across channels: {} vs {}",
                batch_index,
                batch_width,
                odd.len()
            )));
        }

        // Step 2: apply the transform, one file index at a time.
        for file_index in 0..batch_width {
            let args: Vec<&Path> = staged_per_channel
                .iter()
                .map(|staged| staged[file_index].local_path.as_path())
                .collect();
            outputs.push(transform(&args));
        }

        // Step 3: push local channels that have a destination.
        for pair in pairs.iter_mut() {
            if pair.channel.kind() == SourceKind::Local && pair.channel.pushes() {
                let batch = pair.cursor.current_batch_files().to_vec();
                if let Err(e) = pair.channel.push(&batch).await {
                    error!(batch = batch_index, error = %e, "push failed, aborting run");
                    return Err(e);
                }
            }
        }

        // Step 4: drop this batch's temporary files, and pushed local files
        // unless the caller asked to retain them.
        for (pair, staged) in pairs.iter_mut().zip(&staged_per_channel) {
            let mut doomed: Vec<PathBuf> = staged
                .iter()
                .filter(|f| f.is_temporary)
                .map(|f| f.local_path.clone())
                .collect();
            if !options.retain_pushed_files
                && pair.channel.kind() == SourceKind::Local
                && pair.channel.pushes()
            {
                doomed.extend(staged.iter().map(|f| f.local_path.clone()));
            }
            if !doomed.is_empty() {
                debug!(batch = batch_index, files = doomed.len(), "cleaning up batch files");
                pair.channel.delete(&doomed).await;
            }
        }

        // Step 5: advance every cursor together. The final batch reports a
        // boundary no-op, which is fine: the loop bound is deterministic.
        for pair in pairs.iter_mut() {
            pair.cursor.advance();
        }
    }

    info!(
        outputs = outputs.len(),
        batches = n_batches,
        "batched run complete"
    );
    Ok(RunReport {
        outputs,
        batches_completed: n_batches,
    })
}
