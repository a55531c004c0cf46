//! The batch cursor: windowing over an ordered file collection.
//!
//! A [`BatchCursor`] partitions its collection into `ceil(len / batch_size)`
//! contiguous batches. Every batch except possibly the last holds exactly
//! `batch_size` files; the last holds between 1 and `batch_size`. Navigation
//! past either end is a reported no-op, never an error, so callers may poll
//! `advance` until the deterministic batch count is reached.

use tracing::{info, warn};

use crate::collection::{FileCollection, SourceKind};
use crate::error::{BatchError, Result};

/// What a navigation call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The cursor moved to an adjacent batch.
    Moved,
    /// The cursor was already at the boundary and stayed put.
    AtBoundary,
}

/// Cursor over fixed-size windows of a [`FileCollection`].
#[derive(Debug, Clone)]
pub struct BatchCursor {
    files: FileCollection,
    batch_size: usize,
    current_batch: usize,
    n_batches: usize,
    last_batch_size: usize,
}

impl BatchCursor {
    /// Create a cursor positioned at batch 0. `batch_size` must be ≥ 1.
    pub fn new(files: FileCollection, batch_size: usize) -> Result<Self> {
        let (n_batches, last_batch_size) = Self::layout(files.len(), batch_size)?;
        Ok(Self {
            files,
            batch_size,
            current_batch: 0,
            n_batches,
            last_batch_size,
        })
    }

    fn layout(n_files: usize, batch_size: usize) -> Result<(usize, usize)> {
        if batch_size == 0 {
            return Err(BatchError::Configuration(
                "batch size must be at least 1".into(),
            ));
        }
        let n_batches = n_files.div_ceil(batch_size);
        let last_batch_size = if n_batches == 0 {
            0
        } else {
            n_files - batch_size * (n_batches - 1)
        };
        Ok((n_batches, last_batch_size))
    }

    pub fn kind(&self) -> SourceKind {
        self.files.kind()
    }

    pub fn n_files(&self) -> usize {
        self.files.len()
    }

    pub fn n_batches(&self) -> usize {
        self.n_batches
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn current_batch(&self) -> usize {
        self.current_batch
    }

    pub fn is_final_batch(&self) -> bool {
        self.n_batches > 0 && self.current_batch == self.n_batches - 1
    }

    /// The exact slice of paths for the current batch.
    ///
    /// Empty collection means no valid batch, so the slice is empty.
    pub fn current_batch_files(&self) -> &[String] {
        let (start, end) = self.bounds();
        &self.files.paths()[start..end]
    }

    fn bounds(&self) -> (usize, usize) {
        if self.n_batches == 0 {
            return (0, 0);
        }
        let start = self.current_batch * self.batch_size;
        let width = if self.is_final_batch() {
            self.last_batch_size
        } else {
            self.batch_size
        };
        (start, start + width)
    }

    /// Move to the next batch, or report the boundary at the final batch.
    pub fn advance(&mut self) -> NavigationOutcome {
        if self.current_batch + 1 < self.n_batches {
            self.current_batch += 1;
            NavigationOutcome::Moved
        } else {
            warn!(
                batch = self.current_batch,
                "final batch already reached, cannot advance"
            );
            NavigationOutcome::AtBoundary
        }
    }

    /// Move to the previous batch, or report the boundary at batch 0.
    pub fn retreat(&mut self) -> NavigationOutcome {
        if self.current_batch > 0 {
            self.current_batch -= 1;
            NavigationOutcome::Moved
        } else {
            warn!("already at the first batch, cannot retreat");
            NavigationOutcome::AtBoundary
        }
    }

    /// Return to batch 0 unconditionally.
    pub fn reset(&mut self) {
        self.current_batch = 0;
    }

    /// Change the batch size mid-iteration.
    ///
    /// The layout is recomputed from the original file count, and the current
    /// slice is re-derived from `current_batch * new_batch_size`. If the new
    /// layout has fewer batches than the current index, the cursor clamps to
    /// the final batch.
    pub fn resize(&mut self, batch_size: usize) -> Result<()> {
        let (n_batches, last_batch_size) = Self::layout(self.files.len(), batch_size)?;
        self.batch_size = batch_size;
        self.n_batches = n_batches;
        self.last_batch_size = last_batch_size;
        if self.current_batch + 1 > n_batches {
            self.current_batch = n_batches.saturating_sub(1);
        }
        Ok(())
    }

    /// Emit a one-line position report.
    pub fn summary(&self) {
        info!(
            n_batches = self.n_batches,
            n_files = self.files.len(),
            current_batch = self.current_batch + 1,
            "batch cursor position"
        );
    }
}
