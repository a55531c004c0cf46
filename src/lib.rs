#![doc = "bucket-batch: batched transfer and processing of object-store file collections."]

//! This crate moves a large, possibly wildcard-expanded, collection of files
//! between a remote object store and local working storage in fixed-size
//! batches, applies a caller-supplied transform to each batch, and cleans up
//! transient local copies before advancing. Local disk usage is bounded to
//! one batch's worth of staged files per channel, which is what makes
//! datasets larger than local storage workable.
//!
//! # Usage
//! Build a [`collection::FileCollection`] (directly, via wildcard expansion,
//! or from [`filelist`] naming components), wrap it in a
//! [`cursor::BatchCursor`], bind it to a [`transfer::TransferChannel`], and
//! hand the pairs to [`orchestrate::run`].

pub mod collection;
pub mod config;
pub mod cursor;
pub mod error;
pub mod filelist;
pub mod orchestrate;
pub mod transfer;
