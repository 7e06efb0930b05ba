//! Concurrent scanning of page images back into page records
//!
//! Every image is independent, so they are scanned on a bounded rayon pool.
//! Results are collected into a single `Result`: the first failure stops
//! further work and is the only error surfaced. Ordering is irrelevant since
//! [`crate::reassemble`] sorts unconditionally.

use rayon::prelude::*;

use crate::codec::FrameCodec;
use crate::error::{PageError, PageResult};
use crate::record::PageRecord;

/// The barcode collaborator: turns a frame into an image and back.
pub trait Barcode {
    fn render(&self, frame: &[u8]) -> anyhow::Result<Vec<u8>>;

    fn scan(&self, image: &[u8]) -> anyhow::Result<Vec<u8>>;
}

/// A page image and where it came from (used in error messages).
#[derive(Debug, Clone)]
pub struct PageImage {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl PageImage {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Scan and decode all `images` on a pool of `workers` threads
/// (`0` = one per CPU).
pub fn scan_pages<B, C>(
    images: &[PageImage],
    barcode: &B,
    codec: &C,
    workers: usize,
) -> PageResult<Vec<PageRecord>>
where
    B: Barcode + Sync + ?Sized,
    C: FrameCodec + Sync + ?Sized,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("paperqr-scan-{i}"))
        .build()
        .map_err(|e| PageError::WorkerPool(e.to_string()))?;

    let records = pool.install(|| {
        images
            .par_iter()
            .map(|image| scan_page(image, barcode, codec))
            .collect::<PageResult<Vec<_>>>()
    })?;

    tracing::info!(pages = records.len(), "scanned page images");
    Ok(records)
}

fn scan_page<B, C>(image: &PageImage, barcode: &B, codec: &C) -> PageResult<PageRecord>
where
    B: Barcode + ?Sized,
    C: FrameCodec + ?Sized,
{
    let frame = barcode.scan(&image.bytes).map_err(|e| {
        tracing::error!(file = %image.name, error = %e, "failed to scan barcode");
        PageError::Scan {
            name: image.name.clone(),
            reason: format!("{e:#}"),
        }
    })?;

    let record = codec.decode(&frame).map_err(|e| {
        tracing::error!(file = %image.name, error = %e, "failed to decode page frame");
        PageError::Scan {
            name: image.name.clone(),
            reason: e.to_string(),
        }
    })?;

    tracing::debug!(file = %image.name, page = record.page_number, "scanned page");
    Ok(record)
}
