//! Splitting an encrypted blob into page records
//!
//! Partitioning is a single cursor walk over the blob: page 1 takes up to
//! `capacity_first` bytes, every following page up to `capacity_rest`, and
//! the last page holds whatever remains. Records share the blob's buffer via
//! [`Bytes::slice`], each over a disjoint range.

use bytes::Bytes;

use paperqr_crypto::Salt;

use crate::codec::{CborCodec, FrameCodec};
use crate::error::{PageError, PageResult};
use crate::record::{PageHeader, PageRecord};
use crate::{MAX_FRAME_BYTES, MAX_PAGE_COUNT};

/// Payload bytes left in a frame after `overhead` bytes of framing.
pub fn page_capacity(frame_budget: usize, overhead: usize) -> PageResult<usize> {
    match frame_budget.checked_sub(overhead) {
        Some(capacity) if capacity > 0 => Ok(capacity),
        _ => Err(PageError::FrameBudget {
            budget: frame_budget,
            overhead,
        }),
    }
}

/// Number of pages needed for `total_len` bytes.
///
/// One page if everything fits next to the header; otherwise the header
/// page plus `ceil(remainder / capacity_rest)` pages, computed as
/// `2 + (remainder - 1) / capacity_rest` so an exact multiple does not earn
/// an extra, empty page.
pub fn page_count(total_len: usize, capacity_first: usize, capacity_rest: usize) -> PageResult<usize> {
    if capacity_rest == 0 {
        return Err(PageError::FrameBudget {
            budget: capacity_rest,
            overhead: 0,
        });
    }

    let count = if total_len <= capacity_first {
        1
    } else {
        2 + (total_len - capacity_first - 1) / capacity_rest
    };

    if count > MAX_PAGE_COUNT {
        return Err(PageError::TooManyPages {
            count,
            max: MAX_PAGE_COUNT,
        });
    }
    Ok(count)
}

/// Per-page payload capacities for one frame codec and budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    capacity_first: usize,
    capacity_rest: usize,
}

impl PageLayout {
    pub fn new(capacity_first: usize, capacity_rest: usize) -> PageResult<Self> {
        if capacity_first == 0 || capacity_rest == 0 {
            return Err(PageError::FrameBudget {
                budget: capacity_first.min(capacity_rest),
                overhead: 0,
            });
        }
        Ok(Self {
            capacity_first,
            capacity_rest,
        })
    }

    /// Measure the codec's overhead and derive both capacities from it.
    pub fn for_codec<C: FrameCodec + ?Sized>(codec: &C, frame_budget: usize) -> PageResult<Self> {
        let capacity_first = page_capacity(frame_budget, codec.overhead(true, frame_budget)?)?;
        let capacity_rest = page_capacity(frame_budget, codec.overhead(false, frame_budget)?)?;
        tracing::debug!(
            frame_budget,
            capacity_first,
            capacity_rest,
            "computed page layout"
        );
        Ok(Self {
            capacity_first,
            capacity_rest,
        })
    }

    pub fn capacity_first(&self) -> usize {
        self.capacity_first
    }

    pub fn capacity_rest(&self) -> usize {
        self.capacity_rest
    }

    pub fn page_count(&self, total_len: usize) -> PageResult<usize> {
        page_count(total_len, self.capacity_first, self.capacity_rest)
    }

    /// Partition `blob` into page records, page 1 first.
    ///
    /// Nothing is produced unless the whole set fits within both the
    /// protocol ceiling and `max_pages`.
    pub fn frame(
        &self,
        salt: &Salt,
        blob: impl Into<Bytes>,
        max_pages: usize,
    ) -> PageResult<Vec<PageRecord>> {
        let blob: Bytes = blob.into();
        let count = self.page_count(blob.len())?;
        if count > max_pages {
            return Err(PageError::OutputLimitExceeded {
                count,
                max: max_pages,
            });
        }
        let page_count = u8::try_from(count).map_err(|_| PageError::TooManyPages {
            count,
            max: MAX_PAGE_COUNT,
        })?;

        let mut records = Vec::with_capacity(count);
        let first_end = blob.len().min(self.capacity_first);
        records.push(PageRecord::first(
            PageHeader::new(salt, page_count),
            blob.slice(..first_end),
        ));

        let mut cursor = first_end;
        for page_number in 2..=page_count {
            let end = (cursor + self.capacity_rest).min(blob.len());
            records.push(PageRecord::continuation(page_number, blob.slice(cursor..end)));
            cursor = end;
        }
        debug_assert_eq!(cursor, blob.len());

        tracing::debug!(blob_len = blob.len(), pages = count, "framed blob");
        Ok(records)
    }
}

/// Frame `blob` for QR codes using CBOR frames and the 2953-byte budget.
pub fn frame(salt: &Salt, blob: impl Into<Bytes>, max_pages: usize) -> PageResult<Vec<PageRecord>> {
    PageLayout::for_codec(&CborCodec, MAX_FRAME_BYTES)?.frame(salt, blob, max_pages)
}
