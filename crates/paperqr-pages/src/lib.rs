//! paperqr-pages: splitting an encrypted blob across barcode-sized pages
//!
//! # Overview
//! - `record`: the page record and the first-page header (salt + page count)
//! - `codec`: compact CBOR frames and frame-overhead measurement
//! - `framer`: per-page capacity, page count, and partitioning of the blob
//! - `reassemble`: validation and concatenation of an unordered page set
//! - `scan`: concurrent barcode scanning of page images on a bounded pool
//!
//! Page 1 carries the header, so its capacity is smaller than that of every
//! other page:
//! ```text
//! page 1:   {header: {salt, page_count}, page_number: 1, data: blob[0..c1]}
//! page n>1: {page_number: n, data: blob[c1 + (n-2)*cr ..]}
//! ```

pub mod codec;
pub mod error;
pub mod framer;
pub mod reassemble;
pub mod record;
pub mod scan;

pub use codec::{compute_overhead, encode_frames, CborCodec, FrameCodec};
pub use error::{PageError, PageResult};
pub use framer::{frame, page_capacity, page_count, PageLayout};
pub use reassemble::reassemble;
pub use record::{PageHeader, PageRecord};
pub use scan::{scan_pages, Barcode, PageImage};

/// Maximum bytes a single QR code can carry (version 40, level L, 8-bit mode)
pub const MAX_FRAME_BYTES: usize = 2953;

/// Maximum number of pages; the page count travels in one unsigned byte
pub const MAX_PAGE_COUNT: usize = u8::MAX as usize;
