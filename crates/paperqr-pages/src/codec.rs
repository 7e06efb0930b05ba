//! Page frame serialization
//!
//! A frame is the exact byte string handed to the barcode renderer. The
//! capacity math in [`crate::framer`] only relies on [`FrameCodec::overhead`],
//! so a different wire encoding can be swapped in without touching it.
//!
//! CBOR frame (map, string keys, byte strings for binary fields):
//! ```text
//! {"header": {"salt": h'..16..', "page_count": N}, "page_number": n, "data": h'..'}
//! ```
//! `header` is omitted entirely on pages after the first.

use bytes::Bytes;

use paperqr_crypto::SALT_SIZE;

use crate::error::{PageError, PageResult};
use crate::record::{PageHeader, PageRecord};

pub trait FrameCodec {
    fn encode(&self, record: &PageRecord) -> PageResult<Vec<u8>>;

    fn decode(&self, frame: &[u8]) -> PageResult<PageRecord>;

    /// Upper bound on the non-data bytes of a frame that must fit in
    /// `frame_budget`.
    ///
    /// Measured by encoding a placeholder with the largest value of every
    /// field: a full-size salt, page number and count of 255, and a payload
    /// as long as the whole budget. The payload length is then subtracted,
    /// which leaves the widest possible length prefixes counted as overhead.
    fn overhead(&self, with_header: bool, frame_budget: usize) -> PageResult<usize> {
        let data_len = frame_budget.max(1);
        let placeholder = PageRecord {
            header: with_header.then(|| PageHeader {
                salt: Bytes::from(vec![u8::MAX; SALT_SIZE]),
                page_count: u8::MAX,
            }),
            page_number: u8::MAX,
            data: Bytes::from(vec![u8::MAX; data_len]),
        };
        let encoded = self.encode(&placeholder)?;
        Ok(encoded.len() - data_len)
    }
}

/// Self-describing CBOR frames via `serde_cbor`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CborCodec;

impl FrameCodec for CborCodec {
    fn encode(&self, record: &PageRecord) -> PageResult<Vec<u8>> {
        serde_cbor::to_vec(record).map_err(|e| PageError::Codec(format!("encoding page: {e}")))
    }

    fn decode(&self, frame: &[u8]) -> PageResult<PageRecord> {
        serde_cbor::from_slice(frame).map_err(|e| PageError::Codec(format!("decoding page: {e}")))
    }
}

/// Framing overhead of a CBOR page record at the QR frame budget.
pub fn compute_overhead(with_header: bool) -> PageResult<usize> {
    CborCodec.overhead(with_header, crate::MAX_FRAME_BYTES)
}

/// Serialize every record, refusing any frame over `frame_budget` bytes.
pub fn encode_frames<C: FrameCodec + ?Sized>(
    codec: &C,
    records: &[PageRecord],
    frame_budget: usize,
) -> PageResult<Vec<Vec<u8>>> {
    records
        .iter()
        .map(|record| {
            let frame = codec.encode(record)?;
            if frame.len() > frame_budget {
                return Err(PageError::FrameTooLarge {
                    page: usize::from(record.page_number),
                    len: frame.len(),
                    budget: frame_budget,
                });
            }
            tracing::debug!(
                page = record.page_number,
                frame_len = frame.len(),
                "encoded page frame"
            );
            Ok(frame)
        })
        .collect()
}
