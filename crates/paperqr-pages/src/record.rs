//! Page records as they travel inside one barcode

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use paperqr_crypto::Salt;

/// Metadata carried by page 1 only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageHeader {
    /// Argon2id salt; kept as raw bytes so a corrupted length is detectable
    pub salt: Bytes,
    /// Total number of pages in the set (1..=255)
    pub page_count: u8,
}

impl PageHeader {
    pub fn new(salt: &Salt, page_count: u8) -> Self {
        Self {
            salt: Bytes::copy_from_slice(salt),
            page_count,
        }
    }
}

/// One page of the set. `data` is a non-overlapping slice of the blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<PageHeader>,
    /// 1-indexed page number
    pub page_number: u8,
    pub data: Bytes,
}

impl PageRecord {
    /// Page 1, the only page carrying a header.
    pub fn first(header: PageHeader, data: Bytes) -> Self {
        Self {
            header: Some(header),
            page_number: 1,
            data,
        }
    }

    /// Any page after the first.
    pub fn continuation(page_number: u8, data: Bytes) -> Self {
        Self {
            header: None,
            page_number,
            data,
        }
    }
}
