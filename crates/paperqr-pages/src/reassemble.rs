//! Rebuilding the encrypted blob from an unordered page set
//!
//! Fragments carry no length prefix; correctness rests entirely on the
//! page-number and header checks below. Any failed check aborts the whole
//! reassembly and no partial blob is returned.

use paperqr_crypto::{Salt, SALT_SIZE};

use crate::error::{PageError, PageResult};
use crate::record::PageRecord;

/// Validate a scanned page set and concatenate its data in page order.
///
/// Checks, in order:
/// 1. page 1 is present and carries a header with a 16-byte salt
/// 2. after sorting, position `i` holds page `i + 1` (catches gaps,
///    duplicates and strays) and no later page carries a header
/// 3. the header's page count equals the number of records supplied
///
/// Returns the blob and the salt from the header.
pub fn reassemble(mut records: Vec<PageRecord>) -> PageResult<(Vec<u8>, Salt)> {
    records.sort_by_key(|record| record.page_number);

    let first = records.first().ok_or(PageError::MissingPage(1))?;
    if first.page_number != 1 {
        return Err(PageError::MissingPage(1));
    }
    let header = first.header.as_ref().ok_or(PageError::MissingHeader)?;
    let salt = Salt::try_from(&header.salt[..]).map_err(|_| PageError::InvalidSaltLength {
        len: header.salt.len(),
        expected: SALT_SIZE,
    })?;
    let declared = usize::from(header.page_count);

    for (i, record) in records.iter().enumerate().skip(1) {
        let expected = i + 1;
        if usize::from(record.page_number) != expected {
            return Err(PageError::MissingPage(expected));
        }
        if record.header.is_some() {
            return Err(PageError::UnexpectedHeader { page: expected });
        }
    }

    if declared != records.len() {
        return Err(PageError::PageCountMismatch {
            declared,
            found: records.len(),
        });
    }

    let total: usize = records.iter().map(|record| record.data.len()).sum();
    let mut blob = Vec::with_capacity(total);
    for record in &records {
        blob.extend_from_slice(&record.data);
    }

    tracing::debug!(pages = records.len(), blob_len = blob.len(), "reassembled pages");
    Ok((blob, salt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framer::PageLayout;
    use crate::record::PageHeader;
    use bytes::Bytes;
    use proptest::prelude::*;

    const SALT: Salt = [0x5Au8; SALT_SIZE];

    fn blob(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 256) as u8).collect()
    }

    /// Small capacities so short blobs span several pages.
    fn pages(len: usize) -> Vec<PageRecord> {
        PageLayout::new(10, 7)
            .unwrap()
            .frame(&SALT, blob(len), 255)
            .unwrap()
    }

    #[test]
    fn test_reassemble_in_order() {
        let (data, salt) = reassemble(pages(50)).unwrap();
        assert_eq!(data, blob(50));
        assert_eq!(salt, SALT);
    }

    #[test]
    fn test_reassemble_reverse_order() {
        let mut records = pages(50);
        records.reverse();

        let (data, salt) = reassemble(records).unwrap();
        assert_eq!(data, blob(50));
        assert_eq!(salt, SALT);
    }

    #[test]
    fn test_single_page_set() {
        let (data, _) = reassemble(pages(5)).unwrap();
        assert_eq!(data, blob(5));
    }

    #[test]
    fn test_empty_set_missing_first_page() {
        assert!(matches!(reassemble(Vec::new()), Err(PageError::MissingPage(1))));
    }

    #[test]
    fn test_missing_any_non_final_page_is_named() {
        let complete = pages(50);
        let count = complete.len();
        assert!(count >= 4);

        for missing in 1..count {
            let records: Vec<PageRecord> = complete
                .iter()
                .filter(|r| usize::from(r.page_number) != missing)
                .cloned()
                .collect();
            match reassemble(records) {
                Err(PageError::MissingPage(n)) => assert_eq!(n, missing),
                other => panic!("removing page {missing}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_final_page_reports_count() {
        let mut records = pages(50);
        let count = records.len();
        records.pop();

        match reassemble(records) {
            Err(PageError::PageCountMismatch { declared, found }) => {
                assert_eq!(declared, count);
                assert_eq!(found, count - 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_header_declares_more_pages_than_supplied() {
        let mut records = pages(31); // 10 + 7 + 7 + 7 = 4 pages
        assert_eq!(records.len(), 4);
        records[0].header.as_mut().unwrap().page_count = 5;

        assert!(matches!(
            reassemble(records),
            Err(PageError::PageCountMismatch { declared: 5, found: 4 })
        ));
    }

    #[test]
    fn test_duplicate_page_rejected() {
        let mut records = pages(31);
        records.push(records[1].clone());

        assert!(matches!(reassemble(records), Err(PageError::MissingPage(3))));
    }

    #[test]
    fn test_page_zero_rejected() {
        let mut records = pages(31);
        records.push(PageRecord::continuation(0, Bytes::from_static(b"stray")));

        assert!(matches!(reassemble(records), Err(PageError::MissingPage(1))));
    }

    #[test]
    fn test_missing_header() {
        let mut records = pages(31);
        records[0].header = None;

        assert!(matches!(reassemble(records), Err(PageError::MissingHeader)));
    }

    #[test]
    fn test_header_on_later_page_rejected() {
        let mut records = pages(31);
        records[2].header = Some(PageHeader::new(&SALT, 4));

        assert!(matches!(
            reassemble(records),
            Err(PageError::UnexpectedHeader { page: 3 })
        ));
    }

    #[test]
    fn test_invalid_salt_length() {
        let mut records = pages(31);
        records[0].header.as_mut().unwrap().salt = Bytes::from_static(&[1, 2, 3]);

        assert!(matches!(
            reassemble(records),
            Err(PageError::InvalidSaltLength { len: 3, expected: SALT_SIZE })
        ));
    }

    proptest! {
        #[test]
        fn reassembly_is_order_independent(
            (len, shuffled) in (0usize..=300).prop_flat_map(|len| {
                (Just(len), Just(pages(len)).prop_shuffle())
            })
        ) {
            let (data, salt) = reassemble(shuffled).unwrap();
            prop_assert_eq!(data, blob(len));
            prop_assert_eq!(salt, SALT);
        }
    }
}
