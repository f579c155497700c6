//! The get/put/query contract the engine consumes from the ledger.
use super::error::StorageError;
use super::records::{Record, TimeStamp};

/// One hit from a rich query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecord {
    pub key: String,
    pub value: Vec<u8>,
}

pub type QueryIter<'a> = Box<dyn Iterator<Item = Result<QueryRecord, StorageError>> + 'a>;

/// Per-transaction view of the ledger handed to each invocation.
pub trait LedgerStub {
    fn tx_id(&self) -> &str;
    fn tx_timestamp(&self) -> TimeStamp;
    /// Committed value at `key`, `None` if never written.
    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;
    /// Records matching an externally evaluated selector, yielded lazily.
    fn get_query_result(&self, selector: &str) -> Result<QueryIter<'_>, StorageError>;
}

/// Reads and decodes a record. Empty values count as absent.
pub fn read<R: Record, S: LedgerStub + ?Sized>(
    stub: &mut S,
    key: &str,
) -> Result<Option<R>, StorageError> {
    match stub.get_state(key)? {
        Some(bytes) if !bytes.is_empty() => R::decode(key, &bytes).map(Some),
        _ => Ok(None),
    }
}

pub fn write<R: Record, S: LedgerStub + ?Sized>(
    stub: &mut S,
    key: &str,
    record: &R,
) -> Result<(), StorageError> {
    let bytes = record.encode(key)?;
    stub.put_state(key, bytes)
}
