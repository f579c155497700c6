//! sled-backed ledger with optimistic conflict detection.
//!
//! A [`SledTxn`] remembers the committed bytes behind every key it reads and
//! buffers every write. [`SledTxn::commit`] re-checks the read set inside a
//! sled transaction and refuses to apply the writes if any key moved.
use super::config::LedgerConfig;
use super::error::StorageError;
use super::ledger::{LedgerStub, QueryIter, QueryRecord};
use super::records::TimeStamp;
use super::selector::Selector;
use super::utils;
use minicbor::bytes::ByteVec;
use sled::IVec;
use sled::transaction::{
    ConflictableTransactionError, ConflictableTransactionResult, TransactionError,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Envelope each ledger value is stored in.
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Versioned {
    #[n(0)]
    pub version: u64,
    #[n(1)]
    pub trxnid: String, // transaction that wrote this version
    #[n(2)]
    pub value: ByteVec,
}

impl Versioned {
    fn decode(key: &str, raw: &[u8]) -> Result<Self, StorageError> {
        minicbor::decode(raw).map_err(|e| StorageError::Codec {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    fn encode(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        minicbor::to_vec(self).map_err(|e| StorageError::Codec {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}

#[derive(Clone)]
pub struct SledStore {
    instance: Arc<sled::Db>,
}

impl SledStore {
    pub fn new(instance: Arc<sled::Db>) -> Self {
        Self { instance }
    }

    pub fn open(config: &LedgerConfig) -> Result<Self, StorageError> {
        match &config.path {
            Some(path) => {
                tracing::info!(path = %path.display(), "opening ledger");
                Ok(Self::new(Arc::new(sled::open(path)?)))
            }
            None => Self::temporary(),
        }
    }

    /// In-memory database removed on drop.
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self::new(Arc::new(db)))
    }

    pub fn begin(&self) -> SledTxn {
        SledTxn {
            instance: Arc::clone(&self.instance),
            tx_id: utils::new_tx_id(),
            timestamp: TimeStamp::now(),
            reads: BTreeMap::new(),
            writes: BTreeMap::new(),
        }
    }

    /// Committed envelope at `key`, outside any transaction.
    pub fn get(&self, key: &str) -> Result<Option<Versioned>, StorageError> {
        self.instance
            .get(key.as_bytes())?
            .map(|raw| Versioned::decode(key, &raw))
            .transpose()
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.instance.flush()?;
        Ok(())
    }
}

pub struct SledTxn {
    instance: Arc<sled::Db>,
    tx_id: String,
    timestamp: TimeStamp,
    reads: BTreeMap<String, Option<IVec>>, // first observed raw value per key
    writes: BTreeMap<String, Vec<u8>>,
}

impl SledTxn {
    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }

    /// Applies the buffered writes if nothing this transaction read has changed.
    pub fn commit(self) -> Result<(), StorageError> {
        if self.is_read_only() {
            return Ok(());
        }

        let result = self.instance.transaction(|tx| -> ConflictableTransactionResult<(), StorageError> {
            for (key, seen) in &self.reads {
                if tx.get(key.as_bytes())? != *seen {
                    return sled::transaction::abort(StorageError::Conflict { key: key.clone() });
                }
            }
            for (key, value) in &self.writes {
                let version = match tx.get(key.as_bytes())? {
                    Some(raw) => {
                        Versioned::decode(key, &raw)
                            .map_err(ConflictableTransactionError::Abort)?
                            .version
                            + 1
                    }
                    None => 1,
                };
                let envelope = Versioned {
                    version,
                    trxnid: self.tx_id.clone(),
                    value: ByteVec::from(value.clone()),
                };
                let bytes = envelope
                    .encode(key)
                    .map_err(ConflictableTransactionError::Abort)?;
                tx.insert(key.as_bytes(), bytes)?;
            }
            Ok(())
        });

        match result {
            Ok(()) => {
                tracing::debug!(trxnid = %self.tx_id, writes = self.writes.len(), "committed");
                Ok(())
            }
            Err(TransactionError::Abort(err)) => {
                tracing::warn!(trxnid = %self.tx_id, error = %err, "commit rejected");
                Err(err)
            }
            Err(TransactionError::Storage(err)) => Err(err.into()),
        }
    }
}

impl LedgerStub for SledTxn {
    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn tx_timestamp(&self) -> TimeStamp {
        self.timestamp
    }

    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let raw = self.instance.get(key.as_bytes())?;
        self.reads
            .entry(key.to_string())
            .or_insert_with(|| raw.clone());

        raw.map(|raw| Versioned::decode(key, &raw).map(|envelope| envelope.value.to_vec()))
            .transpose()
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.writes.insert(key.to_string(), value);
        Ok(())
    }

    fn get_query_result(&self, selector: &str) -> Result<QueryIter<'_>, StorageError> {
        let selector = Selector::parse(selector)?;

        let hits = self.instance.iter().filter_map(move |entry| {
            let (raw_key, raw) = match entry {
                Ok(kv) => kv,
                Err(e) => return Some(Err(e.into())),
            };
            let key = String::from_utf8_lossy(&raw_key).into_owned();
            match Versioned::decode(&key, &raw) {
                Ok(envelope) => selector.matches_bytes(&envelope.value).then(|| {
                    Ok(QueryRecord {
                        key,
                        value: envelope.value.to_vec(),
                    })
                }),
                Err(e) => Some(Err(e)),
            }
        });

        Ok(Box::new(hits))
    }
}
