//! Stored record shapes, their type discriminators and composite keys.
use super::error::StorageError;
use chrono::{DateTime, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Number of show-time slots every screen listing carries.
pub const SHOW_SLOTS: usize = 4;

/// Second-resolution UTC instant, stored as Unix epoch seconds.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub struct TimeStamp(DateTime<Utc>);

impl TimeStamp {
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(0))
    }
    pub fn from_epoch(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(TimeStamp)
    }
    pub fn epoch(&self) -> i64 {
        self.0.timestamp()
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for TimeStamp {
    fn default() -> Self {
        Self::now()
    }
}

impl Serialize for TimeStamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.epoch())
    }
}

impl<'de> Deserialize<'de> for TimeStamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let secs = i64::deserialize(deserializer)?;

        TimeStamp::from_epoch(secs)
            .ok_or_else(|| serde::de::Error::custom("failed to convert timestamp to utc"))
    }
}

/// Discriminator written into every record under `obj`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjType {
    TheatreDetails,
    ShowDetails,
    Tickets,
    SodaInventory,
}

impl ObjType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjType::TheatreDetails => "TheatreDetails",
            ObjType::ShowDetails => "ShowDetails",
            ObjType::Tickets => "Tickets",
            ObjType::SodaInventory => "SodaInventory",
        }
    }
}

#[derive(Deserialize)]
struct Probe {
    #[serde(default)]
    obj: Option<String>,
}

/// A ledger value with a fixed discriminator.
pub trait Record: Serialize + DeserializeOwned {
    const KIND: ObjType;

    fn encode(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        serde_json::to_vec(self).map_err(|e| StorageError::Codec {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    /// Decodes `bytes`, failing when they hold a different kind of record.
    fn decode(key: &str, bytes: &[u8]) -> Result<Self, StorageError> {
        Self::decode_if_kind(key, bytes)?.ok_or_else(|| StorageError::Codec {
            key: key.to_string(),
            reason: format!("expected a {} record", Self::KIND.as_str()),
        })
    }

    /// Decodes `bytes` if they carry this record's discriminator.
    fn decode_if_kind(key: &str, bytes: &[u8]) -> Result<Option<Self>, StorageError> {
        let codec = |e: serde_json::Error| StorageError::Codec {
            key: key.to_string(),
            reason: e.to_string(),
        };

        let probe: Probe = serde_json::from_slice(bytes).map_err(codec)?;
        if probe.obj.as_deref() != Some(Self::KIND.as_str()) {
            return Ok(None);
        }
        serde_json::from_slice(bytes).map(Some).map_err(codec)
    }
}

/// Composite key derivation. Keys are the plain concatenation of identifiers.
pub mod keys {
    pub fn theatre(thid: &str) -> String {
        thid.to_string()
    }
    pub fn show(thid: &str, screen: &str) -> String {
        format!("{thid}{screen}")
    }
    pub fn ticket(thid: &str, screen: &str, showcode: &str) -> String {
        format!("{thid}{screen}{showcode}")
    }
    pub fn soda(thid: &str, inventoryid: &str) -> String {
        format!("{thid}{inventoryid}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheatreRecord {
    pub obj: ObjType,
    pub thid: String,
    pub sph: BTreeMap<String, u8>, // seats per screen
    pub maxsoda: u8,
    pub cts: TimeStamp,
    pub uts: TimeStamp,
}

impl Record for TheatreRecord {
    const KIND: ObjType = ObjType::TheatreDetails;
}

impl TheatreRecord {
    pub fn new(thid: String, sph: BTreeMap<String, u8>, maxsoda: u8, now: TimeStamp) -> Self {
        Self {
            obj: Self::KIND,
            thid,
            sph,
            maxsoda,
            cts: now,
            uts: now,
        }
    }
    /// Seat capacity of `screen`; unknown or zero-capacity screens have none.
    pub fn capacity(&self, screen: &str) -> Option<u8> {
        self.sph.get(screen).copied().filter(|seats| *seats > 0)
    }
    pub fn has_screen(&self, screen: &str) -> bool {
        self.capacity(screen).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowRecord {
    pub obj: ObjType,
    pub moviename: String,
    pub screen: String,
    pub thid: String,
    pub showcode: [String; SHOW_SLOTS],
    pub cts: TimeStamp,
    pub uts: TimeStamp,
}

impl Record for ShowRecord {
    const KIND: ObjType = ObjType::ShowDetails;
}

impl ShowRecord {
    pub fn new(
        thid: String,
        screen: String,
        moviename: String,
        showcode: [String; SHOW_SLOTS],
        cts: TimeStamp,
        uts: TimeStamp,
    ) -> Self {
        Self {
            obj: Self::KIND,
            moviename,
            screen,
            thid,
            showcode,
            cts,
            uts,
        }
    }
}

/// Cumulative sales for one show slot. One popcorn and one water per ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub obj: ObjType,
    pub thid: String,
    pub moviename: String,
    pub screen: String,
    pub showcode: String,
    pub ticketsold: u8,
    pub pcsold: u8,
    pub watersold: u8,
    pub cts: TimeStamp,
    pub uts: TimeStamp,
}

impl Record for TicketRecord {
    const KIND: ObjType = ObjType::Tickets;
}

impl TicketRecord {
    pub fn sold(
        thid: String,
        screen: String,
        showcode: String,
        moviename: String,
        total: u8,
        cts: TimeStamp,
        uts: TimeStamp,
    ) -> Self {
        Self {
            obj: Self::KIND,
            thid,
            moviename,
            screen,
            showcode,
            ticketsold: total,
            pcsold: total,
            watersold: total,
            cts,
            uts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SodaRecord {
    pub obj: ObjType,
    pub thid: String,
    pub inventoryid: String,
    pub soda: u8,
    pub cts: TimeStamp,
    pub uts: TimeStamp,
}

impl Record for SodaRecord {
    const KIND: ObjType = ObjType::SodaInventory;
}

impl SodaRecord {
    pub fn new(thid: String, inventoryid: String, soda: u8, cts: TimeStamp, uts: TimeStamp) -> Self {
        Self {
            obj: Self::KIND,
            thid,
            inventoryid,
            soda,
            cts,
            uts,
        }
    }
}
