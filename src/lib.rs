//! Capacity-constrained inventory for movie theatres.
//!
//! Theatres register per-screen seat capacity and a daily soda cap. Shows are
//! listed per screen, tickets are sold cumulatively per show slot, and water
//! can be exchanged for soda behind a random admission gate. All state lives
//! in a key-value ledger reached through [`ledger::LedgerStub`]; the bundled
//! [`store::SledStore`] provides one with optimistic conflict detection.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod payload;
pub mod records;
pub mod registry;
pub mod response;
pub mod selector;
pub mod soda;
pub mod store;
pub mod tickets;
pub mod utils;

pub use config::EngineConfig;
pub use dispatcher::Engine;
pub use error::{EngineError, StorageError};
pub use store::SledStore;
