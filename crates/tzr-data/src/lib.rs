//! tzr-data crate
//!
//! Indexer-facing side of the reporter: record and window types, the
//! known-address registry, and the TzKT client.

pub mod addresses;
pub mod error;
pub mod tzkt;
pub mod types;

pub use addresses::{
    resolve_selection, Address, AddressRole, KnownAddress, FEE_RATE_BPS, KNOWN_ADDRESSES,
};
pub use error::DataError;
pub use tzkt::TzktClient;
pub use types::{RawTransaction, ReportWindow};
