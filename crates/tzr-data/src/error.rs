use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("invalid Tezos address '{0}': expected a 36-character base58check string starting with tz1, tz2, tz3 or KT1")]
    InvalidAddress(String),

    #[error("no addresses selected: pick at least one alias or custom address")]
    NoAddressSelected,

    #[error("report window start {start} must be before end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("fetch for {address} failed after {attempts} attempts (last status: {last_status})")]
    Fetch {
        address: String,
        last_status: String,
        attempts: u32,
    },

    #[error("could not decode indexer response for {address}: {source}")]
    Decode {
        address: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("indexer request failed: {0}")]
    Http(#[from] reqwest::Error),
}
