//! TzKT indexer client for windowed transaction queries.
//!
//! Pages through `/v1/operations/transactions` with `lastId` cursors and
//! merges the sender-side and receiver-side queries into one time-ordered
//! sequence. Transient upstream failures (timeouts, 5xx, 429) are retried
//! with bounded exponential backoff; exhausting the ceiling aborts the whole
//! report rather than rendering partial totals.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::DataError;
use crate::types::{RawTransaction, ReportWindow};

/// Public TzKT mainnet API (no key required for the free tier).
pub const DEFAULT_TZKT_BASE_URL: &str = "https://api.tzkt.io";

/// Maximum records per page on the operations endpoint.
const PAGE_LIMIT: usize = 1000;

/// Hard retry ceiling per request.
const MAX_ATTEMPTS: u32 = 5;

/// First backoff step; doubles per attempt.
const INITIAL_BACKOFF_MS: u64 = 500;

/// One operation row on the wire. Party addresses are nested objects and may
/// be absent for exotic operation kinds; rows without both parties or a hash
/// are dropped during conversion.
#[derive(Debug, Deserialize)]
struct OperationRecord {
    id: u64,
    hash: Option<String>,
    timestamp: DateTime<Utc>,
    sender: Option<OperationParty>,
    target: Option<OperationParty>,
    #[serde(default)]
    amount: u64,
}

#[derive(Debug, Deserialize)]
struct OperationParty {
    address: Option<String>,
}

fn into_raw(row: OperationRecord) -> Option<RawTransaction> {
    let hash = row.hash?;
    let sender = row.sender.and_then(|p| p.address)?;
    let target = row.target.and_then(|p| p.address)?;
    Some(RawTransaction {
        id: row.id,
        hash,
        timestamp: row.timestamp,
        sender,
        target,
        amount: row.amount,
    })
}

/// Merges sender-side and receiver-side results, deduplicating by indexer id
/// (a self-transfer shows up once on each side), ordered by (timestamp, id).
fn merge_sides(sent: Vec<RawTransaction>, received: Vec<RawTransaction>) -> Vec<RawTransaction> {
    let mut by_id: BTreeMap<u64, RawTransaction> = BTreeMap::new();
    for tx in sent.into_iter().chain(received) {
        by_id.entry(tx.id).or_insert(tx);
    }

    let mut merged: Vec<RawTransaction> = by_id.into_values().collect();
    merged.sort_by(|a, b| (a.timestamp, a.id).cmp(&(b.timestamp, b.id)));
    merged
}

/// HTTP client for the TzKT operations endpoint.
pub struct TzktClient {
    client: reqwest::Client,
    base_url: String,
}

impl TzktClient {
    /// Builds a client against `base_url` (see [`DEFAULT_TZKT_BASE_URL`]).
    ///
    /// # Errors
    /// Returns error if the underlying HTTP client cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self, DataError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches every applied transaction where `address` is sender or
    /// receiver within `window`, ordered by (timestamp, id) ascending.
    ///
    /// The upstream filters already restrict the range; timestamps are
    /// re-checked client-side so nothing outside the window survives.
    ///
    /// # Errors
    /// [`DataError::Fetch`] once retries are exhausted or on a non-transient
    /// upstream status, [`DataError::Decode`] on a malformed body.
    #[tracing::instrument(skip_all, fields(address, start = %window.start, end = %window.end))]
    pub async fn fetch_window(
        &self,
        address: &str,
        window: &ReportWindow,
    ) -> Result<Vec<RawTransaction>, DataError> {
        let sent = self.fetch_side(address, "sender", window).await?;
        let received = self.fetch_side(address, "target", window).await?;
        let merged = merge_sides(sent, received);

        info!(
            address,
            transactions = merged.len(),
            "indexer window fetch complete"
        );
        Ok(merged)
    }

    /// Pages through one side (`sender` or `target`) of the operations query
    /// until an empty or short page signals exhaustion.
    async fn fetch_side(
        &self,
        address: &str,
        side: &str,
        window: &ReportWindow,
    ) -> Result<Vec<RawTransaction>, DataError> {
        let mut out: Vec<RawTransaction> = Vec::new();
        let mut last_id: Option<u64> = None;
        let mut page = 0u32;

        loop {
            let mut url = format!(
                "{}/v1/operations/transactions?{}={}&status=applied&timestamp.ge={}&timestamp.lt={}&sort=id&limit={}",
                self.base_url,
                side,
                address,
                window.start.to_rfc3339_opts(SecondsFormat::Secs, true),
                window.end.to_rfc3339_opts(SecondsFormat::Secs, true),
                PAGE_LIMIT,
            );
            if let Some(cursor) = last_id {
                url.push_str(&format!("&lastId={cursor}"));
            }

            debug!(address, side, page, cursor = ?last_id, "fetching operations page");
            let body = self.get_with_retry(&url, address).await?;

            let rows: Vec<OperationRecord> =
                serde_json::from_str(&body).map_err(|source| DataError::Decode {
                    address: address.to_string(),
                    source,
                })?;

            if rows.is_empty() {
                break;
            }

            let batch_len = rows.len();
            last_id = rows.last().map(|row| row.id);

            for row in rows {
                if let Some(tx) = into_raw(row) {
                    if window.contains(tx.timestamp) {
                        out.push(tx);
                    }
                }
            }

            page += 1;
            if batch_len < PAGE_LIMIT {
                break;
            }
        }

        debug!(address, side, pages = page, records = out.len(), "side exhausted");
        Ok(out)
    }

    /// Issues one GET with the transient-failure retry policy.
    ///
    /// Timeouts and other transport errors, 5xx, and 429 are retried with
    /// exponential backoff (429 honors `Retry-After` when present). Any other
    /// 4xx will not improve on retry and fails immediately.
    async fn get_with_retry(&self, url: &str, address: &str) -> Result<String, DataError> {
        let mut last_status = String::from("no response");

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let backoff_ms = INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1);
                debug!(address, attempt, backoff_ms, "retrying indexer request");
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }

            let response = match self.client.get(url).send().await {
                Ok(response) => response,
                Err(e) => {
                    last_status = if e.is_timeout() {
                        "timeout".to_string()
                    } else {
                        format!("transport error: {e}")
                    };
                    warn!(address, attempt, error = %e, "indexer request failed");
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                return response.text().await.map_err(DataError::Http);
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok());
                last_status = format!("HTTP {}", status.as_u16());
                warn!(address, attempt, retry_after_s = ?retry_after, "indexer rate limit hit");
                if let Some(seconds) = retry_after {
                    tokio::time::sleep(Duration::from_secs(seconds)).await;
                }
                continue;
            }

            if status.is_server_error() {
                last_status = format!("HTTP {}", status.as_u16());
                warn!(address, attempt, status = status.as_u16(), "transient indexer failure");
                continue;
            }

            return Err(DataError::Fetch {
                address: address.to_string(),
                last_status: format!("HTTP {}", status.as_u16()),
                attempts: attempt + 1,
            });
        }

        Err(DataError::Fetch {
            address: address.to_string(),
            last_status,
            attempts: MAX_ATTEMPTS,
        })
    }
}
