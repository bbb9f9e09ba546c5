//! Aggregate trade metrics and fixed-point XTZ formatting.
//!
//! All money stays in integer mutez through aggregation; only presentation
//! converts to 6-decimal XTZ strings, which is exact for mutez.

use serde::{Deserialize, Serialize};
use tzr_data::types::MUTEZ_PER_XTZ;
use tzr_data::{Address, AddressRole, FEE_RATE_BPS};

use crate::classify::{ClassifiedTransaction, Direction};

/// Aggregate over a sequence of classified transfers.
///
/// `trades` counts contributing records exactly; `volume` sums incoming and
/// outgoing amounts; `earned` sums incoming only, so `earned <= volume`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    /// Number of contributing classified records.
    pub trades: u64,
    /// Incoming + outgoing amounts in mutez.
    pub volume_mutez: u64,
    /// Incoming amounts only, in mutez.
    pub earned_mutez: u64,
}

impl Metrics {
    pub const ZERO: Metrics = Metrics {
        trades: 0,
        volume_mutez: 0,
        earned_mutez: 0,
    };

    /// Folds one classified transfer into the aggregate.
    pub fn record(&mut self, tx: &ClassifiedTransaction) {
        self.trades += 1;
        self.volume_mutez = self.volume_mutez.saturating_add(tx.amount_mutez);
        if tx.direction == Direction::Incoming {
            self.earned_mutez = self.earned_mutez.saturating_add(tx.amount_mutez);
        }
    }

    /// Component-wise sum. The overall report total is the pairwise sum of
    /// per-address metrics without deduplicating shared transactions; a
    /// transfer between two selected addresses counts for both. Preserved
    /// for compatibility with existing reports.
    pub fn add(&self, other: &Metrics) -> Metrics {
        Metrics {
            trades: self.trades + other.trades,
            volume_mutez: self.volume_mutez.saturating_add(other.volume_mutez),
            earned_mutez: self.earned_mutez.saturating_add(other.earned_mutez),
        }
    }
}

/// Folds a classified sequence into one aggregate.
pub fn aggregate(txs: &[ClassifiedTransaction]) -> Metrics {
    let mut metrics = Metrics::ZERO;
    for tx in txs {
        metrics.record(tx);
    }
    metrics
}

/// Per-address metrics with the role-specific derived figure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressMetrics {
    /// The reported address.
    pub address: Address,
    /// This address's aggregate.
    pub metrics: Metrics,
    /// Fee-owner role only: estimated total marketplace volume implied by the
    /// commission cut. Presentational; never feeds back into the aggregate.
    pub estimated_volume_mutez: Option<u64>,
}

impl AddressMetrics {
    /// Builds the per-address entry, deriving the estimated volume for
    /// fee-owner addresses.
    pub fn new(address: Address, metrics: Metrics) -> Self {
        let estimated_volume_mutez = match address.role {
            AddressRole::FeeOwner => {
                Some(estimated_volume_mutez(metrics.earned_mutez, FEE_RATE_BPS))
            }
            AddressRole::Generic => None,
        };
        Self {
            address,
            metrics,
            estimated_volume_mutez,
        }
    }
}

/// Estimated total volume implied by a commission cut: `earned / fee_rate`,
/// with the rate in basis points so the division stays in integer math.
pub fn estimated_volume_mutez(earned_mutez: u64, fee_rate_bps: u64) -> u64 {
    ((earned_mutez as u128) * 10_000 / fee_rate_bps as u128) as u64
}

/// Formats mutez as a bare XTZ decimal string with exactly 6 fractional
/// digits.
///
/// Examples:
/// - `1_000_000` -> `"1.000000"`
/// - `123` -> `"0.000123"`
pub fn format_xtz(mutez: u64) -> String {
    let whole = mutez / MUTEZ_PER_XTZ;
    let fractional = mutez % MUTEZ_PER_XTZ;
    format!("{whole}.{fractional:06}")
}
