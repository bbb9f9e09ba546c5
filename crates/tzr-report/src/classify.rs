//! Direction classification of raw transfers relative to a subject address.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tzr_data::RawTransaction;

/// Transfer direction relative to the subject address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    /// Short table/CSV form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Incoming => "IN",
            Direction::Outgoing => "OUT",
        }
    }
}

/// One subject-relative view of a raw transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedTransaction {
    /// Indexer operation id (kept for deterministic ordering).
    pub id: u64,
    /// Operation hash.
    pub hash: String,
    /// Inclusion time (UTC).
    pub timestamp: DateTime<Utc>,
    /// The address this view is relative to.
    pub subject: String,
    /// The other party (the subject itself for self-transfers).
    pub counterparty: String,
    /// Direction relative to the subject.
    pub direction: Direction,
    /// Amount in mutez, copied verbatim from the raw record.
    pub amount_mutez: u64,
}

/// Classifies `tx` relative to `subject`.
///
/// Yields one view when the subject is sender or receiver, two views (one
/// outgoing, one incoming) for a self-transfer.
///
/// # Panics
/// Panics when the subject is neither party: the fetcher only hands over
/// transactions the subject participates in, so that is a programming error,
/// not a recoverable condition.
pub fn classify_for_subject(tx: &RawTransaction, subject: &str) -> Vec<ClassifiedTransaction> {
    let mut views = Vec::with_capacity(1);

    if tx.sender == subject {
        views.push(ClassifiedTransaction {
            id: tx.id,
            hash: tx.hash.clone(),
            timestamp: tx.timestamp,
            subject: subject.to_string(),
            counterparty: tx.target.clone(),
            direction: Direction::Outgoing,
            amount_mutez: tx.amount,
        });
    }
    if tx.target == subject {
        views.push(ClassifiedTransaction {
            id: tx.id,
            hash: tx.hash.clone(),
            timestamp: tx.timestamp,
            subject: subject.to_string(),
            counterparty: tx.sender.clone(),
            direction: Direction::Incoming,
            amount_mutez: tx.amount,
        });
    }

    if views.is_empty() {
        panic!(
            "classifier contract breach: {} is not a party to operation {}",
            subject, tx.hash
        );
    }
    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(sender: &str, target: &str, amount: u64) -> RawTransaction {
        RawTransaction {
            id: 1,
            hash: "opHash".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            sender: sender.to_string(),
            target: target.to_string(),
            amount,
        }
    }

    #[test]
    fn incoming_view_for_receiver() {
        let views = classify_for_subject(&raw("tz1other", "tz1me", 5_000_000), "tz1me");
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].direction, Direction::Incoming);
        assert_eq!(views[0].counterparty, "tz1other");
        assert_eq!(views[0].amount_mutez, 5_000_000);
    }

    #[test]
    fn outgoing_view_for_sender() {
        let views = classify_for_subject(&raw("tz1me", "tz1other", 750_000), "tz1me");
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].direction, Direction::Outgoing);
        assert_eq!(views[0].counterparty, "tz1other");
    }

    #[test]
    fn self_transfer_yields_both_views() {
        let views = classify_for_subject(&raw("tz1me", "tz1me", 100), "tz1me");
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].direction, Direction::Outgoing);
        assert_eq!(views[1].direction, Direction::Incoming);
        assert_eq!(views[0].counterparty, "tz1me");
        assert_eq!(views[1].counterparty, "tz1me");
    }

    #[test]
    #[should_panic(expected = "classifier contract breach")]
    fn non_party_subject_panics() {
        classify_for_subject(&raw("tz1a", "tz1b", 1), "tz1stranger");
    }
}
