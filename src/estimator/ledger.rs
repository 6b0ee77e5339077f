//! Sent-segment ledger.
//!
//! Keeps one [`SentRecord`] per original transmission, oldest first, and
//! turns cumulative acknowledgments back into RTT samples. Retransmitted
//! regions are flagged and never timed (Karn's algorithm): an ack for them
//! cannot tell which transmission it answers.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::core::SeqNum;

/// One outstanding transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRecord {
    /// First sequence number covered.
    pub seq: SeqNum,
    /// Number of bytes covered.
    pub count: u32,
    /// When the segment was first sent.
    pub sent_at: Instant,
    /// Marked acks observed while this record was the oldest outstanding.
    pub marked: u64,
    /// Unmarked acks observed while this record was the oldest outstanding.
    pub unmarked: u64,
    /// Some byte of this record has been sent more than once.
    pub retransmitted: bool,
}

impl SentRecord {
    fn new(seq: SeqNum, count: u32, sent_at: Instant) -> Self {
        Self {
            seq,
            count,
            sent_at,
            marked: 0,
            unmarked: 0,
            retransmitted: false,
        }
    }

    /// One past the last sequence number covered.
    pub fn end(&self) -> SeqNum {
        self.seq + self.count
    }

    /// Whether `seq` falls inside this record.
    pub fn contains(&self, seq: SeqNum) -> bool {
        seq >= self.seq && seq < self.end()
    }

    /// Whether `[start, end)` shares at least one byte with this record.
    fn overlaps(&self, start: SeqNum, end: SeqNum) -> bool {
        start < self.end() && end > self.seq
    }

    /// Whether a cumulative ack of `ack` covers every byte of this record.
    pub fn is_acked_by(&self, ack: SeqNum) -> bool {
        ack >= self.end()
    }
}

/// How a send was folded into the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendKind {
    /// New data at the expected sequence; a record was appended.
    Fresh,
    /// Data at or below the expected sequence overlapping tracked records.
    Retransmission,
    /// Nothing tracked overlaps it (already acked, cleared, or beyond a gap).
    Untracked,
}

/// Ordered record of segments in flight.
#[derive(Debug, Clone)]
pub struct SentLedger {
    /// Next sequence number expected to be sent.
    next: SeqNum,
    /// Records in send order; `seq` strictly increasing.
    records: VecDeque<SentRecord>,
}

impl Default for SentLedger {
    fn default() -> Self {
        Self::new(SeqNum::default())
    }
}

impl SentLedger {
    /// Create an empty ledger expecting `next` as the first send.
    pub fn new(next: SeqNum) -> Self {
        Self {
            next,
            records: VecDeque::new(),
        }
    }

    /// Next sequence number expected to be sent.
    pub fn next_expected(&self) -> SeqNum {
        self.next
    }

    /// Overwrite the next expected sequence number.
    pub fn set_next_expected(&mut self, next: SeqNum) {
        self.next = next;
    }

    /// Note that `count` bytes starting at `seq` were sent at `now`.
    ///
    /// Only a send at exactly the expected sequence creates a record. Any
    /// other send flags the records it overlaps as retransmitted and can
    /// only move the expected sequence forward.
    pub fn record(&mut self, seq: SeqNum, count: u32, now: Instant) -> SendKind {
        if count == 0 {
            return SendKind::Untracked;
        }

        let end = seq + count;
        if seq == self.next {
            self.records.push_back(SentRecord::new(seq, count, now));
            self.next = end;
            return SendKind::Fresh;
        }

        let mut kind = SendKind::Untracked;
        for record in self.records.iter_mut().filter(|r| r.overlaps(seq, end)) {
            record.retransmitted = true;
            kind = SendKind::Retransmission;
        }

        if end > self.next {
            // A retransmission running past the expected sequence grows the
            // record holding its start so the ledger stays contiguous.
            if let Some(record) = self.records.iter_mut().rev().find(|r| r.contains(seq)) {
                record.count = end.distance(record.seq);
            }
            self.next = end;
        }

        kind
    }

    /// Credit an ack's marking to the oldest outstanding record.
    pub fn note_mark(&mut self, marked: bool) {
        if let Some(front) = self.records.front_mut() {
            if marked {
                front.marked += 1;
            } else {
                front.unmarked += 1;
            }
        }
    }

    /// Match a cumulative ack against the oldest record.
    ///
    /// Returns `now - sent_at` when the oldest record is fully acknowledged
    /// and was never retransmitted. Every fully acknowledged record is
    /// retired regardless of whether a sample was taken.
    pub fn match_and_consume(&mut self, ack: SeqNum, now: Instant) -> Option<Duration> {
        let sample = self
            .records
            .front()
            .filter(|front| !front.retransmitted && front.is_acked_by(ack))
            .map(|front| now.saturating_duration_since(front.sent_at));

        while self.records.front().is_some_and(|r| r.is_acked_by(ack)) {
            self.records.pop_front();
        }

        sample
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Number of records in flight.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are in flight.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Oldest outstanding record.
    pub fn front(&self) -> Option<&SentRecord> {
        self.records.front()
    }

    /// Records oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &SentRecord> {
        self.records.iter()
    }
}
