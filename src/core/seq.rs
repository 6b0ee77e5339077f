//! 32-bit wrapping sequence numbers.
//!
//! Sequence numbers live in a circular space: `a < b` iff the signed 32-bit
//! distance from `a` to `b` is positive. Ordering is only meaningful for
//! values less than 2^31 apart, which is all a sending window ever spans.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign};

/// Sequence number with serial-number comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SeqNum(u32);

impl SeqNum {
    /// Create a sequence number from its raw value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Raw 32-bit value.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Number of bytes from `earlier` up to `self`, modulo 2^32.
    pub const fn distance(self, earlier: SeqNum) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Later of the two sequence numbers.
    pub fn max(self, other: SeqNum) -> SeqNum {
        if other > self { other } else { self }
    }
}

impl From<u32> for SeqNum {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Add<u32> for SeqNum {
    type Output = SeqNum;

    fn add(self, rhs: u32) -> SeqNum {
        SeqNum(self.0.wrapping_add(rhs))
    }
}

impl AddAssign<u32> for SeqNum {
    fn add_assign(&mut self, rhs: u32) {
        self.0 = self.0.wrapping_add(rhs);
    }
}

impl PartialOrd for SeqNum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some((self.0.wrapping_sub(other.0) as i32).cmp(&0))
    }
}

impl fmt::Display for SeqNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
