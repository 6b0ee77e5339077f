//! Core types shared by every estimator component.
//!
//! Sequence-space arithmetic, default configuration values and the
//! configuration error type. Nothing here performs I/O or keeps time.

mod constants;
mod error;
mod seq;

pub use constants::*;
pub use error::*;
pub use seq::SeqNum;
