//! Utility modules for the temporal memory.
//!
//! Seeded random number generation and sorted-set helpers used throughout
//! the algorithms.

mod random;
pub mod sparse;

pub use random::Random;
