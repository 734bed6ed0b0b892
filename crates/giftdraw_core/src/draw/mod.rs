//! Gift draw algorithms.
//!
//! # Responsibility
//! - Produce recipient assignments independent of storage.
//!
//! # Invariants
//! - Draw output is a derangement: nobody is assigned to themselves and
//!   nobody is drawn twice.

pub mod derangement;

pub use derangement::{
    derange, Derangement, DrawError, DrawStrategy, MAX_GREEDY_ATTEMPTS, MIN_PARTICIPANTS,
};
