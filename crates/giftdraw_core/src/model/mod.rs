//! Gift-exchange domain model.
//!
//! # Responsibility
//! - Define the participant record and its owned wishlist.
//! - Keep model invariants checkable without touching storage.
//!
//! # Invariants
//! - Every participant is identified by a stable `ParticipantId`.
//! - Wishlist items live inside their owner and never outlive it.

pub mod participant;

pub use participant::{
    ItemId, Participant, ParticipantId, ParticipantValidationError, WishlistItem,
};
