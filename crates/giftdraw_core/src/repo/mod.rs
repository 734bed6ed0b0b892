//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the participant store contract used by services.
//! - Isolate SQLite query details from use-case orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Participant::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod participant_repo;
