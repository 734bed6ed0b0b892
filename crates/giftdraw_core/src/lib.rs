//! Core domain logic for GiftDraw, a gift-exchange organizer.
//! This crate is the single source of truth for participant and draw invariants.

pub mod db;
pub mod draw;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use draw::{derange, Derangement, DrawError, DrawStrategy};
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
};
pub use model::participant::{
    ItemId, Participant, ParticipantId, ParticipantValidationError, WishlistItem,
};
pub use repo::participant_repo::{
    Assignment, ParticipantRepository, RepoError, RepoResult, SqliteParticipantRepository,
};
pub use service::draw_service::{DrawService, DrawServiceError, DrawSummary};
pub use service::participant_service::{
    ParticipantService, ParticipantServiceError, ParticipantServiceResult, PurchaseAction,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
