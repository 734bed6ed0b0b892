//! Draw and reset use-case service.
//!
//! # Responsibility
//! - Run the gift draw over every registered participant and persist it.
//! - Wipe the whole exchange on reset.
//!
//! # Invariants
//! - A failed draw leaves every participant record untouched.
//! - A successful draw clears all previous assignments before writing the new
//!   ones, in one repository call.

use crate::draw::{derange, DrawError, DrawStrategy, MAX_GREEDY_ATTEMPTS};
use crate::model::participant::ParticipantId;
use crate::repo::participant_repo::{Assignment, ParticipantRepository, RepoError};
use log::{info, warn};
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

#[derive(Debug)]
pub enum DrawServiceError {
    Draw(DrawError),
    Repo(RepoError),
}

impl Display for DrawServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draw(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DrawServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Draw(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<DrawError> for DrawServiceError {
    fn from(value: DrawError) -> Self {
        Self::Draw(value)
    }
}

impl From<RepoError> for DrawServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Outcome of one committed draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawSummary {
    pub participants: usize,
    pub strategy: DrawStrategy,
    pub greedy_attempts: u32,
}

/// Draw service over a participant repository.
pub struct DrawService<R: ParticipantRepository> {
    repo: R,
    max_greedy_attempts: u32,
}

impl<R: ParticipantRepository> DrawService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            max_greedy_attempts: MAX_GREEDY_ATTEMPTS,
        }
    }

    /// Overrides the greedy attempt budget before the cyclic fallback.
    pub fn with_max_greedy_attempts(mut self, attempts: u32) -> Self {
        self.max_greedy_attempts = attempts;
        self
    }

    /// Draws a new recipient for every participant and commits it.
    ///
    /// # Errors
    /// - `Draw(InsufficientParticipants)` with fewer than two participants;
    ///   nothing is written in that case.
    /// - `Repo` when loading or persisting fails; the assignment write is
    ///   transactional so no partial draw is left behind.
    pub fn run_draw<G: Rng>(&self, rng: &mut G) -> Result<DrawSummary, DrawServiceError> {
        let started_at = Instant::now();
        let ids: Vec<ParticipantId> = self
            .repo
            .list_participants()?
            .into_iter()
            .map(|participant| participant.id)
            .collect();

        let derangement = match derange(&ids, rng, self.max_greedy_attempts) {
            Ok(derangement) => derangement,
            Err(err) => {
                warn!(
                    "event=draw module=draw_service status=rejected participants={} error={}",
                    ids.len(),
                    err
                );
                return Err(err.into());
            }
        };

        let assignments: Vec<Assignment> = derangement
            .pairs
            .iter()
            .map(|(giver, recipient)| Assignment {
                giver: *giver,
                recipient: *recipient,
            })
            .collect();
        self.repo.replace_assignments(&assignments)?;

        info!(
            "event=draw module=draw_service status=ok participants={} strategy={} attempts={} duration_ms={}",
            ids.len(),
            derangement.strategy.as_str(),
            derangement.greedy_attempts,
            started_at.elapsed().as_millis()
        );

        Ok(DrawSummary {
            participants: ids.len(),
            strategy: derangement.strategy,
            greedy_attempts: derangement.greedy_attempts,
        })
    }

    /// Removes every participant. Returns how many were removed.
    pub fn reset_all(&self) -> Result<usize, DrawServiceError> {
        let removed = self.repo.delete_all()?;
        info!("event=reset module=draw_service status=ok removed={removed}");
        Ok(removed)
    }
}
