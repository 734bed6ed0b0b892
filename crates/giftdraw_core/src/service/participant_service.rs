//! Participant and wishlist use-case service.
//!
//! # Responsibility
//! - Register participants and edit their wishlists.
//! - Mark wishes as bought or released.
//!
//! # Invariants
//! - Every mutation is a read-modify-write of the whole participant record.
//! - Required text inputs are trimmed and must be non-empty.
//! - Releasing a purchase does not check who bought the item.

use crate::model::participant::{ItemId, Participant, ParticipantId};
use crate::repo::participant_repo::{ParticipantRepository, RepoError};
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for participant and wishlist use-cases.
#[derive(Debug)]
pub enum ParticipantServiceError {
    /// Required input field is missing or blank.
    Validation(&'static str),
    ParticipantNotFound(ParticipantId),
    ItemNotFound {
        participant_id: ParticipantId,
        item_id: ItemId,
    },
    /// Buyer referenced by a purchase does not exist.
    BuyerNotFound(ParticipantId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ParticipantServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::ParticipantNotFound(id) => write!(f, "participant not found: {id}"),
            Self::ItemNotFound {
                participant_id,
                item_id,
            } => write!(
                f,
                "wishlist item {item_id} not found for participant {participant_id}"
            ),
            Self::BuyerNotFound(id) => write!(f, "buyer not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ParticipantServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ParticipantServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ParticipantNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type ParticipantServiceResult<T> = Result<T, ParticipantServiceError>;

/// What a purchase toggle should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseAction {
    Buy,
    Release,
}

/// Use-case service over a participant repository.
pub struct ParticipantService<R: ParticipantRepository> {
    repo: R,
}

impl<R: ParticipantRepository> ParticipantService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists every participant in registration order.
    pub fn list_participants(&self) -> ParticipantServiceResult<Vec<Participant>> {
        Ok(self.repo.list_participants()?)
    }

    pub fn get_participant(&self, id: ParticipantId) -> ParticipantServiceResult<Participant> {
        self.repo
            .get_participant(id)?
            .ok_or(ParticipantServiceError::ParticipantNotFound(id))
    }

    /// Registers a participant with an empty wishlist and no assignment.
    pub fn create_participant(&self, name: &str) -> ParticipantServiceResult<Participant> {
        let name = required(name, "name is required")?;
        let participant = Participant::new(name);
        self.repo.create_participant(&participant)?;
        info!(
            "event=participant_create module=participant_service status=ok participant_id={}",
            participant.id
        );
        Ok(participant)
    }

    /// Appends one unpurchased wish and returns the updated participant.
    pub fn add_wish(
        &self,
        participant_id: ParticipantId,
        text: &str,
    ) -> ParticipantServiceResult<Participant> {
        let text = required(text, "text is required")?;
        let mut participant = self.get_participant(participant_id)?;
        let item_id = participant.add_wish(text);
        self.repo.update_participant(&participant)?;
        info!(
            "event=wish_add module=participant_service status=ok participant_id={} item_id={}",
            participant_id, item_id
        );
        Ok(participant)
    }

    /// Deletes one wish and returns the updated participant.
    pub fn remove_wish(
        &self,
        participant_id: ParticipantId,
        item_id: ItemId,
    ) -> ParticipantServiceResult<Participant> {
        let mut participant = self.get_participant(participant_id)?;
        if !participant.remove_wish(item_id) {
            return Err(ParticipantServiceError::ItemNotFound {
                participant_id,
                item_id,
            });
        }
        self.repo.update_participant(&participant)?;
        info!(
            "event=wish_remove module=participant_service status=ok participant_id={} item_id={}",
            participant_id, item_id
        );
        Ok(participant)
    }

    /// Marks a recipient's wish as bought by `buyer_id`, or releases it.
    ///
    /// # Contract
    /// - `Buy` requires an existing buyer.
    /// - `Release` ignores `buyer_id` and clears the purchase whoever made it.
    pub fn set_purchase(
        &self,
        recipient_id: ParticipantId,
        item_id: ItemId,
        buyer_id: Option<ParticipantId>,
        action: PurchaseAction,
    ) -> ParticipantServiceResult<Participant> {
        let mut recipient = self.get_participant(recipient_id)?;

        let buyer = match action {
            PurchaseAction::Buy => {
                let buyer_id =
                    buyer_id.ok_or(ParticipantServiceError::Validation("buyerId is required"))?;
                if buyer_id != recipient_id && self.repo.get_participant(buyer_id)?.is_none() {
                    return Err(ParticipantServiceError::BuyerNotFound(buyer_id));
                }
                Some(buyer_id)
            }
            PurchaseAction::Release => None,
        };

        let item = recipient
            .wish_mut(item_id)
            .ok_or(ParticipantServiceError::ItemNotFound {
                participant_id: recipient_id,
                item_id,
            })?;
        match buyer {
            Some(buyer_id) => item.mark_purchased(buyer_id),
            None => item.release(),
        }

        self.repo.update_participant(&recipient)?;
        info!(
            "event=purchase_toggle module=participant_service status=ok participant_id={} item_id={} action={:?}",
            recipient_id, item_id, action
        );
        Ok(recipient)
    }
}

fn required<'a>(value: &'a str, message: &'static str) -> ParticipantServiceResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ParticipantServiceError::Validation(message));
    }
    Ok(trimmed)
}
