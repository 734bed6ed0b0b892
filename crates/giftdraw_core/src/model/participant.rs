//! Participant domain model.
//!
//! # Responsibility
//! - Define the canonical participant record shared by storage and HTTP.
//! - Provide wishlist and purchase helpers that preserve model invariants.
//!
//! # Invariants
//! - `id` is stable and never reused for another participant.
//! - `assigned_recipient` never equals `id`.
//! - `WishlistItem::purchased_by` is `Some` if and only if `purchased` is true.
//! - Item ids are unique within one participant.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a registered participant.
pub type ParticipantId = Uuid;

/// Identifier of a wishlist item, unique within its owner.
pub type ItemId = Uuid;

/// Model invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantValidationError {
    /// Display name is empty after trimming.
    EmptyName,
    /// Wish text is empty after trimming.
    EmptyWishText(ItemId),
    /// Participant is assigned to themselves.
    SelfAssignment(ParticipantId),
    /// `purchased` and `purchased_by` disagree.
    PurchaseStateMismatch(ItemId),
    /// Same item id appears twice in one wishlist.
    DuplicateItem(ItemId),
}

impl Display for ParticipantValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "participant name cannot be empty"),
            Self::EmptyWishText(id) => write!(f, "wish text cannot be empty (item {id})"),
            Self::SelfAssignment(id) => {
                write!(f, "participant {id} cannot be assigned to themselves")
            }
            Self::PurchaseStateMismatch(id) => write!(
                f,
                "item {id} must have a buyer exactly when it is marked purchased"
            ),
            Self::DuplicateItem(id) => write!(f, "duplicate wishlist item id: {id}"),
        }
    }
}

impl Error for ParticipantValidationError {}

/// One requested gift owned by a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: ItemId,
    /// Free-text description of the wish.
    pub text: String,
    pub purchased: bool,
    /// Participant who bought the item. Set only while `purchased` is true.
    pub purchased_by: Option<ParticipantId>,
}

impl WishlistItem {
    /// Creates an unpurchased item with a generated id.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            purchased: false,
            purchased_by: None,
        }
    }

    /// Marks the item as bought by `buyer`.
    pub fn mark_purchased(&mut self, buyer: ParticipantId) {
        self.purchased = true;
        self.purchased_by = Some(buyer);
    }

    /// Clears purchase state, whoever bought it.
    pub fn release(&mut self) {
        self.purchased = false;
        self.purchased_by = None;
    }

    pub fn validate(&self) -> Result<(), ParticipantValidationError> {
        if self.text.trim().is_empty() {
            return Err(ParticipantValidationError::EmptyWishText(self.id));
        }
        if self.purchased != self.purchased_by.is_some() {
            return Err(ParticipantValidationError::PurchaseStateMismatch(self.id));
        }
        Ok(())
    }
}

/// Canonical record for one registered person in the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// Who this participant gives a gift to, once a draw has run.
    pub assigned_recipient: Option<ParticipantId>,
    /// Wishes in insertion order.
    pub wishlist: Vec<WishlistItem>,
}

impl Participant {
    /// Creates a participant with a generated id, empty wishlist and no
    /// assignment.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            assigned_recipient: None,
            wishlist: Vec::new(),
        }
    }

    /// Appends a new wish and returns its id.
    pub fn add_wish(&mut self, text: impl Into<String>) -> ItemId {
        let item = WishlistItem::new(text);
        let id = item.id;
        self.wishlist.push(item);
        id
    }

    /// Removes one wish. Returns `false` when no item matched.
    pub fn remove_wish(&mut self, item_id: ItemId) -> bool {
        let before = self.wishlist.len();
        self.wishlist.retain(|item| item.id != item_id);
        self.wishlist.len() != before
    }

    pub fn wish_mut(&mut self, item_id: ItemId) -> Option<&mut WishlistItem> {
        self.wishlist.iter_mut().find(|item| item.id == item_id)
    }

    /// Checks every model invariant on this record and its wishlist.
    pub fn validate(&self) -> Result<(), ParticipantValidationError> {
        if self.name.trim().is_empty() {
            return Err(ParticipantValidationError::EmptyName);
        }
        if self.assigned_recipient == Some(self.id) {
            return Err(ParticipantValidationError::SelfAssignment(self.id));
        }

        let mut seen = HashSet::with_capacity(self.wishlist.len());
        for item in &self.wishlist {
            if !seen.insert(item.id) {
                return Err(ParticipantValidationError::DuplicateItem(item.id));
            }
            item.validate()?;
        }
        Ok(())
    }
}
