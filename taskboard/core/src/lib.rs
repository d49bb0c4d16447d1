//! Core domain models for Taskboard: cards, board columns, the grouped board
//! projection and the card display/edit state.
pub mod board;
pub mod card;
pub mod card_view;

pub use board::{Board, matches_search};
pub use card::{BoardColumn, Card, CardDraft, CardUpdate, NewCard, Priority, truncate};
pub use card_view::{CardMode, CardView};

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BoardError {
    #[error("Unknown board column '{0}'")]
    UnknownColumn(String),
    #[error("Unknown priority '{0}'")]
    UnknownPriority(String),
    #[error("Card is not being edited")]
    NotEditing,
    #[error("title is required")]
    EmptyTitle,
}
