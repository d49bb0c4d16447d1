use crate::BoardError;
use crate::card::{Card, CardDraft};

/// Presentation mode of a single card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CardMode {
    #[default]
    Display,
    Edit(CardDraft),
}

/// A card as shown on the board, toggling between display and inline edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    card: Card,
    mode: CardMode,
}

impl CardView {
    pub fn new(card: Card) -> Self {
        Self {
            card,
            mode: CardMode::Display,
        }
    }

    pub fn card(&self) -> &Card {
        &self.card
    }

    pub fn mode(&self) -> &CardMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, CardMode::Edit(_))
    }

    /// Switches to edit mode with a draft copied from the card.
    pub fn start_edit(&mut self) {
        self.mode = CardMode::Edit(CardDraft::from_card(&self.card));
    }

    pub fn draft_mut(&mut self) -> Option<&mut CardDraft> {
        match &mut self.mode {
            CardMode::Edit(draft) => Some(draft),
            CardMode::Display => None,
        }
    }

    /// Drops the draft and goes back to display mode.
    pub fn cancel(&mut self) {
        self.mode = CardMode::Display;
    }

    /// The card as it would be saved from the current draft.
    pub fn submission(&self) -> Result<Card, BoardError> {
        match &self.mode {
            CardMode::Edit(draft) => draft.apply_to(&self.card),
            CardMode::Display => Err(BoardError::NotEditing),
        }
    }

    /// Records the saved card and returns to display mode.
    pub fn finish_save(&mut self, saved: Card) {
        self.card = saved;
        self.mode = CardMode::Display;
    }
}
