use crate::card::{BoardColumn, Card};

/// Cards grouped by board column.
///
/// The grouping is always rebuilt wholesale from a full card list; it is never
/// patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    columns: [Vec<Card>; 3],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups `cards` into the three columns, keeping their order.
    /// Cards whose `board_id` is not a known column are left out.
    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        let mut board = Self::default();
        for card in cards {
            if let Some(column) = card.column() {
                board.columns[column.index()].push(card);
            }
        }
        board
    }

    pub fn cards(&self, column: BoardColumn) -> &[Card] {
        &self.columns[column.index()]
    }

    pub fn count(&self, column: BoardColumn) -> usize {
        self.cards(column).len()
    }

    /// Total number of cards across all columns.
    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks a card up by id along with the column it sits in.
    pub fn find(&self, id: i32) -> Option<(BoardColumn, &Card)> {
        BoardColumn::ALL.into_iter().find_map(|column| {
            self.cards(column)
                .iter()
                .find(|card| card.id == id)
                .map(|card| (column, card))
        })
    }

    /// Cards of `column` matching the search term.
    pub fn filtered(&self, column: BoardColumn, term: &str) -> Vec<&Card> {
        self.cards(column)
            .iter()
            .filter(|card| matches_search(card, term))
            .collect()
    }
}

/// Case-insensitive substring match over title and description.
/// An empty term matches every card.
pub fn matches_search(card: &Card, term: &str) -> bool {
    let term = term.to_lowercase();
    if term.is_empty() {
        return true;
    }
    card.title.to_lowercase().contains(&term)
        || card
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(&term))
}
